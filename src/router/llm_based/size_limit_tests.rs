//! Response size limit tests
//!
//! try_classify rejects responses over MAX_ROUTER_RESPONSE before parsing;
//! the parser itself still copes with long strings.

use super::*;
use crate::provider::test_support::ScriptedProvider;

fn router(provider: Arc<ScriptedProvider>) -> TopicRouter {
    TopicRouter::new(provider, "test-model", RouterConfig::default())
}

#[test]
fn test_parse_classification_handles_long_responses() {
    let long_response = format!("{} CONTINUATION {}", "x".repeat(500), "y".repeat(500));
    let result = TopicRouter::parse_classification(&long_response);
    assert_eq!(result.unwrap(), RoutingDecision::Continuation);
}

#[tokio::test]
async fn test_oversized_response_is_rejected() {
    let provider = Arc::new(ScriptedProvider::new());
    provider.push_completion(Ok(format!("CONTINUATION {}", "z".repeat(MAX_ROUTER_RESPONSE))));

    let history = vec![Message::assistant("hello")];
    let result = router(provider.clone()).try_classify(&history, "Why?").await;

    assert!(matches!(
        result,
        Err(RouterError::SizeExceeded { max_size: MAX_ROUTER_RESPONSE, .. })
    ));
}

#[tokio::test]
async fn test_oversized_response_falls_back_to_new_topic() {
    let provider = Arc::new(ScriptedProvider::new());
    provider.push_completion(Ok(format!("CONTINUATION {}", "z".repeat(MAX_ROUTER_RESPONSE))));

    let history = vec![Message::assistant("hello")];
    let decision = router(provider).classify(&history, "Why?").await;
    assert_eq!(decision, RoutingDecision::NewTopic);
}

#[tokio::test]
async fn test_response_at_limit_is_accepted() {
    let provider = Arc::new(ScriptedProvider::new());
    let padded = format!("CONTINUATION{}", " ".repeat(MAX_ROUTER_RESPONSE - 12));
    assert_eq!(padded.len(), MAX_ROUTER_RESPONSE);
    provider.push_completion(Ok(padded));

    let history = vec![Message::assistant("hello")];
    let result = router(provider).try_classify(&history, "Why?").await;
    assert_eq!(result.unwrap(), RoutingDecision::Continuation);
}
