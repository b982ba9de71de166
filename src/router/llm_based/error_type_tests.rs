//! RouterError Tests

use super::*;

#[test]
fn test_malformed_variants() {
    assert!(RouterError::EmptyResponse.is_malformed());
    assert!(
        RouterError::UnparseableResponse {
            response: "maybe".to_string(),
            response_length: 5,
        }
        .is_malformed()
    );
    assert!(
        RouterError::SizeExceeded {
            size: 2048,
            max_size: MAX_ROUTER_RESPONSE,
        }
        .is_malformed()
    );
}

#[test]
fn test_provider_failures_are_not_malformed() {
    let network: RouterError = ProviderError::Network("connection refused".to_string()).into();
    assert!(!network.is_malformed());

    let auth: RouterError = ProviderError::Api {
        status: 401,
        message: "Invalid API Key".to_string(),
    }
    .into();
    assert!(!auth.is_malformed());

    assert!(!RouterError::Timeout { timeout_seconds: 10 }.is_malformed());
}

#[test]
fn test_router_error_messages() {
    let err: RouterError = ProviderError::Api {
        status: 429,
        message: "rate limited".to_string(),
    }
    .into();
    assert!(err.to_string().starts_with("Router query failed"));
    assert!(err.to_string().contains("429"));

    let err = RouterError::SizeExceeded {
        size: 4096,
        max_size: 1024,
    };
    assert!(err.to_string().contains("4096"));
}

#[test]
fn test_every_error_kind_fails_safe_to_new_topic() {
    let errors = [
        RouterError::Provider(ProviderError::Network("connection refused".to_string())),
        RouterError::Timeout { timeout_seconds: 10 },
        RouterError::EmptyResponse,
        RouterError::UnparseableResponse {
            response: "maybe".to_string(),
            response_length: 5,
        },
        RouterError::SizeExceeded {
            size: 2048,
            max_size: MAX_ROUTER_RESPONSE,
        },
    ];

    for err in &errors {
        assert_eq!(TopicRouter::fail_safe(err), RoutingDecision::NewTopic, "{}", err);
    }
}
