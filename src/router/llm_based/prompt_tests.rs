//! Tests for build_router_prompt and context_window

use super::*;

fn exchange() -> Vec<Message> {
    vec![
        Message::assistant("Hi! Ask me anything."),
        Message::user("What is Speciation?"),
        Message::assistant("Speciation is the formation of new species."),
    ]
}

#[test]
fn test_build_router_prompt_contains_new_message() {
    let prompt = TopicRouter::build_router_prompt(&exchange(), "Give me an example");
    assert!(prompt.contains("[NEW MESSAGE]: \"Give me an example\""));
}

#[test]
fn test_build_router_prompt_contains_context_with_roles() {
    let history = exchange();
    let prompt = TopicRouter::build_router_prompt(&history[1..], "Why?");
    assert!(prompt.contains("user: What is Speciation?"));
    assert!(prompt.contains("assistant: Speciation is the formation of new species."));
    assert!(!prompt.contains("Hi! Ask me anything."));
}

#[test]
fn test_build_router_prompt_contains_both_keywords() {
    let prompt = TopicRouter::build_router_prompt(&exchange(), "Why?");
    assert!(prompt.contains("\"NEW\""));
    assert!(prompt.contains("\"CONTINUATION\""));
    assert!(prompt.contains("Respond with ONLY one word: NEW or CONTINUATION."));
}

#[test]
fn test_build_router_prompt_states_definition_rule() {
    let prompt = TopicRouter::build_router_prompt(&exchange(), "What is Speciation?");
    assert!(prompt.contains("ALWAYS NEW"));
    assert!(prompt.contains("even if that concept was mentioned before"));
    assert!(prompt.contains("Define Mutation"));
}

#[test]
fn test_build_router_prompt_states_continuation_rule() {
    let prompt = TopicRouter::build_router_prompt(&exchange(), "Why?");
    assert!(prompt.contains("elaboration, an example, a simpler explanation"));
    assert!(prompt.contains("Why does it happen?"));
}

#[test]
fn test_build_router_prompt_truncates_long_new_message() {
    let long = "a".repeat(2000);
    let prompt = TopicRouter::build_router_prompt(&exchange(), &long);
    assert!(prompt.contains("... [truncated]"));
    assert!(!prompt.contains(&long));
}

#[test]
fn test_context_window_takes_most_recent() {
    let history = exchange();
    let window = TopicRouter::context_window(&history, 2);
    assert_eq!(window, &history[1..]);
}

#[test]
fn test_context_window_larger_than_history() {
    let history = exchange();
    assert_eq!(TopicRouter::context_window(&history, 10), &history[..]);
    assert!(TopicRouter::context_window(&[], 2).is_empty());
}
