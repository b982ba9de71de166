//! Topic routing for Study Partner
//!
//! Decides whether an incoming message continues the current thread or opens
//! a new topic. Only consulted under the planning-intervention condition.

pub mod llm_based;

pub use llm_based::{RouterError, TopicRouter};

use serde::{Deserialize, Serialize};

/// Outcome of classifying one user message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingDecision {
    /// Starts a new topic; the planning form is shown first
    NewTopic,
    /// Follows up on the previous reply; answered directly
    Continuation,
}

impl RoutingDecision {
    /// Decision used whenever classification cannot be trusted
    ///
    /// Asking the user to clarify is preferred over answering on a guess.
    pub const FAIL_SAFE: Self = Self::NewTopic;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewTopic => "new_topic",
            Self::Continuation => "continuation",
        }
    }

    pub fn is_new_topic(&self) -> bool {
        matches!(self, Self::NewTopic)
    }
}
