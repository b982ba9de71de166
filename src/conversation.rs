//! Conversation log and pending-plan state for a single session
//!
//! `ConversationState` is a plain value: handlers take it by value and hand
//! back the updated copy. One instance per session, never shared.

use serde::{Deserialize, Serialize};

/// Greeting shown at session start and after every reset
pub const DEFAULT_GREETING: &str =
    "Hi! I'm your AI Study Partner. Ask me anything about the reading.";

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role-tagged chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Whether a clarification plan is being collected
///
/// Carrying the question inside `AwaitingPlan` keeps "pending question is set
/// iff planning is active" true by construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingPlan { question: String },
}

/// Ordered message log plus pending-plan state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    greeting: String,
    messages: Vec<Message>,
    phase: Phase,
}

impl ConversationState {
    /// Fresh session: only the greeting, no pending plan
    pub fn new(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        Self {
            messages: vec![Message::assistant(greeting.clone())],
            greeting,
            phase: Phase::Idle,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn planning_active(&self) -> bool {
        matches!(self.phase, Phase::AwaitingPlan { .. })
    }

    pub fn pending_question(&self) -> Option<&str> {
        match &self.phase {
            Phase::AwaitingPlan { question } => Some(question),
            Phase::Idle => None,
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Enter `AwaitingPlan` for `question`
    ///
    /// Blank questions are ignored so the phase never carries an empty
    /// pending question. Returns whether the transition happened.
    pub fn begin_planning(&mut self, question: impl Into<String>) -> bool {
        let question = question.into();
        if question.trim().is_empty() {
            return false;
        }
        self.phase = Phase::AwaitingPlan { question };
        true
    }

    /// Leave `AwaitingPlan`, returning the question that was pending
    pub fn finish_planning(&mut self) -> Option<String> {
        match std::mem::take(&mut self.phase) {
            Phase::AwaitingPlan { question } => Some(question),
            Phase::Idle => None,
        }
    }

    /// Replace the log with the greeting and clear the pending plan
    pub fn reset(&mut self) {
        self.messages.clear();
        self.messages.push(Message::assistant(self.greeting.clone()));
        self.phase = Phase::Idle;
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new(DEFAULT_GREETING)
    }
}
