//! Session handler: the planning state machine
//!
//! `Tutor` owns the run condition and the (optional) provider. Each handler
//! takes the current [`ConversationState`] by value and returns the updated
//! state along with the outcome of the turn.
//!
//! ```text
//!            prompt (standard, or continuation)
//!   Idle ───────────────────────────────────────▶ Idle (+ assistant reply)
//!    │
//!    │ prompt classified NEW_TOPIC
//!    ▼
//!   AwaitingPlan ── submit_plan ──▶ Answering ──▶ Idle (+ assistant reply)
//!
//!   reset: any state ──▶ Idle (greeting only)
//! ```

use crate::config::{Condition, Config, RouterConfig};
use crate::conversation::{ConversationState, Role};
use crate::dispatch::{FragmentStream, ResponseDispatcher};
use crate::error::{AppError, AppResult};
use crate::planning::ClarificationPlan;
use crate::provider::{CompletionProvider, ProviderError};
use crate::router::{RouterError, TopicRouter};
use crate::surface::ChatSurface;
use std::sync::Arc;
use uuid::Uuid;

/// What a successful turn produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// An assistant reply was streamed and appended to the history
    Answered,
    /// The prompt opened a new topic; a clarification plan is needed
    PlanRequested,
}

/// Result of one handler call: the new state plus the turn outcome
pub type Turn = (ConversationState, AppResult<TurnOutcome>);

/// Drives one conversational session
pub struct Tutor {
    session_id: Uuid,
    provider: Option<Arc<dyn CompletionProvider>>,
    model: String,
    router_settings: RouterConfig,
    condition: Condition,
    api_key_env: String,
}

impl Tutor {
    /// Create a session handler; `provider` is `None` until a key is known
    pub fn new(config: &Config, provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            provider,
            model: config.provider.model().to_string(),
            router_settings: config.router.clone(),
            condition: config.session.condition,
            api_key_env: config.provider.api_key_env().to_string(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    /// Operator toggle; the conversation itself is untouched
    pub fn set_condition(&mut self, condition: Condition) {
        tracing::info!(
            session_id = %self.session_id,
            from = self.condition.as_str(),
            to = condition.as_str(),
            "Run condition changed"
        );
        self.condition = condition;
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Install a provider once a key has been supplied
    pub fn set_provider(&mut self, provider: Arc<dyn CompletionProvider>) {
        self.provider = Some(provider);
    }

    /// Handle a new user prompt
    ///
    /// The prompt is recorded before anything else, so it stays in the
    /// history even when no answer can be produced.
    pub async fn submit_prompt(
        &self,
        mut state: ConversationState,
        prompt: &str,
        surface: &mut dyn ChatSurface,
    ) -> Turn {
        if let Some(question) = state.pending_question() {
            let err = AppError::Validation(format!(
                "Still waiting for a plan for '{}'. Submit the form or reset the chat.",
                question
            ));
            return Self::fail(state, err, surface);
        }
        if prompt.trim().is_empty() {
            let err = AppError::Validation("Prompt must not be empty".to_string());
            return Self::fail(state, err, surface);
        }

        state.push_user(prompt);
        surface.render_message(Role::User, prompt);

        let Some(provider) = self.provider.clone() else {
            let err = self.credential_missing();
            return Self::fail(state, err, surface);
        };

        if self.condition == Condition::PlanningIntervention {
            let router = TopicRouter::new(
                provider.clone(),
                self.model.clone(),
                self.router_settings.clone(),
            );
            let history = &state.messages()[..state.messages().len() - 1];
            let decision = match router.try_classify(history, prompt).await {
                Ok(decision) => decision,
                Err(e) => {
                    surface.render_error(&Self::routing_failure_message(&e));
                    TopicRouter::fail_safe(&e)
                }
            };

            tracing::info!(
                session_id = %self.session_id,
                decision = decision.as_str(),
                "Routed user prompt"
            );

            if decision.is_new_topic() && state.begin_planning(prompt) {
                surface.render_planning_prompt(prompt);
                return (state, Ok(TurnOutcome::PlanRequested));
            }
        }

        let dispatcher = ResponseDispatcher::new(provider, self.model.clone());
        let started = dispatcher.answer(state.messages()).await;
        match Self::stream_reply(started, surface).await {
            Ok(reply) => {
                state.push_assistant(reply);
                (state, Ok(TurnOutcome::Answered))
            }
            Err(e) => Self::fail(state, e.into(), surface),
        }
    }

    /// Handle a submitted clarification plan
    ///
    /// On success the reply is appended and the session returns to idle. On
    /// any failure the state is returned unchanged, still awaiting a plan.
    pub async fn submit_plan(
        &self,
        mut state: ConversationState,
        plan: &ClarificationPlan,
        surface: &mut dyn ChatSurface,
    ) -> Turn {
        let Some(question) = state.pending_question().map(str::to_string) else {
            let err = AppError::Validation("No question is waiting for a plan".to_string());
            return Self::fail(state, err, surface);
        };

        let Some(provider) = self.provider.clone() else {
            let err = self.credential_missing();
            return Self::fail(state, err, surface);
        };

        // Sent with this request only, never written to the history
        let instruction = plan.synthesize_instruction(&question);
        tracing::debug!(
            session_id = %self.session_id,
            instruction = %instruction,
            "Synthesized planning instruction"
        );

        let dispatcher = ResponseDispatcher::new(provider, self.model.clone());
        let started = dispatcher
            .answer_with_instruction(state.messages(), &instruction)
            .await;
        match Self::stream_reply(started, surface).await {
            Ok(reply) => {
                state.push_assistant(reply);
                state.finish_planning();
                (state, Ok(TurnOutcome::Answered))
            }
            Err(e) => Self::fail(state, e.into(), surface),
        }
    }

    /// Back to the greeting with no pending plan
    pub fn reset(&self, mut state: ConversationState) -> ConversationState {
        state.reset();
        tracing::info!(session_id = %self.session_id, "Conversation reset");
        state
    }

    async fn stream_reply(
        started: Result<FragmentStream, ProviderError>,
        surface: &mut dyn ChatSurface,
    ) -> Result<String, ProviderError> {
        let reply = surface.render_streamed(started?).await?;
        if reply.is_empty() {
            return Err(ProviderError::EmptyCompletion);
        }
        Ok(reply)
    }

    fn routing_failure_message(error: &RouterError) -> String {
        let reason = match error {
            RouterError::Provider(e) => format!("API Error: {}", e),
            e if e.is_malformed() => "the classifier gave an unusable answer".to_string(),
            e => e.to_string(),
        };
        format!(
            "Couldn't check whether this is a new topic ({}); asking for a plan.",
            reason
        )
    }

    fn credential_missing(&self) -> AppError {
        AppError::CredentialMissing {
            env_var: self.api_key_env.clone(),
        }
    }

    fn fail(state: ConversationState, err: AppError, surface: &mut dyn ChatSurface) -> Turn {
        tracing::warn!(error = %err, "Turn failed");
        surface.render_error(&err.user_message());
        (state, Err(err))
    }
}
