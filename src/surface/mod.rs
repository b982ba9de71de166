//! Chat surface boundary
//!
//! Everything the session needs to show the user goes through
//! [`ChatSurface`]. The terminal implementation lives in [`terminal`].

pub mod terminal;

pub use terminal::{BufferedLines, LineInput, LineSource, Readline, TerminalSurface};

use crate::conversation::Role;
use crate::dispatch::FragmentStream;
use crate::provider::ProviderError;
use async_trait::async_trait;
use futures::StreamExt;

/// Renders messages, streamed replies and errors
#[async_trait]
pub trait ChatSurface: Send {
    /// Show a complete message
    fn render_message(&mut self, role: Role, content: &str);

    /// Show one piece of a reply that is still streaming
    fn render_fragment(&mut self, fragment: &str);

    /// Called once a streamed reply ends, successfully or not
    fn finish_stream(&mut self) {}

    fn render_error(&mut self, text: &str);

    /// Informational line that is not part of the conversation
    fn render_notice(&mut self, text: &str);

    /// Announce that a new topic needs a clarification plan
    fn render_planning_prompt(&mut self, question: &str);

    /// Render fragments as they arrive and return their concatenation
    ///
    /// Stops at the first error. Fragments already shown stay on screen, but
    /// the caller gets the error instead of partial text.
    async fn render_streamed(&mut self, mut fragments: FragmentStream) -> Result<String, ProviderError> {
        let mut text = String::new();
        while let Some(fragment) = fragments.next().await {
            match fragment {
                Ok(fragment) => {
                    self.render_fragment(&fragment);
                    text.push_str(&fragment);
                }
                Err(e) => {
                    self.finish_stream();
                    return Err(e);
                }
            }
        }
        self.finish_stream();
        Ok(text)
    }
}
