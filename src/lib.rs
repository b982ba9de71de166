//! Study Partner - a terminal tutoring assistant
//!
//! Routes student questions to a hosted OpenAI-compatible completion API. Under
//! the planning-intervention condition a topic router decides whether each
//! message opens a new topic; new topics go through a short clarification form
//! before the answer is generated.

pub mod cli;
pub mod config;
pub mod conversation;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod planning;
pub mod provider;
pub mod router;
pub mod session;
pub mod surface;
pub mod telemetry;
