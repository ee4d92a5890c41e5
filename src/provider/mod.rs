//! Question sources.
//!
//! The engine only sees the [`QuestionProvider`] trait. [`OpenTdbProvider`] talks to
//! the public question bank over HTTP and [`MockProvider`] replays scripted batches.

pub mod mock;
pub mod opentdb;

use crate::error::ProviderError;
use crate::model::{Question, Settings};

pub use mock::MockProvider;
pub use opentdb::OpenTdbProvider;

/// Fetches an ordered batch of multiple-choice questions for the given settings.
///
/// Implementations must return an error, never a degenerate batch, when the
/// underlying service fails or reports a non-success status.
pub trait QuestionProvider: Send + Sync {
    fn name(&self) -> &str;

    fn fetch(&self, settings: &Settings) -> Result<Vec<Question>, ProviderError>;
}
