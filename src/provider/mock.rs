//! Scripted provider for driving the engine without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use super::QuestionProvider;
use crate::error::ProviderError;
use crate::model::{Question, Settings};

/// A scripted outcome handed out by [`MockProvider`]
#[derive(Debug, Clone)]
pub enum Scripted {
    Questions(Vec<Question>),
    ResponseCode(u8),
    Transport(String),
}

/// Replays scripted outcomes in order; the last one repeats once the script runs out.
pub struct MockProvider {
    script: Mutex<VecDeque<Scripted>>,
    fallback: Scripted,
    call_count: AtomicU32,
    last_settings: Mutex<Option<Settings>>,
}

impl MockProvider {
    pub fn new(script: Vec<Scripted>) -> Self {
        let fallback = script
            .last()
            .cloned()
            .unwrap_or(Scripted::Questions(vec![]));
        Self {
            script: Mutex::new(script.into()),
            fallback,
            call_count: AtomicU32::new(0),
            last_settings: Mutex::new(None),
        }
    }

    /// Always answers with the same batch
    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self::new(vec![Scripted::Questions(questions)])
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_settings(&self) -> Option<Settings> {
        self.last_settings
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }
}

impl QuestionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(&self, settings: &Settings) -> Result<Vec<Question>, ProviderError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_settings.lock() {
            *last = Some(settings.clone());
        }

        let next = self
            .script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or_else(|| self.fallback.clone());

        match next {
            Scripted::Questions(questions) => Ok(questions),
            Scripted::ResponseCode(code) => Err(ProviderError::ResponseCode {
                code,
                reason: super::opentdb::response_code_reason(code),
            }),
            Scripted::Transport(msg) => Err(ProviderError::Transport(msg)),
        }
    }
}
