use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use tracing::debug;

use crate::engine::{LoadRequest, LoadTicket};
use crate::error::ProviderError;
use crate::model::Question;
use crate::provider::QuestionProvider;

/// Unified event type consumed by the app runner
#[derive(Debug)]
pub enum QuizEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    /// A question fetch finished on a worker thread
    Loaded {
        ticket: LoadTicket,
        result: Result<Vec<Question>, ProviderError>,
    },
}

/// Source of app events (keyboard, resize, fetch completions)
pub trait QuizEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError>;

    /// Handle for posting events from background work
    fn sender(&self) -> Sender<QuizEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<QuizEvent>,
    rx: Receiver<QuizEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let key_tx = tx.clone();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if key_tx.send(QuizEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if key_tx.send(QuizEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<QuizEvent> {
        self.tx.clone()
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    tx: Sender<QuizEvent>,
    rx: Receiver<QuizEvent>,
}

impl TestEventSource {
    /// Returns the source plus a sender for feeding scripted events
    pub fn new() -> (Self, Sender<QuizEvent>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                tx: tx.clone(),
                rx,
            },
            tx,
        )
    }
}

impl QuizEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<QuizEvent> {
        self.tx.clone()
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: QuizEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: QuizEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> QuizEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => QuizEvent::Tick,
        }
    }

    pub fn sender(&self) -> Sender<QuizEvent> {
        self.event_source.sender()
    }
}

/// Run `request` on a worker thread and post the outcome back as [`QuizEvent::Loaded`]
pub fn spawn_fetch(
    provider: Arc<dyn QuestionProvider>,
    request: LoadRequest,
    tx: Sender<QuizEvent>,
) {
    std::thread::spawn(move || {
        let result = provider.fetch(&request.settings);
        if tx
            .send(QuizEvent::Loaded {
                ticket: request.ticket,
                result,
            })
            .is_err()
        {
            debug!("event loop gone before questions arrived");
        }
    });
}
