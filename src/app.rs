use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use crate::categories::{category_at, category_position, CATEGORIES};
use crate::config::{Config, ConfigStore};
use crate::engine::{LoadRequest, Phase, SessionEngine, SessionEvent, Turn};
use crate::model::{ChoiceMark, Difficulty, SessionSummary, Settings};

/// Question counts offered on the setup screen
pub const AMOUNT_CHOICES: [u32; 8] = [5, 10, 15, 20, 25, 30, 40, 50];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    Category,
    Difficulty,
    Amount,
}

impl SetupField {
    fn next(self) -> Self {
        match self {
            SetupField::Category => SetupField::Difficulty,
            SetupField::Difficulty => SetupField::Amount,
            SetupField::Amount => SetupField::Category,
        }
    }

    fn prev(self) -> Self {
        match self {
            SetupField::Category => SetupField::Amount,
            SetupField::Difficulty => SetupField::Category,
            SetupField::Amount => SetupField::Difficulty,
        }
    }
}

/// Values picked on the setup screen
#[derive(Debug, Clone)]
pub struct SetupForm {
    pub field: SetupField,
    pub category_pos: usize,
    pub difficulty: Option<Difficulty>,
    pub amount: u32,
}

impl SetupForm {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            field: SetupField::Category,
            category_pos: category_position(settings.category.as_deref()),
            difficulty: settings.difficulty,
            amount: settings.amount,
        }
    }

    pub fn settings(&self) -> Settings {
        Settings::new(
            category_at(self.category_pos).map(str::to_string),
            self.difficulty,
            self.amount,
        )
    }

    fn cycle(&mut self, forward: bool) {
        match self.field {
            SetupField::Category => {
                let len = CATEGORIES.len() + 1;
                self.category_pos = if forward {
                    (self.category_pos + 1) % len
                } else {
                    (self.category_pos + len - 1) % len
                };
            }
            SetupField::Difficulty => {
                // None, Easy, Medium, Hard
                let mut options = vec![None];
                options.extend(Difficulty::ALL.iter().copied().map(Some));
                let idx = options
                    .iter()
                    .position(|d| *d == self.difficulty)
                    .unwrap_or(0);
                let len = options.len();
                let next = if forward {
                    (idx + 1) % len
                } else {
                    (idx + len - 1) % len
                };
                self.difficulty = options[next];
            }
            SetupField::Amount => {
                // step to the neighbouring choice even when the amount is off the list
                let next = if forward {
                    AMOUNT_CHOICES.iter().find(|a| **a > self.amount)
                } else {
                    AMOUNT_CHOICES.iter().rev().find(|a| **a < self.amount)
                };
                self.amount = match next {
                    Some(a) => *a,
                    None if forward => AMOUNT_CHOICES[0],
                    None => AMOUNT_CHOICES[AMOUNT_CHOICES.len() - 1],
                };
            }
        }
    }
}

/// What the presenter last heard from the engine
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub high_score: u32,
    pub time_remaining: u32,
    pub marks: Vec<ChoiceMark>,
    pub timed_out: bool,
    pub summary: Option<SessionSummary>,
}

pub struct App {
    pub engine: SessionEngine,
    pub form: SetupForm,
    pub cursor: usize,
    pub view: ViewState,
    pub should_quit: bool,
    events: Receiver<SessionEvent>,
    config: Config,
    config_store: Option<Box<dyn ConfigStore>>,
}

impl App {
    pub fn new(mut engine: SessionEngine, config: Config) -> Self {
        let events = engine.subscribe();
        let mut app = Self {
            form: SetupForm::from_settings(&config.settings()),
            engine,
            cursor: 0,
            view: ViewState::default(),
            should_quit: false,
            events,
            config,
            config_store: None,
        };
        app.pump_events();
        app
    }

    /// Persist the setup form whenever a session is started from it
    pub fn with_config_store(mut self, store: Box<dyn ConfigStore>) -> Self {
        self.config_store = Some(store);
        self
    }

    pub fn phase(&self) -> Phase {
        self.engine.phase()
    }

    /// Drain engine notifications into the view state
    pub fn pump_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                SessionEvent::HighScoreLoaded(score) => self.view.high_score = score,
                SessionEvent::StateEntered { phase, snapshot } => {
                    self.view.time_remaining = snapshot.time_remaining;
                    match phase {
                        Phase::Playing(Turn::Answering) => {
                            self.cursor = 0;
                            self.view.marks.clear();
                            self.view.timed_out = false;
                        }
                        Phase::Idle | Phase::Loading => {
                            self.view.summary = None;
                            self.view.marks.clear();
                        }
                        _ => {}
                    }
                }
                SessionEvent::Tick { time_remaining } => self.view.time_remaining = time_remaining,
                SessionEvent::AnswerRevealed {
                    marks, timed_out, ..
                } => {
                    self.view.marks = marks;
                    self.view.timed_out = timed_out;
                }
                SessionEvent::SessionFinished(summary) => {
                    self.view.high_score = summary.high_score;
                    self.view.summary = Some(summary);
                }
            }
        }
    }

    pub fn on_tick(&mut self, elapsed: Duration) {
        self.engine.tick(elapsed);
        self.pump_events();
    }

    pub fn on_loaded(
        &mut self,
        ticket: crate::engine::LoadTicket,
        result: Result<Vec<crate::model::Question>, crate::error::ProviderError>,
    ) {
        self.engine.complete_loading(ticket, result);
        self.pump_events();
    }

    /// Handle a key press. Returns a fetch to run when a session starts loading.
    pub fn on_key(&mut self, key: KeyEvent) -> Option<LoadRequest> {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            self.should_quit = true;
            return None;
        }

        let request = match self.engine.phase() {
            Phase::Idle => self.on_setup_key(key),
            Phase::Loading => None,
            Phase::Playing(Turn::Answering) => {
                self.on_answer_key(key);
                None
            }
            Phase::Playing(Turn::Revealed) => {
                if matches!(
                    key.code,
                    KeyCode::Enter | KeyCode::Right | KeyCode::Char('n') | KeyCode::Char(' ')
                ) {
                    self.engine.advance();
                }
                None
            }
            Phase::Finished => match key.code {
                KeyCode::Char('p') | KeyCode::Enter => self.engine.begin_play_again(),
                KeyCode::Char('c') => {
                    self.engine.change_category();
                    None
                }
                _ => None,
            },
            Phase::Errored => match key.code {
                KeyCode::Char('r') | KeyCode::Enter => self.engine.begin_retry(),
                KeyCode::Char('c') => {
                    self.engine.change_category();
                    None
                }
                _ => None,
            },
        };

        self.pump_events();
        request
    }

    fn on_setup_key(&mut self, key: KeyEvent) -> Option<LoadRequest> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.form.field = self.form.field.prev(),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                self.form.field = self.form.field.next()
            }
            KeyCode::Left | KeyCode::Char('h') => self.form.cycle(false),
            KeyCode::Right | KeyCode::Char('l') => self.form.cycle(true),
            KeyCode::Enter | KeyCode::Char('s') => return self.start_from_form(),
            _ => {}
        }
        None
    }

    fn start_from_form(&mut self) -> Option<LoadRequest> {
        let settings = self.form.settings();
        self.config.remember(&settings);
        if let Some(store) = &self.config_store {
            if let Err(e) = store.save(&self.config) {
                warn!(error = %e, "failed to save config");
            }
        }
        self.engine.begin_session(settings)
    }

    fn on_answer_key(&mut self, key: KeyEvent) {
        let count = self.engine.choices().len();
        if count == 0 {
            return;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.cursor = (self.cursor + count - 1) % count,
            KeyCode::Down | KeyCode::Char('j') => self.cursor = (self.cursor + 1) % count,
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.engine.select_choice(self.cursor);
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let n = c.to_digit(10).unwrap_or(0) as usize;
                if n >= 1 && n <= count {
                    self.cursor = n - 1;
                    self.engine.select_choice(n - 1);
                }
            }
            _ => {}
        }
    }
}
