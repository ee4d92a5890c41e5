//! Quiz session state machine.
//!
//! `Idle → Loading → Playing(Answering ⇄ Revealed) → Finished`, with `Loading`
//! falling into `Errored` when no usable batch arrives. The engine owns the
//! countdown, the score and the result log; presenters observe it through
//! [`SessionEngine::subscribe`] and drive it through the command methods.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::{debug, info, warn};

use crate::countdown::{Countdown, CountdownSignal, TaskId};
use crate::error::{ProviderError, SessionStartError};
use crate::highscore::HighScoreStore;
use crate::html::breakdown_preview;
use crate::model::{
    accuracy, AnswerResult, BreakdownLine, ChoiceMark, Question, SessionSummary, Settings,
    COUNTDOWN_UNITS, POINTS_PER_CORRECT, TIME_UP,
};
use crate::provider::QuestionProvider;

/// Default length of one countdown unit
pub const DEFAULT_TIME_UNIT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Answering,
    Revealed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Playing(Turn),
    Finished,
    Errored,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Loading => write!(f, "loading"),
            Phase::Playing(Turn::Answering) => write!(f, "answering"),
            Phase::Playing(Turn::Revealed) => write!(f, "revealed"),
            Phase::Finished => write!(f, "finished"),
            Phase::Errored => write!(f, "errored"),
        }
    }
}

/// Point-in-time view of the session sent along with state changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub index: usize,
    pub total: usize,
    pub score: u32,
    pub correct_count: u32,
    pub time_remaining: u32,
    pub answered: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StateEntered { phase: Phase, snapshot: Snapshot },
    Tick { time_remaining: u32 },
    AnswerRevealed {
        marks: Vec<ChoiceMark>,
        selected: String,
        timed_out: bool,
    },
    SessionFinished(SessionSummary),
    HighScoreLoaded(u32),
}

/// Identifies one outstanding question fetch; results for older tickets are dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// A fetch the presenter must fulfil, either inline or on a worker
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub settings: Settings,
}

#[derive(Debug, Default)]
struct Session {
    questions: Vec<Question>,
    current_index: usize,
    score: u32,
    correct_count: u32,
    results: Vec<AnswerResult>,
    time_remaining: u32,
    choices: Vec<String>,
    marks: Vec<ChoiceMark>,
}

pub struct SessionEngine {
    provider: Arc<dyn QuestionProvider>,
    store: Box<dyn HighScoreStore>,
    rng: StdRng,
    countdown: Countdown,
    question_task: Option<TaskId>,
    phase: Phase,
    settings: Settings,
    session: Session,
    pending_load: Option<LoadTicket>,
    next_ticket: u64,
    high_score: u32,
    last_error: Option<SessionStartError>,
    summary: Option<SessionSummary>,
    subscribers: Vec<Sender<SessionEvent>>,
}

impl SessionEngine {
    pub fn new(provider: Arc<dyn QuestionProvider>, store: Box<dyn HighScoreStore>) -> Self {
        let high_score = store.get();
        debug!(high_score, provider = provider.name(), "session engine ready");

        Self {
            provider,
            store,
            rng: StdRng::from_entropy(),
            countdown: Countdown::new(DEFAULT_TIME_UNIT),
            question_task: None,
            phase: Phase::Idle,
            settings: Settings::default(),
            session: Session::default(),
            pending_load: None,
            next_ticket: 0,
            high_score,
            last_error: None,
            summary: None,
            subscribers: Vec::new(),
        }
    }

    /// Use a seeded random source so answer order is reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_time_unit(mut self, unit: Duration) -> Self {
        self.countdown = Countdown::new(unit);
        self
    }

    /// Register an observer. The current high score is delivered immediately.
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(SessionEvent::HighScoreLoaded(self.high_score));
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = %self.phase, to = %phase, "phase change");
        self.phase = phase;
        let snapshot = self.snapshot();
        self.emit(SessionEvent::StateEntered { phase, snapshot });
    }

    // ---- accessors ----

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn provider(&self) -> Arc<dyn QuestionProvider> {
        Arc::clone(&self.provider)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn questions(&self) -> &[Question] {
        &self.session.questions
    }

    pub fn current_index(&self) -> usize {
        self.session.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::Playing(_) => self.session.questions.get(self.session.current_index),
            _ => None,
        }
    }

    /// Answers in display order for the current question
    pub fn choices(&self) -> &[String] {
        &self.session.choices
    }

    pub fn marks(&self) -> &[ChoiceMark] {
        &self.session.marks
    }

    pub fn score(&self) -> u32 {
        self.session.score
    }

    pub fn correct_count(&self) -> u32 {
        self.session.correct_count
    }

    pub fn results(&self) -> &[AnswerResult] {
        &self.session.results
    }

    pub fn time_remaining(&self) -> u32 {
        self.session.time_remaining
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn last_error(&self) -> Option<&SessionStartError> {
        self.last_error.as_ref()
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn is_countdown_running(&self) -> bool {
        self.countdown.is_running()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            index: self.session.current_index,
            total: self.session.questions.len(),
            score: self.session.score,
            correct_count: self.session.correct_count,
            time_remaining: self.session.time_remaining,
            answered: self.session.results.len(),
        }
    }

    // ---- session start ----

    /// Enter `Loading` for a fresh session. Valid from `Idle`, `Errored` or `Finished`;
    /// returns the fetch the caller has to perform.
    pub fn begin_session(&mut self, settings: Settings) -> Option<LoadRequest> {
        if !matches!(self.phase, Phase::Idle | Phase::Errored | Phase::Finished) {
            debug!(phase = %self.phase, "start ignored");
            return None;
        }

        let settings = Settings::new(settings.category, settings.difficulty, settings.amount);
        self.stop_countdown();
        self.session = Session::default();
        self.summary = None;
        self.last_error = None;
        self.settings = settings.clone();

        self.next_ticket += 1;
        let ticket = LoadTicket(self.next_ticket);
        self.pending_load = Some(ticket);

        info!(
            category = ?settings.category,
            difficulty = ?settings.difficulty,
            amount = settings.amount,
            "loading questions"
        );
        self.enter(Phase::Loading);

        Some(LoadRequest { ticket, settings })
    }

    /// Apply the outcome of a fetch started by [`begin_session`](Self::begin_session)
    pub fn complete_loading(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Question>, ProviderError>,
    ) {
        if self.phase != Phase::Loading || self.pending_load != Some(ticket) {
            debug!(?ticket, "discarding stale question batch");
            return;
        }
        self.pending_load = None;

        match result {
            Ok(questions) if !questions.is_empty() => {
                info!(count = questions.len(), "questions loaded");
                self.session = Session {
                    questions,
                    ..Session::default()
                };
                self.enter_question(0);
            }
            Ok(_) => self.fail(SessionStartError::EmptyResult),
            Err(e) => self.fail(SessionStartError::Provider(e)),
        }
    }

    fn fail(&mut self, error: SessionStartError) {
        warn!(error = %error, "session start failed");
        self.session = Session::default();
        self.last_error = Some(error);
        self.enter(Phase::Errored);
    }

    /// Perform a fetch inline through the engine's own provider
    pub fn fulfil(&mut self, request: LoadRequest) -> Phase {
        let result = self.provider.fetch(&request.settings);
        self.complete_loading(request.ticket, result);
        self.phase
    }

    pub fn start_session(&mut self, settings: Settings) -> Phase {
        match self.begin_session(settings) {
            Some(request) => self.fulfil(request),
            None => self.phase,
        }
    }

    /// Re-issue the failed fetch with the same settings
    pub fn begin_retry(&mut self) -> Option<LoadRequest> {
        if self.phase != Phase::Errored {
            return None;
        }
        self.begin_session(self.settings.clone())
    }

    pub fn retry(&mut self) -> Phase {
        match self.begin_retry() {
            Some(request) => self.fulfil(request),
            None => self.phase,
        }
    }

    /// Reset and immediately start another session with the same settings
    pub fn begin_play_again(&mut self) -> Option<LoadRequest> {
        let settings = self.settings.clone();
        self.reset_session();
        self.begin_session(settings)
    }

    pub fn play_again(&mut self) -> Phase {
        match self.begin_play_again() {
            Some(request) => self.fulfil(request),
            None => self.phase,
        }
    }

    /// Abandon whatever is going on and return to settings selection
    pub fn change_category(&mut self) {
        self.reset_session();
    }

    // ---- question flow ----

    fn enter_question(&mut self, index: usize) {
        let Some(question) = self.session.questions.get(index) else {
            return;
        };

        let mut choices = question.answer_pool();
        choices.shuffle(&mut self.rng);

        self.session.current_index = index;
        self.session.marks = vec![ChoiceMark::Unmarked; choices.len()];
        self.session.choices = choices;
        self.session.time_remaining = COUNTDOWN_UNITS;
        self.question_task = Some(self.countdown.start(COUNTDOWN_UNITS));

        self.enter(Phase::Playing(Turn::Answering));
    }

    /// Feed elapsed wall-clock time to the countdown
    pub fn tick(&mut self, elapsed: Duration) {
        for signal in self.countdown.advance(elapsed) {
            match signal {
                CountdownSignal::Tick { task, remaining } => {
                    if !self.owns(task) {
                        continue;
                    }
                    self.session.time_remaining = remaining;
                    self.emit(SessionEvent::Tick {
                        time_remaining: remaining,
                    });
                }
                CountdownSignal::Expired { task } => {
                    if self.owns(task) {
                        debug!(index = self.session.current_index, "time up");
                        self.resolve(TIME_UP.to_string(), true);
                    }
                }
            }
        }
    }

    fn owns(&self, task: TaskId) -> bool {
        self.phase == Phase::Playing(Turn::Answering) && self.question_task == Some(task)
    }

    /// Answer the current question. Ignored unless a question is awaiting an answer.
    pub fn submit_answer(&mut self, selected: &str) -> bool {
        if self.phase != Phase::Playing(Turn::Answering) {
            debug!(phase = %self.phase, "answer ignored");
            return false;
        }
        self.resolve(selected.to_string(), false);
        true
    }

    /// Answer with the displayed choice at `index`
    pub fn select_choice(&mut self, index: usize) -> bool {
        match self.session.choices.get(index).cloned() {
            Some(choice) => self.submit_answer(&choice),
            None => false,
        }
    }

    fn resolve(&mut self, selected: String, timed_out: bool) {
        self.stop_countdown();

        let Some(question) = self.session.questions.get(self.session.current_index) else {
            return;
        };
        let correct_answer = question.correct_answer.clone();
        let question_text = question.text.clone();
        let was_correct = !timed_out && selected == correct_answer;

        if was_correct {
            self.session.score += POINTS_PER_CORRECT;
            self.session.correct_count += 1;
        }

        self.session.marks = self
            .session
            .choices
            .iter()
            .map(|choice| {
                if *choice == correct_answer {
                    ChoiceMark::Correct
                } else if !timed_out && !was_correct && *choice == selected {
                    ChoiceMark::Incorrect
                } else {
                    ChoiceMark::Unmarked
                }
            })
            .collect();

        self.session.results.push(AnswerResult {
            question_text,
            was_correct,
            selected_answer: selected.clone(),
            correct_answer,
        });

        let marks = self.session.marks.clone();
        self.emit(SessionEvent::AnswerRevealed {
            marks,
            selected,
            timed_out,
        });
        self.enter(Phase::Playing(Turn::Revealed));
    }

    /// Move past a revealed question, finishing the session after the last one
    pub fn advance(&mut self) -> bool {
        if self.phase != Phase::Playing(Turn::Revealed) {
            debug!(phase = %self.phase, "advance ignored");
            return false;
        }

        let next = self.session.current_index + 1;
        if next >= self.session.questions.len() {
            self.session.current_index = self.session.questions.len();
            self.finish();
        } else {
            self.enter_question(next);
        }
        true
    }

    fn finish(&mut self) {
        self.stop_countdown();

        let total = self.session.questions.len();
        let score = self.session.score;
        let stored = self.store.get();
        let is_new_high_score = score > stored;

        if is_new_high_score {
            if let Err(e) = self.store.set(score) {
                warn!(error = %e, "failed to persist high score");
            }
            self.high_score = score;
        } else {
            self.high_score = stored;
        }

        let breakdown = self
            .session
            .results
            .iter()
            .enumerate()
            .map(|(i, r)| BreakdownLine {
                number: i + 1,
                was_correct: r.was_correct,
                text: breakdown_preview(&r.question_text),
            })
            .collect();

        let summary = SessionSummary {
            score,
            correct_count: self.session.correct_count,
            total,
            accuracy: accuracy(self.session.correct_count, total),
            is_new_high_score,
            high_score: self.high_score,
            breakdown,
        };

        info!(
            score,
            correct = summary.correct_count,
            total,
            new_high_score = is_new_high_score,
            "session finished"
        );

        self.summary = Some(summary.clone());
        self.enter(Phase::Finished);
        self.emit(SessionEvent::SessionFinished(summary));
    }

    /// Drop all session state and return to `Idle`. Valid from any phase.
    pub fn reset_session(&mut self) {
        self.stop_countdown();
        self.pending_load = None;
        self.session = Session::default();
        self.summary = None;
        self.last_error = None;
        self.enter(Phase::Idle);
    }

    fn stop_countdown(&mut self) {
        self.countdown.cancel();
        self.question_task = None;
    }
}
