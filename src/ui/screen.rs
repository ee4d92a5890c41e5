use ratatui::{buffer::Buffer, layout::Rect};

use crate::{
    app::App,
    engine::Phase,
    ui::{render_error, render_loading, render_question, render_results, render_setup},
};

/// A UI Screen boundary: responsible for rendering one engine phase
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Settings selection, shown while idle
pub struct SetupScreen;

impl Screen for SetupScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_setup(app, area, buf);
    }
}

pub struct LoadingScreen;

impl Screen for LoadingScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_loading(app, area, buf);
    }
}

/// Question screen; covers both answering and the reveal that follows
pub struct QuestionScreen;

impl Screen for QuestionScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_question(app, area, buf);
    }
}

pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_results(app, area, buf);
    }
}

pub struct ErrorScreen;

impl Screen for ErrorScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        render_error(app, area, buf);
    }
}

/// Helper to construct the appropriate screen for the current phase
pub fn current_screen(phase: Phase) -> Box<dyn Screen> {
    match phase {
        Phase::Idle => Box::new(SetupScreen),
        Phase::Loading => Box::new(LoadingScreen),
        Phase::Playing(_) => Box::new(QuestionScreen),
        Phase::Finished => Box::new(ResultsScreen),
        Phase::Errored => Box::new(ErrorScreen),
    }
}
