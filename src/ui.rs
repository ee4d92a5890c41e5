pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use crate::{
    app::{App, SetupField},
    categories::category_name,
    engine::{Phase, Turn},
    html::decode_entities,
    model::{ChoiceMark, POINTS_PER_CORRECT},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
/// Countdown values at or below this are drawn in red
const LOW_TIME: u32 = 5;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        screen::current_screen(self.phase()).render(self, area, buf);
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

fn legend(text: &str) -> Paragraph<'_> {
    Paragraph::new(Span::styled(text, italic())).alignment(Alignment::Center)
}

fn centered_column(area: Rect, constraints: &[Constraint]) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(constraints.iter().copied())
        .split(area)
}

pub fn render_setup(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = centered_column(
        area,
        &[
            Constraint::Length(3), // title
            Constraint::Length(1),
            Constraint::Length(5), // fields
            Constraint::Length(1),
            Constraint::Length(1), // high score
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ],
    );

    Paragraph::new(Span::styled("kwiz", bold().fg(Color::Cyan)))
        .block(Block::default().borders(Borders::ALL).title("Trivia"))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let settings = app.form.settings();
    let difficulty = settings
        .difficulty
        .map(|d| d.to_string())
        .unwrap_or_else(|| "any".to_string());

    let fields = [
        (
            SetupField::Category,
            "Category",
            category_name(settings.category.as_deref()).to_string(),
        ),
        (SetupField::Difficulty, "Difficulty", difficulty),
        (SetupField::Amount, "Questions", settings.amount.to_string()),
    ];

    let lines: Vec<Line> = fields
        .into_iter()
        .map(|(field, label, value)| {
            let active = app.form.field == field;
            let value_style = if active {
                bold().fg(Color::Yellow)
            } else {
                bold()
            };
            Line::from(vec![
                Span::styled(format!("{label:>10}  "), dim_bold()),
                Span::styled(
                    if active {
                        format!("‹ {value} ›")
                    } else {
                        format!("  {value}  ")
                    },
                    value_style,
                ),
            ])
        })
        .collect();

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        format!("High score: {}", app.view.high_score),
        Style::default().fg(Color::Magenta),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    legend("(↑↓) field / (←→) change / (enter) start / (esc)ape").render(chunks[6], buf);
}

pub fn render_loading(_app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = centered_column(
        area,
        &[
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Min(0),
        ],
    );

    Paragraph::new(Span::styled(
        "Loading questions...",
        dim_bold().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);
}

pub fn render_question(app: &App, area: Rect, buf: &mut Buffer) {
    let engine = &app.engine;
    let Some(question) = engine.current_question() else {
        return;
    };
    let total = engine.questions().len();
    let index = engine.current_index();
    let revealed = engine.phase() == Phase::Playing(Turn::Revealed);

    let chunks = centered_column(
        area,
        &[
            Constraint::Length(1), // status
            Constraint::Length(1), // progress
            Constraint::Length(1),
            Constraint::Min(3),    // question
            Constraint::Length(engine.choices().len() as u16 + 1),
            Constraint::Length(1), // feedback
            Constraint::Length(1), // legend
        ],
    );

    let time_style = if app.view.time_remaining <= LOW_TIME {
        bold().fg(Color::Red)
    } else {
        bold()
    };
    Paragraph::new(Line::from(vec![
        Span::styled(format!("Question {}/{}", index + 1, total), bold()),
        Span::raw("   "),
        Span::styled(format!("Score {}", engine.score()), bold().fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled(format!("{}s", app.view.time_remaining), time_style),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let ratio = if total == 0 {
        0.0
    } else {
        index as f64 / total as f64
    };
    Gauge::default()
        .gauge_style(Style::default().fg(Color::Magenta))
        .ratio(ratio.clamp(0.0, 1.0))
        .label("")
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(decode_entities(&question.text), bold()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    let lines: Vec<Line> = engine
        .choices()
        .iter()
        .enumerate()
        .map(|(i, choice)| {
            let mark = app
                .view
                .marks
                .get(i)
                .copied()
                .unwrap_or(ChoiceMark::Unmarked);
            let mut style = match mark {
                ChoiceMark::Correct => bold().fg(Color::Green),
                ChoiceMark::Incorrect => bold().fg(Color::Red),
                ChoiceMark::Unmarked if revealed => dim_bold(),
                ChoiceMark::Unmarked => bold(),
            };
            if !revealed && i == app.cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(Span::styled(
                format!("{}. {}", i + 1, decode_entities(choice)),
                style,
            ))
        })
        .collect();

    Paragraph::new(lines)
        .alignment(Alignment::Left)
        .render(chunks[4], buf);

    if revealed {
        let feedback = match engine.results().last() {
            Some(_) if app.view.timed_out => Span::styled("Time up!", bold().fg(Color::Yellow)),
            Some(r) if r.was_correct => Span::styled(
                format!("Correct! +{POINTS_PER_CORRECT}"),
                bold().fg(Color::Green),
            ),
            Some(r) => Span::styled(
                format!("Wrong, the answer was {}", decode_entities(&r.correct_answer)),
                bold().fg(Color::Red),
            ),
            None => Span::raw(""),
        };
        Paragraph::new(feedback)
            .alignment(Alignment::Center)
            .render(chunks[5], buf);

        let next = if index + 1 >= total {
            "(n)ext: see results / (esc)ape"
        } else {
            "(n)ext question / (esc)ape"
        };
        legend(next).render(chunks[6], buf);
    } else {
        legend("(↑↓) move / (enter) answer / (1-9) pick / (esc)ape").render(chunks[6], buf);
    }
}

pub fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(summary) = app.view.summary.as_ref() else {
        return;
    };

    let chunks = centered_column(
        area,
        &[
            Constraint::Length(1), // score
            Constraint::Length(1), // stats
            Constraint::Length(1), // high score banner
            Constraint::Length(1),
            Constraint::Min(1), // breakdown
            Constraint::Length(1),
            Constraint::Length(1), // legend
        ],
    );

    Paragraph::new(Span::styled(
        format!("Final score: {}", summary.score),
        bold().fg(Color::Cyan),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Paragraph::new(Span::styled(
        format!(
            "{}/{} correct   {}% acc",
            summary.correct_count, summary.total, summary.accuracy
        ),
        bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let banner = if summary.is_new_high_score {
        Span::styled("New high score!", bold().fg(Color::Yellow))
    } else {
        Span::styled(
            format!("High score: {}", summary.high_score),
            Style::default().fg(Color::Magenta),
        )
    };
    Paragraph::new(banner)
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let lines: Vec<Line> = summary
        .breakdown
        .iter()
        .map(|line| {
            let color = if line.was_correct {
                Color::Green
            } else {
                Color::Red
            };
            Line::from(vec![
                Span::styled(format!("{} ", line.marker()), bold().fg(color)),
                Span::styled(format!("Question {}: ", line.number), dim_bold()),
                Span::raw(line.text.clone()),
            ])
        })
        .collect();

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::TOP).title("Breakdown"))
        .render(chunks[4], buf);

    legend("(p)lay again / (c)hange category / (esc)ape").render(chunks[6], buf);
}

pub fn render_error(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = centered_column(
        area,
        &[
            Constraint::Percentage(40),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ],
    );

    Paragraph::new(Span::styled(
        "Could not load questions",
        bold().fg(Color::Red),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    if let Some(error) = app.engine.last_error() {
        Paragraph::new(Span::styled(error.to_string(), italic().fg(Color::Gray)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[2], buf);
    }

    legend("(r)etry / (c)hange category / (esc)ape").render(chunks[4], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::engine::SessionEngine;
    use crate::highscore::MemoryHighScoreStore;
    use crate::model::{Question, Settings};
    use crate::provider::mock::{MockProvider, Scripted};
    use std::sync::Arc;
    use std::time::Duration;

    fn create_test_app(script: Vec<Scripted>, high_score: u32) -> App {
        let engine = SessionEngine::new(
            Arc::new(MockProvider::new(script)),
            Box::new(MemoryHighScoreStore::with_value(high_score)),
        )
        .with_seed(11);
        App::new(engine, Config::default())
    }

    fn one_question() -> Vec<Scripted> {
        vec![Scripted::Questions(vec![Question::new(
            "Who wrote &quot;Hamlet&quot;?",
            "Shakespeare",
            vec!["Dickens", "Austen", "Tolstoy"],
        )])]
    }

    fn rendered(app: &App) -> String {
        let area = Rect::new(0, 0, 100, 30);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_setup_screen_shows_high_score() {
        let app = create_test_app(one_question(), 450);
        let text = rendered(&app);
        assert!(text.contains("High score: 450"));
        assert!(text.contains("Any Category"));
    }

    #[test]
    fn test_question_screen_decodes_text() {
        let mut app = create_test_app(one_question(), 0);
        app.engine.start_session(Settings::default());
        app.pump_events();

        let text = rendered(&app);
        assert!(text.contains("Who wrote \"Hamlet\"?"));
        assert!(text.contains("Shakespeare"));
        assert!(text.contains("Question 1/1"));
        assert!(text.contains("30s"));
    }

    #[test]
    fn test_revealed_screen_shows_feedback() {
        let mut app = create_test_app(one_question(), 0);
        app.engine.start_session(Settings::default());
        app.engine.tick(Duration::from_secs(30));
        app.pump_events();

        let text = rendered(&app);
        assert!(text.contains("Time up!"));
        assert!(text.contains("see results"));
    }

    #[test]
    fn test_correct_answer_feedback_shows_reward() {
        let mut app = create_test_app(one_question(), 0);
        app.engine.start_session(Settings::default());
        app.engine.submit_answer("Shakespeare");
        app.pump_events();

        let text = rendered(&app);
        assert!(text.contains(&format!("Correct! +{POINTS_PER_CORRECT}")));
    }

    #[test]
    fn test_results_screen_shows_breakdown() {
        let mut app = create_test_app(one_question(), 0);
        app.engine.start_session(Settings::default());
        app.engine.submit_answer("Shakespeare");
        app.engine.advance();
        app.pump_events();

        let text = rendered(&app);
        assert!(text.contains("Final score: 100"));
        assert!(text.contains("1/1 correct"));
        assert!(text.contains("100% acc"));
        assert!(text.contains("New high score!"));
        assert!(text.contains("Question 1: Who wrote \"Hamlet\"?..."));
    }

    #[test]
    fn test_error_screen_offers_retry() {
        let mut app = create_test_app(vec![Scripted::ResponseCode(5)], 0);
        app.engine.start_session(Settings::default());
        app.pump_events();

        let text = rendered(&app);
        assert!(text.contains("Could not load questions"));
        assert!(text.contains("(r)etry"));
    }

    #[test]
    fn test_small_area_does_not_panic() {
        let mut app = create_test_app(one_question(), 0);
        app.engine.start_session(Settings::default());
        app.pump_events();
        let area = Rect::new(0, 0, 20, 5);
        let mut buffer = Buffer::empty(area);
        (&app).render(area, &mut buffer);
        assert!(*buffer.area() == area);
    }
}
