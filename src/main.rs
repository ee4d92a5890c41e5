use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::KeyEventKind,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use kwiz::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    engine::SessionEngine,
    highscore::{HighScoreStore, MemoryHighScoreStore, SqliteHighScoreStore},
    logging,
    model::Difficulty,
    provider::OpenTdbProvider,
    runtime::{spawn_fetch, CrosstermEventSource, FixedTicker, QuizEvent, Runner},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{info, warn};

const TICK_RATE_MS: u64 = 100;

/// timed multiple-choice trivia in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Timed multiple-choice trivia in the terminal. Questions come from the Open Trivia Database; your best score is kept between runs."
)]
pub struct Cli {
    /// question-bank category id (9 = General Knowledge, 21 = Sports, ...)
    #[clap(long)]
    category: Option<String>,

    /// question difficulty: easy, medium or hard
    #[clap(short = 'd', long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,

    /// number of questions per session (1-50)
    #[clap(short = 'n', long)]
    amount: Option<u32>,

    /// base URL of the question bank
    #[clap(long)]
    api_url: Option<String>,

    /// print the stored high score and exit
    #[clap(long)]
    high_score: bool,
}

fn parse_difficulty(token: &str) -> Result<Difficulty, String> {
    Difficulty::parse(token).ok_or_else(|| format!("expected easy, medium or hard, got '{token}'"))
}

impl Cli {
    /// Overlay command-line settings on the persisted preferences
    fn apply(&self, config: &mut Config) {
        if let Some(category) = &self.category {
            config.category = Some(category.clone());
        }
        if self.difficulty.is_some() {
            config.difficulty = self.difficulty;
        }
        if let Some(amount) = self.amount {
            config.amount = amount;
        }
    }

    fn api_url(&self, config: &Config) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| config.api_url.clone())
    }
}

fn open_store() -> Box<dyn HighScoreStore> {
    match SqliteHighScoreStore::open_default() {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(error = %e, "high score store unavailable, keeping scores in memory");
            Box::new(MemoryHighScoreStore::default())
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let _log_guard = AppDirs::log_dir().and_then(|dir| logging::init(&dir).ok());

    if cli.high_score {
        let store = SqliteHighScoreStore::open_default()?;
        println!("{}", store.get());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    cli.apply(&mut config);

    let provider = OpenTdbProvider::new(&cli.api_url(&config))?;
    info!(base_url = provider.base_url(), "starting kwiz");
    let engine = SessionEngine::new(Arc::new(provider), open_store());
    let mut app = App::new(engine, config).with_config_store(Box::new(config_store));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut last_tick = Instant::now();

    terminal.draw(|f| ui(app, f))?;

    loop {
        let event = runner.step();

        // wall-clock time reaches the countdown on every wake, keys included
        let now = Instant::now();
        app.on_tick(now.duration_since(last_tick));
        last_tick = now;

        match event {
            QuizEvent::Tick | QuizEvent::Resize => {}
            QuizEvent::Key(key) => {
                if key.kind == KeyEventKind::Press {
                    if let Some(request) = app.on_key(key) {
                        spawn_fetch(app.engine.provider(), request, runner.sender());
                    }
                }
            }
            QuizEvent::Loaded { ticket, result } => app.on_loaded(ticket, result),
        }

        if app.should_quit {
            break;
        }

        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
