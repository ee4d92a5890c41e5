// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod categories;
pub mod config;
pub mod countdown;
pub mod engine;
pub mod error;
pub mod highscore;
pub mod html;
pub mod logging;
pub mod model;
pub mod provider;
pub mod runtime;
pub mod ui;
