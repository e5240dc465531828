// Library surface for the binary and the headless integration tests.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod runtime;
pub mod session;
pub mod solve_log;
pub mod stats;
pub mod ui;
