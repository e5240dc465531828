use std::io::{self, stdin};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::tty::IsTty;
use itertools::Itertools;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sctimer::{
    app::{App, ExitType},
    app_dirs::AppDirs,
    config::{Config, RuntimeSettings},
    error::LogError,
    runtime::{CrosstermKeyReader, SystemClock},
    session::ExportOutcome,
    solve_log::SolveLog,
    stats::Report,
    ui::screen::TuiScreen,
};

const MISSING_LOG_HINT: &str = "There is no such times' file. Pass '-h' for help.";
const INTERRUPTED_EXIT: u8 = 130;

/// terminal timer for speedcubing with countdown, solve log and rolling averages
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal timer for speedcubing. Press space to start (a 15 second inspection countdown runs first unless disabled), space again to stop, and escape to quit and export the session."
)]
pub struct Cli {
    /// omit the inspection countdown
    #[clap(short = 'c', long)]
    no_countdown: bool,

    /// file where solve times are exported and read from
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// print solve time stats instead of starting the timer
    #[clap(short = 's', long)]
    stats: bool,

    /// use a different configuration file
    #[clap(short = 'o', long)]
    config: Option<PathBuf>,

    /// print stats as JSON
    #[clap(long, requires = "stats")]
    json: bool,

    /// enable debug logging on stderr
    #[clap(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    fn settings(&self) -> RuntimeSettings {
        // Problems are already reported as warnings.
        let (config, _problems) =
            Config::load_or_default(self.config.as_deref(), AppDirs::config_path().as_deref());

        RuntimeSettings::resolve(
            &config,
            self.no_countdown,
            self.file.as_deref(),
            AppDirs::data_dir().as_deref(),
        )
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = cli.settings();
    debug!(?settings, "resolved settings");

    if cli.stats {
        return print_stats(&settings.export_path, cli.json);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    run_timer(settings)
}

fn print_stats(path: &Path, json: bool) -> Result<ExitCode> {
    let report = match Report::from_log(&SolveLog::new(path)) {
        Ok(report) => report,
        Err(LogError::NotFound(_)) => {
            eprintln!("{MISSING_LOG_HINT}");
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err).context("failed to read solve statistics"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(ExitCode::SUCCESS)
}

fn run_timer(settings: RuntimeSettings) -> Result<ExitCode> {
    let screen = TuiScreen::stdout().context("failed to set up the terminal")?;
    let mut app = App::new(CrosstermKeyReader::new(), screen, SystemClock, settings);

    let outcome = app.run();
    let exit = match &outcome {
        Ok(exit) => *exit,
        Err(_) => ExitType::Failed,
    };
    let report = app.shutdown(exit);

    if let Some(err) = &report.restore_error {
        eprintln!("Failed to restore the terminal: {err}");
    }

    match &report.export {
        ExportOutcome::Written(record) => {
            println!(
                "Your solves for this session: {}",
                record.times.iter().join(", ")
            );
        }
        ExportOutcome::Failed(err) => eprintln!("Could not export the session: {err}"),
        ExportOutcome::Skipped => {}
    }
    if let Some(unsaved) = report.unsaved() {
        eprintln!("Unsaved solves: {}", unsaved.iter().join(", "));
    }

    outcome.context("terminal error in the timer loop")?;

    Ok(match report.exit {
        ExitType::Interrupted => ExitCode::from(INTERRUPTED_EXIT),
        ExitType::Quit | ExitType::Failed => ExitCode::SUCCESS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["sctimer"]);

        assert!(!cli.no_countdown);
        assert_eq!(cli.file, None);
        assert!(!cli.stats);
        assert_eq!(cli.config, None);
        assert!(!cli.json);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_short_and_long_flags() {
        let cli = Cli::parse_from(["sctimer", "-c", "-s", "-f", "mine.txt", "-o", "alt.toml"]);
        assert!(cli.no_countdown);
        assert!(cli.stats);
        assert_eq!(cli.file, Some(PathBuf::from("mine.txt")));
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));

        let cli = Cli::parse_from([
            "sctimer",
            "--no-countdown",
            "--stats",
            "--file",
            "mine.txt",
            "--config",
            "alt.toml",
            "--json",
            "--verbose",
        ]);
        assert!(cli.no_countdown);
        assert!(cli.json);
        assert!(cli.verbose);
    }

    #[test]
    fn test_json_requires_stats() {
        assert!(Cli::try_parse_from(["sctimer", "--json"]).is_err());
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
