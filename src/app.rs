//! The live loop: one object owning the session, the clock, the key reader
//! and the screen, with a single shutdown path.

use std::io;

use tracing::{debug, info, warn};

use crate::clock::{Phase, SessionClock, TICK_INTERVAL};
use crate::config::RuntimeSettings;
use crate::format::SolveTime;
use crate::runtime::{Clock, KeyInput, KeyReader};
use crate::session::{ExportOutcome, Session};
use crate::solve_log::SolveLog;
use crate::ui::screen::Screen;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ExitType {
    /// Escape while idle: the session is exported
    Quit,
    /// Ctrl+C from any state: the session is discarded
    Interrupted,
    /// The terminal failed under the loop: the session is kept for printing
    Failed,
}

/// Result of the shutdown path
#[derive(Debug)]
pub struct ShutdownReport {
    pub exit: ExitType,
    pub session: Session,
    pub export: ExportOutcome,
    pub restore_error: Option<io::Error>,
}

impl ShutdownReport {
    /// Solves that were timed but did not reach the log
    pub fn unsaved(&self) -> Option<&[SolveTime]> {
        match (&self.export, self.exit) {
            (ExportOutcome::Written(_), _) | (_, ExitType::Interrupted) => None,
            _ if self.session.is_empty() => None,
            (ExportOutcome::Skipped, ExitType::Quit) => None,
            _ => Some(self.session.solves()),
        }
    }
}

pub struct App<K: KeyReader, S: Screen, C: Clock> {
    keys: K,
    screen: S,
    clock: C,
    timer: SessionClock,
    session: Session,
    settings: RuntimeSettings,
}

impl<K: KeyReader, S: Screen, C: Clock> App<K, S, C> {
    pub fn new(keys: K, screen: S, clock: C, settings: RuntimeSettings) -> Self {
        Self {
            keys,
            screen,
            clock,
            timer: SessionClock::new(settings.countdown),
            session: Session::new(),
            settings,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.timer.phase()
    }

    pub fn settings(&self) -> &RuntimeSettings {
        &self.settings
    }

    /// Poll, transition, render and sleep until escape or interrupt.
    pub fn run(&mut self) -> io::Result<ExitType> {
        self.screen.show(&SolveTime::default().to_string())?;
        self.screen.show_session(self.session.solves())?;

        loop {
            let now = self.clock.now();

            match self.keys.poll()? {
                Some(KeyInput::Interrupt) => {
                    let abandoned = self.timer.cancel();
                    info!(%abandoned, "interrupted");
                    return Ok(ExitType::Interrupted);
                }
                Some(KeyInput::Escape) if self.timer.is_idle() => {
                    debug!(solves = self.session.len(), "quit requested");
                    return Ok(ExitType::Quit);
                }
                Some(key) => {
                    if let Some(solve) = self.timer.on_key(key, now) {
                        self.session.push(solve);
                        self.screen.show(&solve.to_string())?;
                        self.screen.show_session(self.session.solves())?;
                    }
                }
                None => {}
            }

            if let Some(text) = self.timer.on_tick(now) {
                self.screen.show(&text)?;
            }

            self.clock.sleep(TICK_INTERVAL);
        }
    }

    /// Restore the screen, then export on a clean quit. Consumes the app so
    /// this runs once.
    pub fn shutdown(mut self, exit: ExitType) -> ShutdownReport {
        let restore_error = self.screen.restore().err();
        if let Some(err) = &restore_error {
            warn!(%err, "failed to restore terminal");
        }

        let export = match exit {
            ExitType::Quit if self.settings.export_always => {
                self.session.export(&SolveLog::new(&self.settings.export_path))
            }
            _ => ExportOutcome::Skipped,
        };

        if let ExportOutcome::Failed(err) = &export {
            warn!(%err, "session export failed");
        }

        ShutdownReport {
            exit,
            session: self.session,
            export,
            restore_error,
        }
    }
}
