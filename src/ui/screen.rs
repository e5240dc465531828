use std::io::{self, Stdout};

use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::format::SolveTime;
use crate::ui::{terminal::TerminalGuard, TimerView};

/// Display boundary of the live loop
pub trait Screen {
    /// Replace the timer line
    fn show(&mut self, text: &str) -> io::Result<()>;
    /// Replace the session line
    fn show_session(&mut self, solves: &[SolveTime]) -> io::Result<()>;
    /// Hand the terminal back. Called once on every exit path.
    fn restore(&mut self) -> io::Result<()>;
}

impl<S: Screen + ?Sized> Screen for &mut S {
    fn show(&mut self, text: &str) -> io::Result<()> {
        (**self).show(text)
    }

    fn show_session(&mut self, solves: &[SolveTime]) -> io::Result<()> {
        (**self).show_session(solves)
    }

    fn restore(&mut self) -> io::Result<()> {
        (**self).restore()
    }
}

/// Full-screen ratatui rendering of a `TimerView`
pub struct TuiScreen<B: Backend> {
    terminal: Terminal<B>,
    view: TimerView,
    guard: Option<TerminalGuard>,
}

impl TuiScreen<CrosstermBackend<Stdout>> {
    /// Take over the real terminal: raw mode, alternate screen, hidden cursor
    pub fn stdout() -> io::Result<Self> {
        let guard = TerminalGuard::enter()?;
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        let mut screen = Self {
            terminal,
            view: TimerView::default(),
            guard: Some(guard),
        };
        screen.draw()?;
        Ok(screen)
    }
}

impl<B: Backend> TuiScreen<B> {
    /// Render into an arbitrary backend without touching the real terminal
    pub fn with_backend(backend: B) -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new(backend)?,
            view: TimerView::default(),
            guard: None,
        })
    }

    pub fn view(&self) -> &TimerView {
        &self.view
    }

    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    fn draw(&mut self) -> io::Result<()> {
        let view = &self.view;
        self.terminal
            .draw(|f| f.render_widget(view, f.area()))
            .map(|_| ())
    }
}

impl<B: Backend> Screen for TuiScreen<B> {
    fn show(&mut self, text: &str) -> io::Result<()> {
        if self.view.timer == text {
            return Ok(());
        }
        self.view.timer = text.to_string();
        self.draw()
    }

    fn show_session(&mut self, solves: &[SolveTime]) -> io::Result<()> {
        self.view.solves = solves.to_vec();
        self.draw()
    }

    fn restore(&mut self) -> io::Result<()> {
        match self.guard.take() {
            Some(mut guard) => guard.restore(),
            None => Ok(()),
        }
    }
}

/// Screen that remembers what it was asked to show
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingScreen {
    pub shown: Vec<String>,
    pub sessions: Vec<Vec<SolveTime>>,
    pub restores: usize,
}

impl RecordingScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_shown(&self) -> Option<&str> {
        self.shown.last().map(String::as_str)
    }
}

impl Screen for RecordingScreen {
    fn show(&mut self, text: &str) -> io::Result<()> {
        self.shown.push(text.to_string());
        Ok(())
    }

    fn show_session(&mut self, solves: &[SolveTime]) -> io::Result<()> {
        self.sessions.push(solves.to_vec());
        Ok(())
    }

    fn restore(&mut self) -> io::Result<()> {
        self.restores += 1;
        Ok(())
    }
}
