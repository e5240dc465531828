use std::cell::Cell;
use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Key presses the timer cares about
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyInput {
    /// Starts a solve, skips the countdown, stops the stopwatch
    Space,
    /// Leaves the live loop (only honoured while idle)
    Escape,
    /// Ctrl+C. Raw mode turns it into a key press instead of SIGINT.
    Interrupt,
    Other,
}

impl KeyInput {
    /// Map a crossterm key event. Releases and repeats are dropped.
    pub fn from_key_event(key: KeyEvent) -> Option<Self> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        let input = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                KeyInput::Interrupt
            }
            KeyCode::Char(' ') => KeyInput::Space,
            KeyCode::Esc => KeyInput::Escape,
            _ => KeyInput::Other,
        };
        Some(input)
    }
}

/// Non-blocking source of key presses, polled once per tick
pub trait KeyReader {
    fn poll(&mut self) -> io::Result<Option<KeyInput>>;
}

impl<K: KeyReader + ?Sized> KeyReader for &mut K {
    fn poll(&mut self) -> io::Result<Option<KeyInput>> {
        (**self).poll()
    }
}

/// Production key reader using crossterm
#[derive(Debug, Default)]
pub struct CrosstermKeyReader;

impl CrosstermKeyReader {
    pub fn new() -> Self {
        Self
    }
}

impl KeyReader for CrosstermKeyReader {
    fn poll(&mut self) -> io::Result<Option<KeyInput>> {
        // Drain resize/focus events so they don't hide a pending key.
        while event::poll(Duration::ZERO)? {
            if let CtEvent::Key(key) = event::read()? {
                if let Some(input) = KeyInput::from_key_event(key) {
                    return Ok(Some(input));
                }
            }
        }
        Ok(None)
    }
}

/// Test key reader replaying a fixed script, one entry per poll.
///
/// `None` entries are ticks without a key. Once the script runs out every
/// poll yields `Interrupt`, so a loop under test always terminates.
#[derive(Debug, Default)]
pub struct ScriptedKeyReader {
    script: VecDeque<Option<KeyInput>>,
}

impl ScriptedKeyReader {
    pub fn new<I: IntoIterator<Item = Option<KeyInput>>>(script: I) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Append `ticks` idle polls
    pub fn idle(mut self, ticks: usize) -> Self {
        self.script.extend(std::iter::repeat(None).take(ticks));
        self
    }

    pub fn key(mut self, key: KeyInput) -> Self {
        self.script.push_back(Some(key));
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl KeyReader for ScriptedKeyReader {
    fn poll(&mut self) -> io::Result<Option<KeyInput>> {
        Ok(self.script.pop_front().unwrap_or(Some(KeyInput::Interrupt)))
    }
}

/// Monotonic time plus the sleep that paces the loop
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, interval: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, interval: Duration) {
        (**self).sleep(interval)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, interval: Duration) {
        std::thread::sleep(interval)
    }
}

/// Deterministic clock for tests: `sleep` advances time instead of blocking
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn sleep(&self, interval: Duration) {
        self.advance(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    #[test]
    fn maps_space_escape_and_ctrl_c() {
        let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let plain_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);

        assert_eq!(KeyInput::from_key_event(space), Some(KeyInput::Space));
        assert_eq!(KeyInput::from_key_event(esc), Some(KeyInput::Escape));
        assert_eq!(KeyInput::from_key_event(ctrl_c), Some(KeyInput::Interrupt));
        assert_eq!(KeyInput::from_key_event(plain_c), Some(KeyInput::Other));
    }

    #[test]
    fn ignores_key_release() {
        let release = KeyEvent {
            code: KeyCode::Char(' '),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(KeyInput::from_key_event(release), None);
    }

    #[test]
    fn scripted_reader_replays_then_interrupts() {
        let mut keys = ScriptedKeyReader::default()
            .key(KeyInput::Space)
            .idle(2)
            .key(KeyInput::Escape);
        assert_eq!(keys.remaining(), 4);

        assert_eq!(keys.poll().unwrap(), Some(KeyInput::Space));
        assert_eq!(keys.poll().unwrap(), None);
        assert_eq!(keys.poll().unwrap(), None);
        assert_eq!(keys.poll().unwrap(), Some(KeyInput::Escape));
        assert_eq!(keys.poll().unwrap(), Some(KeyInput::Interrupt));
    }

    #[test]
    fn manual_clock_sleep_advances_time() {
        let clock = ManualClock::new();
        let start = clock.now();
        clock.sleep(Duration::from_millis(10));
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now() - start, Duration::from_millis(1010));
    }
}
