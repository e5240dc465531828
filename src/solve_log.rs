//! Append-only solve log.
//!
//! One exported session per line:
//!
//! ```text
//! line  := date ':' ws? '[' items? ']' ws?
//! date  := YYYY-MM-DD
//! items := item (',' ws? item)*
//! item  := quote time quote | time        quote is ' or "
//! time  := seconds | minutes ':' seconds  e.g. 9.53, 1:05.32
//! ```
//!
//! Newest records are appended at the end of the file. Lines are parsed
//! independently and a malformed line never hides the rest of the log.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use itertools::Itertools;
use tracing::{debug, warn};

use crate::error::{LogError, ParseError};
use crate::format::SolveTime;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One exported session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveRecord {
    pub date: NaiveDate,
    pub times: Vec<SolveTime>,
}

impl SolveRecord {
    pub fn new(date: NaiveDate, times: Vec<SolveTime>) -> Self {
        Self { date, times }
    }

    /// Dated with today's local date, the export date of the session
    pub fn today(times: Vec<SolveTime>) -> Self {
        Self::new(Local::now().date_naive(), times)
    }
}

impl fmt::Display for SolveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: [{}]",
            self.date.format(DATE_FORMAT),
            self.times.iter().map(|t| format!("'{t}'")).join(", ")
        )
    }
}

impl FromStr for SolveRecord {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        LineParser::new(line).record()
    }
}

struct LineParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> LineParser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn column(&self) -> usize {
        self.pos + 1
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        if self.peek() == Some(expected) {
            self.bump();
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected,
                column: self.column(),
            })
        }
    }

    fn record(mut self) -> Result<SolveRecord, ParseError> {
        self.skip_ws();
        let date = self.date()?;
        self.expect(':')?;
        self.skip_ws();
        self.expect('[')?;
        self.skip_ws();

        let mut times = Vec::new();
        if self.peek() != Some(']') {
            loop {
                times.push(self.item()?);
                self.skip_ws();
                if self.peek() != Some(',') {
                    break;
                }
                self.bump();
                self.skip_ws();
            }
        }

        self.expect(']')?;
        self.skip_ws();
        if !self.rest().is_empty() {
            return Err(ParseError::TrailingInput(self.column()));
        }

        Ok(SolveRecord { date, times })
    }

    // Dates contain no ':', so the first one ends the date.
    fn date(&mut self) -> Result<NaiveDate, ParseError> {
        let end = self.rest().find(':').ok_or(ParseError::Expected {
            expected: ':',
            column: self.src.len() + 1,
        })?;
        let raw = self.rest()[..end].trim();
        let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map_err(|_| ParseError::InvalidDate(raw.to_string()))?;
        self.pos += end;
        Ok(date)
    }

    fn item(&mut self) -> Result<SolveTime, ParseError> {
        match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                let opened_at = self.column();
                self.bump();
                let close = self
                    .rest()
                    .find(quote)
                    .ok_or(ParseError::UnterminatedQuote(opened_at))?;
                let raw = &self.rest()[..close];
                self.pos += close + quote.len_utf8();
                raw.parse()
            }
            _ => {
                let end = self
                    .rest()
                    .find(|c| c == ',' || c == ']')
                    .unwrap_or(self.rest().len());
                let raw = &self.rest()[..end];
                self.pos += end;
                raw.parse()
            }
        }
    }
}

/// The most recent `max_count` solves across `records`, newest record first.
///
/// Records are visited newest first; each contributes its newest solves in
/// their original in-session order.
pub fn recent_solves(records: &[SolveRecord], max_count: usize) -> Vec<SolveTime> {
    let mut remaining = max_count;
    let mut picked: Vec<&[SolveTime]> = Vec::new();

    for record in records.iter().rev() {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(record.times.len());
        picked.push(&record.times[record.times.len() - take..]);
        remaining -= take;
    }

    picked.concat()
}

/// Text file of solve records, opened only for the duration of each call
#[derive(Debug, Clone)]
pub struct SolveLog {
    path: PathBuf,
}

impl SolveLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Append one record, creating the file if needed. Retries once.
    pub fn append(&self, record: &SolveRecord) -> Result<(), LogError> {
        if let Err(first) = self.try_append(record) {
            warn!(path = %self.path.display(), error = %first, "append failed, retrying");
            self.try_append(record).map_err(|source| LogError::Append {
                path: self.path.clone(),
                source,
            })?;
        }
        debug!(path = %self.path.display(), solves = record.times.len(), "appended record");
        Ok(())
    }

    fn try_append(&self, record: &SolveRecord) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)?;

        // A hand-edited file may lack its final newline.
        if file.metadata()?.len() > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                file.write_all(b"\n")?;
            }
        }

        writeln!(file, "{}", record)?;
        file.flush()
    }

    /// Every parseable record in file order. Malformed lines are skipped.
    pub fn records(&self) -> Result<Vec<SolveRecord>, LogError> {
        let content = fs::read(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                LogError::NotFound(self.path.clone())
            } else {
                LogError::Read {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        // Decoded line by line so one bad byte only costs its own line.
        let records = content
            .split(|&b| b == b'\n')
            .enumerate()
            .filter(|(_, line)| !line.iter().all(u8::is_ascii_whitespace))
            .filter_map(|(idx, line)| match parse_line(line) {
                Ok(record) => Some(record),
                Err(error) => {
                    warn!(
                        path = %self.path.display(),
                        line = idx + 1,
                        %error,
                        "skipping malformed solve log line"
                    );
                    None
                }
            })
            .collect();

        Ok(records)
    }

    /// The `max_count` most recent solves, newest record first.
    pub fn read_recent(&self, max_count: usize) -> Result<Vec<SolveTime>, LogError> {
        Ok(recent_solves(&self.records()?, max_count))
    }
}

fn parse_line(line: &[u8]) -> Result<SolveRecord, ParseError> {
    std::str::from_utf8(line)
        .map_err(|_| ParseError::NotUtf8)?
        .parse()
}
