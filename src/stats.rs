//! Rolling averages over the solve log.
//!
//! Averages of 5 and more drop exactly one best and one worst solve before
//! taking the mean, the way competition averages are computed. Ties are
//! broken by position, so duplicates of an extreme value stay in the set.

use std::fmt;

use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

use crate::error::LogError;
use crate::format::SolveTime;
use crate::solve_log::{recent_solves, SolveLog, SolveRecord};

/// Window sizes reported in stats mode
pub const BUCKETS: [usize; 4] = [3, 5, 12, 100];
/// How many raw solves stats mode lists
pub const LAST_SOLVES_SHOWN: usize = 5;
/// Shown instead of an average when there are not enough solves
pub const INSUFFICIENT_DATA: &str = "--:--";

fn mean_secs(centis: impl Iterator<Item = u64>) -> Option<f64> {
    let (sum, count) = centis.fold((0u128, 0usize), |(sum, count), c| {
        (sum + u128::from(c), count + 1)
    });

    (count > 0).then(|| sum as f64 / count as f64 / 100.0)
}

fn round_to_centis(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}

fn format_average(average: Option<f64>) -> String {
    average.map_or_else(|| INSUFFICIENT_DATA.to_string(), |avg| format!("{:.2}", avg))
}

/// Average of the first `n` solves of `source`.
///
/// `None` when `n < 3` or fewer than `n` solves are available. For `n == 3`
/// this is the plain mean; above that the first minimum and the last
/// maximum are removed before averaging the remaining `n - 2`.
pub fn trimmed_mean(n: usize, source: &[SolveTime]) -> Option<f64> {
    if n < 3 || source.len() < n {
        return None;
    }
    let window = &source[..n];

    if n == 3 {
        return mean_secs(window.iter().map(|t| t.centis()));
    }

    let MinMaxResult::MinMax(best, worst) = window.iter().position_minmax() else {
        return None;
    };

    mean_secs(
        window
            .iter()
            .enumerate()
            .filter(|&(idx, _)| idx != best && idx != worst)
            .map(|(_, t)| t.centis()),
    )
}

/// Formatted average: two decimals, or `--:--` when there is not enough data.
///
/// Averages of a minute or more keep the plain seconds form (`75.00`).
pub fn average(n: usize, source: &[SolveTime]) -> String {
    format_average(trimmed_mean(n, source).map(round_to_centis))
}

/// Average over the most recent `solves` solves
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketAverage {
    pub solves: usize,
    pub average: Option<f64>,
}

impl BucketAverage {
    pub fn display_value(&self) -> String {
        format_average(self.average)
    }
}

/// Everything stats mode prints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub last_solves: Vec<SolveTime>,
    pub averages: Vec<BucketAverage>,
}

impl Report {
    pub fn from_records(records: &[SolveRecord]) -> Self {
        let averages = BUCKETS
            .iter()
            .map(|&n| BucketAverage {
                solves: n,
                average: trimmed_mean(n, &recent_solves(records, n)).map(round_to_centis),
            })
            .collect();

        Self {
            last_solves: recent_solves(records, LAST_SOLVES_SHOWN),
            averages,
        }
    }

    pub fn from_log(log: &SolveLog) -> Result<Self, LogError> {
        Ok(Self::from_records(&log.records()?))
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.averages.len() + 1);
        lines.push(format!(
            "Your last {} solves are: {}",
            LAST_SOLVES_SHOWN,
            self.last_solves.iter().join(", ")
        ));
        lines.extend(self.averages.iter().map(|bucket| {
            format!(
                "Your average of the last {} solves is: {}",
                bucket.solves,
                bucket.display_value()
            )
        }));
        lines
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}
