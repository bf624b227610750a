use std::{fmt, str::FromStr};

use anyhow::{bail, Context, Result};
use itertools::Itertools;
use nom::{
    character::complete::{space0, space1},
    multi::separated_list1,
    sequence::delimited,
    IResult,
};
use nom_supreme::error::ErrorTree;
use thiserror::Error;
use util::{parse_nice, parse_number, Span};

/// Largest allowed step between adjacent levels.
const MAX_STEP: i128 = 3;

/// One line of input: the levels of a single reactor report.
///
/// Levels are parsed as `i64` and widened, so differences and negation
/// cannot overflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    levels: Vec<i128>,
}

#[derive(Error, Debug)]
#[error("empty report")]
pub struct EmptyReport;

impl TryFrom<Vec<i64>> for Report {
    type Error = EmptyReport;

    fn try_from(levels: Vec<i64>) -> Result<Self, Self::Error> {
        if levels.is_empty() {
            return Err(EmptyReport);
        }

        Ok(Self {
            levels: levels.into_iter().map(i128::from).collect(),
        })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.levels.iter().join(" "))
    }
}

fn parse_report(i: Span) -> IResult<Span, Vec<i64>, ErrorTree<Span>> {
    delimited(space0, separated_list1(space1, parse_number), space0)(i)
}

impl FromStr for Report {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            bail!(EmptyReport);
        }

        let levels = parse_nice(s, parse_report)?;

        Ok(Self::try_from(levels)?)
    }
}

impl Report {
    pub fn levels(&self) -> &[i128] {
        &self.levels
    }

    fn differences(&self) -> impl Iterator<Item = i128> + '_ {
        self.levels.iter().tuple_windows().map(|(a, b)| b - a)
    }

    /// Strictly increasing with every step in `1..=MAX_STEP`. Reports with
    /// fewer than two levels have no steps and pass trivially.
    pub fn is_monotonic_safe(&self) -> bool {
        self.differences().all(|d| (1..=MAX_STEP).contains(&d))
    }

    /// Flips the report so it is presumed increasing.
    ///
    /// The direction is picked by weighting each difference with its index:
    /// indices of non-negative steps are summed against indices of
    /// non-positive steps (a zero step counts for both), and the report is
    /// negated when the non-negative side is smaller. The first step has
    /// weight zero, so e.g. `4 3` stays as it is.
    pub fn normalize_direction(&self) -> Report {
        let (rising, falling) = self.differences().enumerate().fold(
            (0usize, 0usize),
            |(rising, falling), (i, d)| {
                (
                    if d >= 0 { rising + i } else { rising },
                    if d <= 0 { falling + i } else { falling },
                )
            },
        );

        if rising < falling {
            Report {
                levels: self.levels.iter().map(|level| -level).collect(),
            }
        } else {
            self.clone()
        }
    }

    pub fn is_safe(&self) -> bool {
        self.normalize_direction().is_monotonic_safe()
    }

    fn without(&self, index: usize) -> Report {
        let mut levels = self.levels.clone();
        levels.remove(index);
        Report { levels }
    }

    /// Tries dropping each level in turn, stopping at the first candidate
    /// that is safe.
    pub fn is_safe_with_one_removal(&self) -> bool {
        let found = (0..self.levels.len()).find(|&i| self.without(i).is_safe());

        #[cfg(debug_assertions)]
        if let Some(i) = found {
            eprintln!("{self}: safe without index {i}");
        }

        found.is_some()
    }
}

/// Parses every line, failing on the first bad one.
pub fn get_reports(input: impl Iterator<Item = impl Into<String>>) -> Result<Vec<Report>> {
    input
        .enumerate()
        .map(|(n, line)| {
            let line: String = line.into();
            line.parse::<Report>()
                .with_context(|| format!("line {}", n + 1))
        })
        .collect()
}

pub fn count_strictly_safe_reports(reports: &[Report]) -> usize {
    reports.iter().filter(|report| report.is_safe()).count()
}

pub fn count_safe_reports(reports: &[Report]) -> usize {
    reports
        .iter()
        .filter(|report| report.is_safe() || report.is_safe_with_one_removal())
        .count()
}

pub fn get_num_safe(input: &str) -> Result<usize> {
    Ok(count_strictly_safe_reports(&get_reports(input.lines())?))
}

pub fn get_num_safe_dampened(input: &str) -> Result<usize> {
    Ok(count_safe_reports(&get_reports(input.lines())?))
}
