use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::engine::{clamp_score, ScoringError};
use crate::rubric::RubricDefinition;

/// A raw value typed into a score field, before clamping.
///
/// Text is parsed leniently: leading whitespace and an optional sign are
/// accepted, then as many digits as follow ("7 points" -> 7, "3.9" -> 3).
/// Anything without leading digits is 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawScore<'a> {
    Text(&'a str),
    Integer(i64),
    Number(f64),
}

impl RawScore<'_> {
    pub fn to_integer(&self) -> i64 {
        match self {
            RawScore::Text(s) => parse_leading_integer(s),
            RawScore::Integer(n) => *n,
            RawScore::Number(f) if f.is_finite() => f.trunc() as i64,
            RawScore::Number(_) => 0,
        }
    }
}

impl<'a> From<&'a str> for RawScore<'a> {
    fn from(s: &'a str) -> Self {
        RawScore::Text(s)
    }
}

impl<'a> From<&'a String> for RawScore<'a> {
    fn from(s: &'a String) -> Self {
        RawScore::Text(s.as_str())
    }
}

impl From<i64> for RawScore<'_> {
    fn from(n: i64) -> Self {
        RawScore::Integer(n)
    }
}

impl From<i32> for RawScore<'_> {
    fn from(n: i32) -> Self {
        RawScore::Integer(n as i64)
    }
}

impl From<u32> for RawScore<'_> {
    fn from(n: u32) -> Self {
        RawScore::Integer(n as i64)
    }
}

impl From<f64> for RawScore<'_> {
    fn from(f: f64) -> Self {
        RawScore::Number(f)
    }
}

fn parse_leading_integer(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for c in digits.chars() {
        match c.to_digit(10) {
            Some(d) => value = value.saturating_mul(10).saturating_add(d as i64),
            None => break,
        }
    }

    if negative {
        -value
    } else {
        value
    }
}

/// Scores entered during one session: category key -> sub-criterion index -> points.
///
/// The mapping is sparse. A category or index that is absent has simply not
/// been scored yet and reads as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreEntry(BTreeMap<String, BTreeMap<usize, u32>>);

impl ScoreEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded score, 0 when absent
    pub fn get(&self, category: &str, index: usize) -> u32 {
        self.0
            .get(category)
            .and_then(|subs| subs.get(&index))
            .copied()
            .unwrap_or(0)
    }

    pub fn category(&self, category: &str) -> Option<&BTreeMap<usize, u32>> {
        self.0.get(category)
    }

    /// Clamp `raw` against the rubric and record it. Returns the stored value.
    pub fn set<'a>(
        &mut self,
        rubric: &RubricDefinition,
        category: &str,
        index: usize,
        raw: impl Into<RawScore<'a>>,
    ) -> Result<u32, ScoringError> {
        let value = clamp_score(rubric, category, index, raw)?;
        self.0
            .entry(category.to_string())
            .or_default()
            .insert(index, value);
        Ok(value)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|subs| subs.is_empty())
    }

    /// Iterate recorded (category, index, value) triples
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize, u32)> {
        self.0
            .iter()
            .flat_map(|(k, subs)| subs.iter().map(move |(i, v)| (k.as_str(), *i, *v)))
    }
}
