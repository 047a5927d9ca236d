//! Metric extraction from probe output
//!
//! Probes talk to the orchestrator through plain text: each one prints lines
//! such as `Total Primes Found: 1234` or `Write Speed: 512.00 MB/s`. An
//! [`Extractor`] holds the line patterns for one probe kind and turns the
//! captured stdout into [`MetricEntry`] values. Extraction is a pure function
//! of the text, so every probe's contract can be tested without spawning
//! anything.
//!
//! Matching is line oriented. For each line the first pattern whose trigger
//! substrings all occur in the line is applied; if its regular expression
//! does not match, or a captured token does not parse as a number, the metric
//! is left out. Lines that trigger nothing are ignored, and stderr is never
//! consulted. Most patterns let a later line overwrite an earlier value;
//! patterns marked `first_match` stop after their first matching line.

mod patterns;

pub use patterns::{pattern_defs, PatternDef};

use crate::{
    error::Result,
    models::{MetricEntry, MetricValue, ProbeKind},
};
use regex::Regex;

/// How a captured token is converted into a metric value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Float,
}

impl ValueKind {
    fn parse(&self, token: &str) -> Option<MetricValue> {
        match self {
            // Counts past i64 keep their digits as text rather than vanish
            ValueKind::Int => match token.parse::<i64>() {
                Ok(v) => Some(MetricValue::Int(v)),
                Err(_) if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) => {
                    Some(MetricValue::Text(token.to_string()))
                }
                Err(_) => None,
            },
            ValueKind::Float => token
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(MetricValue::Float),
        }
    }
}

/// One compiled line pattern
#[derive(Debug, Clone)]
pub struct LinePattern {
    triggers: &'static [&'static str],
    regex: Regex,
    captures: &'static [(&'static str, ValueKind)],
    first_match: bool,
}

impl LinePattern {
    pub fn compile(def: &PatternDef) -> Result<Self> {
        Ok(Self {
            triggers: def.triggers,
            regex: Regex::new(def.regex)?,
            captures: def.captures,
            first_match: def.first_match,
        })
    }

    fn triggered_by(&self, line: &str) -> bool {
        self.triggers.iter().all(|trigger| line.contains(trigger))
    }

    /// Returns whether the regex matched
    fn apply(&self, line: &str, out: &mut Vec<MetricEntry>) -> bool {
        let Some(caps) = self.regex.captures(line) else {
            return false;
        };

        for (group, (key, kind)) in self.captures.iter().enumerate() {
            let parsed = caps
                .get(group + 1)
                .and_then(|m| kind.parse(m.as_str()));

            if let Some(value) = parsed {
                upsert(out, key, value);
            }
        }
        true
    }
}

// A repeated key keeps its first position but takes the latest value
fn upsert(out: &mut Vec<MetricEntry>, key: &str, value: MetricValue) {
    match out.iter_mut().find(|entry| entry.name == key) {
        Some(existing) => existing.value = value,
        None => out.push(MetricEntry::new(key, value)),
    }
}

/// Compiled patterns for one probe kind
#[derive(Debug, Clone)]
pub struct Extractor {
    kind: ProbeKind,
    patterns: Vec<LinePattern>,
}

impl Extractor {
    /// Compile the stock patterns for `kind`
    pub fn for_kind(kind: ProbeKind) -> Result<Self> {
        let patterns = pattern_defs(kind)
            .iter()
            .map(LinePattern::compile)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { kind, patterns })
    }

    pub fn kind(&self) -> ProbeKind {
        self.kind
    }

    /// Whether this probe produces any metrics at all
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Keys this extractor can produce, in pattern order
    pub fn metric_names(&self) -> Vec<&'static str> {
        self.patterns
            .iter()
            .flat_map(|pattern| pattern.captures.iter().map(|(key, _)| *key))
            .collect()
    }

    /// Extract metrics from captured stdout
    pub fn extract(&self, stdout: &str) -> Vec<MetricEntry> {
        let mut entries = Vec::new();
        let mut spent = vec![false; self.patterns.len()];

        for line in stdout.lines() {
            let Some(idx) = self.patterns.iter().position(|p| p.triggered_by(line)) else {
                continue;
            };
            if spent[idx] {
                continue;
            }

            let pattern = &self.patterns[idx];
            if pattern.apply(line, &mut entries) && pattern.first_match {
                spent[idx] = true;
            }
        }

        entries
    }
}

/// Compile the extractor for `kind` and run it over `stdout`
pub fn extract(kind: ProbeKind, stdout: &str) -> Result<Vec<MetricEntry>> {
    Ok(Extractor::for_kind(kind)?.extract(stdout))
}
