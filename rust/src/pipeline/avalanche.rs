//! Avalanche sensitivity: rerun a pipeline on single-character mutations of
//! the password and measure how far the digest moves.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use super::evaluator::{evaluate, Pipeline, PipelineError};

pub const ORIGINAL_LABEL: &str = "Original";

/// Upper bound on random passwords a single survey evaluates.
pub const MAX_SURVEY_TRIALS: usize = 10_000;

/// Which character of the password a mutation bumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    First,
    Middle,
    Last,
}

impl Mutation {
    pub const ALL: [Mutation; 3] = [Mutation::First, Mutation::Middle, Mutation::Last];

    pub fn label(self) -> &'static str {
        match self {
            Mutation::First => "Flip first char",
            Mutation::Middle => "Flip middle char",
            Mutation::Last => "Flip last char",
        }
    }

    /// Index of the character to bump. Positions are counted in UTF-16 units,
    /// the same length the seed uses; the character covering that unit is
    /// the one selected. `None` when the password is empty.
    fn index(self, chars: &[char]) -> Option<usize> {
        let units: usize = chars.iter().map(|c| c.len_utf16()).sum();
        if units == 0 {
            return None;
        }
        let target = match self {
            Mutation::First => 0,
            Mutation::Middle => units / 2,
            Mutation::Last => units - 1,
        };
        let mut end = 0;
        chars.iter().position(|c| {
            end += c.len_utf16();
            target < end
        })
    }

    /// Returns `password` with the selected character's code point raised by one.
    /// An empty password is read as a single U+0000, so every mutation yields
    /// `"\u{1}"`.
    pub fn apply(self, password: &str) -> String {
        let mut chars: Vec<char> = password.chars().collect();
        match self.index(&chars) {
            Some(i) => chars[i] = next_scalar(chars[i]),
            None => chars.push(next_scalar('\0')),
        }
        chars.into_iter().collect()
    }
}

/// The next Unicode scalar value, hopping over the surrogate block and
/// wrapping past U+10FFFF.
fn next_scalar(c: char) -> char {
    let next = u32::from(c) + 1;
    char::from_u32(next)
        .or_else(|| char::from_u32(next + 0x800))
        .unwrap_or('\0')
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvalancheRow {
    pub label: &'static str,
    pub hash: String,
    /// Share of differing hex characters, 0..=100.
    pub diff_percent: u8,
    /// Share of differing bits across the hex digests, 0..=100.
    pub bit_diff_percent: u8,
}

/// Evaluates the original password plus three single-character mutations.
/// The first row is always the unmutated run with zero difference. A one
/// character password yields identical first and last rows. An empty password
/// has no character to flip; it is treated as one U+0000 character, so all
/// three mutated rows evaluate `"\u{1}"` and differ from the original.
pub fn avalanche_report(
    password: &str,
    salt: &str,
    pipeline: &Pipeline,
) -> Result<Vec<AvalancheRow>, PipelineError> {
    let base_hash = evaluate(password, salt, pipeline)?.final_hash;

    let mut rows = Vec::with_capacity(Mutation::ALL.len() + 1);
    rows.push(AvalancheRow {
        label: ORIGINAL_LABEL,
        diff_percent: 0,
        bit_diff_percent: 0,
        hash: base_hash.clone(),
    });

    for mutation in Mutation::ALL {
        let mutated = mutation.apply(password);
        let hash = evaluate(&mutated, salt, pipeline)?.final_hash;
        let row = AvalancheRow {
            label: mutation.label(),
            diff_percent: char_diff_percent(&base_hash, &hash),
            bit_diff_percent: bit_diff_percent(&base_hash, &hash),
            hash,
        };
        debug!(label = row.label, diff = row.diff_percent, bits = row.bit_diff_percent, "avalanche row");
        rows.push(row);
    }

    Ok(rows)
}

/// Positions that differ up to the shorter length, plus the length gap, as a
/// rounded percentage of `base`'s length.
pub fn char_diff_percent(base: &str, other: &str) -> u8 {
    let base: Vec<char> = base.chars().collect();
    let other: Vec<char> = other.chars().collect();
    let differing = base.iter().zip(&other).filter(|(a, b)| a != b).count()
        + base.len().abs_diff(other.len());
    percent(differing, base.len())
}

/// Differing bits between two hex digests, compared nibble by nibble. Extra
/// characters count as four bits each; non-hex characters count as four bits
/// when they differ.
pub fn bit_diff_percent(base: &str, other: &str) -> u8 {
    let base: Vec<char> = base.chars().collect();
    let other: Vec<char> = other.chars().collect();
    let differing: usize = base
        .iter()
        .zip(&other)
        .map(|(a, b)| match (a.to_digit(16), b.to_digit(16)) {
            (Some(x), Some(y)) => (x ^ y).count_ones() as usize,
            _ if a == b => 0,
            _ => 4,
        })
        .sum::<usize>()
        + 4 * base.len().abs_diff(other.len());
    percent(differing, 4 * base.len())
}

fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return if part == 0 { 0 } else { 100 };
    }
    let value = (100.0 * part as f64 / whole as f64).round();
    value.min(100.0) as u8
}

/// Aggregate of many avalanche reports over random passwords.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySummary {
    pub trials: usize,
    pub samples: usize,
    pub mean_diff_percent: f64,
    pub mean_bit_diff_percent: f64,
    pub min_diff_percent: u8,
    pub max_diff_percent: u8,
}

/// Runs `avalanche_report` for `trials` random alphanumeric passwords of
/// `password_len` characters (at least one) and summarises the mutated rows.
/// `trials` is capped at [`MAX_SURVEY_TRIALS`]; the summary reports the count
/// actually run.
pub fn avalanche_survey<R: Rng + ?Sized>(
    rng: &mut R,
    salt: &str,
    pipeline: &Pipeline,
    trials: usize,
    password_len: usize,
) -> Result<SurveySummary, PipelineError> {
    pipeline.resolve()?;
    let password_len = password_len.max(1);

    let trials = if trials > MAX_SURVEY_TRIALS {
        warn!(requested = trials, cap = MAX_SURVEY_TRIALS, "survey trials capped");
        MAX_SURVEY_TRIALS
    } else {
        trials
    };

    let mut samples = 0usize;
    let mut diff_total = 0u64;
    let mut bit_total = 0u64;
    let mut min_diff: Option<u8> = None;
    let mut max_diff: Option<u8> = None;
    for _ in 0..trials {
        let password: String = (0..password_len)
            .map(|_| char::from(rng.sample(Alphanumeric)))
            .collect();
        for row in avalanche_report(&password, salt, pipeline)?.into_iter().skip(1) {
            samples += 1;
            diff_total += u64::from(row.diff_percent);
            bit_total += u64::from(row.bit_diff_percent);
            min_diff = Some(min_diff.map_or(row.diff_percent, |m| m.min(row.diff_percent)));
            max_diff = Some(max_diff.map_or(row.diff_percent, |m| m.max(row.diff_percent)));
        }
    }

    let mean = |total: u64| if samples == 0 { 0.0 } else { total as f64 / samples as f64 };
    Ok(SurveySummary {
        trials,
        samples,
        mean_diff_percent: mean(diff_total),
        mean_bit_diff_percent: mean(bit_total),
        min_diff_percent: min_diff.unwrap_or(0),
        max_diff_percent: max_diff.unwrap_or(0),
    })
}
