//! Password strength estimation from entropy heuristics.
//!
//! The estimate starts from the brute-force search space (`len × log2(pool)`)
//! and discounts characters that follow an obvious pattern: repeats of the
//! previous character and runs of three or more consecutive code points. A
//! short list of notorious passwords is capped outright. This is a teaching
//! aid, not a substitute for a breach corpus.

use std::collections::HashMap;

use serde::Serialize;

const LOWER_POOL: u32 = 26;
const UPPER_POOL: u32 = 26;
const DIGIT_POOL: u32 = 10;
const SYMBOL_POOL: u32 = 33;
const UNICODE_POOL: u32 = 100;

/// Patterned characters keep this share of a random character's entropy.
const PATTERN_WEIGHT: f64 = 0.25;
const RECOMMENDED_LENGTH: usize = 12;

const COMMON_PASSWORDS: &[&str] = &[
    "123456", "12345678", "123456789", "111111", "abc123", "admin", "dragon", "football",
    "iloveyou", "letmein", "monkey", "passw0rd", "password", "qwerty", "sunshine", "trustno1",
    "welcome",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharClasses {
    pub lower: bool,
    pub upper: bool,
    pub digit: bool,
    pub symbol: bool,
    pub unicode: bool,
}

impl CharClasses {
    pub fn of(password: &str) -> Self {
        password.chars().fold(Self::default(), |mut classes, c| {
            match c {
                'a'..='z' => classes.lower = true,
                'A'..='Z' => classes.upper = true,
                '0'..='9' => classes.digit = true,
                c if c.is_ascii_punctuation() || c == ' ' => classes.symbol = true,
                c if !c.is_ascii() => classes.unicode = true,
                _ => {}
            }
            classes
        })
    }

    /// Size of the alphabet an attacker would have to search.
    pub fn pool_size(&self) -> u32 {
        [
            (self.lower, LOWER_POOL),
            (self.upper, UPPER_POOL),
            (self.digit, DIGIT_POOL),
            (self.symbol, SYMBOL_POOL),
            (self.unicode, UNICODE_POOL),
        ]
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, size)| size)
        .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StrengthLabel {
    #[serde(rename = "Very weak")]
    VeryWeak,
    Weak,
    Fair,
    Strong,
    #[serde(rename = "Very strong")]
    VeryStrong,
}

impl StrengthLabel {
    fn from_bits(bits: f64) -> Self {
        match bits {
            b if b < 28.0 => StrengthLabel::VeryWeak,
            b if b < 36.0 => StrengthLabel::Weak,
            b if b < 60.0 => StrengthLabel::Fair,
            b if b < 128.0 => StrengthLabel::Strong,
            _ => StrengthLabel::VeryStrong,
        }
    }

    /// 0 (very weak) to 4 (very strong).
    pub fn score(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StrengthLabel::VeryWeak => "Very weak",
            StrengthLabel::Weak => "Weak",
            StrengthLabel::Fair => "Fair",
            StrengthLabel::Strong => "Strong",
            StrengthLabel::VeryStrong => "Very strong",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthReport {
    pub length: usize,
    pub classes: CharClasses,
    pub pool_size: u32,
    /// Brute-force bits before any pattern discount.
    pub pool_entropy_bits: f64,
    /// Shannon entropy of the character distribution, bits per character.
    pub shannon_bits_per_char: f64,
    /// Bits removed for repeats, sequences, and common passwords.
    pub penalty_bits: f64,
    pub entropy_bits: f64,
    pub score: u8,
    pub label: StrengthLabel,
    pub suggestions: Vec<String>,
}

pub fn estimate(password: &str) -> StrengthReport {
    let chars: Vec<char> = password.chars().collect();
    let classes = CharClasses::of(password);
    let pool_size = classes.pool_size();
    let bits_per_char = if pool_size > 0 { f64::from(pool_size).log2() } else { 0.0 };
    let pool_entropy_bits = bits_per_char * chars.len() as f64;

    let patterns = PatternCounts::of(&chars);
    let patterned = patterns.repeats + patterns.sequence;
    let plain = chars.len() - patterned;
    let mut entropy_bits = bits_per_char * (plain as f64 + PATTERN_WEIGHT * patterned as f64);

    let common = is_common(password);
    if common {
        entropy_bits = entropy_bits.min((COMMON_PASSWORDS.len() as f64).log2());
    }

    let label = StrengthLabel::from_bits(entropy_bits);
    StrengthReport {
        length: chars.len(),
        classes,
        pool_size,
        pool_entropy_bits,
        shannon_bits_per_char: shannon_entropy(&chars),
        penalty_bits: pool_entropy_bits - entropy_bits,
        entropy_bits,
        score: label.score(),
        label,
        suggestions: suggestions(chars.len(), &classes, &patterns, common),
    }
}

/// Shannon entropy of the character frequency distribution.
pub fn shannon_entropy(chars: &[char]) -> f64 {
    if chars.is_empty() {
        return 0.0;
    }
    let mut counts: HashMap<char, usize> = HashMap::new();
    for &c in chars {
        *counts.entry(c).or_default() += 1;
    }
    let total = chars.len() as f64;
    counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum::<f64>()
        .max(0.0)
}

#[derive(Debug, Default)]
struct PatternCounts {
    repeats: usize,
    sequence: usize,
}

impl PatternCounts {
    /// A repeat is a character equal to its predecessor. A sequence character
    /// is the third or later member of a run stepping by +1 or -1.
    fn of(chars: &[char]) -> Self {
        let mut counts = Self::default();
        let mut run_step = 0i64;
        let mut run_len = 1usize;
        for pair in chars.windows(2) {
            let step = i64::from(u32::from(pair[1])) - i64::from(u32::from(pair[0]));
            if step == 0 {
                counts.repeats += 1;
                run_len = 1;
                run_step = 0;
                continue;
            }
            if step.abs() == 1 && step == run_step {
                run_len += 1;
            } else if step.abs() == 1 {
                run_step = step;
                run_len = 2;
            } else {
                run_step = 0;
                run_len = 1;
            }
            if run_len >= 3 {
                counts.sequence += 1;
            }
        }
        counts
    }
}

fn is_common(password: &str) -> bool {
    let lowered = password.to_lowercase();
    COMMON_PASSWORDS.iter().any(|common| *common == lowered)
}

fn suggestions(length: usize, classes: &CharClasses, patterns: &PatternCounts, common: bool) -> Vec<String> {
    let mut out = Vec::new();
    if common {
        out.push("This is one of the most common passwords; pick something else entirely".to_string());
    }
    if length < RECOMMENDED_LENGTH {
        out.push(format!("Use at least {RECOMMENDED_LENGTH} characters"));
    }
    for (present, advice) in [
        (classes.lower, "Add lowercase letters"),
        (classes.upper, "Add uppercase letters"),
        (classes.digit, "Add digits"),
        (classes.symbol, "Add symbols or spaces"),
    ] {
        if !present {
            out.push(advice.to_string());
        }
    }
    if patterns.repeats > 0 {
        out.push("Avoid repeating the same character".to_string());
    }
    if patterns.sequence > 0 {
        out.push("Avoid runs like abc or 321".to_string());
    }
    out
}
