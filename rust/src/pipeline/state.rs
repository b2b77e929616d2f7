//! Mutable state threaded through a single pipeline run.

use zeroize::Zeroize;

/// FNV-1a 32-bit offset basis, reused as the seed multiplier.
pub const SEED_MULTIPLIER: u32 = 2_166_136_261;

/// Derives the starting accumulator from the password length alone.
///
/// Length is counted in UTF-16 code units so that seeds agree with browser
/// based front ends that report `String.length`.
pub fn seed_for(password: &str) -> u32 {
    let units = password.encode_utf16().count() as u32;
    units.wrapping_mul(SEED_MULTIPLIER)
}

/// Working state for one evaluation. Created fresh per run and discarded
/// afterwards; the copies of the password and salt are wiped on drop.
#[derive(Debug)]
pub struct HashState {
    /// Password followed by salt, fixed for the run.
    pub input_text: String,
    /// Running 32-bit hash value.
    pub accumulator: u32,
    /// The salt on its own, for steps that read it independently.
    pub salt: String,
    /// Output of every hex-encode step so far, concatenated.
    pub hex_accumulator: String,
}

impl HashState {
    pub fn new(password: &str, salt: &str) -> Self {
        let mut input_text = String::with_capacity(password.len() + salt.len());
        input_text.push_str(password);
        input_text.push_str(salt);

        Self {
            input_text,
            accumulator: seed_for(password),
            salt: salt.to_string(),
            hex_accumulator: String::new(),
        }
    }

    /// Unicode scalar values of the combined input, in written order.
    pub fn code_points(&self) -> impl Iterator<Item = u32> + '_ {
        self.input_text.chars().map(u32::from)
    }
}

impl Drop for HashState {
    fn drop(&mut self) {
        self.input_text.zeroize();
        self.salt.zeroize();
    }
}

/// What a single step reports back for the trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub description: String,
    /// Accumulator after the step ran.
    pub value: u32,
    /// Preferred rendering of the value, when the raw number is not the point
    /// (for example the hex word a hex-encode step appended).
    pub display: Option<String>,
}

impl StepResult {
    pub fn new(description: impl Into<String>, value: u32) -> Self {
        Self {
            description: description.into(),
            value,
            display: None,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{seed_for, HashState};

    #[test]
    fn seeds_from_password_length() {
        assert_eq!(seed_for(""), 0);
        assert_eq!(seed_for("ab"), 37_305_226);
    }

    #[test]
    fn seed_counts_utf16_units() {
        // U+1F600 is one scalar value but two UTF-16 units.
        assert_eq!(seed_for("a\u{1F600}"), seed_for("abc"));
    }

    #[test]
    fn concatenates_password_and_salt() {
        let state = HashState::new("pass", "salt");
        assert_eq!(state.input_text, "passsalt");
        assert_eq!(state.salt, "salt");
        assert!(state.hex_accumulator.is_empty());
        assert_eq!(state.accumulator, seed_for("pass"));
    }

    #[test]
    fn seed_ignores_salt() {
        let a = HashState::new("pw", "one");
        let b = HashState::new("pw", "a-much-longer-salt");
        assert_eq!(a.accumulator, b.accumulator);
    }
}
