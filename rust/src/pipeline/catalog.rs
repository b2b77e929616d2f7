//! The closed catalog of pipeline steps.
//! Every step is a deterministic function of the `HashState` it is handed: no
//! randomness, no I/O, and 32-bit wraparound wherever the accumulator is written.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::state::{HashState, StepResult};

const POLY_BASE: u64 = 31;
const POLY_MODULUS: u64 = 1_000_000_007;
const MERSENNE_31: u64 = (1 << 31) - 1;
const MODEXP_EXPONENT: u64 = 65_537;
const KNUTH_MULTIPLIER: u32 = 2_654_435_769;
const PRIME_MULTIPLIER: u32 = 1_000_000_007;
const ROTATE_BITS: u32 = 13;
const FINALIZE_ROUNDS: usize = 8;
const TRIM_MODULUS: u32 = 65_536;

/// One entry of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    CharcodeSum,
    PolyRolling,
    XorFold,
    ModExp,
    FibMix,
    PrimeMult,
    BitRotate,
    SquareSum,
    Avalanche,
    SaltInject,
    Rounds,
    HexEncode,
    ModTrim,
}

/// Display metadata for a step. Formula text is for people, not for parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub formula: &'static str,
}

impl Step {
    /// Catalog order, which is also the order the presentation layer lists them.
    pub const ALL: [Step; 13] = [
        Step::CharcodeSum,
        Step::PolyRolling,
        Step::XorFold,
        Step::ModExp,
        Step::FibMix,
        Step::PrimeMult,
        Step::BitRotate,
        Step::SquareSum,
        Step::Avalanche,
        Step::SaltInject,
        Step::Rounds,
        Step::HexEncode,
        Step::ModTrim,
    ];

    pub fn id(self) -> &'static str {
        self.info().id
    }

    pub fn label(self) -> &'static str {
        self.info().label
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.id() == id)
    }

    pub fn info(self) -> StepInfo {
        match self {
            Step::CharcodeSum => StepInfo {
                id: "charcode_sum",
                label: "Char-code sum",
                icon: "Σ",
                description: "Adds every code point of password+salt to the accumulator.",
                formula: "h = (h + Σ cᵢ) mod 2³²",
            },
            Step::PolyRolling => StepInfo {
                id: "poly_rolling",
                label: "Polynomial rolling",
                icon: "ƒ",
                description: "Replaces the accumulator with a base-31 polynomial hash of the input.",
                formula: "h = Σ cᵢ·31ⁱ mod (10⁹+7)",
            },
            Step::XorFold => StepInfo {
                id: "xor_fold",
                label: "XOR fold",
                icon: "⊕",
                description: "XORs every code point into the accumulator.",
                formula: "h = h ⊕ c₀ ⊕ c₁ ⊕ … ⊕ cₙ",
            },
            Step::ModExp => StepInfo {
                id: "mod_exp",
                label: "Modular exponentiation",
                icon: "^",
                description: "Raises the accumulator to 65537 modulo the Mersenne prime 2³¹−1.",
                formula: "h = max(h,1)^65537 mod (2³¹−1)",
            },
            Step::FibMix => StepInfo {
                id: "fib_mix",
                label: "Fibonacci mix",
                icon: "φ",
                description: "Knuth multiplicative hashing with the golden-ratio constant.",
                formula: "h = h × 2654435769 mod 2³²",
            },
            Step::PrimeMult => StepInfo {
                id: "prime_mult",
                label: "Prime multiply",
                icon: "×",
                description: "Multiplies by the prime 10⁹+7 with 32-bit wraparound.",
                formula: "h = h × 1000000007 mod 2³²",
            },
            Step::BitRotate => StepInfo {
                id: "bit_rotate",
                label: "Bit rotation",
                icon: "↻",
                description: "Rotates the accumulator left by 13 bits.",
                formula: "h = (h << 13) | (h >> 19)",
            },
            Step::SquareSum => StepInfo {
                id: "square_sum",
                label: "ASCII square sum",
                icon: "²",
                description: "Adds the sum of squared code points to the accumulator.",
                formula: "h = (h + Σ cᵢ² mod 2³²) mod 2³²",
            },
            Step::Avalanche => StepInfo {
                id: "avalanche",
                label: "Avalanche finalize",
                icon: "❄",
                description: "MurmurHash3 fmix32 finalizer: shifts, XORs and two multiplies.",
                formula: "h ^= h>>16; h *= 0x85ebca6b; h ^= h>>13; h *= 0xc2b2ae35; h ^= h>>16",
            },
            Step::SaltInject => StepInfo {
                id: "salt_inject",
                label: "Salt injection",
                icon: "🧂",
                description: "XORs a polynomial hash of the salt alone into the accumulator.",
                formula: "h = h ⊕ Σ sᵢ·31ⁱ mod 2³²",
            },
            Step::Rounds => StepInfo {
                id: "rounds",
                label: "Iteration rounds",
                icon: "⟳",
                description: "Applies the avalanche finalizer eight times in a row.",
                formula: "h = fmix32⁸(h)",
            },
            Step::HexEncode => StepInfo {
                id: "hex_encode",
                label: "Hex encode",
                icon: "#",
                description: "Appends the accumulator as eight hex digits to the output.",
                formula: "out = out ‖ hex₈(h)",
            },
            Step::ModTrim => StepInfo {
                id: "mod_trim",
                label: "Modulo trim",
                icon: "%",
                description: "Keeps only the low 16 bits of the accumulator.",
                formula: "h = h mod 65536",
            },
        }
    }

    /// Runs the step, updating `state` in place.
    pub fn apply(self, state: &mut HashState) -> StepResult {
        let before = state.accumulator;
        match self {
            Step::CharcodeSum => {
                let sum = state.code_points().fold(0u32, u32::wrapping_add);
                state.accumulator = before.wrapping_add(sum);
                StepResult::new(
                    format!("Char-code sum: {before} + {sum} = {}", state.accumulator),
                    state.accumulator,
                )
            }
            Step::PolyRolling => {
                let poly = polynomial_mod(state.code_points(), POLY_MODULUS);
                state.accumulator = poly as u32;
                StepResult::new(
                    format!("Polynomial rolling: Σ cᵢ·31ⁱ mod 1000000007 = {}", state.accumulator),
                    state.accumulator,
                )
            }
            Step::XorFold => {
                state.accumulator = state.code_points().fold(before, |acc, c| acc ^ c);
                StepResult::new(
                    format!("XOR fold: {before} ⊕ code points = {}", state.accumulator),
                    state.accumulator,
                )
            }
            Step::ModExp => {
                let base = if before == 0 { 1 } else { u64::from(before) };
                state.accumulator = mod_pow(base, MODEXP_EXPONENT, MERSENNE_31) as u32;
                StepResult::new(
                    format!("Modular exponentiation: {base}^65537 mod 2147483647 = {}", state.accumulator),
                    state.accumulator,
                )
            }
            Step::FibMix => {
                state.accumulator = before.wrapping_mul(KNUTH_MULTIPLIER);
                StepResult::new(
                    format!("Fibonacci mix: {before} × 2654435769 = {}", state.accumulator),
                    state.accumulator,
                )
            }
            Step::PrimeMult => {
                state.accumulator = before.wrapping_mul(PRIME_MULTIPLIER);
                StepResult::new(
                    format!("Prime multiply: {before} × 1000000007 = {}", state.accumulator),
                    state.accumulator,
                )
            }
            Step::BitRotate => {
                state.accumulator = before.rotate_left(ROTATE_BITS);
                StepResult::new(
                    format!("Bit rotation: rotl13({before:#010x}) = {:#010x}", state.accumulator),
                    state.accumulator,
                )
                .with_display(format!("{:032b}", state.accumulator))
            }
            Step::SquareSum => {
                let squares = state
                    .code_points()
                    .fold(0u32, |acc, c| acc.wrapping_add(c.wrapping_mul(c)));
                state.accumulator = before.wrapping_add(squares);
                StepResult::new(
                    format!("ASCII square sum: {before} + {squares} = {}", state.accumulator),
                    state.accumulator,
                )
            }
            Step::Avalanche => {
                state.accumulator = fmix32(before);
                StepResult::new(
                    format!("Avalanche finalize: fmix32({before:#010x}) = {:#010x}", state.accumulator),
                    state.accumulator,
                )
            }
            Step::SaltInject => {
                let salt_value = salt_polynomial(&state.salt);
                state.accumulator = before ^ salt_value;
                StepResult::new(
                    format!("Salt injection: {before} ⊕ {salt_value} = {}", state.accumulator),
                    state.accumulator,
                )
            }
            Step::Rounds => {
                state.accumulator = (0..FINALIZE_ROUNDS).fold(before, |h, _| fmix32(h));
                StepResult::new(
                    format!("Iteration rounds: fmix32⁸({before:#010x}) = {:#010x}", state.accumulator),
                    state.accumulator,
                )
            }
            Step::HexEncode => {
                let word = format!("{before:08x}");
                state.hex_accumulator.push_str(&word);
                StepResult::new(format!("Hex encode: {before} → {word}"), before).with_display(word)
            }
            Step::ModTrim => {
                state.accumulator = before % TRIM_MODULUS;
                StepResult::new(
                    format!("Modulo trim: {before} mod 65536 = {}", state.accumulator),
                    state.accumulator,
                )
            }
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Step::from_id(value).ok_or_else(|| value.to_string())
    }
}

/// Read-only view of every step, in catalog order.
pub fn catalog() -> Vec<StepInfo> {
    Step::ALL.into_iter().map(Step::info).collect()
}

/// MurmurHash3 32-bit finalizer.
pub fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Σ cᵢ·31ⁱ reduced modulo `modulus`, with the power tracked alongside.
fn polynomial_mod(code_points: impl Iterator<Item = u32>, modulus: u64) -> u64 {
    let mut hash = 0u64;
    let mut power = 1u64;
    for c in code_points {
        hash = (hash + u64::from(c) * power) % modulus;
        power = power * POLY_BASE % modulus;
    }
    hash
}

/// Σ sᵢ·31ⁱ over the salt, truncating to 32 bits at every multiply.
fn salt_polynomial(salt: &str) -> u32 {
    let mut value = 0u32;
    let mut power = 1u32;
    for c in salt.chars().map(u32::from) {
        value = value.wrapping_add(c.wrapping_mul(power));
        power = power.wrapping_mul(POLY_BASE as u32);
    }
    value
}

/// Square-and-multiply; operands stay below 2³¹ so products fit in u64.
fn mod_pow(base: u64, mut exponent: u64, modulus: u64) -> u64 {
    let mut result = 1u64;
    let mut base = base % modulus;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = result * base % modulus;
        }
        base = base * base % modulus;
        exponent >>= 1;
    }
    result
}
