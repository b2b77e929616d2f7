//! Named starter pipelines. Each one is a plain list of catalog steps; the
//! digests they produce are part of the observable contract, so editing a
//! preset changes every hash previously shown for it.

use super::catalog::Step;
use super::evaluator::Pipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub summary: &'static str,
    pub steps: &'static [Step],
}

impl Preset {
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::from(self.steps)
    }
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "basic",
        summary: "Sum the characters and print them. Shows how little a plain sum hides.",
        steps: &[Step::CharcodeSum, Step::HexEncode],
    },
    Preset {
        name: "polynomial",
        summary: "Java-style polynomial string hash followed by a prime multiply.",
        steps: &[Step::PolyRolling, Step::PrimeMult, Step::HexEncode],
    },
    Preset {
        name: "murmur",
        summary: "XOR fold finished with the Murmur3 avalanche mixer.",
        steps: &[Step::XorFold, Step::FibMix, Step::Avalanche, Step::HexEncode],
    },
    Preset {
        name: "salted",
        summary: "Polynomial hash with the salt mixed back in before finalizing.",
        steps: &[
            Step::PolyRolling,
            Step::SaltInject,
            Step::Avalanche,
            Step::HexEncode,
            Step::BitRotate,
            Step::Avalanche,
            Step::HexEncode,
        ],
    },
    Preset {
        name: "hardened",
        summary: "Every mixing stage stacked, with repeated rounds between outputs.",
        steps: &[
            Step::CharcodeSum,
            Step::SquareSum,
            Step::PolyRolling,
            Step::SaltInject,
            Step::ModExp,
            Step::Rounds,
            Step::HexEncode,
            Step::FibMix,
            Step::BitRotate,
            Step::Rounds,
            Step::HexEncode,
        ],
    },
    Preset {
        name: "weak",
        summary: "Trims to 16 bits; collisions are easy to find by hand.",
        steps: &[Step::CharcodeSum, Step::ModTrim],
    },
];

pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|preset| preset.name == name)
}
