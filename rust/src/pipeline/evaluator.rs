//! Sequential pipeline evaluation.
//! A run folds one fresh `HashState` through the resolved steps in order; each
//! step observes every mutation made by the steps before it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::catalog::{fmix32, Step};
use super::state::HashState;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("pipeline is empty; add at least one step")]
    EmptyPipeline,
    #[error("unknown step '{id}' at position {position}")]
    UnknownStep { id: String, position: usize },
}

/// Ordered list of catalog step ids, owned by the caller.
/// Duplicates are allowed; validity is only checked when the pipeline is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pipeline {
    steps: Vec<String>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_steps<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            steps: steps.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a comma separated list such as `charcode_sum, avalanche,hex_encode`.
    /// Blank entries are skipped.
    pub fn parse_list(list: &str) -> Self {
        Self::from_steps(
            list.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty()),
        )
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn push(&mut self, id: impl Into<String>) {
        self.steps.push(id.into());
    }

    /// Inserts at `index`, clamped to the end of the pipeline.
    pub fn insert(&mut self, index: usize, id: impl Into<String>) {
        let index = index.min(self.steps.len());
        self.steps.insert(index, id.into());
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.steps.len()).then(|| self.steps.remove(index))
    }

    /// Swaps the step at `index` with its predecessor. Returns false at the top.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.steps.len() {
            return false;
        }
        self.steps.swap(index - 1, index);
        true
    }

    /// Swaps the step at `index` with its successor. Returns false at the bottom.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.steps.len() {
            return false;
        }
        self.steps.swap(index, index + 1);
        true
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// Maps every id to its catalog step. Empty pipelines and the first
    /// unknown id are reported as errors.
    pub fn resolve(&self) -> Result<Vec<Step>, PipelineError> {
        if self.steps.is_empty() {
            return Err(PipelineError::EmptyPipeline);
        }
        self.steps
            .iter()
            .enumerate()
            .map(|(position, id)| {
                Step::from_id(id).ok_or_else(|| PipelineError::UnknownStep {
                    id: id.clone(),
                    position,
                })
            })
            .collect()
    }
}

impl FromStr for Pipeline {
    type Err = PipelineError;

    fn from_str(list: &str) -> Result<Self, Self::Err> {
        let pipeline = Pipeline::parse_list(list);
        pipeline.resolve()?;
        Ok(pipeline)
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.steps.join(" → "))
    }
}

impl From<&[Step]> for Pipeline {
    fn from(steps: &[Step]) -> Self {
        Self::from_steps(steps.iter().map(|step| step.id()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEntry {
    pub step_id: &'static str,
    pub step_label: &'static str,
    pub description: String,
    pub value: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub final_hash: String,
    pub trace: Vec<TraceEntry>,
    pub step_values: Vec<u32>,
    pub final_accumulator: u32,
}

/// Runs `pipeline` over `password` + `salt`.
///
/// The digest is the concatenation of every hex-encode output when at least one
/// such step ran. Otherwise it is a fixed two-word format: the final
/// accumulator followed by its fmix32 image, eight hex digits each.
pub fn evaluate(password: &str, salt: &str, pipeline: &Pipeline) -> Result<RunResult, PipelineError> {
    let steps = pipeline.resolve()?;
    let mut state = HashState::new(password, salt);
    debug!(seed = state.accumulator, steps = steps.len(), "starting pipeline run");

    let mut trace = Vec::with_capacity(steps.len());
    let mut step_values = Vec::with_capacity(steps.len());
    for step in steps {
        let result = step.apply(&mut state);
        debug!(step = step.id(), value = result.value, "step applied");
        step_values.push(result.value);
        trace.push(TraceEntry {
            step_id: step.id(),
            step_label: step.label(),
            description: result.description,
            value: result.value,
            display: result.display,
        });
    }

    let final_hash = if state.hex_accumulator.is_empty() {
        format!("{:08x}{:08x}", state.accumulator, fmix32(state.accumulator))
    } else {
        std::mem::take(&mut state.hex_accumulator)
    };

    Ok(RunResult {
        final_hash,
        trace,
        step_values,
        final_accumulator: state.accumulator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline(ids: &[&str]) -> Pipeline {
        Pipeline::from_steps(ids.iter().copied())
    }

    #[test]
    fn rejects_empty_pipeline() {
        let err = evaluate("anything", "anything", &Pipeline::new()).unwrap_err();
        assert_eq!(err, PipelineError::EmptyPipeline);
    }

    #[test]
    fn rejects_unknown_step() {
        let err = evaluate("p", "s", &pipeline(&["not_a_real_step"])).unwrap_err();
        assert_eq!(
            err,
            PipelineError::UnknownStep {
                id: "not_a_real_step".to_string(),
                position: 0
            }
        );
    }

    #[test]
    fn unknown_step_reports_its_position() {
        let err = evaluate("p", "s", &pipeline(&["xor_fold", "avalanche", "md5"])).unwrap_err();
        assert!(format!("{err}").contains("'md5' at position 2"));
    }

    #[test]
    fn is_deterministic() {
        let p = pipeline(&["charcode_sum", "poly_rolling", "avalanche", "salt_inject", "rounds"]);
        let first = evaluate("correct horse", "pepper", &p).unwrap();
        let second = evaluate("correct horse", "pepper", &p).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_seeds_zero() {
        let result = evaluate("", "", &pipeline(&["xor_fold"])).unwrap();
        assert_eq!(result.final_accumulator, 0);
        assert_eq!(result.final_hash, "0000000000000000");
    }

    #[test]
    fn charcode_sum_example_digest() {
        let result = evaluate("ab", "", &pipeline(&["charcode_sum"])).unwrap();
        assert_eq!(result.final_accumulator, 37_305_421);
        assert_eq!(result.final_hash, "02393c4dfe40d2cd");
        assert_eq!(result.trace.len(), 1);
        assert_eq!(result.trace[0].step_label, "Char-code sum");
        assert_eq!(result.step_values, vec![37_305_421]);
    }

    #[test]
    fn hex_encode_twice_repeats_word() {
        let result = evaluate("pw", "", &pipeline(&["hex_encode", "hex_encode"])).unwrap();
        assert_eq!(result.final_hash, "02393b8a02393b8a");
        assert_eq!(result.final_accumulator, 37_305_226);
    }

    #[test]
    fn digest_length_follows_hex_steps() {
        let p = pipeline(&["salt_inject", "avalanche", "hex_encode", "rounds", "hex_encode"]);
        let result = evaluate("password", "salt", &p).unwrap();
        assert_eq!(result.final_hash, "e10ff6bc39b29ee1");

        let single = evaluate("password", "salt", &pipeline(&["poly_rolling", "hex_encode"])).unwrap();
        assert_eq!(single.final_hash, "0f223b56");
    }

    #[test]
    fn mixed_arithmetic_pipeline_matches_known_digest() {
        let p = pipeline(&["charcode_sum", "square_sum", "fib_mix", "prime_mult", "mod_trim"]);
        let result = evaluate("hello", "world", &p).unwrap();
        assert_eq!(result.final_accumulator, 29_963);
        assert_eq!(result.final_hash, "0000750b2af9a3d8");
    }

    #[test]
    fn rotation_by_full_word_restores_value() {
        let base = evaluate("rotate me", "salt", &pipeline(&["charcode_sum"])).unwrap();

        let mut full_turn = pipeline(&["charcode_sum"]);
        for _ in 0..32 {
            full_turn.push("bit_rotate");
        }
        let rotated = evaluate("rotate me", "salt", &full_turn).unwrap();
        assert_eq!(rotated.final_accumulator, base.final_accumulator);

        let partial = pipeline(&["charcode_sum", "bit_rotate", "bit_rotate", "bit_rotate", "bit_rotate"]);
        let rotated = evaluate("rotate me", "salt", &partial).unwrap();
        assert_ne!(rotated.final_accumulator, base.final_accumulator);
    }

    #[test]
    fn later_steps_see_earlier_mutations() {
        let forward = evaluate("pw", "s", &pipeline(&["charcode_sum", "avalanche"])).unwrap();
        let reversed = evaluate("pw", "s", &pipeline(&["avalanche", "charcode_sum"])).unwrap();
        assert_ne!(forward.final_accumulator, reversed.final_accumulator);
        assert_eq!(forward.trace[1].value, forward.final_accumulator);
    }

    #[test]
    fn pipeline_editing_operations() {
        let mut p = Pipeline::parse_list(" charcode_sum, ,avalanche,hex_encode ");
        assert_eq!(p.steps(), ["charcode_sum", "avalanche", "hex_encode"]);

        assert!(p.move_up(2));
        assert_eq!(p.steps(), ["charcode_sum", "hex_encode", "avalanche"]);
        assert!(!p.move_up(0));
        assert!(!p.move_down(2));
        assert!(p.move_down(0));
        assert_eq!(p.steps(), ["hex_encode", "charcode_sum", "avalanche"]);

        p.insert(99, "mod_trim");
        assert_eq!(p.steps().last().map(String::as_str), Some("mod_trim"));
        assert_eq!(p.remove(0).as_deref(), Some("hex_encode"));
        assert_eq!(p.remove(10), None);
        assert_eq!(p.len(), 3);

        p.clear();
        assert!(p.is_empty());
    }

    #[test]
    fn parses_validated_pipeline_from_str() {
        let p: Pipeline = "xor_fold,rounds".parse().unwrap();
        assert_eq!(p.resolve().unwrap(), vec![Step::XorFold, Step::Rounds]);
        assert_eq!(p.to_string(), "xor_fold → rounds");
        assert!("".parse::<Pipeline>().is_err());
        assert!("xor_fold,nope".parse::<Pipeline>().is_err());
    }

    #[test]
    fn serializes_trace_in_camel_case() {
        let result = evaluate("ab", "", &pipeline(&["hex_encode"])).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["finalHash"], "02393b8a");
        assert_eq!(json["trace"][0]["stepLabel"], "Hex encode");
        assert_eq!(json["trace"][0]["display"], "02393b8a");
        assert_eq!(json["finalAccumulator"], 37_305_226);
    }
}
