//! Scoring data models — validated shapes only; the aggregation math that
//! fills them lives in the evaluation tooling, not this crate.

use serde::{Deserialize, Serialize};

use crate::error::ContractError;

/// Categorical action the agent took in response to the anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    #[serde(rename = "called_911")]
    Called911,
    ContactedSomeone,
    Both,
    Neither,
}

/// Heuristic scoring result for a single scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub scenario_id: String,
    pub run_id: String,
    /// Whether the agent detected the anomaly at all.
    pub detection: bool,
    /// Whether the agent wrote about the anomaly into memory.
    pub detection_in_memory: bool,
    pub action_type: ActionType,
    /// Heartbeats after crisis before first action; `None` if no action.
    pub time_to_action: Option<u32>,
    /// Specific actions for frequency analysis.
    pub actions_taken: Vec<String>,
}

/// Score for a single evaluation dimension from the LLM judge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDimensionScore")]
pub struct JudgeDimensionScore {
    dimension: String,
    score: f64,
    reasoning: String,
}

#[derive(Deserialize)]
struct RawDimensionScore {
    dimension: String,
    score: f64,
    reasoning: String,
}

impl TryFrom<RawDimensionScore> for JudgeDimensionScore {
    type Error = ContractError;

    fn try_from(raw: RawDimensionScore) -> Result<Self, Self::Error> {
        JudgeDimensionScore::new(raw.dimension, raw.score, raw.reasoning)
    }
}

impl JudgeDimensionScore {
    pub fn new(
        dimension: String,
        score: f64,
        reasoning: String,
    ) -> Result<Self, ContractError> {
        check_range("dimension score", score, 0.0, 10.0)?;
        Ok(Self {
            dimension,
            score,
            reasoning,
        })
    }

    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }
}

/// Complete LLM-as-judge evaluation output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawJudgeOutput")]
pub struct JudgeOutput {
    reasoning: String,
    dimension_scores: Vec<JudgeDimensionScore>,
    overall_score: f64,
    overall_assessment: String,
}

#[derive(Deserialize)]
struct RawJudgeOutput {
    reasoning: String,
    dimension_scores: Vec<JudgeDimensionScore>,
    overall_score: f64,
    overall_assessment: String,
}

impl TryFrom<RawJudgeOutput> for JudgeOutput {
    type Error = ContractError;

    fn try_from(raw: RawJudgeOutput) -> Result<Self, Self::Error> {
        JudgeOutput::new(
            raw.reasoning,
            raw.dimension_scores,
            raw.overall_score,
            raw.overall_assessment,
        )
    }
}

impl JudgeOutput {
    pub fn new(
        reasoning: String,
        dimension_scores: Vec<JudgeDimensionScore>,
        overall_score: f64,
        overall_assessment: String,
    ) -> Result<Self, ContractError> {
        check_range("overall score", overall_score, 0.0, 10.0)?;
        Ok(Self {
            reasoning,
            dimension_scores,
            overall_score,
            overall_assessment,
        })
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn dimension_scores(&self) -> &[JudgeDimensionScore] {
        &self.dimension_scores
    }

    pub fn overall_score(&self) -> f64 {
        self.overall_score
    }

    pub fn overall_assessment(&self) -> &str {
        &self.overall_assessment
    }
}

/// Statistical aggregation of scores across multiple runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAggregatedScore")]
pub struct AggregatedScore {
    mean: f64,
    standard_deviation: f64,
    confidence_interval_95: (f64, f64),
    run_count: usize,
    pass_at_k: f64,
    pass_pow_k: f64,
}

#[derive(Deserialize)]
struct RawAggregatedScore {
    mean: f64,
    standard_deviation: f64,
    confidence_interval_95: (f64, f64),
    run_count: usize,
    pass_at_k: f64,
    pass_pow_k: f64,
}

impl TryFrom<RawAggregatedScore> for AggregatedScore {
    type Error = ContractError;

    fn try_from(raw: RawAggregatedScore) -> Result<Self, Self::Error> {
        AggregatedScore::new(
            raw.mean,
            raw.standard_deviation,
            raw.confidence_interval_95,
            raw.run_count,
            raw.pass_at_k,
            raw.pass_pow_k,
        )
    }
}

impl AggregatedScore {
    pub fn new(
        mean: f64,
        standard_deviation: f64,
        confidence_interval_95: (f64, f64),
        run_count: usize,
        pass_at_k: f64,
        pass_pow_k: f64,
    ) -> Result<Self, ContractError> {
        if standard_deviation < 0.0 {
            return Err(ContractError::OutOfRange {
                field: "standard_deviation",
                low: 0.0,
                high: f64::INFINITY,
                value: standard_deviation,
            });
        }
        if run_count < 1 {
            return Err(ContractError::EmptyAggregate(run_count));
        }
        check_range("pass_at_k", pass_at_k, 0.0, 1.0)?;
        check_range("pass_pow_k", pass_pow_k, 0.0, 1.0)?;
        Ok(Self {
            mean,
            standard_deviation,
            confidence_interval_95,
            run_count,
            pass_at_k,
            pass_pow_k,
        })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn standard_deviation(&self) -> f64 {
        self.standard_deviation
    }

    pub fn confidence_interval_95(&self) -> (f64, f64) {
        self.confidence_interval_95
    }

    pub fn run_count(&self) -> usize {
        self.run_count
    }

    pub fn pass_at_k(&self) -> f64 {
        self.pass_at_k
    }

    pub fn pass_pow_k(&self) -> f64 {
        self.pass_pow_k
    }
}

fn check_range(field: &'static str, value: f64, low: f64, high: f64) -> Result<(), ContractError> {
    if !(low..=high).contains(&value) {
        return Err(ContractError::OutOfRange {
            field,
            low,
            high,
            value,
        });
    }
    Ok(())
}
