use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The problem under analysis, as entered and as refined by validation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreProblem {
    pub id: String,
    pub original_input: String,
    pub validated_statement: String,
    pub is_valid: bool,
    pub feedback: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TechLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl TechLevel {
    /// Lenient parse for model output: unrecognized text falls back to
    /// the default rather than failing the whole persona.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Shared low/medium/high scale for solution complexity and impact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub industry: String,
    pub role: String,
    pub description: String,
    /// 1 (barely affected) to 5 (most affected).
    #[serde(rename = "painDegree")]
    pub pain_degree: u8,
    pub demographics: String,
    pub goals: Vec<String>,
    pub pain_points: Vec<String>,
    pub tech_level: TechLevel,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PainPoint {
    pub id: String,
    pub description: String,
    pub severity: Severity,
    #[serde(rename = "impactArea")]
    pub impact_area: String,
    pub persona_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub id: String,
    pub title: String,
    pub description: String,
    pub complexity: Level,
    pub impact: Level,
    pub technical_approach: String,
    pub business_impact: String,
    pub target_personas: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: String,
    pub text: String,
    pub source_solution_id: String,
    pub source_persona_id: String,
    pub votes: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaComment {
    pub persona_id: String,
    pub persona_name: String,
    pub comment: String,
}

/// A voted-up feature the focus group would not ship without, annotated
/// with per-persona reactions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MustHaveFeature {
    pub id: String,
    pub text: String,
    pub source_solution_id: String,
    pub source_persona_id: String,
    pub votes: u32,
    pub comments: Vec<PersonaComment>,
}

impl MustHaveFeature {
    pub fn from_feature(feature: Feature, comments: Vec<PersonaComment>) -> Self {
        Self {
            id: feature.id,
            text: feature.text,
            source_solution_id: feature.source_solution_id,
            source_persona_id: feature.source_persona_id,
            votes: feature.votes,
            comments,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStory {
    pub id: String,
    pub title: String,
    pub as_a: String,
    pub i_want: String,
    pub so_that: String,
    pub acceptance_criteria: Vec<String>,
}

/// Entries the caller has pinned. Generation steps phrase their prompts
/// to avoid duplicating these; nothing in the pipeline ever removes
/// them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedItems {
    pub personas: BTreeSet<String>,
    pub pain_points: BTreeSet<String>,
    pub solutions: BTreeSet<String>,
}

impl LockedItems {
    pub fn is_empty(&self) -> bool {
        self.personas.is_empty() && self.pain_points.is_empty() && self.solutions.is_empty()
    }
}
