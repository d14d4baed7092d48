//! Wire shapes for generated answers. Field names mirror the JSON the
//! prompts ask for, so the schema string shown to the model on a repair
//! attempt matches the prompt's own example structure.

use crate::entities::{Level, Severity};
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProblemValidationResponse {
    pub is_valid: bool,
    pub feedback: String,
    pub validated_problem: String,
}

#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq)]
pub struct PersonaDraft {
    pub name: String,
    pub industry: String,
    pub role: String,
    pub description: String,
    #[serde(rename = "painDegree")]
    pub pain_degree: Option<f64>,
    pub demographics: Option<String>,
    pub goals: Option<Vec<String>>,
    pub pain_points: Option<Vec<String>>,
    pub tech_level: Option<String>,
}

#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq)]
pub struct PersonaGenerationResponse {
    pub personas: Vec<PersonaDraft>,
}

#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq)]
pub struct PainPointDraft {
    pub description: String,
    pub severity: Severity,
    #[serde(rename = "impactArea")]
    pub impact_area: String,
    pub persona_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq)]
pub struct PainPointGenerationResponse {
    #[serde(rename = "painPoints")]
    pub pain_points: Vec<PainPointDraft>,
}

#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq)]
pub struct SolutionDraft {
    pub title: String,
    pub description: String,
    pub complexity: Level,
    pub impact: Level,
    pub technical_approach: String,
    pub business_impact: String,
    pub target_personas: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq)]
pub struct SolutionGenerationResponse {
    pub solutions: Vec<SolutionDraft>,
}

#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStoryDraft {
    pub title: String,
    pub as_a: String,
    pub i_want: String,
    pub so_that: String,
    pub acceptance_criteria: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq)]
pub struct UserStoriesResponse {
    #[serde(rename = "userStories")]
    pub user_stories: Vec<UserStoryDraft>,
}

#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq)]
pub struct DocumentResponse {
    pub title: String,
    /// Complete document body in markdown.
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_validation_response_expected_camel_case_keys() {
        let response: ProblemValidationResponse = serde_json::from_str(
            r#"{"isValid": true, "feedback": "clear enough", "validatedProblem": "refined"}"#,
        )
        .expect("deserialization should succeed");
        assert!(response.is_valid);
        assert_eq!(response.validated_problem, "refined");
    }

    #[test]
    fn deserialize_persona_draft_expected_optional_fields_absent_ok() {
        let response: PersonaGenerationResponse = serde_json::from_str(
            r#"{"personas": [{"name": "Ada", "industry": "Finance", "role": "Analyst",
                 "description": "tracks invoices", "painDegree": 4.0}]}"#,
        )
        .expect("deserialization should succeed");
        let draft = &response.personas[0];
        assert_eq!(draft.pain_degree, Some(4.0));
        assert_eq!(draft.goals, None);
        assert_eq!(draft.tech_level, None);
    }

    #[test]
    fn deserialize_user_story_expected_all_clause_fields() {
        let response: UserStoriesResponse = serde_json::from_str(
            r#"{"userStories": [{"title": "Track invoices", "asA": "freelancer",
                 "iWant": "one dashboard", "soThat": "nothing slips",
                 "acceptanceCriteria": ["lists every client"]}]}"#,
        )
        .expect("deserialization should succeed");
        assert_eq!(response.user_stories[0].as_a, "freelancer");
        assert_eq!(response.user_stories[0].acceptance_criteria.len(), 1);
    }

    #[test]
    fn deserialize_pain_point_wrong_severity_expected_error() {
        let result = serde_json::from_str::<PainPointGenerationResponse>(
            r#"{"painPoints": [{"description": "slow", "severity": "catastrophic",
                 "impactArea": "workflow"}]}"#,
        );
        assert!(result.is_err());
    }
}
