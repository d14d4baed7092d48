use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The recognized prompt-override keys: one per generation step and one
/// per final document kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PromptKey {
    ValidateProblem,
    GeneratePersonas,
    GeneratePainPoints,
    GenerateSolutions,
    UserStories,
    ProductVision,
    FunctionalRequirements,
    SystemArchitecture,
    DataFlowDiagram,
    EntityRelationshipDiagram,
    DesignSystem,
}

impl PromptKey {
    pub const ALL: [PromptKey; 11] = [
        PromptKey::ValidateProblem,
        PromptKey::GeneratePersonas,
        PromptKey::GeneratePainPoints,
        PromptKey::GenerateSolutions,
        PromptKey::UserStories,
        PromptKey::ProductVision,
        PromptKey::FunctionalRequirements,
        PromptKey::SystemArchitecture,
        PromptKey::DataFlowDiagram,
        PromptKey::EntityRelationshipDiagram,
        PromptKey::DesignSystem,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValidateProblem => "validateProblem",
            Self::GeneratePersonas => "generatePersonas",
            Self::GeneratePainPoints => "generatePainPoints",
            Self::GenerateSolutions => "generateSolutions",
            Self::UserStories => "userStories",
            Self::ProductVision => "productVision",
            Self::FunctionalRequirements => "functionalRequirements",
            Self::SystemArchitecture => "systemArchitecture",
            Self::DataFlowDiagram => "dataFlowDiagram",
            Self::EntityRelationshipDiagram => "entityRelationshipDiagram",
            Self::DesignSystem => "designSystem",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == raw)
    }
}

/// The six documents produced at the end of a successful run, in
/// generation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    ProductVision,
    FunctionalRequirements,
    SystemArchitecture,
    DataFlowDiagram,
    EntityRelationshipDiagram,
    DesignSystem,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 6] = [
        DocumentKind::ProductVision,
        DocumentKind::FunctionalRequirements,
        DocumentKind::SystemArchitecture,
        DocumentKind::DataFlowDiagram,
        DocumentKind::EntityRelationshipDiagram,
        DocumentKind::DesignSystem,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Self::ProductVision => "Product Vision",
            Self::FunctionalRequirements => "Functional Requirements",
            Self::SystemArchitecture => "System Architecture",
            Self::DataFlowDiagram => "Data Flow Diagram",
            Self::EntityRelationshipDiagram => "Entity Relationship Diagram",
            Self::DesignSystem => "Design System",
        }
    }

    /// Node name inside the document-generation sub-pipeline.
    pub fn node_name(self) -> &'static str {
        match self {
            Self::ProductVision => "product_vision",
            Self::FunctionalRequirements => "functional_requirements",
            Self::SystemArchitecture => "system_architecture",
            Self::DataFlowDiagram => "data_flow_diagram",
            Self::EntityRelationshipDiagram => "entity_relationship_diagram",
            Self::DesignSystem => "design_system",
        }
    }

    pub fn prompt_key(self) -> PromptKey {
        match self {
            Self::ProductVision => PromptKey::ProductVision,
            Self::FunctionalRequirements => PromptKey::FunctionalRequirements,
            Self::SystemArchitecture => PromptKey::SystemArchitecture,
            Self::DataFlowDiagram => PromptKey::DataFlowDiagram,
            Self::EntityRelationshipDiagram => PromptKey::EntityRelationshipDiagram,
            Self::DesignSystem => PromptKey::DesignSystem,
        }
    }
}

/// User-editable template instructions for the final documents. The
/// generation steps carry no default; an override there is purely
/// additive.
pub fn default_prompts() -> BTreeMap<PromptKey, String> {
    BTreeMap::from([
        (
            PromptKey::ProductVision,
            "Use the product-vision-guide.md as a template. Create an executive summary, \
             a core value proposition based on the personas and problem, and define the \
             MVP feature set based on the must-have features."
                .to_string(),
        ),
        (
            PromptKey::FunctionalRequirements,
            "Use functional_requirements_doc.md. Detail features derived from the user \
             stories, including acceptance criteria and data handling rules."
                .to_string(),
        ),
        (
            PromptKey::SystemArchitecture,
            "Use system_architecture.md. Define an architectural pattern, component \
             breakdown, and technology stack suitable for the functional requirements."
                .to_string(),
        ),
        (
            PromptKey::DataFlowDiagram,
            "Use data_flow_diagram.md. Create Mermaid syntax diagrams for key user \
             flows, showing how data moves between the defined system components."
                .to_string(),
        ),
        (
            PromptKey::EntityRelationshipDiagram,
            "Use entity_relationship_diagram.md. Create a Mermaid ERD based on the data \
             stores and flows. Define entities, attributes, and relationships to support \
             the application's features."
                .to_string(),
        ),
        (
            PromptKey::DesignSystem,
            "Use atomic-design-system.md. Define foundational design tokens (colors, \
             typography) and key atomic components required to build the UI for the \
             specified features."
                .to_string(),
        ),
    ])
}
