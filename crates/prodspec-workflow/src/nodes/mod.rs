mod generate_pain_points;
mod generate_personas;
mod generate_solutions;
mod save_final_state;
mod validate_problem;

pub use generate_pain_points::GeneratePainPoints;
pub use generate_personas::GeneratePersonas;
pub use generate_solutions::GenerateSolutions;
pub use save_final_state::{PersistenceSink, SaveFinalState};
pub use validate_problem::ValidateProblem;

/// Node names of the top-level pipeline.
pub const VALIDATE_PROBLEM: &str = "validate_problem";
pub const GENERATE_PERSONAS: &str = "generate_personas";
pub const GENERATE_PAIN_POINTS: &str = "generate_pain_points";
pub const GENERATE_SOLUTIONS: &str = "generate_solutions";
pub const FOCUS_GROUP: &str = "focus_group";
pub const GENERATE_DOCUMENTS: &str = "generate_documents";
pub const SAVE_FINAL_STATE: &str = "save_final_state";
