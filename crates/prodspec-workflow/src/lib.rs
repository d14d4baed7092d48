//! Product-spec pipeline: turns a one-line problem statement into
//! validated personas, pain points, solutions, focus-group features,
//! user stories, and six generated specification documents, persisted
//! at the end of the run.
//!
//! Built on `prodspec-engine` (graph walking, channel merging,
//! checkpointed resumption) and `prodspec-llm` (schema-validated
//! generation). Callers supply the two capabilities the pipeline cannot
//! decide for itself: a [`TextGenerator`] and a
//! [`nodes::PersistenceSink`].
//!
//! ```no_run
//! # use std::sync::Arc;
//! # async fn demo(
//! #     generator: Arc<dyn prodspec_workflow::TextGenerator>,
//! #     sink: Arc<dyn prodspec_workflow::PersistenceSink>,
//! # ) -> Result<(), prodspec_workflow::WorkflowError> {
//! use prodspec_workflow::{WorkflowOptions, run_workflow};
//!
//! let report = run_workflow(
//!     "Freelancers struggle to track multiple client invoices",
//!     generator,
//!     sink,
//!     WorkflowOptions::default(),
//! )
//! .await?;
//! assert_eq!(report.state.current_step, "completed");
//! # Ok(())
//! # }
//! ```

pub mod entities;
pub mod errors;
pub mod graph;
pub mod nodes;
pub mod prompts;
pub mod responses;
pub mod routers;
pub mod run;
pub mod state;
pub mod subgraphs;

pub use entities::*;
pub use errors::*;
pub use graph::build_workflow_graph;
pub use nodes::PersistenceSink;
pub use prompts::{DocumentKind, PromptKey, default_prompts};
pub use run::*;
pub use state::*;

pub use prodspec_engine::{RunEvent, RunReport, RunStatus};
pub use prodspec_llm::{GenerateOptions, TextGenerator};
