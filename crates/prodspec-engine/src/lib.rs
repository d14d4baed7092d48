//! Workflow graph engine: a typed shared state threaded through a fixed
//! graph of steps, with deterministic per-channel merging, conditional
//! routing, failure isolation, checkpointed resumption, and one-shot or
//! streaming execution.

pub mod channels;
pub mod checkpoint;
pub mod errors;
pub mod events;
pub mod graph;
pub mod node;
pub mod router;
pub mod runner;
pub mod step;

pub use channels::*;
pub use checkpoint::*;
pub use errors::*;
pub use events::*;
pub use graph::*;
pub use node::*;
pub use router::*;
pub use runner::*;
pub use step::*;
