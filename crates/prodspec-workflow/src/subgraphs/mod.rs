mod document_generation;
mod focus_group;

pub use document_generation::document_generation_graph;
pub use focus_group::focus_group_graph;
