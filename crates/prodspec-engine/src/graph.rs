use crate::runner::{RunConfig, walk};
use crate::{EngineError, NodeHandler, Router, StateChannels};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Terminal marker: an edge or router target pointing here ends the run.
pub const END: &str = "__end__";

pub(crate) enum EdgeSpec<S: StateChannels> {
    Fixed(String),
    Conditional {
        router: Router<S>,
        targets: BTreeMap<String, String>,
    },
}

impl<S: StateChannels> EdgeSpec<S> {
    fn target_names(&self) -> Vec<&str> {
        match self {
            Self::Fixed(to) => vec![to.as_str()],
            Self::Conditional { targets, .. } => {
                targets.values().map(String::as_str).collect()
            }
        }
    }
}

/// Declarative graph definition: named node handlers plus, per node,
/// either a fixed next node or a router with a label-to-target table.
/// `compile` turns it into an executable plan and is the single place
/// where structural mistakes surface, synchronously, at build time.
pub struct GraphBuilder<S: StateChannels> {
    name: String,
    nodes: BTreeMap<String, Arc<dyn NodeHandler<S>>>,
    edges: BTreeMap<String, EdgeSpec<S>>,
    entry: Option<String>,
    violations: Vec<String>,
}

impl<S: StateChannels> GraphBuilder<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            entry: None,
            violations: Vec::new(),
        }
    }

    pub fn add_node(
        mut self,
        name: impl Into<String>,
        handler: Arc<dyn NodeHandler<S>>,
    ) -> Self {
        let name = name.into();
        if name == END {
            self.violations
                .push(format!("node name '{name}' collides with the terminal marker"));
            return self;
        }
        if self.nodes.insert(name.clone(), handler).is_some() {
            self.violations
                .push(format!("node name '{name}' registered more than once"));
        }
        self
    }

    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        if self.edges.insert(from.clone(), EdgeSpec::Fixed(to.into())).is_some() {
            self.violations
                .push(format!("node '{from}' declares more than one outgoing edge"));
        }
        self
    }

    /// Register a conditional edge: after `from` completes, `router` is
    /// invoked with the merged state and its label is resolved through
    /// `targets` to the next node (or `END`).
    pub fn add_conditional_edges(
        mut self,
        from: impl Into<String>,
        router: Router<S>,
        targets: BTreeMap<String, String>,
    ) -> Self {
        let from = from.into();
        if self
            .edges
            .insert(from.clone(), EdgeSpec::Conditional { router, targets })
            .is_some()
        {
            self.violations
                .push(format!("node '{from}' declares more than one outgoing edge"));
        }
        self
    }

    pub fn set_entry(mut self, name: impl Into<String>) -> Self {
        self.entry = Some(name.into());
        self
    }

    pub fn compile(self) -> Result<CompiledGraph<S>, EngineError> {
        let mut violations = self.violations;

        let Some(entry) = self.entry.clone() else {
            return Err(EngineError::InvalidGraph(
                format!("graph '{}' has no entry node", self.name),
            ));
        };
        if !self.nodes.contains_key(&entry) {
            violations.push(format!("entry node '{entry}' is not registered"));
        }

        for (from, spec) in &self.edges {
            if !self.nodes.contains_key(from) {
                violations.push(format!("edge declared from unknown node '{from}'"));
            }
            for target in spec.target_names() {
                if target != END && !self.nodes.contains_key(target) {
                    violations.push(format!(
                        "edge from '{from}' targets unknown node '{target}'"
                    ));
                }
            }
        }

        for name in self.nodes.keys() {
            if !self.edges.contains_key(name) {
                violations.push(format!(
                    "node '{name}' has no outgoing edge and is not the terminal marker"
                ));
            }
        }

        if self.nodes.contains_key(&entry) {
            let reachable = reachable_from(&entry, &self.edges);
            for name in self.nodes.keys() {
                if !reachable.contains(name.as_str()) {
                    violations.push(format!(
                        "node '{name}' is not reachable from entry '{entry}'"
                    ));
                }
            }
        }

        if !violations.is_empty() {
            return Err(EngineError::InvalidGraph(format!(
                "graph '{}': {}",
                self.name,
                violations.join("; ")
            )));
        }

        Ok(CompiledGraph {
            name: self.name,
            nodes: self.nodes,
            edges: self.edges,
            entry,
        })
    }
}

fn reachable_from<S: StateChannels>(
    entry: &str,
    edges: &BTreeMap<String, EdgeSpec<S>>,
) -> BTreeSet<String> {
    let mut reachable = BTreeSet::from([entry.to_string()]);
    let mut frontier = vec![entry.to_string()];
    while let Some(current) = frontier.pop() {
        let Some(spec) = edges.get(&current) else {
            continue;
        };
        for target in spec.target_names() {
            if target != END && reachable.insert(target.to_string()) {
                frontier.push(target.to_string());
            }
        }
    }
    reachable
}

/// Executable plan produced by `GraphBuilder::compile`. The driver walks
/// it strictly sequentially; there is no parallel fan-out.
pub struct CompiledGraph<S: StateChannels> {
    pub(crate) name: String,
    pub(crate) nodes: BTreeMap<String, Arc<dyn NodeHandler<S>>>,
    pub(crate) edges: BTreeMap<String, EdgeSpec<S>>,
    pub(crate) entry: String,
}

impl<S: StateChannels> std::fmt::Debug for CompiledGraph<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledGraph")
            .field("name", &self.name)
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("entry", &self.entry)
            .finish_non_exhaustive()
    }
}

impl<S: StateChannels> CompiledGraph<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Mount this graph as a single node of a parent graph. The
    /// sub-pipeline receives the full parent state and its walk is
    /// reported back as one composed partial update, merged through the
    /// same reducer machinery as any other node.
    pub fn into_node(self) -> SubgraphNode<S> {
        SubgraphNode {
            graph: Arc::new(self),
        }
    }
}

pub struct SubgraphNode<S: StateChannels> {
    graph: Arc<CompiledGraph<S>>,
}

#[async_trait]
impl<S: StateChannels> NodeHandler<S> for SubgraphNode<S> {
    async fn run(&self, state: &S) -> Result<S::Update, EngineError> {
        let outcome = walk(&self.graph, state.clone(), RunConfig::default()).await?;
        Ok(outcome.update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoopNode, router};

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Blank;

    impl StateChannels for Blank {
        type Update = ();

        fn apply(self, _update: ()) -> Self {
            self
        }

        fn merge_updates(_first: (), _second: ()) {}

        fn failure_update(_step: &str, _message: &str, _detail: serde_json::Value) {}

        fn mark_step(_update: &mut (), _step: &str) {}
    }

    fn noop() -> Arc<dyn NodeHandler<Blank>> {
        Arc::new(NoopNode)
    }

    #[test]
    fn compile_linear_graph_expected_success() {
        let graph = GraphBuilder::<Blank>::new("g")
            .add_node("a", noop())
            .add_node("b", noop())
            .add_edge("a", "b")
            .add_edge("b", END)
            .set_entry("a")
            .compile()
            .expect("graph should compile");
        assert_eq!(graph.entry(), "a");
        assert_eq!(graph.node_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn compile_unknown_edge_target_expected_invalid_graph() {
        let error = GraphBuilder::<Blank>::new("g")
            .add_node("a", noop())
            .add_edge("a", "ghost")
            .set_entry("a")
            .compile()
            .expect_err("compile should fail");
        assert!(matches!(error, EngineError::InvalidGraph(message)
            if message.contains("unknown node 'ghost'")));
    }

    #[test]
    fn compile_unknown_conditional_target_expected_invalid_graph() {
        let error = GraphBuilder::<Blank>::new("g")
            .add_node("a", noop())
            .add_conditional_edges(
                "a",
                router(|_: &Blank| "go".to_string()),
                BTreeMap::from([("go".to_string(), "missing".to_string())]),
            )
            .set_entry("a")
            .compile()
            .expect_err("compile should fail");
        assert!(matches!(error, EngineError::InvalidGraph(message)
            if message.contains("targets unknown node 'missing'")));
    }

    #[test]
    fn compile_duplicate_node_name_expected_invalid_graph() {
        let error = GraphBuilder::<Blank>::new("g")
            .add_node("a", noop())
            .add_node("a", noop())
            .add_edge("a", END)
            .set_entry("a")
            .compile()
            .expect_err("compile should fail");
        assert!(matches!(error, EngineError::InvalidGraph(message)
            if message.contains("registered more than once")));
    }

    #[test]
    fn compile_unreachable_node_expected_invalid_graph() {
        let error = GraphBuilder::<Blank>::new("g")
            .add_node("a", noop())
            .add_node("island", noop())
            .add_edge("a", END)
            .add_edge("island", END)
            .set_entry("a")
            .compile()
            .expect_err("compile should fail");
        assert!(matches!(error, EngineError::InvalidGraph(message)
            if message.contains("'island' is not reachable")));
    }

    #[test]
    fn compile_missing_entry_expected_invalid_graph() {
        let error = GraphBuilder::<Blank>::new("g")
            .add_node("a", noop())
            .add_edge("a", END)
            .compile()
            .expect_err("compile should fail");
        assert!(matches!(error, EngineError::InvalidGraph(message)
            if message.contains("no entry node")));
    }

    #[test]
    fn compile_node_without_edge_expected_invalid_graph() {
        let error = GraphBuilder::<Blank>::new("g")
            .add_node("a", noop())
            .add_node("b", noop())
            .add_edge("a", "b")
            .set_entry("a")
            .compile()
            .expect_err("compile should fail");
        assert!(matches!(error, EngineError::InvalidGraph(message)
            if message.contains("'b' has no outgoing edge")));
    }
}
