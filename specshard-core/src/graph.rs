//! Target dependency graph using petgraph.

use rustc_hash::FxHashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::error::{Error, Result};
use crate::target::Targets;

/// Directed acyclic graph of one project's targets.
///
/// Only dependencies on targets of the same project are followed.
#[derive(Debug)]
pub struct TargetGraph {
    graph: DiGraph<String, ()>,
    node_map: FxHashMap<String, NodeIndex>,
    cached_topological_order: Vec<String>,
}

impl TargetGraph {
    /// Builds the graph from a project's targets.
    ///
    /// # Errors
    ///
    /// Returns an error if a dependency names an unknown target or if the
    /// dependencies form a cycle.
    pub fn new(targets: &Targets) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut node_map = FxHashMap::default();

        for name in targets.keys() {
            let node = graph.add_node(name.clone());
            node_map.insert(name.clone(), node);
        }

        let available = targets.keys().cloned().collect::<Vec<_>>().join(", ");

        for (name, target) in targets {
            let from_node = node_map[name];

            for dep in target.depends_on.iter().filter(|d| d.is_self()) {
                let to_node = node_map
                    .get(&dep.target)
                    .ok_or_else(|| Error::TargetNotFound {
                        name: dep.target.clone(),
                        available: available.clone(),
                    })?;

                graph.add_edge(from_node, *to_node, ());
            }
        }

        let sorted = toposort(&graph, None).map_err(|cycle| {
            let cycle_node = graph[cycle.node_id()].clone();
            Error::CircularDependency(format!("Cycle detected involving: {}", cycle_node))
        })?;

        let topological_order = sorted
            .into_iter()
            .rev()
            .map(|idx| graph[idx].clone())
            .collect();

        Ok(Self {
            graph,
            node_map,
            cached_topological_order: topological_order,
        })
    }

    /// Targets with dependencies before dependents.
    #[inline]
    pub fn topological_order(&self) -> &[String] {
        &self.cached_topological_order
    }

    /// Direct dependencies of a target.
    pub fn dependencies(&self, target_name: &str) -> Result<Vec<String>> {
        let node = self.node(target_name)?;
        let mut deps: Vec<String> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .map(|idx| self.graph[idx].clone())
            .collect();
        // petgraph yields neighbours newest-edge first
        deps.reverse();
        Ok(deps)
    }

    /// Direct dependents of a target.
    pub fn dependents(&self, target_name: &str) -> Result<Vec<String>> {
        let node = self.node(target_name)?;
        Ok(self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .map(|idx| self.graph[idx].clone())
            .collect())
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    fn node(&self, target_name: &str) -> Result<NodeIndex> {
        self.node_map
            .get(target_name)
            .copied()
            .ok_or_else(|| Error::TargetNotFound {
                name: target_name.to_string(),
                available: self.cached_topological_order.join(", "),
            })
    }
}
