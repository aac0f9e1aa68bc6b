//! Decision dependency graph
//!
//! Builds the dependency graph from each decision's declared information
//! requirements and computes a topological evaluation order. Nodes caught in
//! dependency cycles are identified so the runtime can fail exactly those
//! while unrelated branches keep evaluating.

use std::collections::{HashMap, HashSet, VecDeque};
use verdict_core::model::{Definitions, InformationRequirement};

/// Dependency graph over a model's decisions
#[derive(Debug)]
pub struct DecisionGraph {
    names: Vec<String>,
    index: HashMap<String, usize>,
    /// Decision-to-decision dependency edges (indices into `names`)
    dependencies: Vec<Vec<usize>>,
    /// Required input-data names per decision
    required_inputs: Vec<Vec<String>>,
    /// Requirements naming decisions that do not exist in the model
    unknown_dependencies: Vec<(usize, String)>,
}

impl DecisionGraph {
    /// Build the graph from a model's decisions
    pub fn build(definitions: &Definitions) -> Self {
        let names: Vec<String> = definitions.decisions.iter().map(|d| d.name.clone()).collect();
        let index: HashMap<String, usize> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();

        let mut dependencies = vec![Vec::new(); names.len()];
        let mut required_inputs = vec![Vec::new(); names.len()];
        let mut unknown_dependencies = Vec::new();

        for (i, decision) in definitions.decisions.iter().enumerate() {
            for requirement in &decision.information_requirements {
                match requirement {
                    InformationRequirement::RequiredInput { name } => {
                        required_inputs[i].push(name.clone());
                    }
                    InformationRequirement::RequiredDecision { name } => {
                        match index.get(name) {
                            Some(&dep) => dependencies[i].push(dep),
                            None => unknown_dependencies.push((i, name.clone())),
                        }
                    }
                }
            }
        }

        Self {
            names,
            index,
            dependencies,
            required_inputs,
            unknown_dependencies,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, node: usize) -> &str {
        &self.names[node]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn dependencies_of(&self, node: usize) -> &[usize] {
        &self.dependencies[node]
    }

    pub fn required_inputs_of(&self, node: usize) -> &[String] {
        &self.required_inputs[node]
    }

    /// Requirements that name decisions absent from the model
    pub fn unknown_dependencies_of(&self, node: usize) -> Vec<&str> {
        self.unknown_dependencies
            .iter()
            .filter(|(i, _)| *i == node)
            .map(|(_, name)| name.as_str())
            .collect()
    }

    /// Kahn's topological order plus the set of nodes involved in cycles.
    ///
    /// Nodes merely downstream of a cycle are not in the cyclic set; the
    /// runtime fails them as dependency-unsatisfied instead.
    pub fn evaluation_order(&self) -> (Vec<usize>, Vec<usize>) {
        let mut in_degree = vec![0usize; self.len()];
        for (node, deps) in self.dependencies.iter().enumerate() {
            in_degree[node] = deps.len();
        }

        let mut dependents = vec![Vec::new(); self.len()];
        for (node, deps) in self.dependencies.iter().enumerate() {
            for &dep in deps {
                dependents[dep].push(node);
            }
        }

        let mut queue: VecDeque<usize> = (0..self.len()).filter(|&n| in_degree[n] == 0).collect();
        let mut order = Vec::with_capacity(self.len());

        while let Some(node) = queue.pop_front() {
            order.push(node);
            for &dependent in &dependents[node] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        let residual: HashSet<usize> = (0..self.len())
            .filter(|&n| in_degree[n] > 0)
            .collect();
        let cyclic: Vec<usize> = residual
            .iter()
            .copied()
            .filter(|&n| self.reaches_itself(n, &residual))
            .collect();

        // Residual non-cyclic nodes still need an order slot so the runtime
        // can fail them as dependency-unsatisfied after their cyclic deps
        let mut remaining: Vec<usize> = residual
            .into_iter()
            .filter(|n| !cyclic.contains(n))
            .collect();
        remaining.sort_unstable();
        order.extend(remaining);

        (order, cyclic)
    }

    /// The transitive dependency closure of one node, itself included
    pub fn closure_of(&self, node: usize) -> HashSet<usize> {
        let mut closure = HashSet::new();
        let mut queue = VecDeque::from([node]);
        while let Some(n) = queue.pop_front() {
            if closure.insert(n) {
                for &dep in &self.dependencies[n] {
                    queue.push_back(dep);
                }
            }
        }
        closure
    }

    fn reaches_itself(&self, start: usize, within: &HashSet<usize>) -> bool {
        let mut queue: VecDeque<usize> = self.dependencies[start]
            .iter()
            .copied()
            .filter(|n| within.contains(n))
            .collect();
        let mut visited = HashSet::new();

        while let Some(node) = queue.pop_front() {
            if node == start {
                return true;
            }
            if visited.insert(node) {
                for &dep in &self.dependencies[node] {
                    if within.contains(&dep) {
                        queue.push_back(dep);
                    }
                }
            }
        }
        false
    }
}
