use std::collections::BTreeSet;

/// Instance-level dependency view of a graph, indexed by declaration order.
///
/// An edge `from -> to` exists when some output of `from` feeds an input of `to`;
/// several connections between the same pair collapse into one edge.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    dependents: Vec<Vec<usize>>,
    in_degrees: Vec<usize>,
}

impl DependencyGraph {
    /// Create a graph with `len` nodes and no edges
    pub fn new(len: usize) -> Self {
        Self {
            dependents: vec![Vec::new(); len],
            in_degrees: vec![0; len],
        }
    }

    /// Add a dependency edge; returns false if it already existed
    pub fn add_edge(&mut self, from: usize, to: usize) -> bool {
        if self.dependents[from].contains(&to) {
            return false;
        }
        self.dependents[from].push(to);
        self.in_degrees[to] += 1;
        true
    }

    /// Get the instances that depend on `index`
    pub fn dependents(&self, index: usize) -> &[usize] {
        &self.dependents[index]
    }

    /// Number of distinct upstream instances per node
    pub fn in_degrees(&self) -> &[usize] {
        &self.in_degrees
    }

    pub fn len(&self) -> usize {
        self.dependents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty()
    }

    /// Kahn's algorithm with a declaration-order tie-break. `None` if the graph has a cycle.
    pub fn topological_order(&self) -> Option<Vec<usize>> {
        let mut remaining = self.in_degrees.clone();
        let mut ready: BTreeSet<usize> = remaining
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(index, _)| index)
            .collect();
        let mut order = Vec::with_capacity(self.len());

        while let Some(index) = ready.pop_first() {
            order.push(index);
            for &dependent in &self.dependents[index] {
                remaining[dependent] -= 1;
                if remaining[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        (order.len() == self.len()).then_some(order)
    }
}
