//! Cycle detection over the instance dependency graph.
//!
//! Uses **depth-first search with a recursion stack** (the "three colors" approach):
//! - **White (unvisited)**: node not yet explored
//! - **Gray (on stack)**: node currently being explored
//! - **Black (done)**: node and everything reachable from it explored
//!
//! Reaching a gray node means the current path loops back on itself; the path segment
//! from that node to the current one, closed by the back edge, is the reported cycle.
//!
//! **Time Complexity**: O(V + E) where V = instances, E = dependency edges

use crate::config::DependencyGraph;
use crate::errors::ConfigError;
use crate::observability::messages::validation::CycleDetected;
use crate::observability::messages::StructuredLog;

#[derive(Clone, Copy, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Find one cycle, returned as node indices with the first node repeated at the end.
///
/// Roots are explored in declaration order so the reported cycle is deterministic.
pub fn find_cycle(graph: &DependencyGraph) -> Option<Vec<usize>> {
    let mut colors = vec![Color::White; graph.len()];
    let mut path = Vec::new();

    for start in 0..graph.len() {
        if colors[start] == Color::White {
            if let Some(cycle) = dfs_cycle_detection(start, graph, &mut colors, &mut path) {
                return Some(cycle);
            }
        }
    }
    None
}

fn dfs_cycle_detection(
    node: usize,
    graph: &DependencyGraph,
    colors: &mut [Color],
    path: &mut Vec<usize>,
) -> Option<Vec<usize>> {
    colors[node] = Color::Gray;
    path.push(node);

    for &next in graph.dependents(node) {
        match colors[next] {
            Color::Gray => {
                // Back edge: the cycle starts where `next` sits on the current path
                let start = path.iter().position(|&n| n == next).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(next);
                return Some(cycle);
            }
            Color::White => {
                if let Some(cycle) = dfs_cycle_detection(next, graph, colors, path) {
                    return Some(cycle);
                }
            }
            Color::Black => {}
        }
    }

    path.pop();
    colors[node] = Color::Black;
    None
}

/// Reject cyclic graphs with a `CyclicGraph` error naming the cycle's instance ids.
pub fn validate_acyclic<S: AsRef<str>>(graph: &DependencyGraph, ids: &[S]) -> Result<(), ConfigError> {
    match find_cycle(graph) {
        None => Ok(()),
        Some(cycle) => {
            let cycle: Vec<String> = cycle
                .into_iter()
                .map(|index| ids[index].as_ref().to_string())
                .collect();
            CycleDetected { cycle: &cycle }.log();
            Err(ConfigError::CyclicGraph { cycle })
        }
    }
}
