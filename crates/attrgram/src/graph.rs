//! # Graph Utilities
//!
//! Small graph algorithms shared by the grammar analyses. Graphs are given as an
//! explicit adjacency mapping from a node to the set of its successors. A node
//! that only ever appears as a successor is treated as having no out-edges.

use hashbrown::{HashMap, HashSet};
use std::hash::{BuildHasher, Hash};

const UNVISITED: usize = usize::MAX;

/// Compute the strongly connected components of a directed graph.
///
/// Uses Tarjan's algorithm with an explicit call stack, so deep dependency
/// chains cannot overflow the native stack.
///
/// Components come out in reverse topological order of the condensation: every
/// component appears after all of the components reachable from it. Members of
/// a component are listed in no particular order.
#[must_use]
pub fn strongly_connected_components<N, S, T>(graph: &HashMap<N, HashSet<N, S>, T>) -> Vec<Vec<N>>
where
    N: Hash + Eq + Clone,
    S: BuildHasher,
    T: BuildHasher,
{
    let mut ids: HashMap<&N, usize, ahash::RandomState> =
        HashMap::with_hasher(ahash::RandomState::new());
    let mut nodes: Vec<&N> = Vec::new();

    for (node, successors) in graph {
        for n in std::iter::once(node).chain(successors) {
            ids.entry(n).or_insert_with(|| {
                nodes.push(n);
                nodes.len() - 1
            });
        }
    }

    let adjacency: Vec<Vec<usize>> = nodes
        .iter()
        .map(|node| {
            graph.get(*node).map_or_else(Vec::new, |successors| {
                successors
                    .iter()
                    .filter_map(|s| ids.get(s).copied())
                    .collect()
            })
        })
        .collect();

    let count = nodes.len();
    let mut index = vec![UNVISITED; count];
    let mut lowlink = vec![0; count];
    let mut on_stack = vec![false; count];
    let mut stack: Vec<usize> = Vec::new();
    let mut next_index = 0;
    let mut components = Vec::new();
    // (node, position of the next successor to explore)
    let mut call: Vec<(usize, usize)> = Vec::new();

    for root in 0..count {
        if index[root] != UNVISITED {
            continue;
        }

        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        call.push((root, 0));

        while let Some(&(v, position)) = call.last() {
            if let Some(&w) = adjacency[v].get(position) {
                if let Some(top) = call.last_mut() {
                    top.1 += 1;
                }
                if index[w] == UNVISITED {
                    index[w] = next_index;
                    lowlink[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    call.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
                continue;
            }

            call.pop();
            if let Some(&(parent, _)) = call.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }

            if lowlink[v] == index[v] {
                let mut component = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component.push(nodes[w].clone());
                    if w == v {
                        break;
                    }
                }
                components.push(component);
            }
        }
    }

    components
}

/// Collect every node reachable from `roots`, the roots included.
pub fn transitive_closure<N, R, F, I>(roots: R, mut successors: F) -> HashSet<N, ahash::RandomState>
where
    N: Hash + Eq + Clone,
    R: IntoIterator<Item = N>,
    F: FnMut(&N) -> I,
    I: IntoIterator<Item = N>,
{
    let mut reached = HashSet::with_hasher(ahash::RandomState::new());
    let mut worklist: Vec<N> = roots.into_iter().collect();

    while let Some(node) = worklist.pop() {
        if reached.contains(&node) {
            continue;
        }
        for next in successors(&node) {
            if !reached.contains(&next) {
                worklist.push(next);
            }
        }
        reached.insert(node);
    }

    reached
}
