//! Dependency tracking for ordered recalculation

use ahash::{AHashMap, AHashSet};
use gridcalc_core::CellAddress;

/// Dependency graph for formula cells
///
/// Tracks which cells depend on which other cells, so formula cells can be
/// evaluated after everything they read.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Cell → Cells that depend on it (dependents)
    dependents: AHashMap<CellAddress, AHashSet<CellAddress>>,
    /// Cell → Cells it depends on (precedents)
    precedents: AHashMap<CellAddress, AHashSet<CellAddress>>,
}

/// Result of ordering a set of formula cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationOrder {
    /// Every requested cell, precedents before dependents
    pub order: Vec<CellAddress>,
    /// Cells that lie on a reference cycle
    pub circular: AHashSet<CellAddress>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency: dependent depends on precedent
    pub fn add_dependency(&mut self, precedent: CellAddress, dependent: CellAddress) {
        self.dependents
            .entry(precedent)
            .or_default()
            .insert(dependent);
        self.precedents
            .entry(dependent)
            .or_default()
            .insert(precedent);
    }

    /// Remove all dependencies for a cell
    pub fn clear_dependencies(&mut self, cell: CellAddress) {
        // Remove from all precedents' dependents list
        if let Some(precedents) = self.precedents.remove(&cell) {
            for precedent in precedents {
                if let Some(deps) = self.dependents.get_mut(&precedent) {
                    deps.remove(&cell);
                }
            }
        }

        // Remove as a precedent for others
        if let Some(dependents) = self.dependents.remove(&cell) {
            for dependent in dependents {
                if let Some(precs) = self.precedents.get_mut(&dependent) {
                    precs.remove(&cell);
                }
            }
        }
    }

    /// Get cells that depend on the given cell
    pub fn dependents(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get cells that the given cell depends on
    pub fn precedents(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.precedents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Detect circular references involving a cell
    pub fn has_circular_reference(&self, cell: CellAddress) -> bool {
        let mut visited = AHashSet::new();
        let mut pending: Vec<CellAddress> = self.precedents(cell).collect();

        while let Some(next) = pending.pop() {
            if next == cell {
                return true;
            }
            if visited.insert(next) {
                pending.extend(self.precedents(next));
            }
        }
        false
    }

    /// Order `nodes` so every cell comes after the cells it reads
    ///
    /// Precedents outside `nodes` are treated as plain inputs. Cells on a
    /// cycle are reported in [`EvaluationOrder::circular`] and still appear
    /// in the order, after their acyclic precedents. Otherwise cells keep the
    /// order of `nodes`.
    pub fn evaluation_order(&self, nodes: &[CellAddress]) -> EvaluationOrder {
        let members: AHashMap<CellAddress, usize> = nodes
            .iter()
            .enumerate()
            .map(|(pos, &node)| (node, pos))
            .collect();
        let mut scc = SccState::default();
        let mut result = EvaluationOrder {
            order: Vec::with_capacity(nodes.len()),
            circular: AHashSet::new(),
        };

        for &root in nodes {
            if scc.index.contains_key(&root) {
                continue;
            }

            let mut work = vec![scc.open(root, self.sorted_precedents(root, &members))];

            while let Some(frame) = work.last_mut() {
                let next = frame.successors.get(frame.pos).copied();
                if let Some(next) = next {
                    frame.pos += 1;
                    let node = frame.node;

                    if !scc.index.contains_key(&next) {
                        work.push(scc.open(next, self.sorted_precedents(next, &members)));
                    } else if scc.on_stack.contains(&next) {
                        let next_index = scc.index.get(&next).copied().unwrap_or(usize::MAX);
                        scc.lower(node, next_index);
                    }
                    continue;
                }

                let node = frame.node;
                work.pop();

                let low = scc.lowlink.get(&node).copied().unwrap_or(usize::MAX);
                if let Some(parent) = work.last() {
                    scc.lower(parent.node, low);
                }

                if Some(low) == scc.index.get(&node).copied() {
                    let component = scc.close(node);
                    let self_loop = self
                        .precedents
                        .get(&node)
                        .map_or(false, |p| p.contains(&node));
                    if component.len() > 1 || self_loop {
                        result.circular.extend(component.iter().copied());
                    }
                    result.order.extend(component);
                }
            }
        }

        result
    }

    /// Precedents of a cell restricted to `members`, in member order
    fn sorted_precedents(
        &self,
        cell: CellAddress,
        members: &AHashMap<CellAddress, usize>,
    ) -> Vec<CellAddress> {
        let mut out: Vec<(usize, CellAddress)> = self
            .precedents(cell)
            .filter_map(|p| members.get(&p).map(|&pos| (pos, p)))
            .collect();
        out.sort_unstable();
        out.into_iter().map(|(_, p)| p).collect()
    }

    /// Number of cells with at least one precedent
    pub fn len(&self) -> usize {
        self.precedents.len()
    }

    /// Check if the graph has no edges
    pub fn is_empty(&self) -> bool {
        self.precedents.is_empty()
    }

    /// Clear the entire graph
    pub fn clear(&mut self) {
        self.dependents.clear();
        self.precedents.clear();
    }
}

/// Bookkeeping for Tarjan's strongly connected components walk
#[derive(Default)]
struct SccState {
    next_index: usize,
    index: AHashMap<CellAddress, usize>,
    lowlink: AHashMap<CellAddress, usize>,
    on_stack: AHashSet<CellAddress>,
    stack: Vec<CellAddress>,
}

struct Frame {
    node: CellAddress,
    successors: Vec<CellAddress>,
    pos: usize,
}

impl SccState {
    fn open(&mut self, node: CellAddress, successors: Vec<CellAddress>) -> Frame {
        self.index.insert(node, self.next_index);
        self.lowlink.insert(node, self.next_index);
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack.insert(node);
        Frame {
            node,
            successors,
            pos: 0,
        }
    }

    fn lower(&mut self, node: CellAddress, candidate: usize) {
        if let Some(low) = self.lowlink.get_mut(&node) {
            *low = (*low).min(candidate);
        }
    }

    /// Pop the component rooted at `root`, in discovery order
    fn close(&mut self, root: CellAddress) -> Vec<CellAddress> {
        let mut component = Vec::new();
        while let Some(member) = self.stack.pop() {
            self.on_stack.remove(&member);
            component.push(member);
            if member == root {
                break;
            }
        }
        component.reverse();
        component
    }
}
