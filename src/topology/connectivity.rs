// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains methods that find the connected components of a
//! [`TopologyGraph`].

use std::collections::{BTreeMap, BTreeSet};

use petgraph::unionfind::UnionFind;
use petgraph::visit::Bfs;

use super::{TopologyGraph, TopologyPoint};

/// Connectivity methods.
impl<P> TopologyGraph<P>
where
    P: TopologyPoint,
{
    /// Returns the sets of points connected to each other through the
    /// switches of the graph.
    ///
    /// Points without any switch form components of their own.  The
    /// components are sorted by their smallest point.
    pub fn connected_components(&self) -> Vec<BTreeSet<P>> {
        let mut sets = UnionFind::new(self.graph.node_count());
        for edge in self.graph.raw_edges() {
            sets.union(edge.source().index(), edge.target().index());
        }

        let mut components: BTreeMap<usize, BTreeSet<P>> = BTreeMap::new();
        for idx in self.graph.node_indices() {
            components
                .entry(sets.find_mut(idx.index()))
                .or_default()
                .insert(self.graph[idx].clone());
        }

        let mut components = components.into_values().collect::<Vec<_>>();
        components.sort();
        components
    }

    /// Returns the set of points connected to `start`, `start` included.
    ///
    /// Returns `None` if `start` is not a point of the graph.
    pub fn connected_component_of(&self, start: &P) -> Option<BTreeSet<P>> {
        let &start_idx = self.point_indices.get(start)?;
        let mut bfs = Bfs::new(&self.graph, start_idx);
        let mut component = BTreeSet::new();
        while let Some(idx) = bfs.next(&self.graph) {
            component.insert(self.graph[idx].clone());
        }
        Some(component)
    }
}
