// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for retrieving points, switches and vertices from a
//! [`TopologyGraph`].

use crate::topology::iterators::{Points, Switches};

use super::{TopologyGraph, TopologyPoint, Vertex, VerticesByPoint};

/// Point and switch retrieval.
impl<P> TopologyGraph<P>
where
    P: TopologyPoint,
{
    /// Returns the id of the voltage level the graph was built for.
    pub fn voltage_level_id(&self) -> &str {
        &self.voltage_level_id
    }

    /// Returns an iterator over the points in the graph.
    pub fn points(&self) -> Points<'_, P> {
        Points {
            iter: self.graph.raw_nodes().iter(),
        }
    }

    /// Returns an iterator over the switches in the graph.
    pub fn switches(&self) -> Switches<'_, P> {
        Switches {
            nodes: self.graph.raw_nodes(),
            iter: self.graph.raw_edges().iter(),
        }
    }

    pub fn contains_point(&self, point: &P) -> bool {
        self.point_indices.contains_key(point)
    }

    pub fn point_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn switch_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns the equipment terminals attached to the given point.
    ///
    /// Points only reached by switches have no vertices.
    pub fn vertices(&self, point: &P) -> &[Vertex<P>] {
        self.vertices_by_point
            .get(point)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn vertices_by_point(&self) -> &VerticesByPoint<P> {
        &self.vertices_by_point
    }
}
