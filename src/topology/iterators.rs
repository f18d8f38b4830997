// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Iterators over points and switches in a `TopologyGraph`.

use crate::topology::TopologyPoint;

/// An iterator over the points in a `TopologyGraph`.
pub struct Points<'a, P>
where
    P: TopologyPoint,
{
    pub(crate) iter: std::slice::Iter<'a, petgraph::graph::Node<P>>,
}

impl<'a, P> Iterator for Points<'a, P>
where
    P: TopologyPoint,
{
    type Item = &'a P;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|n| &n.weight)
    }
}

/// A switch merging two points of a `TopologyGraph`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwitchEdge<'a, P> {
    pub switch_id: &'a str,
    pub point1: &'a P,
    pub point2: &'a P,
}

/// An iterator over the switches in a `TopologyGraph`.
pub struct Switches<'a, P>
where
    P: TopologyPoint,
{
    pub(crate) nodes: &'a [petgraph::graph::Node<P>],
    pub(crate) iter: std::slice::Iter<'a, petgraph::graph::Edge<String>>,
}

impl<'a, P> Iterator for Switches<'a, P>
where
    P: TopologyPoint,
{
    type Item = SwitchEdge<'a, P>;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|e| SwitchEdge {
            switch_id: &e.weight,
            point1: &self.nodes[e.source().index()].weight,
            point2: &self.nodes[e.target().index()].weight,
        })
    }
}
