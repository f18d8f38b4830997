// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! A graph representation of the topology points of a voltage level, and
//! the switches that connect them, from which the electrical buses of the
//! voltage level are calculated.

mod cache;
mod calculated_bus;
mod connectivity;
mod creation;
mod resolver;
mod retrieval;
mod validation;
mod vertex;

pub mod iterators;

#[cfg(test)]
pub(crate) mod test_utils;

pub use cache::BusCache;
pub use calculated_bus::CalculatedBus;
pub use resolver::{BusBreakerResolver, NodeBreakerResolver, PointResolver, TopologyPoint};
pub use validation::{bus_breaker_view_validator, bus_view_validator, BusValidator};
pub use vertex::{EquipmentKind, Side, Vertex};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use petgraph::graph::{NodeIndex, UnGraph};

use crate::model::{SwitchAttributes, TopologyKind};
use crate::TopologyConfig;

/// Points stored in an `UnGraph` instance can be addressed with
/// `NodeIndex`es.
///
/// `PointIndexMap` stores the corresponding `NodeIndex` for any topology
/// point, so that points in the `UnGraph` can be retrieved by value.
pub(crate) type PointIndexMap<P> = HashMap<P, NodeIndex>;

/// The equipment terminals attached to each topology point.
pub type VerticesByPoint<P> = HashMap<P, Vec<Vertex<P>>>;

/// The view buses are calculated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TopologyView {
    /// Points are merged across every closed switch, and only components
    /// that look like real electrical buses are kept.
    BusView,
    /// Points are merged across closed switches that are not retained, and
    /// every component is a bus.
    BusBreakerView,
}

impl TopologyView {
    /// Returns true if the points at both ends of the switch belong to the
    /// same bus in this view.
    pub(crate) fn merges_across(
        &self,
        topology_kind: TopologyKind,
        switch: &SwitchAttributes,
    ) -> bool {
        match (self, topology_kind) {
            (TopologyView::BusView, _) => !switch.open,
            (TopologyView::BusBreakerView, TopologyKind::NodeBreaker) => {
                !switch.open && !switch.retained
            }
            // Configured buses are already the buses of the bus-breaker view.
            (TopologyView::BusBreakerView, TopologyKind::BusBreaker) => false,
        }
    }

    fn default_validator<P: TopologyPoint>(&self) -> Box<dyn BusValidator<P>> {
        match self {
            TopologyView::BusView => Box::new(bus_view_validator::<P>),
            TopologyView::BusBreakerView => Box::new(bus_breaker_view_validator::<P>),
        }
    }
}

/// The topology points of one voltage level, connected by the switches that
/// merge them.
///
/// This is an undirected multigraph: two points can be connected by any
/// number of parallel switches.
pub struct TopologyGraph<P>
where
    P: TopologyPoint,
{
    voltage_level_id: String,
    graph: UnGraph<P, String>,
    point_indices: PointIndexMap<P>,
    vertices_by_point: VerticesByPoint<P>,
}

static NEXT_TOPOLOGY_ID: AtomicU64 = AtomicU64::new(0);

fn next_topology_id() -> u64 {
    NEXT_TOPOLOGY_ID.fetch_add(1, Ordering::Relaxed)
}

/// Calculates the buses of voltage levels for one topology kind and one
/// view.
pub struct Topology<R>
where
    R: PointResolver,
{
    /// Identifies the view and validator of this topology in a [`BusCache`].
    id: u64,
    resolver: R,
    view: TopologyView,
    validator: Box<dyn BusValidator<R::Point>>,
    config: TopologyConfig,
}

impl<R> Topology<R>
where
    R: PointResolver,
{
    /// Creates a new [`Topology`] that validates buses with the default
    /// validator of the given view.
    pub fn new(resolver: R, view: TopologyView, config: TopologyConfig) -> Self {
        Self {
            id: next_topology_id(),
            resolver,
            view,
            validator: view.default_validator(),
            config,
        }
    }

    /// Replaces the bus validator.
    ///
    /// The returned topology doesn't share cached buses with `self`.
    pub fn with_validator(mut self, validator: impl BusValidator<R::Point> + 'static) -> Self {
        self.id = next_topology_id();
        self.validator = Box::new(validator);
        self
    }

    pub fn view(&self) -> TopologyView {
        self.view
    }

    pub fn config(&self) -> &TopologyConfig {
        &self.config
    }
}

impl Topology<NodeBreakerResolver> {
    /// Creates a [`Topology`] for node-breaker voltage levels.
    pub fn node_breaker(view: TopologyView) -> Self {
        Self::new(NodeBreakerResolver, view, TopologyConfig::default())
    }
}

impl Topology<BusBreakerResolver> {
    /// Creates a [`Topology`] for bus-breaker voltage levels.
    pub fn bus_breaker(view: TopologyView) -> Self {
        Self::new(BusBreakerResolver, view, TopologyConfig::default())
    }
}
