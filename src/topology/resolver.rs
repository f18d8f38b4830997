// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Resolution of equipment terminals onto topology points, for both
//! node-breaker and bus-breaker voltage levels.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::model::{
    BranchAttributes, InjectionAttributes, LegAttributes, SwitchAttributes,
    ThreeWindingsTransformerAttributes, TopologyKind,
};

use super::Side;

/// The identifier of a topology point: a node or a configured bus.
pub trait TopologyPoint: Clone + Eq + Hash + Ord + Debug + Display + 'static {}

impl<T> TopologyPoint for T where T: Clone + Eq + Hash + Ord + Debug + Display + 'static {}

/// Resolves the topology point each kind of equipment terminal is attached
/// to.
///
/// A `None` result means the terminal is not connected, and the equipment
/// then takes no part in the topology.
pub trait PointResolver {
    /// The type of the topology points.
    type Point: TopologyPoint;

    /// The topology kind of the voltage levels this resolver applies to.
    const TOPOLOGY_KIND: TopologyKind;

    fn injection_point(&self, attributes: &InjectionAttributes) -> Option<Self::Point>;

    /// Returns the point of the branch terminal on the given side.
    ///
    /// Branches only have sides `One` and `Two`.
    fn branch_point(&self, attributes: &BranchAttributes, side: Side) -> Option<Self::Point>;

    fn leg_point(&self, leg: &LegAttributes) -> Option<Self::Point>;

    /// Returns the points at both ends of a switch.
    fn switch_points(
        &self,
        attributes: &SwitchAttributes,
    ) -> (Option<Self::Point>, Option<Self::Point>);

    /// Returns the point of the three-winding transformer leg on the given
    /// side.
    fn three_windings_point(
        &self,
        attributes: &ThreeWindingsTransformerAttributes,
        side: Side,
    ) -> Option<Self::Point> {
        match side {
            Side::One => self.leg_point(&attributes.leg1),
            Side::Two => self.leg_point(&attributes.leg2),
            Side::Three => self.leg_point(&attributes.leg3),
        }
    }
}

/// Resolves terminals of node-breaker voltage levels onto their nodes.
#[derive(Clone, Copy, Debug, Default)]
pub struct NodeBreakerResolver;

impl PointResolver for NodeBreakerResolver {
    type Point = u32;

    const TOPOLOGY_KIND: TopologyKind = TopologyKind::NodeBreaker;

    fn injection_point(&self, attributes: &InjectionAttributes) -> Option<u32> {
        attributes.node
    }

    fn branch_point(&self, attributes: &BranchAttributes, side: Side) -> Option<u32> {
        match side {
            Side::One => attributes.node1,
            Side::Two => attributes.node2,
            Side::Three => None,
        }
    }

    fn leg_point(&self, leg: &LegAttributes) -> Option<u32> {
        leg.node
    }

    fn switch_points(&self, attributes: &SwitchAttributes) -> (Option<u32>, Option<u32>) {
        (attributes.node1, attributes.node2)
    }
}

/// Resolves terminals of bus-breaker voltage levels onto the configured bus
/// they are connected to.
#[derive(Clone, Copy, Debug, Default)]
pub struct BusBreakerResolver;

impl PointResolver for BusBreakerResolver {
    type Point = String;

    const TOPOLOGY_KIND: TopologyKind = TopologyKind::BusBreaker;

    fn injection_point(&self, attributes: &InjectionAttributes) -> Option<String> {
        attributes.bus.clone()
    }

    fn branch_point(&self, attributes: &BranchAttributes, side: Side) -> Option<String> {
        match side {
            Side::One => attributes.bus1.clone(),
            Side::Two => attributes.bus2.clone(),
            Side::Three => None,
        }
    }

    fn leg_point(&self, leg: &LegAttributes) -> Option<String> {
        leg.bus.clone()
    }

    fn switch_points(&self, attributes: &SwitchAttributes) -> (Option<String>, Option<String>) {
        (attributes.bus1.clone(), attributes.bus2.clone())
    }
}
