// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Predicates deciding which connected components of a [`TopologyGraph`]
//! are electrical buses.
//!
//! [`TopologyGraph`]: super::TopologyGraph

use std::collections::BTreeSet;

use super::{EquipmentKind, TopologyPoint, VerticesByPoint};

/// Decides whether a connected component is a bus.
///
/// Implemented for all functions and closures with the signature of
/// [`is_valid_bus`][BusValidator::is_valid_bus], so that validators can be
/// passed around as plain values.
pub trait BusValidator<P> {
    fn is_valid_bus(&self, vertices_by_point: &VerticesByPoint<P>, component: &BTreeSet<P>)
        -> bool;
}

impl<P, F> BusValidator<P> for F
where
    F: Fn(&VerticesByPoint<P>, &BTreeSet<P>) -> bool,
{
    fn is_valid_bus(
        &self,
        vertices_by_point: &VerticesByPoint<P>,
        component: &BTreeSet<P>,
    ) -> bool {
        self(vertices_by_point, component)
    }
}

#[derive(Default, Debug, PartialEq)]
struct EquipmentCount {
    feeder_count: usize,
    branch_count: usize,
    busbar_section_count: usize,
}

impl EquipmentCount {
    fn add(&mut self, kind: EquipmentKind) {
        if kind.is_feeder() {
            self.feeder_count += 1;
        }
        if kind.is_branch() {
            self.branch_count += 1;
        }
        if kind.is_busbar_section() {
            self.busbar_section_count += 1;
        }
    }
}

/// The validator of the bus view.
///
/// A component is a bus if it has a busbar section and at least one feeder,
/// or if it has a branch and at least two feeders.  Points without
/// equipment don't count.
pub fn bus_view_validator<P: TopologyPoint>(
    vertices_by_point: &VerticesByPoint<P>,
    component: &BTreeSet<P>,
) -> bool {
    let mut count = EquipmentCount::default();
    for point in component {
        for vertex in vertices_by_point.get(point).into_iter().flatten() {
            count.add(vertex.kind());
        }
    }
    (count.busbar_section_count >= 1 && count.feeder_count >= 1)
        || (count.branch_count >= 1 && count.feeder_count >= 2)
}

/// The validator of the bus-breaker view: every component is a bus.
pub fn bus_breaker_view_validator<P: TopologyPoint>(
    _vertices_by_point: &VerticesByPoint<P>,
    component: &BTreeSet<P>,
) -> bool {
    !component.is_empty()
}
