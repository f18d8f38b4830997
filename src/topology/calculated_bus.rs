// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Calculation of the buses of a voltage level from the connected
//! components of its [`TopologyGraph`].

use std::collections::{BTreeMap, BTreeSet};

use crate::{Error, NetworkIndex, VariantContext};

use super::{
    BusValidator, PointResolver, Topology, TopologyGraph, TopologyPoint, Vertex, VerticesByPoint,
};

/// An electrical bus made of topology points merged by closed switches.
#[derive(Clone, Debug, PartialEq)]
pub struct CalculatedBus<P> {
    id: String,
    voltage_level_id: String,
    points: BTreeSet<P>,
    vertices: Vec<Vertex<P>>,
}

impl<P> CalculatedBus<P>
where
    P: TopologyPoint,
{
    /// Creates the bus of a validated component.
    ///
    /// The id is derived from the voltage level id and the smallest point of
    /// the component, so it stays the same for as long as the component
    /// does.
    pub(crate) fn new(
        voltage_level_id: &str,
        points: BTreeSet<P>,
        vertices_by_point: &VerticesByPoint<P>,
    ) -> Result<Self, Error> {
        let Some(first) = points.first() else {
            return Err(Error::internal(format!(
                "Can't create a bus from an empty component in voltage level {voltage_level_id}."
            )));
        };
        let id = format!("{voltage_level_id}_{first}");
        let vertices = points
            .iter()
            .flat_map(|point| vertices_by_point.get(point).into_iter().flatten())
            .cloned()
            .collect();

        Ok(Self {
            id,
            voltage_level_id: voltage_level_id.to_string(),
            points,
            vertices,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn voltage_level_id(&self) -> &str {
        &self.voltage_level_id
    }

    /// Returns the topology points merged into this bus.
    pub fn points(&self) -> &BTreeSet<P> {
        &self.points
    }

    /// Returns the equipment terminals connected to this bus, ordered by
    /// point.
    pub fn vertices(&self) -> &[Vertex<P>] {
        &self.vertices
    }

    /// Returns the ids of the equipment connected to this bus.
    pub fn equipment_ids(&self) -> impl Iterator<Item = &str> {
        self.vertices.iter().map(|v| v.equipment_id())
    }
}

/// Bus calculation on a built graph.
impl<P> TopologyGraph<P>
where
    P: TopologyPoint,
{
    fn try_create_bus(
        &self,
        component: BTreeSet<P>,
        validator: &dyn BusValidator<P>,
    ) -> Result<Option<CalculatedBus<P>>, Error> {
        if !validator.is_valid_bus(&self.vertices_by_point, &component) {
            return Ok(None);
        }
        CalculatedBus::new(&self.voltage_level_id, component, &self.vertices_by_point).map(Some)
    }

    /// Returns the buses of all components accepted by `validator`, by id.
    pub fn calculate_buses(
        &self,
        validator: &dyn BusValidator<P>,
    ) -> Result<BTreeMap<String, CalculatedBus<P>>, Error> {
        let mut buses = BTreeMap::new();
        for component in self.connected_components() {
            if let Some(bus) = self.try_create_bus(component, validator)? {
                buses.insert(bus.id.clone(), bus);
            }
        }
        Ok(buses)
    }

    /// Returns the bus containing `start`, if the component of `start` is
    /// accepted by `validator`.
    pub fn calculate_bus(
        &self,
        start: &P,
        validator: &dyn BusValidator<P>,
    ) -> Result<Option<CalculatedBus<P>>, Error> {
        let Some(component) = self.connected_component_of(start) else {
            tracing::debug!(
                "Point {} is not in the topology of voltage level {}.",
                start,
                self.voltage_level_id
            );
            return Ok(None);
        };
        self.try_create_bus(component, validator)
    }
}

/// Bus calculation from the store.
impl<R> Topology<R>
where
    R: PointResolver,
{
    /// Calculates all buses of the voltage level.
    pub fn calculate_buses(
        &self,
        index: &impl NetworkIndex,
        ctx: &VariantContext,
        voltage_level_id: &str,
    ) -> Result<BTreeMap<String, CalculatedBus<R::Point>>, Error> {
        self.build_graph(index, ctx, voltage_level_id)?
            .calculate_buses(self.validator.as_ref())
    }

    /// Calculates the bus of the voltage level that contains `start`.
    ///
    /// Returns `None` if `start` is not connected to anything or if its
    /// component is not a bus.
    pub fn calculate_bus(
        &self,
        index: &impl NetworkIndex,
        ctx: &VariantContext,
        voltage_level_id: &str,
        start: &R::Point,
    ) -> Result<Option<CalculatedBus<R::Point>>, Error> {
        self.build_graph(index, ctx, voltage_level_id)?
            .calculate_bus(start, self.validator.as_ref())
    }
}
