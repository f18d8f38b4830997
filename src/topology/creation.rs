// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for creating [`TopologyGraph`] instances from the equipment and
//! switches of a voltage level.

use std::collections::HashSet;

use petgraph::graph::{NodeIndex, UnGraph};

use crate::model::{
    BranchAttributes, InjectionAttributes, Resource, ResourceType, SwitchAttributes,
    ThreeWindingsTransformerAttributes,
};
use crate::{Error, NetworkIndex, VariantContext};

use super::{
    EquipmentKind, PointIndexMap, PointResolver, Side, Topology, TopologyGraph, TopologyPoint,
    Vertex, VerticesByPoint,
};

/// `TopologyGraph` instantiation.
impl<R> Topology<R>
where
    R: PointResolver,
{
    /// Builds the [`TopologyGraph`] of the given voltage level, in the
    /// working variant of `ctx`.
    ///
    /// Returns an error if the voltage level doesn't exist, isn't of the
    /// resolver's topology kind, or if its switches can't form a valid
    /// graph.
    pub fn build_graph(
        &self,
        index: &impl NetworkIndex,
        ctx: &VariantContext,
        voltage_level_id: &str,
    ) -> Result<TopologyGraph<R::Point>, Error> {
        let variant_num = ctx.working_variant_num()?;
        let voltage_level = index.voltage_level(variant_num, voltage_level_id)?;
        let topology_kind = voltage_level.attributes.topology_kind;
        if topology_kind != R::TOPOLOGY_KIND {
            return Err(Error::invalid_argument(format!(
                "Voltage level {voltage_level_id} has a {topology_kind} topology, expected {}.",
                R::TOPOLOGY_KIND
            )));
        }

        let mut vertices = vec![];
        for resource_type in ResourceType::INJECTIONS {
            for resource in
                index.voltage_level_injections(variant_num, voltage_level_id, resource_type)?
            {
                vertices.extend(self.vertex_from_injection(&resource)?);
            }
        }
        for resource_type in ResourceType::BRANCHES {
            for resource in
                index.voltage_level_branches(variant_num, voltage_level_id, resource_type)?
            {
                vertices.extend(self.vertex_from_branch(&resource, voltage_level_id)?);
            }
        }
        for resource in
            index.voltage_level_three_windings_transformers(variant_num, voltage_level_id)?
        {
            vertices.extend(self.vertex_from_3wt(&resource, voltage_level_id));
        }

        let mut tg = TopologyGraph::new(voltage_level_id);
        for vertex in &vertices {
            tg.ensure_point(vertex.point().clone());
        }

        let mut switch_ids = HashSet::new();
        for switch in index.voltage_level_switches(variant_num, voltage_level_id)? {
            if !switch_ids.insert(switch.id.clone()) {
                return Err(Error::invalid_graph(format!(
                    "Duplicate switch ID found: {}",
                    switch.id
                )));
            }
            if !self.view.merges_across(topology_kind, &switch.attributes) {
                continue;
            }
            self.add_switch(&mut tg, switch)?;
        }

        tg.add_vertices(vertices);

        tracing::debug!(
            "Built topology graph of voltage level {} with {} points and {} switches.",
            voltage_level_id,
            tg.graph.node_count(),
            tg.graph.edge_count()
        );

        Ok(tg)
    }

    fn vertex_from_injection(
        &self,
        resource: &Resource<InjectionAttributes>,
    ) -> Result<Option<Vertex<R::Point>>, Error> {
        if !resource.resource_type.is_injection() {
            return Err(Error::internal(format!(
                "Resource is not an injection: {}",
                resource.resource_type
            )));
        }
        let kind = EquipmentKind::try_from(resource.resource_type)?;
        Ok(self
            .resolver
            .injection_point(&resource.attributes)
            .map(|point| Vertex::new(&resource.id, kind, point, None)))
    }

    fn vertex_from_branch(
        &self,
        resource: &Resource<BranchAttributes>,
        voltage_level_id: &str,
    ) -> Result<Option<Vertex<R::Point>>, Error> {
        if !resource.resource_type.is_branch() {
            return Err(Error::internal(format!(
                "Resource is not a branch: {}",
                resource.resource_type
            )));
        }
        let kind = EquipmentKind::try_from(resource.resource_type)?;
        let side = if resource.attributes.voltage_level_id1 == voltage_level_id {
            Side::One
        } else {
            Side::Two
        };
        Ok(self
            .resolver
            .branch_point(&resource.attributes, side)
            .map(|point| Vertex::new(&resource.id, kind, point, Some(side))))
    }

    fn vertex_from_3wt(
        &self,
        resource: &Resource<ThreeWindingsTransformerAttributes>,
        voltage_level_id: &str,
    ) -> Option<Vertex<R::Point>> {
        let attributes = &resource.attributes;
        let side = if attributes.leg1.voltage_level_id == voltage_level_id {
            Side::One
        } else if attributes.leg2.voltage_level_id == voltage_level_id {
            Side::Two
        } else {
            Side::Three
        };
        self.resolver
            .three_windings_point(attributes, side)
            .map(|point| {
                Vertex::new(
                    &resource.id,
                    EquipmentKind::ThreeWindingsTransformer,
                    point,
                    Some(side),
                )
            })
    }

    fn add_switch(
        &self,
        tg: &mut TopologyGraph<R::Point>,
        switch: Resource<SwitchAttributes>,
    ) -> Result<(), Error> {
        let (Some(point1), Some(point2)) = self.resolver.switch_points(&switch.attributes) else {
            if self.config.allow_dangling_switches {
                tracing::warn!(
                    "Ignoring switch {} that has an end without a topology point.",
                    switch.id
                );
                return Ok(());
            }
            return Err(Error::invalid_graph(format!(
                "Switch {} has an end without a topology point.",
                switch.id
            )));
        };
        tg.add_switch(point1, point2, switch.id);
        Ok(())
    }
}

impl<P> TopologyGraph<P>
where
    P: TopologyPoint,
{
    pub(crate) fn new(voltage_level_id: &str) -> Self {
        Self {
            voltage_level_id: voltage_level_id.to_string(),
            graph: UnGraph::default(),
            point_indices: PointIndexMap::new(),
            vertices_by_point: VerticesByPoint::new(),
        }
    }

    /// Returns the index of the given point, adding it to the graph if it
    /// is not there yet.
    pub(crate) fn ensure_point(&mut self, point: P) -> NodeIndex {
        if let Some(&idx) = self.point_indices.get(&point) {
            return idx;
        }
        let idx = self.graph.add_node(point.clone());
        self.point_indices.insert(point, idx);
        idx
    }

    /// Adds a switch between two points, keeping any switch already
    /// connecting them.
    pub(crate) fn add_switch(&mut self, point1: P, point2: P, switch_id: String) {
        let idx1 = self.ensure_point(point1);
        let idx2 = self.ensure_point(point2);
        self.graph.add_edge(idx1, idx2, switch_id);
    }

    pub(crate) fn add_vertices(&mut self, vertices: impl IntoIterator<Item = Vertex<P>>) {
        for vertex in vertices {
            self.ensure_point(vertex.point().clone());
            self.vertices_by_point
                .entry(vertex.point().clone())
                .or_default()
                .push(vertex);
        }
    }
}
