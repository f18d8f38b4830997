// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module is only compiled when running unit tests and contains the
//! `NetworkBuilder`, which can declaratively populate an
//! `InMemoryNetworkStore` with node-breaker equipment for use in tests.
//!
//! All equipment is added to the initial variant.  `VL1` is the voltage
//! level under test, while `VL2` and `VL3` only hold the far ends of
//! branches and transformer legs.

use crate::model::{
    BranchAttributes, InjectionAttributes, LegAttributes, Resource, ResourceType,
    SwitchAttributes, ThreeWindingsTransformerAttributes, TopologyKind,
    VoltageLevelAttributes,
};
use crate::InMemoryNetworkStore;

const VARIANT_NUM: u32 = 0;

/// A builder for node-breaker networks, for use in tests.
pub(crate) struct NetworkBuilder {
    store: InMemoryNetworkStore,
    next_id: u32,
}

impl NetworkBuilder {
    /// Creates a new `NetworkBuilder`, with the voltage levels `VL1`, `VL2`
    /// and `VL3`.
    pub(crate) fn new() -> Self {
        let store = InMemoryNetworkStore::new();
        for id in ["VL1", "VL2", "VL3"] {
            let added = store.add_voltage_level(
                VARIANT_NUM,
                Resource::new(
                    id,
                    ResourceType::VoltageLevel,
                    VoltageLevelAttributes::new(TopologyKind::NodeBreaker),
                ),
            );
            assert!(added.is_ok());
        }
        NetworkBuilder { store, next_id: 0 }
    }

    /// Returns the store the equipment was added to.
    pub(crate) fn store(&self) -> &InMemoryNetworkStore {
        &self.store
    }

    fn next_id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}{}", self.next_id);
        self.next_id += 1;
        id
    }

    /// Adds an injection of the given type to `VL1` and returns its id.
    pub(crate) fn injection(&mut self, resource_type: ResourceType, node: Option<u32>) -> String {
        let id = self.next_id(&resource_type.to_string());
        let added = self.store.add_injection(
            VARIANT_NUM,
            Resource::new(
                &id,
                resource_type,
                InjectionAttributes {
                    voltage_level_id: "VL1".into(),
                    node,
                    bus: None,
                },
            ),
        );
        assert!(added.is_ok());
        id
    }

    pub(crate) fn busbar_section(&mut self, node: u32) -> String {
        self.injection(ResourceType::BusbarSection, Some(node))
    }

    pub(crate) fn load(&mut self, node: u32) -> String {
        self.injection(ResourceType::Load, Some(node))
    }

    pub(crate) fn generator(&mut self, node: u32) -> String {
        self.injection(ResourceType::Generator, Some(node))
    }

    /// Adds a line from `node` in `VL1` (side one) to `VL2` and returns its
    /// id.
    pub(crate) fn line(&mut self, node: u32) -> String {
        let id = self.next_id("Line");
        let added = self.store.add_branch(
            VARIANT_NUM,
            Resource::new(
                &id,
                ResourceType::Line,
                BranchAttributes {
                    voltage_level_id1: "VL1".into(),
                    voltage_level_id2: "VL2".into(),
                    node1: Some(node),
                    node2: Some(0),
                    ..Default::default()
                },
            ),
        );
        assert!(added.is_ok());
        id
    }

    /// Adds a three-winding transformer with its second leg on `node` in
    /// `VL1`, and returns its id.
    pub(crate) fn three_windings_transformer(&mut self, node: u32) -> String {
        let id = self.next_id("ThreeWindingsTransformer");
        let leg = |voltage_level_id: &str, node: u32| LegAttributes {
            voltage_level_id: voltage_level_id.into(),
            node: Some(node),
            bus: None,
        };
        let added = self.store.add_three_windings_transformer(
            VARIANT_NUM,
            Resource::new(
                &id,
                ResourceType::ThreeWindingsTransformer,
                ThreeWindingsTransformerAttributes {
                    leg1: leg("VL2", 0),
                    leg2: leg("VL1", node),
                    leg3: leg("VL3", 0),
                },
            ),
        );
        assert!(added.is_ok());
        id
    }

    fn switch(&mut self, node1: Option<u32>, node2: Option<u32>, open: bool) -> String {
        let id = self.next_id("Breaker");
        let added = self.store.add_switch(
            VARIANT_NUM,
            Resource::new(
                &id,
                ResourceType::Switch,
                SwitchAttributes {
                    voltage_level_id: "VL1".into(),
                    open,
                    node1,
                    node2,
                    ..Default::default()
                },
            ),
        );
        assert!(added.is_ok());
        id
    }

    /// Adds a breaker between two nodes of `VL1` and returns its id.
    pub(crate) fn breaker(&mut self, node1: u32, node2: u32, open: bool) -> String {
        self.switch(Some(node1), Some(node2), open)
    }

    /// Adds a closed breaker with only its first end on a node, and returns
    /// its id.
    pub(crate) fn dangling_breaker(&mut self, node: u32) -> String {
        self.switch(Some(node), None, false)
    }
}
