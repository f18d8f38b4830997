// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the resources stored for a network variant and the
//! attributes the topology engine reads from them.

use std::fmt::Display;

/// Represents the type of a stored resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceType {
    VoltageLevel,
    Load,
    Generator,
    Battery,
    ShuntCompensator,
    StaticVarCompensator,
    VscConverterStation,
    LccConverterStation,
    DanglingLine,
    BusbarSection,
    Line,
    TwoWindingsTransformer,
    ThreeWindingsTransformer,
    Switch,
}

impl ResourceType {
    /// Resource types that attach to a voltage level through a single
    /// terminal.
    pub const INJECTIONS: [ResourceType; 9] = [
        ResourceType::Generator,
        ResourceType::Load,
        ResourceType::Battery,
        ResourceType::ShuntCompensator,
        ResourceType::StaticVarCompensator,
        ResourceType::VscConverterStation,
        ResourceType::LccConverterStation,
        ResourceType::DanglingLine,
        ResourceType::BusbarSection,
    ];

    /// Resource types that have one terminal on each of two sides.
    pub const BRANCHES: [ResourceType; 2] =
        [ResourceType::Line, ResourceType::TwoWindingsTransformer];

    /// Returns true if resources of this type are described by
    /// [`InjectionAttributes`].
    pub fn is_injection(&self) -> bool {
        Self::INJECTIONS.contains(self)
    }

    /// Returns true if resources of this type are described by
    /// [`BranchAttributes`].
    pub fn is_branch(&self) -> bool {
        Self::BRANCHES.contains(self)
    }
}

impl Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::VoltageLevel => write!(f, "VoltageLevel"),
            ResourceType::Load => write!(f, "Load"),
            ResourceType::Generator => write!(f, "Generator"),
            ResourceType::Battery => write!(f, "Battery"),
            ResourceType::ShuntCompensator => write!(f, "ShuntCompensator"),
            ResourceType::StaticVarCompensator => write!(f, "StaticVarCompensator"),
            ResourceType::VscConverterStation => write!(f, "VscConverterStation"),
            ResourceType::LccConverterStation => write!(f, "LccConverterStation"),
            ResourceType::DanglingLine => write!(f, "DanglingLine"),
            ResourceType::BusbarSection => write!(f, "BusbarSection"),
            ResourceType::Line => write!(f, "Line"),
            ResourceType::TwoWindingsTransformer => write!(f, "TwoWindingsTransformer"),
            ResourceType::ThreeWindingsTransformer => write!(f, "ThreeWindingsTransformer"),
            ResourceType::Switch => write!(f, "Switch"),
        }
    }
}

/// How the equipment of a voltage level is connected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TopologyKind {
    /// Equipment attaches to numbered nodes.
    NodeBreaker,
    /// Equipment attaches to named configured buses.
    BusBreaker,
}

impl Display for TopologyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyKind::NodeBreaker => write!(f, "NodeBreaker"),
            TopologyKind::BusBreaker => write!(f, "BusBreaker"),
        }
    }
}

/// A stored resource: an identified piece of the network with its
/// attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct Resource<A> {
    pub id: String,
    pub resource_type: ResourceType,
    pub attributes: A,
}

impl<A> Resource<A> {
    pub fn new(id: impl Into<String>, resource_type: ResourceType, attributes: A) -> Self {
        Self {
            id: id.into(),
            resource_type,
            attributes,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VoltageLevelAttributes {
    pub topology_kind: TopologyKind,
    /// Whether the calculated buses cached for this voltage level still
    /// reflect its switches and equipment.
    pub calculated_buses_valid: bool,
    /// Changes every time the switches or equipment of the voltage level
    /// change.  No two states of any voltage level of a store share a
    /// generation, across variants included.
    pub topology_generation: u64,
}

impl VoltageLevelAttributes {
    pub fn new(topology_kind: TopologyKind) -> Self {
        Self {
            topology_kind,
            calculated_buses_valid: false,
            topology_generation: 0,
        }
    }
}

/// Attributes of single terminal equipment, busbar sections included.
///
/// `node` is used in node-breaker voltage levels and `bus` in bus-breaker
/// ones.  A `None` bus means the equipment is disconnected.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InjectionAttributes {
    pub voltage_level_id: String,
    pub node: Option<u32>,
    pub bus: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BranchAttributes {
    pub voltage_level_id1: String,
    pub voltage_level_id2: String,
    pub node1: Option<u32>,
    pub node2: Option<u32>,
    pub bus1: Option<String>,
    pub bus2: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LegAttributes {
    pub voltage_level_id: String,
    pub node: Option<u32>,
    pub bus: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ThreeWindingsTransformerAttributes {
    pub leg1: LegAttributes,
    pub leg2: LegAttributes,
    pub leg3: LegAttributes,
}

impl ThreeWindingsTransformerAttributes {
    /// Returns the voltage levels of the three legs.
    pub fn voltage_level_ids(&self) -> [&str; 3] {
        [
            &self.leg1.voltage_level_id,
            &self.leg2.voltage_level_id,
            &self.leg3.voltage_level_id,
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SwitchAttributes {
    pub voltage_level_id: String,
    pub open: bool,
    /// Retained switches stay visible in the bus-breaker view, so buses are
    /// not merged across them in that view.
    pub retained: bool,
    pub node1: Option<u32>,
    pub node2: Option<u32>,
    pub bus1: Option<String>,
    pub bus2: Option<String>,
}

/// Identifies a variant of a network: a unique string id and the numeric
/// slot its resources are stored under.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariantInfo {
    pub num: u32,
    pub id: String,
}

impl VariantInfo {
    pub fn new(num: u32, id: impl Into<String>) -> Self {
        Self { num, id: id.into() }
    }
}
