// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the `Vertex` struct, the mapping of one equipment
//! terminal onto a topology point, and the `EquipmentKind` enum.

use std::fmt::Display;

use crate::model::ResourceType;
use crate::Error;

/// The side of a branch, or the leg of a three-winding transformer, a
/// terminal belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    One,
    Two,
    Three,
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::One => write!(f, "ONE"),
            Side::Two => write!(f, "TWO"),
            Side::Three => write!(f, "THREE"),
        }
    }
}

/// Represents the kind of equipment connected to a topology point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EquipmentKind {
    Load,
    Generator,
    Battery,
    ShuntCompensator,
    DanglingLine,
    StaticVarCompensator,
    Line,
    TwoWindingsTransformer,
    ThreeWindingsTransformer,
    HvdcConverterStation,
    BusbarSection,
}

impl EquipmentKind {
    /// Returns true if the equipment feeds or draws power at its point.
    ///
    /// Every kind except busbar sections is a feeder; for branches, each end
    /// counts separately.
    pub fn is_feeder(&self) -> bool {
        match self {
            EquipmentKind::Load
            | EquipmentKind::Generator
            | EquipmentKind::Battery
            | EquipmentKind::ShuntCompensator
            | EquipmentKind::DanglingLine
            | EquipmentKind::StaticVarCompensator
            | EquipmentKind::Line
            | EquipmentKind::TwoWindingsTransformer
            | EquipmentKind::ThreeWindingsTransformer
            | EquipmentKind::HvdcConverterStation => true,
            EquipmentKind::BusbarSection => false,
        }
    }

    /// Returns true if the equipment links this point to another part of
    /// the network.
    pub fn is_branch(&self) -> bool {
        match self {
            EquipmentKind::Line
            | EquipmentKind::TwoWindingsTransformer
            | EquipmentKind::ThreeWindingsTransformer
            | EquipmentKind::HvdcConverterStation => true,
            EquipmentKind::Load
            | EquipmentKind::Generator
            | EquipmentKind::Battery
            | EquipmentKind::ShuntCompensator
            | EquipmentKind::DanglingLine
            | EquipmentKind::StaticVarCompensator
            | EquipmentKind::BusbarSection => false,
        }
    }

    pub fn is_busbar_section(&self) -> bool {
        *self == EquipmentKind::BusbarSection
    }
}

impl TryFrom<ResourceType> for EquipmentKind {
    type Error = Error;

    fn try_from(resource_type: ResourceType) -> Result<Self, Self::Error> {
        match resource_type {
            ResourceType::Load => Ok(EquipmentKind::Load),
            ResourceType::Generator => Ok(EquipmentKind::Generator),
            ResourceType::Battery => Ok(EquipmentKind::Battery),
            ResourceType::ShuntCompensator => Ok(EquipmentKind::ShuntCompensator),
            ResourceType::StaticVarCompensator => Ok(EquipmentKind::StaticVarCompensator),
            ResourceType::VscConverterStation | ResourceType::LccConverterStation => {
                Ok(EquipmentKind::HvdcConverterStation)
            }
            ResourceType::DanglingLine => Ok(EquipmentKind::DanglingLine),
            ResourceType::BusbarSection => Ok(EquipmentKind::BusbarSection),
            ResourceType::Line => Ok(EquipmentKind::Line),
            ResourceType::TwoWindingsTransformer => Ok(EquipmentKind::TwoWindingsTransformer),
            ResourceType::ThreeWindingsTransformer => {
                Ok(EquipmentKind::ThreeWindingsTransformer)
            }
            ResourceType::VoltageLevel | ResourceType::Switch => Err(Error::internal(format!(
                "Resource type {resource_type} is not connectable equipment."
            ))),
        }
    }
}

impl Display for EquipmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EquipmentKind::Load => write!(f, "Load"),
            EquipmentKind::Generator => write!(f, "Generator"),
            EquipmentKind::Battery => write!(f, "Battery"),
            EquipmentKind::ShuntCompensator => write!(f, "ShuntCompensator"),
            EquipmentKind::DanglingLine => write!(f, "DanglingLine"),
            EquipmentKind::StaticVarCompensator => write!(f, "StaticVarCompensator"),
            EquipmentKind::Line => write!(f, "Line"),
            EquipmentKind::TwoWindingsTransformer => write!(f, "TwoWindingsTransformer"),
            EquipmentKind::ThreeWindingsTransformer => write!(f, "ThreeWindingsTransformer"),
            EquipmentKind::HvdcConverterStation => write!(f, "HvdcConverterStation"),
            EquipmentKind::BusbarSection => write!(f, "BusbarSection"),
        }
    }
}

/// One equipment terminal attached to a topology point.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex<P> {
    equipment_id: String,
    kind: EquipmentKind,
    point: P,
    side: Option<Side>,
}

impl<P> Vertex<P> {
    pub(crate) fn new(
        equipment_id: impl Into<String>,
        kind: EquipmentKind,
        point: P,
        side: Option<Side>,
    ) -> Self {
        Self {
            equipment_id: equipment_id.into(),
            kind,
            point,
            side,
        }
    }

    pub fn equipment_id(&self) -> &str {
        &self.equipment_id
    }

    pub fn kind(&self) -> EquipmentKind {
        self.kind
    }

    /// Returns the topology point the terminal is attached to.
    pub fn point(&self) -> &P {
        &self.point
    }

    /// Returns the side of the terminal, for branches and three-winding
    /// transformers.
    pub fn side(&self) -> Option<Side> {
        self.side
    }
}
