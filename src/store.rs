// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! An in-memory network store, implementing both [`NetworkIndex`] and
//! [`VariantStore`].

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::model::{
    BranchAttributes, InjectionAttributes, Resource, ResourceType, SwitchAttributes,
    ThreeWindingsTransformerAttributes, VariantInfo, VoltageLevelAttributes,
};
use crate::variant::{INITIAL_VARIANT_ID, INITIAL_VARIANT_NUM};
use crate::{Error, NetworkIndex, VariantStore};

/// The resources of one variant.
#[derive(Clone, Default)]
struct NetworkData {
    voltage_levels: BTreeMap<String, Resource<VoltageLevelAttributes>>,
    injections: Vec<Resource<InjectionAttributes>>,
    branches: Vec<Resource<BranchAttributes>>,
    three_windings_transformers: Vec<Resource<ThreeWindingsTransformerAttributes>>,
    switches: Vec<Resource<SwitchAttributes>>,
}

impl NetworkData {
    /// Marks the topology of the given voltage levels as changed.
    fn touch<'a>(&mut self, voltage_level_ids: impl IntoIterator<Item = &'a str>, generation: u64) {
        for id in voltage_level_ids {
            if let Some(voltage_level) = self.voltage_levels.get_mut(id) {
                voltage_level.attributes.calculated_buses_valid = false;
                voltage_level.attributes.topology_generation = generation;
            }
        }
    }

    fn switch_mut(&mut self, switch_id: &str) -> Result<&mut SwitchAttributes, Error> {
        self.switches
            .iter_mut()
            .find(|s| s.id == switch_id)
            .map(|s| &mut s.attributes)
            .ok_or_else(|| Error::resource_not_found(format!("Switch {switch_id} not found.")))
    }
}

fn remove_by_id<A>(resources: &mut Vec<Resource<A>>, id: &str) -> Vec<Resource<A>> {
    let (removed, kept) = std::mem::take(resources)
        .into_iter()
        .partition(|r| r.id == id);
    *resources = kept;
    removed
}

struct VariantData {
    id: String,
    network: NetworkData,
}

struct StoreState {
    variants: BTreeMap<u32, VariantData>,
    last_generation: u64,
}

impl StoreState {
    fn next_generation(&mut self) -> u64 {
        self.last_generation += 1;
        self.last_generation
    }
}

/// A network store that keeps all variants in memory.
///
/// The store can be shared by several sessions, each store call being
/// atomic.  Resource ids are not checked for uniqueness: that is left to the
/// readers of the store.
pub struct InMemoryNetworkStore {
    state: RwLock<StoreState>,
}

impl Default for InMemoryNetworkStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryNetworkStore {
    /// Creates a store holding only the empty initial variant.
    pub fn new() -> Self {
        let initial = VariantData {
            id: INITIAL_VARIANT_ID.to_string(),
            network: NetworkData::default(),
        };
        Self {
            state: RwLock::new(StoreState {
                variants: BTreeMap::from([(INITIAL_VARIANT_NUM, initial)]),
                last_generation: 0,
            }),
        }
    }

    fn read<T>(&self, variant_num: u32, f: impl FnOnce(&NetworkData) -> T) -> Result<T, Error> {
        let state = self.state.read();
        let variant = state
            .variants
            .get(&variant_num)
            .ok_or_else(|| variant_not_found(variant_num))?;
        Ok(f(&variant.network))
    }

    /// Runs `f` on the network of the variant, with a generation no other
    /// change of the store has used.
    fn write<T>(
        &self,
        variant_num: u32,
        f: impl FnOnce(&mut NetworkData, u64) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut state = self.state.write();
        let generation = state.next_generation();
        let variant = state
            .variants
            .get_mut(&variant_num)
            .ok_or_else(|| variant_not_found(variant_num))?;
        f(&mut variant.network, generation)
    }

    pub fn add_voltage_level(
        &self,
        variant_num: u32,
        voltage_level: Resource<VoltageLevelAttributes>,
    ) -> Result<(), Error> {
        self.write(variant_num, |network, generation| {
            let id = voltage_level.id.clone();
            network.voltage_levels.insert(id.clone(), voltage_level);
            network.touch([id.as_str()], generation);
            Ok(())
        })
    }

    pub fn add_injection(
        &self,
        variant_num: u32,
        injection: Resource<InjectionAttributes>,
    ) -> Result<(), Error> {
        if !injection.resource_type.is_injection() {
            return Err(Error::invalid_argument(format!(
                "Resource is not an injection: {}",
                injection.resource_type
            )));
        }
        self.write(variant_num, |network, generation| {
            network.touch([injection.attributes.voltage_level_id.as_str()], generation);
            network.injections.push(injection);
            Ok(())
        })
    }

    pub fn add_branch(
        &self,
        variant_num: u32,
        branch: Resource<BranchAttributes>,
    ) -> Result<(), Error> {
        if !branch.resource_type.is_branch() {
            return Err(Error::invalid_argument(format!(
                "Resource is not a branch: {}",
                branch.resource_type
            )));
        }
        self.write(variant_num, |network, generation| {
            let attributes = &branch.attributes;
            network.touch(
                [
                    attributes.voltage_level_id1.as_str(),
                    attributes.voltage_level_id2.as_str(),
                ],
                generation,
            );
            network.branches.push(branch);
            Ok(())
        })
    }

    pub fn add_three_windings_transformer(
        &self,
        variant_num: u32,
        transformer: Resource<ThreeWindingsTransformerAttributes>,
    ) -> Result<(), Error> {
        self.write(variant_num, |network, generation| {
            network.touch(transformer.attributes.voltage_level_ids(), generation);
            network.three_windings_transformers.push(transformer);
            Ok(())
        })
    }

    pub fn add_switch(
        &self,
        variant_num: u32,
        switch: Resource<SwitchAttributes>,
    ) -> Result<(), Error> {
        self.write(variant_num, |network, generation| {
            network.touch([switch.attributes.voltage_level_id.as_str()], generation);
            network.switches.push(switch);
            Ok(())
        })
    }

    pub fn set_switch_open(
        &self,
        variant_num: u32,
        switch_id: &str,
        open: bool,
    ) -> Result<(), Error> {
        self.update_switch(variant_num, switch_id, |switch| switch.open = open)
    }

    pub fn set_switch_retained(
        &self,
        variant_num: u32,
        switch_id: &str,
        retained: bool,
    ) -> Result<(), Error> {
        self.update_switch(variant_num, switch_id, |switch| switch.retained = retained)
    }

    fn update_switch(
        &self,
        variant_num: u32,
        switch_id: &str,
        update: impl FnOnce(&mut SwitchAttributes),
    ) -> Result<(), Error> {
        self.write(variant_num, |network, generation| {
            let switch = network.switch_mut(switch_id)?;
            update(switch);
            let voltage_level_id = switch.voltage_level_id.clone();
            network.touch([voltage_level_id.as_str()], generation);
            Ok(())
        })
    }

    /// Removes every injection, branch, three-winding transformer or switch
    /// with the given id.
    pub fn remove_equipment(&self, variant_num: u32, equipment_id: &str) -> Result<(), Error> {
        self.write(variant_num, |network, generation| {
            let mut touched: Vec<String> = vec![];
            for r in remove_by_id(&mut network.injections, equipment_id) {
                touched.push(r.attributes.voltage_level_id);
            }
            for r in remove_by_id(&mut network.branches, equipment_id) {
                touched.push(r.attributes.voltage_level_id1);
                touched.push(r.attributes.voltage_level_id2);
            }
            for r in remove_by_id(&mut network.three_windings_transformers, equipment_id) {
                touched.extend(r.attributes.voltage_level_ids().map(String::from));
            }
            for r in remove_by_id(&mut network.switches, equipment_id) {
                touched.push(r.attributes.voltage_level_id);
            }

            if touched.is_empty() {
                return Err(Error::resource_not_found(format!(
                    "Equipment {equipment_id} not found."
                )));
            }
            network.touch(touched.iter().map(String::as_str), generation);
            Ok(())
        })
    }
}

fn variant_not_found(variant_num: u32) -> Error {
    Error::variant_not_found(format!("Variant number {variant_num} not found."))
}

impl NetworkIndex for InMemoryNetworkStore {
    fn voltage_level(
        &self,
        variant_num: u32,
        voltage_level_id: &str,
    ) -> Result<Resource<VoltageLevelAttributes>, Error> {
        let voltage_level = self.read(variant_num, |network| {
            network.voltage_levels.get(voltage_level_id).cloned()
        })?;
        voltage_level.ok_or_else(|| {
            Error::resource_not_found(format!("Voltage level {voltage_level_id} not found."))
        })
    }

    fn voltage_level_injections(
        &self,
        variant_num: u32,
        voltage_level_id: &str,
        resource_type: ResourceType,
    ) -> Result<Vec<Resource<InjectionAttributes>>, Error> {
        if !resource_type.is_injection() {
            return Err(Error::internal(format!(
                "Resource is not an injection: {resource_type}"
            )));
        }
        self.read(variant_num, |network| {
            network
                .injections
                .iter()
                .filter(|r| {
                    r.resource_type == resource_type
                        && r.attributes.voltage_level_id == voltage_level_id
                })
                .cloned()
                .collect()
        })
    }

    fn voltage_level_branches(
        &self,
        variant_num: u32,
        voltage_level_id: &str,
        resource_type: ResourceType,
    ) -> Result<Vec<Resource<BranchAttributes>>, Error> {
        if !resource_type.is_branch() {
            return Err(Error::internal(format!(
                "Resource is not a branch: {resource_type}"
            )));
        }
        self.read(variant_num, |network| {
            network
                .branches
                .iter()
                .filter(|r| {
                    r.resource_type == resource_type
                        && (r.attributes.voltage_level_id1 == voltage_level_id
                            || r.attributes.voltage_level_id2 == voltage_level_id)
                })
                .cloned()
                .collect()
        })
    }

    fn voltage_level_three_windings_transformers(
        &self,
        variant_num: u32,
        voltage_level_id: &str,
    ) -> Result<Vec<Resource<ThreeWindingsTransformerAttributes>>, Error> {
        self.read(variant_num, |network| {
            network
                .three_windings_transformers
                .iter()
                .filter(|r| r.attributes.voltage_level_ids().contains(&voltage_level_id))
                .cloned()
                .collect()
        })
    }

    fn voltage_level_switches(
        &self,
        variant_num: u32,
        voltage_level_id: &str,
    ) -> Result<Vec<Resource<SwitchAttributes>>, Error> {
        self.read(variant_num, |network| {
            network
                .switches
                .iter()
                .filter(|r| r.attributes.voltage_level_id == voltage_level_id)
                .cloned()
                .collect()
        })
    }

    fn set_calculated_buses_valid(
        &self,
        variant_num: u32,
        voltage_level_id: &str,
        valid: bool,
    ) -> Result<(), Error> {
        self.write(variant_num, |network, _| {
            let voltage_level = network
                .voltage_levels
                .get_mut(voltage_level_id)
                .ok_or_else(|| {
                    Error::resource_not_found(format!(
                        "Voltage level {voltage_level_id} not found."
                    ))
                })?;
            voltage_level.attributes.calculated_buses_valid = valid;
            Ok(())
        })
    }
}

impl VariantStore for InMemoryNetworkStore {
    /// Returns the variants sorted by number.  There is nothing to refresh
    /// in memory, so `force_refresh` is ignored.
    fn variants_infos(&self, _force_refresh: bool) -> Result<Vec<VariantInfo>, Error> {
        Ok(self
            .state
            .read()
            .variants
            .iter()
            .map(|(num, variant)| VariantInfo::new(*num, &variant.id))
            .collect())
    }

    /// Clones the variant.  The voltage levels of the clone get a new
    /// topology generation, so buses cached for a variant previously stored
    /// under `target_num` are never reused.
    fn clone_variant(
        &self,
        source_num: u32,
        target_num: u32,
        target_id: &str,
    ) -> Result<(), Error> {
        let mut state = self.state.write();
        if state.variants.contains_key(&target_num) {
            return Err(Error::duplicate_variant_num(format!(
                "Variant number {target_num} is already in use."
            )));
        }
        if state.variants.values().any(|v| v.id == target_id) {
            return Err(Error::variant_already_exists(format!(
                "Variant {target_id} already exists."
            )));
        }
        let mut network = state
            .variants
            .get(&source_num)
            .ok_or_else(|| variant_not_found(source_num))?
            .network
            .clone();
        let generation = state.next_generation();
        for voltage_level in network.voltage_levels.values_mut() {
            voltage_level.attributes.calculated_buses_valid = false;
            voltage_level.attributes.topology_generation = generation;
        }
        state.variants.insert(
            target_num,
            VariantData {
                id: target_id.to_string(),
                network,
            },
        );

        tracing::debug!(
            "Cloned variant number {} into variant {} ({}).",
            source_num,
            target_id,
            target_num
        );
        Ok(())
    }

    fn delete_variant(&self, num: u32) -> Result<(), Error> {
        let removed = self.state.write().variants.remove(&num);
        match removed {
            Some(variant) => {
                tracing::debug!("Deleted variant {} ({}).", variant.id, num);
                Ok(())
            }
            None => Err(variant_not_found(num)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TopologyKind;
    use crate::ErrorKind;

    fn store() -> Result<InMemoryNetworkStore, Error> {
        let store = InMemoryNetworkStore::new();
        for id in ["VL1", "VL2"] {
            store.add_voltage_level(
                0,
                Resource::new(
                    id,
                    ResourceType::VoltageLevel,
                    VoltageLevelAttributes::new(TopologyKind::NodeBreaker),
                ),
            )?;
        }
        store.add_switch(
            0,
            Resource::new(
                "S1",
                ResourceType::Switch,
                SwitchAttributes {
                    voltage_level_id: "VL1".into(),
                    node1: Some(0),
                    node2: Some(1),
                    ..Default::default()
                },
            ),
        )?;
        store.add_branch(
            0,
            Resource::new(
                "LINE",
                ResourceType::Line,
                BranchAttributes {
                    voltage_level_id1: "VL1".into(),
                    voltage_level_id2: "VL2".into(),
                    node1: Some(1),
                    node2: Some(0),
                    ..Default::default()
                },
            ),
        )?;
        Ok(store)
    }

    fn validate_all(store: &InMemoryNetworkStore, variant_num: u32) -> Result<(), Error> {
        for id in ["VL1", "VL2"] {
            store.set_calculated_buses_valid(variant_num, id, true)?;
        }
        Ok(())
    }

    fn valid(store: &InMemoryNetworkStore, variant_num: u32, id: &str) -> Result<bool, Error> {
        Ok(store
            .voltage_level(variant_num, id)?
            .attributes
            .calculated_buses_valid)
    }

    fn generation(store: &InMemoryNetworkStore, variant_num: u32, id: &str) -> Result<u64, Error> {
        Ok(store
            .voltage_level(variant_num, id)?
            .attributes
            .topology_generation)
    }

    #[test]
    fn test_listings() -> Result<(), Error> {
        let store = store()?;
        assert_eq!(store.voltage_level_switches(0, "VL1")?.len(), 1);
        assert!(store.voltage_level_switches(0, "VL2")?.is_empty());
        assert_eq!(
            store.voltage_level_branches(0, "VL2", ResourceType::Line)?[0].id,
            "LINE"
        );
        assert!(store
            .voltage_level_branches(0, "VL2", ResourceType::TwoWindingsTransformer)?
            .is_empty());
        assert!(store
            .voltage_level_injections(0, "VL1", ResourceType::Line)
            .is_err_and(|e| e == Error::internal("Resource is not an injection: Line")));
        assert!(store
            .voltage_level_branches(0, "VL1", ResourceType::Load)
            .is_err_and(|e| e == Error::internal("Resource is not a branch: Load")));
        assert!(store
            .voltage_level_switches(3, "VL1")
            .is_err_and(|e| e == Error::variant_not_found("Variant number 3 not found.")));
        Ok(())
    }

    #[test]
    fn test_mutations_invalidate_buses() -> Result<(), Error> {
        let store = store()?;

        validate_all(&store, 0)?;
        let before = generation(&store, 0, "VL1")?;
        store.set_switch_open(0, "S1", true)?;
        assert!(!valid(&store, 0, "VL1")?);
        assert!(valid(&store, 0, "VL2")?);
        assert!(generation(&store, 0, "VL1")? > before);
        assert!(store.voltage_level_switches(0, "VL1")?[0].attributes.open);

        validate_all(&store, 0)?;
        store.set_switch_retained(0, "S1", true)?;
        assert!(!valid(&store, 0, "VL1")?);

        validate_all(&store, 0)?;
        let before = generation(&store, 0, "VL2")?;
        store.remove_equipment(0, "LINE")?;
        assert!(!valid(&store, 0, "VL1")?);
        assert!(!valid(&store, 0, "VL2")?);
        assert!(generation(&store, 0, "VL2")? > before);
        assert!(store
            .voltage_level_branches(0, "VL1", ResourceType::Line)?
            .is_empty());

        // Validating buses is not a change of topology.
        let before = generation(&store, 0, "VL1")?;
        validate_all(&store, 0)?;
        assert_eq!(generation(&store, 0, "VL1")?, before);

        assert!(store
            .remove_equipment(0, "LINE")
            .is_err_and(|e| e == Error::resource_not_found("Equipment LINE not found.")));
        assert!(store
            .set_switch_open(0, "S9", true)
            .is_err_and(|e| e == Error::resource_not_found("Switch S9 not found.")));

        Ok(())
    }

    #[test]
    fn test_clone_and_delete() -> Result<(), Error> {
        let store = store()?;
        validate_all(&store, 0)?;

        store.clone_variant(0, 1, "v1")?;
        assert_eq!(
            store.variants_infos(false)?,
            vec![
                VariantInfo::new(0, INITIAL_VARIANT_ID),
                VariantInfo::new(1, "v1"),
            ]
        );
        assert!(!valid(&store, 1, "VL1")?);
        assert!(valid(&store, 0, "VL1")?);

        // Variants are independent copies.
        store.set_switch_open(1, "S1", true)?;
        assert!(!store.voltage_level_switches(0, "VL1")?[0].attributes.open);

        assert!(store
            .clone_variant(0, 1, "v2")
            .is_err_and(|e| e.kind() == ErrorKind::DuplicateVariantNum));
        assert!(store
            .clone_variant(0, 2, "v1")
            .is_err_and(|e| e == Error::variant_already_exists("Variant v1 already exists.")));
        assert!(store
            .clone_variant(7, 2, "v2")
            .is_err_and(|e| e == Error::variant_not_found("Variant number 7 not found.")));

        // A variant cloned into a freed slot doesn't inherit the generation
        // of the variant that was there before.
        let old = generation(&store, 1, "VL1")?;
        store.delete_variant(1)?;
        assert_eq!(store.variants_infos(true)?.len(), 1);
        assert!(store
            .delete_variant(1)
            .is_err_and(|e| e == Error::variant_not_found("Variant number 1 not found.")));
        store.clone_variant(0, 1, "v1")?;
        assert_ne!(generation(&store, 1, "VL1")?, old);

        Ok(())
    }

    #[test]
    fn test_rejects_misplaced_resource_types() {
        let store = InMemoryNetworkStore::default();
        assert!(store
            .add_injection(
                0,
                Resource::new("X", ResourceType::Line, InjectionAttributes::default()),
            )
            .is_err_and(|e| e.kind() == ErrorKind::InvalidArgument));
        assert!(store
            .add_branch(
                0,
                Resource::new("X", ResourceType::Load, BranchAttributes::default()),
            )
            .is_err_and(|e| e.kind() == ErrorKind::InvalidArgument));
    }
}
