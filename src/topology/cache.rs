// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! A cache of calculated buses, per variant, voltage level and topology.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::{Error, NetworkIndex, VariantContext};

use super::{CalculatedBus, PointResolver, Topology, TopologyPoint};

/// The variant number, voltage level id and topology id of an entry.
type CacheKey = (u32, String, u64);

struct CachedBuses<P>
where
    P: TopologyPoint,
{
    /// The `topology_generation` of the voltage level the buses were
    /// calculated from.
    generation: u64,
    buses: BTreeMap<String, CalculatedBus<P>>,
}

/// Calculated buses kept across queries.
///
/// Entries are kept per [`Topology`] instance, so topologies with different
/// views or validators never share buses.  An entry is only served while
/// the `topology_generation` of its voltage level is the one it was
/// calculated from, and while the `calculated_buses_valid` flag of the
/// voltage level is set.  Any number of caches can read the same index.
pub struct BusCache<P>
where
    P: TopologyPoint,
{
    entries: HashMap<CacheKey, CachedBuses<P>>,
}

impl<P> Default for BusCache<P>
where
    P: TopologyPoint,
{
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<P> BusCache<P>
where
    P: TopologyPoint,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the buses of the voltage level in the given variant, for all
    /// topologies.
    pub fn invalidate(&mut self, variant_num: u32, voltage_level_id: &str) {
        self.entries
            .retain(|(num, vl, _), _| *num != variant_num || vl != voltage_level_id);
    }

    /// Drops the buses of all voltage levels of the given variant.
    pub fn invalidate_variant(&mut self, variant_num: u32) {
        self.entries.retain(|(num, _, _), _| *num != variant_num);
    }

    /// Drops the buses of the voltage level that were calculated from
    /// another generation than `generation`.
    fn retain_generation(&mut self, variant_num: u32, voltage_level_id: &str, generation: u64) {
        self.entries.retain(|(num, vl, _), cached| {
            *num != variant_num || vl != voltage_level_id || cached.generation == generation
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cached bus calculation.
impl<R> Topology<R>
where
    R: PointResolver,
{
    /// Returns the buses of the voltage level, from `cache` if they are
    /// still valid.
    ///
    /// Recalculated buses are stored in the cache, and the voltage level is
    /// flagged valid again.
    pub fn calculated_buses<'c>(
        &self,
        cache: &'c mut BusCache<R::Point>,
        index: &impl NetworkIndex,
        ctx: &VariantContext,
        voltage_level_id: &str,
    ) -> Result<&'c BTreeMap<String, CalculatedBus<R::Point>>, Error> {
        let variant_num = ctx.working_variant_num()?;
        let attributes = index.voltage_level(variant_num, voltage_level_id)?.attributes;
        let generation = attributes.topology_generation;
        if attributes.calculated_buses_valid {
            cache.retain_generation(variant_num, voltage_level_id, generation);
        } else {
            cache.invalidate(variant_num, voltage_level_id);
        }

        match cache
            .entries
            .entry((variant_num, voltage_level_id.to_string(), self.id))
        {
            Entry::Occupied(entry) => {
                tracing::debug!(
                    "Using cached buses of voltage level {} in variant {}.",
                    voltage_level_id,
                    variant_num
                );
                Ok(&entry.into_mut().buses)
            }
            Entry::Vacant(entry) => {
                let buses = self.calculate_buses(index, ctx, voltage_level_id)?;
                index.set_calculated_buses_valid(variant_num, voltage_level_id, true)?;
                Ok(&entry.insert(CachedBuses { generation, buses }).buses)
            }
        }
    }
}
