// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

/*!
# Network Store Topology

This is a library for calculating the electrical buses of the voltage levels
of a power network, and for managing the variants of that network: named,
numbered snapshots that share a single store.

## The `NetworkIndex` and `VariantStore` traits

The library doesn't know how the network is stored.  It reads the equipment
of a voltage level through the [`NetworkIndex`] trait, and creates and
deletes variants through the [`VariantStore`] trait.  Both are implemented
by [`InMemoryNetworkStore`], and can be implemented for any other store.

Every read is scoped to the working variant of a [`VariantContext`], which
is passed explicitly to every operation that needs it.

## Bus calculation

A [`Topology`] builds a [`TopologyGraph`] for a voltage level, with one
point per node (node-breaker voltage levels) or per configured bus
(bus-breaker voltage levels), and one edge per switch that merges its ends
in the chosen [`TopologyView`]:

- [`TopologyView::BusView`] merges points across every closed switch, and
  keeps the components that have a busbar section and a feeder, or a
  branch and two feeders.
- [`TopologyView::BusBreakerView`] merges points across the closed switches
  that are not retained, and keeps every component.

The connected components that pass the view's [`BusValidator`] become
[`CalculatedBus`]es.  Calculated buses can be kept in a [`BusCache`], which
is invalidated through the `calculated_buses_valid` flag and the
`topology_generation` of the voltage levels.

## Variants

The [`VariantManager`] lists, clones, overwrites and removes variants, and
notifies the registered [`NetworkListener`]s.  New variant numbers are
allocated optimistically: when another session takes the same number first,
the clone is retried on the next free one, up to [`MAX_CLONE_ATTEMPTS`]
times.
*/

mod config;
pub use config::TopologyConfig;

mod error;
pub use error::{Error, ErrorKind};

pub mod model;

mod store;
pub use store::InMemoryNetworkStore;

mod store_traits;
pub use store_traits::{ListenerError, NetworkIndex, NetworkListener, VariantStore};

pub mod topology;
pub use topology::{
    BusBreakerResolver, BusCache, BusValidator, CalculatedBus, NodeBreakerResolver, Topology,
    TopologyGraph, TopologyView,
};

mod variant;
pub use variant::{
    VariantContext, VariantManager, INITIAL_VARIANT_ID, INITIAL_VARIANT_NUM, MAX_CLONE_ATTEMPTS,
};
