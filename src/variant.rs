// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Management of the variants of a network: named, numbered snapshots that
//! share a store, and the working variant that reads are scoped to.

mod cloning;
mod notification;
mod removal;
mod retrieval;

#[cfg(test)]
mod test_utils;

use std::collections::BTreeSet;

use crate::model::VariantInfo;
use crate::{Error, NetworkListener, VariantStore};

/// The id of the variant every network starts with.
pub const INITIAL_VARIANT_ID: &str = "InitialVariant";

/// The number of the initial variant.
pub const INITIAL_VARIANT_NUM: u32 = 0;

/// How many variant numbers are tried before giving up on a clone.
pub const MAX_CLONE_ATTEMPTS: u32 = 3;

/// The working variant of a session.
///
/// Every read and write of a session is scoped to the working variant, so
/// the context is passed explicitly to each operation that needs it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariantContext {
    working_variant_num: Option<u32>,
}

impl Default for VariantContext {
    fn default() -> Self {
        Self::new()
    }
}

impl VariantContext {
    /// Creates a context working on the initial variant.
    pub fn new() -> Self {
        Self::at(INITIAL_VARIANT_NUM)
    }

    /// Creates a context working on the given variant number.
    pub fn at(variant_num: u32) -> Self {
        Self {
            working_variant_num: Some(variant_num),
        }
    }

    /// Creates a context without a working variant.
    pub fn unset() -> Self {
        Self {
            working_variant_num: None,
        }
    }

    /// Returns the number of the working variant.
    pub fn working_variant_num(&self) -> Result<u32, Error> {
        self.working_variant_num
            .ok_or_else(|| Error::variant_not_set("No working variant is set."))
    }

    pub fn is_set(&self) -> bool {
        self.working_variant_num.is_some()
    }

    fn is_working_on(&self, variant_num: u32) -> bool {
        self.working_variant_num == Some(variant_num)
    }
}

/// Returns the variant with the given id.
pub(crate) fn find_variant<'a>(id: &str, infos: &'a [VariantInfo]) -> Option<&'a VariantInfo> {
    infos.iter().find(|info| info.id == id)
}

/// Returns the number of the variant with the given id.
pub(crate) fn variant_num(id: &str, infos: &[VariantInfo]) -> Result<u32, Error> {
    find_variant(id, infos)
        .map(|info| info.num)
        .ok_or_else(|| Error::variant_not_found(format!("Variant {id} not found.")))
}

/// Returns the lowest variant number not used by any of `infos`.
pub(crate) fn first_available_variant_num(infos: &[VariantInfo]) -> u32 {
    let used = infos.iter().map(|info| info.num).collect::<BTreeSet<_>>();
    (0..).find(|num| !used.contains(num)).unwrap_or(u32::MAX)
}

/// Creates, removes and selects the variants of a network.
///
/// The manager holds no state about the variants themselves: every
/// operation reads the current variant list from the store, so several
/// managers, in one process or not, can share a store.
pub struct VariantManager<S>
where
    S: VariantStore,
{
    store: S,
    listeners: Vec<Box<dyn NetworkListener>>,
}

impl<S> VariantManager<S>
where
    S: VariantStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            listeners: Vec::new(),
        }
    }

    /// Registers a listener to be notified of variant changes.
    pub fn add_listener(&mut self, listener: impl NetworkListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Multi-threaded access to a variant is not supported.
    pub fn allow_variant_multi_thread_access(&self, allow: bool) -> Result<(), Error> {
        if allow {
            return Err(Error::forbidden(
                "Multi-thread access to variants is not supported.",
            ));
        }
        Ok(())
    }

    pub fn is_variant_multi_thread_access_allowed(&self) -> bool {
        false
    }
}
