// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module is only compiled when running unit tests and contains the
//! listeners and store wrappers shared by the tests of the `variant` module.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::model::VariantInfo;
use crate::store_traits::ListenerError;
use crate::{Error, InMemoryNetworkStore, NetworkListener, VariantStore};

#[derive(Clone, Debug, PartialEq)]
pub(super) enum Event {
    Created(String, String),
    Overwritten(String, String),
    Removed(String),
}

/// A listener that records the notifications it receives.
#[derive(Clone)]
pub(super) struct RecordingListener {
    events: Rc<RefCell<Vec<Event>>>,
}

impl RecordingListener {
    pub(super) fn new() -> Self {
        Self {
            events: Rc::new(RefCell::new(vec![])),
        }
    }

    pub(super) fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub(super) fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl NetworkListener for RecordingListener {
    fn on_variant_created(&self, source_id: &str, target_id: &str) -> Result<(), ListenerError> {
        self.events
            .borrow_mut()
            .push(Event::Created(source_id.into(), target_id.into()));
        Ok(())
    }

    fn on_variant_overwritten(
        &self,
        source_id: &str,
        target_id: &str,
    ) -> Result<(), ListenerError> {
        self.events
            .borrow_mut()
            .push(Event::Overwritten(source_id.into(), target_id.into()));
        Ok(())
    }

    fn on_variant_removed(&self, variant_id: &str) -> Result<(), ListenerError> {
        self.events
            .borrow_mut()
            .push(Event::Removed(variant_id.into()));
        Ok(())
    }
}

/// A listener that fails on every notification.
pub(super) struct FailingListener;

impl NetworkListener for FailingListener {
    fn on_variant_created(&self, _: &str, target_id: &str) -> Result<(), ListenerError> {
        Err(format!("can't handle {target_id}").into())
    }

    fn on_variant_overwritten(&self, _: &str, target_id: &str) -> Result<(), ListenerError> {
        Err(format!("can't handle {target_id}").into())
    }

    fn on_variant_removed(&self, variant_id: &str) -> Result<(), ListenerError> {
        Err(format!("can't handle {variant_id}").into())
    }
}

/// A store wrapper that simulates another session taking the variant number
/// a clone targets, for the given number of clones.
pub(super) struct RacingStore<'a> {
    inner: &'a InMemoryNetworkStore,
    races_left: Cell<u32>,
    races: Cell<u32>,
    refreshes: Cell<u32>,
}

impl<'a> RacingStore<'a> {
    pub(super) fn new(inner: &'a InMemoryNetworkStore, races: u32) -> Self {
        Self {
            inner,
            races_left: Cell::new(races),
            races: Cell::new(0),
            refreshes: Cell::new(0),
        }
    }

    /// Returns how many times the variant list was read with
    /// `force_refresh`.
    pub(super) fn refresh_count(&self) -> u32 {
        self.refreshes.get()
    }
}

impl VariantStore for RacingStore<'_> {
    fn variants_infos(&self, force_refresh: bool) -> Result<Vec<VariantInfo>, Error> {
        if force_refresh {
            self.refreshes.set(self.refreshes.get() + 1);
        }
        self.inner.variants_infos(force_refresh)
    }

    fn clone_variant(
        &self,
        source_num: u32,
        target_num: u32,
        target_id: &str,
    ) -> Result<(), Error> {
        if self.races_left.get() > 0 {
            self.races_left.set(self.races_left.get() - 1);
            self.races.set(self.races.get() + 1);
            let competitor = format!("competitor{}", self.races.get());
            self.inner.clone_variant(source_num, target_num, &competitor)?;
        }
        self.inner.clone_variant(source_num, target_num, target_id)
    }

    fn delete_variant(&self, num: u32) -> Result<(), Error> {
        self.inner.delete_variant(num)
    }
}
