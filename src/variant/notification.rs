// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Listener notification.  A failing listener is logged and skipped.

use crate::store_traits::ListenerError;
use crate::{NetworkListener, VariantStore};

use super::VariantManager;

impl<S> VariantManager<S>
where
    S: VariantStore,
{
    fn notify(
        &self,
        event: &str,
        call: impl Fn(&dyn NetworkListener) -> Result<(), ListenerError>,
    ) {
        for listener in &self.listeners {
            if let Err(err) = call(listener.as_ref()) {
                tracing::error!("Network listener failed on {}: {}", event, err);
            }
        }
    }

    pub(super) fn notify_variant_created(&self, source_id: &str, target_id: &str) {
        self.notify("variant creation", |l| {
            l.on_variant_created(source_id, target_id)
        });
    }

    pub(super) fn notify_variant_overwritten(&self, source_id: &str, target_id: &str) {
        self.notify("variant overwrite", |l| {
            l.on_variant_overwritten(source_id, target_id)
        });
    }

    pub(super) fn notify_variant_removed(&self, variant_id: &str) {
        self.notify("variant removal", |l| l.on_variant_removed(variant_id));
    }
}
