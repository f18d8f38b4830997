// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Variant removal.

use crate::model::VariantInfo;
use crate::{Error, VariantStore};

use super::{variant_num, VariantContext, VariantManager, INITIAL_VARIANT_ID};

impl<S> VariantManager<S>
where
    S: VariantStore,
{
    /// Removes the variant with the given id.
    ///
    /// The initial variant can't be removed.  If `ctx` was working on the
    /// removed variant, it is left without a working variant.
    pub fn remove_variant(&self, ctx: &mut VariantContext, id: &str) -> Result<(), Error> {
        let mut infos = self.store.variants_infos(false)?;
        let num = self.delete_variant(id, &mut infos)?;
        self.notify_variant_removed(id);
        if ctx.is_working_on(num) {
            ctx.working_variant_num = None;
        }
        Ok(())
    }

    /// Deletes the variant from the store and from `infos`, without
    /// notifying listeners, and returns its number.
    pub(super) fn delete_variant(
        &self,
        id: &str,
        infos: &mut Vec<VariantInfo>,
    ) -> Result<u32, Error> {
        if id == INITIAL_VARIANT_ID {
            return Err(Error::forbidden("Removing the initial variant is forbidden."));
        }
        let num = variant_num(id, infos)?;
        self.store.delete_variant(num)?;
        infos.retain(|info| info.num != num);
        tracing::debug!("Removed variant {} ({}).", id, num);
        Ok(num)
    }
}
