// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for listing variants and selecting the working variant.

use std::collections::BTreeSet;

use crate::{Error, VariantStore};

use super::{variant_num, VariantContext, VariantManager};

impl<S> VariantManager<S>
where
    S: VariantStore,
{
    /// Returns the ids of all variants of the network.
    pub fn variant_ids(&self) -> Result<BTreeSet<String>, Error> {
        Ok(self
            .store
            .variants_infos(false)?
            .into_iter()
            .map(|info| info.id)
            .collect())
    }

    /// Returns the id of the working variant of `ctx`.
    pub fn working_variant_id(&self, ctx: &VariantContext) -> Result<String, Error> {
        let num = ctx.working_variant_num()?;
        self.store
            .variants_infos(false)?
            .into_iter()
            .find(|info| info.num == num)
            .map(|info| info.id)
            .ok_or_else(|| Error::variant_not_found(format!("Variant number {num} not found.")))
    }

    /// Points `ctx` at the variant with the given id.
    pub fn set_working_variant(&self, ctx: &mut VariantContext, id: &str) -> Result<(), Error> {
        let num = variant_num(id, &self.store.variants_infos(false)?)?;
        ctx.working_variant_num = Some(num);
        tracing::debug!("Working variant set to {} ({}).", id, num);
        Ok(())
    }
}
