// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains the traits that need to be implemented by the
//! network store the library reads from, and by the listeners that want to
//! be told about variant changes.

use std::sync::Arc;

use crate::model::{
    BranchAttributes, InjectionAttributes, Resource, ResourceType, SwitchAttributes,
    ThreeWindingsTransformerAttributes, VariantInfo, VoltageLevelAttributes,
};
use crate::Error;

/**
This trait needs to be implemented by the index that lists the resources of a
voltage level.

Every read is scoped to a variant number, which callers take from a
[`VariantContext`][crate::VariantContext].

<details>
<summary>Example implementation over a remote store client:</summary>

```ignore
impl network_store_topology::NetworkIndex for RestNetworkStoreClient {
    fn voltage_level_injections(
        &self,
        variant_num: u32,
        voltage_level_id: &str,
        resource_type: ResourceType,
    ) -> Result<Vec<Resource<InjectionAttributes>>, Error> {
        let path = match resource_type {
            ResourceType::Load => "loads",
            ResourceType::Generator => "generators",
            // ...
            other => {
                return Err(Error::internal(format!(
                    "Resource is not an injection: {other}"
                )))
            }
        };
        self.get_all(self.network_uuid, variant_num, voltage_level_id, path)
            .map_err(|e| Error::resource_not_found(e.to_string()))
    }

    // ...
}
```

</details>
*/
pub trait NetworkIndex {
    /// Returns the voltage level with the given id.
    ///
    /// Its `topology_generation` must change whenever its switches or
    /// equipment change, and must never go back to a value it had, or that
    /// another voltage level of the store had.  Its `calculated_buses_valid`
    /// flag must be cleared on the same changes.
    fn voltage_level(
        &self,
        variant_num: u32,
        voltage_level_id: &str,
    ) -> Result<Resource<VoltageLevelAttributes>, Error>;

    /// Returns the single terminal equipment of the given type attached to
    /// the voltage level.
    ///
    /// Returns an `Internal` error if `resource_type` is not an injection
    /// type.
    fn voltage_level_injections(
        &self,
        variant_num: u32,
        voltage_level_id: &str,
        resource_type: ResourceType,
    ) -> Result<Vec<Resource<InjectionAttributes>>, Error>;

    /// Returns the branches of the given type with at least one side in the
    /// voltage level.
    ///
    /// Returns an `Internal` error if `resource_type` is not a branch type.
    fn voltage_level_branches(
        &self,
        variant_num: u32,
        voltage_level_id: &str,
        resource_type: ResourceType,
    ) -> Result<Vec<Resource<BranchAttributes>>, Error>;

    /// Returns the three-winding transformers with a leg in the voltage
    /// level.
    fn voltage_level_three_windings_transformers(
        &self,
        variant_num: u32,
        voltage_level_id: &str,
    ) -> Result<Vec<Resource<ThreeWindingsTransformerAttributes>>, Error>;

    /// Returns the switches of the voltage level.
    fn voltage_level_switches(
        &self,
        variant_num: u32,
        voltage_level_id: &str,
    ) -> Result<Vec<Resource<SwitchAttributes>>, Error>;

    /// Sets the validity flag of the calculated buses of the voltage level.
    fn set_calculated_buses_valid(
        &self,
        variant_num: u32,
        voltage_level_id: &str,
        valid: bool,
    ) -> Result<(), Error>;
}

/// This trait needs to be implemented by the store that persists the
/// variants of a network.
///
/// The store may be shared by several independent sessions, so the numeric
/// slot a session picks for a new variant may already have been taken by
/// the time it clones into it.
pub trait VariantStore {
    /// Returns the variants of the network.
    ///
    /// A store that caches the list must bypass its cache when
    /// `force_refresh` is `true`.
    fn variants_infos(&self, force_refresh: bool) -> Result<Vec<VariantInfo>, Error>;

    /// Copies all resources of the variant `source_num` into a new variant
    /// `target_num` named `target_id`.
    ///
    /// Must fail with an [`ErrorKind::DuplicateVariantNum`][crate::ErrorKind]
    /// error if `target_num` is already in use.
    fn clone_variant(&self, source_num: u32, target_num: u32, target_id: &str)
        -> Result<(), Error>;

    /// Deletes the variant `num` and all its resources.
    fn delete_variant(&self, num: u32) -> Result<(), Error>;
}

/// The error type listeners report failures with.
pub type ListenerError = Box<dyn std::error::Error>;

/// This trait needs to be implemented by the types that want to be notified
/// of variant changes.
///
/// Failures returned from listeners are logged and never interrupt the
/// operation that triggered the notification.
pub trait NetworkListener {
    /// Called after `target_id` was created as a copy of `source_id`.
    fn on_variant_created(&self, _source_id: &str, _target_id: &str) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Called after the existing `target_id` was replaced by a copy of
    /// `source_id`.
    fn on_variant_overwritten(
        &self,
        _source_id: &str,
        _target_id: &str,
    ) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Called after `variant_id` was removed.
    fn on_variant_removed(&self, _variant_id: &str) -> Result<(), ListenerError> {
        Ok(())
    }
}

macro_rules! forward_store_impls {
    ($($wrapper:ty),*) => {
        $(
            impl<T: NetworkIndex + ?Sized> NetworkIndex for $wrapper {
                fn voltage_level(
                    &self,
                    variant_num: u32,
                    voltage_level_id: &str,
                ) -> Result<Resource<VoltageLevelAttributes>, Error> {
                    (**self).voltage_level(variant_num, voltage_level_id)
                }

                fn voltage_level_injections(
                    &self,
                    variant_num: u32,
                    voltage_level_id: &str,
                    resource_type: ResourceType,
                ) -> Result<Vec<Resource<InjectionAttributes>>, Error> {
                    (**self).voltage_level_injections(variant_num, voltage_level_id, resource_type)
                }

                fn voltage_level_branches(
                    &self,
                    variant_num: u32,
                    voltage_level_id: &str,
                    resource_type: ResourceType,
                ) -> Result<Vec<Resource<BranchAttributes>>, Error> {
                    (**self).voltage_level_branches(variant_num, voltage_level_id, resource_type)
                }

                fn voltage_level_three_windings_transformers(
                    &self,
                    variant_num: u32,
                    voltage_level_id: &str,
                ) -> Result<Vec<Resource<ThreeWindingsTransformerAttributes>>, Error> {
                    (**self)
                        .voltage_level_three_windings_transformers(variant_num, voltage_level_id)
                }

                fn voltage_level_switches(
                    &self,
                    variant_num: u32,
                    voltage_level_id: &str,
                ) -> Result<Vec<Resource<SwitchAttributes>>, Error> {
                    (**self).voltage_level_switches(variant_num, voltage_level_id)
                }

                fn set_calculated_buses_valid(
                    &self,
                    variant_num: u32,
                    voltage_level_id: &str,
                    valid: bool,
                ) -> Result<(), Error> {
                    (**self).set_calculated_buses_valid(variant_num, voltage_level_id, valid)
                }
            }

            impl<T: VariantStore + ?Sized> VariantStore for $wrapper {
                fn variants_infos(&self, force_refresh: bool) -> Result<Vec<VariantInfo>, Error> {
                    (**self).variants_infos(force_refresh)
                }

                fn clone_variant(
                    &self,
                    source_num: u32,
                    target_num: u32,
                    target_id: &str,
                ) -> Result<(), Error> {
                    (**self).clone_variant(source_num, target_num, target_id)
                }

                fn delete_variant(&self, num: u32) -> Result<(), Error> {
                    (**self).delete_variant(num)
                }
            }
        )*
    };
}

forward_store_impls!(&T, Arc<T>);
