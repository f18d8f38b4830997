// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Variant cloning, with optimistic allocation of variant numbers.

use crate::model::VariantInfo;
use crate::{Error, ErrorKind, VariantStore};

use super::{
    find_variant, first_available_variant_num, variant_num, VariantContext, VariantManager,
    MAX_CLONE_ATTEMPTS,
};

impl<S> VariantManager<S>
where
    S: VariantStore,
{
    /// Creates each of `target_ids` as a copy of `source_id`, in order.
    ///
    /// An existing target is replaced when `may_overwrite` is `true`, and is
    /// an error otherwise.  If the working variant of `ctx` is replaced,
    /// `ctx` is pointed at its replacement.
    ///
    /// Targets processed before a failing one are kept.
    pub fn clone_variant(
        &self,
        ctx: &mut VariantContext,
        source_id: &str,
        target_ids: &[impl AsRef<str>],
        may_overwrite: bool,
    ) -> Result<(), Error> {
        if target_ids.is_empty() {
            return Err(Error::invalid_argument("Empty target variant id list."));
        }
        let mut infos = self.store.variants_infos(false)?;
        let source_num = variant_num(source_id, &infos)?;

        for target_id in target_ids.iter().map(AsRef::as_ref) {
            let mut overwritten = false;
            let mut was_working = false;
            if let Some(existing) = find_variant(target_id, &infos).cloned() {
                if !may_overwrite {
                    return Err(Error::variant_already_exists(format!(
                        "Variant {target_id} already exists."
                    )));
                }
                if existing.num == source_num {
                    return Err(Error::invalid_argument(format!(
                        "Variant {target_id} can't be overwritten with itself."
                    )));
                }
                was_working = ctx.is_working_on(existing.num);
                self.delete_variant(target_id, &mut infos)?;
                if was_working {
                    ctx.working_variant_num = None;
                }
                overwritten = true;
            }

            let target_num = self.clone_with_retry(source_num, target_id, &mut infos)?;
            if was_working {
                ctx.working_variant_num = Some(target_num);
            }

            if overwritten {
                self.notify_variant_overwritten(source_id, target_id);
            } else {
                self.notify_variant_created(source_id, target_id);
            }
        }
        Ok(())
    }

    /// Clones `source_num` into the lowest free variant number, and returns
    /// that number.
    ///
    /// The number is picked from `infos`, which may be stale when other
    /// sessions share the store.  When the store reports the number as taken,
    /// `infos` is refreshed and the next free number is tried, up to
    /// [`MAX_CLONE_ATTEMPTS`] times.  `infos` includes the new variant on
    /// success.
    fn clone_with_retry(
        &self,
        source_num: u32,
        target_id: &str,
        infos: &mut Vec<VariantInfo>,
    ) -> Result<u32, Error> {
        let mut attempts = 0;
        loop {
            let target_num = first_available_variant_num(infos);
            tracing::debug!(
                "Trying to clone variant number {} into {} with number {} (attempt: {}).",
                source_num,
                target_id,
                target_num,
                attempts + 1
            );
            match self.store.clone_variant(source_num, target_num, target_id) {
                Ok(()) => {
                    infos.push(VariantInfo::new(target_num, target_id));
                    return Ok(target_num);
                }
                Err(err) if err.kind() == ErrorKind::DuplicateVariantNum => {
                    tracing::debug!(
                        "Failed to clone into variant number {}: {}",
                        target_num,
                        err
                    );
                    attempts += 1;
                    if attempts == MAX_CLONE_ATTEMPTS {
                        return Err(Error::clone_failed(format!(
                            "Impossible to clone variant {target_id} after {attempts} attempts."
                        )));
                    }
                    *infos = self.store.variants_infos(true)?;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::test_utils::{Event, FailingListener, RacingStore, RecordingListener};
    use crate::{InMemoryNetworkStore, INITIAL_VARIANT_ID};

    fn manager_with_listener(
        store: InMemoryNetworkStore,
    ) -> (VariantManager<InMemoryNetworkStore>, RecordingListener) {
        let mut manager = VariantManager::new(store);
        let listener = RecordingListener::new();
        manager.add_listener(listener.clone());
        (manager, listener)
    }

    #[test]
    fn test_clone_creates_variants() -> Result<(), Error> {
        let (manager, listener) = manager_with_listener(InMemoryNetworkStore::new());
        let mut ctx = VariantContext::new();

        manager.clone_variant(&mut ctx, INITIAL_VARIANT_ID, &["v1", "v2"], false)?;
        manager.clone_variant(&mut ctx, "v2", &["v3".to_string()], false)?;

        assert_eq!(
            manager.store().variants_infos(false)?,
            vec![
                VariantInfo::new(0, INITIAL_VARIANT_ID),
                VariantInfo::new(1, "v1"),
                VariantInfo::new(2, "v2"),
                VariantInfo::new(3, "v3"),
            ]
        );
        assert_eq!(
            listener.events(),
            vec![
                Event::Created(INITIAL_VARIANT_ID.into(), "v1".into()),
                Event::Created(INITIAL_VARIANT_ID.into(), "v2".into()),
                Event::Created("v2".into(), "v3".into()),
            ]
        );
        assert_eq!(ctx, VariantContext::new());

        Ok(())
    }

    #[test]
    fn test_clone_argument_errors() -> Result<(), Error> {
        let (manager, listener) = manager_with_listener(InMemoryNetworkStore::new());
        let mut ctx = VariantContext::new();

        let no_targets: [&str; 0] = [];
        assert!(manager
            .clone_variant(&mut ctx, INITIAL_VARIANT_ID, &no_targets, false)
            .is_err_and(|e| e == Error::invalid_argument("Empty target variant id list.")));
        assert!(manager
            .clone_variant(&mut ctx, "v9", &["v1"], false)
            .is_err_and(|e| e == Error::variant_not_found("Variant v9 not found.")));

        manager.clone_variant(&mut ctx, INITIAL_VARIANT_ID, &["v1"], false)?;
        assert!(manager
            .clone_variant(&mut ctx, INITIAL_VARIANT_ID, &["v1"], false)
            .is_err_and(|e| e == Error::variant_already_exists("Variant v1 already exists.")));
        assert!(manager
            .clone_variant(&mut ctx, "v1", &["v1"], true)
            .is_err_and(|e| e.kind() == ErrorKind::InvalidArgument));
        assert!(manager
            .clone_variant(&mut ctx, "v1", &[INITIAL_VARIANT_ID], true)
            .is_err_and(|e| e.kind() == ErrorKind::Forbidden));

        assert_eq!(listener.events().len(), 1);

        Ok(())
    }

    #[test]
    fn test_overwrite() -> Result<(), Error> {
        let (manager, listener) = manager_with_listener(InMemoryNetworkStore::new());
        let mut ctx = VariantContext::new();

        manager.clone_variant(&mut ctx, INITIAL_VARIANT_ID, &["v1", "v2"], false)?;
        manager.set_working_variant(&mut ctx, "v1")?;
        listener.clear();

        manager.clone_variant(&mut ctx, "v2", &["v1"], true)?;

        assert_eq!(
            listener.events(),
            vec![Event::Overwritten("v2".into(), "v1".into())]
        );
        assert_eq!(manager.working_variant_id(&ctx)?, "v1");
        assert_eq!(manager.variant_ids()?.len(), 3);

        Ok(())
    }

    #[test]
    fn test_overwritten_working_variant_follows_its_slot() -> Result<(), Error> {
        let store = InMemoryNetworkStore::new();
        let mut manager = VariantManager::new(RacingStore::new(&store, 1));
        let listener = RecordingListener::new();
        manager.add_listener(listener.clone());
        let mut ctx = VariantContext::new();

        store.clone_variant(0, 1, "v1")?;
        manager.set_working_variant(&mut ctx, "v1")?;

        // Another session grabs slot 1 as soon as "v1" is deleted.
        manager.clone_variant(&mut ctx, INITIAL_VARIANT_ID, &["v1"], true)?;

        assert_eq!(ctx.working_variant_num()?, 2);
        assert_eq!(manager.working_variant_id(&ctx)?, "v1");
        assert_eq!(
            listener.events(),
            vec![Event::Overwritten(INITIAL_VARIANT_ID.into(), "v1".into())]
        );

        Ok(())
    }

    #[test]
    fn test_retry_on_taken_variant_num() -> Result<(), Error> {
        let store = InMemoryNetworkStore::new();
        let racing = RacingStore::new(&store, 2);
        let manager = VariantManager::new(&racing);
        let mut ctx = VariantContext::new();

        manager.clone_variant(&mut ctx, INITIAL_VARIANT_ID, &["mine"], false)?;

        let infos = store.variants_infos(false)?;
        assert_eq!(
            infos,
            vec![
                VariantInfo::new(0, INITIAL_VARIANT_ID),
                VariantInfo::new(1, "competitor1"),
                VariantInfo::new(2, "competitor2"),
                VariantInfo::new(3, "mine"),
            ]
        );
        assert_eq!(racing.refresh_count(), 2);

        Ok(())
    }

    #[test]
    fn test_retry_exhaustion() -> Result<(), Error> {
        let store = InMemoryNetworkStore::new();
        let racing = RacingStore::new(&store, MAX_CLONE_ATTEMPTS);
        let manager = VariantManager::new(&racing);
        let mut ctx = VariantContext::new();

        assert!(manager
            .clone_variant(&mut ctx, INITIAL_VARIANT_ID, &["mine"], false)
            .is_err_and(|e| e
                == Error::clone_failed("Impossible to clone variant mine after 3 attempts.")));
        assert_eq!(racing.refresh_count(), 2);
        assert!(!manager.variant_ids()?.contains("mine"));
        assert_eq!(store.variants_infos(false)?.len(), 4);

        Ok(())
    }

    #[test]
    fn test_failing_listener_is_isolated() -> Result<(), Error> {
        let mut manager = VariantManager::new(InMemoryNetworkStore::new());
        let before = RecordingListener::new();
        let after = RecordingListener::new();
        manager.add_listener(before.clone());
        manager.add_listener(FailingListener);
        manager.add_listener(after.clone());
        let mut ctx = VariantContext::new();

        manager.clone_variant(&mut ctx, INITIAL_VARIANT_ID, &["v1"], false)?;
        manager.clone_variant(&mut ctx, INITIAL_VARIANT_ID, &["v1"], true)?;
        manager.remove_variant(&mut ctx, "v1")?;

        let expected = vec![
            Event::Created(INITIAL_VARIANT_ID.into(), "v1".into()),
            Event::Overwritten(INITIAL_VARIANT_ID.into(), "v1".into()),
            Event::Removed("v1".into()),
        ];
        assert_eq!(before.events(), expected);
        assert_eq!(after.events(), expected);

        Ok(())
    }

    #[test]
    fn test_concurrent_sessions_get_distinct_slots() -> Result<(), Error> {
        let store = InMemoryNetworkStore::new();
        let sessions = ["a", "b", "c", "d"];

        let results = std::thread::scope(|s| {
            let handles = sessions
                .iter()
                .map(|prefix| {
                    let store = &store;
                    s.spawn(move || {
                        let manager = VariantManager::new(store);
                        let mut ctx = VariantContext::new();
                        let targets = (0..3).map(|i| format!("{prefix}{i}")).collect::<Vec<_>>();
                        manager.clone_variant(&mut ctx, INITIAL_VARIANT_ID, &targets, false)
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|_| Err(Error::internal("Session panicked."))))
                .collect::<Vec<_>>()
        });

        // A session may run out of attempts under contention, but never
        // creates a variant twice or shares a slot.
        let infos = store.variants_infos(false)?;
        let nums = infos.iter().map(|i| i.num).collect::<std::collections::BTreeSet<_>>();
        let ids = infos.iter().map(|i| i.id.as_str()).collect::<std::collections::BTreeSet<_>>();
        assert_eq!(nums.len(), infos.len());
        assert_eq!(ids.len(), infos.len());

        // Targets created before a failure are kept.
        let mut succeeded = 0;
        let mut created = 0;
        for (prefix, result) in sessions.iter().zip(results) {
            let made = infos.iter().filter(|i| i.id.starts_with(prefix)).count();
            match result {
                Ok(()) => {
                    assert_eq!(made, 3);
                    succeeded += 1;
                }
                Err(e) => assert_eq!(e.kind(), ErrorKind::CloneFailed),
            }
            created += made;
        }
        assert!(succeeded >= 1);
        assert_eq!(infos.len(), 1 + created);

        Ok(())
    }
}
