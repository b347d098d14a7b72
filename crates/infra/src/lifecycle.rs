//! Lifecycle executor: load → decide → apply → compare-and-swap.
//!
//! Aggregates stay pure (`handle` produces events, `apply` evolves state);
//! this store adds the execution guarantees around them: per-aggregate
//! serialization through an optimistic version check, and all-or-nothing
//! mutation (a rejected command never touches the snapshot).

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

use shiplane_core::{Aggregate, DomainError, ExpectedVersion, TenantId};

/// In-memory aggregate snapshot store with optimistic concurrency.
#[derive(Debug)]
pub struct LifecycleStore<A: Aggregate> {
    inner: RwLock<HashMap<(TenantId, A::Id), A>>,
}

impl<A: Aggregate> LifecycleStore<A> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<A: Aggregate> Default for LifecycleStore<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> LifecycleStore<A>
where
    A: Aggregate<Error = DomainError> + Clone,
    A::Id: Clone + Eq + Hash,
{
    pub fn get(&self, tenant_id: TenantId, id: &A::Id) -> Option<A> {
        let map = self.inner.read().ok()?;
        map.get(&(tenant_id, id.clone())).cloned()
    }

    pub fn list(&self, tenant_id: TenantId) -> Vec<A> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };
        map.iter()
            .filter_map(|((t, _), a)| if *t == tenant_id { Some(a.clone()) } else { None })
            .collect()
    }

    pub fn find(&self, tenant_id: TenantId, mut predicate: impl FnMut(&A) -> bool) -> Option<A> {
        let map = self.inner.read().ok()?;
        map.iter()
            .find(|((t, _), a)| *t == tenant_id && predicate(a))
            .map(|(_, a)| a.clone())
    }

    /// Execute one command against one aggregate.
    ///
    /// Loads the current snapshot (or a fresh empty instance), checks the
    /// caller's version expectation, decides events, applies them, then
    /// swaps the snapshot in — but only if nobody else committed in the
    /// meantime (compare-and-swap on the version counter, stale writers get
    /// a `Conflict`). Returns the new snapshot and the emitted events.
    pub fn execute(
        &self,
        tenant_id: TenantId,
        id: A::Id,
        command: &A::Command,
        make_empty: impl FnOnce(A::Id) -> A,
        expected: ExpectedVersion,
    ) -> Result<(A, Vec<A::Event>), DomainError> {
        let loaded = self.get(tenant_id, &id);
        let mut aggregate = loaded.unwrap_or_else(|| make_empty(id.clone()));
        let base_version = aggregate.version();
        expected.check(base_version)?;

        let events = aggregate.handle(command)?;
        if events.is_empty() {
            return Ok((aggregate, events));
        }
        for event in &events {
            aggregate.apply(event);
        }

        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::invariant("lifecycle store lock poisoned"))?;
        let key = (tenant_id, id);
        let current_version = map.get(&key).map(|a| a.version()).unwrap_or(0);
        if current_version != base_version {
            return Err(DomainError::conflict(format!(
                "stale write (loaded version {base_version}, stored version {current_version})"
            )));
        }
        map.insert(key, aggregate.clone());

        Ok((aggregate, events))
    }
}
