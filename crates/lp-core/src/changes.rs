//! `ChangeSet`: the deferred "mark as changed" signal.
//!
//! Every mutating ledger operation records the resources and operations it
//! touched here instead of calling into problem detection directly.  The
//! surrounding scheduler drains the set (see `PlanStore::take_changes`) and
//! recomputes whatever diagnostics it maintains.

use rustc_hash::FxHashSet;

use crate::{OperationId, ResourceId};

/// Dirty resource and operation ids since the last drain.
#[derive(Clone, Debug, Default)]
pub struct ChangeSet {
    resources:  FxHashSet<ResourceId>,
    operations: FxHashSet<OperationId>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn mark_resource(&mut self, id: ResourceId) {
        self.resources.insert(id);
    }

    #[inline]
    pub fn mark_operation(&mut self, id: OperationId) {
        self.operations.insert(id);
    }

    pub fn contains_resource(&self, id: ResourceId) -> bool {
        self.resources.contains(&id)
    }

    pub fn contains_operation(&self, id: OperationId) -> bool {
        self.operations.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.operations.is_empty()
    }

    /// Total number of dirty entities.
    pub fn len(&self) -> usize {
        self.resources.len() + self.operations.len()
    }

    /// Dirty resources in ascending id order.
    pub fn resources(&self) -> Vec<ResourceId> {
        let mut v: Vec<_> = self.resources.iter().copied().collect();
        v.sort_unstable();
        v
    }

    /// Dirty operations in ascending id order.
    pub fn operations(&self) -> Vec<OperationId> {
        let mut v: Vec<_> = self.operations.iter().copied().collect();
        v.sort_unstable();
        v
    }

    /// Fold another set into this one.
    pub fn extend(&mut self, other: ChangeSet) {
        self.resources.extend(other.resources);
        self.operations.extend(other.operations);
    }

    /// Take the current contents, leaving this set empty.
    pub fn take(&mut self) -> ChangeSet {
        std::mem::take(self)
    }
}
