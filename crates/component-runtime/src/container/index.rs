//! Lineage index: type key to the attached components under it.

use std::collections::HashMap;

use crate::component::ComponentHandle;
use crate::domain::TypeKey;

/// Buckets keep attachment order. Empty buckets are dropped.
#[derive(Debug, Default)]
pub(crate) struct ComponentIndex {
    buckets: HashMap<TypeKey, Vec<ComponentHandle>>,
}

impl ComponentIndex {
    /// File `handle` under every key of its lineage.
    pub(crate) fn insert(&mut self, handle: &ComponentHandle) {
        for key in handle.lineage() {
            self.buckets.entry(*key).or_default().push(handle.clone());
        }
    }

    /// Remove `handle` from every bucket of its lineage.
    pub(crate) fn remove(&mut self, handle: &ComponentHandle) {
        for key in handle.lineage() {
            if let Some(bucket) = self.buckets.get_mut(key) {
                bucket.retain(|other| !other.ptr_eq(handle));
                if bucket.is_empty() {
                    self.buckets.remove(key);
                }
            }
        }
    }

    pub(crate) fn get(&self, key: TypeKey) -> &[ComponentHandle] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn contains(&self, key: TypeKey) -> bool {
        self.buckets.contains_key(&key)
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn clear(&mut self) {
        self.buckets.clear();
    }
}
