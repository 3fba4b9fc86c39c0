use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use storefront_core::TenantId;

/// Tenant-isolated key/value store for disposable read models.
///
/// Every lookup is scoped by tenant; nothing can be read across tenants.
pub trait TenantStore<K, V>: Send + Sync {
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V>;
    fn upsert(&self, tenant_id: TenantId, key: K, value: V);
    fn list(&self, tenant_id: TenantId) -> Vec<V>;
    /// First record of the tenant matching `predicate`.
    fn find(&self, tenant_id: TenantId, predicate: &dyn Fn(&K, &V) -> bool) -> Option<V>;
}

impl<K, V, S> TenantStore<K, V> for Arc<S>
where
    S: TenantStore<K, V> + ?Sized,
{
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        (**self).get(tenant_id, key)
    }

    fn upsert(&self, tenant_id: TenantId, key: K, value: V) {
        (**self).upsert(tenant_id, key, value)
    }

    fn list(&self, tenant_id: TenantId) -> Vec<V> {
        (**self).list(tenant_id)
    }

    fn find(&self, tenant_id: TenantId, predicate: &dyn Fn(&K, &V) -> bool) -> Option<V> {
        (**self).find(tenant_id, predicate)
    }
}

#[derive(Debug)]
pub struct InMemoryTenantStore<K, V> {
    inner: RwLock<HashMap<TenantId, HashMap<K, V>>>,
}

impl<K, V> InMemoryTenantStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for InMemoryTenantStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> TenantStore<K, V> for InMemoryTenantStore<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        let map = self.inner.read().ok()?;
        map.get(&tenant_id)?.get(key).cloned()
    }

    fn upsert(&self, tenant_id: TenantId, key: K, value: V) {
        match self.inner.write() {
            Ok(mut map) => {
                map.entry(tenant_id).or_default().insert(key, value);
            }
            Err(_) => tracing::error!(%tenant_id, "read model lock poisoned; upsert dropped"),
        }
    }

    fn list(&self, tenant_id: TenantId) -> Vec<V> {
        let Ok(map) = self.inner.read() else {
            return vec![];
        };
        map.get(&tenant_id)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }

    fn find(&self, tenant_id: TenantId, predicate: &dyn Fn(&K, &V) -> bool) -> Option<V> {
        let map = self.inner.read().ok()?;
        map.get(&tenant_id)?
            .iter()
            .find(|(k, v)| predicate(k, v))
            .map(|(_, v)| v.clone())
    }
}
