use dashmap::DashMap;
use std::borrow::Borrow;
use std::hash::Hash;

/// Clone-out helpers for `DashMap`.
///
/// `get()` and `iter()` return guards that hold a shard lock. Holding one
/// across an `.await` stalls every other task touching that shard, so callers
/// that go on to await take owned copies instead.
pub trait DashMapExt<K, V> {
    /// Clone the value for `key`, releasing the shard lock before returning.
    fn get_cloned<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone;

    /// Snapshot every entry as owned pairs.
    fn snapshot(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone;
}

impl<K, V> DashMapExt<K, V> for DashMap<K, V>
where
    K: Eq + Hash,
{
    fn get_cloned<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get(key).map(|r| r.value().clone())
    }

    fn snapshot(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }
}
