//! ChainMap: separate chaining over an arena of linked entries.
//!
//! Entries live in a `SlotMap`; each bucket holds the handle of its chain
//! head and each entry holds the handle of its successor. Rehashing only
//! rewrites handles, so entries never move or get cloned.

use crate::key::ChainKey;
use core::fmt;
use slotmap::{DefaultKey, SlotMap};
use std::collections::TryReserveError;
use thiserror::Error;

/// Bucket count of a freshly constructed map.
pub const INITIAL_CAPACITY: usize = 10;

/// Rehash once `len > LOAD_FACTOR * capacity`.
pub const LOAD_FACTOR: f64 = 0.7;

type Link = Option<DefaultKey>;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    digest: i32,
    next: Link,
}

/// Failure to grow the bucket array in [`ChainMap::try_put`]. The map is
/// left exactly as it was.
#[derive(Debug, Error)]
pub enum GrowError {
    #[error("bucket count overflows usize when doubled")]
    CapacityOverflow,
    #[error("failed to allocate grown bucket array: {0}")]
    Alloc(#[from] TryReserveError),
}

pub struct ChainMap<K, V> {
    buckets: Vec<Link>,
    slots: SlotMap<DefaultKey, Entry<K, V>>, // entry storage; len() is the map size
}

/// Clear the sign bit so the digest can be reduced to a bucket index.
#[inline]
fn digest_non_negative(digest: i32) -> usize {
    (digest & 0x7fff_ffff) as usize
}

#[inline]
fn equals_key<K: ChainKey>(a: &K, b: &K) -> bool {
    core::ptr::eq(a, b) || a.equals(b)
}

/// Empty bucket array twice as long as `capacity`, without aborting on
/// allocation failure.
fn grown_buckets(capacity: usize) -> Result<Vec<Link>, GrowError> {
    let len = capacity
        .checked_mul(2)
        .ok_or(GrowError::CapacityOverflow)?;
    let mut buckets = Vec::new();
    buckets.try_reserve_exact(len)?;
    buckets.resize(len, None);
    Ok(buckets)
}

impl<K: ChainKey, V> ChainMap<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Start with `buckets` chains (at least one).
    pub fn with_capacity(buckets: usize) -> Self {
        Self {
            buckets: vec![None; buckets.max(1)],
            slots: SlotMap::with_key(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Current number of buckets. Only grows.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Drop every entry. The bucket array keeps its length.
    pub fn clear(&mut self) {
        self.buckets.fill(None);
        self.slots.clear();
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let at = self.locate(key).ok()?;
        Some(&self.slots[at].value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let at = self.locate(key).ok()?;
        Some(&mut self.slots[at].value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.locate(key).is_ok()
    }

    /// Insert or replace. Returns the previous value for an equal key.
    ///
    /// A new key is prepended to its chain, so among colliding keys the most
    /// recently inserted one is found first. Growth happens after the insert
    /// and aborts on allocation failure like the std collections do.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let (digest, index) = match self.locate(&key) {
            Ok(at) => return Some(core::mem::replace(&mut self.slots[at].value, value)),
            Err(vacant) => vacant,
        };
        self.link_front(index, key, value, digest);
        if self.needs_rehash() {
            self.rehash();
        }
        None
    }

    /// Like [`put`](Self::put), but the grown bucket array is reserved before
    /// the map is touched. On `Err` the key and value are dropped and the map
    /// is unchanged.
    pub fn try_put(&mut self, key: K, value: V) -> Result<Option<V>, GrowError> {
        self.try_put_with(key, value, grown_buckets)
    }

    /// `try_put` with the growth step supplied by the caller.
    pub(crate) fn try_put_with<G>(
        &mut self,
        key: K,
        value: V,
        grow: G,
    ) -> Result<Option<V>, GrowError>
    where
        G: FnOnce(usize) -> Result<Vec<Link>, GrowError>,
    {
        let (digest, index) = match self.locate(&key) {
            Ok(at) => return Ok(Some(core::mem::replace(&mut self.slots[at].value, value))),
            Err(vacant) => vacant,
        };
        let grown = if self.exceeds_load(self.len() + 1) {
            Some(grow(self.capacity())?)
        } else {
            None
        };
        self.link_front(index, key, value, digest);
        if let Some(fresh) = grown {
            self.relink_into(fresh);
        }
        Ok(None)
    }

    /// Unlink the entry for `key` and return its value. Capacity is kept.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let index = self.index_of(key.digest());
        let mut prev: Link = None;
        let mut cur = self.buckets[index];
        while let Some(at) = cur {
            let entry = &self.slots[at];
            let next = entry.next;
            if equals_key(&entry.key, key) {
                match prev {
                    None => self.buckets[index] = next,
                    Some(p) => self.slots[p].next = next,
                }
                return self.slots.remove(at).map(|e| e.value);
            }
            prev = cur;
            cur = next;
        }
        None
    }

    /// Bucket that holds (or would hold) `key` at the current capacity.
    pub fn bucket_index(&self, key: &K) -> usize {
        self.index_of(key.digest())
    }

    /// Keys chained in bucket `index`, head first. Empty past the end.
    pub fn bucket_keys(&self, index: usize) -> BucketKeys<'_, K, V> {
        BucketKeys {
            slots: &self.slots,
            cur: self.buckets.get(index).copied().flatten(),
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.slots.values(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.slots.values_mut(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    #[inline]
    fn index_of(&self, digest: i32) -> usize {
        digest_non_negative(digest) % self.buckets.len()
    }

    /// Entry handle for `key`, or its digest and bucket when absent.
    fn locate(&self, key: &K) -> Result<DefaultKey, (i32, usize)> {
        let digest = key.digest();
        let index = self.index_of(digest);
        let mut cur = self.buckets[index];
        while let Some(at) = cur {
            let entry = &self.slots[at];
            if equals_key(&entry.key, key) {
                return Ok(at);
            }
            cur = entry.next;
        }
        Err((digest, index))
    }

    fn link_front(&mut self, index: usize, key: K, value: V, digest: i32) {
        let next = self.buckets[index];
        let at = self.slots.insert(Entry {
            key,
            value,
            digest,
            next,
        });
        self.buckets[index] = Some(at);
    }

    fn exceeds_load(&self, len: usize) -> bool {
        len as f64 > LOAD_FACTOR * self.capacity() as f64
    }

    fn needs_rehash(&self) -> bool {
        self.exceeds_load(self.len())
    }

    /// Double the bucket count and redistribute every entry.
    fn rehash(&mut self) {
        let fresh = vec![None; self.capacity() * 2];
        self.relink_into(fresh);
    }

    /// Move every chain into `fresh` and make it the active bucket array.
    ///
    /// Old buckets are visited in index order and each chain head to tail;
    /// every entry is prepended to its new chain, so entries that stay
    /// together come out in reverse order. Uses stored digests only, so no
    /// user code runs and nothing here can fail.
    fn relink_into(&mut self, mut fresh: Vec<Link>) {
        let len = fresh.len();
        for &head in &self.buckets {
            let mut cur = head;
            while let Some(at) = cur {
                let entry = &mut self.slots[at];
                cur = entry.next;
                let index = digest_non_negative(entry.digest) % len;
                entry.next = fresh[index];
                fresh[index] = Some(at);
            }
        }
        self.buckets = fresh;
        #[cfg(debug_assertions)]
        self.debug_check_chains();
    }

    /// Every live entry sits on exactly the chain its digest selects.
    #[cfg(debug_assertions)]
    fn debug_check_chains(&self) {
        let mut reachable = 0usize;
        for (index, &head) in self.buckets.iter().enumerate() {
            let mut cur = head;
            while let Some(at) = cur {
                let entry = &self.slots[at];
                debug_assert_eq!(self.index_of(entry.digest), index);
                reachable += 1;
                cur = entry.next;
            }
        }
        debug_assert_eq!(reachable, self.slots.len());
    }
}

impl<K: ChainKey, V> Default for ChainMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ChainKey + fmt::Debug, V: fmt::Debug> fmt::Debug for ChainMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: ChainKey, V> Extend<(K, V)> for ChainMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K: ChainKey, V> FromIterator<(K, V)> for ChainMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

/// Iterator over `(&K, &V)` in arbitrary order.
pub struct Iter<'a, K, V> {
    it: slotmap::basic::Values<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|e| (&e.key, &e.value))
    }
}

/// Iterator over `(&K, &mut V)` in arbitrary order.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::ValuesMut<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|e| (&e.key, &mut e.value))
    }
}

/// Walks one chain from its head.
pub struct BucketKeys<'a, K, V> {
    slots: &'a SlotMap<DefaultKey, Entry<K, V>>,
    cur: Link,
}

impl<'a, K, V> Iterator for BucketKeys<'a, K, V> {
    type Item = &'a K;
    fn next(&mut self) -> Option<Self::Item> {
        let slots = self.slots;
        let entry = &slots[self.cur?];
        self.cur = entry.next;
        Some(&entry.key)
    }
}

#[cfg(test)]
impl<K: ChainKey, V> ChainMap<K, V> {
    /// Entries reachable by walking every chain.
    pub(crate) fn reachable(&self) -> usize {
        (0..self.capacity())
            .map(|i| self.bucket_keys(i).count())
            .sum()
    }

    /// Every key sits in the bucket its digest selects.
    pub(crate) fn keys_in_home_buckets(&self) -> bool {
        (0..self.capacity()).all(|i| self.bucket_keys(i).all(|k| self.bucket_index(k) == i))
    }
}
