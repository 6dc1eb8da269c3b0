//! chain-hashmap: a single-threaded hash map built from separate chains.
//!
//! Internal Design:
//!
//! Summary
//! - Keys implement [`ChainKey`]: value equality plus an `i32` digest. The
//!   map never relies on `Hash`/`Eq`; the digest alone picks the bucket.
//! - Layers:
//!   - `SlotMap<DefaultKey, Entry>`: owns every entry. Handles stay valid
//!     while an entry is live, so chains are lists of handles rather than
//!     owning pointers.
//!   - Bucket array: `Vec<Option<DefaultKey>>`, one chain head per bucket.
//!     Each entry stores the handle of its successor.
//!
//! Bucket selection
//! - `index = (digest & 0x7fff_ffff) % capacity`. Negative digests lose the
//!   sign bit, not their magnitude.
//! - Initial capacity is [`INITIAL_CAPACITY`] (10). After a new key is
//!   added, if `len > LOAD_FACTOR * capacity` (0.7) the bucket array doubles.
//!
//! Chain order
//! - New keys are prepended, so the most recently inserted of several
//!   colliding keys is found first.
//! - Rehash walks old buckets in index order and each chain head to tail,
//!   prepending into the new array. Keys that remain in one bucket come out
//!   in reverse order.
//!
//! Rehashing invariants
//! - Each entry stores the digest computed when it was inserted and rehash
//!   only reads stored digests. No user code runs during redistribution.
//! - The new array is fully built before it replaces the old one.
//!   [`ChainMap::try_put`] reserves it before inserting, so allocation
//!   failure leaves the map untouched.
//!
//! Absent keys
//! - `Option<K>` is a key whenever `K` is. `None` digests to 0 and matches
//!   only `None`.
//!
//! Notes and non-goals
//! - No internal synchronization. Every mutation takes `&mut self`, so a
//!   map can move between threads but is not shared for writing.
//! - Capacity never shrinks, not even on `clear`.
//! - Iteration order is arbitrary.

mod chain_map;
#[cfg(test)]
mod chain_map_proptest;
mod coordinate;
mod key;

pub use chain_map::{
    BucketKeys, ChainMap, GrowError, Iter, IterMut, INITIAL_CAPACITY, LOAD_FACTOR,
};
pub use coordinate::Coordinate;
pub use key::ChainKey;
