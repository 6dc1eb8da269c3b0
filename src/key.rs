//! ChainKey: the capability a key needs to live in a `ChainMap`.

/// Equality plus a 32-bit digest used to pick a bucket.
///
/// Implementations must keep the two consistent: if `a.equals(b)` then
/// `a.digest() == b.digest()`. Both methods should be pure; the map stores
/// each key's digest at insertion and never recomputes it for that key.
pub trait ChainKey {
    /// Value equality against another key of the same type.
    fn equals(&self, other: &Self) -> bool;

    /// Integer summary of the key. May be negative; the map masks the sign bit.
    fn digest(&self) -> i32;
}

/// Absent keys: `None` digests to 0, equals only `None`, and never equals a
/// `Some`. This lets a map keyed by `Option<K>` hold one entry for the
/// missing key.
impl<K: ChainKey> ChainKey for Option<K> {
    fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (None, None) => true,
            (Some(a), Some(b)) => a.equals(b),
            _ => false,
        }
    }

    fn digest(&self) -> i32 {
        self.as_ref().map_or(0, |k| k.digest())
    }
}

impl<K: ChainKey + ?Sized> ChainKey for &K {
    fn equals(&self, other: &Self) -> bool {
        (**self).equals(*other)
    }

    fn digest(&self) -> i32 {
        (**self).digest()
    }
}
