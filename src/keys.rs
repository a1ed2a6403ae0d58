//! Hash and equality capabilities a table is constructed with.
//!
//! Both traits are implemented for plain closures and function pointers, so
//! `Table::new(cap, |k: &String| k.len() as u64, |a: &String, b: &String| a == b)`
//! works directly. `DefaultHash` and `DefaultEq` adapt the standard `Hash`
//! and `Eq` traits for callers who do not need custom behaviour.
//!
//! The two must agree: keys that compare equal must hash identically.

use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

pub trait KeyHasher<K: ?Sized> {
    fn hash_key(&self, key: &K) -> u64;
}

impl<K: ?Sized, F> KeyHasher<K> for F
where
    F: Fn(&K) -> u64,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self(key)
    }
}

pub trait KeyEq<K: ?Sized> {
    fn key_eq(&self, a: &K, b: &K) -> bool;
}

impl<K: ?Sized, F> KeyEq<K> for F
where
    F: Fn(&K, &K) -> bool,
{
    #[inline]
    fn key_eq(&self, a: &K, b: &K) -> bool {
        self(a, b)
    }
}

/// Hashes keys through a `BuildHasher`; hashbrown's default builder unless
/// another is supplied.
#[derive(Clone, Debug, Default)]
pub struct DefaultHash<S = DefaultHashBuilder> {
    state: S,
}

impl<S> DefaultHash<S> {
    pub fn with_state(state: S) -> Self {
        Self { state }
    }
}

impl<K, S> KeyHasher<K> for DefaultHash<S>
where
    K: ?Sized + Hash,
    S: BuildHasher,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self.state.hash_one(key)
    }
}

/// Compares keys with `Eq`.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultEq;

impl<K> KeyEq<K> for DefaultEq
where
    K: ?Sized + Eq,
{
    #[inline]
    fn key_eq(&self, a: &K, b: &K) -> bool {
        a == b
    }
}
