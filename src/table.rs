//! Table: open-addressing hash table with linear probing and tombstones.
//!
//! Layout
//! - `index`: fixed array of `capacity` slots, each `Empty`, `Tombstone`, or
//!   `Occupied(i)` where `i` is a position in `items`.
//! - `items`: a [`DynArray`] of records `{hashcode, key, value}` in insertion
//!   order. Removing a key clears its record in place (`None`) and leaves a
//!   tombstone in the index; positions of other records never move except
//!   during [`Table::compress`], which rebuilds the index from scratch.
//!
//! Invariants
//! - Every `Occupied(i)` slot refers to a live record, and each live record is
//!   referenced by exactly one slot.
//! - A record's cached `hashcode` is what the hash capability returned for its
//!   key; probing and rebuilding use the cached value and never rehash.
//! - `len <= capacity`; `len` equals the number of occupied slots.
//!
//! Callback discipline
//! - Hash and equality callbacks run inside a debug reentrancy guard.
//! - Destructors run only after the table's bookkeeping is final, so a
//!   failing destructor cannot leave the table inconsistent.

use crate::alloc;
use crate::dyn_array::{DynArray, MIN_CAPACITY};
use crate::error::{keep_first, Error};
use crate::guard::CallbackGuard;
use crate::keys::{DefaultEq, DefaultHash, KeyEq, KeyHasher};
use crate::probe::{self, Mode, Probe, Slot};
use core::fmt;
use core::hash::Hash;
use core::mem;

#[derive(Debug)]
struct Record<K, V> {
    hashcode: u64,
    key: K,
    value: V,
}

pub struct Table<K, V, H, E> {
    index: Box<[Slot]>,
    items: DynArray<Option<Record<K, V>>>, // None marks a cleared record
    len: usize,
    hasher: H,
    eq: E,
    guard: CallbackGuard,
}

/// Table hashing through `Hash` (hashbrown's default builder) and comparing
/// through `Eq`.
pub type DefaultTable<K, V> = Table<K, V, DefaultHash, DefaultEq>;

impl<K, V> Table<K, V, DefaultHash, DefaultEq>
where
    K: Hash + Eq,
{
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        Self::new(capacity, DefaultHash::default(), DefaultEq)
    }
}

/// Iterator over live entries in items order.
pub struct Iter<'a, K, V> {
    it: core::slice::Iter<'a, Option<Record<K, V>>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it
            .find_map(|r| r.as_ref())
            .map(|r| (&r.key, &r.value))
    }
}

/// Iterator over live entries with mutable values.
pub struct IterMut<'a, K, V> {
    it: core::slice::IterMut<'a, Option<Record<K, V>>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it
            .find_map(|r| r.as_mut())
            .map(|r| (&r.key, &mut r.value))
    }
}

// Accessors that never call user code.
impl<K, V, H, E> Table<K, V, H, E> {
    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    /// Number of index slots; the most keys the table can hold.
    pub fn capacity(&self) -> usize {
        self.index.len()
    }
    /// Records in the items array, cleared ones included.
    pub fn record_count(&self) -> usize {
        self.items.len()
    }
    pub fn slots(&self) -> &[Slot] {
        &self.index
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.items.as_slice().iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.items.iter_mut(),
        }
    }

    /// Drop cleared records from the items array and rebuild every index slot
    /// from the survivors' cached hashcodes. Capacity is unchanged and all
    /// tombstones are gone afterwards.
    pub fn compress(&mut self) -> Result<(), Error> {
        self.items.retain(Option::is_some)?;
        self.index.fill(Slot::Empty);
        for (position, record) in self.items.iter().enumerate() {
            let record = record
                .as_ref()
                .ok_or(Error::Malformed("cleared record survived compression"))?;
            let slot = probe::first_open(&self.index, record.hashcode)
                .ok_or(Error::Malformed("more live records than slots"))?;
            self.index[slot] = Slot::Occupied(position);
        }
        Ok(())
    }

    /// Tear the table down, handing every live key and value to the
    /// destructors. All records are visited even after a failure; the first
    /// failure is returned.
    pub fn destruct<KD, VD>(
        self,
        mut key_destructor: KD,
        mut value_destructor: VD,
    ) -> Result<(), Error>
    where
        KD: FnMut(K) -> Result<(), Error>,
        VD: FnMut(V) -> Result<(), Error>,
    {
        let mut first = None;
        let released = self.items.destruct(|record| {
            if let Some(r) = record {
                keep_first(&mut first, key_destructor(r.key));
                keep_first(&mut first, value_destructor(r.value));
            }
            Ok(())
        });
        released.and(first.map_or(Ok(()), Err))
    }

    /// Render the index table followed by the items array:
    /// `(len: L, cap: C) {EMPTY, TOMBSTONE, 0, ...} (len: .., cap: .., size: ..) [...]`.
    /// Printer failures show as `?` and are returned at the end.
    pub fn write_with<W, PK, PV>(
        &self,
        out: &mut W,
        mut key_printer: PK,
        mut value_printer: PV,
    ) -> fmt::Result
    where
        W: fmt::Write,
        PK: FnMut(&mut W, &K) -> fmt::Result,
        PV: FnMut(&mut W, &V) -> fmt::Result,
    {
        write!(out, "(len: {}, cap: {}) {{", self.len, self.capacity())?;
        for (i, slot) in self.index.iter().enumerate() {
            if i > 0 {
                out.write_str(", ")?;
            }
            write!(out, "{}", slot)?;
        }
        out.write_str("} ")?;
        self.items.write_with(out, |out, record| match record {
            Some(r) => {
                write!(out, "{{hashcode: {}, key: ", r.hashcode)?;
                key_printer(out, &r.key)?;
                out.write_str(", value: ")?;
                value_printer(out, &r.value)?;
                out.write_str("}")
            }
            None => out.write_str("{cleared}"),
        })
    }

    fn record(&self, item: usize) -> Result<&Record<K, V>, Error> {
        self.items
            .search(item)
            .and_then(Option::as_ref)
            .ok_or(Error::Malformed("index slot refers to a cleared record"))
    }

    fn record_mut(&mut self, item: usize) -> Result<&mut Record<K, V>, Error> {
        self.items
            .search_mut(item)
            .and_then(Option::as_mut)
            .ok_or(Error::Malformed("index slot refers to a cleared record"))
    }

    // Rebuild once cleared records are at least as many as the index slots
    // (minimum 4). Between rebuilds `items` grows by doubling, and each
    // rebuild follows at least that many removals.
    fn should_compress(&self) -> bool {
        self.items.len() - self.len >= self.capacity().max(MIN_CAPACITY)
    }
}

impl<K, V, H, E> Table<K, V, H, E>
where
    H: KeyHasher<K>,
    E: KeyEq<K>,
{
    /// Allocate `capacity` empty slots and an items array of the same size.
    pub fn new(capacity: usize, hasher: H, eq: E) -> Result<Self, Error> {
        Ok(Self {
            index: alloc::try_filled(capacity, Slot::Empty)?,
            items: DynArray::with_capacity(capacity)?,
            len: 0,
            hasher,
            eq,
            guard: CallbackGuard::new(),
        })
    }

    /// Hash `key` and walk its chain. Zero capacity fails before any user
    /// code runs.
    fn locate(&self, key: &K, mode: Mode) -> Result<(u64, Probe), Error> {
        if self.index.is_empty() {
            return Err(Error::DivideByZero);
        }
        let _g = self.guard.enter();
        let hashcode = self.hasher.hash_key(key);
        let found = probe::probe(&self.index, hashcode, mode, |item| {
            let record = self.record(item)?;
            Ok(record.hashcode == hashcode && self.eq.key_eq(&record.key, key))
        })?;
        Ok((hashcode, found))
    }

    /// Associate `value` with `key`.
    ///
    /// If the key is present its value is replaced in place, the stored key
    /// is kept (the new `key` is dropped), and the old value goes to
    /// `old_value_destructor`. Otherwise a new record takes the first
    /// available slot on the key's chain, or `OutOfRoom` is returned and the
    /// table is unchanged.
    pub fn insert<D>(&mut self, key: K, value: V, old_value_destructor: D) -> Result<(), Error>
    where
        D: FnOnce(V) -> Result<(), Error>,
    {
        let (hashcode, found) = self.locate(&key, Mode::Insert)?;
        let mut slot = match found {
            Probe::Found { item, .. } => {
                let old = mem::replace(&mut self.record_mut(item)?.value, value);
                return old_value_destructor(old);
            }
            Probe::Vacant(slot) => slot,
            Probe::Absent => {
                return Err(Error::OutOfRoom {
                    capacity: self.capacity(),
                })
            }
        };
        debug_assert!(self.len < self.capacity());

        if self.should_compress() {
            self.compress()?;
            // The key is known to be absent, so any open slot on its chain
            // will do and no callback needs to run again.
            slot = probe::first_open(&self.index, hashcode).ok_or(Error::OutOfRoom {
                capacity: self.capacity(),
            })?;
        }

        self.items.append(Some(Record {
            hashcode,
            key,
            value,
        }))?;
        self.index[slot] = Slot::Occupied(self.items.len() - 1);
        self.len += 1;
        Ok(())
    }

    /// Value stored under `key`, or `None` if absent.
    pub fn search(&self, key: &K) -> Result<Option<&V>, Error> {
        match self.locate(key, Mode::Lookup)? {
            (_, Probe::Found { item, .. }) => Ok(Some(&self.record(item)?.value)),
            _ => Ok(None),
        }
    }

    pub fn search_mut(&mut self, key: &K) -> Result<Option<&mut V>, Error> {
        match self.locate(key, Mode::Lookup)? {
            (_, Probe::Found { item, .. }) => Ok(Some(&mut self.record_mut(item)?.value)),
            _ => Ok(None),
        }
    }

    /// Like [`search`](Self::search), reading a zero-capacity table as a
    /// miss. A malformed table panics in debug builds.
    pub fn get(&self, key: &K) -> Option<&V> {
        found_or_miss(self.search(key))
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        found_or_miss(self.search_mut(key))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Unlink `key` and return its stored key and value. The slot becomes a
    /// tombstone and the record is cleared. Absent keys yield `None`.
    pub fn remove_entry(&mut self, key: &K) -> Result<Option<(K, V)>, Error> {
        let (slot, item) = match self.locate(key, Mode::Lookup)? {
            (_, Probe::Found { slot, item }) => (slot, item),
            _ => return Ok(None),
        };
        let record = self
            .items
            .search_mut(item)
            .and_then(Option::take)
            .ok_or(Error::Malformed("index slot refers to a cleared record"))?;
        self.index[slot] = Slot::Tombstone;
        self.len -= 1;
        Ok(Some((record.key, record.value)))
    }

    /// Remove `key`, passing the stored key and value to their destructors.
    ///
    /// Removing an absent key succeeds without effect. Both destructors run
    /// even if the key destructor fails; its error takes precedence.
    pub fn remove<KD, VD>(
        &mut self,
        key: &K,
        key_destructor: KD,
        value_destructor: VD,
    ) -> Result<(), Error>
    where
        KD: FnOnce(K) -> Result<(), Error>,
        VD: FnOnce(V) -> Result<(), Error>,
    {
        let Some((k, v)) = self.remove_entry(key)? else {
            return Ok(());
        };
        let key_result = key_destructor(k);
        let value_result = value_destructor(v);
        key_result.and(value_result)
    }
}

fn found_or_miss<T>(result: Result<Option<T>, Error>) -> Option<T> {
    match result {
        Ok(found) => found,
        Err(Error::DivideByZero) => None,
        Err(e) => {
            debug_assert!(false, "lookup on a broken table: {}", e);
            None
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, H, E> fmt::Debug for Table<K, V, H, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Collects the capacity and both capabilities before building a [`Table`].
pub struct TableBuilder<H, E> {
    capacity: usize,
    hasher: Option<H>,
    eq: Option<E>,
}

impl<H, E> TableBuilder<H, E> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            hasher: None,
            eq: None,
        }
    }

    pub fn hasher(mut self, hasher: H) -> Self {
        self.hasher = Some(hasher);
        self
    }

    pub fn key_eq(mut self, eq: E) -> Self {
        self.eq = Some(eq);
        self
    }

    /// Fails with `NullArgument` naming whichever capability is missing.
    pub fn build<K, V>(self) -> Result<Table<K, V, H, E>, Error>
    where
        H: KeyHasher<K>,
        E: KeyEq<K>,
    {
        let hasher = self.hasher.ok_or(Error::NullArgument("hash function"))?;
        let eq = self.eq.ok_or(Error::NullArgument("key equality function"))?;
        Table::new(self.capacity, hasher, eq)
    }
}
