//! probe-table: an open-addressing hash table with tombstone deletion,
//! stored over a capacity-managed dynamic array.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: build the table in small layers whose invariants can be checked
//!   independently.
//! - Layers:
//!   - DynArray<T>: contiguous storage with an explicit capacity policy
//!     (double on full, halve at quarter occupancy, minimum 4) and
//!     check-before-mutate error handling.
//!   - probe: `Slot` markers (`Empty`, `Tombstone`, `Occupied(i)`) and the
//!     linear-probing walk shared by insert, lookup and remove.
//!   - Table<K, V, H, E>: maps keys to values through a fixed index table
//!     whose occupied slots point into a DynArray of `{hashcode, key, value}`
//!     records.
//!
//! Constraints
//! - Single-threaded: the table is `Send` but `!Sync`; share it behind a
//!   lock if several threads need it.
//! - Fixed capacity: the index table never grows; a full table reports
//!   `OutOfRoom` and stays unchanged.
//! - O(1) average operations; O(capacity) worst case for a full probe.
//!
//! Probing and tombstones
//! - Insert mode walks the whole chain looking for the key before it settles
//!   on the first tombstone or empty slot; lookup mode skips tombstones
//!   entirely. Reusing a tombstone during lookup would cut chains short.
//! - Removing a key leaves a tombstone and clears its record in place.
//!   `Table::compress` drops cleared records and rebuilds the index from the
//!   cached hashcodes. Inserting a new key runs it automatically once the
//!   cleared records number at least as many as the index slots, so the
//!   rebuild cost is spread over the removals that produced them.
//!
//! Capabilities and destructors
//! - Hash and key-equality callbacks are supplied at construction, either as
//!   closures or through `DefaultHash`/`DefaultEq`. They run under a
//!   debug-only reentrancy guard.
//! - Values leaving the table go through caller-supplied destructors
//!   (`discard` is the no-op one). Destructors run after bookkeeping is
//!   final; their failures are propagated, never swallowed, and teardown
//!   keeps going after one fails.
//!
//! Notes and non-goals
//! - No persistence and no wire format; this is an in-memory container.
//! - Keys are immutable once inserted; reinserting a key replaces only its
//!   value.

mod alloc;
pub mod dyn_array;
mod error;
mod guard;
pub mod keys;
mod probe;
pub mod table;
mod table_proptest;

// Public surface
pub use dyn_array::DynArray;
pub use error::{discard, BoxError, Error};
pub use keys::{DefaultEq, DefaultHash, KeyEq, KeyHasher};
pub use probe::Slot;
pub use table::{DefaultTable, Table, TableBuilder};
