//! Slot markers and linear probing over the index table.
//!
//! A probe starts at the home slot `hashcode % capacity` and walks forward,
//! wrapping around, for at most `capacity` steps. An `Empty` slot ends the
//! chain. A `Tombstone` never ends it: the key being looked for may have been
//! placed beyond the slot before that slot was vacated. Only insert mode may
//! hand a tombstone back for reuse, and only once the whole chain has been
//! ruled out as containing the key.

use crate::error::Error;
use core::fmt;

/// One entry of the index table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Slot {
    /// Never used since the last rebuild; terminates probe chains.
    Empty,
    /// Vacated by a removal; probe chains continue through it.
    Tombstone,
    /// Position of a live record in the items array.
    Occupied(usize),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Empty => f.write_str("EMPTY"),
            Slot::Tombstone => f.write_str("TOMBSTONE"),
            Slot::Occupied(item) => write!(f, "{}", item),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Mode {
    /// Find the key, or else the first slot a new record may take.
    Insert,
    /// Find the key; tombstones are skipped and never returned.
    Lookup,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Probe {
    Found { slot: usize, item: usize },
    /// Insert mode only: the key is absent and may be placed here.
    Vacant(usize),
    /// The key is absent (and, in insert mode, there is no room for it).
    Absent,
}

/// Walk the chain for `hashcode`. `is_match` is asked about the items index
/// stored in each occupied slot and decides whether that record holds the key.
pub(crate) fn probe<F>(
    slots: &[Slot],
    hashcode: u64,
    mode: Mode,
    mut is_match: F,
) -> Result<Probe, Error>
where
    F: FnMut(usize) -> Result<bool, Error>,
{
    let capacity = slots.len();
    if capacity == 0 {
        return Err(Error::DivideByZero);
    }
    let home = (hashcode % capacity as u64) as usize;
    let mut first_tombstone = None;

    for offset in 0..capacity {
        let slot = (home + offset) % capacity;
        match slots[slot] {
            Slot::Empty => {
                return Ok(match mode {
                    Mode::Insert => Probe::Vacant(first_tombstone.unwrap_or(slot)),
                    Mode::Lookup => Probe::Absent,
                });
            }
            Slot::Tombstone => {
                if mode == Mode::Insert && first_tombstone.is_none() {
                    first_tombstone = Some(slot);
                }
            }
            Slot::Occupied(item) => {
                if is_match(item)? {
                    return Ok(Probe::Found { slot, item });
                }
            }
        }
    }

    // Whole table scanned without an empty slot or a match.
    Ok(first_tombstone.map_or(Probe::Absent, Probe::Vacant))
}

/// First non-occupied slot on the chain for `hashcode`, used when rebuilding
/// the index from records already known to be distinct.
pub(crate) fn first_open(slots: &[Slot], hashcode: u64) -> Option<usize> {
    let capacity = slots.len();
    if capacity == 0 {
        return None;
    }
    let home = (hashcode % capacity as u64) as usize;
    (0..capacity)
        .map(|offset| (home + offset) % capacity)
        .find(|&slot| !matches!(slots[slot], Slot::Occupied(_)))
}
