//! DynArray: contiguous, capacity-managed sequence of fixed-size elements.
//!
//! Capacity is tracked explicitly instead of being left to `Vec`'s own
//! heuristics: it doubles (minimum 4) when an insert finds the array full and
//! halves (minimum 4) when a remove leaves it at most a quarter occupied.
//! Every check runs before the first mutation, so a failed call leaves the
//! array exactly as it was.

use crate::alloc;
use crate::error::{keep_first, Error};
use core::fmt;
use core::mem::{self, size_of};

/// Smallest capacity the growth and shrink policy will produce.
pub const MIN_CAPACITY: usize = 4;

pub struct DynArray<T> {
    items: Vec<T>,
    // Logical capacity; the backing `Vec` always holds at least this much.
    capacity: usize,
}

impl<T> DynArray<T> {
    /// Allocate room for `capacity` elements. Zero-sized element types are
    /// rejected with `InvalidArgument`.
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        if size_of::<T>() == 0 {
            return Err(Error::InvalidArgument("element size is zero"));
        }
        Ok(Self {
            items: alloc::try_vec(capacity)?,
            capacity,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    /// Bytes per element.
    pub fn element_size(&self) -> usize {
        size_of::<T>()
    }

    /// Check the structural invariants; `Malformed` names the first one broken.
    pub fn validate(&self) -> Result<(), Error> {
        if size_of::<T>() == 0 {
            return Err(Error::Malformed("element size is zero"));
        }
        if self.items.len() > self.capacity {
            return Err(Error::Malformed("length exceeds capacity"));
        }
        if self.items.capacity() < self.capacity {
            return Err(Error::Malformed("backing storage smaller than capacity"));
        }
        alloc::byte_len::<T>(self.capacity)
            .map_err(|_| Error::Malformed("capacity overflows byte size"))?;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), Error> {
        if index >= self.len() {
            return Err(Error::OutOfBounds {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }

    pub fn search(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn search_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Insert `item` at `index`, shifting `[index, len)` one slot right.
    pub fn insert(&mut self, index: usize, item: T) -> Result<(), Error> {
        self.validate()?;
        if index > self.len() {
            return Err(Error::OutOfBounds {
                index,
                len: self.len(),
            });
        }
        if self.len() == self.capacity {
            self.resize(self.grown_capacity()?)?;
        }
        self.items.insert(index, item);
        Ok(())
    }

    pub fn append(&mut self, item: T) -> Result<(), Error> {
        self.insert(self.len(), item)
    }

    /// Overwrite the element at `index`, handing the old one to `destructor`.
    ///
    /// The new element is in place even when the destructor reports failure.
    pub fn change<D>(&mut self, index: usize, item: T, destructor: D) -> Result<(), Error>
    where
        D: FnOnce(T) -> Result<(), Error>,
    {
        self.validate()?;
        self.check_index(index)?;
        let old = mem::replace(&mut self.items[index], item);
        destructor(old)
    }

    /// Remove the element at `index`, shifting the tail left, and shrink the
    /// storage if occupancy fell to a quarter. The destructor runs last; its
    /// failure is returned but the removal stands.
    pub fn remove<D>(&mut self, index: usize, destructor: D) -> Result<(), Error>
    where
        D: FnOnce(T) -> Result<(), Error>,
    {
        self.validate()?;
        self.check_index(index)?;
        let item = self.items.remove(index);
        let resized = match self.shrunk_capacity() {
            Some(cap) => self.resize(cap),
            None => Ok(()),
        };
        destructor(item)?;
        resized
    }

    pub fn pop<D>(&mut self, destructor: D) -> Result<(), Error>
    where
        D: FnOnce(T) -> Result<(), Error>,
    {
        match self.len() {
            0 => Err(Error::OutOfBounds { index: 0, len: 0 }),
            n => self.remove(n - 1, destructor),
        }
    }

    /// Keep only the elements for which `keep` returns true, preserving order,
    /// then shrink as many times as the policy allows.
    pub fn retain<F>(&mut self, keep: F) -> Result<(), Error>
    where
        F: FnMut(&T) -> bool,
    {
        self.validate()?;
        self.items.retain(keep);
        while let Some(cap) = self.shrunk_capacity() {
            self.resize(cap)?;
        }
        Ok(())
    }

    /// Tear the array down, passing every element to `destructor`.
    ///
    /// A failing destructor does not stop the loop; the first failure is
    /// returned once every element has been visited.
    pub fn destruct<D>(self, mut destructor: D) -> Result<(), Error>
    where
        D: FnMut(T) -> Result<(), Error>,
    {
        self.validate()?;
        let mut first = None;
        for item in self.items {
            keep_first(&mut first, destructor(item));
        }
        first.map_or(Ok(()), Err)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Render as `(len: L, cap: C, size: S) [a, b, c]` using `print` for
    /// each element. An element that fails to print shows as `?`; the
    /// failure is returned after the whole array has been written.
    pub fn write_with<W, P>(&self, out: &mut W, mut print: P) -> fmt::Result
    where
        W: fmt::Write,
        P: FnMut(&mut W, &T) -> fmt::Result,
    {
        write!(
            out,
            "(len: {}, cap: {}, size: {}) [",
            self.len(),
            self.capacity,
            self.element_size()
        )?;
        let mut failed = Ok(());
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                out.write_str(", ")?;
            }
            if let Err(e) = print(out, item) {
                failed = Err(e);
                out.write_str("?")?;
            }
        }
        out.write_str("]")?;
        failed
    }

    fn grown_capacity(&self) -> Result<usize, Error> {
        self.capacity
            .checked_mul(2)
            .map(|cap| cap.max(MIN_CAPACITY))
            .ok_or(Error::AllocationFailure {
                count: usize::MAX,
                element_size: size_of::<T>(),
            })
    }

    fn shrunk_capacity(&self) -> Option<usize> {
        if self.capacity / 4 < self.len() {
            return None;
        }
        let cap = (self.capacity / 2).max(MIN_CAPACITY);
        (cap < self.capacity).then_some(cap)
    }

    fn resize(&mut self, capacity: usize) -> Result<(), Error> {
        alloc::try_resize(&mut self.items, capacity)?;
        self.capacity = capacity;
        Ok(())
    }
}

impl<T: fmt::Debug> fmt::Debug for DynArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_with(f, |out, item| write!(out, "{:?}", item))
    }
}
