//! Overflow-checked allocation helpers.
//!
//! Every buffer in the crate is sized through these functions so that
//! `count * size_of::<T>()` is validated before the allocator sees it.
//! A request for zero total bytes yields an empty buffer, not an error.

use crate::error::Error;
use core::mem::size_of;

/// Total byte length of `count` elements of `T`, or `AllocationFailure` if the
/// product overflows or exceeds what a single allocation may span.
pub(crate) fn byte_len<T>(count: usize) -> Result<usize, Error> {
    let element_size = size_of::<T>();
    count
        .checked_mul(element_size)
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .ok_or(Error::AllocationFailure {
            count,
            element_size,
        })
}

/// Empty vector with room for exactly `count` elements.
pub(crate) fn try_vec<T>(count: usize) -> Result<Vec<T>, Error> {
    byte_len::<T>(count)?;
    let mut v = Vec::new();
    v.try_reserve_exact(count).map_err(|_| Error::AllocationFailure {
        count,
        element_size: size_of::<T>(),
    })?;
    Ok(v)
}

/// Fixed-size buffer of `count` copies of `value`.
pub(crate) fn try_filled<T: Clone>(count: usize, value: T) -> Result<Box<[T]>, Error> {
    let mut v = try_vec(count)?;
    v.resize(count, value);
    Ok(v.into_boxed_slice())
}

/// Grow or shrink the backing storage of `v` to hold `count` elements.
///
/// On failure `v` is left untouched. Callers guarantee `count >= v.len()`.
pub(crate) fn try_resize<T>(v: &mut Vec<T>, count: usize) -> Result<(), Error> {
    debug_assert!(count >= v.len());
    byte_len::<T>(count)?;
    if count > v.capacity() {
        v.try_reserve_exact(count - v.len())
            .map_err(|_| Error::AllocationFailure {
                count,
                element_size: size_of::<T>(),
            })?;
    } else {
        v.shrink_to(count);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_len_detects_overflow() {
        assert_eq!(byte_len::<u64>(4).unwrap(), 32);
        assert_eq!(byte_len::<u64>(0).unwrap(), 0);
        match byte_len::<u64>(usize::MAX / 2) {
            Err(Error::AllocationFailure {
                count,
                element_size,
            }) => {
                assert_eq!(count, usize::MAX / 2);
                assert_eq!(element_size, 8);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn zero_bytes_is_an_empty_buffer() {
        let v: Vec<u32> = try_vec(0).unwrap();
        assert!(v.is_empty());
        let b = try_filled(0, 7u8).unwrap();
        assert!(b.is_empty());
    }

    #[test]
    fn resize_tracks_requested_count() {
        let mut v: Vec<u16> = try_vec(2).unwrap();
        v.extend([1, 2]);
        try_resize(&mut v, 16).unwrap();
        assert!(v.capacity() >= 16);
        try_resize(&mut v, 4).unwrap();
        assert!(v.capacity() >= 4);
        assert_eq!(v, [1, 2]);
    }

    #[test]
    fn oversized_resize_leaves_vec_untouched() {
        let mut v: Vec<u64> = vec![9];
        assert!(try_resize(&mut v, usize::MAX / 4).is_err());
        assert_eq!(v, [9]);
    }
}
