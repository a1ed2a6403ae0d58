//! Error taxonomy shared by the array and table layers.

use thiserror::Error;

/// Boxed cause carried by [`Error::Destructor`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required argument or capability was not supplied.
    #[error("missing required argument: {0}")]
    NullArgument(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("index {index} is out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },

    /// An internal invariant was found broken before the operation ran.
    #[error("malformed structure: {0}")]
    Malformed(&'static str),

    #[error("table capacity is zero")]
    DivideByZero,

    #[error("no room left in table of capacity {capacity}")]
    OutOfRoom { capacity: usize },

    #[error("cannot allocate {count} elements of {element_size} bytes")]
    AllocationFailure { count: usize, element_size: usize },

    /// Failure reported by a caller-supplied destructor.
    #[error("destructor failed: {0}")]
    Destructor(#[source] BoxError),
}

impl Error {
    /// Wrap an arbitrary cause as a destructor failure.
    pub fn destructor<E>(cause: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Destructor(cause.into())
    }
}

/// No-op destructor: takes ownership of `item` and drops it.
pub fn discard<T>(item: T) -> Result<(), Error> {
    drop(item);
    Ok(())
}

/// Keep the first error seen across a best-effort sequence of calls.
pub(crate) fn keep_first(first: &mut Option<Error>, result: Result<(), Error>) {
    if let Err(e) = result {
        if first.is_none() {
            *first = Some(e);
        }
    }
}
