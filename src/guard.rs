//! Debug-only guard against reentering a table from its own callbacks.
//!
//! The table runs user hash and equality code while a probe is in flight.
//! A callback that reaches back into the same table at that point would see
//! it mid-operation, so debug builds panic on nested entry. In release
//! builds the guard is a zero-sized no-op.
//!
//! The guard is `!Sync` in every build profile, which keeps the table
//! `!Sync` while leaving it `Send`. Cross-thread use goes through a
//! caller-held lock.

/// Per-table tracker. Guard probing sections with
/// `let _g = self.guard.enter();`.
#[derive(Debug, Default)]
pub(crate) struct CallbackGuard {
    #[cfg(debug_assertions)]
    active: core::cell::Cell<bool>,
    _unsync: core::marker::PhantomData<core::cell::Cell<()>>,
}

impl CallbackGuard {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: core::cell::Cell::new(false),
            _unsync: core::marker::PhantomData,
        }
    }

    /// Enter a guarded section. Panics in debug builds if one is already open.
    #[inline]
    pub(crate) fn enter(&self) -> Entered<'_> {
        #[cfg(debug_assertions)]
        {
            let nested = self.active.replace(true);
            assert!(!nested, "reentrant call into table from a hash or equality callback");
            Entered { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            Entered {
                _owner: core::marker::PhantomData,
            }
        }
    }
}

/// RAII token returned by [`CallbackGuard::enter`]; closes the section on drop.
pub(crate) struct Entered<'a> {
    #[cfg(debug_assertions)]
    owner: &'a CallbackGuard,
    #[cfg(not(debug_assertions))]
    _owner: core::marker::PhantomData<&'a CallbackGuard>,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.active.set(false);
    }
}
