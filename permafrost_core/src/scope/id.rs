// Copyright 2026 the Permafrost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scope, view, and content identity types.

use core::fmt;

/// Sentinel value indicating "no scope" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a scope in a [`ScopeStore`](super::ScopeStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a scope is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId {
    /// Slot index into the store's arrays.
    pub(crate) idx: u32,
    /// Generation counter — must match the store's generation for this slot.
    pub(crate) generation: u32,
}

impl ScopeId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({}@gen{})", self.idx, self.generation)
    }
}

/// An opaque reference to a platform view.
///
/// View handles are assigned externally (e.g. a native view tag). A scope
/// with `Some(ViewHandle)` has a platform view the
/// [notifier](crate::host::FreezeNotifier) can freeze and thaw; `None`
/// means the scope is purely logical and relies on the presentational
/// expression of the flag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewHandle(pub u32);

impl fmt::Debug for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewHandle({})", self.0)
    }
}

/// Identity token for a subtree's intended content.
///
/// Two revisions comparing equal means the content is referentially
/// unchanged; the ordinary reconciliation path skips such updates. Hosts
/// mint a new revision whenever the intended content of a scope changes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ContentRev(pub u64);

impl fmt::Debug for ContentRev {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentRev({})", self.0)
    }
}
