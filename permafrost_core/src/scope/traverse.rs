// Copyright 2026 the Permafrost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, ScopeId};
use super::store::ScopeStore;

/// An iterator over the direct children of a scope.
///
/// Created by [`ScopeStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a ScopeStore,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a ScopeStore, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = ScopeId;

    fn next(&mut self) -> Option<ScopeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(ScopeId {
            idx,
            generation: self.store.generation[idx as usize],
        })
    }
}
