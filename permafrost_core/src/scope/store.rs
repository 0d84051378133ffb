// Copyright 2026 the Permafrost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays scope storage with allocation, topology, and property
//! management.

use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::dirty;
use crate::freeze::FreezeState;
use crate::host::UpdateGate;

use super::commit::ReleasedScope;
use super::id::{ContentRev, INVALID, ScopeId, ViewHandle};
use super::traverse::Children;

/// Struct-of-arrays storage for all freeze scopes.
///
/// Scopes are addressed by [`ScopeId`] handles. Internally, each scope
/// occupies a slot in parallel arrays. Destroyed scopes are recycled via a
/// free list, and generation counters prevent stale handle access.
///
/// The ancestor-flag propagation channel of the original design (an
/// implicit context provider) is modeled here as an explicit scope stack:
/// each slot holds its parent link, and mount/unmount registers or removes
/// the dirty-tracker dependency edge that carries invalidation down the
/// tree.
#[derive(Debug)]
pub struct ScopeStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) local_freeze: Vec<bool>,
    pub(crate) view: Vec<Option<ViewHandle>>,
    /// Identity of the last *rendered* content.
    pub(crate) content: Vec<ContentRev>,
    /// Pending content update; discarded (not queued) when skipped.
    pub(crate) incoming: Vec<Option<ContentRev>>,

    // -- Committed / computed state (written by commit) --
    pub(crate) state: Vec<FreezeState>,
    pub(crate) effective: Vec<bool>,
    pub(crate) render_count: Vec<u64>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
    pub(crate) pending_released: Vec<ReleasedScope>,
}

impl Default for ScopeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStore {
    /// Creates an empty scope store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            local_freeze: Vec::new(),
            view: Vec::new(),
            content: Vec::new(),
            incoming: Vec::new(),
            state: Vec::new(),
            effective: Vec::new(),
            render_count: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            pending_released: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a new scope and returns its handle.
    ///
    /// The scope starts `Active` with no freeze request, no view handle, the
    /// default content revision, and no parent.
    pub fn create_scope(&mut self) -> ScopeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            self.generation[idx as usize] += 1;
            self.parent[idx as usize] = INVALID;
            self.first_child[idx as usize] = INVALID;
            self.next_sibling[idx as usize] = INVALID;
            self.prev_sibling[idx as usize] = INVALID;
            self.local_freeze[idx as usize] = false;
            self.view[idx as usize] = None;
            self.content[idx as usize] = ContentRev::default();
            self.incoming[idx as usize] = None;
            self.state[idx as usize] = FreezeState::Active;
            self.effective[idx as usize] = false;
            self.render_count[idx as usize] = 0;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.local_freeze.push(false);
            self.view.push(None);
            self.content.push(ContentRev::default());
            self.incoming.push(None);
            self.state.push(FreezeState::Active);
            self.effective.push(false);
            self.render_count.push(0);
            self.generation.push(0);
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);

        ScopeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a scope, freeing its slot for reuse.
    ///
    /// A scope unmounted while `Frozen` must not leave a dangling native
    /// registration, so its view handle and frozen-ness are captured into
    /// the next commit's [`released`](super::CommitChanges::released) list
    /// for [`apply_transitions`](crate::host::apply_transitions) to thaw.
    ///
    /// # Panics
    ///
    /// Panics if the scope has children (remove them first) or if the
    /// handle is stale.
    pub fn destroy_scope(&mut self, id: ScopeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy scope with children"
        );

        // Remove from parent's child list if attached.
        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }

        self.pending_released.push(ReleasedScope {
            slot: idx,
            view: self.view[idx as usize],
            was_frozen: self.state[idx as usize].is_frozen(),
        });

        // Remove dirty tracking dependencies and any pending marks.
        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    /// Returns whether the given handle refers to a live scope.
    #[must_use]
    pub fn is_alive(&self, id: ScopeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// Marks the freeze channel for `child`'s subtree so effective flags are
    /// recomputed under the new ancestry; mounting under a frozen ancestor
    /// freezes the subtree at the next commit.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: ScopeId, child: ScopeId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );

        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        // Dirty dependency edge: child inherits the effective flag.
        let _ = self.dirty.add_dependency(c, p, dirty::FREEZE);

        self.mark_subtree_freeze_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `child` from its current parent.
    ///
    /// Marks the freeze channel for `child`'s subtree so effective flags are
    /// recomputed after detaching from the old ancestry.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the scope has no parent.
    pub fn remove_from_parent(&mut self, child: ScopeId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "scope has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);

        self.dirty.remove_dependency(c, p, dirty::FREEZE);

        self.mark_subtree_freeze_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Returns the parent of a scope, if any.
    #[must_use]
    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(ScopeId {
                idx: p,
                generation: self.generation[p as usize],
            })
        }
    }

    /// Returns an iterator over the direct children of a scope.
    #[must_use]
    pub fn children(&self, id: ScopeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the root scopes (those with no parent).
    #[must_use]
    pub fn roots(&self) -> Vec<ScopeId> {
        let mut roots = Vec::new();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                roots.push(ScopeId {
                    idx,
                    generation: self.generation[idx as usize],
                });
            }
        }
        roots
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the scope's own freeze request.
    #[must_use]
    pub fn freeze_request(&self, id: ScopeId) -> bool {
        self.validate(id);
        self.local_freeze[id.idx as usize]
    }

    /// Returns the scope's view handle.
    #[must_use]
    pub fn view(&self, id: ScopeId) -> Option<ViewHandle> {
        self.validate(id);
        self.view[id.idx as usize]
    }

    /// Returns the identity of the last content this scope rendered.
    ///
    /// While a scope is frozen this keeps reporting the pre-freeze content:
    /// skipped updates were discarded, not queued.
    #[must_use]
    pub fn content(&self, id: ScopeId) -> ContentRev {
        self.validate(id);
        self.content[id.idx as usize]
    }

    /// Returns the scope's committed state machine state.
    ///
    /// Only reflects flag changes after [`commit`](Self::commit) has run.
    #[must_use]
    pub fn state(&self, id: ScopeId) -> FreezeState {
        self.validate(id);
        self.state[id.idx as usize]
    }

    /// Returns whether the scope is effectively frozen (including by an
    /// ancestor's request).
    #[must_use]
    pub fn is_frozen(&self, id: ScopeId) -> bool {
        self.state(id).is_frozen()
    }

    /// Returns whether the scope's interaction surface is live.
    ///
    /// Frozen scopes are non-interactive; presenters express this as
    /// hit-test rejection.
    #[must_use]
    pub fn is_interactive(&self, id: ScopeId) -> bool {
        !self.is_frozen(id)
    }

    /// Returns how many times this scope has rendered since creation.
    #[must_use]
    pub fn render_count(&self, id: ScopeId) -> u64 {
        self.validate(id);
        self.render_count[id.idx as usize]
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the scope's own freeze request.
    ///
    /// Marks the FREEZE channel dirty with eager propagation to
    /// descendants; the flag takes effect at the next commit.
    pub fn set_freeze(&mut self, id: ScopeId, freeze: bool) {
        self.validate(id);
        self.local_freeze[id.idx as usize] = freeze;
        self.dirty.mark_with(id.idx, dirty::FREEZE, &EagerPolicy);
    }

    /// Publishes a new content identity for the scope.
    ///
    /// The update is held until the next commit's skip decision; a frozen
    /// scope discards it.
    pub fn set_content(&mut self, id: ScopeId, rev: ContentRev) {
        self.validate(id);
        self.incoming[id.idx as usize] = Some(rev);
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Associates a platform view with the scope, or detaches it.
    ///
    /// The handle is read at transition time by
    /// [`apply_transitions`](crate::host::apply_transitions); changing it
    /// does not by itself trigger a commit.
    pub fn set_view(&mut self, id: ScopeId, view: Option<ViewHandle>) {
        self.validate(id);
        self.view[id.idx as usize] = view;
    }

    // -- Raw-index accessors for notifier dispatch and presenters --
    //
    // These accept raw slot indices (as found in `CommitChanges`) rather
    // than `ScopeId` handles, skipping generation validation. Only use with
    // indices that came from `CommitChanges` or `traversal_order()`.

    /// Returns the view handle at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn view_at(&self, idx: u32) -> Option<ViewHandle> {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.view[idx as usize]
    }

    /// Returns whether the scope at raw slot `idx` is frozen.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn is_frozen_at(&self, idx: u32) -> bool {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.state[idx as usize].is_frozen()
    }

    /// Returns the rendered content identity at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn content_at(&self, idx: u32) -> ContentRev {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.content[idx as usize]
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: ScopeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale ScopeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Removes `idx` from its parent's child list without touching dirty
    /// state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Marks the subtree rooted at `idx` dirty on the freeze channel.
    fn mark_subtree_freeze_dirty(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::FREEZE, &EagerPolicy);
    }

    /// OR of the scope's local request with every ancestor's, as currently
    /// requested (before any pending commit).
    pub(crate) fn requested_effective(&self, idx: u32) -> bool {
        let mut cur = idx;
        while cur != INVALID {
            if self.local_freeze[cur as usize] {
                return true;
            }
            cur = self.parent[cur as usize];
        }
        false
    }
}

impl UpdateGate for ScopeStore {
    /// A host scheduler consults this before committing work for a
    /// subtree. Work is withheld exactly when the scope is committed
    /// frozen *and* still requested frozen — the unconditional-skip case.
    /// A pending transition in either direction always schedules, so
    /// freezing and unfreezing are observed without an external trigger.
    fn should_schedule_update(&self, id: ScopeId) -> bool {
        self.validate(id);
        let idx = id.idx;
        !(self.state[idx as usize].is_frozen() && self.requested_effective(idx))
    }
}
