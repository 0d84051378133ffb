// Copyright 2026 the Permafrost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Commit evaluation and change tracking.
//!
//! A commit follows a drain-recompute pattern for each dirty channel:
//!
//! 1. **FREEZE** — Drain dirty indices in parent-before-child order and
//!    recompute each scope's effective flag as
//!    `parent_effective || local_freeze`.
//! 2. **CONTENT** — Drain dirty indices; together with the freeze-dirty
//!    set these form the scopes with a pending skip decision.
//! 3. **Skip decisions** — For every such scope, compare the previous
//!    `(frozen, content)` pair against the next one through
//!    [`should_skip_update`]. Renders consume the pending content revision
//!    and bump the render counter; skips discard it. Flag transitions
//!    update the per-scope state machine and land in
//!    [`frozen`](CommitChanges::frozen) / [`unfrozen`](CommitChanges::unfrozen).
//! 4. **TOPOLOGY** — Drain and discard (the traversal order was already
//!    rebuilt at the start of the commit if needed).
//!
//! [`CommitChanges`] uses raw slot indices (`u32`) rather than [`ScopeId`]
//! handles so that hosts can index directly into the store's SoA arrays via
//! the `*_at()` accessors (e.g.
//! [`view_at`](super::ScopeStore::view_at)) without paying for generation
//! checks on every access.
//!
//! [`ScopeId`]: super::ScopeId

use alloc::vec::Vec;

use super::id::{INVALID, ViewHandle};
use super::store::ScopeStore;
use crate::dirty;
use crate::freeze::{FreezeState, ScopeProps, compute_effective, should_skip_update};

/// The set of changes produced by a single [`ScopeStore::commit`] call.
///
/// Each field contains the raw slot indices of scopes that changed in the
/// corresponding category. Hosts use these to apply incremental updates and
/// to drive [notifier dispatch](crate::host::apply_transitions).
#[derive(Clone, Debug, Default)]
pub struct CommitChanges {
    /// Scopes that rendered (their update passed the skip rule).
    pub rendered: Vec<u32>,
    /// Scopes whose pending content update was discarded by the skip rule.
    pub skipped: Vec<u32>,
    /// Scopes that transitioned `Active` → `Frozen`.
    pub frozen: Vec<u32>,
    /// Scopes that transitioned `Frozen` → `Active`.
    pub unfrozen: Vec<u32>,
    /// Scopes added since the last commit.
    pub added: Vec<u32>,
    /// Scopes removed since the last commit.
    pub removed: Vec<u32>,
    /// Scopes destroyed since the last commit, with the state the notifier
    /// needs to release native registrations.
    pub released: Vec<ReleasedScope>,
    /// Whether the tree topology changed (traversal order was rebuilt).
    pub topology_changed: bool,
}

impl CommitChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.rendered.clear();
        self.skipped.clear();
        self.frozen.clear();
        self.unfrozen.clear();
        self.added.clear();
        self.removed.clear();
        self.released.clear();
        self.topology_changed = false;
    }
}

/// State captured from a scope at destruction time.
///
/// The slot may already be reused by the time the commit is observed, so
/// everything the notifier needs is copied out eagerly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReleasedScope {
    /// The raw slot index the scope occupied.
    pub slot: u32,
    /// The platform view attached at destruction time, if any.
    pub view: Option<ViewHandle>,
    /// Whether the scope was frozen when destroyed. A frozen view must be
    /// thawed so the native side is not left holding a stale registration.
    pub was_frozen: bool,
}

impl ScopeStore {
    /// Commits all pending changes, recomputing effective freeze flags,
    /// running skip decisions, and returning the set of changes.
    ///
    /// This rebuilds the traversal order if topology changed, then drains
    /// each dirty channel in parent-before-child order so that a scope's
    /// effective flag is always derived from its parent's already-updated
    /// flag.
    pub fn commit(&mut self) -> CommitChanges {
        let mut changes = CommitChanges::default();
        self.commit_into(&mut changes);
        changes
    }

    /// Like [`commit`](Self::commit), but reuses a caller-provided buffer
    /// to avoid allocation.
    pub fn commit_into(&mut self, changes: &mut CommitChanges) {
        changes.clear();

        // Rebuild traversal order if needed.
        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        // Drain FREEZE channel — collect dirty indices, then recompute
        // effective flags parent-before-child.
        let dirty_freeze: Vec<u32> = self
            .dirty
            .drain(dirty::FREEZE)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_freeze {
            let parent_idx = self.parent[idx as usize];
            let parent_frozen = if parent_idx != INVALID {
                self.effective[parent_idx as usize]
            } else {
                false
            };
            self.effective[idx as usize] =
                compute_effective(parent_frozen, self.local_freeze[idx as usize]);
        }

        // Drain CONTENT channel.
        let dirty_content: Vec<u32> = self
            .dirty
            .drain(dirty::CONTENT)
            .deterministic()
            .run()
            .collect();

        // Skip decisions for every scope with a pending flag or content
        // change.
        for &idx in &dirty_freeze {
            self.decide(idx, changes);
        }
        for &idx in &dirty_content {
            if !dirty_freeze.contains(&idx) {
                self.decide(idx, changes);
            }
        }

        // Drain TOPOLOGY channel (just consume, changes are structural).
        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        // Move lifecycle lists.
        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
        core::mem::swap(&mut self.pending_released, &mut changes.released);
    }

    /// Runs the skip rule for one scope and records the outcome.
    fn decide(&mut self, idx: u32, changes: &mut CommitChanges) {
        let prev = ScopeProps {
            freeze: self.state[idx as usize].is_frozen(),
            content: self.content[idx as usize],
        };
        let next = ScopeProps {
            freeze: self.effective[idx as usize],
            content: self.incoming[idx as usize].unwrap_or(prev.content),
        };

        if should_skip_update(prev, next) {
            // Discarded, not queued: unfreezing later shows the pre-freeze
            // content until a fresh revision arrives.
            if self.incoming[idx as usize].take().is_some() {
                changes.skipped.push(idx);
                log::trace!("scope slot {idx}: content update skipped");
            }
        } else {
            if let Some(rev) = self.incoming[idx as usize].take() {
                self.content[idx as usize] = rev;
            }
            self.render_count[idx as usize] += 1;
            changes.rendered.push(idx);
        }

        if prev.freeze != next.freeze {
            self.state[idx as usize] = FreezeState::from_effective(next.freeze);
            if next.freeze {
                changes.frozen.push(idx);
            } else {
                changes.unfrozen.push(idx);
            }
        }
    }

    /// Returns the current traversal order (depth-first pre-order).
    ///
    /// Only valid after [`commit`](Self::commit) has been called at least
    /// once (or if the traversal has been manually rebuilt).
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    /// Rebuilds the depth-first pre-order traversal of all live scopes.
    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        // Start from roots.
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                self.dfs_collect(idx);
            }
        }
    }

    /// Depth-first pre-order collection starting from `idx`.
    fn dfs_collect(&mut self, idx: u32) {
        self.traversal_order.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.dfs_collect(child);
            child = self.next_sibling[child as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ContentRev;

    #[test]
    fn freeze_takes_effect_at_commit() {
        let mut store = ScopeStore::new();
        let id = store.create_scope();
        let _ = store.commit();

        store.set_freeze(id, true);
        // Nothing changes before the commit.
        assert!(!store.is_frozen(id));

        let changes = store.commit();
        assert!(store.is_frozen(id));
        assert!(changes.frozen.contains(&id.idx));
        assert!(changes.unfrozen.is_empty());
    }

    #[test]
    fn freeze_propagates_to_descendants() {
        let mut store = ScopeStore::new();
        let parent = store.create_scope();
        let child = store.create_scope();
        let grandchild = store.create_scope();
        store.add_child(parent, child);
        store.add_child(child, grandchild);
        let _ = store.commit();

        store.set_freeze(parent, true);
        let changes = store.commit();

        assert!(store.is_frozen(parent));
        assert!(store.is_frozen(child));
        assert!(store.is_frozen(grandchild));
        assert!(changes.frozen.contains(&parent.idx));
        assert!(changes.frozen.contains(&child.idx));
        assert!(changes.frozen.contains(&grandchild.idx));
    }

    #[test]
    fn freeze_propagates_when_child_slot_precedes_parent() {
        let mut store = ScopeStore::new();
        // The child occupies a lower slot than its parent, so numeric
        // index order disagrees with tree order. The drain must still
        // visit the parent first or the child reads a stale effective
        // flag and lags a commit.
        let child = store.create_scope();
        let parent = store.create_scope();
        assert!(child.idx < parent.idx, "slot order must invert tree order");
        store.add_child(parent, child);
        let _ = store.commit();

        store.set_freeze(parent, true);
        let changes = store.commit();

        assert!(store.is_frozen(parent));
        assert!(store.is_frozen(child), "one commit settles the subtree");
        assert!(changes.frozen.contains(&child.idx));
    }

    #[test]
    fn freeze_propagates_down_anti_topological_slot_order() {
        let mut store = ScopeStore::new();
        // Slot order is the exact reverse of tree depth: leaf 0, mid 1,
        // root 2.
        let leaf = store.create_scope();
        let mid = store.create_scope();
        let root = store.create_scope();
        store.add_child(root, mid);
        store.add_child(mid, leaf);
        let _ = store.commit();

        store.set_freeze(root, true);
        let changes = store.commit();
        assert!(store.is_frozen(mid));
        assert!(store.is_frozen(leaf));
        assert!(changes.frozen.contains(&mid.idx));
        assert!(changes.frozen.contains(&leaf.idx));

        // Thawing must also settle in a single commit.
        store.set_freeze(root, false);
        let changes = store.commit();
        assert!(!store.is_frozen(mid));
        assert!(!store.is_frozen(leaf));
        assert!(changes.unfrozen.contains(&leaf.idx));
    }

    #[test]
    fn descendant_cannot_unfreeze_ancestor_frozen_region() {
        let mut store = ScopeStore::new();
        let parent = store.create_scope();
        let child = store.create_scope();
        store.add_child(parent, child);

        store.set_freeze(parent, true);
        store.set_freeze(child, false);
        let _ = store.commit();

        // The effective flag is monotone down the tree.
        assert!(store.is_frozen(child));
    }

    #[test]
    fn frozen_scope_skips_content_updates() {
        let mut store = ScopeStore::new();
        let id = store.create_scope();
        store.set_content(id, ContentRev(1));
        let _ = store.commit();
        assert_eq!(store.render_count(id), 1);

        store.set_freeze(id, true);
        let _ = store.commit();
        let renders_when_frozen = store.render_count(id);

        // Repeated content updates while frozen never render.
        for rev in 2..6 {
            store.set_content(id, ContentRev(rev));
            let changes = store.commit();
            assert!(changes.skipped.contains(&id.idx));
            assert!(!changes.rendered.contains(&id.idx));
        }
        assert_eq!(store.render_count(id), renders_when_frozen);
        // The rendered content is still the pre-freeze revision.
        assert_eq!(store.content(id), ContentRev(1));
    }

    #[test]
    fn skipped_updates_are_discarded_not_queued() {
        let mut store = ScopeStore::new();
        let id = store.create_scope();
        store.set_content(id, ContentRev(1));
        let _ = store.commit();

        store.set_freeze(id, true);
        let _ = store.commit();
        store.set_content(id, ContentRev(2));
        let _ = store.commit();

        // Unfreeze with no new revision: the pre-freeze content stands.
        store.set_freeze(id, false);
        let changes = store.commit();
        assert!(changes.unfrozen.contains(&id.idx));
        assert_eq!(store.content(id), ContentRev(1));
    }

    #[test]
    fn unfreeze_takes_effect_without_external_trigger() {
        let mut store = ScopeStore::new();
        let id = store.create_scope();
        store.set_freeze(id, true);
        let _ = store.commit();
        assert!(store.is_frozen(id));

        // No content change alongside, only the flag flip.
        store.set_freeze(id, false);
        let changes = store.commit();

        assert!(!store.is_frozen(id));
        assert!(changes.unfrozen.contains(&id.idx));
        // The transition itself is observed as a render.
        assert!(changes.rendered.contains(&id.idx));
    }

    #[test]
    fn active_scope_skips_unchanged_content() {
        let mut store = ScopeStore::new();
        let id = store.create_scope();
        store.set_content(id, ContentRev(1));
        let _ = store.commit();
        assert_eq!(store.render_count(id), 1);

        // Same revision again: ordinary reconciliation skips it.
        store.set_content(id, ContentRev(1));
        let changes = store.commit();
        assert!(changes.skipped.contains(&id.idx));
        assert_eq!(store.render_count(id), 1);
    }

    #[test]
    fn leaf_under_frozen_inner_scope_never_renders() {
        let mut store = ScopeStore::new();
        let outer = store.create_scope();
        let inner = store.create_scope();
        let leaf = store.create_scope();
        store.add_child(outer, inner);
        store.add_child(inner, leaf);

        store.set_content(leaf, ContentRev(1));
        let _ = store.commit();
        let renders_before = store.render_count(leaf);

        // Only the inner scope requests freezing; the outer stays active.
        store.set_freeze(inner, true);
        let _ = store.commit();
        assert!(!store.is_frozen(outer));
        assert!(store.is_frozen(leaf));

        for rev in 2..8 {
            store.set_content(leaf, ContentRev(rev));
            let _ = store.commit();
        }
        // The transition itself rendered once; content changes since did
        // not.
        assert_eq!(store.render_count(leaf), renders_before + 1);
    }

    #[test]
    fn sibling_of_frozen_scope_still_renders() {
        let mut store = ScopeStore::new();
        let root = store.create_scope();
        let frozen = store.create_scope();
        let live = store.create_scope();
        store.add_child(root, frozen);
        store.add_child(root, live);

        store.set_freeze(frozen, true);
        let _ = store.commit();

        store.set_content(frozen, ContentRev(5));
        store.set_content(live, ContentRev(5));
        let changes = store.commit();

        assert!(changes.skipped.contains(&frozen.idx));
        assert!(changes.rendered.contains(&live.idx));
    }

    #[test]
    fn mount_under_frozen_ancestor_freezes_at_commit() {
        let mut store = ScopeStore::new();
        let parent = store.create_scope();
        store.set_freeze(parent, true);
        let _ = store.commit();

        let child = store.create_scope();
        assert_eq!(store.state(child), FreezeState::Active);

        store.add_child(parent, child);
        let changes = store.commit();

        assert!(store.is_frozen(child));
        assert!(changes.frozen.contains(&child.idx));
    }

    #[test]
    fn detach_from_frozen_parent_unfreezes() {
        let mut store = ScopeStore::new();
        let parent = store.create_scope();
        let child = store.create_scope();
        store.add_child(parent, child);
        store.set_freeze(parent, true);
        let _ = store.commit();
        assert!(store.is_frozen(child));

        store.remove_from_parent(child);
        let changes = store.commit();

        assert!(!store.is_frozen(child));
        assert!(changes.unfrozen.contains(&child.idx));
        // The parent keeps its own request.
        assert!(store.is_frozen(parent));
    }

    #[test]
    fn no_change_commit_returns_empty() {
        let mut store = ScopeStore::new();
        let _root = store.create_scope();

        // First commit processes initial creation.
        let _ = store.commit();

        // Second commit should have no changes.
        let changes = store.commit();
        assert!(changes.rendered.is_empty());
        assert!(changes.skipped.is_empty());
        assert!(changes.frozen.is_empty());
        assert!(changes.unfrozen.is_empty());
        assert!(changes.added.is_empty());
        assert!(changes.removed.is_empty());
        assert!(changes.released.is_empty());
        assert!(!changes.topology_changed);
    }

    #[test]
    fn commit_added_and_removed_lifecycle() {
        let mut store = ScopeStore::new();
        let id = store.create_scope();

        // First commit: scope should appear in `added`.
        let changes = store.commit();
        assert!(changes.added.contains(&id.idx));
        assert!(changes.removed.is_empty());

        // Second commit: no lifecycle events.
        let changes = store.commit();
        assert!(changes.added.is_empty());
        assert!(changes.removed.is_empty());

        // Destroy: should appear in `removed` on next commit.
        store.destroy_scope(id);
        let changes = store.commit();
        assert!(changes.removed.contains(&id.idx));
        assert!(changes.added.is_empty());
    }

    #[test]
    fn destroy_while_frozen_reports_release() {
        let mut store = ScopeStore::new();
        let id = store.create_scope();
        store.set_view(id, Some(ViewHandle(42)));
        store.set_freeze(id, true);
        let _ = store.commit();
        assert!(store.is_frozen(id));

        store.destroy_scope(id);
        let changes = store.commit();

        assert_eq!(
            changes.released,
            alloc::vec![ReleasedScope {
                slot: id.idx,
                view: Some(ViewHandle(42)),
                was_frozen: true,
            }]
        );
    }

    #[test]
    fn traversal_order_is_depth_first() {
        let mut store = ScopeStore::new();
        let a = store.create_scope();
        let b = store.create_scope();
        let c = store.create_scope();
        let d = store.create_scope();

        // Tree: a -> [b -> [d], c]
        store.add_child(a, b);
        store.add_child(a, c);
        store.add_child(b, d);

        let _ = store.commit();

        let order = store.traversal_order();
        assert_eq!(order, &[a.idx, b.idx, d.idx, c.idx]);
    }

    #[test]
    fn freeze_flip_within_one_commit_is_coalesced() {
        let mut store = ScopeStore::new();
        let id = store.create_scope();
        let _ = store.commit();

        // Freeze then unfreeze before the commit: no net transition.
        store.set_freeze(id, true);
        store.set_freeze(id, false);
        let changes = store.commit();

        assert!(changes.frozen.is_empty());
        assert!(changes.unfrozen.is_empty());
        assert!(!store.is_frozen(id));
    }

    #[test]
    fn commit_into_reuses_buffer() {
        let mut store = ScopeStore::new();
        let a = store.create_scope();
        let b = store.create_scope();

        let mut changes = CommitChanges::default();

        // First commit: both scopes added.
        store.commit_into(&mut changes);
        assert_eq!(changes.added.len(), 2);

        // Mutate one scope.
        store.set_content(a, ContentRev(1));
        store.commit_into(&mut changes);

        // Buffer should be cleared and refilled (not accumulating).
        assert!(changes.added.is_empty(), "added should be cleared");
        assert!(
            changes.rendered.contains(&a.idx),
            "render should be present"
        );
        assert!(
            !changes.rendered.contains(&b.idx),
            "unchanged scope should not appear"
        );
    }
}
