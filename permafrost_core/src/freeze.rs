// Copyright 2026 the Permafrost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The freeze propagation decision logic.
//!
//! This module holds the pure parts of the propagation engine: the per-scope
//! state machine states, the effective-flag combinator, and the update-skip
//! rule. The [`ScopeStore`](crate::scope::ScopeStore) applies these during
//! [`commit`](crate::scope::ScopeStore::commit); keeping them as free
//! functions makes the contract testable without a tree.
//!
//! # The skip rule
//!
//! A scope's reconciliation decision depends only on its previous and next
//! `(freeze, content)` pairs:
//!
//! - both frozen → skip unconditionally, even if the intended content
//!   changed upstream. An already-frozen subtree never reconciles.
//! - flag transition → never skip. A transition must always be observed, so
//!   unfreezing takes effect immediately without an extra external trigger.
//! - both active → skip iff the content identity is unchanged (ordinary
//!   reconciliation).
//!
//! Skipped updates are discarded, not queued: the content visible after
//! unfreezing is exactly the last content rendered before freezing.

use crate::scope::ContentRev;

/// Per-scope state machine state.
///
/// A scope starts [`Active`](Self::Active) and moves to
/// [`Frozen`](Self::Frozen) whenever its effective flag becomes true,
/// whether from its own request or an ancestor's. Both transitions are
/// reported through [`CommitChanges`](crate::scope::CommitChanges) so hosts
/// can update the interaction surface and call the native notifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FreezeState {
    /// Normal reconciliation; updates flow through the skip rule.
    #[default]
    Active,
    /// Updates are discarded and the interaction surface is disabled.
    Frozen,
}

impl FreezeState {
    /// Returns whether this state is [`Frozen`](Self::Frozen).
    #[inline]
    #[must_use]
    pub const fn is_frozen(self) -> bool {
        matches!(self, Self::Frozen)
    }

    /// The state corresponding to an effective flag value.
    #[inline]
    #[must_use]
    pub const fn from_effective(effective: bool) -> Self {
        if effective { Self::Frozen } else { Self::Active }
    }
}

/// Combines an ancestor's effective flag with a scope's own request.
///
/// Pure logical OR; there is no priority negotiation. A descendant cannot
/// un-freeze an ancestor-frozen region, so the effective flag is monotone
/// down the tree.
#[inline]
#[must_use]
pub const fn compute_effective(ancestor_frozen: bool, local_freeze: bool) -> bool {
    ancestor_frozen || local_freeze
}

/// The inputs to one skip decision: a scope's effective freeze flag and its
/// content identity, as of one commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeProps {
    /// Effective frozen flag for the cycle.
    pub freeze: bool,
    /// Identity of the subtree's intended content.
    pub content: ContentRev,
}

/// Decides whether a scope's update may be skipped, given its previous and
/// next [`ScopeProps`]. See the [module docs](self) for the rule.
#[must_use]
pub const fn should_skip_update(prev: ScopeProps, next: ScopeProps) -> bool {
    if prev.freeze && next.freeze {
        // Already frozen: skip even if the content changed upstream.
        return true;
    }
    if prev.freeze != next.freeze {
        // A flag transition must always be observed.
        return false;
    }
    // Both active: ordinary reconciliation on content identity.
    prev.content.0 == next.content.0
}
