// Copyright 2026 the Permafrost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for platform integrations.
//!
//! Permafrost owns the data model, propagation, and skip decisions. Host
//! crates depend on `permafrost_core` and provide platform glue:
//!
//! - **Commit driver** — Calls [`ScopeStore::commit`] at the platform's
//!   update cadence (a display-link callback, a reconciliation pass) and
//!   consumes the returned [`CommitChanges`].
//!
//! - **Notifier** — Implements the [`FreezeNotifier`] trait to push
//!   per-view frozen flags into the platform view system, so the renderer
//!   can drop frozen subtrees from its work entirely rather than merely
//!   painting them unchanged.
//!
//! - **Scheduler gate** — Consults [`UpdateGate`] before enqueueing work
//!   for a subtree, so updates destined to be skipped are never scheduled
//!   in the first place.
//!
//! # Update loop pseudocode
//!
//! A typical host update pass wires the pieces together like this:
//!
//! ```rust,ignore
//! fn on_update_pass() {
//!     // Mutate: apply host-side state to the scope tree
//!     store.set_freeze(chat_panel, !panel_visible);
//!     if store.should_schedule_update(detail_pane) {
//!         store.set_content(detail_pane, next_revision());
//!     }
//!
//!     // Commit: drain dirty channels, run skip decisions
//!     let changes = store.commit();
//!
//!     // Notify: push frozen-flag transitions to the platform views
//!     apply_transitions(&store, &changes, &mut notifier);
//!
//!     // Present: hosts consume `changes.rendered` to reconcile content
//!     for &idx in &changes.rendered {
//!         reconcile(idx, store.content_at(idx));
//!     }
//! }
//! ```
//!
//! [`ScopeStore::commit`]: crate::scope::ScopeStore::commit

use crate::scope::{CommitChanges, ScopeId, ScopeStore, ViewHandle};

/// Error from a [`FreezeNotifier`] call.
///
/// Notifier failures never affect the scope tree itself: the committed
/// state machine has already advanced, and [`apply_transitions`] logs the
/// failure and moves on to the remaining transitions.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NotifyError {
    /// The platform module is not present (e.g. the native library was not
    /// linked into this build).
    #[error("native freeze module unavailable")]
    Unavailable,
    /// The platform rejected the call.
    #[error("native freeze call failed: {0}")]
    Backend(&'static str),
}

/// Pushes per-view frozen flags into the platform view system.
///
/// Freezing at the flag level stops *updates*; the notifier is the deeper
/// integration that lets the platform renderer skip the frozen subtree's
/// draw work as well. Implementations must be level-triggered: calling with
/// the same flag twice is harmless.
pub trait FreezeNotifier {
    /// Marks the given platform view frozen or thawed.
    fn set_view_frozen(&mut self, view: ViewHandle, frozen: bool) -> Result<(), NotifyError>;

    /// Returns whether the platform module is present.
    ///
    /// Hosts may probe this once and skip notifier dispatch entirely when
    /// it reports `false`; [`apply_transitions`] does so automatically.
    fn is_available(&self) -> bool {
        true
    }
}

/// A [`FreezeNotifier`] for hosts without a platform module.
///
/// Reports unavailable and discards any call that reaches it anyway. This
/// is the graceful-degradation default: the flag-level behavior (skipped
/// updates, disabled interaction) works fully without any platform module.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl FreezeNotifier for NoopNotifier {
    fn set_view_frozen(&mut self, _view: ViewHandle, _frozen: bool) -> Result<(), NotifyError> {
        Ok(())
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Consults the scope tree before scheduling update work.
///
/// Work for a frozen scope whose request still stands would be discarded at
/// commit time anyway; gating it out earlier saves the host the queueing
/// cost. Implemented by [`ScopeStore`].
pub trait UpdateGate {
    /// Returns whether an update for this scope is worth scheduling.
    #[must_use]
    fn should_schedule_update(&self, id: ScopeId) -> bool;
}

/// Dispatches one commit's freeze transitions to a notifier.
///
/// For each scope in [`frozen`](CommitChanges::frozen) and
/// [`unfrozen`](CommitChanges::unfrozen) that has a platform view attached,
/// calls [`FreezeNotifier::set_view_frozen`] with the new flag. Scopes
/// destroyed while frozen ([`released`](CommitChanges::released)) are
/// thawed so the platform is not left holding a stale registration.
///
/// Notifier errors are logged at `warn` and do not stop dispatch: a flaky
/// platform bridge degrades to flag-level freezing, it never corrupts the
/// scope tree.
pub fn apply_transitions(
    store: &ScopeStore,
    changes: &CommitChanges,
    notifier: &mut dyn FreezeNotifier,
) {
    if !notifier.is_available() {
        return;
    }

    for &idx in &changes.frozen {
        if let Some(view) = store.view_at(idx)
            && let Err(err) = notifier.set_view_frozen(view, true)
        {
            log::warn!("freeze notify failed for {view:?}: {err}");
        }
    }
    for &idx in &changes.unfrozen {
        if let Some(view) = store.view_at(idx)
            && let Err(err) = notifier.set_view_frozen(view, false)
        {
            log::warn!("thaw notify failed for {view:?}: {err}");
        }
    }
    for released in &changes.released {
        if released.was_frozen
            && let Some(view) = released.view
            && let Err(err) = notifier.set_view_frozen(view, false)
        {
            log::warn!("release thaw failed for {view:?}: {err}");
        }
    }
}
