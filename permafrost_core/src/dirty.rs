// Copyright 2026 the Permafrost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Permafrost uses multi-channel dirty tracking (via [`understory_dirty`])
//! to propagate invalidation through the scope tree. Each channel is an
//! independent category of change.
//!
//! # Propagation semantics
//!
//! - **Propagating** — [`FREEZE`] uses
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and has dependency edges
//!   from child to parent. Marking a scope's freeze request dirty
//!   automatically marks its whole subtree, because the effective frozen
//!   flag is inherited: it is the OR of the local request with every
//!   ancestor's effective flag.
//!
//! - **Local-only** — [`CONTENT`] is marked with the default policy. A
//!   content-identity update targets exactly one scope; whether descendants
//!   reconcile is decided by the skip rule, not by dirt propagation.
//!
//! - **Structural** — [`TOPOLOGY`] is marked on topology mutations
//!   (add/remove child, create/destroy scope). It triggers a
//!   traversal-order rebuild during the next commit.
//!
//! # Consumption
//!
//! Callers never query dirty state directly. Each
//! [`ScopeStore::commit`](crate::scope::ScopeStore::commit) drains all
//! channels and surfaces the results as
//! [`CommitChanges`](crate::scope::CommitChanges), which hosts consume to
//! drive rendering and [notifier dispatch](crate::host::apply_transitions).

use understory_dirty::Channel;

/// Freeze request changed — requires effective-flag recomputation and a
/// skip decision for the scope and all its descendants.
pub const FREEZE: Channel = Channel::new(0);

/// Content identity changed — requires a skip decision for that scope only.
pub const CONTENT: Channel = Channel::new(1);

/// Tree topology changed — triggers traversal order rebuild.
pub const TOPOLOGY: Channel = Channel::new(2);
