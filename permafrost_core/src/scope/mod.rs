// Copyright 2026 the Permafrost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Freeze-scope tree data model.
//!
//! A *scope* is a node in the freeze tree, wrapping one subtree of the host
//! UI. Each scope has:
//!
//! - An identity ([`ScopeId`]) — a generational handle that becomes stale
//!   when the scope is destroyed, preventing use-after-free bugs at the API
//!   level.
//! - Topology — parent, first-child, and sibling links forming an ordered
//!   tree.
//! - **Local properties** set by the caller: the
//!   [`freeze` request](ScopeStore::set_freeze), the
//!   [content identity](ScopeStore::set_content), and an optional
//!   [platform view](ScopeStore::set_view).
//! - **Computed properties** produced by [`commit`](ScopeStore::commit):
//!   the effective frozen flag (OR over ancestors) and the committed
//!   [`FreezeState`](crate::freeze::FreezeState).
//!
//! Scopes are stored in struct-of-arrays layout with index-based handles
//! for cache-friendly traversal.
//!
//! # Dirty tracking
//!
//! Property mutations automatically mark the corresponding dirty channel
//! (see [`dirty`](crate::dirty)). The channels map to property categories:
//!
//! - **FREEZE** — propagates to all descendants, since the effective flag
//!   is inherited.
//! - **CONTENT** — local-only; only the modified scope is marked.
//! - **TOPOLOGY** — structural changes (add/remove child, create/destroy
//!   scope) that trigger a traversal-order rebuild.

mod commit;
mod id;
mod store;
mod traverse;

pub use commit::{CommitChanges, ReleasedScope};
pub use id::{ContentRev, INVALID, ScopeId, ViewHandle};
pub use store::ScopeStore;
pub use traverse::Children;
