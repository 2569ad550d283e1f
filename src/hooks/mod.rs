// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Hook bus for cross-cutting notifications
//!
//! Every subsystem funnels lifecycle events through a [`HookRegistry`]:
//! the request layer fires its lifecycle hooks, the form pipeline fires
//! submission hooks, and application code subscribes by name.

pub mod names;

mod registry;
mod scope;

pub use registry::{HookCallback, HookRegistry, DEFAULT_PRIORITY};
pub use scope::{ScopeGuard, ScopeRegistry};
