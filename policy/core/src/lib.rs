// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Consent Policy Core
//!
//! Decides what an incoming policy update means for each connected
//! application and which RPC permissions need the user's consent.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | policy table model, set algebra, group diff, consent resolution |
//! | [`application`] | Application | per-application differ, batch update service |
//! | [`infrastructure`] | Infrastructure | event bus, in-memory stores, document loading |
//!
//! ## Concurrency
//!
//! Evaluation is synchronous. The snapshot is owned by the caller; the update
//! service holds its lock for a whole batch so readers only ever see complete
//! updates.

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
