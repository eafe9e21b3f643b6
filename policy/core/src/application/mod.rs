// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Application Layer
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`app_policy_differ`] | per-application evaluation of an update |
//! | [`policy_update_service`] | batch application under the snapshot lock |

pub mod app_policy_differ;
pub mod policy_update_service;

pub use app_policy_differ::{AppPolicyOutcome, ApplicationPolicyDiffer};
pub use policy_update_service::{PolicyUpdateService, UpdateReport};
