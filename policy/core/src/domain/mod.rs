// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Policy Domain Layer
//!
//! Pure domain types and algorithms. No I/O dependencies.
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`set_ops`] | `merge`, `find_same`, `exclude_same` |
//! | [`group_name`] | `equals_ci`, `less_ci`, `GroupNameMatcher` |
//! | [`functional_group`] | `FunctionalGroupings`, `ConsentTier`, `FunctionalGroupPermission` |
//! | [`permissions`] | `Permissions`, `ConsentResolver` |
//! | [`app_policy`] | `ApplicationPolicyEntry`, `PolicyTableSnapshot` |
//! | [`group_diff`] | `diff_groups`, `GroupSetDiff` |
//! | [`delta`] | `AppPermissionsDelta` |
//! | [`repository`] | collaborator traits |

pub mod app_policy;
pub mod delta;
pub mod engine_config;
pub mod events;
pub mod functional_group;
pub mod group_diff;
pub mod group_name;
pub mod permissions;
pub mod policy;
pub mod repository;
pub mod set_ops;
