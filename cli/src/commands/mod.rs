// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for policyctl

pub mod config;
pub mod diff;

pub use self::config::ConfigCommand;
pub use self::diff::DiffArgs;
