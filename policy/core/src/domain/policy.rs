// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use thiserror::Error;

/// Failures that abort the evaluation of one application.
///
/// Business outcomes (revoked, unauthorized, changed groups) are never errors;
/// they are recorded in [`crate::domain::delta::AppPermissionsDelta`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyUpdateError {
    #[error("Failed to reset device consents while updating '{app_id}'")]
    DeviceConsentResetFailed { app_id: String },
}

impl PolicyUpdateError {
    pub fn app_id(&self) -> &str {
        match self {
            PolicyUpdateError::DeviceConsentResetFailed { app_id } => app_id,
        }
    }
}
