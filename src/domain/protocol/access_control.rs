//! Single-principal authorization

use tracing::warn;

use super::ProtocolConfig;
use crate::shared::errors::SwapError;
use crate::shared::types::Principal;

/// Fails with `NotAuthorized` unless `caller` is the current admin.
pub fn ensure_admin(config: &ProtocolConfig, caller: &Principal) -> Result<(), SwapError> {
    if caller != &config.admin {
        warn!(caller = %caller, "Rejected admin operation from non-admin caller");
        return Err(SwapError::NotAuthorized);
    }
    Ok(())
}
