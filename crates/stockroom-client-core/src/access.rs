use stockroom_shared::uac::Capability;

use crate::{PermissionEngine, SessionStore};

/// What a screen gated on a capability should do
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The role is not known yet, render nothing and decide later
    Pending,
    /// No session, send the user to login
    Unauthenticated,
    /// Logged in but the role does not allow it, send the user elsewhere
    Unauthorized,
    Granted,
}

#[tracing::instrument(ret, skip(session, engine))]
pub async fn check_access(
    session: &SessionStore,
    engine: &PermissionEngine,
    capability: Capability,
) -> AccessDecision {
    if !session.has_valid_session().await {
        return AccessDecision::Unauthenticated;
    }
    let snapshot = engine.snapshot();
    if snapshot.is_loading {
        AccessDecision::Pending
    } else if snapshot.capabilities.allows(capability) {
        AccessDecision::Granted
    } else {
        AccessDecision::Unauthorized
    }
}
