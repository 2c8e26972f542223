//! Authorization policy gating every repository operation.
//!
//! The policy is a pure function of the actor's role and the request method.
//! It never inspects resource content and has no side effects, which keeps it
//! trivially testable and safe to evaluate before touching the store.

use crate::domain::auth::Actor;
use crate::domain::error::Error;

/// Coarse classification of an operation for authorization purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMethod {
    /// Safe method: fetch or list, no state change.
    Read,
    /// Create, update, or delete.
    Write,
}

/// Decide whether `actor` may perform `method`.
///
/// - No actor: denied as unauthenticated (401-equivalent).
/// - Read methods: allowed for any authenticated actor regardless of role.
/// - Write methods: allowed only for editors (403-equivalent otherwise).
pub fn authorize(actor: Option<&Actor>, method: AccessMethod) -> Result<(), Error> {
    let Some(actor) = actor else {
        return Err(Error::unauthorized(
            "Authentication credentials were not provided.",
        ));
    };
    match method {
        AccessMethod::Read => Ok(()),
        AccessMethod::Write if actor.role.is_editor() => Ok(()),
        AccessMethod::Write => Err(Error::forbidden(
            "You do not have permission to perform this action.",
        )),
    }
}
