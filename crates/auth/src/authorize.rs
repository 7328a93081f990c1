use thiserror::Error;

use salesdesk_core::SalespersonId;

use crate::Actor;

/// Outcome of an ownership check.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("actor {actor} does not own this resource")]
    NotOwner { actor: SalespersonId },
}

/// Decide whether `actor` owns a resource whose owning salesperson is `owner`.
///
/// - No IO
/// - No panics
/// - Fails closed: anything other than an exact identity match is `Denied`
pub fn check(actor: &Actor, owner: &SalespersonId) -> Decision {
    if actor.id() == *owner {
        Decision::Allowed
    } else {
        Decision::Denied
    }
}

/// [`check`] as a `Result`, for use with `?` at the service boundary.
pub fn authorize(actor: &Actor, owner: &SalespersonId) -> Result<(), AuthzError> {
    match check(actor, owner) {
        Decision::Allowed => Ok(()),
        Decision::Denied => {
            tracing::debug!(actor = %actor.id(), owner = %owner, "ownership check denied");
            Err(AuthzError::NotOwner { actor: actor.id() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_is_allowed() {
        let id = SalespersonId::new();
        let actor = Actor::new(id);
        assert_eq!(check(&actor, &id), Decision::Allowed);
        assert!(authorize(&actor, &id).is_ok());
    }

    #[test]
    fn other_salesperson_is_denied() {
        let actor = Actor::new(SalespersonId::new());
        let owner = SalespersonId::new();
        assert_eq!(check(&actor, &owner), Decision::Denied);
        assert_eq!(
            authorize(&actor, &owner),
            Err(AuthzError::NotOwner { actor: actor.id() })
        );
    }

    #[test]
    fn email_does_not_grant_ownership() {
        let owner = SalespersonId::new();
        let actor = Actor::new(SalespersonId::new()).with_email("owner@example.com");
        assert_eq!(check(&actor, &owner), Decision::Denied);
    }
}
