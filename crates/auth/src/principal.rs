use salesdesk_core::SalespersonId;

use crate::JwtClaims;

/// The authenticated salesperson attached to every call.
///
/// Produced by the authentication collaborator (see [`crate::JwtValidator`]);
/// never persisted by the order core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    id: SalespersonId,
    email: Option<String>,
}

impl Actor {
    pub fn new(id: SalespersonId) -> Self {
        Self { id, email: None }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn id(&self) -> SalespersonId {
        self.id
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

impl From<&JwtClaims> for Actor {
    fn from(claims: &JwtClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email.clone(),
        }
    }
}
