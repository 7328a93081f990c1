//! Service-level error: the one failure type every order, client and product
//! operation returns.

use thiserror::Error;
use tracing::error;

use salesdesk_auth::AuthzError;
use salesdesk_core::{DomainError, Entity};
use salesdesk_inventory::Product;

use crate::ledger::LedgerError;
use crate::store::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("not authorized")]
    NotAuthorized,

    #[error("insufficient stock for '{product}': requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: u32,
        available: u32,
    },

    #[error("validation failed on '{field}': {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("{kind} '{key}' already exists")]
    AlreadyExists { kind: &'static str, key: String },

    /// A concurrent writer changed the document first.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Stored documents disagree with each other (e.g. order vs client owner).
    #[error("data integrity violation: {0}")]
    IntegrityViolation(String),

    /// Backend failure. Details are logged where the failure is observed.
    #[error("storage unavailable")]
    StorageUnavailable,
}

impl ServiceError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation { field, reason } => ServiceError::Validation { field, reason },
            DomainError::InsufficientStock {
                product,
                requested,
                available,
            } => ServiceError::InsufficientStock {
                product,
                requested,
                available,
            },
            DomainError::InvariantViolation(msg) => ServiceError::IntegrityViolation(msg),
            DomainError::InvalidId(msg) => ServiceError::Validation {
                field: "id",
                reason: msg,
            },
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(_: AuthzError) -> Self {
        ServiceError::NotAuthorized
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { collection, id } => ServiceError::NotFound { kind: collection, id },
            StoreError::Duplicate { collection, id } => ServiceError::AlreadyExists {
                kind: collection,
                key: id,
            },
            StoreError::Concurrency { collection, id, .. } => {
                ServiceError::Conflict(format!("{collection}/{id} was modified concurrently"))
            }
            StoreError::Unavailable(detail) => {
                error!(detail = %detail, "entity store unavailable");
                ServiceError::StorageUnavailable
            }
        }
    }
}

impl From<LedgerError> for ServiceError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::ProductNotFound(id) => ServiceError::not_found(Product::COLLECTION, id),
            LedgerError::InsufficientStock {
                product,
                requested,
                available,
            } => ServiceError::InsufficientStock {
                product,
                requested,
                available,
            },
            LedgerError::Contention(id) => {
                ServiceError::Conflict(format!("stock of product {id} is busy, retry"))
            }
            LedgerError::Invalid(err) => err.into(),
            LedgerError::Store(err) => err.into(),
        }
    }
}
