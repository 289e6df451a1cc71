//! Catalog use-case services.
//!
//! # Responsibility
//! - Validate caller input before any storage call.
//! - Orchestrate store calls into read-modify-write use cases.
//! - Fold store outcomes into one `ServiceError` the caller can render.
//!
//! # Invariants
//! - A title is never created or updated with an empty author set.
//! - Expected absence is reported as `NotFound`, not as a storage failure.

pub mod author_service;
pub mod catalog_service;
pub mod input;
pub mod title_service;

use crate::store::error::{EntityKey, StoreError};
use input::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    Validation(ValidationError),
    NotFound(EntityKey),
    /// Persistence or connectivity failure from the store.
    Store(StoreError),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(key) => write!(f, "{key} not found"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(key) => Self::NotFound(key),
            other => Self::Store(other),
        }
    }
}
