//! `commissionhub-core`: shared domain primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{DealId, InvoiceId, PartnerId, SubjectId, ToastId};
