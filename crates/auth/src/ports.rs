//! Seams to the external collaborators of the sign-in flow.
//!
//! The gateway composes these traits and never assumes a transport: the api
//! crate provides HTTP adapters, tests provide in-memory ones.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use commissionhub_core::SubjectId;

use crate::destination::Destination;
use crate::session::{AccessToken, Identity, Session, UserRoleRecord, Verification};

/// Failure talking to an external collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortError {
    /// The request never produced a response (connect, DNS, TLS, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The collaborator answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// No answer within the bounded wait.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl PortError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// Identity provider client (session store owner).
pub trait SessionProvider: Send + Sync {
    /// Current session, if the provider has one.
    fn get_session(&self) -> impl Future<Output = Result<Option<Session>, PortError>> + Send;

    /// Current user identity, if signed in.
    fn get_user(&self) -> impl Future<Output = Result<Option<Identity>, PortError>> + Send;

    /// Invalidate the current session at the provider.
    fn sign_out(&self) -> impl Future<Output = Result<(), PortError>> + Send;
}

/// Backend action that checks an access token.
pub trait TokenVerifier: Send + Sync {
    fn verify(
        &self,
        token: &AccessToken,
    ) -> impl Future<Output = Result<Verification, PortError>> + Send;
}

/// Zero-or-one row lookup of a subject's stored role.
pub trait RoleStore: Send + Sync {
    fn find_role(
        &self,
        subject: &SubjectId,
    ) -> impl Future<Output = Result<Option<UserRoleRecord>, PortError>> + Send;
}

/// History-replacing redirect.
pub trait Navigator {
    fn replace(&self, destination: Destination);
}

impl<T: SessionProvider> SessionProvider for Arc<T> {
    fn get_session(&self) -> impl Future<Output = Result<Option<Session>, PortError>> + Send {
        (**self).get_session()
    }

    fn get_user(&self) -> impl Future<Output = Result<Option<Identity>, PortError>> + Send {
        (**self).get_user()
    }

    fn sign_out(&self) -> impl Future<Output = Result<(), PortError>> + Send {
        (**self).sign_out()
    }
}

impl<T: TokenVerifier> TokenVerifier for Arc<T> {
    fn verify(
        &self,
        token: &AccessToken,
    ) -> impl Future<Output = Result<Verification, PortError>> + Send {
        (**self).verify(token)
    }
}

impl<T: RoleStore> RoleStore for Arc<T> {
    fn find_role(
        &self,
        subject: &SubjectId,
    ) -> impl Future<Output = Result<Option<UserRoleRecord>, PortError>> + Send {
        (**self).find_role(subject)
    }
}

impl<T: Navigator + ?Sized> Navigator for &T {
    fn replace(&self, destination: Destination) {
        (**self).replace(destination)
    }
}
