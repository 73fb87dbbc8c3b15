//! `commissionhub-auth`: sign-in handoff for partner dashboards.
//!
//! Decides where a browser goes after login: verifies the provider session,
//! exchanges the token with the backend, looks up the stored role, and routes
//! store and restaurant partners to their dashboards. Everything else is
//! signed out and sent back to sign-in.
//!
//! This crate is decoupled from HTTP and storage; collaborators are traits in
//! [`ports`].

pub mod callback;
pub mod cancel;
pub mod destination;
pub mod entry;
pub mod ports;
pub mod roles;
pub mod session;

#[cfg(test)]
mod fakes;

pub use callback::{
    CallbackFailure, CallbackOutcome, CallbackState, CallbackVerifier, DEFAULT_STEP_TIMEOUT,
};
pub use cancel::{CancelOnDrop, CancelToken};
pub use destination::Destination;
pub use entry::{EntryOutcome, EntryRouter};
pub use ports::{Navigator, PortError, RoleStore, SessionProvider, TokenVerifier};
pub use roles::PartnerRole;
pub use session::{AccessToken, Identity, Session, UserRoleRecord, Verification};
