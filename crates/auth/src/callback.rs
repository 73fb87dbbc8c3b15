//! Callback verification pipeline.
//!
//! Turns a raw provider session into a role-routed destination:
//!
//! ```text
//! FetchingSession ─► ExchangingIdentity ─► LookingUpRole ─► RoleCheck ─► Routed
//!        │                   │                   │              │
//!        └───────────────────┴───────────────────┴──────────────┴─► SignedOutRedirect
//! ```
//!
//! Steps run strictly in sequence. Every failure is terminal and fails closed:
//! the browser goes to sign-in, never to a dashboard. Sign-out is issued for
//! every failure after the session was found, and is never suppressed by
//! cancellation. Navigation always is. Cancellation is honoured before each
//! external call; the role decision itself is pure and always runs.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::cancel::CancelToken;
use crate::destination::Destination;
use crate::ports::{Navigator, PortError, RoleStore, SessionProvider, TokenVerifier};
use crate::roles::PartnerRole;
use crate::session::Verification;

/// Bounded wait applied to each external call when none is configured.
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackState {
    FetchingSession,
    ExchangingIdentity,
    LookingUpRole,
    RoleCheck,
    Routed,
    SignedOutRedirect,
    Cancelled,
}

/// Why a callback run ended on the sign-in page.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallbackFailure {
    #[error("session fetch failed: {0}")]
    SessionFetch(PortError),

    #[error("no access token or identity in session")]
    SessionMissing,

    #[error("token verification rejected: {0}")]
    VerificationFailed(String),

    #[error("role lookup failed: {0}")]
    RoleLookup(PortError),

    #[error("role {0:?} is not allowed")]
    RoleNotAllowed(String),

    #[error("unexpected failure while {stage:?}: {message}")]
    Unexpected {
        stage: CallbackState,
        message: String,
    },
}

impl CallbackFailure {
    /// Nothing to sign out of until a session has actually been found.
    pub fn requires_sign_out(&self) -> bool {
        !matches!(self, Self::SessionFetch(_) | Self::SessionMissing)
    }

    pub fn redirect(&self) -> Destination {
        match self {
            Self::RoleNotAllowed(_) => Destination::AccessDenied,
            _ => Destination::SignIn,
        }
    }
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackOutcome {
    pub state: CallbackState,
    /// Where the run decided to send the browser (`None` if cancelled first).
    pub destination: Option<Destination>,
    /// Whether `Navigator::replace` was actually called.
    pub navigated: bool,
    pub signed_out: bool,
    pub role: Option<PartnerRole>,
    pub failure: Option<CallbackFailure>,
}

enum Halt {
    Failed(CallbackFailure),
    Cancelled(CallbackState),
}

impl From<CallbackFailure> for Halt {
    fn from(value: CallbackFailure) -> Self {
        Self::Failed(value)
    }
}

/// Session → verified identity → role → dashboard.
#[derive(Debug, Clone)]
pub struct CallbackVerifier<P, V, R> {
    provider: P,
    verifier: V,
    roles: R,
    step_timeout: Duration,
}

impl<P, V, R> CallbackVerifier<P, V, R>
where
    P: SessionProvider,
    V: TokenVerifier,
    R: RoleStore,
{
    pub fn new(provider: P, verifier: V, roles: R) -> Self {
        Self {
            provider,
            verifier,
            roles,
            step_timeout: DEFAULT_STEP_TIMEOUT,
        }
    }

    pub fn with_step_timeout(mut self, step_timeout: Duration) -> Self {
        self.step_timeout = step_timeout;
        self
    }

    pub fn step_timeout(&self) -> Duration {
        self.step_timeout
    }

    /// Run the pipeline once. Never retries.
    pub async fn run<N: Navigator>(&self, navigator: N, cancel: &CancelToken) -> CallbackOutcome {
        match self.resolve(cancel).await {
            Ok((role, _)) if cancel.is_cancelled() => {
                tracing::info!(role = %role, "callback cancelled before routing");
                CallbackOutcome {
                    state: CallbackState::Cancelled,
                    destination: None,
                    navigated: false,
                    signed_out: false,
                    role: Some(role),
                    failure: None,
                }
            }
            Ok((role, destination)) => {
                tracing::info!(role = %role, destination = %destination, "callback routed");
                let navigated = navigate(&navigator, cancel, destination);
                CallbackOutcome {
                    state: CallbackState::Routed,
                    destination: Some(destination),
                    navigated,
                    signed_out: false,
                    role: Some(role),
                    failure: None,
                }
            }
            Err(Halt::Cancelled(at)) => {
                tracing::info!(state = ?at, "callback cancelled before completion");
                CallbackOutcome {
                    state: CallbackState::Cancelled,
                    destination: None,
                    navigated: false,
                    signed_out: false,
                    role: None,
                    failure: None,
                }
            }
            Err(Halt::Failed(failure)) => {
                tracing::warn!(error = %failure, "callback rejected");
                let signed_out = failure.requires_sign_out();
                if signed_out {
                    self.sign_out().await;
                }
                let destination = failure.redirect();
                let navigated = navigate(&navigator, cancel, destination);
                let role = match &failure {
                    CallbackFailure::RoleNotAllowed(raw) => Some(PartnerRole::parse(raw)),
                    _ => None,
                };
                CallbackOutcome {
                    state: CallbackState::SignedOutRedirect,
                    destination: Some(destination),
                    navigated,
                    signed_out,
                    role,
                    failure: Some(failure),
                }
            }
        }
    }

    async fn resolve(&self, cancel: &CancelToken) -> Result<(PartnerRole, Destination), Halt> {
        checkpoint(cancel, CallbackState::FetchingSession)?;
        let session = self
            .bounded(self.provider.get_session())
            .await
            .map_err(CallbackFailure::SessionFetch)?
            .ok_or(CallbackFailure::SessionMissing)?;
        let (token, subject) = session
            .credentials()
            .ok_or(CallbackFailure::SessionMissing)?;
        tracing::debug!(subject = %subject, "session found");

        checkpoint(cancel, CallbackState::ExchangingIdentity)?;
        match self.bounded(self.verifier.verify(token)).await {
            Ok(Verification::Verified) => {}
            Ok(Verification::Rejected { reason }) => {
                return Err(CallbackFailure::VerificationFailed(reason).into());
            }
            Err(err) => {
                return Err(CallbackFailure::Unexpected {
                    stage: CallbackState::ExchangingIdentity,
                    message: err.to_string(),
                }
                .into());
            }
        }

        checkpoint(cancel, CallbackState::LookingUpRole)?;
        let record = self
            .bounded(self.roles.find_role(subject))
            .await
            .map_err(CallbackFailure::RoleLookup)?;
        let raw_role = record.and_then(|r| r.role).unwrap_or_default();

        // No checkpoint here: once the lookup has answered, a denied role must
        // still reach sign-out even if the run was cancelled meanwhile.
        let role = PartnerRole::parse(&raw_role);
        let Some(destination) = role.destination() else {
            return Err(CallbackFailure::RoleNotAllowed(raw_role).into());
        };
        Ok((role, destination))
    }

    async fn sign_out(&self) {
        if let Err(err) = self.bounded(self.provider.sign_out()).await {
            tracing::warn!(error = %err, "sign-out failed");
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, PortError>>,
    ) -> Result<T, PortError> {
        tokio::time::timeout(self.step_timeout, call)
            .await
            .unwrap_or(Err(PortError::Timeout(self.step_timeout)))
    }
}

fn checkpoint(cancel: &CancelToken, next: CallbackState) -> Result<(), Halt> {
    if cancel.is_cancelled() {
        return Err(Halt::Cancelled(next));
    }
    Ok(())
}

/// Navigate unless the run has been cancelled. Returns whether it navigated.
pub(crate) fn navigate<N: Navigator>(
    navigator: &N,
    cancel: &CancelToken,
    destination: Destination,
) -> bool {
    if cancel.is_cancelled() {
        tracing::debug!(destination = %destination, "navigation suppressed after cancel");
        return false;
    }
    navigator.replace(destination);
    true
}
