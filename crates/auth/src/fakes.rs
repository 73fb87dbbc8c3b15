//! In-memory collaborators for pipeline tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use commissionhub_core::SubjectId;

use crate::cancel::CancelToken;
use crate::destination::Destination;
use crate::ports::{Navigator, PortError, RoleStore, SessionProvider, TokenVerifier};
use crate::session::{AccessToken, Identity, Session, UserRoleRecord, Verification};

pub struct FakeProvider {
    session: Result<Option<Session>, PortError>,
    fail_sign_out: bool,
    sign_outs: AtomicU32,
}

impl FakeProvider {
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Ok(Some(session)),
            fail_sign_out: false,
            sign_outs: AtomicU32::new(0),
        }
    }

    pub fn signed_in(subject: &str) -> Self {
        Self::with_session(Session::new(
            AccessToken::new("access-token"),
            Some(Identity::new(SubjectId::new(subject))),
        ))
    }

    pub fn signed_out() -> Self {
        Self {
            session: Ok(None),
            fail_sign_out: false,
            sign_outs: AtomicU32::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            session: Err(PortError::transport("provider unreachable")),
            fail_sign_out: false,
            sign_outs: AtomicU32::new(0),
        }
    }

    pub fn with_failing_sign_out(mut self) -> Self {
        self.fail_sign_out = true;
        self
    }

    pub fn sign_out_calls(&self) -> u32 {
        self.sign_outs.load(Ordering::SeqCst)
    }
}

impl SessionProvider for FakeProvider {
    async fn get_session(&self) -> Result<Option<Session>, PortError> {
        self.session.clone()
    }

    async fn get_user(&self) -> Result<Option<Identity>, PortError> {
        self.session
            .clone()
            .map(|session| session.and_then(|s| s.identity))
    }

    async fn sign_out(&self) -> Result<(), PortError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out {
            return Err(PortError::transport("logout failed"));
        }
        Ok(())
    }
}

/// Blocks a fake call until released, so tests can act mid-pipeline.
#[derive(Default)]
struct Gate {
    entered: CancelToken,
    released: CancelToken,
}

impl Gate {
    async fn pass(gate: &Option<Gate>) {
        if let Some(gate) = gate {
            gate.entered.cancel();
            gate.released.cancelled().await;
        }
    }

    async fn wait_entered(gate: &Option<Gate>) {
        if let Some(gate) = gate {
            gate.entered.cancelled().await;
        }
    }

    fn release(gate: &Option<Gate>) {
        if let Some(gate) = gate {
            gate.released.cancel();
        }
    }
}

pub struct FakeVerifier {
    result: Result<Verification, PortError>,
    gate: Option<Gate>,
}

impl FakeVerifier {
    pub fn accepting() -> Self {
        Self {
            result: Ok(Verification::Verified),
            gate: None,
        }
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            result: Ok(Verification::rejected(reason)),
            gate: None,
        }
    }

    pub fn erroring() -> Self {
        Self {
            result: Err(PortError::Status {
                status: 502,
                body: "bad gateway".into(),
            }),
            gate: None,
        }
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Gate::default()),
            ..Self::accepting()
        }
    }

    pub fn gated_rejecting(reason: &str) -> Self {
        Self {
            gate: Some(Gate::default()),
            ..Self::rejecting(reason)
        }
    }

    pub async fn wait_until_called(&self) {
        Gate::wait_entered(&self.gate).await;
    }

    pub fn release(&self) {
        Gate::release(&self.gate);
    }
}

impl TokenVerifier for FakeVerifier {
    async fn verify(&self, _token: &AccessToken) -> Result<Verification, PortError> {
        Gate::pass(&self.gate).await;
        self.result.clone()
    }
}

pub struct FakeRoleStore {
    result: Result<Option<UserRoleRecord>, PortError>,
    lookups: AtomicU32,
    gate: Option<Gate>,
}

impl FakeRoleStore {
    fn answering(result: Result<Option<UserRoleRecord>, PortError>) -> Self {
        Self {
            result,
            lookups: AtomicU32::new(0),
            gate: None,
        }
    }

    pub fn with_row(record: UserRoleRecord) -> Self {
        Self::answering(Ok(Some(record)))
    }

    pub fn empty() -> Self {
        Self::answering(Ok(None))
    }

    pub fn failing() -> Self {
        Self::answering(Err(PortError::Status {
            status: 500,
            body: "relation does not exist".into(),
        }))
    }

    /// Holds the lookup open until [`release`](Self::release).
    pub fn gated(mut self) -> Self {
        self.gate = Some(Gate::default());
        self
    }

    pub async fn wait_until_called(&self) {
        Gate::wait_entered(&self.gate).await;
    }

    pub fn release(&self) {
        Gate::release(&self.gate);
    }

    pub fn lookups(&self) -> u32 {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl RoleStore for FakeRoleStore {
    async fn find_role(&self, _subject: &SubjectId) -> Result<Option<UserRoleRecord>, PortError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Gate::pass(&self.gate).await;
        self.result.clone()
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    calls: Mutex<Vec<Destination>>,
}

impl RecordingNavigator {
    pub fn calls(&self) -> Vec<Destination> {
        self.calls.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&self, destination: Destination) {
        self.calls.lock().unwrap().push(destination);
    }
}
