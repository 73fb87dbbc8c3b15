//! Landing decision: send signed-in users to the callback, everyone else to sign-in.

use std::time::Duration;

use crate::callback::{DEFAULT_STEP_TIMEOUT, navigate};
use crate::cancel::CancelToken;
use crate::destination::Destination;
use crate::ports::{Navigator, SessionProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryOutcome {
    pub destination: Destination,
    pub navigated: bool,
}

/// One-shot entry router. A failed or slow user fetch counts as "no user".
#[derive(Debug, Clone)]
pub struct EntryRouter<P> {
    provider: P,
    timeout: Duration,
}

impl<P: SessionProvider> EntryRouter<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            timeout: DEFAULT_STEP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn run<N: Navigator>(&self, navigator: N, cancel: &CancelToken) -> EntryOutcome {
        let user = match tokio::time::timeout(self.timeout, self.provider.get_user()).await {
            Ok(Ok(user)) => user,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "user fetch failed; treating as signed out");
                None
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "user fetch timed out; treating as signed out");
                None
            }
        };

        let destination = match user {
            Some(identity) if !identity.subject.is_empty() => Destination::Callback,
            _ => Destination::SignIn,
        };
        let navigated = navigate(&navigator, cancel, destination);
        EntryOutcome {
            destination,
            navigated,
        }
    }
}
