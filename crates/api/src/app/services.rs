use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use commissionhub_auth::{AccessToken, CallbackVerifier, EntryRouter};
use commissionhub_billing::TierTable;
use commissionhub_notifications::{NotificationQueue, Subscription};

use crate::config::GatewayConfig;
use crate::supabase::{HttpTokenVerifier, SupabaseClient, SupabaseRoleStore, SupabaseSessionProvider};

/// Shared state behind every route.
#[derive(Debug, Clone)]
pub struct AppServices {
    pub config: GatewayConfig,
    pub supabase: SupabaseClient,
    pub verifier: Arc<HttpTokenVerifier>,
    pub tiers: Arc<TierTable>,
    pub notifications: NotificationQueue,
}

pub type RequestCallbackVerifier =
    CallbackVerifier<SupabaseSessionProvider, Arc<HttpTokenVerifier>, SupabaseRoleStore>;

impl AppServices {
    /// Entry router acting with the caller's token.
    pub fn entry_router(&self, token: Option<AccessToken>) -> EntryRouter<SupabaseSessionProvider> {
        EntryRouter::new(self.supabase.session(token)).with_timeout(self.config.step_timeout)
    }

    /// Callback pipeline acting with the caller's token.
    pub fn callback_verifier(&self, token: Option<AccessToken>) -> RequestCallbackVerifier {
        CallbackVerifier::new(
            self.supabase.session(token.clone()),
            Arc::clone(&self.verifier),
            self.supabase.role_store(token),
        )
        .with_step_timeout(self.config.step_timeout)
    }
}

pub fn build_services(config: GatewayConfig) -> AppServices {
    let supabase = SupabaseClient::new(
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
        config.role_table.clone(),
    );
    let verifier = Arc::new(HttpTokenVerifier::new(config.verify_url.clone()));
    let tiers = Arc::new(TierTable::new(&config.payment_links));

    tracing::info!(
        supabase_url = %config.supabase_url,
        role_table = %config.role_table,
        step_timeout_ms = config.step_timeout.as_millis() as u64,
        "gateway services ready"
    );

    AppServices {
        config,
        supabase,
        verifier,
        tiers,
        notifications: NotificationQueue::new(),
    }
}

/// Toast queue changes as server-sent events named after the change.
pub fn notification_sse_stream(
    subscription: Subscription,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = subscription.into_inner();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(event.name()).data(data)))
        }
        // Lagged subscribers skip ahead; the next list call resyncs them.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
