//! Browser-facing sign-in handoff.
//!
//! `GET /` sends the browser to sign-in or to the callback; `GET /callback`
//! runs the verification pipeline and redirects to the partner dashboard.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::{cookie::Cookie, CookieJar};
use tokio::task::JoinError;

use commissionhub_auth::{CancelToken, Destination, SessionProvider};

use crate::app::services::AppServices;
use crate::context::{session_token, RedirectNavigator, SESSION_COOKIE};

pub fn router() -> Router {
    Router::new()
        .route("/", get(entry))
        .route("/callback", get(callback))
}

/// GET /
pub async fn entry(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Response {
    let router = services.entry_router(session_token(&jar, &headers));
    let navigator = RedirectNavigator::new();
    let cancel = CancelToken::new();
    let guard = cancel.drop_guard();

    let outcome = router.run(&navigator, &cancel).await;
    guard.disarm();

    let destination = navigator.take().unwrap_or(outcome.destination);
    Redirect::to(destination.path()).into_response()
}

/// GET /callback
///
/// The pipeline runs in its own task. If the browser goes away the task is
/// cancelled: it stops at the next step and never redirects, but a session
/// already judged unacceptable is still signed out.
pub async fn callback(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Response {
    let token = session_token(&jar, &headers);
    let verifier = services.callback_verifier(token.clone());
    let navigator = Arc::new(RedirectNavigator::new());
    let cancel = CancelToken::new();
    let guard = cancel.drop_guard();

    let task = {
        let navigator = Arc::clone(&navigator);
        let cancel = cancel.clone();
        tokio::spawn(async move { verifier.run(&*navigator, &cancel).await })
    };

    let joined = task.await;
    guard.disarm();

    let outcome = match joined {
        Ok(outcome) => outcome,
        Err(err) => {
            let provider = services.supabase.session(token);
            return fail_closed(err, &provider, services.config.step_timeout, jar).await;
        }
    };

    tracing::info!(
        state = ?outcome.state,
        role = outcome.role.as_ref().map(|r| r.as_str()),
        signed_out = outcome.signed_out,
        "callback finished"
    );

    let destination = navigator
        .take()
        .or(outcome.destination)
        .unwrap_or(Destination::SignIn);

    let jar = if outcome.signed_out {
        clear_session(jar)
    } else {
        jar
    };

    (jar, Redirect::to(destination.path())).into_response()
}

/// A pipeline task that died without an outcome is an unexpected failure:
/// sign out, drop the cookie, back to sign-in.
async fn fail_closed<P: SessionProvider>(
    err: JoinError,
    provider: &P,
    step_timeout: Duration,
    jar: CookieJar,
) -> Response {
    tracing::error!(error = %err, "callback pipeline task failed");
    match tokio::time::timeout(step_timeout, provider.sign_out()).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => tracing::warn!(error = %err, "sign-out failed"),
        Err(_) => tracing::warn!(?step_timeout, "sign-out timed out"),
    }
    (clear_session(jar), Redirect::to(Destination::SignIn.path())).into_response()
}

fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"))
}
