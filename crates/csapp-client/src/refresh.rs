//! Refresh-token exchange.
//!
//! The coordinator trades the stored refresh token for a new pair. Callers
//! that hit a 401 at the same time share one in-flight exchange instead of
//! each spending the (rotating) refresh token on their own request.

use std::fmt;
use std::time::Duration;

use csapp_types::{RefreshRequest, TokenPair, TokenResponse};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use url::Url;

use crate::token_store::SharedTokenStore;

type PendingRefresh = Shared<BoxFuture<'static, bool>>;

pub(crate) struct RefreshCoordinator {
    http: reqwest::Client,
    refresh_url: Url,
    timeout: Duration,
    tokens: SharedTokenStore,
    in_flight: Mutex<Option<PendingRefresh>>,
}

impl RefreshCoordinator {
    pub(crate) fn new(
        http: reqwest::Client,
        refresh_url: Url,
        timeout: Duration,
        tokens: SharedTokenStore,
    ) -> Self {
        Self {
            http,
            refresh_url,
            timeout,
            tokens,
            in_flight: Mutex::new(None),
        }
    }

    /// Run one refresh exchange. Never fails; `false` means no new pair.
    pub(crate) async fn try_refresh(&self) -> bool {
        exchange(
            self.http.clone(),
            self.refresh_url.clone(),
            self.timeout,
            self.tokens.clone(),
        )
        .await
    }

    /// Refresh on behalf of a request whose access token was rejected.
    ///
    /// Returns `true` without a network call when the store already holds a
    /// different access token than the rejected one. Otherwise joins the
    /// pending exchange, starting one if none is running.
    pub(crate) async fn refresh_after(&self, rejected: Option<&str>) -> bool {
        if let Some(current) = self.tokens.access_token()
            && Some(current.as_str()) != rejected
        {
            tracing::debug!("Access token already replaced, skipping refresh");
            return true;
        }

        let pending = {
            let mut slot = self.in_flight.lock();
            match slot.as_ref() {
                Some(pending) => pending.clone(),
                None => {
                    let pending = exchange(
                        self.http.clone(),
                        self.refresh_url.clone(),
                        self.timeout,
                        self.tokens.clone(),
                    )
                    .boxed()
                    .shared();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        let refreshed = pending.clone().await;

        let mut slot = self.in_flight.lock();
        if slot
            .as_ref()
            .is_some_and(|current| Shared::ptr_eq(current, &pending))
        {
            *slot = None;
        }

        refreshed
    }
}

impl fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refresh_url", &self.refresh_url.as_str())
            .field("in_flight", &self.in_flight.lock().is_some())
            .finish()
    }
}

async fn exchange(
    http: reqwest::Client,
    refresh_url: Url,
    timeout: Duration,
    tokens: SharedTokenStore,
) -> bool {
    let Some(refresh_token) = tokens.refresh_token() else {
        tracing::debug!("No refresh token stored");
        return false;
    };

    let response = http
        .post(refresh_url)
        .json(&RefreshRequest { refresh_token })
        .timeout(timeout)
        .send()
        .await;

    let response = match response {
        Ok(response) if response.status().is_success() => response,
        Ok(response) => {
            tracing::info!(status = response.status().as_u16(), "Token refresh rejected");
            return false;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Token refresh request failed");
            return false;
        }
    };

    match response.json::<TokenResponse>().await {
        Ok(body) => {
            tokens.set_tokens(&TokenPair::from(body));
            tracing::debug!("Token pair refreshed");
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "Malformed token refresh response");
            false
        }
    }
}
