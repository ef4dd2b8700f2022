// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fire-and-forget HTTP trigger
//!
//! The fire timeout is shorter than any real response, so a request that
//! times out after it was sent counts as fired. Resolving and connecting get
//! their own budget of at least [`CONNECT_TIMEOUT`]; a site that cannot be
//! reached within it is reported as a transport error, like a refused
//! connection.

use asc_core::dispatch::{Trigger, TriggerError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Smallest budget for resolving and connecting to a site
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Posts to `wp-cron.php` on blocking threads via ureq
#[derive(Clone)]
pub struct HttpTrigger {
    agent: ureq::Agent,
}

impl HttpTrigger {
    pub fn new(verify_tls: bool) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .tls_config(
                ureq::tls::TlsConfig::builder()
                    .disable_verification(!verify_tls)
                    .build(),
            )
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

#[async_trait]
impl Trigger for HttpTrigger {
    async fn fire(&self, url: &str, timeout: Duration) -> Result<(), TriggerError> {
        let agent = self.agent.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || {
            let connect = timeout.max(CONNECT_TIMEOUT);
            let result = agent
                .post(&url)
                .config()
                .timeout_resolve(Some(connect))
                .timeout_connect(Some(connect))
                .timeout_send_request(Some(timeout))
                .timeout_recv_response(Some(timeout))
                .timeout_recv_body(Some(timeout))
                .build()
                .send_empty();
            classify(&url, result.map(drop))
        })
        .await
        .map_err(|e| TriggerError::Transport(format!("trigger task failed: {}", e)))?
    }
}

fn classify(url: &str, result: Result<(), ureq::Error>) -> Result<(), TriggerError> {
    match result {
        Ok(()) => Ok(()),
        Err(ureq::Error::Timeout(which @ (ureq::Timeout::Resolve | ureq::Timeout::Connect))) => {
            Err(TriggerError::Transport(format!("timed out: {:?}", which)))
        }
        Err(ureq::Error::Timeout(_)) => {
            debug!(url, "trigger sent, response not awaited");
            Ok(())
        }
        Err(ureq::Error::BadUri(reason)) => Err(TriggerError::InvalidUrl(reason)),
        Err(ureq::Error::Http(e)) => Err(TriggerError::InvalidUrl(e.to_string())),
        Err(e) => Err(TriggerError::Transport(e.to_string())),
    }
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
