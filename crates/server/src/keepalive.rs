//! Periodic self-ping, for free-tier hosts that put idle services to sleep.

use std::time::Duration;

use pagbot_core::config::KeepaliveConfig;
use tracing::{debug, info};

/// Ping the configured URL forever. Failures are logged and swallowed; a
/// missed ping must never take the service down.
pub async fn run(config: KeepaliveConfig) {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            debug!("Keepalive client init failed: {}", e);
            return;
        }
    };

    info!(
        "Keepalive pinging {} every {}s after an initial {}s delay",
        config.url, config.interval_secs, config.initial_delay_secs
    );

    tokio::time::sleep(Duration::from_secs(config.initial_delay_secs)).await;

    loop {
        match client.get(&config.url).send().await {
            Ok(response) => debug!("Keepalive ping: {}", response.status()),
            Err(e) => debug!("Keepalive ping failed: {}", e),
        }
        tokio::time::sleep(Duration::from_secs(config.interval_secs)).await;
    }
}
