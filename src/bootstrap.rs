//! Engine assembly
//!
//! Builds the adapter graph from configuration and hands back a running
//! engine plus the session-event stream. The position sensor is the one
//! port the embedding shell has to supply; everything else is wired up
//! here.

use std::sync::Arc;

use anyhow::{Context, Result};
use ft_app::{AppDeps, Engine};
use ft_core::auth::{session_channel, SessionEventReceiver};
use ft_core::ports::PositionSensorPort;
use ft_infra::{
    FileKeyValueStore, HttpGateway, HttpPartnerApi, HttpReverseGeocoder, HttpTrackApi,
    KvTokenStore, SystemClock,
};
use tracing::info;

use crate::config::EngineConfig;

/// A fully wired engine and the channels the shell listens on.
pub struct EngineContext {
    pub engine: Engine,
    /// Emits once per expired session; the shell resets navigation to
    /// the sign-in entry point on receipt.
    pub session_events: SessionEventReceiver,
    /// Exposed so the shell's sign-in flow can store a fresh credential.
    pub token_store: Arc<KvTokenStore>,
}

impl EngineContext {
    /// Cancels all in-flight work. Call before dropping the context.
    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}

pub async fn bootstrap(
    config: &EngineConfig,
    position_sensor: Arc<dyn PositionSensorPort>,
) -> Result<EngineContext> {
    let data_dir = config.storage.resolve_data_dir()?;
    let kv = Arc::new(
        FileKeyValueStore::with_base_dir(data_dir)
            .await
            .context("open key-value store failed")?,
    );
    let token_store = Arc::new(KvTokenStore::new(kv.clone()));

    let (session_tx, session_events) = session_channel();
    let gateway = Arc::new(HttpGateway::new(
        &config.network.api_base_url,
        token_store.clone(),
        session_tx,
    )?);

    let timeouts = config.timeouts.api_timeouts();
    let track_api = Arc::new(HttpTrackApi::new(gateway.clone(), timeouts.clone()));
    let partner_api = Arc::new(HttpPartnerApi::new(gateway.clone(), timeouts));
    let geocoder = Arc::new(HttpReverseGeocoder::new(&config.network.geocoder_base_url)?);

    let deps = AppDeps {
        kv_store: kv,
        token_store: token_store.clone(),
        position_sensor,
        clock: Arc::new(SystemClock),
        geocoder,
        track_api,
        partner_api,
    };

    let engine = Engine::new(deps).with_geocode_deadline(config.timeouts.geocode());
    info!(api = %config.network.api_base_url, "engine assembled");

    Ok(EngineContext {
        engine,
        session_events,
        token_store,
    })
}
