// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session lifecycle controller.
//!
//! A state machine driving the messaging engine through
//! init -> authenticate -> ready -> (disconnect | fatal-error) -> recover.
//! Corrupted sessions are self-healed by wiping the persisted auth and
//! cache directories and cold-restarting the engine. Every state
//! transition emits the new status label to the event sink; transitions
//! into `Disconnected` additionally emit a reset signal.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use groupcast_config::GroupcastConfig;
use groupcast_core::types::{EngineEvent, InboundMessage, SessionState};
use groupcast_core::{EventSink, GroupcastError, MessagingEngine};

use crate::context::SessionContext;
use crate::directory::{self, DirectorySettings};

/// Error-message fragments identifying a corrupted engine session.
/// Anything matching one of these triggers the credential/cache wipe.
pub const CORRUPTION_SIGNATURES: &[&str] = &[
    "Execution context was destroyed",
    "Protocol error",
    "Evaluation failed",
];

/// Returns the matched corruption signature, if the error carries one.
pub fn corruption_signature(error: &GroupcastError) -> Option<&'static str> {
    let text = error.to_string();
    CORRUPTION_SIGNATURES
        .iter()
        .find(|sig| text.contains(*sig))
        .copied()
}

/// Timing and path settings for the controller, taken from config.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub reconnect_delay: Duration,
    pub repair_cleanup_delay: Duration,
    pub repair_restart_delay: Duration,
    pub init_retry_delay: Duration,
    pub auth_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub directory: DirectorySettings,
}

impl ControllerSettings {
    pub fn from_config(config: &GroupcastConfig) -> Self {
        Self {
            reconnect_delay: Duration::from_secs(config.session.reconnect_delay_secs),
            repair_cleanup_delay: Duration::from_secs(config.session.repair_cleanup_delay_secs),
            repair_restart_delay: Duration::from_secs(config.session.repair_restart_delay_secs),
            init_retry_delay: Duration::from_secs(config.session.init_retry_delay_secs),
            auth_dir: PathBuf::from(&config.engine.auth_dir),
            cache_dir: PathBuf::from(&config.engine.cache_dir),
            directory: DirectorySettings::from(&config.directory),
        }
    }
}

/// Owns the engine connection and drives the session state machine.
pub struct LifecycleController {
    engine: Arc<dyn MessagingEngine>,
    sink: Arc<dyn EventSink>,
    ctx: Arc<SessionContext>,
    settings: ControllerSettings,
    message_tx: mpsc::Sender<InboundMessage>,
    /// Cancels the pending disconnect-triggered reinit when the session
    /// recovers on its own first.
    reinit_cancel: Mutex<Option<CancellationToken>>,
    /// Cancels the previous directory refresh loop when a new connect
    /// supersedes it, so exactly one loop runs at a time.
    refresh_cancel: Mutex<Option<CancellationToken>>,
}

impl LifecycleController {
    pub fn new(
        engine: Arc<dyn MessagingEngine>,
        sink: Arc<dyn EventSink>,
        ctx: Arc<SessionContext>,
        settings: ControllerSettings,
        message_tx: mpsc::Sender<InboundMessage>,
    ) -> Arc<Self> {
        Arc::new(Self {
            engine,
            sink,
            ctx,
            settings,
            message_tx,
            reinit_cancel: Mutex::new(None),
            refresh_cancel: Mutex::new(None),
        })
    }

    /// Runs the controller until the cancellation token fires: initializes
    /// the engine (with recovery), then consumes lifecycle events.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        info!("session lifecycle controller running");
        self.initialize_with_recovery(&cancel).await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = self.engine.next_event() => match event {
                    Ok(event) => Arc::clone(&self).handle_event(event, &cancel).await,
                    Err(e) => {
                        warn!(error = %e, "engine event stream error");
                        if cancellable_sleep(Duration::from_secs(1), &cancel).await {
                            break;
                        }
                    }
                },
            }
        }

        // Shutdown: stop scheduled work and tear the engine down best-effort.
        if let Some(token) = self.reinit_cancel.lock().await.take() {
            token.cancel();
        }
        if let Some(token) = self.refresh_cancel.lock().await.take() {
            token.cancel();
        }
        if let Err(e) = self.engine.destroy().await {
            debug!(error = %e, "engine destroy on shutdown failed");
        }
        info!("session lifecycle controller stopped");
    }

    async fn handle_event(self: Arc<Self>, event: EngineEvent, cancel: &CancellationToken) {
        match event {
            EngineEvent::QrChallenge(data_url) => {
                self.ctx
                    .set_state(SessionState::AwaitingScan, "awaiting QR scan")
                    .await;
                self.sink.status("awaiting QR scan");
                // Re-emitted on every new challenge.
                self.sink.qr_code(&data_url);
            }
            EngineEvent::Authenticated => {
                self.ctx
                    .set_state(SessionState::Authenticated, "authenticated")
                    .await;
                self.sink.status("authenticated");
            }
            EngineEvent::Ready => self.on_ready(cancel).await,
            EngineEvent::AuthFailure(reason) => {
                warn!(reason = %reason, "authentication rejected");
                self.ctx
                    .set_state(
                        SessionState::AuthFailed,
                        format!("authentication failed: {reason}"),
                    )
                    .await;
                self.sink.status("authentication failed");
                self.sink
                    .log_line("authentication rejected; a fresh QR scan is required");
            }
            EngineEvent::Disconnected(reason) => self.on_disconnected(&reason, cancel).await,
            EngineEvent::FatalError(message) => {
                warn!(message = %message, "engine reported fatal error");
                let signature = CORRUPTION_SIGNATURES
                    .iter()
                    .find(|sig| message.contains(*sig))
                    .copied()
                    .unwrap_or("engine fatal error");
                self.repair_session(signature, cancel).await;
                self.initialize_with_recovery(cancel).await;
            }
            EngineEvent::Message(msg) => {
                if self.message_tx.send(msg).await.is_err() {
                    warn!("relay worker gone, dropping inbound message");
                }
            }
        }
    }

    /// Handshake complete: the session is usable. A pending reinit becomes
    /// moot, and a fresh directory refresh loop supersedes any previous one.
    async fn on_ready(&self, cancel: &CancellationToken) {
        if let Some(token) = self.reinit_cancel.lock().await.take() {
            debug!("session recovered; cancelling pending reinit");
            token.cancel();
        }

        self.ctx
            .set_state(SessionState::Connected, "connected")
            .await;
        self.sink.status("connected");
        self.sink.ready_signal();
        info!("session connected");

        let refresh_token = cancel.child_token();
        {
            let mut guard = self.refresh_cancel.lock().await;
            if let Some(previous) = guard.take() {
                previous.cancel();
            }
            *guard = Some(refresh_token.clone());
        }
        tokio::spawn(directory::auto_refresh(
            Arc::clone(&self.engine),
            Arc::clone(&self.sink),
            Arc::clone(&self.ctx),
            self.settings.directory.clone(),
            refresh_token,
        ));
    }

    /// Engine-reported disconnect: destroy the instance and schedule a
    /// re-initialization after a fixed delay, guarded by the single-flight
    /// flag so concurrent disconnect signals do not spawn parallel recovery
    /// attempts.
    async fn on_disconnected(self: Arc<Self>, reason: &str, cancel: &CancellationToken) {
        warn!(reason = %reason, "engine disconnected");
        self.ctx
            .set_state(SessionState::Disconnected, format!("disconnected: {reason}"))
            .await;
        self.sink.status("disconnected");
        self.sink.reset_signal();

        if let Err(e) = self.engine.destroy().await {
            debug!(error = %e, "engine destroy after disconnect failed");
        }

        if !self.ctx.begin_reconnect() {
            debug!("recovery already scheduled, ignoring duplicate disconnect");
            return;
        }

        let token = cancel.child_token();
        *self.reinit_cancel.lock().await = Some(token.clone());

        let this = Arc::clone(&self);
        let parent = cancel.clone();
        let delay = self.settings.reconnect_delay;
        self.sink.log_line(&format!(
            "connection lost ({reason}); restarting in {}s",
            delay.as_secs()
        ));
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    this.ctx.end_reconnect();
                    debug!("pending reinit cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    this.ctx.end_reconnect();
                    this.reinit_cancel.lock().await.take();
                    this.initialize_with_recovery(&parent).await;
                }
            }
        });
    }

    /// Initializes the engine, retrying until it succeeds or the token
    /// fires. Corruption signatures run the auto-repair sequence; any other
    /// failure retries after the fixed delay.
    pub async fn initialize_with_recovery(&self, cancel: &CancellationToken) {
        loop {
            if cancel.is_cancelled() {
                return;
            }
            self.ctx
                .set_state(SessionState::Initializing, "initializing")
                .await;
            self.sink.status("initializing");

            match self.engine.initialize().await {
                Ok(()) => {
                    self.sink.log_line("engine initialization started");
                    return;
                }
                Err(e) => {
                    if let Some(signature) = corruption_signature(&e) {
                        self.repair_session(signature, cancel).await;
                    } else {
                        warn!(error = %e, "engine initialization failed");
                        self.sink.log_line(&format!(
                            "initialization failed: {e}; retrying in {}s",
                            self.settings.init_retry_delay.as_secs()
                        ));
                        if cancellable_sleep(self.settings.init_retry_delay, cancel).await {
                            return;
                        }
                    }
                }
            }
        }
    }

    /// The auto-repair sequence: best-effort destroy, wipe of the persisted
    /// auth and cache directories (idempotent if absent), recovery notice,
    /// then the cleanup and restart delays, sequentially.
    async fn repair_session(&self, signature: &str, cancel: &CancellationToken) {
        self.ctx
            .set_state(
                SessionState::FatalError,
                format!("session corrupted: {signature}"),
            )
            .await;
        self.sink.status("session corrupted, repairing");
        self.sink.log_line(&format!(
            "session corruption detected ({signature}); wiping session data"
        ));

        if let Err(e) = self.engine.destroy().await {
            debug!(error = %e, "engine destroy before wipe failed (ignored)");
        }

        wipe_dir(&self.settings.auth_dir).await;
        wipe_dir(&self.settings.cache_dir).await;
        self.sink
            .log_line("session data cleared; restarting engine");

        if cancellable_sleep(self.settings.repair_cleanup_delay, cancel).await {
            return;
        }
        cancellable_sleep(self.settings.repair_restart_delay, cancel).await;
    }
}

/// Recursively deletes a session-data directory. Already-absent directories
/// are fine; anything else is logged and swallowed so repair can proceed.
async fn wipe_dir(path: &Path) {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => info!(path = %path.display(), "session directory wiped"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "session directory already absent");
        }
        Err(e) => warn!(path = %path.display(), error = %e, "failed to wipe session directory"),
    }
}

/// Sleeps for `duration` unless the token fires first. Returns `true` when
/// cancelled.
async fn cancellable_sleep(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => true,
        _ = tokio::time::sleep(duration) => false,
    }
}
