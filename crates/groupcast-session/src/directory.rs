// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Group directory refresh.
//!
//! After each (re)connect the controller starts one automatic refresh loop:
//! fetch the chat list, filter to groups, publish the first non-empty set
//! and re-check it once, or keep retrying on an empty/failed fetch until the
//! attempt budget runs out. A manual refresh is a single unconditional
//! fetch-and-publish, permitted only while the session is connected.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use groupcast_config::model::DirectoryConfig;
use groupcast_core::types::{GroupRecord, SessionState};
use groupcast_core::{EventSink, GroupcastError, MessagingEngine};

use crate::context::SessionContext;

/// Timing and attempt budgets for the automatic refresh loop.
#[derive(Debug, Clone)]
pub struct DirectorySettings {
    pub poll_interval: Duration,
    /// Attempt budget while the group list keeps coming back empty.
    pub max_attempts: u32,
    /// Total attempt bound once a non-empty list has been published.
    pub confirm_attempts: u32,
}

impl From<&DirectoryConfig> for DirectorySettings {
    fn from(config: &DirectoryConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            max_attempts: config.max_attempts,
            confirm_attempts: config.confirm_attempts,
        }
    }
}

/// Fetches the chat list and filters it to groups.
async fn fetch_groups(
    engine: &Arc<dyn MessagingEngine>,
) -> Result<Vec<GroupRecord>, GroupcastError> {
    let chats = engine.list_chats().await?;
    Ok(chats
        .into_iter()
        .filter(|c| c.is_group)
        .map(|c| GroupRecord {
            id: c.id.into(),
            name: c.name,
        })
        .collect())
}

async fn publish(ctx: &SessionContext, sink: &Arc<dyn EventSink>, groups: Vec<GroupRecord>) {
    debug!(groups = groups.len(), "publishing group directory");
    sink.groups_snapshot(&groups);
    ctx.set_directory(groups).await;
}

/// The bounded automatic refresh loop started on reaching `Connected`.
///
/// Fetch failures are logged and counted against the attempt budget, never
/// fatal. Exhausting the budget leaves the directory to manual refresh.
pub async fn auto_refresh(
    engine: Arc<dyn MessagingEngine>,
    sink: Arc<dyn EventSink>,
    ctx: Arc<SessionContext>,
    settings: DirectorySettings,
    cancel: CancellationToken,
) {
    let mut attempts: u32 = 0;
    let mut published = false;

    loop {
        if cancel.is_cancelled() {
            debug!("directory refresh loop superseded");
            return;
        }
        attempts += 1;

        match fetch_groups(&engine).await {
            Ok(groups) if !groups.is_empty() => {
                publish(&ctx, &sink, groups).await;
                if published {
                    // Confirmatory re-check done.
                    return;
                }
                published = true;
                if attempts >= settings.confirm_attempts {
                    return;
                }
            }
            Ok(_) => {
                debug!(attempt = attempts, "group list still empty");
            }
            Err(e) => {
                warn!(attempt = attempts, error = %e, "group list fetch failed");
                sink.log_line(&format!("group list fetch failed: {e}"));
            }
        }

        let budget = if published {
            settings.confirm_attempts
        } else {
            settings.max_attempts
        };
        if attempts >= budget {
            if !published {
                warn!(attempts, "giving up on automatic directory refresh");
                sink.log_line("group directory still empty; use manual refresh");
            }
            return;
        }

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(settings.poll_interval) => {}
        }
    }
}

/// On-demand refresh: one unconditional fetch-and-publish.
///
/// Returns `Ok(false)` without error when the session is not connected.
pub async fn refresh_once(
    engine: &Arc<dyn MessagingEngine>,
    sink: &Arc<dyn EventSink>,
    ctx: &SessionContext,
) -> Result<bool, GroupcastError> {
    if ctx.state().await != SessionState::Connected {
        sink.log_line("directory refresh requested before session ready");
        return Ok(false);
    }

    let groups = fetch_groups(engine).await?;
    publish(ctx, sink, groups).await;
    Ok(true)
}
