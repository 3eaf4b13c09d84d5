//! Live session metrics: wholesale publishes into the mirror during an
//! active trading run. Each publish replaces the prior value; callers must
//! supply the complete snapshot every time and serialize publishes within a
//! single logical run.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::error::RegistryError;
use crate::models::{SessionSnapshot, SessionState};
use crate::observability::{metrics, MetricsCollector};
use crate::store::MirrorStore;

#[derive(Clone)]
pub struct SessionPublisher {
    mirror: Arc<dyn MirrorStore>,
    metrics: MetricsCollector,
}

impl SessionPublisher {
    pub fn new(mirror: Arc<dyn MirrorStore>, metrics: MetricsCollector) -> Self {
        Self { mirror, metrics }
    }

    /// Publish the current run's metrics. This is a primary path: a mirror
    /// failure here propagates to the caller.
    pub async fn publish(&self, snapshot: SessionSnapshot) -> Result<SessionState, RegistryError> {
        if snapshot.bot_id.is_nil() {
            return Err(RegistryError::Validation("bot_id is required".to_string()));
        }
        if snapshot.session_id.is_empty() {
            return Err(RegistryError::Validation(
                "session_id is required".to_string(),
            ));
        }
        if snapshot.number_of_runs < 0
            || snapshot.number_of_wins < 0
            || snapshot.number_of_losses < 0
        {
            return Err(RegistryError::Validation(
                "run counters must be non-negative".to_string(),
            ));
        }

        let state = self.mirror.put_session_state(&snapshot).await?;
        self.metrics.increment(metrics::SESSION_PUBLISHED, 1).await;

        debug!(
            "Published session state for bot {} (session {}, {} runs)",
            state.bot_id, state.session_id, state.number_of_runs
        );

        Ok(state)
    }

    pub async fn current(&self, bot_id: Uuid) -> Result<Option<SessionState>, RegistryError> {
        Ok(self.mirror.get_session_state(bot_id).await?)
    }
}
