use std::sync::Arc;
use uuid::Uuid;

use crate::shared::infrastructure::graph_store::{GraphDriver, GraphSession};

/// Per-request state handed to resolvers.
///
/// `driver` is only set when the driver was built for this request (bearer
/// mode); the shared driver outlives every request and is never closed here.
#[derive(Clone)]
pub struct RequestContext {
    pub session_id: Uuid,
    pub session: Arc<dyn GraphSession>,
    pub driver: Option<Arc<dyn GraphDriver>>,
}

impl RequestContext {
    pub fn new(session: Arc<dyn GraphSession>, driver: Option<Arc<dyn GraphDriver>>) -> Self {
        Self {
            session_id: Uuid::now_v7(),
            session,
            driver,
        }
    }

    /// Releases the session, then the request-owned driver if any.
    /// Failures are logged and swallowed so they never reach the client.
    pub async fn close(self) {
        if let Err(e) = self.session.close().await {
            tracing::debug!(session_id = %self.session_id, error = %e, "closing session failed");
        }
        if let Some(driver) = self.driver
            && let Err(e) = driver.close().await
        {
            tracing::debug!(session_id = %self.session_id, error = %e, "closing driver failed");
        }
    }
}

/// Owns a [`RequestContext`] until it is closed. If the owner is dropped first
/// (the client went away mid-execution) the close is spawned on the runtime.
pub struct CloseGuard(Option<RequestContext>);

impl CloseGuard {
    pub fn new(context: RequestContext) -> Self {
        Self(Some(context))
    }

    pub async fn close(mut self) {
        if let Some(context) = self.0.take() {
            context.close().await;
        }
    }
}

impl Drop for CloseGuard {
    fn drop(&mut self) {
        let Some(context) = self.0.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(context.close());
            }
            Err(_) => {
                tracing::debug!(session_id = %context.session_id, "no runtime left to close session");
            }
        }
    }
}
