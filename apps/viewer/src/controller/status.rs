//! Loading flag shared between a controller and the view rendering it.

use serde::Serialize;
use shared::error::ApiError;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewStatus {
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

/// Two-state machine: starts loading, becomes ready exactly once when the
/// primary fetch settles, whether that fetch succeeded or failed.
pub struct LoadingFlag {
    tx: watch::Sender<ViewStatus>,
}

impl LoadingFlag {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ViewStatus {
            loading: true,
            error: None,
        });
        Self { tx }
    }

    pub fn error(&self) -> Option<ApiError> {
        self.tx.borrow().error.clone()
    }

    pub fn status(&self) -> ViewStatus {
        self.tx.borrow().clone()
    }

    /// Returns false if the flag had already settled.
    pub fn settle(&self, error: Option<ApiError>) -> bool {
        self.tx.send_if_modified(|status| {
            if !status.loading {
                return false;
            }
            status.loading = false;
            status.error = error;
            true
        })
    }

    pub async fn wait_ready(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|status| !status.loading).await;
    }
}

impl Default for LoadingFlag {
    fn default() -> Self {
        Self::new()
    }
}
