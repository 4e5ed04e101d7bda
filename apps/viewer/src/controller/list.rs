//! List views. Lists are owned by the controller that fetched them; the
//! shared store never sees them.

use std::{future::Future, sync::Arc};

use data_service::{DataService, FetchError};
use shared::protocol::{FileDataObject, Workflow, WorkflowRun};
use tokio::sync::RwLock;
use tracing::warn;

use super::status::LoadingFlag;

pub struct ListController<T> {
    items: Arc<RwLock<Vec<T>>>,
    loading: Arc<LoadingFlag>,
}

impl<T> ListController<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn spawn<F, Fut>(service: &DataService, label: &'static str, fetch: F) -> Self
    where
        F: FnOnce(DataService) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Vec<T>, FetchError>> + Send + 'static,
    {
        let items = Arc::new(RwLock::new(Vec::new()));
        let loading = Arc::new(LoadingFlag::new());

        {
            let service = service.clone();
            let items = Arc::clone(&items);
            let loading = Arc::clone(&loading);
            tokio::spawn(async move {
                match fetch(service).await {
                    Ok(fetched) => {
                        *items.write().await = fetched;
                        loading.settle(None);
                    }
                    Err(err) => {
                        warn!(list = label, error = %err, "list: fetch failed");
                        loading.settle(Some(err.to_api_error()));
                    }
                }
            });
        }

        Self { items, loading }
    }

    pub async fn items(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }
}

impl ListController<WorkflowRun> {
    pub fn runs(service: &DataService) -> Self {
        Self::spawn(service, "runs", |service| async move { service.get_runs().await })
    }
}

impl ListController<Workflow> {
    pub fn workflows(service: &DataService) -> Self {
        Self::spawn(service, "workflows", |service| async move {
            service.get_workflows().await
        })
    }
}

impl ListController<FileDataObject> {
    pub fn files(service: &DataService) -> Self {
        Self::spawn(service, "files", |service| async move {
            service.get_files().await
        })
    }
}
