//! File detail view: the file itself plus its provenance and storage locations.

use std::sync::Arc;

use data_service::{ActiveDataStore, DataService, Field};
use shared::domain::FileId;
use tracing::{debug, warn};

use super::{spawn_untracked, status::LoadingFlag};

pub struct FileDetailController {
    pub active_data: Arc<ActiveDataStore>,
    loading: Arc<LoadingFlag>,
}

impl FileDetailController {
    /// Must be called from within a tokio runtime; the fetches run as
    /// independent tasks and this returns immediately.
    pub fn activate(service: &DataService, file_id: FileId) -> Self {
        let active_data = service.get_active_data();
        let loading = Arc::new(LoadingFlag::new());

        {
            let service = service.clone();
            let file_id = file_id.clone();
            let loading = Arc::clone(&loading);
            tokio::spawn(async move {
                let outcome = service.set_active_file(&file_id).await;
                if let Err(err) = &outcome {
                    warn!(%file_id, error = %err, "file detail: primary fetch failed");
                }
                loading.settle(outcome.err().map(|err| err.to_api_error()));
                debug!(%file_id, "file detail: ready");
            });
        }

        let runs_service = service.clone();
        let runs_id = file_id.clone();
        spawn_untracked(Field::FileSourceRuns, async move {
            runs_service.set_active_file_source_runs(&runs_id).await
        });

        let records_service = service.clone();
        let records_id = file_id.clone();
        spawn_untracked(Field::FileSourceRecords, async move {
            records_service
                .set_active_file_source_records(&records_id)
                .await
        });

        let locations_service = service.clone();
        spawn_untracked(Field::FileStorageLocations, async move {
            locations_service
                .set_active_file_storage_locations(&file_id)
                .await
        });

        Self {
            active_data,
            loading,
        }
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }
}
