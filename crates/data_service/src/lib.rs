use std::sync::Arc;

use serde::de::DeserializeOwned;
use shared::{
    domain::{FileId, RunId, StepId, StepRunId, WorkflowId},
    protocol::{
        DataSourceRecordsResponse, FileDataObject, FileDataObjectsResponse,
        FileStorageLocationsResponse, SourceRunsResponse, Step, StepRun, Workflow, WorkflowRun,
        WorkflowRunsResponse, WorkflowsResponse,
    },
};
use tracing::debug;

pub mod error;
pub mod store;
pub mod transport;

pub use error::FetchError;
pub use store::{ActiveData, ActiveDataStore, Field, StoreEvent, WritePolicy};
pub use transport::{ApiPath, HttpTransport, Transport};

const WORKFLOW_RUNS: &str = "workflow_runs";
const STEP_RUNS: &str = "step_runs";
const WORKFLOWS: &str = "workflows";
const STEPS: &str = "steps";
const FILE_DATA_OBJECTS: &str = "file_data_objects";
const SOURCE_RUNS: &str = "source_runs";
const DATA_SOURCE_RECORDS: &str = "data_source_records";
const FILE_STORAGE_LOCATIONS: &str = "file_storage_locations";

fn ensure_identifier(resource: &'static str, blank: bool) -> Result<(), FetchError> {
    if blank {
        return Err(FetchError::InvalidIdentifier { resource });
    }
    Ok(())
}

#[derive(Clone)]
pub struct DataService {
    transport: Arc<dyn Transport>,
    store: Arc<ActiveDataStore>,
}

impl DataService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_policy(transport, WritePolicy::default())
    }

    pub fn with_policy(transport: Arc<dyn Transport>, policy: WritePolicy) -> Self {
        Self {
            transport,
            store: ActiveDataStore::new(policy),
        }
    }

    pub fn get_active_data(&self) -> Arc<ActiveDataStore> {
        Arc::clone(&self.store)
    }

    pub async fn set_active_run(&self, run_id: &RunId) -> Result<(), FetchError> {
        ensure_identifier("workflow run", run_id.is_blank())?;
        self.set_field(
            Field::Run,
            ApiPath::resource(WORKFLOW_RUNS, run_id.as_str()),
            |data, run: WorkflowRun| data.run = Some(run),
        )
        .await
    }

    pub async fn set_active_step_run(&self, step_run_id: &StepRunId) -> Result<(), FetchError> {
        ensure_identifier("step run", step_run_id.is_blank())?;
        self.set_field(
            Field::StepRun,
            ApiPath::resource(STEP_RUNS, step_run_id.as_str()),
            |data, step_run: StepRun| data.step_run = Some(step_run),
        )
        .await
    }

    pub async fn set_active_workflow(&self, workflow_id: &WorkflowId) -> Result<(), FetchError> {
        ensure_identifier("workflow", workflow_id.is_blank())?;
        self.set_field(
            Field::Workflow,
            ApiPath::resource(WORKFLOWS, workflow_id.as_str()),
            |data, workflow: Workflow| data.workflow = Some(workflow),
        )
        .await
    }

    pub async fn set_active_step(&self, step_id: &StepId) -> Result<(), FetchError> {
        ensure_identifier("step", step_id.is_blank())?;
        self.set_field(
            Field::Step,
            ApiPath::resource(STEPS, step_id.as_str()),
            |data, step: Step| data.step = Some(step),
        )
        .await
    }

    pub async fn set_active_file(&self, file_id: &FileId) -> Result<(), FetchError> {
        ensure_identifier("file", file_id.is_blank())?;
        self.set_field(
            Field::File,
            ApiPath::resource(FILE_DATA_OBJECTS, file_id.as_str()),
            |data, file: FileDataObject| data.file = Some(file),
        )
        .await
    }

    pub async fn set_active_file_source_runs(&self, file_id: &FileId) -> Result<(), FetchError> {
        ensure_identifier("file", file_id.is_blank())?;
        self.set_field(
            Field::FileSourceRuns,
            ApiPath::sub_resource(FILE_DATA_OBJECTS, file_id.as_str(), SOURCE_RUNS),
            |data, response: SourceRunsResponse| data.file_source_runs = Some(response.runs),
        )
        .await
    }

    pub async fn set_active_file_source_records(&self, file_id: &FileId) -> Result<(), FetchError> {
        ensure_identifier("file", file_id.is_blank())?;
        self.set_field(
            Field::FileSourceRecords,
            ApiPath::sub_resource(FILE_DATA_OBJECTS, file_id.as_str(), DATA_SOURCE_RECORDS),
            |data, response: DataSourceRecordsResponse| {
                data.file_source_records = Some(response.data_source_records)
            },
        )
        .await
    }

    pub async fn set_active_file_storage_locations(
        &self,
        file_id: &FileId,
    ) -> Result<(), FetchError> {
        ensure_identifier("file", file_id.is_blank())?;
        self.set_field(
            Field::FileStorageLocations,
            ApiPath::sub_resource(FILE_DATA_OBJECTS, file_id.as_str(), FILE_STORAGE_LOCATIONS),
            |data, response: FileStorageLocationsResponse| {
                data.file_storage_locations = Some(response.file_storage_locations)
            },
        )
        .await
    }

    pub async fn get_runs(&self) -> Result<Vec<WorkflowRun>, FetchError> {
        let response: WorkflowRunsResponse =
            self.fetch(&ApiPath::collection(WORKFLOW_RUNS)).await?;
        Ok(response.workflow_runs)
    }

    pub async fn get_workflows(&self) -> Result<Vec<Workflow>, FetchError> {
        let response: WorkflowsResponse = self.fetch(&ApiPath::collection(WORKFLOWS)).await?;
        Ok(response.workflows)
    }

    pub async fn get_files(&self) -> Result<Vec<FileDataObject>, FetchError> {
        let response: FileDataObjectsResponse =
            self.fetch(&ApiPath::collection(FILE_DATA_OBJECTS)).await?;
        Ok(response.file_data_objects)
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &ApiPath) -> Result<T, FetchError> {
        let body = self.transport.get_json(path).await?;
        serde_json::from_value(body).map_err(|source| FetchError::Decode {
            path: path.to_string(),
            source,
        })
    }

    async fn set_field<T, F>(&self, field: Field, path: ApiPath, write: F) -> Result<(), FetchError>
    where
        T: DeserializeOwned,
        F: FnOnce(&mut ActiveData, T),
    {
        let ticket = self.store.issue(field);
        debug!(
            %field,
            %path,
            generation = ticket.generation(),
            "data_service: fetch issued"
        );

        let value = match self.fetch::<T>(&path).await {
            Ok(value) => value,
            Err(err) => {
                debug!(%field, %path, error = %err, "data_service: fetch failed; store unchanged");
                return Err(err);
            }
        };

        self.store.apply(ticket, |data| write(data, value)).await;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
