use std::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use shared::protocol::{
    DataSourceRecord, FileDataObject, FileStorageLocation, Step, StepRun, Workflow, WorkflowRun,
};
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

const STORE_EVENT_CAPACITY: usize = 256;
const FIELD_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Run,
    StepRun,
    Workflow,
    Step,
    File,
    FileSourceRuns,
    FileSourceRecords,
    FileStorageLocations,
}

impl Field {
    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Run => "run",
            Field::StepRun => "stepRun",
            Field::Workflow => "workflow",
            Field::Step => "step",
            Field::File => "file",
            Field::FileSourceRuns => "fileSourceRuns",
            Field::FileSourceRecords => "fileSourceRecords",
            Field::FileStorageLocations => "fileStorageLocations",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    #[default]
    LastIssued,
    LastCompleted,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown write policy '{0}' (expected last_issued or last_completed)")]
pub struct UnknownWritePolicy(pub String);

impl FromStr for WritePolicy {
    type Err = UnknownWritePolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "last_issued" => Ok(Self::LastIssued),
            "last_completed" => Ok(Self::LastCompleted),
            _ => Err(UnknownWritePolicy(s.to_string())),
        }
    }
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WritePolicy::LastIssued => f.write_str("last_issued"),
            WritePolicy::LastCompleted => f.write_str("last_completed"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<WorkflowRun>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_run: Option<StepRun>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Workflow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<Step>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileDataObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_source_runs: Option<Vec<WorkflowRun>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_source_records: Option<Vec<DataSourceRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_storage_locations: Option<Vec<FileStorageLocation>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreEvent {
    pub field: Field,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteTicket {
    field: Field,
    generation: u64,
}

impl WriteTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

pub struct ActiveDataStore {
    state: RwLock<ActiveData>,
    issued: [AtomicU64; FIELD_COUNT],
    policy: WritePolicy,
    events: broadcast::Sender<StoreEvent>,
}

impl ActiveDataStore {
    pub fn new(policy: WritePolicy) -> Arc<Self> {
        let (events, _) = broadcast::channel(STORE_EVENT_CAPACITY);
        Arc::new(Self {
            state: RwLock::new(ActiveData::default()),
            issued: Default::default(),
            policy,
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ActiveData {
        self.state.read().await.clone()
    }

    pub async fn run(&self) -> Option<WorkflowRun> {
        self.state.read().await.run.clone()
    }

    pub async fn step_run(&self) -> Option<StepRun> {
        self.state.read().await.step_run.clone()
    }

    pub async fn workflow(&self) -> Option<Workflow> {
        self.state.read().await.workflow.clone()
    }

    pub async fn step(&self) -> Option<Step> {
        self.state.read().await.step.clone()
    }

    pub async fn file(&self) -> Option<FileDataObject> {
        self.state.read().await.file.clone()
    }

    pub async fn file_source_runs(&self) -> Option<Vec<WorkflowRun>> {
        self.state.read().await.file_source_runs.clone()
    }

    pub async fn file_source_records(&self) -> Option<Vec<DataSourceRecord>> {
        self.state.read().await.file_source_records.clone()
    }

    pub async fn file_storage_locations(&self) -> Option<Vec<FileStorageLocation>> {
        self.state.read().await.file_storage_locations.clone()
    }

    /// Newest generation handed out for `field`; 0 if nothing was issued yet.
    pub fn latest_generation(&self, field: Field) -> u64 {
        self.issued[field.index()].load(Ordering::SeqCst)
    }

    pub(crate) fn issue(&self, field: Field) -> WriteTicket {
        let generation = self.issued[field.index()].fetch_add(1, Ordering::SeqCst) + 1;
        WriteTicket { field, generation }
    }

    pub(crate) async fn apply<F>(&self, ticket: WriteTicket, write: F) -> bool
    where
        F: FnOnce(&mut ActiveData),
    {
        let mut state = self.state.write().await;
        if self.policy == WritePolicy::LastIssued {
            let latest = self.latest_generation(ticket.field);
            if ticket.generation < latest {
                debug!(
                    field = %ticket.field,
                    generation = ticket.generation,
                    latest,
                    "store: dropping response for superseded request"
                );
                return false;
            }
        }

        write(&mut state);
        drop(state);

        debug!(
            field = %ticket.field,
            generation = ticket.generation,
            "store: field updated"
        );
        let _ = self.events.send(StoreEvent {
            field: ticket.field,
            generation: ticket.generation,
        });
        true
    }
}

impl fmt::Debug for ActiveDataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveDataStore")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
