use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{FileId, RunId, StepId, StepRunId, WorkflowId};

fn text<'a>(attributes: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    attributes.get(key).and_then(Value::as_str)
}

macro_rules! record {
    ($name:ident, $id:ty { $($attr:ident),* }) => {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub id: $id,
            #[serde(flatten)]
            pub attributes: Map<String, Value>,
        }

        impl $name {
            $(
                pub fn $attr(&self) -> Option<&str> {
                    text(&self.attributes, stringify!($attr))
                }
            )*
        }
    };
}

record!(WorkflowRun, RunId { name, status, datetime_created });
record!(StepRun, StepRunId { name, status });
record!(Workflow, WorkflowId { name });
record!(Step, StepId { name, command });
record!(FileDataObject, FileId { name, datetime_created });
record!(DataSourceRecord, String { source_description });
record!(FileStorageLocation, String { url, status });

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRunsResponse {
    pub runs: Vec<WorkflowRun>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceRecordsResponse {
    pub data_source_records: Vec<DataSourceRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStorageLocationsResponse {
    pub file_storage_locations: Vec<FileStorageLocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRunsResponse {
    pub workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowsResponse {
    pub workflows: Vec<Workflow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDataObjectsResponse {
    pub file_data_objects: Vec<FileDataObject>,
}
