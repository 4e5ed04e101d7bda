//! Detail views backed by a single store field.

use std::sync::Arc;

use data_service::{ActiveDataStore, DataService, FetchError, Field};
use shared::domain::{RunId, StepId, StepRunId, WorkflowId};
use tracing::warn;

use super::status::LoadingFlag;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailTarget {
    Run(RunId),
    StepRun(StepRunId),
    Workflow(WorkflowId),
    Step(StepId),
}

impl DetailTarget {
    pub fn field(&self) -> Field {
        match self {
            DetailTarget::Run(_) => Field::Run,
            DetailTarget::StepRun(_) => Field::StepRun,
            DetailTarget::Workflow(_) => Field::Workflow,
            DetailTarget::Step(_) => Field::Step,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            DetailTarget::Run(id) => id.as_str(),
            DetailTarget::StepRun(id) => id.as_str(),
            DetailTarget::Workflow(id) => id.as_str(),
            DetailTarget::Step(id) => id.as_str(),
        }
    }

    async fn load(&self, service: &DataService) -> Result<(), FetchError> {
        match self {
            DetailTarget::Run(id) => service.set_active_run(id).await,
            DetailTarget::StepRun(id) => service.set_active_step_run(id).await,
            DetailTarget::Workflow(id) => service.set_active_workflow(id).await,
            DetailTarget::Step(id) => service.set_active_step(id).await,
        }
    }
}

pub struct EntityDetailController {
    pub active_data: Arc<ActiveDataStore>,
    loading: Arc<LoadingFlag>,
}

impl EntityDetailController {
    pub fn activate(service: &DataService, target: DetailTarget) -> Self {
        let active_data = service.get_active_data();
        let loading = Arc::new(LoadingFlag::new());

        {
            let service = service.clone();
            let loading = Arc::clone(&loading);
            tokio::spawn(async move {
                let outcome = target.load(&service).await;
                if let Err(err) = &outcome {
                    warn!(
                        field = %target.field(),
                        id = target.id(),
                        error = %err,
                        "detail: fetch failed"
                    );
                }
                loading.settle(outcome.err().map(|err| err.to_api_error()));
            });
        }

        Self {
            active_data,
            loading,
        }
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }
}
