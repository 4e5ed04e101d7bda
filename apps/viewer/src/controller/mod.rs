//! Controller layer: one controller per route, each driving the data service
//! and exposing a loading flag to the view.

pub mod entity_detail;
pub mod file_detail;
pub mod list;
pub mod status;

use std::future::Future;

use data_service::{DataService, FetchError, Field};
use serde_json::{json, Value};
use shared::protocol::{FileDataObject, Workflow, WorkflowRun};
use tracing::warn;

use crate::navigation::Route;

pub use entity_detail::{DetailTarget, EntityDetailController};
pub use file_detail::FileDetailController;
pub use list::ListController;
pub use status::LoadingFlag;

/// Runs a store fetch whose completion nobody waits on. Failures are logged.
pub(crate) fn spawn_untracked<F>(field: Field, fetch: F)
where
    F: Future<Output = Result<(), FetchError>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = fetch.await {
            warn!(%field, error = %err, "background fetch failed");
        }
    });
}

pub enum ActiveView {
    FileDetail(FileDetailController),
    EntityDetail(EntityDetailController),
    Runs(ListController<WorkflowRun>),
    Workflows(ListController<Workflow>),
    Files(ListController<FileDataObject>),
}

impl ActiveView {
    pub fn activate(route: Route, service: &DataService) -> Self {
        match route {
            Route::FileDetail(file_id) => {
                Self::FileDetail(FileDetailController::activate(service, file_id))
            }
            Route::RunDetail(id) => Self::EntityDetail(EntityDetailController::activate(
                service,
                DetailTarget::Run(id),
            )),
            Route::StepRunDetail(id) => Self::EntityDetail(EntityDetailController::activate(
                service,
                DetailTarget::StepRun(id),
            )),
            Route::WorkflowDetail(id) => Self::EntityDetail(EntityDetailController::activate(
                service,
                DetailTarget::Workflow(id),
            )),
            Route::StepDetail(id) => Self::EntityDetail(EntityDetailController::activate(
                service,
                DetailTarget::Step(id),
            )),
            Route::Runs => Self::Runs(ListController::runs(service)),
            Route::Workflows => Self::Workflows(ListController::workflows(service)),
            Route::Files => Self::Files(ListController::files(service)),
        }
    }

    pub fn loading(&self) -> &LoadingFlag {
        match self {
            ActiveView::FileDetail(c) => c.loading(),
            ActiveView::EntityDetail(c) => c.loading(),
            ActiveView::Runs(c) => c.loading(),
            ActiveView::Workflows(c) => c.loading(),
            ActiveView::Files(c) => c.loading(),
        }
    }

    /// What the view would display right now.
    pub async fn render(&self) -> serde_json::Result<Value> {
        let status = serde_json::to_value(self.loading().status())?;
        let content = match self {
            ActiveView::FileDetail(c) => serde_json::to_value(c.active_data.snapshot().await)?,
            ActiveView::EntityDetail(c) => serde_json::to_value(c.active_data.snapshot().await)?,
            ActiveView::Runs(c) => json!({ "workflow_runs": c.items().await }),
            ActiveView::Workflows(c) => json!({ "workflows": c.items().await }),
            ActiveView::Files(c) => json!({ "file_data_objects": c.items().await }),
        };
        Ok(json!({ "status": status, "data": content }))
    }
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
