//! Route parsing for the navigation context. A route names the view to show
//! and carries the identifier that view is about.

use std::str::FromStr;

use anyhow::{anyhow, bail};
use shared::domain::{FileId, RunId, StepId, StepRunId, WorkflowId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    FileDetail(FileId),
    RunDetail(RunId),
    StepRunDetail(StepRunId),
    WorkflowDetail(WorkflowId),
    StepDetail(StepId),
    Runs,
    Workflows,
    Files,
}

impl FromStr for Route {
    type Err = anyhow::Error;

    /// Accepts `/files/42`, `files/42` and hash-style `#/files/42`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let path = raw.trim().trim_start_matches('#');
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            ["files"] => Route::Files,
            ["runs"] => Route::Runs,
            ["workflows"] => Route::Workflows,
            ["files", id] => Route::FileDetail(FileId::new(*id)),
            ["runs", id] => Route::RunDetail(RunId::new(*id)),
            ["step-runs", id] | ["stepruns", id] => Route::StepRunDetail(StepRunId::new(*id)),
            ["workflows", id] => Route::WorkflowDetail(WorkflowId::new(*id)),
            ["steps", id] => Route::StepDetail(StepId::new(*id)),
            [] => bail!("empty route"),
            _ => return Err(anyhow!("unknown route '{raw}'")),
        };
        Ok(route)
    }
}
