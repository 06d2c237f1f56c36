//! Advisory pipeline stages
//!
//! An advisory stage runs to completion and records what happened, but its
//! failure never aborts the pipeline.

use crate::error::TacoResult;
use std::future::Future;
use tracing::{debug, warn};

/// Recorded result of one advisory stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryOutcome {
    /// Stage name
    pub stage: &'static str,
    /// Failure message, `None` on success
    pub error: Option<String>,
}

impl AdvisoryOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Run `work` as an advisory stage
pub async fn run_advisory<F>(stage: &'static str, work: F) -> AdvisoryOutcome
where
    F: Future<Output = TacoResult<()>>,
{
    match work.await {
        Ok(()) => {
            debug!("Advisory stage {} completed", stage);
            AdvisoryOutcome { stage, error: None }
        }
        Err(e) => {
            warn!("{} failed, continuing: {}", stage, e);
            AdvisoryOutcome {
                stage,
                error: Some(e.to_string()),
            }
        }
    }
}
