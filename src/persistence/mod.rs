use crate::project::ProjectError;
use crate::task::Task;
use crate::task_validation::{self, TaskValidationError};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("invalid task: {0}")]
    Validation(#[from] TaskValidationError),
}

impl From<ProjectError> for PersistenceError {
    fn from(value: ProjectError) -> Self {
        match value {
            ProjectError::InvalidTask(err) => Self::Validation(err),
            other => Self::InvalidData(other.to_string()),
        }
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub fn validate_tasks(tasks: &[Task<u32>]) -> PersistenceResult<()> {
    task_validation::validate_task_collection(tasks)?;
    Ok(())
}

pub mod file;

pub use file::{
    load_project_from_json, load_tasks_from_csv, save_analysis_to_json, save_project_to_json,
    save_tasks_to_csv,
};
