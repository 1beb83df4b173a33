use crate::task::Task;
use std::collections::BTreeSet;
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskValidationError {
    #[error("task {id} has non-finite {field} duration")]
    NonFiniteDuration { id: String, field: &'static str },
    #[error("task {id} has negative {field} duration {value}")]
    NegativeDuration {
        id: String,
        field: &'static str,
        value: f64,
    },
    #[error("task {id} has min duration {min} above max duration {max}")]
    InvertedRange { id: String, min: f64, max: f64 },
    #[error("duplicate task id {0}")]
    DuplicateId(String),
}

/// A prerequisite the builder cannot place correctly. The builder still
/// accepts such input and falls back to the start event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderingIssue<T> {
    Unknown { task: T, required: T },
    ListedAfter { task: T, required: T },
}

impl<T: Display> Display for OrderingIssue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderingIssue::Unknown { task, required } => {
                write!(f, "task {task} requires unknown task {required}")
            }
            OrderingIssue::ListedAfter { task, required } => {
                write!(f, "task {task} requires task {required}, which is listed after it")
            }
        }
    }
}

pub fn validate_task<T: Ord + Display>(task: &Task<T>) -> Result<(), TaskValidationError> {
    for (field, value) in [("min", task.min_duration), ("max", task.max_duration)] {
        if !value.is_finite() {
            return Err(TaskValidationError::NonFiniteDuration {
                id: task.id.to_string(),
                field,
            });
        }
        if value < 0.0 {
            return Err(TaskValidationError::NegativeDuration {
                id: task.id.to_string(),
                field,
                value,
            });
        }
    }

    if task.min_duration > task.max_duration {
        return Err(TaskValidationError::InvertedRange {
            id: task.id.to_string(),
            min: task.min_duration,
            max: task.max_duration,
        });
    }

    Ok(())
}

pub fn validate_task_collection<T: Ord + Display>(
    tasks: &[Task<T>],
) -> Result<(), TaskValidationError> {
    let mut seen_ids = BTreeSet::new();
    for task in tasks {
        if !seen_ids.insert(&task.id) {
            return Err(TaskValidationError::DuplicateId(task.id.to_string()));
        }
        validate_task(task)?;
    }
    Ok(())
}

/// Prerequisites that break the builder's "listed before its dependents"
/// precondition, in task order.
pub fn ordering_issues<T: Ord + Clone>(tasks: &[Task<T>]) -> Vec<OrderingIssue<T>> {
    let mut issues = Vec::new();
    for (position, task) in tasks.iter().enumerate() {
        for required in &task.required {
            let Some(found) = tasks.iter().position(|t| &t.id == required) else {
                issues.push(OrderingIssue::Unknown {
                    task: task.id.clone(),
                    required: required.clone(),
                });
                continue;
            };
            if found >= position {
                issues.push(OrderingIssue::ListedAfter {
                    task: task.id.clone(),
                    required: required.clone(),
                });
            }
        }
    }
    issues
}
