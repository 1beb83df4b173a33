pub mod calculations;
pub mod config;
pub mod graph;
pub mod ids;
pub mod persistence;
pub mod project;
pub mod sample;
pub mod task;
pub mod task_validation;

pub use calculations::{CriticalPath, CriticalPathSolver};
pub use config::AnalysisConfig;
pub use graph::{
    ArcLabel, LoopPolicy, Network, NetworkBuilder, NetworkDag, NetworkSimplifier, SimplifyReport,
};
pub use ids::NodeId;
pub use persistence::{
    PersistenceError, load_project_from_json, load_tasks_from_csv, save_analysis_to_json,
    save_project_to_json, save_tasks_to_csv, validate_tasks,
};
pub use project::{Analysis, Project, ProjectError, ProjectNetwork};
pub use task::Task;
pub use task_validation::{OrderingIssue, TaskValidationError};
