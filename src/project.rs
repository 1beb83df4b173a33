use crate::calculations::{CriticalPath, CriticalPathSolver};
use crate::config::AnalysisConfig;
use crate::graph::{Network, NetworkBuilder, NetworkDag, NetworkSimplifier, SimplifyReport};
use crate::task::Task;
use crate::task_validation::{self, TaskValidationError};
use thiserror::Error;
use tracing::{info, warn};

pub type ProjectNetwork = Network<u32, u32>;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error(transparent)]
    InvalidTask(#[from] TaskValidationError),
    #[error("start event {start} leaves no room for {tasks} more events")]
    EventRange { start: u32, tasks: usize },
    #[error("network contains a cycle")]
    Cyclic,
    #[error("no path from the first to the last event")]
    NoPath,
}

/// Result of one build / simplify / solve run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub raw: ProjectNetwork,
    pub simplified: ProjectNetwork,
    /// `None` when simplification is switched off.
    pub report: Option<SimplifyReport>,
    pub critical_path: CriticalPath<u32, u32>,
}

impl Analysis {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!(
            "events={}->{}",
            self.raw.event_count(),
            self.simplified.event_count()
        ));
        parts.push(format!(
            "arcs={}->{}",
            self.raw.arc_count(),
            self.simplified.arc_count()
        ));
        if let Some(report) = &self.report {
            parts.push(format!("passes={}", report.passes));
        }
        parts.push(format!("total={}", self.critical_path.total_duration));
        parts.join(", ")
    }
}

/// Ordered task list plus the settings used to analyze it.
#[derive(Debug, Clone, Default)]
pub struct Project {
    tasks: Vec<Task<u32>>,
    config: AnalysisConfig,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(config: AnalysisConfig, tasks: Vec<Task<u32>>) -> Result<Self, ProjectError> {
        task_validation::validate_task_collection(&tasks)?;
        Ok(Self { tasks, config })
    }

    pub fn tasks(&self) -> &[Task<u32>] {
        &self.tasks
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AnalysisConfig) {
        self.config = config;
    }

    pub fn next_id(&self) -> u32 {
        self.tasks
            .iter()
            .map(|task| task.id)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }

    /// Replaces the task with the same id in place, or appends it.
    pub fn upsert_task(&mut self, task: Task<u32>) -> Result<(), ProjectError> {
        task_validation::validate_task(&task)?;
        match self.tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
        Ok(())
    }

    /// Removes a task and drops it from every other task's required set.
    pub fn delete_task(&mut self, id: u32) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        if self.tasks.len() == before {
            return false;
        }
        for task in &mut self.tasks {
            task.required.remove(&id);
        }
        true
    }

    pub fn build_network(&self) -> Result<ProjectNetwork, ProjectError> {
        let start = self.config.start_event;
        NetworkBuilder::new(&self.tasks)
            .build(start)
            .ok_or(ProjectError::EventRange {
                start,
                tasks: self.tasks.len(),
            })
    }

    pub fn analyze(&self) -> Result<Analysis, ProjectError> {
        task_validation::validate_task_collection(&self.tasks)?;
        for issue in task_validation::ordering_issues(&self.tasks) {
            warn!(%issue, "prerequisite cannot be placed, task will start at the first event");
        }

        let raw = self.build_network()?;
        let mut simplified = raw.clone();
        let report = self.config.simplify.then(|| {
            NetworkSimplifier::new(&mut simplified)
                .with_policy(self.config.loop_policy)
                .execute()
        });

        // The exhaustive search only terminates on an acyclic network
        if !NetworkDag::build(&simplified).is_acyclic() {
            return Err(ProjectError::Cyclic);
        }
        let critical_path = CriticalPathSolver::new(&simplified, &self.tasks)
            .solve()
            .ok_or(ProjectError::NoPath)?;

        info!(
            tasks = self.tasks.len(),
            events = simplified.event_count(),
            arcs = simplified.arc_count(),
            total = critical_path.total_duration,
            "analysis complete"
        );

        Ok(Analysis {
            raw,
            simplified,
            report,
            critical_path,
        })
    }
}
