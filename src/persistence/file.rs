use super::{PersistenceError, PersistenceResult};
use crate::calculations::CriticalPath;
use crate::config::AnalysisConfig;
use crate::graph::{Network, SimplifyReport};
use crate::project::{Analysis, Project};
use crate::task::Task;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct ProjectSnapshot {
    #[serde(default)]
    config: AnalysisConfig,
    tasks: Vec<Task<u32>>,
}

impl ProjectSnapshot {
    fn from_project(project: &Project) -> PersistenceResult<Self> {
        super::validate_tasks(project.tasks())?;
        Ok(Self {
            config: project.config().clone(),
            tasks: project.tasks().to_vec(),
        })
    }

    fn into_project(self) -> PersistenceResult<Project> {
        Ok(Project::from_tasks(self.config, self.tasks)?)
    }
}

pub fn save_project_to_json<P: AsRef<Path>>(project: &Project, path: P) -> PersistenceResult<()> {
    let snapshot = ProjectSnapshot::from_project(project)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_project_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Project> {
    let file = File::open(path)?;
    let snapshot: ProjectSnapshot = serde_json::from_reader(file)?;
    snapshot.into_project()
}

#[derive(Default, Serialize, Deserialize)]
struct TaskCsvRecord {
    id: u32,
    #[serde(default)]
    required: String,
    min_duration: f64,
    max_duration: f64,
}

impl From<&Task<u32>> for TaskCsvRecord {
    fn from(task: &Task<u32>) -> Self {
        Self {
            id: task.id,
            required: join_u32(task.required.iter().copied()),
            min_duration: task.min_duration,
            max_duration: task.max_duration,
        }
    }
}

impl TaskCsvRecord {
    fn into_task(self) -> PersistenceResult<Task<u32>> {
        let required = split_u32(&self.required)?;
        Ok(Task::new(self.id, required, self.min_duration, self.max_duration))
    }
}

pub fn save_tasks_to_csv<P: AsRef<Path>>(tasks: &[Task<u32>], path: P) -> PersistenceResult<()> {
    super::validate_tasks(tasks)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for task in tasks {
        writer.serialize(TaskCsvRecord::from(task))?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads tasks in file order, which is the order the builder relies on.
pub fn load_tasks_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Task<u32>>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut tasks = Vec::new();
    for record in reader.deserialize::<TaskCsvRecord>() {
        let record = record?;
        tasks.push(record.into_task()?);
    }

    if tasks.is_empty() {
        return Err(PersistenceError::InvalidData("CSV file contained no tasks".into()));
    }

    super::validate_tasks(&tasks)?;
    Ok(tasks)
}

#[derive(Serialize)]
struct ArcRecord {
    from: u32,
    to: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<u32>,
}

#[derive(Serialize)]
struct NetworkRecord {
    events: Vec<u32>,
    arcs: Vec<ArcRecord>,
}

impl From<&Network<u32, u32>> for NetworkRecord {
    fn from(network: &Network<u32, u32>) -> Self {
        Self {
            events: network.events().to_vec(),
            arcs: network
                .arcs()
                .map(|(from, to, label)| ArcRecord {
                    from,
                    to,
                    task: label.task().copied(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct AnalysisRecord<'a> {
    raw: NetworkRecord,
    simplified: NetworkRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<SimplifyReport>,
    critical_path: &'a CriticalPath<u32, u32>,
}

pub fn save_analysis_to_json<P: AsRef<Path>>(analysis: &Analysis, path: P) -> PersistenceResult<()> {
    let record = AnalysisRecord {
        raw: NetworkRecord::from(&analysis.raw),
        simplified: NetworkRecord::from(&analysis.simplified),
        report: analysis.report,
        critical_path: &analysis.critical_path,
    };
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &record)?;
    Ok(())
}

fn join_u32(values: impl Iterator<Item = u32>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join(",")
}

fn split_u32(input: &str) -> PersistenceResult<Vec<u32>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    input
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| PersistenceError::InvalidData(format!("invalid task id '{part}': {e}")))
        })
        .collect()
}
