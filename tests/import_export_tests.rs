use aoa_network::{
    AnalysisConfig, LoopPolicy, PersistenceError, Project, Task, load_project_from_json,
    load_tasks_from_csv, sample::sample_tasks, save_analysis_to_json, save_project_to_json,
    save_tasks_to_csv,
};
use std::fs;
use tempfile::NamedTempFile;

fn sample_project() -> Project {
    let config = AnalysisConfig {
        start_event: 100,
        simplify: true,
        loop_policy: LoopPolicy::UntilStable,
    };
    Project::from_tasks(config, sample_tasks()).unwrap()
}

#[test]
fn json_round_trip_preserves_tasks_and_config() {
    let project = sample_project();
    let tmp = NamedTempFile::new().expect("create temp file");

    save_project_to_json(&project, tmp.path()).unwrap();
    let loaded = load_project_from_json(tmp.path()).unwrap();

    assert_eq!(loaded.tasks(), project.tasks());
    assert_eq!(loaded.config(), project.config());
}

#[test]
fn json_without_config_uses_defaults() {
    let tmp = NamedTempFile::new().expect("create temp file");
    fs::write(
        tmp.path(),
        r#"{"tasks":[{"id":1,"min_duration":1.0,"max_duration":2.0},
                     {"id":2,"required":[1],"min_duration":2.0,"max_duration":3.0}]}"#,
    )
    .unwrap();

    let loaded = load_project_from_json(tmp.path()).unwrap();
    assert_eq!(loaded.config(), &AnalysisConfig::default());
    assert_eq!(loaded.tasks()[1].required.iter().copied().collect::<Vec<_>>(), vec![1]);
    assert_eq!(loaded.analyze().unwrap().critical_path.total_duration, 5.0);
}

#[test]
fn csv_round_trip_keeps_task_order() {
    let tasks = sample_tasks();
    let tmp = NamedTempFile::new().expect("create temp file");

    save_tasks_to_csv(&tasks, tmp.path()).unwrap();
    let contents = fs::read_to_string(tmp.path()).unwrap();
    assert!(contents.starts_with("id,required,min_duration,max_duration"));
    assert!(contents.contains("7,\"3,4,5\",8.0,12.0"));

    let loaded = load_tasks_from_csv(tmp.path()).unwrap();
    assert_eq!(loaded, tasks);
}

#[test]
fn csv_with_bad_requirement_is_rejected() {
    let tmp = NamedTempFile::new().expect("create temp file");
    fs::write(
        tmp.path(),
        "id,required,min_duration,max_duration\n1,,1.0,2.0\n2,x,1.0,2.0\n",
    )
    .unwrap();

    let err = load_tasks_from_csv(tmp.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)), "{err}");
}

#[test]
fn csv_with_inverted_durations_is_rejected() {
    let tmp = NamedTempFile::new().expect("create temp file");
    fs::write(
        tmp.path(),
        "id,required,min_duration,max_duration\n1,,5.0,2.0\n",
    )
    .unwrap();

    let err = load_tasks_from_csv(tmp.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::Validation(_)), "{err}");
}

#[test]
fn empty_csv_is_rejected() {
    let tmp = NamedTempFile::new().expect("create temp file");
    fs::write(tmp.path(), "id,required,min_duration,max_duration\n").unwrap();

    let err = load_tasks_from_csv(tmp.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
}

#[test]
fn duplicate_ids_are_not_saved() {
    let tasks = vec![Task::new(1, [], 1.0, 2.0), Task::new(1, [], 1.0, 2.0)];
    let tmp = NamedTempFile::new().expect("create temp file");

    let err = save_tasks_to_csv(&tasks, tmp.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::Validation(_)));
}

#[test]
fn analysis_export_lists_both_networks() {
    let analysis = Project::from_tasks(AnalysisConfig::default(), sample_tasks())
        .unwrap()
        .analyze()
        .unwrap();
    let tmp = NamedTempFile::new().expect("create temp file");

    save_analysis_to_json(&analysis, tmp.path()).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tmp.path()).unwrap()).unwrap();

    assert_eq!(value["raw"]["arcs"].as_array().unwrap().len(), 15);
    assert_eq!(value["simplified"]["arcs"].as_array().unwrap().len(), 12);
    assert_eq!(value["simplified"]["arcs"][0]["task"], 1);
    assert!(value["simplified"]["arcs"][3].get("task").is_none());
    assert_eq!(value["report"]["passes"], 1);
    assert_eq!(value["critical_path"]["total_duration"], 29.0);
    assert_eq!(
        value["critical_path"]["events"],
        serde_json::json!([0, 1, 4, 5, 8])
    );
}
