use aoa_network::{
    Analysis, LoopPolicy, NetworkDag, Project, Task, load_project_from_json, load_tasks_from_csv,
    sample::sample_tasks, save_analysis_to_json, save_project_to_json, save_tasks_to_csv,
};
use std::fs;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("aoa_network=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

fn parse_pred_list(s: &str) -> Result<Vec<u32>, String> {
    s.split(',')
        .filter(|p| !p.trim().is_empty())
        .map(|p| {
            p.trim()
                .parse::<u32>()
                .map_err(|e| format!("invalid predecessor id '{}': {e}", p.trim()))
        })
        .collect()
}

fn parse_durations(min_s: &str, max_s: &str) -> Option<(f64, f64)> {
    Some((min_s.parse().ok()?, max_s.parse().ok()?))
}

fn upsert_and_show(project: &mut Project, task: Task<u32>) -> bool {
    match project.upsert_task(task) {
        Ok(()) => {
            println!("Task upserted.");
            println!("{}", render_tasks_as_text_table(project.tasks()));
            true
        }
        Err(e) => {
            println!("Error: {}", e);
            false
        }
    }
}

fn join_ids(ids: impl Iterator<Item = u32>, separator: &str) -> String {
    ids.map(|id| id.to_string()).collect::<Vec<_>>().join(separator)
}

fn render_tasks_as_text_table(tasks: &[Task<u32>]) -> String {
    let header = ["id", "required", "min", "max"];
    let rows: Vec<[String; 4]> = tasks
        .iter()
        .map(|task| {
            [
                task.id.to_string(),
                join_ids(task.required.iter().copied(), ","),
                task.min_duration.to_string(),
                task.max_duration.to_string(),
            ]
        })
        .collect();

    // Compute column widths
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.len());
        }
    }

    // Build horizontal separator
    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: &[&str]| {
        let mut line = String::from("|");
        for (ci, cell) in cells.iter().enumerate() {
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(widths[ci] - cell.len()));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&header));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&render_row(&cells));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show current task list\n  sample                             Load the eight-task sample project\n  new <min> <max> [preds_csv]        Add a task with the next free id\n  add <id> <min> <max> [preds_csv]   Upsert a task (preds like 1,2,3)\n  delete <id>                        Delete a task and clean up requirements\n  start <id>                         Set the start event id\n  policy <literal|stable>            Choose the simplifier loop policy\n  simplify <on|off>                  Toggle simplification\n  network <raw|simplified>           Print the network, one arc per line\n  compute                            Build, simplify and find the critical path\n  dot <path>                         Write the simplified network as DOT\n  save <json|csv> <path>             Persist project to disk\n  load <json|csv> <path>             Load project from disk\n  export <path>                      Write the last analysis as JSON\n  quit|exit                          Exit"
    );
}

fn print_analysis(analysis: &Analysis) {
    let path = &analysis.critical_path;
    println!("Computed ({})", analysis.to_cli_summary());
    println!("Critical path: {}", join_ids(path.events.iter().copied(), " -> "));
    println!("Critical tasks: {}", join_ids(path.tasks.iter().copied(), ", "));
    println!("Total duration: {}", path.total_duration);
}

fn main() {
    init_logging();

    let mut project = Project::new();
    let mut last_analysis: Option<Analysis> = None;

    println!("Activity Network (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => println!("{}", render_tasks_as_text_table(project.tasks())),
            "sample" => {
                let config = project.config().clone();
                match Project::from_tasks(config, sample_tasks()) {
                    Ok(loaded) => {
                        project = loaded;
                        last_analysis = None;
                        println!("Loaded sample project ({} tasks).", project.tasks().len());
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "add" => {
                let id_s = parts.next();
                let min_s = parts.next();
                let max_s = parts.next();
                let preds_s = parts.next();
                match (id_s, min_s, max_s) {
                    (Some(id_s), Some(min_s), Some(max_s)) => {
                        let id: u32 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        let Some((min, max)) = parse_durations(min_s, max_s) else {
                            println!("Invalid duration");
                            continue;
                        };
                        let preds = match preds_s.map(parse_pred_list).transpose() {
                            Ok(preds) => preds.unwrap_or_default(),
                            Err(e) => {
                                println!("Error: {}", e);
                                continue;
                            }
                        };
                        if upsert_and_show(&mut project, Task::new(id, preds, min, max)) {
                            last_analysis = None;
                        }
                    }
                    _ => println!("Usage: add <id> <min> <max> [preds_csv]"),
                }
            }
            "new" => {
                let min_s = parts.next();
                let max_s = parts.next();
                let preds_s = parts.next();
                let Some((min, max)) = min_s.zip(max_s).and_then(|(a, b)| parse_durations(a, b))
                else {
                    println!("Usage: new <min> <max> [preds_csv]");
                    continue;
                };
                let preds = match preds_s.map(parse_pred_list).transpose() {
                    Ok(preds) => preds.unwrap_or_default(),
                    Err(e) => {
                        println!("Error: {}", e);
                        continue;
                    }
                };
                let id = project.next_id();
                if upsert_and_show(&mut project, Task::new(id, preds, min, max)) {
                    last_analysis = None;
                    println!("Added task id={}", id);
                }
            }
            "delete" => match parts.next().map(str::parse::<u32>) {
                Some(Ok(id)) => {
                    if project.delete_task(id) {
                        last_analysis = None;
                        println!("Deleted task {id}.");
                    } else {
                        println!("Task {id} not found.");
                    }
                }
                Some(Err(_)) => println!("Invalid id"),
                None => println!("Usage: delete <id>"),
            },
            "start" => match parts.next().map(str::parse::<u32>) {
                Some(Ok(id)) => {
                    let mut config = project.config().clone();
                    config.start_event = id;
                    project.set_config(config);
                    println!("Start event set to {id}.");
                }
                _ => println!("Usage: start <id>"),
            },
            "policy" => {
                let policy = match parts.next() {
                    Some("literal") => LoopPolicy::StopAfterShrink,
                    Some("stable") => LoopPolicy::UntilStable,
                    _ => {
                        println!("Usage: policy <literal|stable>");
                        continue;
                    }
                };
                let mut config = project.config().clone();
                config.loop_policy = policy;
                project.set_config(config);
                println!("Loop policy set to {:?}.", policy);
            }
            "simplify" => {
                let enabled = match parts.next() {
                    Some("on") => true,
                    Some("off") => false,
                    _ => {
                        println!("Usage: simplify <on|off>");
                        continue;
                    }
                };
                let mut config = project.config().clone();
                config.simplify = enabled;
                project.set_config(config);
                println!("Simplification {}.", if enabled { "enabled" } else { "disabled" });
            }
            "network" => {
                let which = parts.next().unwrap_or("simplified");
                match which {
                    "raw" => match project.build_network() {
                        Ok(network) => print!("{}", network),
                        Err(e) => println!("Error: {}", e),
                    },
                    "simplified" => match project.analyze() {
                        Ok(analysis) => print!("{}", analysis.simplified),
                        Err(e) => println!("Error: {}", e),
                    },
                    _ => println!("Usage: network <raw|simplified>"),
                }
            }
            "compute" => match project.analyze() {
                Ok(analysis) => {
                    print_analysis(&analysis);
                    last_analysis = Some(analysis);
                }
                Err(e) => println!("Compute error: {}", e),
            },
            "dot" => {
                let Some(path) = parts.next() else {
                    println!("Usage: dot <path>");
                    continue;
                };
                match project.analyze() {
                    Ok(analysis) => {
                        let dot = NetworkDag::build(&analysis.simplified).to_dot();
                        match fs::write(path, dot) {
                            Ok(()) => println!("DOT written to {path}."),
                            Err(e) => println!("Error writing DOT: {}", e),
                        }
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "save" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match save_project_to_json(&project, path) {
                        Ok(()) => println!("Project saved to {path}."),
                        Err(e) => println!("Error saving JSON: {}", e),
                    },
                    (Some("csv"), Some(path)) => match save_tasks_to_csv(project.tasks(), path) {
                        Ok(()) => println!("Project saved to {path}."),
                        Err(e) => println!("Error saving CSV: {}", e),
                    },
                    _ => println!("Usage: save <json|csv> <path>"),
                }
            }
            "load" => {
                let fmt = parts.next();
                let path = parts.next();
                let loaded = match (fmt, path) {
                    (Some("json"), Some(path)) => load_project_from_json(path),
                    (Some("csv"), Some(path)) => load_tasks_from_csv(path).and_then(|tasks| {
                        Ok(Project::from_tasks(project.config().clone(), tasks)?)
                    }),
                    _ => {
                        println!("Usage: load <json|csv> <path>");
                        continue;
                    }
                };
                match loaded {
                    Ok(loaded) => {
                        project = loaded;
                        last_analysis = None;
                        println!("Project loaded from {}.", path.unwrap_or_default());
                        println!("{}", render_tasks_as_text_table(project.tasks()));
                    }
                    Err(e) => println!("Error loading project: {}", e),
                }
            }
            "export" => {
                let Some(path) = parts.next() else {
                    println!("Usage: export <path>");
                    continue;
                };
                match &last_analysis {
                    Some(analysis) => match save_analysis_to_json(analysis, path) {
                        Ok(()) => println!("Analysis exported to {path}."),
                        Err(e) => println!("Error exporting analysis: {}", e),
                    },
                    None => println!("Run 'compute' before exporting."),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
