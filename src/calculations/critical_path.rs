use crate::graph::{ArcLabel, Network};
use crate::ids::NodeId;
use crate::task::Task;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::debug;

/// Longest first-to-last path through a network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalPath<N, T> {
    pub events: Vec<N>,
    /// Tasks on the traversed arcs, in path order; empty arcs are omitted.
    pub tasks: Vec<T>,
    pub total_duration: f64,
}

struct Branch<N, T> {
    to: N,
    task: Option<T>,
    duration: f64,
}

struct Frame<N, T> {
    event: N,
    via: Option<T>,
    sum: f64,
    next_branch: usize,
}

/// Exhaustive depth-first search over every path from the first event,
/// weighting each task arc with the task's maximum duration.
///
/// Runs in time exponential in the branching of the network, which is fine
/// for networks of a few dozen events. The network must be acyclic; the
/// search does not terminate otherwise.
pub struct CriticalPathSolver<'a, N, T: Ord> {
    network: &'a Network<N, T>,
    tasks: &'a [Task<T>],
}

impl<'a, N: NodeId, T: Ord + Clone + Debug> CriticalPathSolver<'a, N, T> {
    pub fn new(network: &'a Network<N, T>, tasks: &'a [Task<T>]) -> Self {
        Self { network, tasks }
    }

    /// Maximum duration of the first task with this id, or 0 if none.
    pub fn max_duration_of(&self, id: &T) -> f64 {
        self.tasks
            .iter()
            .find(|task| &task.id == id)
            .map_or(0.0, |task| task.max_duration)
    }

    /// Ties keep the path found first; branches are explored in arc order.
    /// `None` if the network has no events or the last event is unreachable.
    pub fn solve(&self) -> Option<CriticalPath<N, T>> {
        let first = self.network.first_event()?;
        let last = self.network.last_event()?;
        let adjacency = self.build_adjacency();

        let mut best: Option<CriticalPath<N, T>> = None;
        let mut stack = vec![Frame {
            event: first,
            via: None,
            sum: 0.0,
            next_branch: 0,
        }];

        while let Some(top) = stack.len().checked_sub(1) {
            let (event, sum, next_branch) = {
                let frame = &stack[top];
                (frame.event, frame.sum, frame.next_branch)
            };

            if event == last {
                if best.as_ref().is_none_or(|current| sum > current.total_duration) {
                    let path = CriticalPath {
                        events: stack.iter().map(|frame| frame.event).collect(),
                        tasks: stack.iter().filter_map(|frame| frame.via.clone()).collect(),
                        total_duration: sum,
                    };
                    debug!(events = ?path.events, total = sum, "new longest path");
                    best = Some(path);
                }
                stack.pop();
                continue;
            }

            let branches = adjacency.get(&event).map(Vec::as_slice).unwrap_or_default();
            match branches.get(next_branch) {
                Some(branch) => {
                    stack[top].next_branch += 1;
                    stack.push(Frame {
                        event: branch.to,
                        via: branch.task.clone(),
                        sum: sum + branch.duration,
                        next_branch: 0,
                    });
                }
                None => {
                    stack.pop();
                }
            }
        }

        best
    }

    fn build_adjacency(&self) -> BTreeMap<N, Vec<Branch<N, T>>> {
        let mut durations: BTreeMap<&T, f64> = BTreeMap::new();
        for task in self.tasks {
            durations.entry(&task.id).or_insert(task.max_duration);
        }

        let mut adjacency: BTreeMap<N, Vec<Branch<N, T>>> = BTreeMap::new();
        for (from, to, label) in self.network.arcs() {
            let (task, duration) = match label {
                ArcLabel::Task(id) => (Some(id.clone()), durations.get(id).copied().unwrap_or(0.0)),
                ArcLabel::Empty => (None, 0.0),
            };
            adjacency.entry(from).or_default().push(Branch { to, task, duration });
        }
        adjacency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(arcs: &[(u32, u32, Option<u32>)], events: &[u32]) -> Network<u32, u32> {
        let mut network = Network::new();
        for event in events {
            network.push_event(*event);
        }
        for (from, to, task) in arcs {
            network.insert_arc(*from, *to, task.map_or(ArcLabel::Empty, ArcLabel::Task));
        }
        network
    }

    #[test]
    fn picks_longest_branch() {
        let tasks = vec![Task::new(1, [], 1.0, 3.0), Task::new(2, [], 1.0, 5.0)];
        let network = chain(&[(0, 1, Some(1)), (0, 2, Some(2)), (1, 2, None)], &[0, 1, 2]);

        let path = CriticalPathSolver::new(&network, &tasks).solve().unwrap();
        assert_eq!(path.events, vec![0, 2]);
        assert_eq!(path.tasks, vec![2]);
        assert_eq!(path.total_duration, 5.0);
    }

    #[test]
    fn ties_keep_first_discovered_path() {
        let tasks = vec![Task::new(1, [], 1.0, 4.0), Task::new(2, [], 1.0, 4.0)];
        let network = chain(&[(0, 1, Some(1)), (0, 2, Some(2)), (1, 2, None)], &[0, 1, 2]);

        let path = CriticalPathSolver::new(&network, &tasks).solve().unwrap();
        assert_eq!(path.events, vec![0, 1, 2]);
        assert_eq!(path.tasks, vec![1]);
    }

    #[test]
    fn zero_duration_network_still_yields_a_path() {
        let network = chain(&[(0, 1, None), (1, 2, None)], &[0, 1, 2]);
        let path = CriticalPathSolver::new(&network, &[]).solve().unwrap();
        assert_eq!(path.events, vec![0, 1, 2]);
        assert_eq!(path.total_duration, 0.0);
    }

    #[test]
    fn unknown_task_costs_nothing() {
        let tasks = vec![Task::new(1, [], 1.0, 2.0)];
        let network = chain(&[(0, 1, Some(1)), (1, 2, Some(42))], &[0, 1, 2]);
        let solver = CriticalPathSolver::new(&network, &tasks);
        assert_eq!(solver.max_duration_of(&42), 0.0);
        assert_eq!(solver.solve().unwrap().total_duration, 2.0);
    }

    #[test]
    fn first_task_with_duplicate_id_wins() {
        let tasks = vec![Task::new(1, [], 1.0, 2.0), Task::new(1, [], 1.0, 9.0)];
        let network = chain(&[(0, 1, Some(1))], &[0, 1]);
        let solver = CriticalPathSolver::new(&network, &tasks);
        assert_eq!(solver.max_duration_of(&1), 2.0);
        assert_eq!(solver.solve().unwrap().total_duration, 2.0);
    }

    #[test]
    fn unreachable_last_event_has_no_path() {
        let network = chain(&[(0, 1, Some(1))], &[0, 1, 2]);
        assert!(CriticalPathSolver::new(&network, &[]).solve().is_none());
        let empty: Network<u32, u32> = Network::new();
        assert!(CriticalPathSolver::new(&empty, &[]).solve().is_none());
    }

    #[test]
    fn single_event_is_its_own_path() {
        let network = chain(&[], &[3]);
        let path = CriticalPathSolver::new(&network, &[]).solve().unwrap();
        assert_eq!(path.events, vec![3]);
        assert!(path.tasks.is_empty());
    }
}
