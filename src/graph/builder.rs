use super::{ArcLabel, Network};
use crate::ids::NodeId;
use crate::task::Task;
use std::fmt::Debug;
use tracing::{debug, trace};

/// Lays an ordered task list out as an activity-on-arc network.
///
/// Tasks must be listed so that every prerequisite comes before its
/// dependents; this is not checked (see `task_validation::ordering_issues`).
pub struct NetworkBuilder<'a, T: Ord> {
    tasks: &'a [Task<T>],
}

impl<'a, T: Ord + Clone + Debug> NetworkBuilder<'a, T> {
    pub fn new(tasks: &'a [Task<T>]) -> Self {
        Self { tasks }
    }

    /// Builds with the chain starting at `N::sentinel()`.
    pub fn build_from_sentinel<N: NodeId>(&self) -> Option<Network<N, T>> {
        self.build(N::sentinel())
    }

    /// Returns `None` when `start` has fewer than `tasks.len()` successors
    /// in the identifier domain.
    pub fn build<N: NodeId>(&self, start: N) -> Option<Network<N, T>> {
        // Step 1: chain of N+1 events joined by empty arcs
        let Some(mut network) = self.build_event_chain(start) else {
            debug!(?start, tasks = self.tasks.len(), "identifier domain too small for event chain");
            return None;
        };

        // Step 2: overlay task arcs; a task arc replaces whatever held its pair
        let events = network.events().to_vec();
        for (position, task) in self.tasks.iter().enumerate() {
            let (from, to) = (events[self.source_index(position)], events[position + 1]);
            let replaced = network.insert_arc(from, to, ArcLabel::Task(task.id.clone()));
            debug!(
                task = ?task.id,
                ?from,
                ?to,
                replaced_chain_arc = replaced.is_some(),
                "placed task arc"
            );
        }

        Some(network)
    }

    fn build_event_chain<N: NodeId>(&self, start: N) -> Option<Network<N, T>> {
        let mut network = Network::new();
        let mut current = start;
        network.push_event(current);
        for _ in 0..self.tasks.len() {
            let next = current.successor()?;
            network.push_event(next);
            network.insert_arc(current, next, ArcLabel::Empty);
            current = next;
        }
        Some(network)
    }

    /// Event index of the nearest earlier task this task requires, or 0.
    fn source_index(&self, position: usize) -> usize {
        let task = &self.tasks[position];
        match self.tasks[..position]
            .iter()
            .rposition(|candidate| task.requires(&candidate.id))
        {
            Some(found) => found + 1,
            None => {
                if !task.is_root() {
                    trace!(task = ?task.id, "no earlier prerequisite found, starting at first event");
                }
                0
            }
        }
    }
}
