use crate::ids::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod builder;
pub mod network_dag;
pub mod simplifier;

pub use builder::NetworkBuilder;
pub use network_dag::NetworkDag;
pub use simplifier::{LoopPolicy, NetworkSimplifier, SimplifyReport};

/// What an arc carries: a task, or nothing (a zero-duration dependency).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArcLabel<T> {
    Empty,
    Task(T),
}

impl<T> ArcLabel<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, ArcLabel::Empty)
    }

    pub fn task(&self) -> Option<&T> {
        match self {
            ArcLabel::Task(id) => Some(id),
            ArcLabel::Empty => None,
        }
    }
}

pub type ArcKey<N> = (N, N);

/// Activity-on-arc network: an ordered event chain plus labeled arcs.
///
/// Arcs are kept in a `BTreeMap`, so every scan visits them in
/// lexicographic `(source, destination)` order.
#[derive(Debug, Clone, PartialEq)]
pub struct Network<N, T> {
    events: Vec<N>,
    arcs: BTreeMap<ArcKey<N>, ArcLabel<T>>,
}

impl<N, T> Default for Network<N, T> {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            arcs: BTreeMap::new(),
        }
    }
}

impl<N: NodeId, T> Network<N, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[N] {
        &self.events
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn first_event(&self) -> Option<N> {
        self.events.first().copied()
    }

    pub fn last_event(&self) -> Option<N> {
        self.events.last().copied()
    }

    pub fn position(&self, event: N) -> Option<usize> {
        self.events.iter().position(|e| *e == event)
    }

    pub fn contains_event(&self, event: N) -> bool {
        self.position(event).is_some()
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// All arcs in key order.
    pub fn arcs(&self) -> impl Iterator<Item = (N, N, &ArcLabel<T>)> + '_ {
        self.arcs.iter().map(|(&(from, to), label)| (from, to, label))
    }

    pub fn outgoing(&self, event: N) -> impl Iterator<Item = (N, &ArcLabel<T>)> + '_ {
        self.arcs()
            .filter(move |(from, _, _)| *from == event)
            .map(|(_, to, label)| (to, label))
    }

    pub fn incoming(&self, event: N) -> impl Iterator<Item = (N, &ArcLabel<T>)> + '_ {
        self.arcs()
            .filter(move |(_, to, _)| *to == event)
            .map(|(from, _, label)| (from, label))
    }

    pub fn label(&self, from: N, to: N) -> Option<&ArcLabel<T>> {
        self.arcs.get(&(from, to))
    }

    pub fn arc_exists(&self, from: N, to: N) -> bool {
        self.arcs.contains_key(&(from, to))
    }

    pub fn arc_is_empty(&self, from: N, to: N) -> bool {
        self.label(from, to).is_some_and(ArcLabel::is_empty)
    }

    pub fn is_source(&self, event: N) -> bool {
        self.arcs.keys().any(|(from, _)| *from == event)
    }

    pub fn is_target(&self, event: N) -> bool {
        self.arcs.keys().any(|(_, to)| *to == event)
    }

    /// First event `P` (in arc order) with a task arc `P -> first` and any
    /// arc `P -> second`.
    pub fn shared_parent(&self, first: N, second: N) -> Option<N> {
        self.incoming(first)
            .filter(|(_, label)| !label.is_empty())
            .map(|(parent, _)| parent)
            .find(|parent| self.arc_exists(*parent, second))
    }

    /// Appends an event to the end of the chain. Returns `false` if the
    /// event is already present.
    pub fn push_event(&mut self, event: N) -> bool {
        if self.contains_event(event) {
            return false;
        }
        self.events.push(event);
        true
    }

    pub fn remove_event_at(&mut self, index: usize) -> N {
        self.events.remove(index)
    }

    pub fn retain_events(&mut self, keep: impl FnMut(&N) -> bool) {
        self.events.retain(keep);
    }

    /// Sets the label of `from -> to`, returning the label it replaced.
    /// Both endpoints must already be events of the chain.
    pub fn insert_arc(&mut self, from: N, to: N, label: ArcLabel<T>) -> Option<ArcLabel<T>> {
        debug_assert!(
            self.contains_event(from) && self.contains_event(to),
            "arc {from:?} -> {to:?} has an endpoint outside the event chain"
        );
        self.arcs.insert((from, to), label)
    }

    pub fn remove_arc(&mut self, from: N, to: N) -> Option<ArcLabel<T>> {
        self.arcs.remove(&(from, to))
    }

    pub fn retain_arcs(&mut self, mut keep: impl FnMut(N, N, &ArcLabel<T>) -> bool) {
        self.arcs.retain(|&(from, to), label| keep(from, to, label));
    }
}

/// One line per arc: `source -> destination`, followed by the task id for
/// labeled arcs.
impl<N: NodeId + fmt::Display, T: fmt::Display> fmt::Display for Network<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (from, to, label) in self.arcs() {
            write!(f, "{from} -> {to}")?;
            if let ArcLabel::Task(id) = label {
                write!(f, " {id}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
