use super::{ArcKey, ArcLabel, Network};
use crate::ids::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{debug, trace};

/// When the simplifier stops repeating its scan over the event chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPolicy {
    /// Repeat while a pass leaves the event count unchanged; stop after the
    /// first pass that removes an event. A pass that changes nothing also
    /// stops the loop, since repeating it would change nothing either.
    #[default]
    StopAfterShrink,
    /// Repeat until a pass changes nothing.
    UntilStable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimplifyReport {
    pub passes: usize,
    pub merged_events: usize,
    pub rewritten_arcs: usize,
    pub removed_isolated: usize,
    pub removed_self_loops: usize,
}

/// Facts about three consecutive events `A, B, C` that decide whether `B`
/// can be folded into `C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct TripleFacts {
    pub bc_empty: bool,
    pub ab_empty: bool,
    pub ac_exists: bool,
    pub has_shared_parent: bool,
    pub c_is_last: bool,
}

impl TripleFacts {
    pub fn allows_merge(&self) -> bool {
        (!self.has_shared_parent || self.c_is_last)
            && ((self.bc_empty && !self.ac_exists)
                || (self.ab_empty && self.bc_empty && self.ac_exists))
    }

    pub fn allows_rewrite(&self) -> bool {
        self.bc_empty && self.has_shared_parent
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Retarget<N, T> {
    from: ArcKey<N>,
    to: ArcKey<N>,
    label: ArcLabel<T>,
}

#[derive(Debug, Default)]
struct PassOutcome {
    merged: usize,
    rewritten: usize,
}

impl PassOutcome {
    fn changed(&self) -> bool {
        self.merged > 0 || self.rewritten > 0
    }
}

/// Removes events and arcs that carry no scheduling information, in place.
///
/// The longest first-to-last path total (by task duration) is preserved for
/// acyclic networks with non-negative durations.
pub struct NetworkSimplifier<'a, N, T> {
    network: &'a mut Network<N, T>,
    policy: LoopPolicy,
}

impl<'a, N: NodeId, T: Clone + Debug> NetworkSimplifier<'a, N, T> {
    pub fn new(network: &'a mut Network<N, T>) -> Self {
        Self {
            network,
            policy: LoopPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: LoopPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn execute(mut self) -> SimplifyReport {
        let mut report = SimplifyReport::default();
        let events_before = self.network.event_count();

        loop {
            let count_before_pass = self.network.event_count();
            let outcome = self.run_pass();
            report.passes += 1;
            report.merged_events += outcome.merged;
            report.rewritten_arcs += outcome.rewritten;

            if !outcome.changed() {
                break;
            }
            let shrank = self.network.event_count() != count_before_pass;
            if shrank && self.policy == LoopPolicy::StopAfterShrink {
                break;
            }
        }

        report.removed_isolated = self.remove_isolated_events();
        report.removed_self_loops = self.remove_self_loops();

        debug!(
            policy = ?self.policy,
            passes = report.passes,
            events_before,
            events_after = self.network.event_count(),
            arcs_after = self.network.arc_count(),
            "simplified network"
        );
        report
    }

    fn run_pass(&mut self) -> PassOutcome {
        let mut outcome = PassOutcome::default();
        let mut index = 1;

        // The chain shrinks in place; after a merge the same index holds C.
        while index + 1 < self.network.event_count() {
            let events = self.network.events();
            let (a, b, c) = (events[index - 1], events[index], events[index + 1]);
            let parent = self.network.shared_parent(b, c);
            let facts = TripleFacts {
                bc_empty: self.network.arc_is_empty(b, c),
                ab_empty: self.network.arc_is_empty(a, b),
                ac_exists: self.network.arc_exists(a, c),
                has_shared_parent: parent.is_some(),
                c_is_last: index + 2 == self.network.event_count(),
            };
            trace!(?a, ?b, ?c, ?parent, ?facts, "examining triple");

            if facts.allows_merge() {
                if let Some(plan) = self.plan_merge(b, c) {
                    self.apply_merge(plan);
                    self.network.remove_event_at(index);
                    outcome.merged += 1;
                    debug!(removed = ?b, into = ?c, "merged event");
                    continue;
                }
                trace!(?b, ?c, "merge would change path lengths, skipped");
            }

            if let Some(parent) = parent.filter(|_| facts.allows_rewrite()) {
                if self.rewrite_shared_arc(parent, b, c) {
                    outcome.rewritten += 1;
                }
            }

            index += 1;
        }

        outcome
    }

    /// Plans moving every arc that touches `b` onto `c`, in arc order.
    ///
    /// Returns `None` when folding `b` into `c` could lengthen or drop a
    /// path: `c` would inherit both other predecessors and `b`'s other
    /// successors, or a task arc would land on a key that already holds a
    /// task.
    fn plan_merge(&self, b: N, c: N) -> Option<Vec<Retarget<N, T>>> {
        let b_has_other_successors = self
            .network
            .outgoing(b)
            .any(|(to, _)| to != b && to != c);
        let c_has_other_predecessors = self
            .network
            .incoming(c)
            .any(|(from, _)| from != c && from != b);
        if b_has_other_successors && c_has_other_predecessors {
            return None;
        }

        let remap = |event: N| if event == b { c } else { event };
        let mut plan = Vec::new();
        for (from, to, label) in self.network.arcs() {
            if from != b && to != b {
                continue;
            }
            let target = (remap(from), remap(to));
            let is_self_loop = target.0 == target.1;
            let lands_on_task = self
                .network
                .label(target.0, target.1)
                .is_some_and(|existing| !existing.is_empty());
            if !is_self_loop && !label.is_empty() && lands_on_task {
                return None;
            }
            plan.push(Retarget {
                from: (from, to),
                to: target,
                label: label.clone(),
            });
        }
        Some(plan)
    }

    /// Applies a merge plan as one batch. A moved arc only takes its new key
    /// if the key is free or holds an empty arc.
    fn apply_merge(&mut self, plan: Vec<Retarget<N, T>>) {
        for Retarget { from, to, label } in plan {
            self.network.remove_arc(from.0, from.1);
            let free = self
                .network
                .label(to.0, to.1)
                .is_none_or(ArcLabel::is_empty);
            if free {
                self.network.insert_arc(to.0, to.1, label);
            }
        }
    }

    /// Folds `parent -> c` onto `b -> c`. Only an empty `parent -> c` is
    /// folded: it is dominated by `parent -> b -> c`, while moving a task arc
    /// would delay that task behind `parent -> b`.
    fn rewrite_shared_arc(&mut self, parent: N, b: N, c: N) -> bool {
        if !self.network.arc_exists(b, c) || !self.network.arc_is_empty(parent, c) {
            return false;
        }
        let Some(label) = self.network.remove_arc(parent, c) else {
            return false;
        };
        self.network.insert_arc(b, c, label);
        debug!(?parent, ?b, ?c, "folded shared empty arc");
        true
    }

    fn remove_isolated_events(&mut self) -> usize {
        let before = self.network.event_count();
        let isolated: Vec<N> = self
            .network
            .events()
            .iter()
            .copied()
            .filter(|event| !self.network.is_source(*event) && !self.network.is_target(*event))
            .collect();
        self.network.retain_events(|event| !isolated.contains(event));
        before - self.network.event_count()
    }

    fn remove_self_loops(&mut self) -> usize {
        let before = self.network.arc_count();
        self.network.retain_arcs(|from, to, _| from != to);
        before - self.network.arc_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network_of(events: &[u32], arcs: &[(u32, u32, Option<char>)]) -> Network<u32, char> {
        let mut network = Network::new();
        for event in events {
            network.push_event(*event);
        }
        for (from, to, task) in arcs {
            let label = task.map_or(ArcLabel::Empty, ArcLabel::Task);
            network.insert_arc(*from, *to, label);
        }
        network
    }

    fn arcs_of(network: &Network<u32, char>) -> Vec<(u32, u32, Option<char>)> {
        network
            .arcs()
            .map(|(from, to, label)| (from, to, label.task().copied()))
            .collect()
    }

    #[test]
    fn merge_rule_matches_decision_table() {
        let empty_bc_without_ac = TripleFacts {
            bc_empty: true,
            ..Default::default()
        };
        assert!(empty_bc_without_ac.allows_merge());

        let both_empty_with_ac = TripleFacts {
            bc_empty: true,
            ab_empty: true,
            ac_exists: true,
            ..Default::default()
        };
        assert!(both_empty_with_ac.allows_merge());

        let labeled_ab_with_ac = TripleFacts {
            bc_empty: true,
            ac_exists: true,
            ..Default::default()
        };
        assert!(!labeled_ab_with_ac.allows_merge());

        let shared_parent = TripleFacts {
            bc_empty: true,
            has_shared_parent: true,
            ..Default::default()
        };
        assert!(!shared_parent.allows_merge());
        assert!(shared_parent.allows_rewrite());

        let shared_parent_at_end = TripleFacts {
            c_is_last: true,
            ..shared_parent
        };
        assert!(shared_parent_at_end.allows_merge());

        assert!(!TripleFacts::default().allows_merge());
        assert!(!TripleFacts::default().allows_rewrite());
    }

    #[test]
    fn literal_policy_stops_after_first_shrink() {
        let events = [0, 1, 2, 3];
        let arcs = [(0, 1, Some('a')), (0, 3, None), (1, 2, None), (2, 3, None)];

        let mut literal = network_of(&events, &arcs);
        let report = NetworkSimplifier::new(&mut literal).execute();
        assert_eq!(literal.events(), &[0, 2, 3]);
        assert_eq!(arcs_of(&literal), vec![(0, 2, Some('a')), (2, 3, None)]);
        assert_eq!(report.passes, 1);
        assert_eq!(report.merged_events, 1);
        assert_eq!(report.rewritten_arcs, 1);
        assert_eq!(report.removed_self_loops, 1);

        let mut stable = network_of(&events, &arcs);
        let report = NetworkSimplifier::new(&mut stable)
            .with_policy(LoopPolicy::UntilStable)
            .execute();
        assert_eq!(stable.events(), &[0, 3]);
        assert_eq!(arcs_of(&stable), vec![(0, 3, Some('a'))]);
        assert_eq!(report.passes, 3);
        assert_eq!(report.merged_events, 2);
    }

    #[test]
    fn literal_policy_repeats_passes_that_only_rewrite() {
        let events = [0, 1, 2, 3];
        let arcs = [(0, 1, Some('a')), (0, 2, None), (1, 2, None), (2, 3, Some('c'))];

        let mut network = network_of(&events, &arcs);
        let report = NetworkSimplifier::new(&mut network).execute();
        assert_eq!(network.events(), &[0, 2, 3]);
        assert_eq!(arcs_of(&network), vec![(0, 2, Some('a')), (2, 3, Some('c'))]);
        assert_eq!(report.passes, 2);
        assert_eq!(report.rewritten_arcs, 1);
        assert_eq!(report.merged_events, 1);
    }

    #[test]
    fn shared_task_arc_is_not_moved() {
        // Folding 0 -> 2 [b] onto 1 -> 2 would make b wait for a.
        let events = [0, 1, 2];
        let arcs = [(0, 1, Some('a')), (0, 2, Some('b')), (1, 2, None)];

        let mut network = network_of(&events, &arcs);
        let report = NetworkSimplifier::new(&mut network).execute();
        assert_eq!(network.events(), &events);
        assert_eq!(arcs_of(&network), arcs.to_vec());
        assert_eq!(report.passes, 1);
        assert_eq!(report.rewritten_arcs, 0);
    }

    #[test]
    fn merge_that_would_join_branches_is_skipped() {
        // Folding 2 into 3 would create the path 0 -> 3 [y] -> 4 [x].
        let events = [0, 1, 2, 3, 4];
        let arcs = [
            (0, 1, Some('a')),
            (0, 3, Some('y')),
            (1, 2, None),
            (2, 3, None),
            (2, 4, Some('x')),
            (3, 4, None),
        ];

        for policy in [LoopPolicy::StopAfterShrink, LoopPolicy::UntilStable] {
            let mut network = network_of(&events, &arcs);
            NetworkSimplifier::new(&mut network).with_policy(policy).execute();
            assert_eq!(network.events(), &[0, 2, 4]);
            assert_eq!(
                arcs_of(&network),
                vec![(0, 2, Some('a')), (0, 4, Some('y')), (2, 4, Some('x'))]
            );
        }
    }

    #[test]
    fn cleanup_drops_isolated_events_and_self_loops() {
        let events = [0, 1, 5];
        let arcs = [(0, 1, Some('a')), (1, 1, None)];
        let mut network = network_of(&events, &arcs);
        let report = NetworkSimplifier::new(&mut network).execute();
        assert_eq!(network.events(), &[0, 1]);
        assert_eq!(arcs_of(&network), vec![(0, 1, Some('a'))]);
        assert_eq!(report.removed_isolated, 1);
        assert_eq!(report.removed_self_loops, 1);
    }

    #[test]
    fn short_chains_are_left_alone() {
        let mut network = network_of(&[0, 1], &[(0, 1, None)]);
        let report = NetworkSimplifier::new(&mut network).execute();
        assert_eq!(network.events(), &[0, 1]);
        assert_eq!(report.passes, 1);
        assert_eq!(report.merged_events, 0);
    }
}
