use core::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use log::{debug, trace};

use super::{Budget, NodeId, SearchConfig, SearchStats, SearchTree, SolveResult};
use crate::heuristic::Heuristic;
use crate::{BoardValue, State};

/// A frontier entry. The heap pops the lowest estimate first and, among equal estimates, the
/// entry pushed first.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct Entry {
    estimate: usize,
    sequence: usize,
    node: NodeId,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* search from `root`, guided by `heuristic`.
///
/// The cost of an action is the number of cells it moves a vehicle, so under
/// [`crate::MovePolicy::MaximalSlide`] the search minimises cells travelled rather than the number
/// of actions. States are checked for the goal when they leave the frontier; with an admissible
/// heuristic such as [`crate::heuristic::DistanceToExit`] the solution is therefore of minimal
/// cost. Frontier entries whose state has already been expanded are skipped when popped.
pub fn astar_solve<V, H>(root: &State<V>, heuristic: &H, config: &SearchConfig) -> SolveResult<V>
where
    V: BoardValue,
    H: Heuristic<V> + ?Sized,
{
    let budget = Budget::start(&config.limits);
    let mut stats = SearchStats {
        generated: 1,
        ..SearchStats::default()
    };
    let estimate = heuristic.estimate(root);
    let mut tree = SearchTree::new(root.clone(), estimate);
    debug!(
        "A* search over {} vehicles with {:?}, initial estimate {estimate}",
        root.vehicles().len(),
        config.policy
    );

    let mut sequence = 0;
    let mut frontier = BinaryHeap::from([Entry {
        estimate,
        sequence,
        node: NodeId::ROOT,
    }]);
    let mut closed: HashSet<State<V>> = HashSet::new();

    while let Some(Entry { node: current, .. }) = frontier.pop() {
        let node = tree.node(current);
        if closed.contains(node.state()) {
            stats.duplicates += 1;
            continue;
        }
        if node.state().is_goal() {
            debug!(
                "A* search reached the goal at cost {} after {} expansions",
                node.cost(),
                stats.expanded
            );
            return budget.solved(tree, current, stats);
        }
        if budget.exceeded(&stats) {
            let stats = budget.finish(stats);
            debug!("A* search aborted: {stats}");
            return SolveResult::Aborted(stats);
        }
        stats.expanded += 1;

        let cost = node.cost();
        let successors = node.state().successors(config.policy);
        trace!(
            "expanding node {} at cost {cost}, estimate {}: {} successors",
            current.index(),
            node.estimate(),
            successors.len()
        );
        closed.insert(node.state().clone());

        for (action, successor) in successors {
            if closed.contains(&successor) {
                stats.duplicates += 1;
                continue;
            }
            let child_cost = cost + action.cost();
            let estimate = child_cost.saturating_add(heuristic.estimate(&successor));
            let child = tree.insert(current, action, successor, child_cost, estimate);
            stats.generated += 1;
            sequence += 1;
            frontier.push(Entry {
                estimate,
                sequence,
                node: child,
            });
        }
    }

    let stats = budget.finish(stats);
    debug!("A* search exhausted every state: {stats}");
    SolveResult::NoSolution(stats)
}
