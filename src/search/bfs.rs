use std::collections::{HashSet, VecDeque};

use log::{debug, trace};

use super::{Budget, NodeId, SearchConfig, SearchStats, SearchTree, SolveResult};
use crate::{BoardValue, State};

/// Breadth-first search from `root`.
///
/// Every state is enqueued at most once, and successors are checked for the goal as soon as they
/// are generated, so the returned solution has the fewest actions possible under
/// [`SearchConfig::policy`].
pub fn bfs_solve<V>(root: &State<V>, config: &SearchConfig) -> SolveResult<V>
where
    V: BoardValue,
{
    let budget = Budget::start(&config.limits);
    let mut stats = SearchStats {
        generated: 1,
        ..SearchStats::default()
    };
    let mut tree = SearchTree::new(root.clone(), 0);
    debug!(
        "breadth-first search over {} vehicles with {:?}",
        root.vehicles().len(),
        config.policy
    );

    if root.is_goal() {
        debug!("root is already solved");
        return budget.solved(tree, NodeId::ROOT, stats);
    }

    let mut frontier = VecDeque::from([NodeId::ROOT]);
    let mut seen = HashSet::from([root.clone()]);

    while let Some(current) = frontier.pop_front() {
        if budget.exceeded(&stats) {
            let stats = budget.finish(stats);
            debug!("breadth-first search aborted: {stats}");
            return SolveResult::Aborted(stats);
        }
        stats.expanded += 1;

        let node = tree.node(current);
        let cost = node.cost();
        let successors = node.state().successors(config.policy);
        trace!(
            "expanding node {} at cost {cost}: {} successors",
            current.index(),
            successors.len()
        );

        for (action, successor) in successors {
            if seen.contains(&successor) {
                stats.duplicates += 1;
                continue;
            }
            let goal = successor.is_goal();
            if !goal {
                seen.insert(successor.clone());
            }
            let child_cost = cost + action.cost();
            let child = tree.insert(current, action, successor, child_cost, child_cost);
            stats.generated += 1;
            if goal {
                debug!(
                    "breadth-first search reached the goal at cost {child_cost} after {} expansions",
                    stats.expanded
                );
                return budget.solved(tree, child, stats);
            }
            frontier.push_back(child);
        }
    }

    let stats = budget.finish(stats);
    debug!("breadth-first search exhausted every state: {stats}");
    SolveResult::NoSolution(stats)
}
