//! Search drivers over the graph of puzzle states.
//!
//! [`bfs_solve`] finds a solution with the fewest actions; [`astar_solve`] orders its search by
//! path cost plus a [`Heuristic`](crate::heuristic::Heuristic) estimate. Both produce a
//! [`SolveResult`]: the search either reaches a goal state, exhausts every reachable state, or
//! runs out of the budget configured in [`SearchLimits`].

use core::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

use log::info;
use serde::{Deserialize, Serialize};

use crate::heuristic::StandardHeuristic;
use crate::{Action, BoardValue, MovePolicy, State};

mod astar;
mod bfs;
mod node;

pub use astar::astar_solve;
pub use bfs::bfs_solve;
pub use node::{Node, NodeId, SearchTree};

/// Bounds on the work a single search may perform. Unset bounds do not apply.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchLimits {
    /// Maximum number of states to expand.
    pub max_expansions: Option<usize>,
    /// Maximum number of search nodes to create.
    pub max_nodes: Option<usize>,
    /// Maximum wall-clock time to spend.
    pub time_limit: Option<Duration>,
}

/// Configuration shared by the search drivers.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// The move model used for every expansion of the search.
    pub policy: MovePolicy,
    /// Bounds on the search.
    pub limits: SearchLimits,
}

impl SearchConfig {
    /// An unbounded configuration using `policy`.
    pub fn new(policy: MovePolicy) -> Self {
        Self {
            policy,
            limits: SearchLimits::default(),
        }
    }

    /// This configuration, bounded by `limits`.
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Counters describing the work a search performed.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SearchStats {
    /// Search nodes created, including the root.
    pub generated: usize,
    /// States expanded (i.e. whose successors were generated).
    pub expanded: usize,
    /// Successors or frontier entries discarded because their state was already known.
    pub duplicates: usize,
    /// Wall-clock time spent searching.
    pub elapsed: Duration,
}

impl Display for SearchStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} nodes generated, {} expanded, {} duplicates, {:.3}s",
            self.generated,
            self.expanded,
            self.duplicates,
            self.elapsed.as_secs_f64()
        )
    }
}

/// A path from the root of a search to a goal state.
#[derive(Clone, Debug)]
pub struct Solution<V> {
    tree: SearchTree<V>,
    goal: NodeId,
    stats: SearchStats,
}

impl<V> Solution<V> {
    /// The state the search started from.
    pub fn root(&self) -> &State<V> {
        self.tree.root().state()
    }

    /// The goal node.
    pub fn goal(&self) -> &Node<V> {
        self.tree.node(self.goal)
    }

    /// Every state from the root to the goal, both included.
    pub fn path(&self) -> Vec<&State<V>> {
        self.tree.path(self.goal)
    }

    /// The actions leading from the root to the goal.
    pub fn actions(&self) -> Vec<Action<V>>
    where
        V: Copy,
    {
        self.tree.actions(self.goal)
    }

    /// The number of actions in the solution.
    pub fn len(&self) -> usize {
        self.tree.ancestors(self.goal).count() - 1
    }

    /// Whether the root was already solved.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The total cost of the solution: the number of cells travelled by all vehicles.
    pub fn cost(&self) -> usize {
        self.goal().cost()
    }

    /// The work performed to find this solution.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Every node the search created.
    pub fn tree(&self) -> &SearchTree<V> {
        &self.tree
    }
}

/// The outcome of a search.
#[derive(Clone, Debug)]
pub enum SolveResult<V> {
    /// A goal state was reached.
    Solved(Solution<V>),
    /// Every reachable state was expanded without reaching a goal.
    NoSolution(SearchStats),
    /// The search ran out of budget before an answer was known.
    Aborted(SearchStats),
}

impl<V> SolveResult<V> {
    /// The solution, if one was found.
    pub fn solution(&self) -> Option<&Solution<V>> {
        match self {
            SolveResult::Solved(solution) => Some(solution),
            _ => None,
        }
    }

    /// The solution, if one was found.
    pub fn into_solution(self) -> Option<Solution<V>> {
        match self {
            SolveResult::Solved(solution) => Some(solution),
            _ => None,
        }
    }

    /// The work performed by the search.
    pub fn stats(&self) -> &SearchStats {
        match self {
            SolveResult::Solved(solution) => solution.stats(),
            SolveResult::NoSolution(stats) | SolveResult::Aborted(stats) => stats,
        }
    }
}

impl<V> Display for SolveResult<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            SolveResult::Solved(solution) => write!(
                f,
                "solved in {} actions (cost {}); {}",
                solution.len(),
                solution.cost(),
                solution.stats
            ),
            SolveResult::NoSolution(stats) => write!(f, "no solution; {stats}"),
            SolveResult::Aborted(stats) => write!(f, "aborted; {stats}"),
        }
    }
}

/// A search driver.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// See [`bfs_solve`].
    BreadthFirst,
    /// See [`astar_solve`], guided by the provided heuristic.
    AStar(StandardHeuristic),
}

impl Algorithm {
    /// Breadth-first search, then A* with every built-in heuristic.
    pub const ALL: [Algorithm; 4] = [
        Algorithm::BreadthFirst,
        Algorithm::AStar(StandardHeuristic::Distance),
        Algorithm::AStar(StandardHeuristic::Blockers),
        Algorithm::AStar(StandardHeuristic::BlockerClearance),
    ];
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Algorithm::BreadthFirst => f.write_str("BFS"),
            Algorithm::AStar(StandardHeuristic::Distance) => f.write_str("A* (distance)"),
            Algorithm::AStar(StandardHeuristic::Blockers) => f.write_str("A* (blockers)"),
            Algorithm::AStar(StandardHeuristic::BlockerClearance) => {
                f.write_str("A* (blocker clearance)")
            }
        }
    }
}

/// Solve `root` with `algorithm`.
pub fn solve<V>(root: &State<V>, algorithm: Algorithm, config: &SearchConfig) -> SolveResult<V>
where
    V: BoardValue,
{
    match algorithm {
        Algorithm::BreadthFirst => bfs_solve(root, config),
        Algorithm::AStar(heuristic) => astar_solve(root, &heuristic, config),
    }
}

/// Solve `root` with every algorithm in [`Algorithm::ALL`], one after another.
pub fn compare<V>(root: &State<V>, config: &SearchConfig) -> Vec<(Algorithm, SolveResult<V>)>
where
    V: BoardValue,
{
    Algorithm::ALL
        .into_iter()
        .map(|algorithm| {
            let result = solve(root, algorithm, config);
            info!("{algorithm}: {result}");
            (algorithm, result)
        })
        .collect()
}

/// Tracks a search against its [`SearchLimits`].
pub(crate) struct Budget<'l> {
    limits: &'l SearchLimits,
    started: Instant,
}

impl<'l> Budget<'l> {
    pub(crate) fn start(limits: &'l SearchLimits) -> Self {
        Self {
            limits,
            started: Instant::now(),
        }
    }

    pub(crate) fn exceeded(&self, stats: &SearchStats) -> bool {
        self.limits
            .max_expansions
            .is_some_and(|max| stats.expanded >= max)
            || self.limits.max_nodes.is_some_and(|max| stats.generated >= max)
            || self
                .limits
                .time_limit
                .is_some_and(|limit| self.started.elapsed() >= limit)
    }

    pub(crate) fn finish(&self, mut stats: SearchStats) -> SearchStats {
        stats.elapsed = self.started.elapsed();
        stats
    }

    pub(crate) fn solved<V>(
        &self,
        tree: SearchTree<V>,
        goal: NodeId,
        stats: SearchStats,
    ) -> SolveResult<V> {
        SolveResult::Solved(Solution {
            tree,
            goal,
            stats: self.finish(stats),
        })
    }
}

#[cfg(test)]
mod test {
    use crate::heuristic::{DistanceToExit, StandardHeuristic};
    use crate::search::{
        Algorithm, SearchConfig, SearchLimits, SolveResult, Solution, astar_solve, bfs_solve,
        compare, solve,
    };
    use crate::{
        Car, Dimensions, Direction, MovePolicy, Orientation, Position, PuzzleDefinition, State,
        Vehicle, VehicleDefinition,
    };
    use core::error::Error;
    use std::collections::HashSet;
    use std::time::Duration;

    fn horizontal(id: char, row: u8, column: u8, length: u8) -> Vehicle<u8> {
        Vehicle::new(
            id,
            (row, column),
            Car::new(length, Orientation::LeftRight).unwrap(),
        )
    }

    fn vertical(id: char, row: u8, column: u8, length: u8) -> Vehicle<u8> {
        Vehicle::new(
            id,
            (row, column),
            Car::new(length, Orientation::UpDown).unwrap(),
        )
    }

    // A A . . . B
    // . . . C . B
    // X X . C . B
    // . . . C . .
    // D . . . E E
    // D . F F F .
    fn rush_hour() -> Result<State<u8>, Box<dyn Error>> {
        Ok(State::new(
            Dimensions::try_from((6u8, 6))?,
            vec![
                horizontal('A', 0, 0, 2),
                vertical('B', 0, 5, 3),
                vertical('C', 1, 3, 3),
                horizontal('X', 2, 0, 2),
                vertical('D', 4, 0, 2),
                horizontal('E', 4, 4, 2),
                horizontal('F', 5, 2, 3),
            ],
            vec![],
        )?)
    }

    // X X . . #
    // . . A . .
    // . . A . B
    // . . . . B
    fn walled_in() -> Result<State<u8>, Box<dyn Error>> {
        Ok(State::new(
            Dimensions::try_from((4u8, 5))?,
            vec![
                horizontal('X', 0, 0, 2),
                vertical('A', 1, 2, 2),
                vertical('B', 2, 4, 2),
            ],
            vec![Position::from((0u8, 4))],
        )?)
    }

    fn reachable(root: &State<u8>, policy: MovePolicy) -> HashSet<State<u8>> {
        let mut seen = HashSet::from([root.clone()]);
        let mut stack = vec![root.clone()];
        while let Some(state) = stack.pop() {
            for (_, successor) in state.successors(policy) {
                if seen.insert(successor.clone()) {
                    stack.push(successor);
                }
            }
        }
        seen
    }

    fn solved(result: SolveResult<u8>) -> Solution<u8> {
        match result {
            SolveResult::Solved(solution) => solution,
            other => unreachable!("expected a solution, got {other}"),
        }
    }

    /// Replays the actions of `solution` and checks them against its path.
    fn check(solution: &Solution<u8>, policy: MovePolicy) -> Result<(), Box<dyn Error>> {
        let path = solution.path();
        let actions = solution.actions();
        assert_eq!(path.len(), actions.len() + 1);
        assert_eq!(solution.len(), actions.len());
        assert_eq!(solution.root(), path[0]);
        assert!(path.last().unwrap().is_goal());
        assert!(path[..path.len() - 1].iter().all(|state| !state.is_goal()));

        let mut cost = 0;
        for (window, action) in path.windows(2).zip(&actions) {
            assert_eq!(window[1], &window[0].apply(action)?);
            assert!(
                window[0]
                    .successors(policy)
                    .iter()
                    .any(|(a, s)| a == action && s == window[1])
            );
            let moved = window[0]
                .vehicles()
                .iter()
                .zip(window[1].vehicles())
                .filter(|(a, b)| a != b)
                .count();
            assert_eq!(1, moved);
            cost += action.cost();
        }
        assert_eq!(cost, solution.cost());
        Ok(())
    }

    #[test]
    fn already_solved() -> Result<(), Box<dyn Error>> {
        let root = State::new(
            Dimensions::try_from((1u8, 2))?,
            vec![horizontal('X', 0, 0, 2)],
            vec![],
        )?;
        assert!(root.is_goal());

        let solution = solved(bfs_solve(&root, &SearchConfig::default()));
        assert!(solution.is_empty());
        assert!(solution.actions().is_empty());
        assert_eq!(vec![&root], solution.path());

        let solution = solved(astar_solve(&root, &DistanceToExit, &SearchConfig::default()));
        assert!(solution.is_empty());
        Ok(())
    }

    #[test]
    fn open_road() -> Result<(), Box<dyn Error>> {
        let root = State::new(
            Dimensions::try_from((6u8, 6))?,
            vec![horizontal('X', 2, 0, 2)],
            vec![],
        )?;
        let solution = solved(bfs_solve(&root, &SearchConfig::default()));
        let actions = solution.actions();
        assert_eq!(4, actions.len());
        assert!(
            actions
                .iter()
                .all(|a| a.vehicle() == 'X' && a.direction() == Direction::Right && a.cost() == 1)
        );
        assert_eq!(
            &Position::from((2, 4)),
            solution.goal().state().goal_vehicle().position()
        );
        check(&solution, MovePolicy::UnitStep)?;

        let slide = SearchConfig::new(MovePolicy::MaximalSlide);
        let solution = solved(bfs_solve(&root, &slide));
        assert_eq!(1, solution.len());
        assert_eq!(4, solution.cost());
        assert_eq!("X right 4", solution.actions()[0].to_string());
        check(&solution, MovePolicy::MaximalSlide)?;
        Ok(())
    }

    #[test]
    fn walled_in_has_no_solution() -> Result<(), Box<dyn Error>> {
        let root = State::new(
            Dimensions::try_from((1u8, 3))?,
            vec![horizontal('X', 0, 0, 2)],
            vec![Position::from((0u8, 2))],
        )?;
        assert!(root.successors(MovePolicy::UnitStep).is_empty());
        for algorithm in Algorithm::ALL {
            assert!(matches!(
                solve(&root, algorithm, &SearchConfig::default()),
                SolveResult::NoSolution(_)
            ));
        }

        let root = walled_in()?;
        println!("{}", root.board()?);
        for policy in [MovePolicy::UnitStep, MovePolicy::MaximalSlide] {
            let config = SearchConfig::new(policy);
            for algorithm in Algorithm::ALL {
                match solve(&root, algorithm, &config) {
                    SolveResult::NoSolution(stats) => {
                        assert_eq!(reachable(&root, policy).len(), stats.expanded)
                    }
                    other => unreachable!("{algorithm} should exhaust the puzzle, got {other}"),
                }
            }
        }
        Ok(())
    }

    #[test]
    fn transpositions_are_expanded_once() -> Result<(), Box<dyn Error>> {
        let root = walled_in()?;
        let down_a = crate::Action::step('A', Direction::Down);
        let up_b = crate::Action::step('B', Direction::Up);
        let ab = root.apply(&down_a)?.apply(&up_b)?;
        let ba = root.apply(&up_b)?.apply(&down_a)?;
        assert_eq!(ab, ba);
        assert_eq!(1, HashSet::from([ab, ba]).len());

        // every reachable state is expanded exactly once, although many are reached twice
        let result = bfs_solve(&root, &SearchConfig::default());
        let stats = result.stats();
        let distinct = reachable(&root, MovePolicy::UnitStep).len();
        assert_eq!(distinct, stats.expanded);
        assert_eq!(distinct, stats.generated);
        assert!(stats.duplicates > 0);
        Ok(())
    }

    #[test]
    fn shortest_solutions_agree() -> Result<(), Box<dyn Error>> {
        let root = rush_hour()?;
        println!("{}", root.board()?);

        let unit = SearchConfig::default();
        let bfs = solved(bfs_solve(&root, &unit));
        let astar = solved(astar_solve(&root, &DistanceToExit, &unit));
        check(&bfs, MovePolicy::UnitStep)?;
        check(&astar, MovePolicy::UnitStep)?;
        assert!(bfs.len() <= 15);
        assert_eq!(bfs.len(), astar.len());
        assert_eq!(bfs.cost(), astar.cost());

        // sliding several cells at once costs as much as the single steps it replaces
        let slide = SearchConfig::new(MovePolicy::MaximalSlide);
        let slide_bfs = solved(bfs_solve(&root, &slide));
        let slide_astar = solved(astar_solve(&root, &DistanceToExit, &slide));
        check(&slide_bfs, MovePolicy::MaximalSlide)?;
        check(&slide_astar, MovePolicy::MaximalSlide)?;
        assert!(slide_bfs.len() <= 6);
        assert!(slide_bfs.len() <= bfs.len());
        assert_eq!(bfs.len(), slide_astar.cost());

        for heuristic in [StandardHeuristic::Blockers, StandardHeuristic::BlockerClearance] {
            let solution = solved(astar_solve(&root, &heuristic, &unit));
            check(&solution, MovePolicy::UnitStep)?;
            assert!(solution.len() >= bfs.len());
        }
        Ok(())
    }

    #[test]
    fn searches_are_deterministic() -> Result<(), Box<dyn Error>> {
        let root = rush_hour()?;
        for policy in [MovePolicy::UnitStep, MovePolicy::MaximalSlide] {
            let config = SearchConfig::new(policy);
            for algorithm in Algorithm::ALL {
                let first = solved(solve(&root, algorithm, &config));
                let second = solved(solve(&root, algorithm, &config));
                assert_eq!(first.actions(), second.actions());
                assert_eq!(first.stats().expanded, second.stats().expanded);
            }
        }
        Ok(())
    }

    #[test]
    fn budgets() -> Result<(), Box<dyn Error>> {
        let root = rush_hour()?;

        let config = SearchConfig::default().with_limits(SearchLimits {
            max_expansions: Some(2),
            ..SearchLimits::default()
        });
        for algorithm in Algorithm::ALL {
            match solve(&root, algorithm, &config) {
                SolveResult::Aborted(stats) => assert_eq!(2, stats.expanded),
                other => unreachable!("{algorithm} should run out of budget, got {other}"),
            }
        }

        let config = SearchConfig::default().with_limits(SearchLimits {
            time_limit: Some(Duration::ZERO),
            ..SearchLimits::default()
        });
        assert!(matches!(
            bfs_solve(&root, &config),
            SolveResult::Aborted(_)
        ));

        let config = SearchConfig::default().with_limits(SearchLimits {
            max_nodes: Some(10),
            ..SearchLimits::default()
        });
        let result = astar_solve(&root, &DistanceToExit, &config);
        assert!(matches!(result, SolveResult::Aborted(_)));
        assert!(result.stats().generated >= 10);

        // a solved root needs no budget at all
        let solved_root = State::new(
            Dimensions::try_from((1u8, 2))?,
            vec![horizontal('X', 0, 0, 2)],
            vec![],
        )?;
        let config = SearchConfig::default().with_limits(SearchLimits {
            max_expansions: Some(0),
            ..SearchLimits::default()
        });
        assert!(solve(&solved_root, Algorithm::BreadthFirst, &config)
            .solution()
            .is_some());
        Ok(())
    }

    #[test]
    fn comparison() -> Result<(), Box<dyn Error>> {
        let definition = rush_hour()?.definition();
        let root = definition.build()?;
        let results = compare(&root, &SearchConfig::default());
        assert_eq!(
            Algorithm::ALL.to_vec(),
            results.iter().map(|(a, _)| *a).collect::<Vec<_>>()
        );
        for (algorithm, result) in &results {
            println!("{algorithm}: {result}");
            assert!(result.solution().is_some());
        }
        Ok(())
    }

    #[test]
    fn configuration() -> Result<(), Box<dyn Error>> {
        let config: SearchConfig = serde_json::from_str("{}")?;
        assert_eq!(SearchConfig::default(), config);
        assert_eq!(MovePolicy::UnitStep, config.policy);

        let config: SearchConfig = serde_json::from_str(
            r#"{ "policy": "maximal_slide", "limits": { "max_expansions": 1000 } }"#,
        )?;
        assert_eq!(MovePolicy::MaximalSlide, config.policy);
        assert_eq!(Some(1000), config.limits.max_expansions);
        assert_eq!(None, config.limits.time_limit);

        let algorithm: Algorithm = serde_json::from_str(r#"{ "a_star": "blocker_clearance" }"#)?;
        assert_eq!(
            Algorithm::AStar(StandardHeuristic::BlockerClearance),
            algorithm
        );

        let definition = PuzzleDefinition::<u8> {
            rows: 6,
            columns: 6,
            vehicles: vec![VehicleDefinition::new('R', 0, 2, Orientation::LeftRight, 2)],
            walls: vec![],
            goal: Some('R'),
        };
        let solution = solved(bfs_solve(&definition.build()?, &config));
        assert_eq!("R right 4", solution.actions()[0].to_string());
        Ok(())
    }
}
