use crate::{Action, State};

/// A handle to a node of a [`SearchTree`]. Only meaningful for the tree which issued it.
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The root of every tree.
    pub const ROOT: NodeId = NodeId(0);

    /// The position of the node in creation order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A state discovered during a search, linked to the node it was reached from.
#[derive(Clone, Debug)]
pub struct Node<V> {
    state: State<V>,
    parent: Option<NodeId>,
    action: Option<Action<V>>,
    cost: usize,
    estimate: usize,
}

impl<V> Node<V> {
    /// The state of this node.
    pub fn state(&self) -> &State<V> {
        &self.state
    }

    /// The node this node was reached from; `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The action which led from the parent to this node; `None` for the root.
    pub fn action(&self) -> Option<&Action<V>> {
        self.action.as_ref()
    }

    /// The cost of the path from the root to this node (g).
    pub fn cost(&self) -> usize {
        self.cost
    }

    /// The estimated cost of a solution through this node (f = g + h). Equal to
    /// [`Node::cost`] for searches without a heuristic.
    pub fn estimate(&self) -> usize {
        self.estimate
    }
}

/// Every node created by one search. Nodes own their states; parents are referred to by
/// [`NodeId`], so dropping the tree releases the whole search at once.
#[derive(Clone, Debug)]
pub struct SearchTree<V> {
    nodes: Vec<Node<V>>,
}

impl<V> SearchTree<V> {
    pub(crate) fn new(root: State<V>, estimate: usize) -> Self {
        Self {
            nodes: vec![Node {
                state: root,
                parent: None,
                action: None,
                cost: 0,
                estimate,
            }],
        }
    }

    pub(crate) fn insert(
        &mut self,
        parent: NodeId,
        action: Action<V>,
        state: State<V>,
        cost: usize,
        estimate: usize,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            state,
            parent: Some(parent),
            action: Some(action),
            cost,
            estimate,
        });
        id
    }

    /// The node behind `id`.
    ///
    /// # Panics
    ///
    /// If `id` was issued by another tree and is out of range for this one.
    pub fn node(&self, id: NodeId) -> &Node<V> {
        &self.nodes[id.0]
    }

    /// The root node.
    pub fn root(&self) -> &Node<V> {
        &self.nodes[0]
    }

    /// The number of nodes created.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty. Trees always hold at least their root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `id` followed by its ancestors, ending with the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &Node<V>> {
        core::iter::successors(Some(self.node(id)), |node| {
            node.parent.map(|parent| self.node(parent))
        })
    }

    /// The states from the root up to and including `id`.
    pub fn path(&self, id: NodeId) -> Vec<&State<V>> {
        let mut path = self.ancestors(id).map(Node::state).collect::<Vec<_>>();
        path.reverse();
        path
    }

    /// The actions leading from the root to `id`.
    pub fn actions(&self, id: NodeId) -> Vec<Action<V>>
    where
        V: Copy,
    {
        let mut actions = self
            .ancestors(id)
            .filter_map(|node| node.action)
            .collect::<Vec<_>>();
        actions.reverse();
        actions
    }
}

#[cfg(test)]
mod test {
    use crate::search::node::{NodeId, SearchTree};
    use crate::{Action, Car, Dimensions, Direction, Orientation, State, Vehicle};
    use core::error::Error;

    #[test]
    fn reconstruction() -> Result<(), Box<dyn Error>> {
        let root = State::new(
            Dimensions::try_from((1u8, 5))?,
            vec![Vehicle::new(
                'X',
                (0, 0),
                Car::new(2, Orientation::LeftRight).unwrap(),
            )],
            vec![],
        )?;
        let mut tree = SearchTree::new(root.clone(), 3);
        assert_eq!(vec![&root], tree.path(NodeId::ROOT));
        assert!(tree.actions(NodeId::ROOT).is_empty());

        let step = Action::step('X', Direction::Right);
        let first = root.apply(&step)?;
        let second = first.apply(&step)?;
        let a = tree.insert(NodeId::ROOT, step, first.clone(), 1, 3);
        let dead_end = tree.insert(NodeId::ROOT, step, first.clone(), 1, 3);
        let b = tree.insert(a, step, second.clone(), 2, 3);

        assert_eq!(4, tree.len());
        assert_eq!(3, b.index());
        assert_eq!(vec![&root, &first, &second], tree.path(b));
        assert_eq!(vec![step, step], tree.actions(b));
        assert_eq!(vec![step], tree.actions(dead_end));
        assert_eq!(Some(a), tree.node(b).parent());
        assert_eq!(2, tree.node(b).cost());
        assert_eq!(3, tree.root().estimate());
        Ok(())
    }
}
