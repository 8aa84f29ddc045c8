//! Node storage and the compiled application.
//!
//! Nodes live in a [`NodeArena`] while the tree is being built; children
//! and parents refer to each other by [`NodeId`], so the parent back-edge
//! never owns anything. Once complete, the arena is frozen into an
//! [`Application`], which only hands out shared references.

use std::ops::{Index, IndexMut};

use crate::outline::NodeOutline;
use crate::{Flag, Node, NodeId, Tag, Vars};

/// Growable node storage used while building a tree.
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `node` and returns its id.
    pub fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}

/// A compiled command tree.
///
/// # Examples
///
/// ```
/// use command_tree_core::{Application, Node, NodeArena, NodeKind, SlotPath, Tag};
///
/// let mut arena = NodeArena::new();
/// let root = arena.push(Node::new(NodeKind::Application, SlotPath::root()));
/// let mut serve = Node::new(NodeKind::Command, SlotPath::root().child("serve"));
/// serve.name = "serve".to_string();
/// serve.parent = Some(root);
/// let serve = arena.push(serve);
/// arena[root].children.push(serve);
///
/// let app = Application::new(arena, root, Tag::new());
/// assert_eq!(app.find_child(app.root_id(), "serve"), Some(serve));
/// assert_eq!(app.depth(serve), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Application {
    nodes: NodeArena,
    root: NodeId,
    /// Application-level tag carrying the default template variables.
    pub tag: Tag,
}

impl Application {
    /// Freezes a built arena whose root node is `root`.
    pub fn new(nodes: NodeArena, root: NodeId, tag: Tag) -> Self {
        Self { nodes, root, tag }
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn root(&self) -> &Node {
        &self.nodes[self.root]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in construction order, paired with their ids.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Node> {
        self.nodes[id].children.iter().map(|child| &self.nodes[*child])
    }

    pub fn parent(&self, id: NodeId) -> Option<&Node> {
        self.nodes[id].parent.map(|parent| &self.nodes[parent])
    }

    pub fn default_command(&self, id: NodeId) -> Option<&Node> {
        self.nodes[id].default_command.map(|child| &self.nodes[child])
    }

    /// Finds a direct child of `id` by name or alias.
    pub fn find_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[*child].is_named(name))
    }

    /// Finds a node by its chain of names below the root.
    pub fn find_path(&self, names: &[&str]) -> Option<NodeId> {
        names
            .iter()
            .try_fold(self.root, |id, name| self.find_child(id, name))
    }

    /// Ids from the root down to `id`, inclusive.
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.nodes[current].parent {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Space-separated node names from the root down to `id`.
    pub fn full_path(&self, id: NodeId) -> String {
        self.path(id)
            .into_iter()
            .map(|node| self.nodes[node].name.as_str())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Number of ancestors of `id`.
    pub fn depth(&self, id: NodeId) -> usize {
        self.path(id).len() - 1
    }

    /// Flags visible at `id`: ancestors' flags root first, then its own.
    pub fn flags_in_scope(&self, id: NodeId) -> Vec<&Flag> {
        self.path(id)
            .into_iter()
            .flat_map(|node| self.nodes[node].flags.iter())
            .collect()
    }

    /// Template variables at `id`: the application's bindings overlaid by
    /// each node's tag bindings from the root down.
    pub fn vars(&self, id: NodeId) -> Vars {
        self.path(id)
            .into_iter()
            .fold(self.tag.vars.clone(), |vars, node| {
                vars.clone_with(&self.nodes[node].tag.vars)
            })
    }

    /// Nodes without children.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(id, _)| id)
            .collect()
    }

    /// Serializable outline of the whole tree.
    pub fn outline(&self) -> NodeOutline {
        NodeOutline::of(self, self.root)
    }
}
