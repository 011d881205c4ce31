//! Arena-backed dependency tree.

use crate::ingredient::Ingredient;
use crate::rules::Rule;

use super::types::Issue;

/// Index of a node in a [`DependencyTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
pub struct DependencyNode {
  pub ingredient: Ingredient,
  pub rule: Rule,
  pub issue: Option<Issue>,
  pub children: Vec<NodeId>,
  pub parent: Option<NodeId>,
}

/// Nodes of one resolver run. A node exists before its children.
#[derive(Debug, Default)]
pub struct DependencyTree {
  nodes: Vec<DependencyNode>,
  roots: Vec<NodeId>,
}

impl DependencyTree {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add `node` under its parent, or as a new root.
  pub fn push(&mut self, node: DependencyNode) -> NodeId {
    let id = NodeId(self.nodes.len());
    match node.parent {
      Some(parent) => self.nodes[parent.0].children.push(id),
      None => self.roots.push(id),
    }
    self.nodes.push(node);
    id
  }

  pub fn get(&self, id: NodeId) -> &DependencyNode {
    &self.nodes[id.0]
  }

  pub fn roots(&self) -> &[NodeId] {
    &self.roots
  }

  /// Nodes from `parent` up to its root, nearest first.
  pub fn lineage(&self, parent: Option<NodeId>) -> impl Iterator<Item = &DependencyNode> {
    std::iter::successors(parent.map(|p| self.get(p)), |node| node.parent.map(|p| self.get(p)))
  }

  pub fn depth(&self, id: NodeId) -> usize {
    self.lineage(self.get(id).parent).count()
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  /// Drop every node pushed at or after index `len`.
  pub fn truncate(&mut self, len: usize) {
    self.nodes.truncate(len);
    self.roots.retain(|root| root.0 < len);
    for node in &mut self.nodes {
      node.children.retain(|child| child.0 < len);
    }
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }
}
