//! Platform rule sets.
//!
//! A rule set is a small tree of override nodes keyed platform → distribution
//! → release. Each node may carry dependencies, a verification predicate and a
//! build instruction. Resolution picks the most specific declared node for a
//! host and derives a [`Rule`] from it with per-field semantics:
//!
//! - dependencies accumulate from the root down, unless the matched node is
//!   marked `only_needs`
//! - verify falls back to the nearest ancestor that declares one
//! - build is taken from the matched node only and never inherited
//!
//! Nodes live in an arena; parents are indices.

pub mod builder;
pub mod types;

use std::collections::BTreeMap;
use std::fmt::Write as _;

use tracing::trace;

pub use builder::{RuleSetBuilder, Scope};
pub use types::{
  BuildAction, BuildInstruction, Dependency, Level, Rule, RuleError, Verify, VerifyRequest,
};

pub(crate) type NodeId = usize;

/// One override scope.
#[derive(Debug)]
pub(crate) struct OverrideNode {
  pub level: Level,
  pub key: String,
  pub parent: Option<NodeId>,
  pub children: BTreeMap<String, NodeId>,
  pub dependencies: Vec<Dependency>,
  pub verify: Option<Verify>,
  pub build: Option<BuildInstruction>,
  pub only_needs: bool,
}

impl OverrideNode {
  fn new(level: Level, key: &str, parent: Option<NodeId>) -> Self {
    Self {
      level,
      key: key.to_string(),
      parent,
      children: BTreeMap::new(),
      dependencies: Vec::new(),
      verify: None,
      build: None,
      only_needs: false,
    }
  }
}

/// The complete set of override declarations of one ingredient.
#[derive(Debug, Default)]
pub struct RuleSet {
  nodes: Vec<OverrideNode>,
  platforms: BTreeMap<String, NodeId>,
}

impl RuleSet {
  pub fn is_empty(&self) -> bool {
    self.platforms.is_empty()
  }

  /// Declared platform ids.
  pub fn platforms(&self) -> impl Iterator<Item = &str> {
    self.platforms.keys().map(String::as_str)
  }

  /// Resolve the rule for a host.
  ///
  /// Descends platform → distro → release, stopping at the deepest declared
  /// level. An undeclared platform yields an empty, non-buildable rule.
  pub fn resolve(&self, os: &str, distro: Option<&str>, release: Option<&str>) -> Rule {
    let Some(matched) = self.matched(os, distro, release) else {
      trace!(os, "platform not declared");
      return Rule::default();
    };

    let node = &self.nodes[matched];
    trace!(level = %node.level, key = %node.key, "matched override node");

    Rule {
      dependencies: self.dependencies(matched),
      verify: self.verify(matched),
      build: node.build.clone(),
    }
  }

  fn matched(&self, os: &str, distro: Option<&str>, release: Option<&str>) -> Option<NodeId> {
    let mut current = *self.platforms.get(os)?;

    if let Some(distro) = distro
      && let Some(&distro_node) = self.nodes[current].children.get(distro)
    {
      current = distro_node;

      if let Some(release) = release
        && let Some(&release_node) = self.nodes[current].children.get(release)
      {
        current = release_node;
      }
    }

    Some(current)
  }

  /// Node ids from `id` up to its platform root, nearest first.
  fn lineage(&self, id: NodeId) -> impl Iterator<Item = &OverrideNode> {
    std::iter::successors(Some(&self.nodes[id]), |node| node.parent.map(|p| &self.nodes[p]))
  }

  fn dependencies(&self, id: NodeId) -> Vec<Dependency> {
    let node = &self.nodes[id];
    if node.only_needs {
      return node.dependencies.clone();
    }

    let mut chain: Vec<&OverrideNode> = self.lineage(id).collect();
    chain.reverse();
    chain.into_iter().flat_map(|n| n.dependencies.iter().cloned()).collect()
  }

  fn verify(&self, id: NodeId) -> Option<Verify> {
    self.lineage(id).find_map(|node| node.verify.clone())
  }

  /// Render every declaration, one scope per indented block.
  pub fn describe(&self) -> String {
    let mut out = String::new();
    for &id in self.platforms.values() {
      self.describe_node(id, 0, &mut out);
    }
    out
  }

  fn describe_node(&self, id: NodeId, depth: usize, out: &mut String) {
    let node = &self.nodes[id];
    let indent = "  ".repeat(depth);

    let _ = writeln!(out, "{}{}: {}", indent, node.level, node.key);
    if !node.dependencies.is_empty() {
      let names: Vec<String> = node
        .dependencies
        .iter()
        .map(|d| d.spec().to_string())
        .collect();
      let _ = writeln!(out, "{}  needs: {}", indent, names.join(", "));
    }
    if node.only_needs {
      let _ = writeln!(out, "{}  only-needs", indent);
    }
    if node.verify.is_some() {
      let _ = writeln!(out, "{}  verify: yes", indent);
    }
    if let Some(build) = &node.build {
      let _ = writeln!(out, "{}  build: {}", indent, build);
    }

    for &child in node.children.values() {
      self.describe_node(child, depth + 1, out);
    }
  }

  // Arena access for the builder.

  pub(crate) fn node(&self, id: NodeId) -> &OverrideNode {
    &self.nodes[id]
  }

  pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut OverrideNode {
    &mut self.nodes[id]
  }

  pub(crate) fn platform_node(&mut self, key: &str) -> NodeId {
    if let Some(&id) = self.platforms.get(key) {
      return id;
    }
    let id = self.nodes.len();
    self.nodes.push(OverrideNode::new(Level::Platform, key, None));
    self.platforms.insert(key.to_string(), id);
    id
  }

  /// Get or create the child `key` of `parent` one level down.
  pub(crate) fn child_node(&mut self, parent: NodeId, level: Level, key: &str) -> NodeId {
    if let Some(&id) = self.nodes[parent].children.get(key) {
      return id;
    }
    let id = self.nodes.len();
    self.nodes.push(OverrideNode::new(level, key, Some(parent)));
    self.nodes[parent].children.insert(key.to_string(), id);
    id
  }

  /// Human-readable path of a node, e.g. `linux/ubuntu/22.04`.
  pub(crate) fn path(&self, id: NodeId) -> String {
    let mut keys: Vec<&str> = self.lineage(id).map(|n| n.key.as_str()).collect();
    keys.reverse();
    keys.join("/")
  }
}
