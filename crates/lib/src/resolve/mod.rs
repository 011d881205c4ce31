//! Dependency resolution.
//!
//! The [`Resolver`] expands requested ingredients into a dependency tree for a
//! given [`Host`], recording problems as [`Issue`]s on the nodes instead of
//! failing. [`Resolver::flatten`] turns the tree into an ordered build
//! sequence and [`satisfiable`] checks that sequence against the available
//! package managers.

pub mod tree;
pub mod types;

use std::collections::HashSet;
use std::fmt::Write as _;

use tracing::{debug, info, warn};

use crate::ingredient::{Ingredient, IngredientSpec, Options};
use crate::manager::ManagerRegistry;
use crate::platform::Host;
use crate::registry::Registry;
use crate::rules::Rule;

pub use tree::{DependencyNode, DependencyTree, NodeId};
pub use types::{Issue, IssueDecision, PreparedIngredient, Problem, ResolveError, Satisfiability};

/// Expands ingredients into a dependency tree for one host.
#[derive(Debug)]
pub struct Resolver<'a> {
  host: &'a Host,
  registry: &'a Registry,
  tree: DependencyTree,
}

impl<'a> Resolver<'a> {
  pub fn new(host: &'a Host, registry: &'a Registry) -> Self {
    Self {
      host,
      registry,
      tree: DependencyTree::new(),
    }
  }

  /// Add the ingredient `spec` (`name` or `name@requirement`) and everything it needs.
  pub fn add_ingredient(&mut self, spec: &str) -> Result<NodeId, ResolveError> {
    self.add(IngredientSpec::parse(spec)?, Options::new())
  }

  /// Add a parsed ingredient with options and everything it needs.
  ///
  /// On error the tree is left as it was before the call.
  pub fn add(&mut self, spec: IngredientSpec, options: Options) -> Result<NodeId, ResolveError> {
    info!(ingredient = %spec, host = %self.host, "resolving");
    let mark = self.tree.len();
    self.expand(spec, options, None).inspect_err(|e| {
      debug!(error = %e, discarded = self.tree.len() - mark, "discarding partial dependency tree");
      self.tree.truncate(mark);
    })
  }

  pub fn tree(&self) -> &DependencyTree {
    &self.tree
  }

  fn expand(&mut self, spec: IngredientSpec, options: Options, parent: Option<NodeId>) -> Result<NodeId, ResolveError> {
    let def = self
      .registry
      .lookup(&spec.name)
      .ok_or_else(|| ResolveError::UnknownIngredient {
        name: spec.name.clone(),
      })?;
    let ingredient = Ingredient::new(spec, options, def);

    let (mut rule, mut issue) = match ingredient.rules() {
      Ok(rules) => {
        let rule = rules.resolve(&self.host.os, self.host.distribution(), self.host.release());
        let issue = (!rule.buildable()).then_some(Issue::CannotBuild);
        (rule, issue)
      }
      Err(e) => {
        debug!(ingredient = %ingredient.name(), error = %e, "rule set unavailable");
        (Rule::default(), Some(Issue::CannotSatisfy))
      }
    };

    if self.tree.lineage(parent).any(|n| n.ingredient.name() == ingredient.name()) {
      rule = Rule::default();
      issue = Some(Issue::Circular);
    }

    if let Some(issue) = issue {
      warn!(ingredient = %ingredient.name(), issue = %issue, host = %self.host, "dependency issue");
    }

    let dependencies = rule.dependencies.clone();
    let id = self.tree.push(DependencyNode {
      ingredient,
      rule,
      issue,
      children: Vec::new(),
      parent,
    });

    for dependency in dependencies {
      let spec = dependency.spec();
      self.expand(spec, dependency.options, Some(id))?;
    }

    Ok(id)
  }

  /// The build sequence: dependencies before dependents, in declared order.
  ///
  /// A later occurrence of a name is dropped when an earlier occurrence
  /// without an issue exists. Entries with issues are always kept.
  pub fn flatten(&self) -> Vec<PreparedIngredient> {
    let mut sequence = Vec::with_capacity(self.tree.len());
    for &root in self.tree.roots() {
      self.post_order(root, &mut sequence);
    }

    let mut clean = HashSet::new();
    sequence.retain(|p: &PreparedIngredient| p.has_issue() || clean.insert(p.name.clone()));

    debug!(steps = sequence.len(), nodes = self.tree.len(), "flattened dependency tree");
    sequence
  }

  fn post_order(&self, id: NodeId, out: &mut Vec<PreparedIngredient>) {
    let node = self.tree.get(id);
    for &child in &node.children {
      self.post_order(child, out);
    }
    out.push(PreparedIngredient {
      name: node.ingredient.name().to_string(),
      version: node.ingredient.version().clone(),
      options: node.ingredient.options().clone(),
      verify: node.rule.verify.clone(),
      build: node.rule.build.clone(),
      issue: node.issue,
    });
  }

  /// Flatten and check the sequence with [`satisfiable`].
  pub async fn satisfiable<H>(&self, managers: &ManagerRegistry, handler: H) -> Satisfiability
  where
    H: FnOnce(&[Problem]) -> IssueDecision,
  {
    satisfiable(&self.flatten(), managers, handler).await
  }

  /// Render the dependency tree, one node per line.
  pub fn render_tree(&self) -> String {
    let mut out = String::new();
    for &root in self.tree.roots() {
      self.render_node(root, &mut out);
    }
    out
  }

  fn render_node(&self, id: NodeId, out: &mut String) {
    let node = self.tree.get(id);
    let indent = "  ".repeat(self.tree.depth(id));
    let _ = write!(out, "{}{}@{}", indent, node.ingredient.name(), node.ingredient.version());
    if let Some(parent) = node.parent {
      let _ = write!(out, " <- {}", self.tree.get(parent).ingredient.name());
    }
    if let Some(issue) = node.issue {
      let _ = write!(out, " !{}", issue);
    }
    out.push('\n');
    for &child in &node.children {
      self.render_node(child, out);
    }
  }
}

/// Check a build sequence for problems.
///
/// Collects every ingredient issue, then asks each manager referenced by a
/// buildable entry whether it is installed, one at a time in first-seen
/// order. When problems exist, `handler` decides what happens next.
pub async fn satisfiable<H>(sequence: &[PreparedIngredient], managers: &ManagerRegistry, handler: H) -> Satisfiability
where
  H: FnOnce(&[Problem]) -> IssueDecision,
{
  let mut result = Satisfiability::default();

  for prepared in sequence {
    if let Some(issue) = prepared.issue {
      result.problems.push(Problem::Ingredient {
        name: prepared.name.clone(),
        issue,
      });
    }
  }

  for manager in sequence.iter().filter_map(PreparedIngredient::manager) {
    if !result.managers.iter().any(|m| m == manager) {
      result.managers.push(manager.to_string());
    }
  }

  for name in &result.managers {
    match managers.get(name) {
      Some(manager) => {
        if !manager.installed().await {
          warn!(manager = %name, "package manager not installed");
          result.problems.push(Problem::ManagerUnavailable { manager: name.clone() });
        }
      }
      None => {
        warn!(manager = %name, "no backend for package manager");
        result.problems.push(Problem::ManagerUnknown { manager: name.clone() });
      }
    }
  }

  if !result.problems.is_empty() {
    let decision = handler(&result.problems);
    info!(problems = result.problems.len(), decision = %decision, "build is not fully satisfiable");
    result.decision = Some(decision);
  }

  result
}

/// Handler that stops on any problem.
pub fn abort_on_problems(_problems: &[Problem]) -> IssueDecision {
  IssueDecision::Abort
}

/// Handler that carries on, skipping entries with issues.
pub fn proceed_on_problems(_problems: &[Problem]) -> IssueDecision {
  IssueDecision::Proceed
}
