//! End-to-end orchestration: declare ingredients, plan, cook.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::execute::{ExecuteConfig, ExecuteError, ExecuteReport, execute};
use crate::ingredient::{IngredientSpec, Options, SpecError};
use crate::manager::ManagerRegistry;
use crate::platform::Host;
use crate::registry::Registry;
use crate::resolve::{IssueDecision, PreparedIngredient, Problem, ResolveError, Resolver, Satisfiability, satisfiable};

#[derive(Debug, Error)]
pub enum KitchenError {
  #[error("invalid ingredient: {0}")]
  InvalidSpec(#[from] SpecError),

  #[error(transparent)]
  Resolve(#[from] ResolveError),

  #[error(transparent)]
  Execute(#[from] ExecuteError),

  /// The issue handler chose to stop.
  #[error("cooking aborted:{}", format_problems(.problems))]
  Aborted { problems: Vec<Problem> },

  /// Problems that skipping entries cannot work around.
  #[error("recipe cannot be cooked:{}", format_problems(.problems))]
  Unsatisfiable { problems: Vec<Problem> },
}

fn format_problems(problems: &[Problem]) -> String {
  problems.iter().map(|p| format!("\n  - {}", p)).collect()
}

/// The resolved build for a recipe.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
  pub host: Host,
  pub sequence: Vec<PreparedIngredient>,
  /// Rendered dependency tree.
  pub tree: String,
}

impl Plan {
  pub fn problems(&self) -> impl Iterator<Item = &PreparedIngredient> {
    self.sequence.iter().filter(|p| p.has_issue())
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct CookReport {
  pub plan: Plan,
  pub satisfiability: Satisfiability,
  pub execution: ExecuteReport,
}

/// Cooks a recipe of ingredients on one host.
#[derive(Debug)]
pub struct Kitchen {
  host: Host,
  registry: Registry,
  managers: ManagerRegistry,
  config: ExecuteConfig,
  recipe: Vec<(IngredientSpec, Options)>,
}

impl Kitchen {
  pub fn new(host: Host, registry: Registry, managers: ManagerRegistry) -> Self {
    Self {
      host,
      registry,
      managers,
      config: ExecuteConfig::default(),
      recipe: Vec::new(),
    }
  }

  /// A kitchen using the built-in ingredients, the configured catalog and
  /// the configured execution settings.
  pub fn from_config(host: Host, config: &Config, managers: ManagerRegistry) -> Self {
    Self::new(host, Registry::with_builtins(config.catalog()), managers).with_execute_config(config.execute_config())
  }

  pub fn with_execute_config(mut self, config: ExecuteConfig) -> Self {
    self.config = config;
    self
  }

  pub fn host(&self) -> &Host {
    &self.host
  }

  pub fn registry(&self) -> &Registry {
    &self.registry
  }

  /// Add `spec` (`name` or `name@requirement`) to the recipe.
  pub fn ingredient(&mut self, spec: &str) -> Result<&mut Self, KitchenError> {
    self.ingredient_with(spec, Options::new())
  }

  pub fn ingredient_with(&mut self, spec: &str, options: Options) -> Result<&mut Self, KitchenError> {
    let spec = IngredientSpec::parse(spec)?;
    self.recipe.push((spec, options));
    Ok(self)
  }

  pub fn recipe(&self) -> impl Iterator<Item = &IngredientSpec> {
    self.recipe.iter().map(|(spec, _)| spec)
  }

  /// Resolve the recipe into a build sequence.
  pub fn plan(&self) -> Result<Plan, KitchenError> {
    let mut resolver = Resolver::new(&self.host, &self.registry);
    for (spec, options) in &self.recipe {
      resolver.add(spec.clone(), options.clone())?;
    }

    Ok(Plan {
      host: self.host.clone(),
      sequence: resolver.flatten(),
      tree: resolver.render_tree(),
    })
  }

  /// Plan, check satisfiability and execute.
  ///
  /// `handler` is consulted only when problems exist. On
  /// [`IssueDecision::Abort`] nothing is prepared or installed; on
  /// [`IssueDecision::Proceed`] entries with issues are skipped, but missing
  /// or unknown package managers still stop the run.
  pub async fn cook<H>(&self, handler: H) -> Result<CookReport, KitchenError>
  where
    H: FnOnce(&[Problem]) -> IssueDecision,
  {
    let plan = self.plan()?;
    info!(host = %self.host, steps = plan.sequence.len(), "cooking");

    let satisfiability = satisfiable(&plan.sequence, &self.managers, handler).await;

    match satisfiability.decision {
      Some(IssueDecision::Abort) => {
        warn!(problems = satisfiability.problems.len(), "aborting");
        return Err(KitchenError::Aborted {
          problems: satisfiability.problems,
        });
      }
      Some(IssueDecision::Proceed) => {
        let blocking: Vec<Problem> = satisfiability
          .problems
          .iter()
          .filter(|p| !matches!(p, Problem::Ingredient { .. }))
          .cloned()
          .collect();
        if !blocking.is_empty() {
          return Err(KitchenError::Unsatisfiable { problems: blocking });
        }
        warn!(problems = satisfiability.problems.len(), "proceeding despite problems");
      }
      None => {}
    }

    let execution = execute(&plan.sequence, &self.managers, &self.config).await?;

    Ok(CookReport {
      plan,
      satisfiability,
      execution,
    })
  }
}
