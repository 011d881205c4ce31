//! Build-sequence execution.
//!
//! Drives a flattened sequence against the package managers:
//! - entries carrying an issue are skipped
//! - every referenced manager is prepared once, in first-seen order, before
//!   any install
//! - installs run strictly in sequence order and stop at the first failure

pub mod types;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::manager::{ManagerRegistry, PackageManager};
use crate::resolve::{Issue, PreparedIngredient};
use crate::rules::BuildInstruction;

pub use types::{ExecuteConfig, ExecuteError, ExecuteReport, InstallRecord, Outcome};

/// Execute `sequence` against `managers`.
pub async fn execute(
  sequence: &[PreparedIngredient],
  managers: &ManagerRegistry,
  config: &ExecuteConfig,
) -> Result<ExecuteReport, ExecuteError> {
  info!(steps = sequence.len(), "starting build execution");

  let mut report = ExecuteReport::default();

  // Resolve every backend up front so an unknown manager fails before any action.
  let mut backends: Vec<(&str, &Arc<dyn PackageManager>)> = Vec::new();
  for (prepared, build) in buildable(sequence) {
    if backends.iter().any(|(name, _)| *name == build.manager) {
      continue;
    }
    let backend = managers.get(&build.manager).ok_or_else(|| ExecuteError::UnknownManager {
      manager: build.manager.clone(),
      ingredient: prepared.name.clone(),
    })?;
    backends.push((build.manager.as_str(), backend));
  }

  for (name, backend) in &backends {
    debug!(manager = %name, "preparing package manager");
    bounded(format!("{} prepare", name), config.action_timeout, async {
      backend.prepare().await.map_err(|source| ExecuteError::PrepareFailed {
        manager: name.to_string(),
        source,
      })
    })
    .await?;
    report.prepared.push(name.to_string());
  }

  for prepared in sequence {
    let build = match (prepared.issue, &prepared.build) {
      (None, Some(build)) => build,
      (issue, _) => {
        let issue = issue.unwrap_or(Issue::CannotBuild);
        warn!(ingredient = %prepared.name, issue = %issue, "skipping ingredient");
        report.records.push(InstallRecord {
          name: prepared.name.clone(),
          manager: None,
          target: None,
          outcome: Outcome::Skipped { issue },
        });
        continue;
      }
    };

    let outcome = if config.verify && prepared.is_present() == Some(true) {
      info!(ingredient = %prepared.name, "already present");
      Outcome::AlreadyPresent
    } else {
      let output = install(prepared, build, managers, config.action_timeout).await?;
      info!(ingredient = %prepared.name, manager = %build.manager, target = %build.target, "installed");
      Outcome::Installed { output }
    };

    report.records.push(InstallRecord {
      name: prepared.name.clone(),
      manager: Some(build.manager.clone()),
      target: Some(build.target.clone()),
      outcome,
    });
  }

  info!(
    installed = report.installed(),
    present = report.already_present(),
    skipped = report.skipped(),
    "build execution complete"
  );

  Ok(report)
}

fn buildable(sequence: &[PreparedIngredient]) -> impl Iterator<Item = (&PreparedIngredient, &BuildInstruction)> {
  sequence
    .iter()
    .filter(|p| !p.has_issue())
    .filter_map(|p| p.build.as_ref().map(|b| (p, b)))
}

async fn install(
  prepared: &PreparedIngredient,
  build: &BuildInstruction,
  managers: &ManagerRegistry,
  timeout: Option<Duration>,
) -> Result<String, ExecuteError> {
  let backend = managers.get(&build.manager).ok_or_else(|| ExecuteError::UnknownManager {
    manager: build.manager.clone(),
    ingredient: prepared.name.clone(),
  })?;
  let version = prepared.version.install_version();

  let result = bounded(build.to_string(), timeout, async {
    backend
      .install(&prepared.name, &build.target, version.as_deref(), &prepared.options)
      .await
      .map_err(|source| ExecuteError::InstallFailed {
        ingredient: prepared.name.clone(),
        manager: build.manager.clone(),
        source,
      })
  })
  .await;

  if let Err(e) = &result {
    error!(ingredient = %prepared.name, error = %e, "install failed");
  }
  result
}

/// Run `action` under `limit`, if any.
async fn bounded<T, F>(action: String, limit: Option<Duration>, fut: F) -> Result<T, ExecuteError>
where
  F: Future<Output = Result<T, ExecuteError>>,
{
  match limit {
    Some(after) => tokio::time::timeout(after, fut)
      .await
      .map_err(|_| ExecuteError::Timeout { action, after })?,
    None => fut.await,
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use super::*;
  use crate::ingredient::{IngredientVersion, Options};
  use crate::manager::ManagerError;
  use crate::rules::Verify;
  use crate::util::testutil::{FakeManager, Journal};

  fn step(name: &str, build: BuildInstruction) -> PreparedIngredient {
    PreparedIngredient {
      name: name.to_string(),
      version: IngredientVersion::Latest,
      options: Options::new(),
      verify: None,
      build: Some(build),
      issue: None,
    }
  }

  fn broken(name: &str, issue: Issue) -> PreparedIngredient {
    PreparedIngredient {
      build: None,
      issue: Some(issue),
      ..step(name, BuildInstruction::apt(name))
    }
  }

  fn registry(fakes: Vec<(&str, FakeManager)>) -> (ManagerRegistry, Vec<Arc<FakeManager>>) {
    let mut registry = ManagerRegistry::new();
    let mut handles = Vec::new();
    for (name, fake) in fakes {
      let fake = Arc::new(fake);
      registry.register(name, fake.clone());
      handles.push(fake);
    }
    (registry, handles)
  }

  #[tokio::test]
  async fn prepares_each_manager_once_before_installs() {
    let journal = Journal::default();
    let (managers, _) = registry(vec![
      ("apt", FakeManager::new("apt").with_journal(&journal)),
      ("bash", FakeManager::new("bash").with_journal(&journal)),
    ]);
    let sequence = vec![
      step("curl", BuildInstruction::apt("curl")),
      step("tool", BuildInstruction::bash("/opt/tool.sh")),
      step("git", BuildInstruction::apt("git")),
    ];

    let report = execute(&sequence, &managers, &ExecuteConfig::default()).await.unwrap();

    assert_eq!(
      *journal.lock().unwrap(),
      vec![
        "apt: prepare",
        "bash: prepare",
        "apt: install curl",
        "bash: install /opt/tool.sh",
        "apt: install git",
      ]
    );
    assert_eq!(report.prepared, vec!["apt", "bash"]);
    assert_eq!(report.installed(), 3);
  }

  #[tokio::test]
  async fn first_failure_stops_the_rest() {
    let (managers, fakes) = registry(vec![("apt", FakeManager::new("apt").failing_install("curl"))]);
    let sequence = vec![
      step("ca_certificates", BuildInstruction::apt("ca-certificates")),
      step("curl", BuildInstruction::apt("curl")),
      step("git", BuildInstruction::apt("git")),
    ];

    let err = execute(&sequence, &managers, &ExecuteConfig::default())
      .await
      .unwrap_err();

    assert!(matches!(err, ExecuteError::InstallFailed { ref ingredient, .. } if ingredient == "curl"));
    assert_eq!(err.output(), Some("E: Unable to locate package curl"));
    assert_eq!(
      fakes[0].actions(),
      vec!["prepare", "install ca-certificates", "install curl"]
    );
  }

  #[tokio::test]
  async fn prepare_failure_installs_nothing() {
    let (managers, fakes) = registry(vec![("apt", FakeManager::new("apt").failing_prepare())]);
    let sequence = vec![step("curl", BuildInstruction::apt("curl"))];

    let err = execute(&sequence, &managers, &ExecuteConfig::default())
      .await
      .unwrap_err();

    assert!(matches!(err, ExecuteError::PrepareFailed { .. }));
    assert_eq!(fakes[0].actions(), vec!["prepare"]);
  }

  #[tokio::test]
  async fn entries_with_issues_are_skipped() {
    let (managers, fakes) = registry(vec![("apt", FakeManager::new("apt"))]);
    let sequence = vec![
      broken("a", Issue::Circular),
      step("curl", BuildInstruction::apt("curl")),
      broken("jq", Issue::CannotBuild),
    ];

    let report = execute(&sequence, &managers, &ExecuteConfig::default()).await.unwrap();

    assert_eq!(fakes[0].actions(), vec!["prepare", "install curl"]);
    let outcomes: Vec<_> = report.records.iter().map(|r| (r.name.as_str(), &r.outcome)).collect();
    assert_eq!(outcomes[0], ("a", &Outcome::Skipped { issue: Issue::Circular }));
    assert_eq!(outcomes[2], ("jq", &Outcome::Skipped { issue: Issue::CannotBuild }));
    assert_eq!(report.skipped(), 2);
  }

  #[tokio::test]
  async fn unknown_manager_fails_before_any_action() {
    let (managers, fakes) = registry(vec![("apt", FakeManager::new("apt"))]);
    let sequence = vec![
      step("curl", BuildInstruction::apt("curl")),
      step("tool", BuildInstruction::package("pacman", "tool")),
    ];

    let err = execute(&sequence, &managers, &ExecuteConfig::default())
      .await
      .unwrap_err();

    assert!(matches!(err, ExecuteError::UnknownManager { ref manager, .. } if manager == "pacman"));
    assert!(fakes[0].actions().is_empty());
  }

  #[tokio::test]
  async fn slow_install_times_out() {
    let (managers, _) = registry(vec![("apt", FakeManager::new("apt").slow(Duration::from_secs(30)))]);
    let sequence = vec![step("curl", BuildInstruction::apt("curl"))];
    let config = ExecuteConfig {
      action_timeout: Some(Duration::from_millis(50)),
      verify: false,
    };

    let err = execute(&sequence, &managers, &config).await.unwrap_err();

    assert!(matches!(err, ExecuteError::Timeout { ref action, .. } if action == "apt install curl"));
  }

  #[tokio::test]
  async fn verified_entries_are_not_reinstalled() {
    let (managers, fakes) = registry(vec![("apt", FakeManager::new("apt"))]);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let probe = Arc::clone(&seen);
    let mut git = step("git", BuildInstruction::apt("git"));
    git.verify = Some(Verify::new(move |req| {
      probe.lock().unwrap().push(req.name.to_string());
      true
    }));
    let sequence = vec![step("curl", BuildInstruction::apt("curl")), git];

    let config = ExecuteConfig {
      action_timeout: None,
      verify: true,
    };
    let report = execute(&sequence, &managers, &config).await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["git"]);
    assert_eq!(fakes[0].actions(), vec!["prepare", "install curl"]);
    assert_eq!(report.already_present(), 1);

    // without verification the predicate is ignored
    let report = execute(&sequence, &managers, &ExecuteConfig::default()).await.unwrap();
    assert_eq!(report.installed(), 2);
  }

  #[tokio::test]
  async fn passes_version_and_options_through() {
    struct Capture(Mutex<Option<(String, Option<String>, Options)>>);

    #[async_trait::async_trait]
    impl PackageManager for Capture {
      fn command(&self) -> &str {
        "capture"
      }
      async fn version(&self) -> Result<String, ManagerError> {
        Ok("1.0.0".to_string())
      }
      async fn prepare(&self) -> Result<(), ManagerError> {
        Ok(())
      }
      async fn install(
        &self,
        name: &str,
        _target: &str,
        version: Option<&str>,
        options: &Options,
      ) -> Result<String, ManagerError> {
        *self.0.lock().unwrap() = Some((name.to_string(), version.map(String::from), options.clone()));
        Ok(String::new())
      }
    }

    let capture = Arc::new(Capture(Mutex::new(None)));
    let mut managers = ManagerRegistry::new();
    managers.register("bash", capture.clone());

    let mut repo = step("repo", BuildInstruction::bash("/opt/repo.sh"));
    repo.version = crate::ingredient::IngredientSpec::parse("repo@=1.2.3").unwrap().version;
    repo.options.insert("to".to_string(), "/srv".to_string());

    execute(&[repo], &managers, &ExecuteConfig::default()).await.unwrap();

    let (name, version, options) = capture.0.lock().unwrap().clone().unwrap();
    assert_eq!(name, "repo");
    assert_eq!(version.as_deref(), Some("=1.2.3"));
    assert_eq!(options["to"], "/srv");
  }
}
