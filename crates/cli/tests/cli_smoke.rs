//! CLI smoke tests for sous.
//!
//! Every command runs against an explicit host (`--os/--distro/--release`) and
//! an isolated config path, and cooking only ever uses `--dry-run`.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const UBUNTU: &[&str] = &["--os", "linux", "--distro", "ubuntu", "--release", "22.04"];

/// A sous command reading its config from `config_dir`.
fn sous_cmd(config_dir: &TempDir) -> Command {
  let mut cmd = cargo_bin_cmd!("sous");
  cmd.env("SOUS_CONFIG", config_dir.path().join("config.toml"));
  cmd.env_remove("RUST_LOG");
  cmd
}

/// A temp dir holding `config.toml` with `content`.
fn temp_config(content: &str) -> TempDir {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("config.toml"), content).unwrap();
  temp
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  let temp = TempDir::new().unwrap();
  sous_cmd(&temp)
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  let temp = TempDir::new().unwrap();
  sous_cmd(&temp)
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("sous"));
}

#[test]
fn subcommand_help_works() {
  let temp = TempDir::new().unwrap();
  for cmd in &["info", "list", "plan", "tree", "rules", "cook"] {
    sous_cmd(&temp)
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// Info & List
// =============================================================================

#[test]
fn info_shows_host_and_config() {
  let temp = TempDir::new().unwrap();
  sous_cmd(&temp)
    .arg("info")
    .assert()
    .success()
    .stdout(predicate::str::contains("Host:"))
    .stdout(predicate::str::contains("Policy: abort"));
}

#[test]
fn info_json_is_valid() {
  let temp = temp_config("verify = true\n");
  let output = sous_cmd(&temp).args(["info", "-o", "json"]).output().unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["verify"], true);
  assert_eq!(json["ingredients"], 19);
}

#[test]
fn list_includes_builtins_and_config_catalog() {
  let temp = temp_config("[catalog.jq]\napt = \"jq\"\n");
  sous_cmd(&temp)
    .arg("list")
    .assert()
    .success()
    .stdout(predicate::str::is_match(r"git\s+\(dedicated\)").unwrap())
    .stdout(predicate::str::is_match(r"xz_utils\s+apt:xz-utils").unwrap())
    .stdout(predicate::str::is_match(r"jq\s+apt:jq").unwrap());
}

// =============================================================================
// Plan, Tree & Rules
// =============================================================================

#[test]
fn plan_orders_dependencies_first() {
  let temp = TempDir::new().unwrap();
  sous_cmd(&temp)
    .arg("plan")
    .arg("git")
    .args(UBUNTU)
    .assert()
    .success()
    .stdout(predicate::str::contains("Plan for linux/ubuntu/22.04: 3 steps"))
    .stdout(
      predicate::str::is_match(r"(?s)apt install ca-certificates.*apt install curl.*apt install git").unwrap(),
    );
}

#[test]
fn plan_json_lists_sequence() {
  let temp = TempDir::new().unwrap();
  let output = sous_cmd(&temp)
    .args(["plan", "git", "-o", "json"])
    .args(UBUNTU)
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let names: Vec<&str> = json["sequence"]
    .as_array()
    .unwrap()
    .iter()
    .map(|s| s["name"].as_str().unwrap())
    .collect();
  assert_eq!(names, vec!["ca_certificates", "curl", "git"]);
  assert_eq!(json["sequence"][0]["build"]["target"], "ca-certificates");
  assert_eq!(json["host"]["distribution"], "ubuntu");
}

#[test]
fn plan_warns_about_unbuildable_ingredients() {
  let temp = TempDir::new().unwrap();
  sous_cmd(&temp)
    .args(["plan", "curl", "--os", "darwin"])
    .assert()
    .success()
    .stdout(predicate::str::contains("[cannot_build]"))
    .stderr(predicate::str::contains("1 ingredient cannot be built on darwin"));
}

#[test]
fn plan_rejects_unknown_ingredient() {
  let temp = TempDir::new().unwrap();
  sous_cmd(&temp)
    .args(["plan", "left_pad"])
    .args(UBUNTU)
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown ingredient 'left_pad'"));
}

#[test]
fn plan_rejects_invalid_version() {
  let temp = TempDir::new().unwrap();
  sous_cmd(&temp)
    .args(["plan", "curl@banana"])
    .args(UBUNTU)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Invalid ingredient: curl@banana"));
}

#[test]
fn tree_shows_parents() {
  let temp = TempDir::new().unwrap();
  sous_cmd(&temp)
    .args(["tree", "git"])
    .args(UBUNTU)
    .assert()
    .success()
    .stdout(predicate::str::contains("git@latest\n  ca_certificates@latest <- git\n  curl@latest <- git\n"));
}

#[test]
fn rules_describe_declarations() {
  let temp = TempDir::new().unwrap();
  sous_cmd(&temp)
    .args(["rules", "git"])
    .assert()
    .success()
    .stdout(predicate::str::contains("platform: linux"))
    .stdout(predicate::str::contains("needs: ca_certificates, curl"))
    .stdout(predicate::str::contains("build: apt install git"));
}

#[test]
fn rules_unknown_ingredient_fails() {
  let temp = TempDir::new().unwrap();
  sous_cmd(&temp)
    .args(["rules", "left_pad"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Unknown ingredient: left_pad"));
}

// =============================================================================
// Cook
// =============================================================================

#[test]
fn cook_dry_run_lists_actions() {
  let temp = TempDir::new().unwrap();
  sous_cmd(&temp)
    .args(["cook", "git", "--dry-run"])
    .args(UBUNTU)
    .assert()
    .success()
    .stdout(predicate::str::is_match(r"(?s)apt install ca-certificates.*apt install curl.*apt install git").unwrap())
    .stdout(predicate::str::contains("Would install 3 ingredients"));
}

#[test]
fn cook_git_repo_runs_bundled_script() {
  let temp = TempDir::new().unwrap();
  let script = temp.path().join("data/sous/scripts/git_repo/ubuntu.sh");
  sous_cmd(&temp)
    .env("XDG_DATA_HOME", temp.path().join("data"))
    .args(["cook", "git_repo", "--dry-run", "-s", "repo=https://example.com/r.git", "-s", "to=/srv/r"])
    .args(UBUNTU)
    .assert()
    .success()
    .stdout(predicate::str::contains("apt install git"))
    .stdout(predicate::str::contains(format!("bash install {}", script.display())))
    .stdout(predicate::str::contains("Would install 2 ingredients"));
  assert!(script.is_file());
}

#[test]
fn cook_aborts_on_problems_by_default() {
  let temp = TempDir::new().unwrap();
  sous_cmd(&temp)
    .args(["cook", "curl", "--dry-run", "--os", "darwin"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("ingredient 'curl': cannot_build"))
    .stderr(predicate::str::contains("cooking aborted"));
}

#[test]
fn cook_proceed_skips_problems() {
  let temp = TempDir::new().unwrap();
  sous_cmd(&temp)
    .args(["cook", "curl", "--dry-run", "--proceed", "--os", "darwin"])
    .assert()
    .success()
    .stderr(predicate::str::contains("curl skipped: cannot_build"))
    .stdout(predicate::str::contains("Would install 0 ingredients"));
}

#[test]
fn cook_policy_comes_from_config() {
  let temp = temp_config("policy = \"proceed\"\n");
  sous_cmd(&temp)
    .args(["cook", "curl", "--dry-run", "--os", "darwin"])
    .assert()
    .success();
}

#[test]
fn cook_json_report() {
  let temp = TempDir::new().unwrap();
  let output = sous_cmd(&temp)
    .args(["cook", "vim", "--dry-run", "-o", "json"])
    .args(UBUNTU)
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["execution"]["prepared"][0], "apt");
  assert_eq!(json["execution"]["records"][0]["outcome"], "installed");
  assert_eq!(json["execution"]["records"][0]["output"], "apt install vim");
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn config_catalog_entries_are_cookable() {
  let temp = temp_config("[catalog.jq]\napt = \"jq\"\n");
  sous_cmd(&temp)
    .args(["cook", "jq", "--dry-run"])
    .args(UBUNTU)
    .assert()
    .success()
    .stdout(predicate::str::contains("apt install jq"));
}

#[test]
fn invalid_config_fails() {
  let temp = temp_config("policy = \"sometimes\"\n");
  sous_cmd(&temp)
    .args(["plan", "git"])
    .args(UBUNTU)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn explicit_config_flag_must_exist() {
  let temp = TempDir::new().unwrap();
  sous_cmd(&temp)
    .args(["--config"])
    .arg(temp.path().join("missing.toml"))
    .args(["plan", "git"])
    .args(UBUNTU)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load config"));
}
