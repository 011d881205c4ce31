//! Catalog of generic ingredients.
//!
//! Most ingredients are nothing more than "install this package with that
//! manager". The catalog maps an ingredient name to one package name per
//! manager, and [`GenericIngredient`] turns an entry into rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ingredient::{Ingredient, IngredientDef};
use crate::rules::{BuildInstruction, RuleError, RuleSetBuilder};

/// Package names of one ingredient, keyed by manager.
pub type CatalogEntry = BTreeMap<String, String>;

const BUILTIN: &[(&str, &str)] = &[
  ("ca_certificates", "ca-certificates"),
  ("curl", "curl"),
  ("git", "git"),
  ("gpg", "gpg"),
  ("nano", "nano"),
  ("pkg_config", "pkg-config"),
  ("python_dev", "python3-dev"),
  ("python_pip", "python3-pip"),
  ("python_setuptools", "python3-setuptools"),
  ("screen", "screen"),
  ("software_properties_common", "software-properties-common"),
  ("sudo", "sudo"),
  ("tmux", "tmux"),
  ("unzip", "unzip"),
  ("vim", "vim"),
  ("wget", "wget"),
  ("xz_utils", "xz-utils"),
];

/// Distributions served by a distribution-specific manager.
///
/// Managers not listed here build at platform level.
pub fn distributions(manager: &str) -> &'static [&'static str] {
  match manager {
    "apt" => &["debian", "ubuntu"],
    _ => &[],
  }
}

/// Name → manager → package mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
  entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
  pub fn new() -> Self {
    Self::default()
  }

  /// The built-in apt catalog.
  pub fn builtin() -> Self {
    let entries = BUILTIN
      .iter()
      .map(|(name, package)| (name.to_string(), CatalogEntry::from([("apt".to_string(), package.to_string())])))
      .collect();
    Self { entries }
  }

  pub fn insert(&mut self, name: impl Into<String>, entry: CatalogEntry) -> &mut Self {
    self.entries.insert(name.into(), entry);
    self
  }

  /// Add `other`'s entries. Per-manager packages in `other` replace existing
  /// ones; managers it does not mention are kept.
  pub fn merge(&mut self, other: Catalog) -> &mut Self {
    for (name, entry) in other.entries {
      debug!(ingredient = %name, "merging catalog entry");
      self.entries.entry(name).or_default().extend(entry);
    }
    self
  }

  pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
    self.entries.get(name)
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.entries.keys().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// An ingredient defined entirely by a catalog entry.
///
/// On `linux`, managers serving specific distributions build at distro level
/// for each of them. A platform level holds one build, so of the remaining
/// managers only the first by name builds there; the rest are ignored.
#[derive(Debug, Clone)]
pub struct GenericIngredient {
  packages: CatalogEntry,
}

impl GenericIngredient {
  pub fn new(packages: CatalogEntry) -> Self {
    Self { packages }
  }
}

impl IngredientDef for GenericIngredient {
  fn setup(&self, rules: &mut RuleSetBuilder, ingredient: &Ingredient) -> Result<(), RuleError> {
    if self.packages.is_empty() {
      return Ok(());
    }

    rules.platform("linux", |linux| {
      let mut platform_build: Option<BuildInstruction> = None;
      for (manager, package) in &self.packages {
        let instruction = BuildInstruction::package(manager.as_str(), package.as_str());
        match distributions(manager) {
          [] => match &platform_build {
            Some(chosen) => {
              debug!(ingredient = %ingredient.name(), chosen = %chosen, ignored = %instruction, "platform build already chosen");
            }
            None => platform_build = Some(instruction),
          },
          distros => {
            for distro in distros {
              linux.build_distro(distro, instruction.clone())?;
            }
          }
        }
      }
      if let Some(instruction) = platform_build {
        linux.build(instruction)?;
      }
      Ok(())
    })?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::ingredient::{IngredientSpec, Options};

  fn rules_of(entry: CatalogEntry) -> Ingredient {
    Ingredient::new(
      IngredientSpec::latest("thing"),
      Options::new(),
      Arc::new(GenericIngredient::new(entry)),
    )
  }

  #[test]
  fn builtin_maps_underscored_names() {
    let catalog = Catalog::builtin();
    assert_eq!(catalog.len(), 17);
    assert_eq!(catalog.get("ca_certificates").unwrap()["apt"], "ca-certificates");
    assert_eq!(catalog.get("xz_utils").unwrap()["apt"], "xz-utils");
    assert!(catalog.get("python").is_none());
  }

  #[test]
  fn merge_replaces_per_manager() {
    let mut catalog = Catalog::builtin();
    let mut extra = Catalog::new();
    extra.insert("curl", CatalogEntry::from([("bash".to_string(), "/opt/curl.sh".to_string())]));
    extra.insert("jq", CatalogEntry::from([("apt".to_string(), "jq".to_string())]));
    catalog.merge(extra);

    let curl = catalog.get("curl").unwrap();
    assert_eq!(curl["apt"], "curl");
    assert_eq!(curl["bash"], "/opt/curl.sh");
    assert_eq!(catalog.get("jq").unwrap()["apt"], "jq");
  }

  #[test]
  fn deserializes_from_toml_tables() {
    let catalog: Catalog = toml::from_str(
      r#"
[jq]
apt = "jq"

[rustup]
bash = "/opt/scripts/rustup.sh"
"#,
    )
    .unwrap();
    assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["jq", "rustup"]);
  }

  #[test]
  fn apt_entry_builds_on_debian_family_only() {
    let ingredient = rules_of(CatalogEntry::from([("apt".to_string(), "curl".to_string())]));
    let rules = ingredient.rules().unwrap();

    for distro in ["ubuntu", "debian"] {
      let rule = rules.resolve("linux", Some(distro), Some("12"));
      assert_eq!(rule.build, Some(BuildInstruction::apt("curl")));
    }
    assert!(!rules.resolve("linux", Some("fedora"), None).buildable());
    assert!(!rules.resolve("linux", None, None).buildable());
    assert!(!rules.resolve("darwin", None, None).buildable());
  }

  #[test]
  fn other_managers_build_at_platform_level() {
    let ingredient = rules_of(CatalogEntry::from([
      ("apt".to_string(), "rustc".to_string()),
      ("bash".to_string(), "/opt/rustup.sh".to_string()),
    ]));
    let rules = ingredient.rules().unwrap();

    assert_eq!(
      rules.resolve("linux", Some("ubuntu"), None).build,
      Some(BuildInstruction::apt("rustc"))
    );
    assert_eq!(
      rules.resolve("linux", Some("arch"), None).build,
      Some(BuildInstruction::bash("/opt/rustup.sh"))
    );
  }

  #[test]
  fn first_platform_manager_by_name_wins() {
    let ingredient = rules_of(CatalogEntry::from([
      ("pip".to_string(), "tool".to_string()),
      ("bash".to_string(), "/opt/tool.sh".to_string()),
      ("apt".to_string(), "tool".to_string()),
    ]));
    let rules = ingredient.rules().unwrap();

    assert_eq!(
      rules.resolve("linux", Some("arch"), None).build,
      Some(BuildInstruction::bash("/opt/tool.sh"))
    );
    assert_eq!(
      rules.resolve("linux", Some("debian"), None).build,
      Some(BuildInstruction::apt("tool"))
    );
  }

  #[test]
  fn empty_entry_declares_nothing() {
    let ingredient = rules_of(CatalogEntry::new());
    assert!(ingredient.rules().unwrap().is_empty());
  }
}
