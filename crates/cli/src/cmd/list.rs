use anyhow::Result;

use sous_lib::Config;
use sous_lib::registry::Registry;

pub fn cmd_list(config: &Config) -> Result<()> {
  let registry = Registry::with_builtins(config.catalog());
  for name in registry.names() {
    if registry.is_dedicated(name) {
      println!("{:<28} (dedicated)", name);
    } else if let Some(packages) = registry.catalog().get(name) {
      let packages: Vec<String> = packages.iter().map(|(m, p)| format!("{}:{}", m, p)).collect();
      println!("{:<28} {}", name, packages.join(" "));
    }
  }
  Ok(())
}
