//! `kk config` - inspect and bootstrap the settings file

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;

use crate::config::Settings;

/// Print the effective settings and where they came from
pub fn show() -> Result<()> {
    match Settings::find_config_file() {
        Some(path) => println!("# loaded from {}", path.display()),
        None => println!("# no config file found, showing defaults"),
    }
    let settings = Settings::load();
    let rendered = toml::to_string_pretty(&settings).context("Failed to serialize settings")?;
    print!("{}", rendered);
    Ok(())
}

/// Write the example config to `path`, or the user config location
pub fn init(path: Option<&Path>, force: bool) -> Result<()> {
    let target = match path {
        Some(p) => p.to_path_buf(),
        None => Settings::user_config_path()
            .ok_or_else(|| anyhow!("Could not determine the user config directory"))?,
    };

    write_example(&target, force)?;
    crate::log_info!("Wrote {}", target.display());
    println!("{}", target.display());
    Ok(())
}

fn write_example(target: &Path, force: bool) -> Result<()> {
    if target.exists() && !force {
        return Err(anyhow!(
            "{} already exists (use --force to overwrite)",
            target.display()
        ));
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(target, Settings::example_config())
        .with_context(|| format!("Failed to write {}", target.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kk").join("config.toml");

        init(Some(path.as_path()), false).unwrap();
        let settings = Settings::load_from_file(&path).unwrap();
        assert_eq!(settings.kubectl.binary, "kubectl");
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "# mine\n").unwrap();

        assert!(init(Some(path.as_path()), false).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine\n");

        init(Some(path.as_path()), true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("[kubectl]"));
    }
}
