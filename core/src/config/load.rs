use std::path::{Path, PathBuf};

use super::types::AppConfig;

const DISABLE_PROGRESS_ENV: &str = "STAGEWISE_DISABLE_PROGRESS";
const LOG_LEVEL_ENV: &str = "STAGEWISE_LOG_LEVEL";

/// Get the default stagewise data directory: ~/.stagewise
pub fn get_stagewise_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".stagewise"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.stagewise/config.toml
    let global_config = get_stagewise_data_dir()?.join("config.toml");

    // Priority 2: ./stagewise.toml
    let local_config = Path::new("stagewise.toml");

    let mut cfg = if global_config.exists() {
        read_config(&global_config)?
    } else if local_config.exists() {
        read_config(local_config)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let mut cfg = read_config(path)?;
    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

fn read_config(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("read {} failed: {e}", path.display()))?;
    Ok(toml::from_str::<AppConfig>(&s)?)
}

/// Environment variable overrides (highest priority).
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup(DISABLE_PROGRESS_ENV) {
        if is_truthy(&v) {
            cfg.progress.enabled = false;
        }
    }

    if let Some(v) = lookup(LOG_LEVEL_ENV) {
        if !v.trim().is_empty() {
            cfg.logging.level = v.trim().to_string();
        }
    }
}

fn is_truthy(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WriterKind;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_when_sections_missing() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert!(cfg.progress.enabled);
        assert_eq!(cfg.progress.writer, WriterKind::Bars);
        assert!(cfg.progress.pass_through.iter().any(|c| c == "where"));
        assert_eq!(cfg.logging.level, "warn");
    }

    #[test]
    fn test_load_from_path_reads_progress_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[progress]
enabled = true
pass_through = ["where", "tee"]
writer = "jsonl"

[[progress.blocking]]
command = "sort"
"#
        )
        .unwrap();

        let cfg = read_config(file.path()).unwrap();
        assert_eq!(cfg.progress.pass_through, vec!["where", "tee"]);
        assert_eq!(cfg.progress.writer, WriterKind::Jsonl);
        assert_eq!(cfg.progress.blocking.len(), 1);
        assert!(cfg.progress.blocking[0].parameters.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("STAGEWISE_DISABLE_PROGRESS", "yes"),
            ("STAGEWISE_LOG_LEVEL", " debug "),
        ]
        .into_iter()
        .collect();

        let mut cfg = AppConfig::default();
        apply_env_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string()));

        assert!(!cfg.progress.enabled);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn test_falsy_disable_keeps_progress() {
        let mut cfg = AppConfig::default();
        apply_env_overrides(&mut cfg, |k| {
            (k == "STAGEWISE_DISABLE_PROGRESS").then(|| "0".to_string())
        });
        assert!(cfg.progress.enabled);
    }
}
