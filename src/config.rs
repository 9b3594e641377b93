//! Configuration for bookshelf paths.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (BOOKSHELF_HOME, BOOKSHELF_CATALOG)
//! 2. Config file (.bookshelf/config.yaml)
//! 3. Defaults (~/.bookshelf)
//!
//! The `--catalog` CLI flag overrides all of these for a single invocation.
//!
//! Config file discovery:
//! - Searches current directory and parents for .bookshelf/config.yaml
//! - `home` is relative to the .bookshelf/ directory, `catalog` to the
//!   project root (the directory containing .bookshelf/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_DIR: &str = ".bookshelf";
const CONFIG_FILE: &str = "config.yaml";
const CATALOG_FILE: &str = "catalog.json";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Bookshelf state directory (relative to .bookshelf/)
    pub home: Option<String>,
    /// Catalog file (relative to the project root)
    pub catalog: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Bookshelf home directory
    pub home: PathBuf,
    /// Catalog file used by the CLI
    pub catalog: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching a directory and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to a base directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Resolve configuration from explicit sources
fn resolve(
    default_home: PathBuf,
    config_file: Option<PathBuf>,
    env_home: Option<String>,
    env_catalog: Option<String>,
) -> Result<ResolvedConfig> {
    let (home, catalog) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        let bookshelf_dir = config_path.parent().unwrap_or(Path::new("."));
        let base_dir = bookshelf_dir.parent().unwrap_or(Path::new("."));

        let home = if let Some(env_home) = env_home {
            PathBuf::from(env_home)
        } else if let Some(ref home_path) = config.paths.home {
            resolve_path(bookshelf_dir, home_path)
        } else {
            default_home
        };

        let catalog = if let Some(env_catalog) = env_catalog {
            PathBuf::from(env_catalog)
        } else if let Some(ref catalog_path) = config.paths.catalog {
            resolve_path(base_dir, catalog_path)
        } else {
            home.join(CATALOG_FILE)
        };

        (home, catalog)
    } else {
        let home = env_home.map(PathBuf::from).unwrap_or(default_home);
        let catalog = env_catalog
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(CATALOG_FILE));

        (home, catalog)
    };

    Ok(ResolvedConfig {
        home,
        catalog,
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(CONFIG_DIR);

    let config_file = std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config_file(&cwd));

    resolve(
        default_home,
        config_file,
        std::env::var("BOOKSHELF_HOME").ok(),
        std::env::var("BOOKSHELF_CATALOG").ok(),
    )
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Get the default catalog path
pub fn catalog_path() -> Result<PathBuf> {
    Ok(config()?.catalog.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(root: &Path, body: &str) -> PathBuf {
        let dir = root.join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();

        let config_path = dir.join(CONFIG_FILE);
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "{}", body).unwrap();
        config_path
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = resolve(PathBuf::from("/home/me/.bookshelf"), None, None, None).unwrap();

        assert_eq!(config.home, PathBuf::from("/home/me/.bookshelf"));
        assert_eq!(
            config.catalog,
            PathBuf::from("/home/me/.bookshelf/catalog.json")
        );
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_env_overrides_defaults() {
        let config = resolve(
            PathBuf::from("/home/me/.bookshelf"),
            None,
            Some("/srv/shelf".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(config.catalog, PathBuf::from("/srv/shelf/catalog.json"));

        let config = resolve(
            PathBuf::from("/home/me/.bookshelf"),
            None,
            None,
            Some("/tmp/books.json".to_string()),
        )
        .unwrap();
        assert_eq!(config.home, PathBuf::from("/home/me/.bookshelf"));
        assert_eq!(config.catalog, PathBuf::from("/tmp/books.json"));
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(
            temp.path(),
            r#"
version: "1.0"
paths:
  home: ./
  catalog: data/books.json
"#,
        );

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.paths.home, Some("./".to_string()));
        assert_eq!(config.paths.catalog, Some("data/books.json".to_string()));
    }

    #[test]
    fn test_config_file_paths_are_relative() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(
            temp.path(),
            r#"
version: "1.0"
paths:
  catalog: data/books.json
"#,
        );

        let config = resolve(
            PathBuf::from("/home/me/.bookshelf"),
            Some(config_path.clone()),
            None,
            None,
        )
        .unwrap();

        assert_eq!(config.config_file, Some(config_path));
        assert_eq!(config.home, PathBuf::from("/home/me/.bookshelf"));
        assert_eq!(config.catalog, temp.path().join("data/books.json"));
    }

    #[test]
    fn test_find_config_file_in_parent() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(temp.path(), "version: \"1.0\"");
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config_file(&nested), Some(config_path));
    }

    #[test]
    fn test_invalid_config_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(temp.path(), "paths: [not, a, map");

        let result = resolve(PathBuf::from("/x"), Some(config_path), None, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
