use contracts::shared::filter_form::FilterMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub filter_form: FilterFormConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListingConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilterFormConfig {
    /// Control name, also the prefix of its persistent URL parameter
    #[serde(default = "default_control_name")]
    pub name: String,
    #[serde(default)]
    pub ajax: bool,
    /// Overrides the built-in template, relative paths start at the executable
    #[serde(default)]
    pub template_file: Option<String>,
    #[serde(default)]
    pub default_values: BTreeMap<String, String>,
}

impl Default for FilterFormConfig {
    fn default() -> Self {
        Self {
            name: default_control_name(),
            ajax: false,
            template_file: None,
            default_values: BTreeMap::new(),
        }
    }
}

impl FilterFormConfig {
    pub fn default_values(&self) -> FilterMap {
        FilterMap::from_values(self.default_values.clone())
    }
}

fn default_page_size() -> usize {
    5
}

fn default_control_name() -> String {
    "filter".to_string()
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 3000

[listing]
page_size = 5

[filter_form]
name = "filter"
ajax = false

[filter_form.default_values]
status = "active"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Workspace root (for `cargo run`)
/// 3. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    let mut candidates = Vec::new();
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.push(exe_dir.join("config.toml"));
        }
    }
    candidates.push(
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config.toml"),
    );

    for config_path in candidates {
        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)?;
            return Ok(config);
        }
        tracing::warn!("config.toml not found at: {}", config_path.display());
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Get the template override from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_template_path(config: &FilterFormConfig) -> Option<PathBuf> {
    let template_str = config.template_file.as_deref().filter(|path| !path.is_empty())?;
    let template_path = Path::new(template_str);

    if template_path.is_absolute() {
        return Some(template_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Some(exe_dir.join(template_path));
        }
    }

    Some(PathBuf::from(template_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Result<Config, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.listing.page_size, 5);
        assert_eq!(config.filter_form.name, "filter");
        assert_eq!(
            config.filter_form.default_values(),
            FilterMap::from_values([("status", "active")])
        );
    }

    #[test]
    fn test_filter_form_section_is_optional() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            "#,
        )
        .unwrap();
        assert_eq!(config.filter_form.name, "filter");
        assert!(!config.filter_form.ajax);
        assert!(config.filter_form.default_values().is_empty());
        assert_eq!(get_template_path(&config.filter_form), None);
    }

    #[test]
    fn test_template_path_resolution() {
        let mut filter_form = FilterFormConfig::default();
        filter_form.template_file = Some("/srv/filter.html".to_string());
        assert_eq!(
            get_template_path(&filter_form),
            Some(PathBuf::from("/srv/filter.html"))
        );

        filter_form.template_file = Some("templates/filter.html".to_string());
        let resolved = get_template_path(&filter_form).unwrap();
        assert!(resolved.ends_with("templates/filter.html"));

        filter_form.template_file = Some(String::new());
        assert_eq!(get_template_path(&filter_form), None);
    }
}
