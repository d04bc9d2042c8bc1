//! Project configuration schema for umlforge.yaml
//!
//! Settings are layered: command-line flags override environment variables,
//! which override the file, which overrides built-in defaults. This module
//! covers the file and environment layers.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::codegen::flutter::ClientConfig;
use crate::codegen::orchestration::{ClientTarget, GenerationConfig, ServerTarget};
use crate::codegen::relations::ManyToManyStrategy;
use crate::codegen::spring::ServerConfig;
use crate::codegen::types::TypeMapping;
use crate::codegen::utils::{is_reserved_word, is_valid_class_name, to_snake_case};

/// Environment variable overriding `client.api_base_url`
pub const ENV_API_BASE_URL: &str = "UMLFORGE_API_BASE_URL";
/// Environment variable overriding `generation.workers`
pub const ENV_WORKERS: &str = "UMLFORGE_WORKERS";

/// Top-level project configuration from umlforge.yaml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project: ProjectMetadata,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub generation: GenerationSection,
}

/// Project metadata
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectMetadata {
    #[serde(default = "default_project_name")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Default for ProjectMetadata {
    fn default() -> Self {
        Self {
            name: default_project_name(),
            description: None,
        }
    }
}

/// Spring Boot server target
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_server_output")]
    pub output_dir: String,
    /// Base project copied into a fresh workspace before generation
    #[serde(default)]
    pub skeleton_dir: Option<String>,
    /// Defaults to `com.example.<project name>`
    #[serde(default)]
    pub base_package: Option<String>,
    #[serde(default)]
    pub source_dir: Option<String>,
    #[serde(default)]
    pub api_prefix: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: default_server_output(),
            skeleton_dir: None,
            base_package: None,
            source_dir: None,
            api_prefix: None,
        }
    }
}

/// Flutter client target
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_client_output")]
    pub output_dir: String,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub app_title: Option<String>,
    /// Defaults to `<project name>_client`
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub scaffold: bool,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: default_client_output(),
            api_base_url: None,
            app_title: None,
            package_name: None,
            scaffold: false,
        }
    }
}

/// Options shared by both targets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GenerationSection {
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub many_to_many: ManyToManyStrategy,
    #[serde(default)]
    pub type_mapping: TypeMapping,
}

fn default_project_name() -> String {
    "demo".to_string()
}

fn default_true() -> bool {
    true
}

fn default_server_output() -> String {
    "build/server".to_string()
}

fn default_client_output() -> String {
    "build/client".to_string()
}

impl ProjectConfig {
    /// Load project configuration from umlforge.yaml
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read {}: {}", path.as_ref().display(), e))?;

        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, String> {
        serde_yaml::from_str(yaml).map_err(|e| format!("Failed to parse umlforge.yaml: {}", e))
    }

    /// Check values the schema cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.project.name.trim().is_empty() {
            return Err("project.name must not be empty".to_string());
        }

        if !self.server.enabled && !self.client.enabled {
            return Err("at least one of server and client must be enabled".to_string());
        }

        let package = self.base_package();
        let valid_package = package
            .split('.')
            .all(|segment| is_valid_class_name(segment) && !is_reserved_word(segment));
        if !valid_package {
            return Err(format!("server.base_package '{}' is not a valid Java package", package));
        }

        if self.generation.workers == Some(0) {
            return Err("generation.workers must be at least 1".to_string());
        }

        Ok(())
    }

    /// Apply `UMLFORGE_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), String> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` to read variables
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.client.api_base_url = Some(url);
        }

        if let Some(workers) = lookup(ENV_WORKERS).filter(|v| !v.trim().is_empty()) {
            let parsed = workers
                .trim()
                .parse::<usize>()
                .map_err(|e| format!("{}='{}' is not a number: {}", ENV_WORKERS, workers, e))?;
            self.generation.workers = Some(parsed);
        }

        Ok(())
    }

    /// Server package, `com.example.<project>` unless configured
    pub fn base_package(&self) -> String {
        self.server
            .base_package
            .clone()
            .unwrap_or_else(|| format!("com.example.{}", to_snake_case(&self.project.name)))
    }

    /// Skeleton directory resolved against `base_dir`
    pub fn skeleton_path(&self, base_dir: &Path) -> Option<PathBuf> {
        self.server
            .skeleton_dir
            .as_ref()
            .map(|dir| resolve(base_dir, dir))
    }

    pub fn server_config(&self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            base_package: self.base_package(),
            source_dir: self.server.source_dir.clone().unwrap_or(defaults.source_dir),
            api_prefix: self.server.api_prefix.clone().unwrap_or(defaults.api_prefix),
            type_mapping: self.generation.type_mapping,
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            api_base_url: self.client.api_base_url.clone().unwrap_or(defaults.api_base_url),
            // The client must call the routes the server exposes
            api_prefix: self.server.api_prefix.clone().unwrap_or(defaults.api_prefix),
            app_title: self
                .client
                .app_title
                .clone()
                .unwrap_or_else(|| self.project.name.clone()),
            package_name: self
                .client
                .package_name
                .clone()
                .unwrap_or_else(|| format!("{}_client", to_snake_case(&self.project.name))),
            scaffold: self.client.scaffold,
            type_mapping: self.generation.type_mapping,
        }
    }

    /// Build the run configuration; relative output dirs resolve against `base_dir`
    pub fn to_generation_config(&self, base_dir: &Path) -> GenerationConfig {
        GenerationConfig {
            server: self.server.enabled.then(|| ServerTarget {
                output_dir: resolve(base_dir, &self.server.output_dir),
                config: self.server_config(),
            }),
            client: self.client.enabled.then(|| ClientTarget {
                output_dir: resolve(base_dir, &self.client.output_dir),
                config: self.client_config(),
            }),
            many_to_many: self.generation.many_to_many,
            workers: self.generation.workers,
        }
    }
}

fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
project:
  name: shop
server:
  output_dir: out/server
  skeleton_dir: skeleton
  api_prefix: v1
client:
  output_dir: /abs/client
  scaffold: true
generation:
  workers: 2
  many_to_many: join_entity
  type_mapping: declared
"#;

    #[test]
    fn test_parse_and_defaults() {
        let config = ProjectConfig::from_yaml_str(SAMPLE).unwrap();
        config.validate().unwrap();

        assert_eq!(config.base_package(), "com.example.shop");
        assert_eq!(config.generation.many_to_many, ManyToManyStrategy::JoinEntity);

        let server = config.server_config();
        assert_eq!(server.api_prefix, "v1");
        assert_eq!(server.source_dir, "src/main/java");
        assert_eq!(server.type_mapping, TypeMapping::Declared);

        let client = config.client_config();
        assert_eq!(client.api_prefix, "v1");
        assert_eq!(client.package_name, "shop_client");
        assert_eq!(client.app_title, "shop");
        assert!(client.scaffold);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ProjectConfig::from_yaml_str("{}").unwrap();
        assert!(config.server.enabled);
        assert!(config.client.enabled);
        assert_eq!(config.server.output_dir, "build/server");
        assert_eq!(config.generation.many_to_many, ManyToManyStrategy::Forward);
    }

    #[test]
    fn test_generation_config_paths() {
        let config = ProjectConfig::from_yaml_str(SAMPLE).unwrap();
        let generation = config.to_generation_config(Path::new("/projects/shop"));

        assert_eq!(
            generation.server.unwrap().output_dir,
            PathBuf::from("/projects/shop/out/server")
        );
        assert_eq!(generation.client.unwrap().output_dir, PathBuf::from("/abs/client"));
        assert_eq!(generation.workers, Some(2));
        assert_eq!(
            config.skeleton_path(Path::new("/projects/shop")),
            Some(PathBuf::from("/projects/shop/skeleton"))
        );
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ProjectConfig::from_yaml_str(SAMPLE).unwrap();
        config
            .apply_env_from(|key| match key {
                ENV_API_BASE_URL => Some("http://api.local:9000".to_string()),
                ENV_WORKERS => Some("8".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.client_config().api_base_url, "http://api.local:9000");
        assert_eq!(config.generation.workers, Some(8));

        let err = config
            .apply_env_from(|key| (key == ENV_WORKERS).then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.contains(ENV_WORKERS));
    }

    #[test]
    fn test_validation() {
        let mut config = ProjectConfig::default();
        config.server.base_package = Some("com.example.class".to_string());
        assert!(config.validate().is_err());

        let mut config = ProjectConfig::default();
        config.server.enabled = false;
        config.client.enabled = false;
        assert!(config.validate().is_err());

        let mut config = ProjectConfig::default();
        config.generation.workers = Some(0);
        assert!(config.validate().is_err());
    }
}
