//! Diagram-to-source generation.
//!
//! This module turns a class diagram into two source trees: a Spring Boot
//! persistence/API stack and a Flutter CRUD client. Diagram loading and
//! relation inference are shared; each target lives in its own submodule.

pub mod types;
pub mod error;
pub mod utils;
pub mod diagram_loader;
pub mod relations;
pub mod dependency_graph;
pub mod spring;
pub mod flutter;
pub mod manifest;
pub mod workspace;
pub mod orchestration;
pub mod project_config;
pub mod fs_utils;

// Re-export key types
pub use types::{
    Attribute, ArtifactKind, Entity, EntityKey, EntityMap, FieldType, GeneratedArtifact,
    NodeKind, RelationDescriptor, RelationKind, Target, TypeMapping,
};
pub use error::{ArtifactError, DiagramError, GenerateError, WorkspaceError};
pub use diagram_loader::{
    load_diagram, parse_attributes, parse_entities, Diagram, EdgeCategory, EdgeRecord,
    Multiplicity, NodeRecord,
};
pub use relations::{infer_relations, ManyToManyStrategy};
pub use dependency_graph::{DependencyGraph, Resolver, ServiceDependency};
pub use spring::ServerConfig;
pub use flutter::ClientConfig;
pub use manifest::{Manifest, Outcome};
pub use workspace::Workspace;
pub use orchestration::{
    analyze, generate, generate_from_file, generate_into_workspace, ClientTarget,
    GenerationConfig, InferredModel, ServerTarget,
};
pub use project_config::ProjectConfig;

/// Generate both targets from a umlforge.yaml file and a diagram file
///
/// Relative output directories resolve against the directory holding the
/// configuration file.
///
/// # Example
///
/// ```rust,no_run
/// let manifest = umlforge::codegen::generate_from_yaml(
///     "config/examples/shop/umlforge.yaml",
///     "config/examples/shop/diagram.json",
/// )
/// .expect("Code generation failed");
/// ```
pub fn generate_from_yaml(
    yaml_path: impl AsRef<std::path::Path>,
    diagram_path: impl AsRef<std::path::Path>,
) -> Result<Manifest, String> {
    let yaml_path = yaml_path.as_ref();
    println!("📋 Loading configuration from {}...", yaml_path.display());

    let mut project = ProjectConfig::from_file(yaml_path)?;
    project.apply_env()?;
    project.validate()?;

    println!("  ✓ Configuration loaded: {}", project.project.name);

    let base_dir = yaml_path
        .parent()
        .map(std::path::Path::to_path_buf)
        .unwrap_or_default();
    let config = project.to_generation_config(&base_dir);

    let manifest = generate_from_file(diagram_path, &config)
        .map_err(|e| format!("Code generation failed: {}", e))?;

    println!("✨ Code generation complete! ({} files)", manifest.file_count());

    Ok(manifest)
}
