/// Spring Boot server artifact generation
///
/// For every entity this generates:
/// - a JPA entity with ownership-aware relation annotations
/// - a Spring Data repository
/// - a service with relation-aware create/update
/// - a REST controller
/// - create, update and response DTOs
///
/// Each artifact is rendered by a pure function into a `String`; nothing here
/// touches the filesystem.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::codegen::dependency_graph::ServiceDependency;
use crate::codegen::error::ArtifactError;
use crate::codegen::types::{ArtifactKind, Entity, FieldType, GeneratedArtifact, TypeMapping};

mod controller_java;
mod dto_java;
mod entity_java;
mod repository_java;
mod service_java;

pub use controller_java::{controller_path, generate_controller_java};
pub use dto_java::{generate_create_dto_java, generate_response_dto_java, generate_update_dto_java};
pub use entity_java::generate_entity_java;
pub use repository_java::generate_repository_java;
pub use service_java::generate_service_java;

fn default_base_package() -> String {
    "com.example.demo".to_string()
}

fn default_source_dir() -> String {
    "src/main/java".to_string()
}

fn default_api_prefix() -> String {
    "api".to_string()
}

/// Server generation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Root package of the generated classes
    #[serde(default = "default_base_package")]
    pub base_package: String,
    /// Source directory inside the output root
    #[serde(default = "default_source_dir")]
    pub source_dir: String,
    /// First path segment of every controller route
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default)]
    pub type_mapping: TypeMapping,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_package: default_base_package(),
            source_dir: default_source_dir(),
            api_prefix: default_api_prefix(),
            type_mapping: TypeMapping::default(),
        }
    }
}

impl ServerConfig {
    /// Directory of `layer` (e.g. `entity`) relative to the output root
    pub fn layer_dir(&self, layer: &str) -> PathBuf {
        let mut dir = PathBuf::from(&self.source_dir);
        for segment in self.base_package.split('.') {
            dir.push(segment);
        }
        dir.push(layer);
        dir
    }

    /// Fully qualified package of `layer`
    pub fn layer_package(&self, layer: &str) -> String {
        format!("{}.{}", self.base_package, layer)
    }
}

/// Generate all server artifacts for one entity
pub fn generate_entity_artifacts(
    entity: &Entity,
    dependencies: &[ServiceDependency],
    config: &ServerConfig,
) -> Result<Vec<GeneratedArtifact>, ArtifactError> {
    entity.check_identifiers()?;

    let name = entity.name.as_str();
    let file = |layer: &str, class: String| config.layer_dir(layer).join(format!("{}.java", class));

    Ok(vec![
        GeneratedArtifact::new(
            Some(name),
            ArtifactKind::Entity,
            file("entity", name.to_string()),
            generate_entity_java(entity, config)?,
        ),
        GeneratedArtifact::new(
            Some(name),
            ArtifactKind::Repository,
            file("repository", format!("{}Repository", name)),
            generate_repository_java(entity, config)?,
        ),
        GeneratedArtifact::new(
            Some(name),
            ArtifactKind::Service,
            file("service", format!("{}Service", name)),
            generate_service_java(entity, dependencies, config)?,
        ),
        GeneratedArtifact::new(
            Some(name),
            ArtifactKind::Controller,
            file("controller", format!("{}Controller", name)),
            generate_controller_java(entity, config)?,
        ),
        GeneratedArtifact::new(
            Some(name),
            ArtifactKind::CreateDto,
            file("dto", format!("Create{}Dto", name)),
            generate_create_dto_java(entity, config)?,
        ),
        GeneratedArtifact::new(
            Some(name),
            ArtifactKind::UpdateDto,
            file("dto", format!("Update{}Dto", name)),
            generate_update_dto_java(entity, config)?,
        ),
        GeneratedArtifact::new(
            Some(name),
            ArtifactKind::ResponseDto,
            file("dto", format!("{}ResponseDto", name)),
            generate_response_dto_java(entity, config)?,
        ),
    ])
}

/// Java type for a scalar field
pub(crate) fn java_type(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::String => "String",
        FieldType::Integer => "Integer",
        FieldType::Long => "Long",
        FieldType::Decimal => "Double",
        FieldType::Boolean => "Boolean",
        FieldType::Date => "LocalDate",
        FieldType::DateTime => "LocalDateTime",
    }
}

/// `java.time` imports needed by an entity's attributes
pub(crate) fn time_imports(entity: &Entity, mapping: TypeMapping) -> Vec<&'static str> {
    let mut imports = Vec::new();
    let types: Vec<FieldType> = entity.attributes.iter().map(|a| mapping.resolve(a)).collect();
    if types.contains(&FieldType::Date) {
        imports.push("java.time.LocalDate");
    }
    if types.contains(&FieldType::DateTime) {
        imports.push("java.time.LocalDateTime");
    }
    imports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::types::{NodeKind, RelationDescriptor};

    #[test]
    fn test_layer_paths() {
        let config = ServerConfig {
            base_package: "com.example.shop".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.layer_dir("entity"),
            PathBuf::from("src/main/java/com/example/shop/entity")
        );
        assert_eq!(config.layer_package("dto"), "com.example.shop.dto");
    }

    #[test]
    fn test_artifact_set_and_names() {
        let entity = Entity::new(1, "Customer", NodeKind::Standard).with_attribute("name", "String");
        let artifacts = generate_entity_artifacts(&entity, &[], &ServerConfig::default()).unwrap();

        let files: Vec<String> = artifacts
            .iter()
            .map(|a| a.file_path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            files,
            vec![
                "Customer.java",
                "CustomerRepository.java",
                "CustomerService.java",
                "CustomerController.java",
                "CreateCustomerDto.java",
                "UpdateCustomerDto.java",
                "CustomerResponseDto.java",
            ]
        );
        assert!(artifacts[0]
            .file_path
            .starts_with("src/main/java/com/example/demo/entity"));
    }

    #[test]
    fn test_invalid_entity_name_is_rejected() {
        let entity = Entity::new(1, "2Fast", NodeKind::Standard);
        let err = generate_entity_artifacts(&entity, &[], &ServerConfig::default()).unwrap_err();
        assert!(matches!(err, ArtifactError::InvalidIdentifier(_)));
    }

    #[test]
    fn test_duplicate_relation_fields_are_rejected() {
        let mut entity = Entity::new(1, "Order", NodeKind::Standard);
        entity.relations.push(RelationDescriptor::many_to_one("Customer"));
        entity.relations.push(RelationDescriptor::many_to_one("Customer"));

        let err = generate_entity_artifacts(&entity, &[], &ServerConfig::default()).unwrap_err();
        assert!(err.to_string().contains("customer"));
    }
}
