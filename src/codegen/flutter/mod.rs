/// Flutter client artifact generation
///
/// Per entity: a serializable model, an HTTP service and a CRUD page under
/// `lib/{models,services,pages}/`. Shared navigation (`lib/routes/app_routes.dart`,
/// `lib/routes/home_menu.dart`) is regenerated from the entities that were
/// generated successfully, optionally together with `lib/main.dart` and
/// `pubspec.yaml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::codegen::error::ArtifactError;
use crate::codegen::types::{ArtifactKind, Entity, FieldType, GeneratedArtifact, TypeMapping};

mod model_dart;
mod navigation_dart;
mod page_dart;
mod scaffold;
mod service_dart;

pub use model_dart::generate_model_dart;
pub use navigation_dart::{generate_app_routes_dart, generate_home_menu_dart};
pub use page_dart::{generate_page_dart, primary_label_attribute, secondary_label_attributes};
pub use scaffold::{generate_main_dart, generate_pubspec_yaml};
pub use service_dart::generate_service_dart;

fn default_api_base_url() -> String {
    "http://10.0.2.2:8080".to_string()
}

fn default_api_prefix() -> String {
    "api".to_string()
}

fn default_app_title() -> String {
    "Generated App".to_string()
}

fn default_package_name() -> String {
    "generated_app".to_string()
}

/// Client generation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme, host and port of the generated server
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Must match the server's api prefix
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default = "default_app_title")]
    pub app_title: String,
    /// Dart package name written to `pubspec.yaml`
    #[serde(default = "default_package_name")]
    pub package_name: String,
    /// Also emit `lib/main.dart` and `pubspec.yaml`
    #[serde(default)]
    pub scaffold: bool,
    #[serde(default)]
    pub type_mapping: TypeMapping,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_prefix: default_api_prefix(),
            app_title: default_app_title(),
            package_name: default_package_name(),
            scaffold: false,
            type_mapping: TypeMapping::default(),
        }
    }
}

impl ClientConfig {
    /// Base URL of an entity's endpoints (`http://10.0.2.2:8080/api/customers`)
    pub fn endpoint(&self, entity: &Entity) -> String {
        let base = self.api_base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{}/{}", base, entity.route_segment())
        } else {
            format!("{}/{}/{}", base, prefix, entity.route_segment())
        }
    }
}

/// Generate model, service and page for one entity
pub fn generate_entity_artifacts(
    entity: &Entity,
    config: &ClientConfig,
) -> Result<Vec<GeneratedArtifact>, ArtifactError> {
    entity.check_identifiers()?;

    let name = entity.name.as_str();
    let stem = entity.file_stem();

    Ok(vec![
        GeneratedArtifact::new(
            Some(name),
            ArtifactKind::ClientModel,
            PathBuf::from(format!("lib/models/{}_model.dart", stem)),
            generate_model_dart(entity, config)?,
        ),
        GeneratedArtifact::new(
            Some(name),
            ArtifactKind::ClientService,
            PathBuf::from(format!("lib/services/{}_service.dart", stem)),
            generate_service_dart(entity, config)?,
        ),
        GeneratedArtifact::new(
            Some(name),
            ArtifactKind::ClientPage,
            PathBuf::from(format!("lib/pages/{}_page.dart", stem)),
            generate_page_dart(entity, config)?,
        ),
    ])
}

/// Generate the shared navigation files (and the app scaffold when enabled)
/// for the given entities, in order
pub fn generate_shared_artifacts(
    entities: &[&Entity],
    config: &ClientConfig,
) -> Result<Vec<GeneratedArtifact>, ArtifactError> {
    let mut artifacts = vec![
        GeneratedArtifact::new(
            None,
            ArtifactKind::RouteTable,
            PathBuf::from("lib/routes/app_routes.dart"),
            generate_app_routes_dart(entities)?,
        ),
        GeneratedArtifact::new(
            None,
            ArtifactKind::LandingMenu,
            PathBuf::from("lib/routes/home_menu.dart"),
            generate_home_menu_dart(entities, config)?,
        ),
    ];

    if config.scaffold {
        artifacts.push(GeneratedArtifact::new(
            None,
            ArtifactKind::ClientMain,
            PathBuf::from("lib/main.dart"),
            generate_main_dart(config)?,
        ));
        artifacts.push(GeneratedArtifact::new(
            None,
            ArtifactKind::ClientPubspec,
            PathBuf::from("pubspec.yaml"),
            generate_pubspec_yaml(config)?,
        ));
    }

    Ok(artifacts)
}

/// Dart type for a scalar field
pub(crate) fn dart_type(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::String | FieldType::Date | FieldType::DateTime => "String",
        FieldType::Integer | FieldType::Long => "int",
        FieldType::Decimal => "double",
        FieldType::Boolean => "bool",
    }
}
