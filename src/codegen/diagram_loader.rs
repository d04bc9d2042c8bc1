//! Diagram graph loader.
//!
//! This module owns the wire schema of a class diagram (`nodeDataArray` +
//! `linkDataArray`, as exported by the diagram editor) and turns it into
//! typed [`Entity`] values.
//!
//! Supports both:
//! - JSON documents (the editor's native export)
//! - YAML documents with the same field names (hand-written fixtures)
//!
//! Shape errors are rejected once, here, with a [`DiagramError`]. Attribute
//! lines are parsed leniently: a line without exactly one colon is skipped
//! with a warning and the rest of the node is kept.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::codegen::error::DiagramError;
use crate::codegen::types::{Attribute, Entity, EntityKey, EntityMap, NodeKind};
use crate::codegen::utils::{fold_diacritics, to_field_name, to_pascal_case};

/// Multiplicity of one edge end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Multiplicity {
    One,
    Many,
}

impl TryFrom<String> for Multiplicity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim() {
            "1" | "0..1" | "1..1" => Ok(Multiplicity::One),
            "*" | "0..*" | "1..*" | "n" | "N" | "many" => Ok(Multiplicity::Many),
            other => Err(format!("unsupported multiplicity '{}' (expected \"1\" or \"*\")", other)),
        }
    }
}

impl From<Multiplicity> for String {
    fn from(value: Multiplicity) -> Self {
        match value {
            Multiplicity::One => "1".to_string(),
            Multiplicity::Many => "*".to_string(),
        }
    }
}

/// UML relationship category of an edge. Informational only: cardinality is
/// derived from the multiplicity pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeCategory {
    #[serde(alias = "composicion", alias = "composición")]
    Composition,
    #[serde(alias = "agregacion", alias = "agregación")]
    Aggregation,
    #[default]
    #[serde(alias = "asociacion", alias = "asociación")]
    Association,
    #[serde(
        alias = "generalizacion",
        alias = "generalización",
        alias = "herencia",
        alias = "inheritance"
    )]
    Generalization,
    #[serde(alias = "muchos-a-muchos", alias = "many_to_many")]
    ManyToMany,
}

/// One class node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub key: EntityKey,
    pub name: String,
    /// Newline-separated `name: type` lines
    #[serde(default, alias = "attributes")]
    pub attribute: String,
    #[serde(default)]
    pub methods: Option<String>,
    #[serde(default)]
    pub loc: Option<String>,
    #[serde(default)]
    pub node_type: NodeKind,
}

/// One relationship edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub from: EntityKey,
    pub to: EntityKey,
    pub from_multiplicity: Multiplicity,
    pub to_multiplicity: Multiplicity,
    #[serde(default)]
    pub category: EdgeCategory,
}

/// Wire shape before section validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDiagram {
    #[serde(default)]
    node_data_array: Option<Vec<NodeRecord>>,
    #[serde(default)]
    link_data_array: Option<Vec<EdgeRecord>>,
}

/// A diagram whose required sections are present
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    #[serde(rename = "nodeDataArray")]
    pub nodes: Vec<NodeRecord>,
    #[serde(rename = "linkDataArray")]
    pub edges: Vec<EdgeRecord>,
}

impl TryFrom<RawDiagram> for Diagram {
    type Error = DiagramError;

    fn try_from(raw: RawDiagram) -> Result<Self, Self::Error> {
        let nodes = raw
            .node_data_array
            .filter(|nodes| !nodes.is_empty())
            .ok_or(DiagramError::MissingSection("nodeDataArray"))?;
        let edges = raw
            .link_data_array
            .ok_or(DiagramError::MissingSection("linkDataArray"))?;

        Ok(Diagram { nodes, edges })
    }
}

impl Diagram {
    pub fn new(nodes: Vec<NodeRecord>, edges: Vec<EdgeRecord>) -> Self {
        Self { nodes, edges }
    }

    /// Parse a diagram from its JSON export
    pub fn from_json_str(json: &str) -> Result<Self, DiagramError> {
        let raw: RawDiagram =
            serde_json::from_str(json).map_err(|e| DiagramError::InvalidJson(e.to_string()))?;
        Diagram::try_from(raw)
    }

    /// Parse a diagram from an already-decoded JSON value (e.g. an HTTP request body)
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, DiagramError> {
        let raw: RawDiagram =
            serde_json::from_value(value).map_err(|e| DiagramError::InvalidJson(e.to_string()))?;
        Diagram::try_from(raw)
    }

    /// Parse a diagram from YAML with the same field names as the JSON export
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DiagramError> {
        let raw: RawDiagram =
            serde_yaml::from_str(yaml).map_err(|e| DiagramError::InvalidYaml(e.to_string()))?;
        Diagram::try_from(raw)
    }
}

/// Load a diagram from a `.json`, `.yaml` or `.yml` file
///
/// # Example
///
/// ```ignore
/// use umlforge::codegen::load_diagram;
///
/// let diagram = load_diagram("config/examples/shop/diagram.json")?;
/// ```
pub fn load_diagram<P: AsRef<Path>>(path: P) -> Result<Diagram, DiagramError> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|source| DiagramError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Diagram::from_json_str(&content),
        Some("yaml") | Some("yml") => Diagram::from_yaml_str(&content),
        _ => Err(DiagramError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Build the entity map from a diagram.
///
/// Entities keep node-list order. Every edge endpoint must name a node in the
/// list; a dangling edge is fatal.
pub fn parse_entities(diagram: &Diagram) -> Result<EntityMap, DiagramError> {
    let mut entities = EntityMap::new();
    let mut names = HashSet::new();

    for node in &diagram.nodes {
        let name = to_pascal_case(node.name.trim());
        if name.is_empty() {
            return Err(DiagramError::EmptyName(node.key));
        }
        if entities.contains_key(&node.key) {
            return Err(DiagramError::DuplicateKey(node.key));
        }
        if !names.insert(name.clone()) {
            return Err(DiagramError::DuplicateName(name));
        }

        let mut entity = Entity::new(node.key, name, node.node_type);
        entity.attributes = parse_attributes(&node.attribute, &entity.name);
        debug!(
            entity = %entity.name,
            attributes = entity.attributes.len(),
            "parsed node"
        );
        entities.insert(node.key, entity);
    }

    for edge in &diagram.edges {
        for key in [edge.from, edge.to] {
            if !entities.contains_key(&key) {
                return Err(DiagramError::DanglingEdge {
                    from: edge.from,
                    to: edge.to,
                    missing: key,
                });
            }
        }
    }

    Ok(entities)
}

/// Parse newline-separated `name: type` lines.
///
/// Blank lines and a lone `-` are ignored. Lines that do not contain exactly one
/// colon, or whose name or type is empty, are skipped. A leading UML visibility
/// marker (`+`, `-`, `#`, `~`) is stripped and accented letters are folded to
/// ASCII (`dirección` -> `direccion`). Attributes named `id` are dropped
/// because every generated class already carries an identifier.
pub fn parse_attributes(text: &str, entity_name: &str) -> Vec<Attribute> {
    let mut attributes: Vec<Attribute> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line == "-" {
            continue;
        }

        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() != 2 {
            warn!(entity = entity_name, line, "skipping malformed attribute line");
            continue;
        }

        let raw_name = parts[0]
            .trim()
            .trim_start_matches(['+', '-', '#', '~'])
            .trim();
        let declared_type = parts[1].trim();
        if raw_name.is_empty() || declared_type.is_empty() {
            warn!(entity = entity_name, line, "skipping attribute with empty name or type");
            continue;
        }

        if raw_name.eq_ignore_ascii_case("id") {
            warn!(entity = entity_name, "attribute 'id' shadows the generated identifier, skipped");
            continue;
        }

        let folded = fold_diacritics(raw_name);
        if folded != raw_name {
            warn!(
                entity = entity_name,
                attribute = raw_name,
                folded = %folded,
                "accented attribute name folded to ASCII"
            );
        }

        let name = to_field_name(&folded);
        if attributes.iter().any(|a| a.name == name) {
            warn!(entity = entity_name, attribute = %name, "duplicate attribute, skipped");
            continue;
        }

        attributes.push(Attribute {
            name,
            declared_type: declared_type.to_string(),
        });
    }

    attributes
}
