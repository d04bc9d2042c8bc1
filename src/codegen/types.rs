//! Type definitions for the parsed, relation-annotated diagram.
//!
//! These types are produced by the diagram loader, annotated by relation
//! inference and consumed read-only by the artifact generators.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::codegen::error::ArtifactError;
use crate::codegen::utils::{
    is_valid_class_name, pluralize, to_field_name, to_kebab_case, to_snake_case,
};

/// Diagram-local node identifier
pub type EntityKey = i64;

/// Entities keyed by diagram key, in node-list order
pub type EntityMap = IndexMap<EntityKey, Entity>;

/// Kind of node drawn in the diagram
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Standard,
    /// Join class drawn by the user between two many-to-many endpoints
    Intermediate,
    /// Join class synthesized by relation inference
    Synthesized,
}

/// Scalar type parsed from a declared attribute type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    String,
    Integer,
    Long,
    Decimal,
    Boolean,
    Date,
    DateTime,
}

impl FieldType {
    /// Parse a free-text declared type. Unknown types fall back to `String`.
    pub fn parse(declared: &str) -> FieldType {
        match declared.trim().to_lowercase().as_str() {
            "int" | "integer" | "entero" | "short" => FieldType::Integer,
            "long" | "bigint" => FieldType::Long,
            "float" | "double" | "decimal" | "number" | "real" | "bigdecimal" => FieldType::Decimal,
            "bool" | "boolean" | "booleano" => FieldType::Boolean,
            "date" | "localdate" | "fecha" => FieldType::Date,
            "datetime" | "localdatetime" | "timestamp" => FieldType::DateTime,
            _ => FieldType::String,
        }
    }
}

/// How declared attribute types are rendered in generated code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeMapping {
    /// Every attribute becomes the target language's string type
    #[default]
    Uniform,
    /// Declared types are mapped to the closest scalar type
    Declared,
}

impl TypeMapping {
    pub fn resolve(&self, attribute: &Attribute) -> FieldType {
        match self {
            TypeMapping::Uniform => FieldType::String,
            TypeMapping::Declared => FieldType::parse(&attribute.declared_type),
        }
    }
}

/// A single `name: type` attribute line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// camelCase field name
    pub name: String,
    /// Type text as written in the diagram
    pub declared_type: String,
}

/// Cardinality role of one side of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    OneToMany,
    ManyToOne,
    OneToOne,
    ManyToMany,
}

impl RelationKind {
    pub fn is_to_many(&self) -> bool {
        matches!(self, RelationKind::OneToMany | RelationKind::ManyToMany)
    }

    /// JPA annotation name
    pub fn annotation(&self) -> &'static str {
        match self {
            RelationKind::OneToMany => "OneToMany",
            RelationKind::ManyToOne => "ManyToOne",
            RelationKind::OneToOne => "OneToOne",
            RelationKind::ManyToMany => "ManyToMany",
        }
    }
}

/// Directed relation annotation attached to one endpoint entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationDescriptor {
    /// PascalCase name of the related entity
    pub target: String,
    pub kind: RelationKind,
    /// Foreign-key column stored by this side (`customer_id`); set only on the owning side
    pub owning_key: Option<String>,
    /// Field on the owning side that maps this relation (`mappedBy`); set only on the inverse side
    pub inverse_field: Option<String>,
}

impl RelationDescriptor {
    /// Collection side of a one-to-many pair; `owner_field` is the owning side's field name
    pub fn one_to_many(target: &str, owner_field: &str) -> Self {
        Self {
            target: target.to_string(),
            kind: RelationKind::OneToMany,
            owning_key: None,
            inverse_field: Some(owner_field.to_string()),
        }
    }

    /// Owning side of a one-to-many pair
    pub fn many_to_one(target: &str) -> Self {
        Self {
            target: target.to_string(),
            kind: RelationKind::ManyToOne,
            owning_key: Some(foreign_key_column(target)),
            inverse_field: None,
        }
    }

    pub fn one_to_one_owning(target: &str) -> Self {
        Self {
            target: target.to_string(),
            kind: RelationKind::OneToOne,
            owning_key: Some(foreign_key_column(target)),
            inverse_field: None,
        }
    }

    pub fn one_to_one_inverse(target: &str, owner_field: &str) -> Self {
        Self {
            target: target.to_string(),
            kind: RelationKind::OneToOne,
            owning_key: None,
            inverse_field: Some(owner_field.to_string()),
        }
    }

    pub fn many_to_many(target: &str) -> Self {
        Self {
            target: target.to_string(),
            kind: RelationKind::ManyToMany,
            owning_key: None,
            inverse_field: None,
        }
    }

    pub fn is_to_many(&self) -> bool {
        self.kind.is_to_many()
    }

    /// Whether this side stores a foreign key to a single target
    pub fn owns_foreign_key(&self) -> bool {
        self.owning_key.is_some() && !self.is_to_many()
    }

    /// Field holding the relation: `customer` for to-one, `orders` for to-many
    pub fn field_name(&self) -> String {
        if self.is_to_many() {
            to_field_name(&pluralize(&self.target))
        } else {
            to_field_name(&self.target)
        }
    }

    /// Scalar identifier field used in DTOs for to-one sides (`customerId`)
    pub fn id_field_name(&self) -> String {
        format!("{}Id", to_field_name(&self.target))
    }

    /// Identifier list field used in DTOs for to-many sides (`orderIds`)
    pub fn ids_field_name(&self) -> String {
        format!("{}Ids", to_field_name(&self.target))
    }
}

/// Foreign-key column name for a reference to `target` (`OrderItem` -> `order_item_id`)
pub fn foreign_key_column(target: &str) -> String {
    format!("{}_id", to_snake_case(target))
}

/// A generated class: one diagram node after parsing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub key: EntityKey,
    /// PascalCase class name
    pub name: String,
    pub kind: NodeKind,
    pub attributes: Vec<Attribute>,
    pub relations: Vec<RelationDescriptor>,
}

impl Entity {
    pub fn new(key: EntityKey, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            key,
            name: name.into(),
            kind,
            attributes: Vec::new(),
            relations: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, declared_type: &str) -> Self {
        self.attributes.push(Attribute {
            name: name.to_string(),
            declared_type: declared_type.to_string(),
        });
        self
    }

    /// camelCase variable name (`OrderItem` -> `orderItem`)
    pub fn var_name(&self) -> String {
        to_field_name(&self.name)
    }

    /// camelCase plural (`OrderItem` -> `orderItems`)
    pub fn plural_var_name(&self) -> String {
        to_field_name(&pluralize(&self.name))
    }

    /// Database table name (`OrderItem` -> `order_items`)
    pub fn table_name(&self) -> String {
        to_snake_case(&pluralize(&self.name))
    }

    /// URL path segment (`OrderItem` -> `order-items`)
    pub fn route_segment(&self) -> String {
        to_kebab_case(&pluralize(&self.name))
    }

    /// snake_case stem for client file names (`OrderItem` -> `order_item`)
    pub fn file_stem(&self) -> String {
        to_snake_case(&self.name)
    }

    /// Relations where this entity stores the foreign key of a single target
    pub fn owned_foreign_keys(&self) -> impl Iterator<Item = &RelationDescriptor> {
        self.relations.iter().filter(|r| r.owns_foreign_key())
    }

    pub fn has_to_many(&self) -> bool {
        self.relations.iter().any(|r| r.is_to_many())
    }

    /// Every generated member name except `id`: attributes, relation fields,
    /// then the id fields the DTOs and client model derive from relations
    /// (`customerId` for to-one sides, `orderIds` for to-many sides)
    pub fn member_names(&self) -> Vec<String> {
        let derived_ids = self.relations.iter().map(|r| {
            if r.is_to_many() {
                r.ids_field_name()
            } else {
                r.id_field_name()
            }
        });

        self.attributes
            .iter()
            .map(|a| a.name.clone())
            .chain(self.relations.iter().map(|r| r.field_name()))
            .chain(derived_ids)
            .collect()
    }

    /// Reject entities that cannot be rendered as a compilable class in either target
    pub fn check_identifiers(&self) -> Result<(), ArtifactError> {
        if !is_valid_class_name(&self.name) {
            return Err(ArtifactError::InvalidIdentifier(self.name.clone()));
        }

        for relation in &self.relations {
            if !is_valid_class_name(&relation.target) {
                return Err(ArtifactError::InvalidIdentifier(relation.target.clone()));
            }
        }

        let mut seen = HashSet::new();
        for member in self.member_names() {
            if !is_valid_class_name(&member) {
                return Err(ArtifactError::InvalidIdentifier(format!("{}.{}", self.name, member)));
            }
            if member == "id" || !seen.insert(member.clone()) {
                return Err(ArtifactError::DuplicateField {
                    entity: self.name.clone(),
                    field: member,
                });
            }
        }

        Ok(())
    }
}

/// Which output tree an artifact belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Server,
    Client,
}

/// Kind of generated source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Entity,
    Repository,
    Service,
    Controller,
    CreateDto,
    UpdateDto,
    ResponseDto,
    ClientModel,
    ClientService,
    ClientPage,
    RouteTable,
    LandingMenu,
    ClientMain,
    ClientPubspec,
}

impl ArtifactKind {
    pub fn target(&self) -> Target {
        match self {
            ArtifactKind::Entity
            | ArtifactKind::Repository
            | ArtifactKind::Service
            | ArtifactKind::Controller
            | ArtifactKind::CreateDto
            | ArtifactKind::UpdateDto
            | ArtifactKind::ResponseDto => Target::Server,
            _ => Target::Client,
        }
    }
}

/// One generated source file, relative to its target's output root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    /// Source entity, `None` for shared navigation and scaffold files
    pub entity: Option<String>,
    pub kind: ArtifactKind,
    pub file_path: PathBuf,
    pub content: String,
}

impl GeneratedArtifact {
    pub fn new(entity: Option<&str>, kind: ArtifactKind, file_path: PathBuf, content: String) -> Self {
        Self {
            entity: entity.map(str::to_string),
            kind,
            file_path,
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_parse() {
        assert_eq!(FieldType::parse("int"), FieldType::Integer);
        assert_eq!(FieldType::parse(" Double "), FieldType::Decimal);
        assert_eq!(FieldType::parse("LocalDate"), FieldType::Date);
        assert_eq!(FieldType::parse("tipo"), FieldType::String);
    }

    #[test]
    fn test_uniform_mapping_ignores_declared_type() {
        let attr = Attribute {
            name: "age".to_string(),
            declared_type: "int".to_string(),
        };
        assert_eq!(TypeMapping::Uniform.resolve(&attr), FieldType::String);
        assert_eq!(TypeMapping::Declared.resolve(&attr), FieldType::Integer);
    }

    #[test]
    fn test_relation_field_names() {
        let to_one = RelationDescriptor::many_to_one("OrderItem");
        assert_eq!(to_one.field_name(), "orderItem");
        assert_eq!(to_one.id_field_name(), "orderItemId");
        assert_eq!(to_one.owning_key.as_deref(), Some("order_item_id"));

        let to_many = RelationDescriptor::one_to_many("Child", "parent");
        assert_eq!(to_many.field_name(), "children");
        assert_eq!(to_many.ids_field_name(), "childIds");
    }

    #[test]
    fn test_entity_naming() {
        let entity = Entity::new(1, "OrderItem", NodeKind::Standard);
        assert_eq!(entity.var_name(), "orderItem");
        assert_eq!(entity.plural_var_name(), "orderItems");
        assert_eq!(entity.table_name(), "order_items");
        assert_eq!(entity.route_segment(), "order-items");
        assert_eq!(entity.file_stem(), "order_item");
    }

    #[test]
    fn test_check_identifiers() {
        assert!(Entity::new(1, "Customer", NodeKind::Standard)
            .with_attribute("name", "String")
            .check_identifiers()
            .is_ok());
        assert!(Entity::new(2, "Café", NodeKind::Standard)
            .check_identifiers()
            .is_err());

        let mut clash = Entity::new(3, "Order", NodeKind::Standard)
            .with_attribute("customer", "String");
        clash.relations.push(RelationDescriptor::many_to_one("Customer"));
        assert!(matches!(
            clash.check_identifiers(),
            Err(ArtifactError::DuplicateField { .. })
        ));
    }

    #[test]
    fn test_check_identifiers_covers_derived_id_fields() {
        let mut order = Entity::new(1, "Order", NodeKind::Standard)
            .with_attribute("customerId", "String");
        order.relations.push(RelationDescriptor::many_to_one("Customer"));
        match order.check_identifiers() {
            Err(ArtifactError::DuplicateField { entity, field }) => {
                assert_eq!(entity, "Order");
                assert_eq!(field, "customerId");
            }
            other => panic!("expected duplicate customerId, got {:?}", other),
        }

        let mut customer = Entity::new(2, "Customer", NodeKind::Standard)
            .with_attribute("orderIds", "String");
        customer.relations.push(RelationDescriptor::one_to_many("Order", "customer"));
        assert!(matches!(
            customer.check_identifiers(),
            Err(ArtifactError::DuplicateField { .. })
        ));
    }

    #[test]
    fn test_check_identifiers_rejects_non_ascii_members() {
        let leading_digit = Entity::new(1, "Persona", NodeKind::Standard).with_attribute("2Nd", "String");
        match leading_digit.check_identifiers() {
            Err(ArtifactError::InvalidIdentifier(name)) => assert_eq!(name, "Persona.2Nd"),
            other => panic!("expected invalid identifier, got {:?}", other),
        }

        let accented = Entity::new(2, "Persona", NodeKind::Standard).with_attribute("dirección", "String");
        assert!(matches!(
            accented.check_identifiers(),
            Err(ArtifactError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_artifact_targets() {
        assert_eq!(ArtifactKind::ResponseDto.target(), Target::Server);
        assert_eq!(ArtifactKind::RouteTable.target(), Target::Client);
    }
}
