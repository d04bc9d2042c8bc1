//! Relationship inference.
//!
//! Every edge is turned into directed [`RelationDescriptor`]s attached to its
//! endpoint entities. The cardinality algebra is keyed strictly on the
//! `(fromMultiplicity, toMultiplicity)` pair:
//!
//! | from | to | from-entity gets | to-entity gets |
//! |------|----|------------------|----------------|
//! | 1 | * | `OneToMany(to, mappedBy)` | `ManyToOne(from, from_id)` |
//! | * | 1 | `ManyToOne(to, to_id)` | `OneToMany(from, mappedBy)` |
//! | 1 | 1 | `OneToOne(to, to_id)` | `OneToOne(from, mappedBy)` |
//! | * | * | `ManyToMany(to)` | nothing (see [`ManyToManyStrategy`]) |
//!
//! The `*` end of a to-one/to-many pair always stores the foreign key. The
//! `mappedBy` hint names the owning side's field, which is named after the
//! inverse entity itself. Edges are processed in input order, so each entity's
//! relation list follows edge order.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::codegen::diagram_loader::{EdgeRecord, Multiplicity};
use crate::codegen::error::DiagramError;
use crate::codegen::types::{Entity, EntityKey, EntityMap, NodeKind, RelationDescriptor};

/// How a `* - *` edge is expanded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManyToManyStrategy {
    /// One forward `ManyToMany` descriptor on the from side and nothing on the
    /// to side; the from side owns the join table
    #[default]
    Forward,
    /// Synthesize a `<From><To>` join entity and replace the edge by two
    /// `(join *, endpoint 1)` edges
    JoinEntity,
}

/// Populate each entity's relation list from the edge list.
///
/// Runs serially: edges that share an endpoint append to the same list.
pub fn infer_relations(
    entities: &mut EntityMap,
    edges: &[EdgeRecord],
    strategy: ManyToManyStrategy,
) -> Result<(), DiagramError> {
    for edge in edges {
        let from_name = entity_name(entities, edge, edge.from)?;
        let to_name = entity_name(entities, edge, edge.to)?;

        debug!(
            from = %from_name,
            to = %to_name,
            category = ?edge.category,
            from_multiplicity = ?edge.from_multiplicity,
            to_multiplicity = ?edge.to_multiplicity,
            "inferring relation"
        );

        match (edge.from_multiplicity, edge.to_multiplicity) {
            (Multiplicity::Many, Multiplicity::Many) => match strategy {
                ManyToManyStrategy::Forward => {
                    push(entities, edge.from, RelationDescriptor::many_to_many(&to_name));
                }
                ManyToManyStrategy::JoinEntity => {
                    let join_key = ensure_join_entity(entities, &from_name, &to_name);
                    apply_pair(entities, join_key, edge.from, Multiplicity::Many, Multiplicity::One);
                    apply_pair(entities, join_key, edge.to, Multiplicity::Many, Multiplicity::One);
                }
            },
            (from_mult, to_mult) => {
                apply_pair(entities, edge.from, edge.to, from_mult, to_mult);
            }
        }
    }

    let total: usize = entities.values().map(|e| e.relations.len()).sum();
    info!(edges = edges.len(), descriptors = total, "relation inference complete");

    Ok(())
}

/// Apply one row of the cardinality table to a (from, to) pair that is not `* - *`
fn apply_pair(
    entities: &mut EntityMap,
    from: EntityKey,
    to: EntityKey,
    from_mult: Multiplicity,
    to_mult: Multiplicity,
) {
    let from_name = entities[&from].name.clone();
    let to_name = entities[&to].name.clone();
    let from_field = entities[&from].var_name();
    let to_field = entities[&to].var_name();

    match (from_mult, to_mult) {
        (Multiplicity::One, Multiplicity::Many) => {
            push(entities, from, RelationDescriptor::one_to_many(&to_name, &from_field));
            push(entities, to, RelationDescriptor::many_to_one(&from_name));
        }
        (Multiplicity::Many, Multiplicity::One) => {
            push(entities, from, RelationDescriptor::many_to_one(&to_name));
            push(entities, to, RelationDescriptor::one_to_many(&from_name, &to_field));
        }
        (Multiplicity::One, Multiplicity::One) => {
            push(entities, from, RelationDescriptor::one_to_one_owning(&to_name));
            push(entities, to, RelationDescriptor::one_to_one_inverse(&from_name, &to_field));
        }
        (Multiplicity::Many, Multiplicity::Many) => {
            push(entities, from, RelationDescriptor::many_to_many(&to_name));
        }
    }
}

/// Return the key of the `<From><To>` join entity, creating it when absent.
/// A node with that name drawn by the user is reused.
fn ensure_join_entity(entities: &mut EntityMap, from_name: &str, to_name: &str) -> EntityKey {
    let join_name = format!("{}{}", from_name, to_name);

    if let Some(existing) = entities.values().find(|e| e.name == join_name) {
        return existing.key;
    }

    let key = entities.keys().copied().min().unwrap_or(0).min(0) - 1;
    info!(entity = %join_name, key, "synthesized many-to-many join entity");
    entities.insert(key, Entity::new(key, join_name, NodeKind::Synthesized));
    key
}

fn entity_name(
    entities: &EntityMap,
    edge: &EdgeRecord,
    key: EntityKey,
) -> Result<String, DiagramError> {
    entities
        .get(&key)
        .map(|e| e.name.clone())
        .ok_or(DiagramError::DanglingEdge {
            from: edge.from,
            to: edge.to,
            missing: key,
        })
}

fn push(entities: &mut EntityMap, key: EntityKey, relation: RelationDescriptor) {
    if let Some(entity) = entities.get_mut(&key) {
        entity.relations.push(relation);
    }
}
