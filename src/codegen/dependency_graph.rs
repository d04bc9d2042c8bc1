/// Service dependency graph for generated server code
///
/// Every generated service resolves the targets of its foreign-key relations
/// through another component. Dependencies are added in entity/relation order;
/// a dependency that would close a cycle (including a self-reference) is
/// resolved through the target's repository instead of its service, so the
/// injected object graph is a DAG even when relations are cyclic.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

use crate::codegen::types::EntityMap;

/// Component a service injects to look up a related entity by id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolver {
    /// The related entity's own service
    Service,
    /// The related entity's repository (used where a service edge would form a cycle)
    Repository,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDependency {
    pub target: String,
    pub resolver: Resolver,
}

#[derive(Debug, Clone)]
pub struct DependencyNode {
    pub entity: String,
    pub depends_on: Vec<ServiceDependency>,
    pub level: usize,
}

#[derive(Debug)]
pub struct DependencyGraph {
    pub nodes: IndexMap<String, DependencyNode>,
    pub levels: Vec<Vec<String>>,
}

impl DependencyGraph {
    /// Build the service dependency graph from relation-annotated entities
    pub fn build(entities: &EntityMap) -> Result<Self, String> {
        let mut nodes: IndexMap<String, DependencyNode> = entities
            .values()
            .map(|e| {
                (
                    e.name.clone(),
                    DependencyNode {
                        entity: e.name.clone(),
                        depends_on: Vec::new(),
                        level: 0,
                    },
                )
            })
            .collect();

        for entity in entities.values() {
            for relation in entity.owned_foreign_keys() {
                let already_wired = nodes
                    .get(&entity.name)
                    .is_some_and(|n| n.depends_on.iter().any(|d| d.target == relation.target));
                if already_wired {
                    continue;
                }

                let resolver = if relation.target == entity.name
                    || Self::reaches(&nodes, &relation.target, &entity.name)
                {
                    Resolver::Repository
                } else {
                    Resolver::Service
                };

                debug!(
                    service = %entity.name,
                    target = %relation.target,
                    resolver = ?resolver,
                    "wiring service dependency"
                );

                if let Some(node) = nodes.get_mut(&entity.name) {
                    node.depends_on.push(ServiceDependency {
                        target: relation.target.clone(),
                        resolver,
                    });
                }
            }
        }

        // Compute levels using topological sort
        let levels = Self::compute_levels(&nodes)?;

        // Update node levels
        for (level_num, level_entities) in levels.iter().enumerate() {
            for entity_name in level_entities {
                if let Some(node) = nodes.get_mut(entity_name) {
                    node.level = level_num;
                }
            }
        }

        Ok(DependencyGraph { nodes, levels })
    }

    /// Whether `from` reaches `to` through service edges
    fn reaches(nodes: &IndexMap<String, DependencyNode>, from: &str, to: &str) -> bool {
        let mut stack = vec![from.to_string()];
        let mut seen = HashSet::new();

        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(node) = nodes.get(&current) {
                stack.extend(
                    node.depends_on
                        .iter()
                        .filter(|d| d.resolver == Resolver::Service)
                        .map(|d| d.target.clone()),
                );
            }
        }

        false
    }

    /// Compute construction levels using topological sort (Kahn's algorithm).
    /// Level 0 services depend on no other service.
    fn compute_levels(
        nodes: &IndexMap<String, DependencyNode>,
    ) -> Result<Vec<Vec<String>>, String> {
        // Build reverse dependency map (who depends on this entity)
        let mut reverse_deps: HashMap<String, Vec<String>> = HashMap::new();
        let mut in_degree: IndexMap<String, usize> = IndexMap::new();

        for (entity_name, node) in nodes {
            let service_deps: Vec<&String> = node
                .depends_on
                .iter()
                .filter(|dep| dep.resolver == Resolver::Service && nodes.contains_key(&dep.target))
                .map(|dep| &dep.target)
                .collect();

            in_degree.insert(entity_name.clone(), service_deps.len());

            for dep in service_deps {
                reverse_deps
                    .entry(dep.clone())
                    .or_default()
                    .push(entity_name.clone());
            }
        }

        let mut queue: VecDeque<String> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(name, _)| name.clone())
            .collect();

        let mut levels: Vec<Vec<String>> = Vec::new();
        let mut processed = HashSet::new();

        // Process level by level
        while !queue.is_empty() {
            let mut current_level = Vec::new();

            let level_size = queue.len();
            for _ in 0..level_size {
                if let Some(entity_name) = queue.pop_front() {
                    current_level.push(entity_name.clone());
                    processed.insert(entity_name.clone());

                    if let Some(dependents) = reverse_deps.get(&entity_name) {
                        for dependent in dependents {
                            if let Some(degree) = in_degree.get_mut(dependent) {
                                *degree -= 1;
                                if *degree == 0 {
                                    queue.push_back(dependent.clone());
                                }
                            }
                        }
                    }
                }
            }

            if !current_level.is_empty() {
                levels.push(current_level);
            }
        }

        if processed.len() != nodes.len() {
            let unprocessed: Vec<String> = nodes
                .keys()
                .filter(|k| !processed.contains(*k))
                .cloned()
                .collect();
            return Err(format!(
                "Circular service dependency detected involving entities: {:?}",
                unprocessed
            ));
        }

        Ok(levels)
    }

    /// Dependencies injected into `entity`'s service, in relation order
    pub fn dependencies_of(&self, entity: &str) -> &[ServiceDependency] {
        self.nodes
            .get(entity)
            .map(|n| n.depends_on.as_slice())
            .unwrap_or(&[])
    }

    /// Get total number of levels
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// All services in construction order (flattened levels)
    pub fn processing_order(&self) -> Vec<String> {
        self.levels.iter().flatten().cloned().collect()
    }

    /// Check if a service depends on another service (directly or indirectly)
    pub fn depends_on(&self, entity: &str, dependency: &str) -> bool {
        Self::reaches(&self.nodes, entity, dependency) && entity != dependency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::types::{Entity, NodeKind, RelationDescriptor};

    fn entity(key: i64, name: &str, owns: &[&str]) -> (i64, Entity) {
        let mut e = Entity::new(key, name, NodeKind::Standard);
        for target in owns {
            e.relations.push(RelationDescriptor::many_to_one(target));
        }
        (key, e)
    }

    #[test]
    fn test_simple_dependency_chain() {
        // C owns B, B owns A
        let entities: EntityMap = [
            entity(1, "A", &[]),
            entity(2, "B", &["A"]),
            entity(3, "C", &["B"]),
        ]
        .into_iter()
        .collect();

        let graph = DependencyGraph::build(&entities).unwrap();

        assert_eq!(graph.num_levels(), 3);
        assert_eq!(graph.levels[0], vec!["A"]);
        assert_eq!(graph.levels[1], vec!["B"]);
        assert_eq!(graph.levels[2], vec!["C"]);
        assert!(graph.depends_on("C", "A"));
        assert!(!graph.depends_on("A", "C"));
    }

    #[test]
    fn test_parallel_dependencies() {
        let entities: EntityMap = [
            entity(1, "A", &[]),
            entity(2, "B", &[]),
            entity(3, "C", &["A", "B"]),
        ]
        .into_iter()
        .collect();

        let graph = DependencyGraph::build(&entities).unwrap();

        assert_eq!(graph.levels.len(), 2);
        assert_eq!(graph.levels[0], vec!["A", "B"]);
        assert_eq!(graph.levels[1], vec!["C"]);
        assert_eq!(graph.processing_order(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_cyclic_relations_fall_back_to_repository() {
        // A owns B, B owns C, C owns A: the last edge would close the cycle
        let entities: EntityMap = [
            entity(1, "A", &["B"]),
            entity(2, "B", &["C"]),
            entity(3, "C", &["A"]),
        ]
        .into_iter()
        .collect();

        let graph = DependencyGraph::build(&entities).unwrap();

        assert_eq!(graph.dependencies_of("A")[0].resolver, Resolver::Service);
        assert_eq!(graph.dependencies_of("B")[0].resolver, Resolver::Service);
        assert_eq!(graph.dependencies_of("C")[0].resolver, Resolver::Repository);
        assert_eq!(graph.processing_order(), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_self_reference_uses_repository() {
        let entities: EntityMap = [entity(1, "Employee", &["Employee"])].into_iter().collect();

        let graph = DependencyGraph::build(&entities).unwrap();

        assert_eq!(
            graph.dependencies_of("Employee"),
            &[ServiceDependency {
                target: "Employee".to_string(),
                resolver: Resolver::Repository,
            }]
        );
    }

    #[test]
    fn test_duplicate_targets_are_wired_once() {
        let entities: EntityMap = [entity(1, "A", &[]), entity(2, "B", &["A", "A"])]
            .into_iter()
            .collect();

        let graph = DependencyGraph::build(&entities).unwrap();
        assert_eq!(graph.dependencies_of("B").len(), 1);
    }

    #[test]
    fn test_circular_dependency_detection() {
        // Hand-built cycle bypassing build(): A -> B -> A
        let mut nodes = IndexMap::new();
        for (name, dep) in [("A", "B"), ("B", "A")] {
            nodes.insert(
                name.to_string(),
                DependencyNode {
                    entity: name.to_string(),
                    depends_on: vec![ServiceDependency {
                        target: dep.to_string(),
                        resolver: Resolver::Service,
                    }],
                    level: 0,
                },
            );
        }

        let result = DependencyGraph::compute_levels(&nodes);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Circular service dependency"));
    }
}
