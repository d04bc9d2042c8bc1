//! Result of a generation run.
//!
//! The manifest lists, per source entity, either the files that were written
//! or the reason the entity failed. Per-entity failures never abort a run, so
//! a manifest is returned even when some entities failed.

use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

/// Outcome of generating one entity (or the shared navigation artifacts)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "detail")]
pub enum Outcome {
    /// Absolute paths of every written file
    Written(Vec<PathBuf>),
    Failed(String),
}

impl Outcome {
    pub fn is_written(&self) -> bool {
        matches!(self, Outcome::Written(_))
    }

    pub fn paths(&self) -> &[PathBuf] {
        match self {
            Outcome::Written(paths) => paths,
            Outcome::Failed(_) => &[],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub run_id: Uuid,
    /// Per-entity outcomes in entity order
    pub entities: IndexMap<String, Outcome>,
    /// Outcome of the shared client navigation files; `None` when the client
    /// target is disabled
    pub shared: Option<Outcome>,
}

impl Manifest {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            entities: IndexMap::new(),
            shared: None,
        }
    }

    /// Names of entities whose artifacts were all written
    pub fn succeeded(&self) -> impl Iterator<Item = &str> {
        self.entities
            .iter()
            .filter(|(_, outcome)| outcome.is_written())
            .map(|(name, _)| name.as_str())
    }

    /// `(entity, reason)` for every failed entity
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entities.iter().filter_map(|(name, outcome)| match outcome {
            Outcome::Failed(reason) => Some((name.as_str(), reason.as_str())),
            Outcome::Written(_) => None,
        })
    }

    /// Whether every entity and the shared artifacts were written
    pub fn is_complete(&self) -> bool {
        self.entities.values().all(Outcome::is_written)
            && self.shared.as_ref().map_or(true, Outcome::is_written)
    }

    /// Total number of written files
    pub fn file_count(&self) -> usize {
        self.entities
            .values()
            .chain(self.shared.iter())
            .map(|outcome| outcome.paths().len())
            .sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Manifest {
        let mut manifest = Manifest::new();
        manifest.entities.insert(
            "Customer".to_string(),
            Outcome::Written(vec![PathBuf::from("/out/Customer.java")]),
        );
        manifest
            .entities
            .insert("2Fast".to_string(), Outcome::Failed("invalid identifier".to_string()));
        manifest.shared = Some(Outcome::Written(vec![PathBuf::from("/out/app_routes.dart")]));
        manifest
    }

    #[test]
    fn test_summary_helpers() {
        let manifest = sample();

        assert_eq!(manifest.succeeded().collect::<Vec<_>>(), vec!["Customer"]);
        assert_eq!(
            manifest.failures().collect::<Vec<_>>(),
            vec![("2Fast", "invalid identifier")]
        );
        assert!(!manifest.is_complete());
        assert_eq!(manifest.file_count(), 2);
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();

        assert_eq!(json["entities"]["Customer"]["status"], "written");
        assert_eq!(json["entities"]["Customer"]["detail"][0], "/out/Customer.java");
        assert_eq!(json["entities"]["2Fast"]["status"], "failed");
        assert!(json["run_id"].is_string());
    }
}
