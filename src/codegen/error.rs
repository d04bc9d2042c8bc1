//! Error types for diagram parsing, workspace staging and artifact generation.
//!
//! Fatal errors ([`DiagramError`], [`WorkspaceError`]) abort a run before or while
//! the output tree is prepared. [`ArtifactError`] is scoped to a single entity and
//! only ever ends up in the manifest.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::codegen::types::EntityKey;

/// Input errors raised while reading or validating a diagram graph
#[derive(Debug)]
pub enum DiagramError {
    /// A required top-level section (`nodeDataArray`, `linkDataArray`) is absent or empty
    MissingSection(&'static str),
    InvalidJson(String),
    InvalidYaml(String),
    /// An edge references a node key that is not in the node list
    DanglingEdge {
        from: EntityKey,
        to: EntityKey,
        missing: EntityKey,
    },
    DuplicateKey(EntityKey),
    DuplicateName(String),
    EmptyName(EntityKey),
    UnsupportedFormat(PathBuf),
    Io {
        path: PathBuf,
        source: io::Error,
    },
}

impl fmt::Display for DiagramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramError::MissingSection(section) => {
                write!(f, "Diagram is missing required section '{}'", section)
            }
            DiagramError::InvalidJson(msg) => write!(f, "Invalid diagram JSON: {}", msg),
            DiagramError::InvalidYaml(msg) => write!(f, "Invalid diagram YAML: {}", msg),
            DiagramError::DanglingEdge { from, to, missing } => write!(
                f,
                "Edge {} -> {} references unknown node key {}",
                from, to, missing
            ),
            DiagramError::DuplicateKey(key) => write!(f, "Duplicate node key {}", key),
            DiagramError::DuplicateName(name) => {
                write!(f, "Two nodes resolve to the same entity name '{}'", name)
            }
            DiagramError::EmptyName(key) => write!(f, "Node {} has an empty name", key),
            DiagramError::UnsupportedFormat(path) => write!(
                f,
                "Unsupported diagram file extension: {} (expected .json, .yaml or .yml)",
                path.display()
            ),
            DiagramError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for DiagramError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiagramError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors raised while staging or preparing an output tree
#[derive(Debug)]
pub enum WorkspaceError {
    SkeletonMissing(PathBuf),
    NotADirectory(PathBuf),
    DestinationNotWritable {
        path: PathBuf,
        source: io::Error,
    },
    Io {
        path: PathBuf,
        source: io::Error,
    },
}

impl fmt::Display for WorkspaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkspaceError::SkeletonMissing(path) => {
                write!(f, "Base project skeleton not found: {}", path.display())
            }
            WorkspaceError::NotADirectory(path) => {
                write!(f, "Path is not a directory: {}", path.display())
            }
            WorkspaceError::DestinationNotWritable { path, source } => {
                write!(f, "Destination {} is not writable: {}", path.display(), source)
            }
            WorkspaceError::Io { path, source } => {
                write!(f, "Workspace I/O error at {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for WorkspaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorkspaceError::DestinationNotWritable { source, .. } => Some(source),
            WorkspaceError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Per-entity generation failure, recorded in the manifest
#[derive(Debug)]
pub enum ArtifactError {
    InvalidIdentifier(String),
    DuplicateField {
        entity: String,
        field: String,
    },
    Template(String),
    Write {
        path: PathBuf,
        source: io::Error,
    },
}

impl fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactError::InvalidIdentifier(name) => {
                write!(f, "'{}' is not a valid Java/Dart identifier", name)
            }
            ArtifactError::DuplicateField { entity, field } => {
                write!(f, "Entity '{}' declares field '{}' more than once", entity, field)
            }
            ArtifactError::Template(msg) => write!(f, "Template error: {}", msg),
            ArtifactError::Write { path, source } => {
                write!(f, "Failed to write {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ArtifactError {}

impl From<fmt::Error> for ArtifactError {
    fn from(_: fmt::Error) -> Self {
        ArtifactError::Template("formatter error while rendering".to_string())
    }
}

/// Fatal error for a whole generation run
#[derive(Debug)]
pub enum GenerateError {
    Diagram(DiagramError),
    Workspace(WorkspaceError),
    Config(String),
    Dependency(String),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Diagram(e) => write!(f, "{}", e),
            GenerateError::Workspace(e) => write!(f, "{}", e),
            GenerateError::Config(msg) => write!(f, "Configuration error: {}", msg),
            GenerateError::Dependency(msg) => write!(f, "Dependency error: {}", msg),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerateError::Diagram(e) => Some(e),
            GenerateError::Workspace(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DiagramError> for GenerateError {
    fn from(e: DiagramError) -> Self {
        GenerateError::Diagram(e)
    }
}

impl From<WorkspaceError> for GenerateError {
    fn from(e: WorkspaceError) -> Self {
        GenerateError::Workspace(e)
    }
}
