//! High-level orchestration API for code generation.
//!
//! A run goes parse → infer → render → write:
//! 1. The diagram is parsed into an entity map (fatal on input errors)
//! 2. Relations are inferred serially and the service dependency graph is built
//! 3. Output roots are created (fatal when not writable)
//! 4. Server and client artifacts are rendered per entity on a bounded pool
//! 5. Artifacts are written in entity order; a failing entity is recorded in
//!    the manifest and the batch continues
//! 6. Shared client navigation is regenerated from the successful entities

use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, info, warn};

use crate::codegen::dependency_graph::DependencyGraph;
use crate::codegen::diagram_loader::{load_diagram, parse_entities, Diagram};
use crate::codegen::error::{ArtifactError, GenerateError, WorkspaceError};
use crate::codegen::flutter::{self, ClientConfig};
use crate::codegen::fs_utils;
use crate::codegen::manifest::{Manifest, Outcome};
use crate::codegen::relations::{infer_relations, ManyToManyStrategy};
use crate::codegen::spring::{self, ServerConfig};
use crate::codegen::types::{Entity, EntityMap, GeneratedArtifact, Target};
use crate::codegen::workspace::Workspace;

/// Server output root and settings
#[derive(Debug, Clone)]
pub struct ServerTarget {
    pub output_dir: PathBuf,
    pub config: ServerConfig,
}

/// Client output root and settings
#[derive(Debug, Clone)]
pub struct ClientTarget {
    pub output_dir: PathBuf,
    pub config: ClientConfig,
}

/// Configuration for one generation run.
///
/// A target that is `None` is skipped.
#[derive(Debug, Clone, Default)]
pub struct GenerationConfig {
    pub server: Option<ServerTarget>,
    pub client: Option<ClientTarget>,
    pub many_to_many: ManyToManyStrategy,
    /// Render pool size; `None` uses the available parallelism
    pub workers: Option<usize>,
}

impl GenerationConfig {
    fn worker_count(&self) -> usize {
        self.workers
            .or_else(|| thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1)
            .max(1)
    }
}

/// Parsed, relation-annotated diagram
#[derive(Debug)]
pub struct InferredModel {
    pub entities: EntityMap,
    pub dependencies: DependencyGraph,
}

/// Parse a diagram, infer relations and build the service dependency graph.
/// Nothing is written.
pub fn analyze(diagram: &Diagram, strategy: ManyToManyStrategy) -> Result<InferredModel, GenerateError> {
    let mut entities = parse_entities(diagram)?;
    info!(entities = entities.len(), edges = diagram.edges.len(), "parsed diagram");

    infer_relations(&mut entities, &diagram.edges, strategy)?;

    let dependencies = DependencyGraph::build(&entities).map_err(GenerateError::Dependency)?;
    debug!(levels = dependencies.num_levels(), "built service dependency graph");

    Ok(InferredModel {
        entities,
        dependencies,
    })
}

/// Generate all enabled targets for a diagram.
///
/// Returns `Err` only for fatal errors (input, configuration, unwritable
/// output roots). Per-entity failures are reported in the manifest.
pub fn generate(diagram: &Diagram, config: &GenerationConfig) -> Result<Manifest, GenerateError> {
    if config.server.is_none() && config.client.is_none() {
        return Err(GenerateError::Config(
            "no generation target enabled (server and client are both disabled)".to_string(),
        ));
    }

    let model = analyze(diagram, config.many_to_many)?;

    if let Some(server) = &config.server {
        prepare_root(&server.output_dir)?;
    }
    if let Some(client) = &config.client {
        prepare_root(&client.output_dir)?;
    }

    let entities: Vec<&Entity> = model.entities.values().collect();
    let workers = config.worker_count();
    info!(entities = entities.len(), workers, "rendering artifacts");

    let rendered = render_entities(&entities, workers, |entity| {
        let mut artifacts = Vec::new();
        if let Some(server) = &config.server {
            let deps = model.dependencies.dependencies_of(&entity.name);
            artifacts.extend(spring::generate_entity_artifacts(entity, deps, &server.config)?);
        }
        if let Some(client) = &config.client {
            artifacts.extend(flutter::generate_entity_artifacts(entity, &client.config)?);
        }
        Ok(artifacts)
    });

    let mut manifest = Manifest::new();
    let mut navigable: Vec<&Entity> = Vec::new();

    for (entity, result) in entities.iter().copied().zip(rendered) {
        let outcome = match result.and_then(|artifacts| write_artifacts(&artifacts, config)) {
            Ok(paths) => {
                debug!(entity = %entity.name, files = paths.len(), "entity written");
                navigable.push(entity);
                Outcome::Written(paths)
            }
            Err(e) => {
                warn!(entity = %entity.name, error = %e, "entity generation failed");
                Outcome::Failed(e.to_string())
            }
        };
        manifest.entities.insert(entity.name.clone(), outcome);
    }

    if let Some(client) = &config.client {
        let shared = flutter::generate_shared_artifacts(&navigable, &client.config)
            .and_then(|artifacts| write_artifacts(&artifacts, config));
        manifest.shared = Some(match shared {
            Ok(paths) => Outcome::Written(paths),
            Err(e) => {
                warn!(error = %e, "shared navigation generation failed");
                Outcome::Failed(e.to_string())
            }
        });
    }

    info!(
        run_id = %manifest.run_id,
        files = manifest.file_count(),
        failed = manifest.failures().count(),
        "generation complete"
    );

    Ok(manifest)
}

/// Load a diagram file and generate it
pub fn generate_from_file<P: AsRef<Path>>(
    diagram_path: P,
    config: &GenerationConfig,
) -> Result<Manifest, GenerateError> {
    let diagram = load_diagram(diagram_path)?;
    generate(&diagram, config)
}

/// Stage `skeleton` into a fresh workspace under `parent` and generate the
/// server tree into it.
///
/// The workspace replaces the server target's output root. If generation
/// fails fatally the workspace is removed; otherwise it is returned to the
/// caller, who keeps or discards it.
pub fn generate_into_workspace(
    diagram: &Diagram,
    config: &GenerationConfig,
    skeleton: &Path,
    parent: &Path,
    prefix: &str,
) -> Result<(Workspace, Manifest), GenerateError> {
    let server = config.server.as_ref().ok_or_else(|| {
        GenerateError::Config("workspace staging requires the server target".to_string())
    })?;

    let workspace = Workspace::stage(skeleton, parent, prefix)?;

    let staged = GenerationConfig {
        server: Some(ServerTarget {
            output_dir: workspace.path().to_path_buf(),
            config: server.config.clone(),
        }),
        ..config.clone()
    };

    // On error the workspace is dropped and removed
    let manifest = generate(diagram, &staged)?;
    Ok((workspace, manifest))
}

fn prepare_root(root: &Path) -> Result<(), GenerateError> {
    std::fs::create_dir_all(root).map_err(|source| {
        GenerateError::Workspace(WorkspaceError::DestinationNotWritable {
            path: root.to_path_buf(),
            source,
        })
    })
}

/// Render every entity on at most `workers` threads. Results keep entity order.
fn render_entities<'a, F>(
    entities: &[&'a Entity],
    workers: usize,
    render: F,
) -> Vec<Result<Vec<GeneratedArtifact>, ArtifactError>>
where
    F: Fn(&'a Entity) -> Result<Vec<GeneratedArtifact>, ArtifactError> + Sync,
{
    if entities.is_empty() {
        return Vec::new();
    }

    let chunk_size = entities.len().div_ceil(workers.max(1));
    let render = &render;

    thread::scope(|scope| {
        let handles: Vec<_> = entities
            .chunks(chunk_size)
            .map(|chunk| {
                let handle = scope.spawn(move || {
                    chunk.iter().map(|&entity| render(entity)).collect::<Vec<_>>()
                });
                (chunk, handle)
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|(chunk, handle)| match handle.join() {
                Ok(results) => results,
                Err(_) => chunk
                    .iter()
                    .map(|entity| {
                        Err(ArtifactError::Template(format!(
                            "renderer panicked while generating {}",
                            entity.name
                        )))
                    })
                    .collect(),
            })
            .collect()
    })
}

/// Write artifacts under their target's root; returns the absolute paths
fn write_artifacts(
    artifacts: &[GeneratedArtifact],
    config: &GenerationConfig,
) -> Result<Vec<PathBuf>, ArtifactError> {
    let mut written = Vec::with_capacity(artifacts.len());

    for artifact in artifacts {
        let root = match artifact.kind.target() {
            Target::Server => config.server.as_ref().map(|s| &s.output_dir),
            Target::Client => config.client.as_ref().map(|c| &c.output_dir),
        }
        .ok_or_else(|| {
            ArtifactError::Template(format!(
                "no output root for {}",
                artifact.file_path.display()
            ))
        })?;

        let path = root.join(&artifact.file_path);
        fs_utils::write_file(&path, &artifact.content).map_err(|source| ArtifactError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), kind = ?artifact.kind, "wrote artifact");
        written.push(path);
    }

    Ok(written)
}
