//! umlforge CLI - class-diagram to Spring Boot and Flutter source generation
//!
//! This CLI tool reads a diagram export and writes the server and client source trees.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use umlforge::codegen::{
    analyze, generate, generate_into_workspace, load_diagram, Manifest, ManyToManyStrategy,
    ProjectConfig, RelationDescriptor, Resolver, TypeMapping,
};

#[derive(Parser)]
#[command(name = "umlforge")]
#[command(version, about = "Generate Spring Boot and Flutter sources from a class diagram", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate server and client source trees from a diagram
    Generate {
        /// Diagram export (.json, .yaml or .yml)
        #[arg(short, long)]
        diagram: PathBuf,

        /// Project configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output root of the Spring Boot tree
        #[arg(long)]
        server_out: Option<PathBuf>,

        /// Output root of the Flutter tree
        #[arg(long)]
        client_out: Option<PathBuf>,

        /// Base Java package (e.g. com.example.shop)
        #[arg(short, long)]
        package: Option<String>,

        /// Server URL used by the generated client
        #[arg(long)]
        api_base_url: Option<String>,

        /// Many-to-many expansion: forward or join-entity
        #[arg(long, value_parser = parse_many_to_many)]
        many_to_many: Option<ManyToManyStrategy>,

        /// Attribute type mapping: uniform or declared
        #[arg(long, value_parser = parse_type_mapping)]
        type_mapping: Option<TypeMapping>,

        /// Render worker count
        #[arg(short, long)]
        workers: Option<usize>,

        /// Skip the server tree
        #[arg(long)]
        no_server: bool,

        /// Skip the client tree
        #[arg(long)]
        no_client: bool,

        /// Also emit lib/main.dart and pubspec.yaml
        #[arg(long)]
        scaffold: bool,

        /// Copy server.skeleton_dir into a fresh workspace under the server output root
        #[arg(long)]
        stage: bool,

        /// Write the run manifest as JSON to this path
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Parse a diagram and infer relations without writing anything
    Validate {
        /// Diagram export (.json, .yaml or .yml)
        #[arg(short, long)]
        diagram: PathBuf,

        /// Many-to-many expansion: forward or join-entity
        #[arg(long, value_parser = parse_many_to_many, default_value = "forward")]
        many_to_many: ManyToManyStrategy,
    },

    /// Print the inferred relations and service dependencies per entity
    Inspect {
        /// Diagram export (.json, .yaml or .yml)
        #[arg(short, long)]
        diagram: PathBuf,

        /// Many-to-many expansion: forward or join-entity
        #[arg(long, value_parser = parse_many_to_many, default_value = "forward")]
        many_to_many: ManyToManyStrategy,
    },
}

fn parse_many_to_many(value: &str) -> Result<ManyToManyStrategy, String> {
    match value.to_lowercase().replace('-', "_").as_str() {
        "forward" => Ok(ManyToManyStrategy::Forward),
        "join_entity" => Ok(ManyToManyStrategy::JoinEntity),
        other => Err(format!("unknown many-to-many strategy '{}'", other)),
    }
}

fn parse_type_mapping(value: &str) -> Result<TypeMapping, String> {
    match value.to_lowercase().as_str() {
        "uniform" => Ok(TypeMapping::Uniform),
        "declared" => Ok(TypeMapping::Declared),
        other => Err(format!("unknown type mapping '{}'", other)),
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "umlforge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            diagram,
            config,
            server_out,
            client_out,
            package,
            api_base_url,
            many_to_many,
            type_mapping,
            workers,
            no_server,
            no_client,
            scaffold,
            stage,
            manifest,
        } => {
            let overrides = Overrides {
                server_out,
                client_out,
                package,
                api_base_url,
                many_to_many,
                type_mapping,
                workers,
                no_server,
                no_client,
                scaffold,
            };
            generate_command(&diagram, config.as_deref(), overrides, stage, manifest.as_deref())
        }
        Commands::Validate {
            diagram,
            many_to_many,
        } => validate_command(&diagram, many_to_many),
        Commands::Inspect {
            diagram,
            many_to_many,
        } => inspect_command(&diagram, many_to_many),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Command-line values that take precedence over the environment and the file
struct Overrides {
    server_out: Option<PathBuf>,
    client_out: Option<PathBuf>,
    package: Option<String>,
    api_base_url: Option<String>,
    many_to_many: Option<ManyToManyStrategy>,
    type_mapping: Option<TypeMapping>,
    workers: Option<usize>,
    no_server: bool,
    no_client: bool,
    scaffold: bool,
}

impl Overrides {
    fn apply(self, project: &mut ProjectConfig) {
        if let Some(dir) = self.server_out {
            project.server.output_dir = dir.to_string_lossy().to_string();
        }
        if let Some(dir) = self.client_out {
            project.client.output_dir = dir.to_string_lossy().to_string();
        }
        if self.package.is_some() {
            project.server.base_package = self.package;
        }
        if self.api_base_url.is_some() {
            project.client.api_base_url = self.api_base_url;
        }
        if let Some(strategy) = self.many_to_many {
            project.generation.many_to_many = strategy;
        }
        if let Some(mapping) = self.type_mapping {
            project.generation.type_mapping = mapping;
        }
        if self.workers.is_some() {
            project.generation.workers = self.workers;
        }
        if self.no_server {
            project.server.enabled = false;
        }
        if self.no_client {
            project.client.enabled = false;
        }
        if self.scaffold {
            project.client.scaffold = true;
        }
    }
}

fn generate_command(
    diagram_path: &Path,
    config_path: Option<&Path>,
    overrides: Overrides,
    stage: bool,
    manifest_path: Option<&Path>,
) -> Result<(), String> {
    let (mut project, base_dir) = match config_path {
        Some(path) => {
            println!("📋 Loading configuration from {}...", path.display());
            let project = ProjectConfig::from_file(path)?;
            let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (project, base_dir)
        }
        None => (ProjectConfig::default(), PathBuf::from(".")),
    };

    project.apply_env()?;
    overrides.apply(&mut project);
    project.validate()?;

    println!("🔧 Generating {} from {}...", project.project.name, diagram_path.display());

    let diagram = load_diagram(diagram_path).map_err(|e| e.to_string())?;
    println!(
        "  ✓ Loaded {} nodes and {} edges",
        diagram.nodes.len(),
        diagram.edges.len()
    );

    let config = project.to_generation_config(&base_dir);

    let manifest = if stage {
        let skeleton = project
            .skeleton_path(&base_dir)
            .ok_or("--stage requires server.skeleton_dir in the configuration")?;
        let parent = config
            .server
            .as_ref()
            .map(|server| server.output_dir.clone())
            .ok_or("--stage requires the server target")?;

        let (workspace, manifest) = generate_into_workspace(
            &diagram,
            &config,
            &skeleton,
            &parent,
            &to_prefix(&project.project.name),
        )
        .map_err(|e| e.to_string())?;
        let kept = workspace.keep();
        println!("  ✓ Staged workspace at {}", kept.display());
        manifest
    } else {
        generate(&diagram, &config).map_err(|e| e.to_string())?
    };

    print_summary(&manifest);

    if let Some(path) = manifest_path {
        let json = manifest
            .to_json()
            .map_err(|e| format!("Failed to serialize manifest: {}", e))?;
        std::fs::write(path, json)
            .map_err(|e| format!("Failed to write manifest {}: {}", path.display(), e))?;
        println!("  ✓ Wrote manifest to {}", path.display());
    }

    if !manifest.is_complete() {
        return Err(format!(
            "{} entities failed to generate",
            manifest.failures().count()
        ));
    }

    println!("✨ Generation complete!");
    Ok(())
}

fn to_prefix(name: &str) -> String {
    umlforge::codegen::utils::to_snake_case(name)
}

fn print_summary(manifest: &Manifest) {
    println!("\n📦 Run {}", manifest.run_id);
    for (entity, outcome) in &manifest.entities {
        if outcome.is_written() {
            println!("  ✓ {} ({} files)", entity, outcome.paths().len());
        }
    }
    for (entity, reason) in manifest.failures() {
        println!("  ✗ {}: {}", entity, reason);
    }
    if let Some(shared) = &manifest.shared {
        match shared {
            umlforge::Outcome::Written(paths) => println!("  ✓ navigation ({} files)", paths.len()),
            umlforge::Outcome::Failed(reason) => println!("  ✗ navigation: {}", reason),
        }
    }
    println!("  ℹ {} files written", manifest.file_count());
}

fn validate_command(diagram_path: &Path, strategy: ManyToManyStrategy) -> Result<(), String> {
    println!("🔍 Validating {}...", diagram_path.display());

    let diagram = load_diagram(diagram_path).map_err(|e| e.to_string())?;
    let model = analyze(&diagram, strategy).map_err(|e| e.to_string())?;

    let relations: usize = model.entities.values().map(|e| e.relations.len()).sum();
    println!("  ✓ {} entities", model.entities.len());
    println!("  ✓ {} relation descriptors", relations);
    println!("  ✓ {} service construction levels", model.dependencies.num_levels());
    println!("✨ Diagram is valid");

    Ok(())
}

fn describe(relation: &RelationDescriptor) -> String {
    let mut text = format!("{} {} ({})", relation.kind.annotation(), relation.target, relation.field_name());
    if let Some(column) = &relation.owning_key {
        text.push_str(&format!(" owns {}", column));
    }
    if let Some(mapped_by) = &relation.inverse_field {
        text.push_str(&format!(" mappedBy {}", mapped_by));
    }
    text
}

fn inspect_command(diagram_path: &Path, strategy: ManyToManyStrategy) -> Result<(), String> {
    let diagram = load_diagram(diagram_path).map_err(|e| e.to_string())?;
    let model = analyze(&diagram, strategy).map_err(|e| e.to_string())?;

    for entity in model.entities.values() {
        println!("📄 {} [{:?}] key={}", entity.name, entity.kind, entity.key);
        for attribute in &entity.attributes {
            println!("    {}: {}", attribute.name, attribute.declared_type);
        }
        for relation in &entity.relations {
            println!("    → {}", describe(relation));
        }
        for dependency in model.dependencies.dependencies_of(&entity.name) {
            let via = match dependency.resolver {
                Resolver::Service => "service",
                Resolver::Repository => "repository",
            };
            println!("    ⚙ resolves {} via {}", dependency.target, via);
        }
    }

    let order = model.dependencies.processing_order();
    println!("\n🧭 Service construction order: {}", order.join(" → "));
    for (level, services) in model.dependencies.levels.iter().enumerate() {
        println!("  {}: {}", level, services.join(", "));
    }
    for service in &order {
        let upstream: Vec<&str> = order
            .iter()
            .filter(|other| model.dependencies.depends_on(service, other))
            .map(String::as_str)
            .collect();
        if !upstream.is_empty() {
            println!("  {} needs {}", service, upstream.join(", "));
        }
    }

    Ok(())
}
