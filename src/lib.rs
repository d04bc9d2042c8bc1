//! # umlforge: Class-Diagram to Source Generation
//!
//! umlforge reads a class diagram (nodes with `name: type` attributes, edges
//! with role multiplicities) and generates two independent source trees that
//! encode the same relational model:
//!
//! - **Server**: Spring Boot JPA entities, repositories, services, REST
//!   controllers and create/update/response DTOs
//! - **Client**: Flutter models, HTTP services, CRUD pages and navigation
//!
//! ## Example: diagram
//!
//! ```json
//! {
//!   "class": "GraphLinksModel",
//!   "nodeDataArray": [
//!     { "key": -1, "name": "Customer", "attribute": "name: String" },
//!     { "key": -2, "name": "Order", "attribute": "total: String" }
//!   ],
//!   "linkDataArray": [
//!     { "from": -2, "to": -1, "fromMultiplicity": "*", "toMultiplicity": "1",
//!       "category": "association" }
//!   ]
//! }
//! ```
//!
//! `Order` gets a `@ManyToOne` owning `customer_id`; `Customer` gets the inverse
//! `@OneToMany(mappedBy = "customer")`.
//!
//! ## Example: library use
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use umlforge::codegen::{generate_from_file, GenerationConfig, ServerConfig, ServerTarget};
//!
//! let config = GenerationConfig {
//!     server: Some(ServerTarget {
//!         output_dir: PathBuf::from("build/server"),
//!         config: ServerConfig::default(),
//!     }),
//!     ..Default::default()
//! };
//! let manifest = generate_from_file("diagram.json", &config)?;
//! for (entity, reason) in manifest.failures() {
//!     eprintln!("{}: {}", entity, reason);
//! }
//! # Ok::<(), umlforge::GenerateError>(())
//! ```

// Code generation framework
pub mod codegen;

// Re-export key types
pub use codegen::{
    generate, generate_from_file, Diagram, Entity, GenerateError, GenerationConfig, Manifest,
    Outcome, ProjectConfig,
};
