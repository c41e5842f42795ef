#![deny(missing_docs)]

//! # OpenAPI Loading Module
//!
//! - **fetch**: Document retrieval seam.
//! - **loader**: Multi-document loading and flattening into a `Bundle`.
//! - **bundle**: The immutable bundle model (paths, operations, parameters).
//! - **schema**: Tagged schema variants and the single parse pass producing them.
//! - **registry**: Merged schema namespace and multi-hop resolution.
//! - **refs** / **paths**: `$ref` and path-template helpers.
//! - **shims**: Raw deserialization layer.

pub mod bundle;
pub mod fetch;
pub mod loader;
pub mod paths;
pub mod refs;
pub mod registry;
pub mod schema;
pub mod shims;

pub use bundle::{Bundle, HttpMethod, Operation, ParamLocation, Parameter, PathOperations};
pub use fetch::{DocumentFetcher, FsFetcher, MemoryFetcher};
pub use loader::{location_to_url, BundleLoader};
pub use registry::{ResolveError, Resolved, SchemaRegistry};
pub use schema::{Definition, PrimitiveKind, SchemaRef};
