//! SCIM 2.0 provisioning server for Users and Groups.
//!
//! Identity providers push accounts and group memberships into the server
//! through the SCIM REST surface. The interesting part is PATCH: paths such
//! as `emails[type eq "work"].value` or `roles[primary eq "True"]` are parsed,
//! matched against multi-valued attributes and applied to the stored
//! resource.
//!
//! # Core Components
//!
//! - [`providers::StandardResourceProvider`] - create, get, list, delete and patch over any storage backend
//! - [`patch::PatchEngine`] - applies PATCH operations to a typed resource
//! - [`list`] - single-clause `eq` filtering and 1-based pagination
//! - [`storage::StorageProvider`] - pluggable JSON key-value storage
//! - [`http`] - axum routes for `/Users` and `/Groups`
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use scim_provisioner::providers::StandardResourceProvider;
//! use scim_provisioner::resource::{User, UserCreateRequest};
//! use scim_provisioner::storage::InMemoryStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = StandardResourceProvider::new(InMemoryStorage::new());
//! let request = UserCreateRequest {
//!     user_name: Some("alice@example.com".to_string()),
//!     ..Default::default()
//! };
//! let user: User = provider.create(request).await?;
//! println!("created {}", user.id);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod list;
pub mod patch;
pub mod providers;
pub mod resource;
pub mod schema;
pub mod storage;

pub use config::{PathPolicy, ServerConfig};
pub use error::{ScimError, ScimResult};
pub use list::{ListQuery, ListResponse};
pub use patch::{PatchEngine, PatchOperation, PatchRequest};
pub use providers::StandardResourceProvider;
pub use resource::{Group, ScimResource, User};
