//! Standard resource provider implementation with pluggable storage.
//!
//! The provider owns everything SCIM-specific about a request: id and
//! metadata generation, uniqueness of `userName`/`displayName`, PATCH
//! application and list shaping. Persistence is delegated to a
//! [`StorageProvider`].
//!
//! Mutating requests are serialized, so a uniqueness check and the write
//! that follows it cannot interleave with another create or PATCH.
//!
//! # Example Usage
//!
//! ```rust
//! use scim_provisioner::providers::StandardResourceProvider;
//! use scim_provisioner::resource::{User, UserCreateRequest};
//! use scim_provisioner::storage::InMemoryStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = StandardResourceProvider::new(InMemoryStorage::new());
//!
//! let request = UserCreateRequest {
//!     user_name: Some("john.doe".to_string()),
//!     ..UserCreateRequest::default()
//! };
//! let user: User = provider.create(request).await?;
//! let fetched: User = provider.get(&user.id).await?;
//! assert_eq!(fetched.user_name, "john.doe");
//! # Ok(())
//! # }
//! ```

use crate::config::ServerConfig;
use crate::error::{ScimError, ScimResult};
use crate::list::{ListQuery, ListResponse, list_resources};
use crate::patch::{PatchEngine, PatchRequest};
use crate::resource::{Meta, ScimResource};
use crate::storage::{StorageKey, StorageProvider};
use log::{debug, info, trace, warn};
use tokio::sync::Mutex;

/// Standard resource provider with pluggable storage backend.
pub struct StandardResourceProvider<S: StorageProvider> {
    storage: S,
    config: ServerConfig,
    engine: PatchEngine,
    write_lock: Mutex<()>,
}

impl<S: StorageProvider> StandardResourceProvider<S> {
    /// Create a provider with the default configuration.
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, ServerConfig::default())
    }

    /// Create a provider with an explicit configuration.
    pub fn with_config(storage: S, config: ServerConfig) -> Self {
        let engine = PatchEngine::new(config.path_policy);
        Self {
            storage,
            config,
            engine,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Create a resource with a generated id and fresh metadata.
    ///
    /// Fails with 400 when a required attribute is missing and with 409 when
    /// the unique attribute is already taken.
    pub async fn create<R: ScimResource>(&self, request: R::CreateRequest) -> ScimResult<R> {
        let _guard = self.write_lock.lock().await;

        let id = uuid::Uuid::new_v4().to_string();
        let meta = Meta::new(R::RESOURCE_TYPE, self.config.location(R::ENDPOINT, &id));
        let resource = R::from_create(request, id, meta)?;

        info!(
            "Creating {} resource '{}' ({} = '{}')",
            R::RESOURCE_TYPE,
            resource.id(),
            R::UNIQUE_ATTRIBUTE,
            resource.unique_value()
        );

        self.ensure_unique(&resource).await?;
        self.store(&resource).await?;
        Ok(resource)
    }

    /// Fetch a resource by id.
    pub async fn get<R: ScimResource>(&self, id: &str) -> ScimResult<R> {
        debug!("Getting {} resource with ID '{}'", R::RESOURCE_TYPE, id);

        match self.load::<R>(id).await? {
            Some(resource) => {
                trace!("Resource found and returned");
                Ok(resource)
            }
            None => {
                debug!("Resource not found");
                Err(ScimError::resource_not_found(R::RESOURCE_TYPE, id))
            }
        }
    }

    /// List resources in creation order, filtered and paginated by `query`.
    pub async fn list<R: ScimResource>(&self, query: &ListQuery) -> ScimResult<ListResponse<R>> {
        debug!(
            "Listing {} resources (filter: {:?}, startIndex: {}, count: {:?})",
            R::RESOURCE_TYPE,
            query.filter,
            query.start_index,
            query.count
        );

        let entries = self
            .storage
            .list(StorageKey::prefix(R::RESOURCE_TYPE), 0, usize::MAX)
            .await
            .map_err(ScimError::storage)?;

        let resources: Vec<R> = entries
            .into_iter()
            .filter_map(|(key, data)| match serde_json::from_value(data) {
                Ok(resource) => Some(resource),
                Err(e) => {
                    warn!("Failed to deserialize {} during list: {}", key, e);
                    None
                }
            })
            .collect();

        let response = list_resources(resources, query);
        debug!(
            "Found {} {} resources, returning {}",
            response.total_results,
            R::RESOURCE_TYPE,
            response.items_per_page
        );
        Ok(response)
    }

    /// Physically remove a resource.
    pub async fn delete<R: ScimResource>(&self, id: &str) -> ScimResult<()> {
        info!("Deleting {} resource with ID '{}'", R::RESOURCE_TYPE, id);
        let _guard = self.write_lock.lock().await;

        let deleted = self
            .storage
            .delete(StorageKey::new(R::RESOURCE_TYPE, id))
            .await
            .map_err(ScimError::storage)?;

        if deleted {
            Ok(())
        } else {
            debug!("Resource not found for deletion");
            Err(ScimError::resource_not_found(R::RESOURCE_TYPE, id))
        }
    }

    /// Apply a PATCH request and write the result back once.
    ///
    /// Fails with 400 when `Operations` is missing and with 404 when the
    /// resource does not exist, before any operation runs. A batch that
    /// changes nothing is not written and keeps `lastModified`.
    pub async fn patch<R: ScimResource>(&self, id: &str, request: PatchRequest) -> ScimResult<R> {
        info!("Patching {} resource with ID '{}'", R::RESOURCE_TYPE, id);
        let operations = request
            .operations
            .ok_or_else(|| ScimError::invalid_request("PATCH body requires Operations."))?;

        let _guard = self.write_lock.lock().await;
        let current = self.get::<R>(id).await?;
        let previous_unique = current.unique_value().to_string();

        let outcome = self.engine.apply(current, &operations)?;
        if !outcome.is_modified() {
            debug!(
                "PATCH left {} '{}' unchanged ({} skipped)",
                R::RESOURCE_TYPE,
                id,
                outcome.skipped
            );
            return Ok(outcome.resource);
        }

        let mut resource = outcome.resource;
        if resource.unique_value() != previous_unique {
            self.ensure_unique(&resource).await?;
        }

        resource.meta_mut().touch();
        self.store(&resource).await?;
        Ok(resource)
    }

    async fn load<R: ScimResource>(&self, id: &str) -> ScimResult<Option<R>> {
        let data = self
            .storage
            .get(StorageKey::new(R::RESOURCE_TYPE, id))
            .await
            .map_err(ScimError::storage)?;

        data.map(serde_json::from_value::<R>)
            .transpose()
            .map_err(ScimError::from)
    }

    async fn store<R: ScimResource>(&self, resource: &R) -> ScimResult<()> {
        let data = serde_json::to_value(resource)?;
        trace!(
            "Storing {}: {}",
            R::RESOURCE_TYPE,
            serde_json::to_string(&data).unwrap_or_else(|_| "invalid json".to_string())
        );

        self.storage
            .put(StorageKey::new(R::RESOURCE_TYPE, resource.id()), data)
            .await
            .map_err(ScimError::storage)?;
        Ok(())
    }

    /// Fail with 409 if another resource owns the unique attribute value.
    async fn ensure_unique<R: ScimResource>(&self, resource: &R) -> ScimResult<()> {
        let value = resource.unique_value();
        let matches = self
            .storage
            .find_by_attribute(StorageKey::prefix(R::RESOURCE_TYPE), R::UNIQUE_ATTRIBUTE, value)
            .await
            .map_err(ScimError::storage)?;

        if matches.iter().any(|(key, _)| key.resource_id() != resource.id()) {
            debug!(
                "{} '{}' already owned by another {}",
                R::UNIQUE_ATTRIBUTE,
                value,
                R::RESOURCE_TYPE
            );
            return Err(ScimError::uniqueness(
                R::RESOURCE_TYPE,
                R::UNIQUE_ATTRIBUTE,
                value,
            ));
        }
        Ok(())
    }
}
