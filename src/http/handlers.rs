//! Generic SCIM resource endpoints.
//!
//! Every handler is generic over the storage backend and the resource type;
//! the router instantiates them for `User` and `Group`.

use crate::error::{ScimError, ScimResult};
use crate::http::response::ScimJson;
use crate::list::{ListQuery, ListResponse};
use crate::patch::PatchRequest;
use crate::providers::StandardResourceProvider;
use crate::resource::ScimResource;
use crate::storage::StorageProvider;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use log::trace;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Shared provider handed to every handler.
pub type SharedProvider<S> = Arc<StandardResourceProvider<S>>;

/// Raw list query parameters.
///
/// Kept as strings so that malformed numbers fall back to defaults instead
/// of rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub filter: Option<String>,
    pub start_index: Option<String>,
    pub count: Option<String>,
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        let start_index = params
            .start_index
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(1);
        let count = params.count.and_then(|s| s.trim().parse::<i64>().ok());

        Self {
            filter: params.filter,
            start_index,
            count,
        }
    }
}

/// `POST /<Endpoint>`
pub async fn create_resource<S, R>(
    State(provider): State<SharedProvider<S>>,
    body: Bytes,
) -> ScimResult<ScimJson<R>>
where
    S: StorageProvider + 'static,
    R: ScimResource,
{
    let request: R::CreateRequest = parse_body(&body)?;
    let resource: R = provider.create(request).await?;
    let location = resource.meta().location().map(str::to_string);
    Ok(ScimJson::created(resource, location.as_deref()))
}

/// `GET /<Endpoint>/{id}`
pub async fn get_resource<S, R>(
    State(provider): State<SharedProvider<S>>,
    Path(id): Path<String>,
) -> ScimResult<ScimJson<R>>
where
    S: StorageProvider + 'static,
    R: ScimResource,
{
    let resource: R = provider.get(&id).await?;
    Ok(ScimJson::ok(resource))
}

/// `GET /<Endpoint>?filter=&startIndex=&count=`
pub async fn list_resources<S, R>(
    State(provider): State<SharedProvider<S>>,
    Query(params): Query<ListParams>,
) -> ScimResult<ScimJson<ListResponse<R>>>
where
    S: StorageProvider + 'static,
    R: ScimResource,
{
    let query = ListQuery::from(params);
    let response = provider.list::<R>(&query).await?;
    Ok(ScimJson::ok(response))
}

/// `PATCH /<Endpoint>/{id}`
pub async fn patch_resource<S, R>(
    State(provider): State<SharedProvider<S>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ScimResult<ScimJson<R>>
where
    S: StorageProvider + 'static,
    R: ScimResource,
{
    let request: PatchRequest = parse_body(&body)?;
    let resource: R = provider.patch(&id, request).await?;
    Ok(ScimJson::ok(resource))
}

/// `DELETE /<Endpoint>/{id}`
pub async fn delete_resource<S, R>(
    State(provider): State<SharedProvider<S>>,
    Path(id): Path<String>,
) -> ScimResult<StatusCode>
where
    S: StorageProvider + 'static,
    R: ScimResource,
{
    provider.delete::<R>(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Parse a JSON body regardless of whether it was sent as
/// `application/json` or `application/scim+json`.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> ScimResult<T> {
    trace!("Request body: {}", String::from_utf8_lossy(body));
    serde_json::from_slice(body).map_err(|e| ScimError::invalid_syntax(format!("Invalid JSON: {}", e)))
}
