//! HTTP surface: axum routes for Users and Groups.
//!
//! - `GET/POST /Users`, `GET/PATCH/DELETE /Users/{id}`
//! - `GET/POST /Groups`, `GET/PATCH/DELETE /Groups/{id}`
//!
//! [`app`] mounts these under the configured base path.

pub mod handlers;
pub mod response;

pub use handlers::SharedProvider;
pub use response::{ScimErrorResponse, ScimJson};

use crate::providers::StandardResourceProvider;
use crate::resource::{Group, ScimResource, User};
use crate::storage::StorageProvider;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;

/// Resource routes relative to the base path.
pub fn router<S>(provider: SharedProvider<S>) -> Router
where
    S: StorageProvider + 'static,
{
    let routes = Router::new();
    let routes = resource_routes::<S, User>(routes);
    let routes = resource_routes::<S, Group>(routes);
    routes.with_state(provider)
}

/// The full application, with resource routes nested under the configured
/// base path. An empty base path mounts them at the root.
pub fn app<S>(provider: StandardResourceProvider<S>) -> Router
where
    S: StorageProvider + 'static,
{
    let base_path = provider.config().base_path.clone();
    let routes = router(Arc::new(provider));

    if base_path.is_empty() {
        routes
    } else {
        Router::new().nest(&base_path, routes)
    }
}

fn resource_routes<S, R>(routes: Router<SharedProvider<S>>) -> Router<SharedProvider<S>>
where
    S: StorageProvider + 'static,
    R: ScimResource,
{
    let collection = format!("/{}", R::ENDPOINT);
    let item = format!("/{}/{{id}}", R::ENDPOINT);

    routes
        .route(
            &collection,
            get(handlers::list_resources::<S, R>).post(handlers::create_resource::<S, R>),
        )
        .route(
            &item,
            get(handlers::get_resource::<S, R>)
                .patch(handlers::patch_resource::<S, R>)
                .delete(handlers::delete_resource::<S, R>),
        )
}
