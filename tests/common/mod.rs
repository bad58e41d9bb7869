//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use scim_provisioner::config::{PathPolicy, ServerConfig};
use scim_provisioner::providers::StandardResourceProvider;
use scim_provisioner::resource::{Group, GroupCreateRequest, User, UserCreateRequest};
use scim_provisioner::storage::InMemoryStorage;
use serde_json::{Value, json};

pub type TestProvider = StandardResourceProvider<InMemoryStorage>;

pub const BASE_URL: &str = "https://scim.example.com";
pub const BASE_PATH: &str = "/scim/v2";

pub fn test_config() -> ServerConfig {
    ServerConfig::default()
        .with_base_url(BASE_URL)
        .with_base_path(BASE_PATH)
}

pub fn provider() -> TestProvider {
    StandardResourceProvider::with_config(InMemoryStorage::new(), test_config())
}

pub fn strict_provider() -> TestProvider {
    StandardResourceProvider::with_config(
        InMemoryStorage::new(),
        test_config().with_path_policy(PathPolicy::Reject),
    )
}

pub async fn create_user(provider: &TestProvider, user_name: &str) -> User {
    let request = UserCreateRequest {
        user_name: Some(user_name.to_string()),
        ..Default::default()
    };
    provider
        .create(request)
        .await
        .expect("user creation should succeed")
}

pub async fn create_group(provider: &TestProvider, display_name: &str) -> Group {
    let request = GroupCreateRequest {
        display_name: Some(display_name.to_string()),
        ..Default::default()
    };
    provider
        .create(request)
        .await
        .expect("group creation should succeed")
}

/// Minimal PATCH body with the given operations.
pub fn patch_body(operations: Value) -> Value {
    json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
        "Operations": operations
    })
}
