//! Property tests for PATCH behavior observed through the resource provider.

mod common;

use common::{create_group, create_user, provider};
use proptest::prelude::*;
use scim_provisioner::patch::{PatchOperation, PatchRequest};
use scim_provisioner::resource::{Group, User};
use serde_json::{Value, json};
use std::future::Future;

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn member_values(ids: &[String]) -> Value {
    Value::Array(ids.iter().map(|id| json!({"value": id})).collect())
}

/// Paths into a multi-valued attribute whose filter can never match a fresh user.
fn unmatched_indexed_path() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["emails", "phoneNumbers", "addresses", "roles"]),
        "[a-z]{1,10}",
        proptest::option::of(prop::sample::select(vec!["value", "display"])),
    )
        .prop_map(|(attribute, filter_value, sub)| match sub {
            Some(sub) => format!("{attribute}[type eq \"{filter_value}\"].{sub}"),
            None => format!("{attribute}[type eq \"{filter_value}\"]"),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_replaced_display_name_is_returned_by_get(display_name in "\\PC{0,32}") {
        let fetched = block_on(async {
            let provider = provider();
            let user = create_user(&provider, "alice").await;
            let request = PatchRequest::new(vec![PatchOperation::replace(
                "displayName",
                json!(display_name.clone()),
            )]);
            provider.patch::<User>(&user.id, request).await.unwrap();
            provider.get::<User>(&user.id).await.unwrap()
        });

        prop_assert_eq!(fetched.display_name, Some(display_name));
    }

    #[test]
    fn prop_members_add_twice_matches_add_once(
        ids in prop::collection::vec("[a-z0-9]{1,8}", 0..8),
    ) {
        let (once, twice) = block_on(async {
            let provider = provider();
            let group = create_group(&provider, "Engineering").await;
            let add = || PatchRequest::new(vec![PatchOperation::add("members", member_values(&ids))]);

            provider.patch::<Group>(&group.id, add()).await.unwrap();
            let once: Group = provider.get(&group.id).await.unwrap();
            provider.patch::<Group>(&group.id, add()).await.unwrap();
            let twice: Group = provider.get(&group.id).await.unwrap();
            (once, twice)
        });

        let mut distinct: Vec<&str> = Vec::new();
        for id in &ids {
            if !distinct.contains(&id.as_str()) {
                distinct.push(id);
            }
        }
        let stored: Vec<&str> = twice
            .members
            .iter()
            .flatten()
            .filter_map(|member| member.value.as_deref())
            .collect();

        prop_assert_eq!(stored, distinct);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_indexed_replace_without_match_changes_nothing(
        path in unmatched_indexed_path(),
        value in "[a-z0-9@.]{0,16}",
    ) {
        let (before, after) = block_on(async {
            let provider = provider();
            let user = create_user(&provider, "alice").await;
            let before: User = provider.get(&user.id).await.unwrap();

            let request = PatchRequest::new(vec![PatchOperation::replace(&path, json!(value))]);
            provider.patch::<User>(&user.id, request).await.unwrap();
            let after: User = provider.get(&user.id).await.unwrap();
            (before, after)
        });

        prop_assert_eq!(before, after);
    }
}
