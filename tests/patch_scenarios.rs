//! End-to-end PATCH and list behavior through the resource provider.

mod common;

use common::{create_group, create_user, provider, strict_provider};
use scim_provisioner::list::ListQuery;
use scim_provisioner::patch::{PatchOperation, PatchRequest};
use scim_provisioner::resource::{Email, Group, GroupMember, Role, User, UserCreateRequest};
use scim_provisioner::ScimError;
use serde_json::json;

fn request(operations: Vec<PatchOperation>) -> PatchRequest {
    PatchRequest::new(operations)
}

#[tokio::test]
async fn test_group_membership_lifecycle() {
    let provider = provider();
    let group = create_group(&provider, "G1").await;

    let add = request(vec![PatchOperation::add("members", json!([{"value": "m1"}]))]);
    provider.patch::<Group>(&group.id, add).await.unwrap();

    let fetched: Group = provider.get(&group.id).await.unwrap();
    assert_eq!(fetched.members, Some(vec![GroupMember::new("m1")]));

    let remove = request(vec![PatchOperation::remove(
        "members",
        Some(json!([{"value": "m1"}])),
    )]);
    provider.patch::<Group>(&group.id, remove).await.unwrap();

    let fetched: Group = provider.get(&group.id).await.unwrap();
    assert_eq!(fetched.members, Some(vec![]));
    assert_eq!(serde_json::to_value(&fetched).unwrap()["members"], json!([]));
}

#[tokio::test]
async fn test_membership_add_is_idempotent() {
    let provider = provider();
    let group = create_group(&provider, "Engineering").await;
    let add = || request(vec![PatchOperation::add("members", json!([{"value": "X"}]))]);

    provider.patch::<Group>(&group.id, add()).await.unwrap();
    let once: Group = provider.get(&group.id).await.unwrap();
    provider.patch::<Group>(&group.id, add()).await.unwrap();
    let twice: Group = provider.get(&group.id).await.unwrap();

    assert_eq!(twice.members, Some(vec![GroupMember::new("X")]));
    assert_eq!(once.meta.last_modified, twice.meta.last_modified);
}

#[tokio::test]
async fn test_member_fields_are_restricted() {
    let provider = provider();
    let group = create_group(&provider, "Ops").await;

    let add = request(vec![PatchOperation::add(
        "members",
        json!([{
            "value": "u1",
            "display": "Alice",
            "type": "User",
            "$ref": "https://scim.example.com/scim/v2/Users/u1",
            "unexpected": "dropped"
        }]),
    )]);
    let patched: Group = provider.patch(&group.id, add).await.unwrap();

    let member = &serde_json::to_value(&patched).unwrap()["members"][0];
    assert_eq!(
        member,
        &json!({
            "value": "u1",
            "display": "Alice",
            "type": "User",
            "$ref": "https://scim.example.com/scim/v2/Users/u1"
        })
    );
}

#[tokio::test]
async fn test_removing_non_member_changes_nothing() {
    let provider = provider();
    let group = create_group(&provider, "Sales").await;
    provider
        .patch::<Group>(
            &group.id,
            request(vec![PatchOperation::add("members", json!([{"value": "a"}]))]),
        )
        .await
        .unwrap();
    let before: Group = provider.get(&group.id).await.unwrap();

    let remove = request(vec![PatchOperation::remove(
        "members",
        Some(json!([{"value": "nobody"}])),
    )]);
    let after: Group = provider.patch(&group.id, remove).await.unwrap();

    assert_eq!(after, before);
}

#[tokio::test]
async fn test_replace_display_name_is_visible_on_fetch() {
    let provider = provider();
    let group = create_group(&provider, "Old").await;

    let replace = request(vec![PatchOperation::replace("displayName", json!("New"))]);
    provider.patch::<Group>(&group.id, replace).await.unwrap();

    let fetched: Group = provider.get(&group.id).await.unwrap();
    assert_eq!(fetched.display_name, "New");
}

#[tokio::test]
async fn test_duplicate_user_name_conflicts() {
    let provider = provider();
    create_user(&provider, "alice").await;

    let again = UserCreateRequest {
        user_name: Some("alice".to_string()),
        ..Default::default()
    };
    let err = provider.create::<User>(again).await.unwrap_err();

    assert!(matches!(err, ScimError::Uniqueness { .. }));
    assert_eq!(err.status_code(), 409);
    assert_eq!(err.scim_type(), Some("uniqueness"));
}

#[tokio::test]
async fn test_indexed_email_upsert() {
    let provider = provider();
    let user = create_user(&provider, "bob").await;
    let path = r#"emails[type eq "work"].value"#;

    let first: User = provider
        .patch(&user.id, request(vec![PatchOperation::add(path, json!("a@b.com"))]))
        .await
        .unwrap();
    assert_eq!(
        first.emails,
        Some(vec![Email {
            value: Some("a@b.com".to_string()),
            email_type: Some("work".to_string()),
            ..Default::default()
        }])
    );

    let second: User = provider
        .patch(&user.id, request(vec![PatchOperation::add(path, json!("c@d.com"))]))
        .await
        .unwrap();
    let emails = second.emails.unwrap();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].value.as_deref(), Some("c@d.com"));
}

#[tokio::test]
async fn test_indexed_replace_without_match_is_noop() {
    let provider = provider();
    let user = create_user(&provider, "carol").await;
    let before: User = provider.get(&user.id).await.unwrap();

    let replace = request(vec![PatchOperation::replace(
        r#"emails[type eq "home"].value"#,
        json!("x@y.com"),
    )]);
    let after: User = provider.patch(&user.id, replace).await.unwrap();

    assert_eq!(after.emails, None);
    assert_eq!(
        serde_json::to_value(&after).unwrap(),
        serde_json::to_value(&before).unwrap()
    );
}

#[tokio::test]
async fn test_primary_role_filter_uses_string_literal() {
    let provider = provider();
    let user = create_user(&provider, "dave").await;

    let add = request(vec![PatchOperation::add(
        r#"roles[primary eq "True"].value"#,
        json!("admin"),
    )]);
    let patched: User = provider.patch(&user.id, add).await.unwrap();

    assert_eq!(
        patched.roles,
        Some(vec![Role {
            value: Some("admin".to_string()),
            primary: Some("True".to_string()),
            ..Default::default()
        }])
    );

    // A lower-case literal addresses the same role.
    let replace = request(vec![PatchOperation::replace(
        r#"roles[primary eq "true"].display"#,
        json!("Administrator"),
    )]);
    let patched: User = provider.patch(&user.id, replace).await.unwrap();
    let roles = patched.roles.unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].display.as_deref(), Some("Administrator"));
}

#[tokio::test]
async fn test_operations_run_in_order_within_a_batch() {
    let provider = provider();
    let user = create_user(&provider, "erin").await;

    let batch = request(vec![
        PatchOperation::replace("displayName", json!("First")),
        PatchOperation::replace("displayName", json!("Second")),
        PatchOperation::add(r#"emails[type eq "work"].value"#, json!("e@x.com")),
        PatchOperation::replace(r#"emails[type eq "work"].primary"#, json!(true)),
    ]);
    let patched: User = provider.patch(&user.id, batch).await.unwrap();

    assert_eq!(patched.display_name.as_deref(), Some("Second"));
    let emails = patched.emails.unwrap();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].primary, Some(true));
}

#[tokio::test]
async fn test_pathless_remove_merges() {
    let provider = provider();
    let user = create_user(&provider, "frank").await;

    let remove = PatchOperation {
        op: "Remove".to_string(),
        path: None,
        value: Some(json!({"title": "Engineer", "active": false})),
    };
    let patched: User = provider.patch(&user.id, request(vec![remove])).await.unwrap();

    assert_eq!(patched.title.as_deref(), Some("Engineer"));
    assert_eq!(patched.active, Some(false));
}

#[tokio::test]
async fn test_unknown_op_and_path_are_skipped() {
    let provider = provider();
    let user = create_user(&provider, "grace").await;

    let batch = request(vec![
        PatchOperation {
            op: "move".to_string(),
            path: Some("displayName".to_string()),
            value: Some(json!("ignored")),
        },
        PatchOperation::replace(r#"emails[value co "x"].value"#, json!("ignored")),
        PatchOperation::replace("displayName", json!("Grace")),
    ]);
    let patched: User = provider.patch(&user.id, batch).await.unwrap();

    assert_eq!(patched.display_name.as_deref(), Some("Grace"));
    assert_eq!(patched.emails, None);
}

#[tokio::test]
async fn test_strict_policy_rejects_unknown_path() {
    let provider = strict_provider();
    let user = create_user(&provider, "heidi").await;

    let batch = request(vec![
        PatchOperation::replace("displayName", json!("Heidi")),
        PatchOperation::replace("favouriteColour", json!("green")),
    ]);
    let err = provider.patch::<User>(&user.id, batch).await.unwrap_err();
    assert_eq!(err.scim_type(), Some("invalidPath"));

    let fetched: User = provider.get(&user.id).await.unwrap();
    assert_eq!(fetched.display_name, None);
}

#[tokio::test]
async fn test_renaming_user_into_taken_name_conflicts() {
    let provider = provider();
    create_user(&provider, "ivan").await;
    let judy = create_user(&provider, "judy").await;

    let rename = request(vec![PatchOperation::replace("userName", json!("ivan"))]);
    let err = provider.patch::<User>(&judy.id, rename).await.unwrap_err();
    assert_eq!(err.status_code(), 409);

    let fetched: User = provider.get(&judy.id).await.unwrap();
    assert_eq!(fetched.user_name, "judy");
}

#[tokio::test]
async fn test_list_pagination_over_five_users() {
    let provider = provider();
    for name in ["u1", "u2", "u3", "u4", "u5"] {
        create_user(&provider, name).await;
    }

    let query = ListQuery::default().with_start_index(2).with_count(2);
    let page = provider.list::<User>(&query).await.unwrap();

    assert_eq!(page.total_results, 5);
    assert_eq!(page.items_per_page, 2);
    assert_eq!(page.start_index, 2);
    let names: Vec<_> = page.resources.iter().map(|u| u.user_name.as_str()).collect();
    assert_eq!(names, ["u2", "u3"]);
}

#[tokio::test]
async fn test_unparseable_filter_returns_everything() {
    let provider = provider();
    for name in ["a", "b", "c"] {
        create_user(&provider, name).await;
    }

    let query = ListQuery::default().with_filter("userName sw \"a\" and garbage");
    let page = provider.list::<User>(&query).await.unwrap();

    assert_eq!(page.total_results, 3);
    assert_eq!(page.items_per_page, 3);
}

#[tokio::test]
async fn test_filter_is_case_insensitive() {
    let provider = provider();
    create_user(&provider, "Alice@Example.com").await;
    create_user(&provider, "bob@example.com").await;

    let query = ListQuery::default().with_filter(r#"userName eq "alice@example.COM""#);
    let page = provider.list::<User>(&query).await.unwrap();

    assert_eq!(page.total_results, 1);
    assert_eq!(page.resources[0].user_name, "Alice@Example.com");
}

#[tokio::test]
async fn test_display_name_filter_omits_members() {
    let provider = provider();
    let group = create_group(&provider, "Admins").await;
    provider
        .patch::<Group>(
            &group.id,
            request(vec![PatchOperation::add("members", json!([{"value": "u1"}]))]),
        )
        .await
        .unwrap();

    let by_name = ListQuery::default().with_filter(r#"displayName eq "admins""#);
    let page = provider.list::<Group>(&by_name).await.unwrap();
    assert_eq!(page.total_results, 1);
    assert_eq!(page.resources[0].members, None);

    let by_id = ListQuery::default().with_filter(format!("id eq \"{}\"", group.id));
    let page = provider.list::<Group>(&by_id).await.unwrap();
    assert_eq!(page.total_results, 1);
    assert_eq!(page.resources[0].members, Some(vec![GroupMember::new("u1")]));
}

#[tokio::test]
async fn test_whole_roles_add_accepts_boolean_primary() {
    let provider = provider();
    let user = create_user(&provider, "kim").await;

    let add = request(vec![PatchOperation::add(
        "roles",
        json!([{"value": "admin", "primary": true}]),
    )]);
    let patched: User = provider.patch(&user.id, add).await.unwrap();

    assert_eq!(
        patched.roles,
        Some(vec![Role {
            value: Some("admin".to_string()),
            primary: Some("True".to_string()),
            ..Default::default()
        }])
    );

    let fetched: User = provider.get(&user.id).await.unwrap();
    assert_eq!(fetched.roles, patched.roles);
}

#[tokio::test]
async fn test_string_active_flag_is_accepted_everywhere() {
    let provider = provider();
    let request_body: UserCreateRequest =
        serde_json::from_value(json!({"userName": "lee", "active": "True"})).unwrap();
    let user: User = provider.create(request_body).await.unwrap();
    assert_eq!(user.active, Some(true));

    let merge = PatchOperation {
        op: "replace".to_string(),
        path: None,
        value: Some(json!({"active": "False"})),
    };
    let patched: User = provider.patch(&user.id, request(vec![merge])).await.unwrap();
    assert_eq!(patched.active, Some(false));
}
