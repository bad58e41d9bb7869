//! List filtering and pagination for `GET /Users` and `GET /Groups`.
//!
//! Only a single `attribute eq "value"` clause is understood, against a
//! per-type allow-list. Any other filter is ignored and the full set is
//! returned. Pagination is 1-based.

use crate::resource::ScimResource;
use crate::schema::LIST_RESPONSE_SCHEMA;
use serde::{Deserialize, Serialize};

/// Query parameters of a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: Option<String>,
    /// 1-based index of the first result. Values below 1 count as 1.
    pub start_index: i64,
    /// Maximum page size. `None` means up to the end of the matches.
    pub count: Option<i64>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filter: None,
            start_index: 1,
            count: None,
        }
    }
}

impl ListQuery {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_start_index(mut self, start_index: i64) -> Self {
        self.start_index = start_index;
        self
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }
}

/// A parsed `attribute eq "value"` list filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    /// Canonical attribute name from the allow-list.
    pub attribute: &'static str,
    /// Comparison value, lower-cased.
    pub value: String,
}

impl ListFilter {
    /// Parse a filter expression against the attributes in `allowed`.
    ///
    /// The attribute name and `eq` are matched case-insensitively. Returns
    /// `None` for anything else.
    pub fn parse(expression: &str, allowed: &[&'static str]) -> Option<Self> {
        let (name, rest) = expression.trim().split_once(char::is_whitespace)?;
        let attribute = allowed
            .iter()
            .copied()
            .find(|candidate| candidate.eq_ignore_ascii_case(name))?;

        let (operator, literal) = rest.trim_start().split_once(char::is_whitespace)?;
        if !operator.eq_ignore_ascii_case("eq") {
            return None;
        }

        let value = literal
            .trim_start()
            .strip_prefix('"')?
            .strip_suffix('"')?;
        if value.contains('"') {
            return None;
        }

        Some(Self {
            attribute,
            value: value.to_lowercase(),
        })
    }

    /// Whether the resource's attribute equals the filter value, ignoring case.
    pub fn matches<R: ScimResource>(&self, resource: &R) -> bool {
        resource
            .filter_value(self.attribute)
            .is_some_and(|value| value.to_lowercase() == self.value)
    }
}

/// A page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub total_results: usize,
    pub start_index: usize,
    pub items: Vec<T>,
}

/// Slice `items` into the page `[start_index - 1, start_index - 1 + count)`.
///
/// Slicing past the end yields an empty page. A negative `count` yields an
/// empty page.
pub fn paginate<T>(items: Vec<T>, start_index: i64, count: Option<i64>) -> Page<T> {
    let total_results = items.len();
    let start_index = usize::try_from(start_index.max(1)).unwrap_or(usize::MAX);
    let start = start_index - 1;
    let take = match count {
        Some(count) => usize::try_from(count.max(0)).unwrap_or(usize::MAX),
        None => usize::MAX,
    };

    Page {
        total_results,
        start_index,
        items: items.into_iter().skip(start).take(take).collect(),
    }
}

/// SCIM ListResponse envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub schemas: Vec<String>,
    pub total_results: usize,
    pub start_index: usize,
    pub items_per_page: usize,
    #[serde(rename = "Resources")]
    pub resources: Vec<T>,
}

impl<T> From<Page<T>> for ListResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            schemas: vec![LIST_RESPONSE_SCHEMA.to_string()],
            total_results: page.total_results,
            start_index: page.start_index,
            items_per_page: page.items.len(),
            resources: page.items,
        }
    }
}

/// Filter, paginate and project resources for a list response.
///
/// `resources` must be in the store's stable order.
pub fn list_resources<R: ScimResource>(resources: Vec<R>, query: &ListQuery) -> ListResponse<R> {
    let filter = query
        .filter
        .as_deref()
        .and_then(|expression| ListFilter::parse(expression, R::FILTERABLE));

    let matched: Vec<R> = match &filter {
        Some(filter) => resources.into_iter().filter(|r| filter.matches(r)).collect(),
        None => resources,
    };

    let mut page = paginate(matched, query.start_index, query.count);
    let filter_attribute = filter.as_ref().map(|filter| filter.attribute);
    for resource in &mut page.items {
        resource.project_for_list(filter_attribute);
    }

    page.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Group, GroupCreateRequest, GroupMember, Meta};
    use proptest::prelude::*;

    const GROUP_FILTERS: &[&str] = &["displayName", "id", "externalId"];

    fn group(id: &str, display_name: &str) -> Group {
        let mut group = Group::from_create(
            GroupCreateRequest {
                display_name: Some(display_name.to_string()),
                members: Some(vec![GroupMember::new("u1")]),
                ..GroupCreateRequest::default()
            },
            id.to_string(),
            Meta::new("Group", format!("http://localhost/Groups/{id}")),
        )
        .unwrap();
        group.external_id = Some(format!("ext-{id}"));
        group
    }

    fn groups() -> Vec<Group> {
        (1..=5)
            .map(|i| group(&i.to_string(), &format!("Group {i}")))
            .collect()
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            ListFilter::parse(r#"displayName eq "Admins""#, GROUP_FILTERS),
            Some(ListFilter {
                attribute: "displayName",
                value: "admins".to_string()
            })
        );
        assert_eq!(
            ListFilter::parse(r#"EXTERNALID Eq "E-1""#, GROUP_FILTERS).map(|f| f.attribute),
            Some("externalId")
        );
    }

    #[test]
    fn test_parse_filter_rejects_other_shapes() {
        assert_eq!(ListFilter::parse(r#"members eq "x""#, GROUP_FILTERS), None);
        assert_eq!(ListFilter::parse(r#"displayName co "x""#, GROUP_FILTERS), None);
        assert_eq!(ListFilter::parse(r#"displayName eq x"#, GROUP_FILTERS), None);
        assert_eq!(
            ListFilter::parse(r#"displayName eq "a" or id eq "b""#, GROUP_FILTERS),
            None
        );
        assert_eq!(ListFilter::parse("", GROUP_FILTERS), None);
    }

    #[test]
    fn test_pagination_window() {
        let page = paginate(vec![1, 2, 3, 4, 5], 2, Some(2));
        assert_eq!(page.items, vec![2, 3]);
        assert_eq!(page.total_results, 5);
        assert_eq!(page.start_index, 2);
    }

    #[test]
    fn test_pagination_edges() {
        assert_eq!(paginate(vec![1, 2, 3], 1, None).items, vec![1, 2, 3]);
        assert_eq!(paginate(vec![1, 2, 3], 3, None).items, vec![3]);
        assert!(paginate(vec![1, 2, 3], 9, Some(2)).items.is_empty());
        assert!(paginate(vec![1, 2, 3], 1, Some(0)).items.is_empty());
        assert!(paginate(vec![1, 2, 3], 1, Some(-1)).items.is_empty());

        let page = paginate(vec![1, 2, 3], 0, Some(2));
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.start_index, 1);
    }

    #[test]
    fn test_list_response_shape() {
        let response = list_resources(groups(), &ListQuery::default().with_start_index(2).with_count(2));
        assert_eq!(response.total_results, 5);
        assert_eq!(response.items_per_page, 2);
        assert_eq!(response.start_index, 2);
        let ids: Vec<_> = response.resources.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["schemas"][0], LIST_RESPONSE_SCHEMA);
        assert!(value.get("Resources").is_some());
        assert!(value.get("itemsPerPage").is_some());
    }

    #[test]
    fn test_display_name_filter_is_case_insensitive_and_drops_members() {
        let query = ListQuery::default().with_filter(r#"displayName eq "GROUP 3""#);
        let response = list_resources(groups(), &query);
        assert_eq!(response.total_results, 1);
        assert_eq!(response.resources[0].id, "3");
        assert!(response.resources[0].members.is_none());
    }

    #[test]
    fn test_id_filter_keeps_members() {
        let query = ListQuery::default().with_filter(r#"id eq "4""#);
        let response = list_resources(groups(), &query);
        assert_eq!(response.total_results, 1);
        assert!(response.resources[0].members.is_some());
    }

    #[test]
    fn test_unparseable_filter_returns_everything() {
        let query = ListQuery::default().with_filter("displayName sw \"Group\"");
        let response = list_resources(groups(), &query);
        assert_eq!(response.total_results, 5);
        assert_eq!(response.resources.len(), 5);
        assert!(response.resources.iter().all(|g| g.members.is_some()));
    }

    proptest! {
        #[test]
        fn prop_page_is_window_of_input(
            len in 0usize..40,
            start_index in -3i64..50,
            count in proptest::option::of(-2i64..50),
        ) {
            let items: Vec<usize> = (0..len).collect();
            let page = paginate(items.clone(), start_index, count);

            prop_assert_eq!(page.total_results, len);
            let start = (start_index.max(1) - 1) as usize;
            let expected: Vec<usize> = items
                .into_iter()
                .skip(start)
                .take(count.map(|c| c.max(0) as usize).unwrap_or(usize::MAX))
                .collect();
            prop_assert_eq!(page.items, expected);
        }

        #[test]
        fn prop_filter_value_is_lowercased(value in "[A-Za-z0-9 ._-]{0,20}") {
            let expression = format!("displayName eq \"{value}\"");
            let filter = ListFilter::parse(&expression, GROUP_FILTERS).unwrap();
            prop_assert_eq!(filter.value, value.to_lowercase());
        }
    }
}
