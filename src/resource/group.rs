//! The SCIM Group resource (RFC 7643 §4.2).

use crate::error::{AttributeError, ScimError, ScimResult};
use crate::patch::path::FilterKey;
use crate::resource::multi_valued::{ItemList, MultiValuedItem, string_value, typed_value};
use crate::resource::{Meta, ResourceAttribute, ScimResource};
use crate::schema::GROUP_SCHEMA;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

/// A provisioned group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub schemas: Vec<String>,
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<GroupMember>>,
    pub meta: Meta,
}

/// Body of `POST /Groups`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCreateRequest {
    pub display_name: Option<String>,
    pub external_id: Option<String>,
    pub members: Option<Vec<GroupMember>>,
}

/// A single group member.
///
/// `value` is the member's resource id and is what membership add and remove
/// compare on. Only these four fields are kept from client input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub member_type: Option<String>,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl GroupMember {
    /// Create a member referring to `value`.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }
}

impl MultiValuedItem for GroupMember {
    const ATTRIBUTE: &'static str = "members";

    fn filter_value(&self, key: FilterKey) -> Option<Cow<'_, str>> {
        match key {
            FilterKey::Type => self.member_type.as_deref().map(Cow::Borrowed),
            FilterKey::Primary => None,
        }
    }

    fn set_sub_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        match name.to_ascii_lowercase().as_str() {
            "value" => self.value = string_value("value", value)?,
            "display" => self.display = string_value("display", value)?,
            "type" => self.member_type = string_value("type", value)?,
            "$ref" => self.reference = string_value("$ref", value)?,
            _ => return Err(AttributeError::unknown_sub_attribute(Self::ATTRIBUTE, name)),
        }
        Ok(())
    }
}

/// Writable Group attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAttribute {
    DisplayName,
    ExternalId,
    Members,
}

impl ResourceAttribute for GroupAttribute {
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "displayname" => Some(Self::DisplayName),
            "externalid" => Some(Self::ExternalId),
            "members" => Some(Self::Members),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::DisplayName => "displayName",
            Self::ExternalId => "externalId",
            Self::Members => "members",
        }
    }
}

impl ScimResource for Group {
    type Attribute = GroupAttribute;
    type CreateRequest = GroupCreateRequest;

    const RESOURCE_TYPE: &'static str = "Group";
    const ENDPOINT: &'static str = "Groups";
    const SCHEMA: &'static str = GROUP_SCHEMA;
    const UNIQUE_ATTRIBUTE: &'static str = "displayName";
    const FILTERABLE: &'static [&'static str] = &["displayName", "id", "externalId"];

    fn from_create(request: GroupCreateRequest, id: String, meta: Meta) -> ScimResult<Self> {
        let display_name = request
            .display_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ScimError::invalid_value("Missing required attribute: displayName"))?;

        Ok(Self {
            schemas: vec![GROUP_SCHEMA.to_string()],
            id,
            display_name,
            external_id: request.external_id,
            members: request.members,
            meta,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn unique_value(&self) -> &str {
        &self.display_name
    }

    fn set_attribute(&mut self, attribute: GroupAttribute, value: Value) -> Result<(), AttributeError> {
        let name = attribute.name();
        match attribute {
            GroupAttribute::DisplayName => match value {
                Value::String(display_name) if !display_name.is_empty() => {
                    self.display_name = display_name
                }
                _ => return Err(AttributeError::unexpected_type(name, "a non-empty string")),
            },
            GroupAttribute::ExternalId => self.external_id = string_value(name, value)?,
            GroupAttribute::Members => self.members = typed_value(name, value)?,
        }
        Ok(())
    }

    fn items_mut(&mut self, attribute: GroupAttribute) -> Option<&mut dyn ItemList> {
        match attribute {
            GroupAttribute::Members => Some(&mut self.members),
            _ => None,
        }
    }

    fn members_mut(&mut self, attribute: GroupAttribute) -> Option<&mut Option<Vec<GroupMember>>> {
        match attribute {
            GroupAttribute::Members => Some(&mut self.members),
            _ => None,
        }
    }

    fn filter_value(&self, attribute: &str) -> Option<&str> {
        match attribute {
            "displayName" => Some(&self.display_name),
            "id" => Some(&self.id),
            "externalId" => self.external_id.as_deref(),
            _ => None,
        }
    }

    fn project_for_list(&mut self, filter_attribute: Option<&str>) {
        if filter_attribute == Some("displayName") {
            self.members = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn group() -> Group {
        Group::from_create(
            GroupCreateRequest {
                display_name: Some("Engineering".to_string()),
                ..GroupCreateRequest::default()
            },
            "g1".to_string(),
            Meta::new("Group", "http://localhost/Groups/g1"),
        )
        .unwrap()
    }

    #[test]
    fn test_from_create_requires_display_name() {
        let error = Group::from_create(
            GroupCreateRequest::default(),
            "g1".to_string(),
            Meta::new("Group", "http://localhost/Groups/g1"),
        )
        .unwrap_err();
        assert_eq!(error.to_string(), "Missing required attribute: displayName");
        assert_eq!(error.scim_type(), Some("invalidValue"));
    }

    #[test]
    fn test_member_keeps_only_known_fields() {
        let member: GroupMember = serde_json::from_value(json!({
            "value": "u1",
            "$ref": "http://localhost/Users/u1",
            "extra": "dropped"
        }))
        .unwrap();
        assert_eq!(member.reference.as_deref(), Some("http://localhost/Users/u1"));

        let value = serde_json::to_value(&member).unwrap();
        assert_eq!(value, json!({"value": "u1", "$ref": "http://localhost/Users/u1"}));
    }

    #[test]
    fn test_members_serialize_when_empty() {
        let mut group = group();
        assert!(serde_json::to_value(&group).unwrap().get("members").is_none());

        group.members = Some(Vec::new());
        assert_eq!(serde_json::to_value(&group).unwrap()["members"], json!([]));
    }

    #[test]
    fn test_filter_values() {
        let mut group = group();
        group.external_id = Some("ext-1".to_string());
        assert_eq!(group.filter_value("displayName"), Some("Engineering"));
        assert_eq!(group.filter_value("id"), Some("g1"));
        assert_eq!(group.filter_value("externalId"), Some("ext-1"));
        assert_eq!(group.filter_value("members"), None);
    }

    #[test]
    fn test_display_name_projection_drops_members() {
        let mut group = group();
        group.members = Some(vec![GroupMember::new("u1")]);

        let mut by_id = group.clone();
        by_id.project_for_list(Some("id"));
        assert!(by_id.members.is_some());

        group.project_for_list(Some("displayName"));
        assert!(group.members.is_none());
    }
}
