//! The SCIM User resource (RFC 7643 §4.1).

use crate::error::{AttributeError, ScimError, ScimResult};
use crate::patch::path::{FALSE_LITERAL, FilterKey, TRUE_LITERAL};
use crate::resource::multi_valued::{
    ItemList, MultiValuedItem, bool_literal, deserialize_flag, deserialize_flag_literal,
    flag_literal, flag_value, string_value, typed_value,
};
use crate::resource::{Meta, ResourceAttribute, ScimResource};
use crate::schema::USER_SCHEMA;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

/// A provisioned user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub schemas: Vec<String>,
    pub id: String,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<Email>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<Address>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_numbers: Option<Vec<PhoneNumber>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
    pub meta: Meta,
}

/// Body of `POST /Users`.
///
/// `id`, `meta` and `schemas` in the body are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateRequest {
    pub user_name: Option<String>,
    pub display_name: Option<String>,
    pub external_id: Option<String>,
    pub nick_name: Option<String>,
    pub profile_url: Option<String>,
    pub title: Option<String>,
    pub user_type: Option<String>,
    pub preferred_language: Option<String>,
    pub locale: Option<String>,
    pub timezone: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub active: Option<bool>,
    pub name: Option<Name>,
    pub emails: Option<Vec<Email>>,
    pub addresses: Option<Vec<Address>>,
    pub phone_numbers: Option<Vec<PhoneNumber>>,
    pub roles: Option<Vec<Role>>,
    pub groups: Option<Vec<String>>,
}

/// Components of a user's name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Email {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub email_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub primary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub primary: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumber {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub phone_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub primary: Option<bool>,
}

/// A user role. `primary` is kept as the string `True` or `False`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Role {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub role_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_flag_literal",
        skip_serializing_if = "Option::is_none"
    )]
    pub primary: Option<String>,
}

impl MultiValuedItem for Email {
    const ATTRIBUTE: &'static str = "emails";

    fn filter_value(&self, key: FilterKey) -> Option<Cow<'_, str>> {
        match key {
            FilterKey::Type => self.email_type.as_deref().map(Cow::Borrowed),
            FilterKey::Primary => self.primary.map(|p| Cow::Borrowed(bool_literal(p))),
        }
    }

    fn set_sub_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        match name.to_ascii_lowercase().as_str() {
            "value" => self.value = string_value("value", value)?,
            "type" => self.email_type = string_value("type", value)?,
            "primary" => self.primary = flag_value("primary", value)?,
            "display" => self.display = string_value("display", value)?,
            _ => return Err(AttributeError::unknown_sub_attribute(Self::ATTRIBUTE, name)),
        }
        Ok(())
    }
}

impl MultiValuedItem for Address {
    const ATTRIBUTE: &'static str = "addresses";

    fn filter_value(&self, key: FilterKey) -> Option<Cow<'_, str>> {
        match key {
            FilterKey::Type => self.address_type.as_deref().map(Cow::Borrowed),
            FilterKey::Primary => self.primary.map(|p| Cow::Borrowed(bool_literal(p))),
        }
    }

    fn set_sub_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        match name.to_ascii_lowercase().as_str() {
            "type" => self.address_type = string_value("type", value)?,
            "formatted" => self.formatted = string_value("formatted", value)?,
            "streetaddress" => self.street_address = string_value("streetAddress", value)?,
            "locality" => self.locality = string_value("locality", value)?,
            "region" => self.region = string_value("region", value)?,
            "postalcode" => self.postal_code = string_value("postalCode", value)?,
            "country" => self.country = string_value("country", value)?,
            "primary" => self.primary = flag_value("primary", value)?,
            _ => return Err(AttributeError::unknown_sub_attribute(Self::ATTRIBUTE, name)),
        }
        Ok(())
    }
}

impl MultiValuedItem for PhoneNumber {
    const ATTRIBUTE: &'static str = "phoneNumbers";

    fn filter_value(&self, key: FilterKey) -> Option<Cow<'_, str>> {
        match key {
            FilterKey::Type => self.phone_type.as_deref().map(Cow::Borrowed),
            FilterKey::Primary => self.primary.map(|p| Cow::Borrowed(bool_literal(p))),
        }
    }

    fn set_sub_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        match name.to_ascii_lowercase().as_str() {
            "value" => self.value = string_value("value", value)?,
            "type" => self.phone_type = string_value("type", value)?,
            "primary" => self.primary = flag_value("primary", value)?,
            _ => return Err(AttributeError::unknown_sub_attribute(Self::ATTRIBUTE, name)),
        }
        Ok(())
    }
}

impl MultiValuedItem for Role {
    const ATTRIBUTE: &'static str = "roles";

    fn filter_value(&self, key: FilterKey) -> Option<Cow<'_, str>> {
        match key {
            FilterKey::Type => self.role_type.as_deref().map(Cow::Borrowed),
            FilterKey::Primary => self.primary.as_deref().map(Cow::Borrowed),
        }
    }

    fn set_sub_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        match name.to_ascii_lowercase().as_str() {
            "value" => self.value = string_value("value", value)?,
            "display" => self.display = string_value("display", value)?,
            "type" => self.role_type = string_value("type", value)?,
            "primary" => self.primary = flag_literal("primary", value)?,
            _ => return Err(AttributeError::unknown_sub_attribute(Self::ATTRIBUTE, name)),
        }
        Ok(())
    }
}

impl Role {
    /// Normalize `primary` to exactly `True` or `False`.
    pub fn normalize_primary(&mut self) {
        let primary = if self.primary.as_deref() == Some(TRUE_LITERAL) {
            TRUE_LITERAL
        } else {
            FALSE_LITERAL
        };
        self.primary = Some(primary.to_string());
    }
}

/// Writable User attributes.
///
/// `name.formatted`, `name.familyName` and `name.givenName` are addressable
/// on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAttribute {
    UserName,
    DisplayName,
    ExternalId,
    NickName,
    ProfileUrl,
    Title,
    UserType,
    PreferredLanguage,
    Locale,
    Timezone,
    Active,
    Name,
    NameFormatted,
    NameFamilyName,
    NameGivenName,
    Emails,
    Addresses,
    PhoneNumbers,
    Roles,
    Groups,
}

impl ResourceAttribute for UserAttribute {
    fn parse(name: &str) -> Option<Self> {
        let attribute = match name.to_ascii_lowercase().as_str() {
            "username" => Self::UserName,
            "displayname" => Self::DisplayName,
            "externalid" => Self::ExternalId,
            "nickname" => Self::NickName,
            "profileurl" => Self::ProfileUrl,
            "title" => Self::Title,
            "usertype" => Self::UserType,
            "preferredlanguage" => Self::PreferredLanguage,
            "locale" => Self::Locale,
            "timezone" => Self::Timezone,
            "active" => Self::Active,
            "name" => Self::Name,
            "name.formatted" => Self::NameFormatted,
            "name.familyname" => Self::NameFamilyName,
            "name.givenname" => Self::NameGivenName,
            "emails" => Self::Emails,
            "addresses" => Self::Addresses,
            "phonenumbers" => Self::PhoneNumbers,
            "roles" => Self::Roles,
            "groups" => Self::Groups,
            _ => return None,
        };
        Some(attribute)
    }

    fn name(&self) -> &'static str {
        match self {
            Self::UserName => "userName",
            Self::DisplayName => "displayName",
            Self::ExternalId => "externalId",
            Self::NickName => "nickName",
            Self::ProfileUrl => "profileUrl",
            Self::Title => "title",
            Self::UserType => "userType",
            Self::PreferredLanguage => "preferredLanguage",
            Self::Locale => "locale",
            Self::Timezone => "timezone",
            Self::Active => "active",
            Self::Name => "name",
            Self::NameFormatted => "name.formatted",
            Self::NameFamilyName => "name.familyName",
            Self::NameGivenName => "name.givenName",
            Self::Emails => "emails",
            Self::Addresses => "addresses",
            Self::PhoneNumbers => "phoneNumbers",
            Self::Roles => "roles",
            Self::Groups => "groups",
        }
    }
}

impl ScimResource for User {
    type Attribute = UserAttribute;
    type CreateRequest = UserCreateRequest;

    const RESOURCE_TYPE: &'static str = "User";
    const ENDPOINT: &'static str = "Users";
    const SCHEMA: &'static str = USER_SCHEMA;
    const UNIQUE_ATTRIBUTE: &'static str = "userName";
    const FILTERABLE: &'static [&'static str] = &["userName"];

    fn from_create(request: UserCreateRequest, id: String, meta: Meta) -> ScimResult<Self> {
        let user_name = request
            .user_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ScimError::invalid_request("Missing userName."))?;

        Ok(Self {
            schemas: vec![USER_SCHEMA.to_string()],
            id,
            user_name,
            display_name: request.display_name,
            external_id: request.external_id,
            nick_name: request.nick_name,
            profile_url: request.profile_url,
            title: request.title,
            user_type: request.user_type,
            preferred_language: request.preferred_language,
            locale: request.locale,
            timezone: request.timezone,
            active: request.active,
            name: request.name,
            emails: request.emails,
            addresses: request.addresses,
            phone_numbers: request.phone_numbers,
            roles: request.roles,
            groups: request.groups,
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
        &self.user_name
    }

    fn set_attribute(&mut self, attribute: UserAttribute, value: Value) -> Result<(), AttributeError> {
        let name = attribute.name();
        match attribute {
            UserAttribute::UserName => match value {
                Value::String(user_name) if !user_name.is_empty() => self.user_name = user_name,
                _ => return Err(AttributeError::unexpected_type(name, "a non-empty string")),
            },
            UserAttribute::DisplayName => self.display_name = string_value(name, value)?,
            UserAttribute::ExternalId => self.external_id = string_value(name, value)?,
            UserAttribute::NickName => self.nick_name = string_value(name, value)?,
            UserAttribute::ProfileUrl => self.profile_url = string_value(name, value)?,
            UserAttribute::Title => self.title = string_value(name, value)?,
            UserAttribute::UserType => self.user_type = string_value(name, value)?,
            UserAttribute::PreferredLanguage => {
                self.preferred_language = string_value(name, value)?
            }
            UserAttribute::Locale => self.locale = string_value(name, value)?,
            UserAttribute::Timezone => self.timezone = string_value(name, value)?,
            UserAttribute::Active => self.active = flag_value(name, value)?,
            UserAttribute::Name => self.name = typed_value(name, value)?,
            UserAttribute::NameFormatted => {
                let formatted = string_value(name, value)?;
                self.name.get_or_insert_with(Name::default).formatted = formatted;
            }
            UserAttribute::NameFamilyName => {
                let family_name = string_value(name, value)?;
                self.name.get_or_insert_with(Name::default).family_name = family_name;
            }
            UserAttribute::NameGivenName => {
                let given_name = string_value(name, value)?;
                self.name.get_or_insert_with(Name::default).given_name = given_name;
            }
            UserAttribute::Emails => self.emails = typed_value(name, value)?,
            UserAttribute::Addresses => self.addresses = typed_value(name, value)?,
            UserAttribute::PhoneNumbers => self.phone_numbers = typed_value(name, value)?,
            UserAttribute::Roles => self.roles = typed_value(name, value)?,
            UserAttribute::Groups => self.groups = typed_value(name, value)?,
        }
        Ok(())
    }

    fn items_mut(&mut self, attribute: UserAttribute) -> Option<&mut dyn ItemList> {
        match attribute {
            UserAttribute::Emails => Some(&mut self.emails),
            UserAttribute::Addresses => Some(&mut self.addresses),
            UserAttribute::PhoneNumbers => Some(&mut self.phone_numbers),
            UserAttribute::Roles => Some(&mut self.roles),
            _ => None,
        }
    }

    fn filter_value(&self, attribute: &str) -> Option<&str> {
        match attribute {
            "userName" => Some(&self.user_name),
            _ => None,
        }
    }

    fn project_for_list(&mut self, _filter_attribute: Option<&str>) {
        if let Some(roles) = self.roles.as_mut() {
            roles.iter_mut().for_each(Role::normalize_primary);
        }
    }
}
