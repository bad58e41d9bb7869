//! Typed SCIM resources.
//!
//! [`User`] and [`Group`] are plain serde models. The [`ScimResource`] trait
//! exposes what the provider and the PATCH engine need from them: a finite
//! set of writable attribute names, typed attribute writes, access to
//! multi-valued attributes, and list projections.

pub mod group;
pub mod meta;
pub mod multi_valued;
pub mod user;

pub use group::{Group, GroupAttribute, GroupCreateRequest, GroupMember};
pub use meta::Meta;
pub use multi_valued::{ItemList, MultiValuedItem};
pub use user::{Address, Email, Name, PhoneNumber, Role, User, UserAttribute, UserCreateRequest};

use crate::error::{AttributeError, ScimResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;

/// The writable attributes of a resource type.
///
/// `id`, `meta` and `schemas` are never part of this set.
pub trait ResourceAttribute: Copy + Debug + Send + Sync {
    /// Resolve an attribute name, ignoring case.
    fn parse(name: &str) -> Option<Self>;

    /// Canonical attribute name.
    fn name(&self) -> &'static str;
}

/// A SCIM resource type managed by the provider.
pub trait ScimResource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Writable attribute names.
    type Attribute: ResourceAttribute;

    /// Body accepted on creation.
    type CreateRequest: DeserializeOwned + Send;

    /// `meta.resourceType`, e.g. `User`.
    const RESOURCE_TYPE: &'static str;

    /// Endpoint segment, e.g. `Users`.
    const ENDPOINT: &'static str;

    /// Core schema URN.
    const SCHEMA: &'static str;

    /// Attribute whose value must be unique among resources of this type.
    const UNIQUE_ATTRIBUTE: &'static str;

    /// Attributes a list filter may compare against.
    const FILTERABLE: &'static [&'static str];

    /// Build a new resource from a create request.
    ///
    /// Fails with a 400 error when a required attribute is missing.
    fn from_create(request: Self::CreateRequest, id: String, meta: Meta) -> ScimResult<Self>;

    fn id(&self) -> &str;

    fn meta(&self) -> &Meta;

    fn meta_mut(&mut self) -> &mut Meta;

    /// Current value of the unique attribute.
    fn unique_value(&self) -> &str;

    /// Overwrite one attribute. `null` clears optional attributes.
    fn set_attribute(&mut self, attribute: Self::Attribute, value: Value)
    -> Result<(), AttributeError>;

    /// The multi-valued attribute addressed by indexed paths, if `attribute` is one.
    fn items_mut(&mut self, attribute: Self::Attribute) -> Option<&mut dyn ItemList>;

    /// The membership list, if `attribute` is one.
    ///
    /// Membership attributes get set-like add and remove semantics.
    fn members_mut(&mut self, _attribute: Self::Attribute) -> Option<&mut Option<Vec<GroupMember>>> {
        None
    }

    /// Value a list filter compares for one of [`Self::FILTERABLE`].
    fn filter_value(&self, attribute: &str) -> Option<&str>;

    /// Shape the resource for a list response.
    ///
    /// `filter_attribute` is the attribute the list was filtered on, if any.
    fn project_for_list(&mut self, _filter_attribute: Option<&str>) {}
}
