//! Applies PATCH operations to typed resources.
//!
//! Dispatch is keyed by the operation kind and the shape of its path:
//!
//! | op      | path                    | effect                                         |
//! |---------|-------------------------|------------------------------------------------|
//! | any     | absent                  | merge the object `value` onto the resource     |
//! | add     | membership, array value | append members not yet present                 |
//! | remove  | membership, array value | drop members whose `value` is listed           |
//! | any     | simple                  | overwrite the attribute                        |
//! | remove  | indexed, match, bare    | delete the matched item                        |
//! | any     | indexed, match          | write the sub-attribute or the whole item      |
//! | add     | indexed, no match       | append a new item carrying the filter pair     |
//! | replace | indexed, no match       | nothing                                        |
//! | remove  | indexed, no match       | nothing                                        |
//!
//! A bare indexed `remove` has a match, no sub-attribute and no value, as in
//! `emails[type eq "work"]` without a value. It deletes the matched item
//! instead of behaving like `replace`. Every other `remove` shape is handled
//! the same as `replace`, so a `remove` that carries a value overwrites the
//! matched item or sub-attribute with it.

use crate::config::PathPolicy;
use crate::error::{AttributeError, ScimError, ScimResult};
use crate::patch::path::{PathTarget, ValueFilter, parse_path};
use crate::patch::{PatchOpKind, PatchOperation};
use crate::resource::{GroupMember, ItemList, ResourceAttribute, ScimResource};
use log::{debug, trace, warn};
use serde_json::Value;
use std::collections::HashSet;

/// Result of applying a batch of operations.
#[derive(Debug, Clone)]
pub struct PatchOutcome<R> {
    /// The resource after every operation ran.
    pub resource: R,
    /// Operations that changed the resource.
    pub applied: usize,
    /// Operations that were not understood or carried an unusable value.
    pub skipped: usize,
}

impl<R> PatchOutcome<R> {
    /// Whether the resource needs to be written back.
    pub fn is_modified(&self) -> bool {
        self.applied > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Applied,
    Unchanged,
    Skipped,
}

/// Applies PATCH operations in order. Each operation sees the effects of the
/// ones before it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchEngine {
    policy: PathPolicy,
}

impl PatchEngine {
    pub fn new(policy: PathPolicy) -> Self {
        Self { policy }
    }

    /// Apply `operations` to `resource`.
    ///
    /// Only fails under [`PathPolicy::Reject`], when a path is not
    /// understood. The caller has not written anything at that point, so the
    /// whole batch is discarded.
    pub fn apply<R: ScimResource>(
        &self,
        mut resource: R,
        operations: &[PatchOperation],
    ) -> ScimResult<PatchOutcome<R>> {
        let mut applied = 0;
        let mut skipped = 0;

        for (index, operation) in operations.iter().enumerate() {
            trace!(
                "PATCH {} {} operation {}: {:?}",
                R::RESOURCE_TYPE,
                resource.id(),
                index,
                operation
            );
            match self.apply_operation(&mut resource, operation)? {
                Step::Applied => applied += 1,
                Step::Unchanged => {}
                Step::Skipped => skipped += 1,
            }
        }

        debug!(
            "PATCH {} {}: {} applied, {} skipped, {} total",
            R::RESOURCE_TYPE,
            resource.id(),
            applied,
            skipped,
            operations.len()
        );

        Ok(PatchOutcome {
            resource,
            applied,
            skipped,
        })
    }

    fn apply_operation<R: ScimResource>(
        &self,
        resource: &mut R,
        operation: &PatchOperation,
    ) -> ScimResult<Step> {
        let Some(kind) = operation.kind() else {
            warn!("Skipping PATCH operation with unsupported op '{}'", operation.op);
            return Ok(Step::Skipped);
        };

        let value = operation.value.clone();
        let Some(path) = operation.path.as_deref() else {
            return Ok(merge(resource, value));
        };

        let Some(target) = parse_path(path) else {
            return self.unrecognized(path, "filter expression not understood");
        };
        let Some(attribute) = R::Attribute::parse(target.attribute()) else {
            return self.unrecognized(path, "unknown attribute");
        };

        match target {
            PathTarget::Simple(_) => Ok(apply_simple(resource, kind, attribute, value)),
            PathTarget::Indexed {
                filter,
                sub_attribute,
                ..
            } => {
                let Some(items) = resource.items_mut(attribute) else {
                    return self.unrecognized(path, "attribute is not multi-valued");
                };
                match apply_indexed(items, kind, &filter, sub_attribute.as_deref(), value) {
                    Ok(step) => Ok(step),
                    Err(AttributeError::UnknownSubAttribute { .. })
                        if self.policy == PathPolicy::Reject =>
                    {
                        Err(ScimError::invalid_path(path))
                    }
                    Err(error) => {
                        warn!("Skipping PATCH operation on '{}': {}", path, error);
                        Ok(Step::Skipped)
                    }
                }
            }
        }
    }

    fn unrecognized(&self, path: &str, reason: &str) -> ScimResult<Step> {
        match self.policy {
            PathPolicy::Ignore => {
                warn!("Skipping PATCH operation on '{}': {}", path, reason);
                Ok(Step::Skipped)
            }
            PathPolicy::Reject => {
                debug!("Rejecting PATCH path '{}': {}", path, reason);
                Err(ScimError::invalid_path(path))
            }
        }
    }
}

/// Merge an object onto the resource's top level. Unknown and read-only
/// keys are ignored.
fn merge<R: ScimResource>(resource: &mut R, value: Option<Value>) -> Step {
    let Some(Value::Object(fields)) = value else {
        warn!("Skipping PATCH operation without path: value is not an object");
        return Step::Skipped;
    };

    let mut written = 0;
    for (name, field) in fields {
        let Some(attribute) = R::Attribute::parse(&name) else {
            debug!("Ignoring attribute '{}' in {} PATCH merge", name, R::RESOURCE_TYPE);
            continue;
        };
        match resource.set_attribute(attribute, field) {
            Ok(()) => written += 1,
            Err(error) => warn!("Skipping attribute in PATCH merge: {}", error),
        }
    }

    if written > 0 {
        Step::Applied
    } else {
        Step::Skipped
    }
}

fn apply_simple<R: ScimResource>(
    resource: &mut R,
    kind: PatchOpKind,
    attribute: R::Attribute,
    value: Option<Value>,
) -> Step {
    if let (Some(Value::Array(items)), Some(members)) =
        (value.as_ref(), resource.members_mut(attribute))
    {
        match kind {
            PatchOpKind::Add => return add_members(members, items),
            PatchOpKind::Remove => return remove_members(members, items),
            PatchOpKind::Replace => {}
        }
    }

    match resource.set_attribute(attribute, value.unwrap_or(Value::Null)) {
        Ok(()) => {
            debug!("PATCH {:?} set {}", kind, attribute.name());
            Step::Applied
        }
        Err(error) => {
            warn!("Skipping PATCH operation on '{}': {}", attribute.name(), error);
            Step::Skipped
        }
    }
}

/// Append members whose `value` is not present yet. Items without a
/// `value` are ignored.
fn add_members(members: &mut Option<Vec<GroupMember>>, items: &[Value]) -> Step {
    let mut added = 0;

    for item in items {
        let member: GroupMember = match serde_json::from_value(item.clone()) {
            Ok(member) => member,
            Err(error) => {
                warn!("Skipping member in PATCH add: {}", error);
                continue;
            }
        };
        let Some(id) = member.value.as_deref() else {
            warn!("Skipping member without value in PATCH add");
            continue;
        };

        let present = members
            .as_ref()
            .is_some_and(|list| list.iter().any(|m| m.value.as_deref() == Some(id)));
        if present {
            debug!("Member {} already present", id);
            continue;
        }

        members.get_or_insert_with(Vec::new).push(member);
        added += 1;
    }

    if added > 0 {
        Step::Applied
    } else {
        Step::Unchanged
    }
}

/// Drop members whose `value` appears in `items`.
fn remove_members(members: &mut Option<Vec<GroupMember>>, items: &[Value]) -> Step {
    let removal: HashSet<&str> = items
        .iter()
        .filter_map(|item| item.get("value").and_then(Value::as_str))
        .collect();

    let Some(list) = members.as_mut() else {
        return Step::Unchanged;
    };

    let before = list.len();
    list.retain(|member| {
        !member
            .value
            .as_deref()
            .is_some_and(|value| removal.contains(value))
    });

    if list.len() != before {
        Step::Applied
    } else {
        Step::Unchanged
    }
}

fn apply_indexed(
    items: &mut dyn ItemList,
    kind: PatchOpKind,
    filter: &ValueFilter,
    sub_attribute: Option<&str>,
    value: Option<Value>,
) -> Result<Step, AttributeError> {
    match (kind, items.find(filter)) {
        (PatchOpKind::Add, None) => {
            items.push_matching(filter, sub_attribute, value.unwrap_or(Value::Null))?;
            debug!("PATCH add appended item [{}]", filter);
            Ok(Step::Applied)
        }
        (_, None) => {
            debug!("PATCH {:?} found no item matching [{}]", kind, filter);
            Ok(Step::Unchanged)
        }
        (PatchOpKind::Remove, Some(index)) if sub_attribute.is_none() && value.is_none() => {
            items.remove_item(index);
            debug!("PATCH remove dropped item [{}]", filter);
            Ok(Step::Applied)
        }
        (_, Some(index)) => {
            let value = value.unwrap_or(Value::Null);
            match sub_attribute {
                Some(sub_attribute) => items.set_item_attribute(index, sub_attribute, value)?,
                None => items.replace_item(index, value)?,
            }
            debug!("PATCH {:?} updated item [{}]", kind, filter);
            Ok(Step::Applied)
        }
    }
}
