//! Value filter matching over multi-valued attributes.

use crate::patch::path::ValueFilter;
use crate::resource::multi_valued::MultiValuedItem;

/// Index of the first item whose value for the filter key equals the filter
/// literal exactly.
pub fn find_index<T: MultiValuedItem>(items: &[T], filter: &ValueFilter) -> Option<usize> {
    items
        .iter()
        .position(|item| item.filter_value(filter.key).as_deref() == Some(filter.value.as_str()))
}
