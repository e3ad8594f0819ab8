//! Selection of the work items a layout visualizes.

use crate::model::WorkItem;

fn same_type(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// True if `kind` is one of the hierarchy container types.
pub fn is_container_type<S: AsRef<str>>(kind: &str, container_types: &[S]) -> bool {
    container_types.iter().any(|c| same_type(kind, c.as_ref()))
}

/// Leaf items: everything whose type is not a container type. Input order is kept.
pub fn leaf_items<'a, S: AsRef<str>>(
    items: &'a [WorkItem],
    container_types: &[S],
) -> Vec<&'a WorkItem> {
    items
        .iter()
        .filter(|it| !is_container_type(&it.kind, container_types))
        .collect()
}

/// Items of the most specific type `focus_type`.
///
/// Falls back to the full list when no item has that type, so a board made only
/// of stories still renders instead of producing an empty treemap.
pub fn focus_items<'a>(items: &'a [WorkItem], focus_type: Option<&str>) -> Vec<&'a WorkItem> {
    let Some(focus) = focus_type else {
        return items.iter().collect();
    };
    let focused: Vec<&WorkItem> = items.iter().filter(|it| same_type(&it.kind, focus)).collect();
    if focused.is_empty() {
        items.iter().collect()
    } else {
        focused
    }
}
