use super::groups::Role;
use serde_json::{
    Map,
    Value,
};
use std::collections::HashSet;

/// The raw decoded body of one `/metrics/snapshot` response.
pub type Snapshot = Map<String, Value>;

/// Groups of `role` that are not in `keep`. An empty `keep` list drops
/// nothing.
pub fn dropped_groups<S: AsRef<str>>(role: Role, keep: &[S]) -> Vec<&'static str> {
    if keep.is_empty() {
        return Vec::new();
    }

    let keep: HashSet<&str> = keep.iter().map(AsRef::as_ref).collect();
    role.descriptor()
        .default_metrics()
        .filter(|group| !keep.contains(group))
        .collect()
}

/// Names in `keep` that are not groups of `role`.
pub fn unknown_groups<S: AsRef<str>>(role: Role, keep: &[S]) -> Vec<&str> {
    let descriptor = role.descriptor();
    keep.iter()
        .map(AsRef::as_ref)
        .filter(|name| descriptor.group(name).is_none())
        .collect()
}

/// Deletes every key of every dropped group from `snapshot`.
///
/// Keys that are not part of any known group are left alone. Returns the
/// number of keys removed.
pub fn filter_snapshot<S: AsRef<str>>(role: Role, keep: &[S], snapshot: &mut Snapshot) -> usize {
    let descriptor = role.descriptor();
    let mut removed = 0;

    for group in dropped_groups(role, keep) {
        for key in descriptor.group_members(group) {
            if snapshot.remove(*key).is_some() {
                removed += 1;
            }
        }
    }

    removed
}
