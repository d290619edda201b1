//! Level-by-level reconciliation of keyed collections.
//!
//! Incoming partial trees are merged into stored ones one nesting level at a
//! time. Existing nodes keep their position, new nodes are appended in
//! incoming order, and siblings outside the incoming key set are never
//! touched. Merges run on owned values, so a failure leaves nothing half
//! applied: callers only save the returned collection.

use std::fmt::Display;

use serde_json::json;

use super::Error;

/// Overwrite the scalar attributes of `self` with those present on `incoming`.
///
/// Nested child collections are left alone; merging them is the job of the
/// child merge callback passed to [`merge_level`].
pub trait ScalarOverlay: Sized {
    fn overlay_scalars(&mut self, incoming: Self);

    /// Move the nested child collections into a new node, leaving them empty
    /// on `self`. Leaf nodes return a node with no children.
    fn detach_children(&mut self) -> Self;
}

/// What happens when an incoming node shares its key with an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Abort the whole merge with [`MergeError::DuplicateKey`].
    Reject,
    /// Merge the nested collections, then overlay scalars.
    MergeChildren,
    /// Overlay scalars only.
    ReplaceScalarsOnly,
}

/// Failures raised while reconciling collections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("duplicate key '{key}' in {collection}")]
    DuplicateKey {
        key: String,
        collection: &'static str,
        parent: Option<String>,
    },
    #[error("an entry in {collection} is missing its key")]
    MalformedInput { collection: &'static str },
    #[error("no entry with key '{key}' in {collection}")]
    NotFound {
        key: String,
        collection: &'static str,
    },
}

impl MergeError {
    /// Record the key of the parent node the failure happened under.
    #[must_use]
    pub fn within(self, parent_key: impl Into<String>) -> Self {
        match self {
            Self::DuplicateKey {
                key,
                collection,
                parent: None,
            } => Self::DuplicateKey {
                key,
                collection,
                parent: Some(parent_key.into()),
            },
            other => other,
        }
    }
}

impl From<MergeError> for Error {
    fn from(value: MergeError) -> Self {
        match &value {
            MergeError::DuplicateKey {
                key,
                collection,
                parent,
            } => Error::conflict(value.to_string()).with_details(json!({
                "code": "duplicate_key",
                "key": key,
                "collection": collection,
                "parent": parent,
            })),
            MergeError::MalformedInput { collection } => Error::invalid_request(value.to_string())
                .with_details(json!({ "collection": collection })),
            MergeError::NotFound { key, collection } => Error::not_found(value.to_string())
                .with_details(json!({ "key": key, "collection": collection })),
        }
    }
}

/// Child merge for leaf levels that carry no nested collections.
pub fn no_children<T>(_existing: &mut T, _incoming: &mut T) -> Result<(), MergeError> {
    Ok(())
}

/// Merge `incoming` into `existing` by key.
///
/// Keys are computed with `key_fn`; an incoming node without a key fails
/// with [`MergeError::MalformedInput`]. Existing nodes without a key are kept
/// but never match. Incoming duplicates are resolved against the partially
/// merged result, so the output never holds two nodes with the same key.
/// A node that matches nothing still has its children run through
/// `child_merge` against an empty collection, so repeated keys inside it are
/// rejected or folded exactly as they would be under an existing node.
///
/// # Examples
/// ```
/// use switchgear_pm::domain::merge::{ConflictPolicy, ScalarOverlay, merge_level, no_children};
///
/// #[derive(Debug, PartialEq)]
/// struct Node(u32, &'static str);
///
/// impl ScalarOverlay for Node {
///     fn overlay_scalars(&mut self, incoming: Self) {
///         self.1 = incoming.1;
///     }
///
///     fn detach_children(&mut self) -> Self {
///         Node(self.0, "")
///     }
/// }
///
/// let merged = merge_level(
///     vec![Node(1, "a"), Node(2, "b")],
///     vec![Node(2, "B"), Node(3, "c")],
///     "nodes",
///     |node: &Node| Some(node.0),
///     ConflictPolicy::ReplaceScalarsOnly,
///     no_children,
/// )
/// .expect("merge succeeds");
/// assert_eq!(merged, vec![Node(1, "a"), Node(2, "B"), Node(3, "c")]);
/// ```
pub fn merge_level<T, K, F, C>(
    existing: Vec<T>,
    incoming: Vec<T>,
    collection: &'static str,
    key_fn: F,
    policy: ConflictPolicy,
    mut child_merge: C,
) -> Result<Vec<T>, MergeError>
where
    T: ScalarOverlay,
    K: PartialEq + Display,
    F: Fn(&T) -> Option<K>,
    C: FnMut(&mut T, &mut T) -> Result<(), MergeError>,
{
    let mut merged = existing;
    for mut node in incoming {
        let key = key_fn(&node).ok_or(MergeError::MalformedInput { collection })?;
        let position = merged
            .iter()
            .position(|candidate| key_fn(candidate).as_ref() == Some(&key));
        let Some(position) = position else {
            let mut children = node.detach_children();
            child_merge(&mut node, &mut children)?;
            merged.push(node);
            continue;
        };
        let target = &mut merged[position];
        match policy {
            ConflictPolicy::Reject => {
                return Err(MergeError::DuplicateKey {
                    key: key.to_string(),
                    collection,
                    parent: None,
                });
            }
            ConflictPolicy::MergeChildren => {
                child_merge(target, &mut node)?;
                target.overlay_scalars(node);
            }
            ConflictPolicy::ReplaceScalarsOnly => target.overlay_scalars(node),
        }
    }
    Ok(merged)
}

/// Remove every node whose key equals `key`.
///
/// Fails with [`MergeError::NotFound`] when nothing matched.
pub fn remove_by_key<T, K, F>(
    sequence: Vec<T>,
    key: &K,
    collection: &'static str,
    key_fn: F,
) -> Result<Vec<T>, MergeError>
where
    K: PartialEq + Display + ?Sized,
    F: Fn(&T) -> Option<&K>,
{
    let before = sequence.len();
    let kept: Vec<T> = sequence
        .into_iter()
        .filter(|node| key_fn(node) != Some(key))
        .collect();
    if kept.len() == before {
        return Err(MergeError::NotFound {
            key: key.to_string(),
            collection,
        });
    }
    Ok(kept)
}
