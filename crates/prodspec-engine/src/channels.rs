use serde_json::Value;
use std::collections::BTreeMap;

/// A state type made of named channels, each merged through its own
/// reducer. Steps receive a snapshot and return a partial update; the
/// driver never applies a raw whole-object assignment.
pub trait StateChannels: Clone + Send + Sync + 'static {
    /// Partial update: every channel mirrored as an optional field, so an
    /// absent channel is distinguishable from an empty one.
    type Update: Clone + Default + Send + Sync + 'static;

    /// Merge a partial update into this state, channel by channel.
    fn apply(self, update: Self::Update) -> Self;

    /// Compose two partial updates into one, with the same per-channel
    /// semantics as `apply`. Used when a sub-pipeline's walk must be
    /// reported to the parent graph as a single update.
    fn merge_updates(first: Self::Update, second: Self::Update) -> Self::Update;

    /// Build the update recorded when a step body fails: an error channel
    /// entry of the form `"<step> failed: <message>"` plus a metadata
    /// entry carrying the structured detail.
    fn failure_update(step: &str, message: &str, detail: Value) -> Self::Update;

    /// Record the step name on an update unless the step already set one.
    fn mark_step(update: &mut Self::Update, step: &str);
}

/// `next ?? current`: a later write wins, an absent write keeps the
/// current value. Idempotent for any repeated identical `next`.
pub fn replace_if_present<T>(current: T, next: Option<T>) -> T {
    next.unwrap_or(current)
}

/// Whole-list replacement: downstream steps regenerate the entire
/// collection, so a present `next` discards `current` wholesale.
pub fn replace_list<T>(current: Vec<T>, next: Option<Vec<T>>) -> Vec<T> {
    next.unwrap_or(current)
}

/// Append with deduplication, preserving first-seen order. Re-applying
/// the same partial is a no-op, which makes retries safe.
pub fn append_dedup<T: PartialEq>(mut current: Vec<T>, next: Option<Vec<T>>) -> Vec<T> {
    let Some(next) = next else {
        return current;
    };
    for item in next {
        if !current.contains(&item) {
            current.push(item);
        }
    }
    current
}

/// `{...current, ...next}`: later steps add keys without clobbering the
/// keys written by earlier ones.
pub fn shallow_merge<K: Ord, V>(
    mut current: BTreeMap<K, V>,
    next: Option<BTreeMap<K, V>>,
) -> BTreeMap<K, V> {
    let Some(next) = next else {
        return current;
    };
    for (key, value) in next {
        current.insert(key, value);
    }
    current
}

/// Shallow merge over two optional maps, used when composing updates.
pub fn merge_optional_maps<K: Ord, V>(
    first: Option<BTreeMap<K, V>>,
    second: Option<BTreeMap<K, V>>,
) -> Option<BTreeMap<K, V>> {
    match (first, second) {
        (None, None) => None,
        (Some(map), None) | (None, Some(map)) => Some(map),
        (Some(first), Some(second)) => Some(shallow_merge(first, Some(second))),
    }
}

/// Append-dedup over two optional lists, used when composing updates.
pub fn merge_optional_appends<T: PartialEq>(
    first: Option<Vec<T>>,
    second: Option<Vec<T>>,
) -> Option<Vec<T>> {
    match (first, second) {
        (None, None) => None,
        (Some(list), None) | (None, Some(list)) => Some(list),
        (Some(first), Some(second)) => Some(append_dedup(first, Some(second))),
    }
}
