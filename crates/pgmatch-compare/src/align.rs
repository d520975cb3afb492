use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Objects from two result sets paired by identity key.
///
/// All three lists keep the order of the input they were drawn from.
#[derive(Debug)]
pub struct Alignment<'a, T> {
    pub matched: Vec<(&'a T, &'a T)>,
    pub source_only: Vec<&'a T>,
    pub target_only: Vec<&'a T>,
}

/// Pair `source` and `target` items whose `key` is equal.
pub fn align<'a, T, K, F>(source: &'a [T], target: &'a [T], key: F) -> Alignment<'a, T>
where
    K: Eq + Hash,
    F: Fn(&'a T) -> K,
{
    let target_by_key: HashMap<K, &'a T> = target.iter().map(|item| (key(item), item)).collect();
    let mut source_keys = HashSet::with_capacity(source.len());

    let mut matched = Vec::new();
    let mut source_only = Vec::new();
    for item in source {
        let item_key = key(item);
        match target_by_key.get(&item_key) {
            Some(other) => matched.push((item, *other)),
            None => source_only.push(item),
        }
        source_keys.insert(item_key);
    }

    let mut target_only = Vec::new();
    for item in target {
        if !source_keys.contains(&key(item)) {
            target_only.push(item);
        }
    }

    Alignment {
        matched,
        source_only,
        target_only,
    }
}
