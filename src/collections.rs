//! Small functional helpers over slices and maps
//!
//! Everything here is pure except `insert_if_absent`, which appends in place.

use std::collections::HashMap;
use std::hash::Hash;

use rand::Rng;

use crate::error::{Error, Result};

/// First element matching `pred`, scanning in order
pub fn find<T, P>(seq: &[T], mut pred: P) -> Option<&T>
where
    P: FnMut(&T) -> bool,
{
    seq.iter().find(|item| pred(item))
}

/// 1-based position of the first element matching `pred`
pub fn index_of<T, P>(seq: &[T], mut pred: P) -> Option<usize>
where
    P: FnMut(&T) -> bool,
{
    seq.iter().position(|item| pred(item)).map(|i| i + 1)
}

/// True if at least one element matches. Stops at the first match.
pub fn any<T, P>(seq: &[T], pred: P) -> bool
where
    P: FnMut(&T) -> bool,
{
    seq.iter().any(pred)
}

/// True if every element matches. Stops at the first failure.
pub fn all<T, P>(seq: &[T], pred: P) -> bool
where
    P: FnMut(&T) -> bool,
{
    seq.iter().all(pred)
}

pub fn contains<T: PartialEq>(seq: &[T], value: &T) -> bool {
    any(seq, |item| item == value)
}

/// Append `value` unless an equal element is already present
///
/// Returns whether the sequence grew.
pub fn insert_if_absent<T: PartialEq>(seq: &mut Vec<T>, value: T) -> bool {
    if contains(seq, &value) {
        return false;
    }
    seq.push(value);
    true
}

/// Matching elements, in their original relative order
pub fn filter<T, P>(seq: &[T], mut pred: P) -> Vec<T>
where
    T: Clone,
    P: FnMut(&T) -> bool,
{
    seq.iter().filter(|item| pred(item)).cloned().collect()
}

pub fn transform<T, U, F>(seq: &[T], f: F) -> Vec<U>
where
    F: FnMut(&T) -> U,
{
    seq.iter().map(f).collect()
}

/// Keys of a map, in no particular order
pub fn keys<K: Clone, V>(mapping: &HashMap<K, V>) -> Vec<K> {
    mapping.keys().cloned().collect()
}

/// Values of a map, in no particular order
///
/// This is a separate pass from `keys`; the two results are not index-aligned.
pub fn values<K, V: Clone>(mapping: &HashMap<K, V>) -> Vec<V> {
    mapping.values().cloned().collect()
}

/// Entries of `a` overridden by entries of `b`. Neither input is modified.
pub fn merge<K, V>(a: &HashMap<K, V>, b: &HashMap<K, V>) -> HashMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    let mut merged = a.clone();
    merged.extend(b.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

pub fn starts_with(haystack: &str, needle: &str) -> bool {
    haystack.starts_with(needle)
}

/// A value paired with its relative selection weight
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedItem<T> {
    pub value: T,
    pub weight: f64,
}

impl<T> WeightedItem<T> {
    pub fn new(value: T, weight: f64) -> Self {
        Self { value, weight }
    }
}

impl<T> From<(T, f64)> for WeightedItem<T> {
    fn from((value, weight): (T, f64)) -> Self {
        Self::new(value, weight)
    }
}

/// Pick one item with probability proportional to its weight, using the thread RNG
pub fn weighted_choice<T>(items: &[WeightedItem<T>]) -> Result<&WeightedItem<T>> {
    weighted_choice_with(&mut rand::thread_rng(), items)
}

/// Pick one item with probability proportional to its weight
///
/// Draws `r` from `[0, total)` and returns the first item whose cumulative
/// window `[c, c + weight)` contains it. Zero-weight items are never picked.
pub fn weighted_choice_with<'a, T, R>(
    rng: &mut R,
    items: &'a [WeightedItem<T>],
) -> Result<&'a WeightedItem<T>>
where
    R: Rng,
{
    let mut total = 0.0;
    for (index, item) in items.iter().enumerate() {
        if !item.weight.is_finite() || item.weight < 0.0 {
            return Err(Error::InvalidWeight {
                index,
                weight: item.weight,
            });
        }
        total += item.weight;
    }

    if total <= 0.0 {
        return Err(Error::NoPositiveWeight);
    }
    if !total.is_finite() {
        return Err(Error::WeightOverflow);
    }

    let r = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for item in items {
        if r < cumulative + item.weight {
            return Ok(item);
        }
        cumulative += item.weight;
    }

    // Rounding can leave r just past the final window
    items
        .iter()
        .rev()
        .find(|item| item.weight > 0.0)
        .ok_or(Error::NoPositiveWeight)
}
