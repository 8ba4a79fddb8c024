//! State-change detection (§4.5): at the tail of every wrapped call, the
//! recorder re-queries the real implementation's current state and diffs it
//! against the shadow kept in the registry. A difference emits one of the
//! `*-state-changed` synthetic events.
//!
//! `altrace_record.c`'s `check_listener_state_floatv`/`check_context_state`
//! family used `memcmp` over the raw value, which is bit-exact rather than
//! `==`-exact for floats (two NaNs with different payloads compare unequal
//! under `==` but would also compare unequal here, since the shadow is
//! stored as the value's bit pattern — the distinguishing case `==` gets
//! wrong is `-0.0 == 0.0`, which `memcmp` reports as changed and this does
//! too).

use rustc_hash::FxHashMap;

/// Diffs a plain, bit-comparable value (bool, enum/int, uint) against the
/// shadow, updates the shadow, and returns `Some(new)` if it changed.
pub fn diff_scalar<K, V>(shadow: &mut FxHashMap<K, V>, key: K, new: V) -> Option<V>
where
    K: std::hash::Hash + Eq,
    V: Copy + PartialEq,
{
    match shadow.insert(key, new) {
        Some(prev) if prev == new => None,
        _ => Some(new),
    }
}

/// Diffs a float by its bit pattern rather than IEEE equality, matching the
/// original's `memcmp` semantics.
pub fn diff_f32<K>(shadow: &mut FxHashMap<K, u32>, key: K, new: f32) -> Option<f32>
where
    K: std::hash::Hash + Eq,
{
    let bits = new.to_bits();
    match shadow.insert(key, bits) {
        Some(prev) if prev == bits => None,
        _ => Some(new),
    }
}

/// Diffs a 3-component float vector (source position/velocity/direction) by
/// bit pattern.
pub fn diff_f32x3<K>(shadow: &mut FxHashMap<K, [u32; 3]>, key: K, new: [f32; 3]) -> Option<[f32; 3]>
where
    K: std::hash::Hash + Eq,
{
    let bits = [new[0].to_bits(), new[1].to_bits(), new[2].to_bits()];
    match shadow.insert(key, bits) {
        Some(prev) if prev == bits => None,
        _ => Some(new),
    }
}

/// Diffs an arbitrary-length float vector (listener orientation, a
/// 6-element sextuple).
pub fn diff_f32_vec<K>(shadow: &mut FxHashMap<K, Vec<u32>>, key: K, new: &[f32]) -> Option<Vec<f32>>
where
    K: std::hash::Hash + Eq,
{
    let bits: Vec<u32> = new.iter().map(|v| v.to_bits()).collect();
    let changed = match shadow.get(&key) {
        Some(prev) => prev != &bits,
        None => true,
    };
    shadow.insert(key, bits);
    if changed {
        Some(new.to_vec())
    } else {
        None
    }
}

/// Diffs an arbitrary-length vector of plain, bit-comparable values (e.g.
/// `alcGetIntegerv`'s output), by value rather than by bit pattern since
/// the values involved are already exact integers.
pub fn diff_vec<K, V>(shadow: &mut FxHashMap<K, Vec<V>>, key: K, new: &[V]) -> Option<Vec<V>>
where
    K: std::hash::Hash + Eq,
    V: PartialEq + Clone,
{
    let changed = match shadow.get(&key) {
        Some(prev) => prev.as_slice() != new,
        None => true,
    };
    shadow.insert(key, new.to_vec());
    if changed {
        Some(new.to_vec())
    } else {
        None
    }
}

/// Diffs an `Option<String>` (a string query that may return absent).
pub fn diff_string<K>(
    shadow: &mut FxHashMap<K, Option<String>>,
    key: K,
    new: Option<&str>,
) -> Option<Option<String>>
where
    K: std::hash::Hash + Eq,
{
    let new_owned = new.map(|s| s.to_string());
    let changed = shadow.get(&key) != Some(&new_owned);
    shadow.insert(key, new_owned.clone());
    if changed {
        Some(new_owned)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_diff_only_fires_on_change() {
        let mut shadow = FxHashMap::default();
        assert_eq!(diff_scalar(&mut shadow, 1i32, 5i32), Some(5));
        assert_eq!(diff_scalar(&mut shadow, 1i32, 5i32), None);
        assert_eq!(diff_scalar(&mut shadow, 1i32, 6i32), Some(6));
    }

    #[test]
    fn float_diff_distinguishes_signed_zero() {
        let mut shadow = FxHashMap::default();
        assert_eq!(diff_f32(&mut shadow, 1i32, 0.0f32), Some(0.0));
        assert_eq!(diff_f32(&mut shadow, 1i32, -0.0f32), Some(-0.0));
    }

    #[test]
    fn string_diff_distinguishes_absent_from_empty() {
        let mut shadow: FxHashMap<i32, Option<String>> = FxHashMap::default();
        assert_eq!(diff_string(&mut shadow, 1i32, None), Some(None));
        assert_eq!(
            diff_string(&mut shadow, 1i32, Some("")),
            Some(Some(String::new()))
        );
        assert_eq!(diff_string(&mut shadow, 1i32, Some("")), None);
    }
}
