use ember_core::{hash_parts, merkle_root, Hash};

/// Compute state root from key-value pairs.
///
/// Keys are sorted first, so insertion order does not affect the root.
pub fn compute_state_root<'a, I>(entries: I) -> Hash
where
    I: IntoIterator<Item = (&'a [u8], &'a [u8])>,
{
    let mut sorted: Vec<_> = entries.into_iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let leaves: Vec<Hash> = sorted
        .iter()
        .map(|&(key, value)| hash_parts(&[key, value]))
        .collect();

    merkle_root(&leaves)
}
