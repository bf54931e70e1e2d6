pub mod hash;

pub use hash::{hash_blake3, hash_parts, merkle_root, Hash};
