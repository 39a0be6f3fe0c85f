//! SHA-1 based identifiers for collected items.

use sha1::{Digest, Sha1};

/// Compute the item uuid: hex SHA-1 of the parts joined with `:`
pub fn item_uuid(parts: &[&str]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(parts.join(":").as_bytes());
    hex::encode(hasher.finalize())
}
