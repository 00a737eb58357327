//! UUID utilities
//!
//! Image identifiers are UUIDs. Path-derived identifiers use UUIDv5 in a
//! fixed namespace so the same canonical path yields the same identifier
//! in every process.

use uuid::Uuid;

/// Namespace for path-derived image identifiers
pub const IMAGE_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a4e_93b7_4d0a_8e55_1b7c_c0de_a1a6);

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Generate the UUIDv5 for a canonical path
pub fn from_path(canonical_path: &str) -> Uuid {
    Uuid::new_v5(&IMAGE_NAMESPACE, canonical_path.as_bytes())
}

/// Parse UUID from string
pub fn parse(s: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(s)
}
