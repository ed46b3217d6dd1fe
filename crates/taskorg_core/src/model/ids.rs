//! Identifier generation for entities submitted without a client id.

use uuid::Uuid;

/// Identifier shared by categories, groups and tasks.
///
/// Client-supplied ids are opaque strings, so no format is imposed.
pub type EntityId = String;

/// Returns a fresh 128-bit random identifier in lowercase hex (32 chars).
pub fn new_id() -> EntityId {
    Uuid::new_v4().simple().to_string()
}
