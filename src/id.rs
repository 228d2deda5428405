//! Opaque identifier generation.
//!
//! Identifiers are unique with overwhelming probability for the lifetime
//! of the process (and well beyond); no ordering is guaranteed or implied.

use uuid::Uuid;

/// A fresh record identifier: hyphenated UUID v4.
pub fn next() -> String {
    Uuid::new_v4().to_string()
}

/// An 8-character URL-safe code, for short links. Collisions are
/// improbable but possible at this length; callers that persist codes
/// re-roll on a clash.
pub fn short_code() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex[..8].to_owned()
}
