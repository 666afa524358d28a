//! Identifier normalization
//!
//! Seeded records carry explicit slug identifiers, but a record inserted
//! without one gets a store-assigned ObjectId. String-keyed schemas accept
//! either and always expose a `String`.

use bson::Bson;
use serde::{Deserialize, Deserializer};

/// Render any BSON identifier as a string: strings pass through, numbers
/// use their decimal form and ObjectIds their hex form.
pub fn normalize(value: Bson) -> String {
    match value {
        Bson::String(s) => s,
        Bson::Int32(i) => i.to_string(),
        Bson::Int64(i) => i.to_string(),
        Bson::ObjectId(oid) => oid.to_hex(),
        other => other.to_string(),
    }
}

/// `deserialize_with` target for `_id` fields declared as `String`
pub fn string_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Bson::deserialize(deserializer).map(normalize)
}
