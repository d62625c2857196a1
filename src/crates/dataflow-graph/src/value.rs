//! The opaque value type carried by ports.
//!
//! Port values are deliberately untyped outside of whatever a block's own
//! logic expects of them (see the Non-goals in the crate's top-level docs).
//! `serde_json::Value` gives us a value that is already `Serialize` +
//! `Deserialize`, which the serialization module needs, without inventing a
//! bespoke dynamic-typing layer.

/// The value type stored in a [`crate::cell::ValueCell`].
pub type Value = serde_json::Value;
