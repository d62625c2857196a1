//! Short random identifiers for ports, blocks, connections, and graphs.
//!
//! Mirrors the original `randomIdentifier` helper: a fixed alphabet of
//! alphanumeric characters, sampled uniformly, with no collision detection
//! beyond "astronomically unlikely at these lengths". Graphs use a longer
//! id than the objects nested inside them since graph ids are the ones
//! handed out externally (URLs, storage keys) and need a lower collision
//! probability across a much larger population.

use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Default id length for ports, hubs, blocks, and connections.
pub const DEFAULT_ID_LENGTH: usize = 8;

/// Id length used for graph-level identifiers.
pub const GRAPH_ID_LENGTH: usize = 32;

/// Generate a random alphanumeric identifier of the given length.
pub fn random_identifier(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Generate an identifier at [`DEFAULT_ID_LENGTH`].
pub fn short_id() -> String {
    random_identifier(DEFAULT_ID_LENGTH)
}

/// Generate an identifier at [`GRAPH_ID_LENGTH`].
pub fn graph_id() -> String {
    random_identifier(GRAPH_ID_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_has_default_length() {
        assert_eq!(short_id().len(), DEFAULT_ID_LENGTH);
    }

    #[test]
    fn graph_id_has_graph_length() {
        assert_eq!(graph_id().len(), GRAPH_ID_LENGTH);
    }

    #[test]
    fn ids_only_contain_alphanumerics() {
        let id = random_identifier(64);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn ids_are_not_trivially_repeated() {
        let a = short_id();
        let b = short_id();
        assert_ne!(a, b);
    }
}
