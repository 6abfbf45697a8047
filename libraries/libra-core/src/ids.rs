/// Opaque entity identifiers
use rand::{distributions::Alphanumeric, Rng};

/// Identifier length used when the configuration does not override it.
///
/// 62^11 possible values.
pub const DEFAULT_ID_LENGTH: usize = 11;

/// Generate a random id of `len` characters drawn from `[A-Za-z0-9]`
pub fn generate_id(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
