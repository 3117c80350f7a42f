//! Secret key minting for freshly provisioned tenants.

use rand::Rng;

/// Number of random bytes behind a secret key (256 bits).
pub const SECRET_KEY_BYTES: usize = 32;

/// Mint a new secret key: 32 cryptographically random bytes, encoded
/// as 64 lowercase hex characters.
///
/// Minted exactly once per tenant; an existing key is never replaced
/// (session and identity stability depend on it).
pub fn mint_secret_key() -> String {
    let mut bytes = [0u8; SECRET_KEY_BYTES];
    rand::rng().fill(&mut bytes[..]);
    hex_encode(&bytes)
}

/// Encode bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// `true` when `value` has the shape of a minted secret key.
pub fn is_secret_key_shaped(value: &str) -> bool {
    value.len() == SECRET_KEY_BYTES * 2 && value.chars().all(|c| c.is_ascii_hexdigit())
}
