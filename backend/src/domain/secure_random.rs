//! Random opaque values drawn from the operating system RNG.

use rand::RngCore;
use rand::rngs::OsRng;

/// Hex-encode `N` bytes of OS randomness.
pub(crate) fn random_hex<const N: usize>() -> String {
    let mut bytes = [0_u8; N];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
