//! Random data helpers.

use rand::RngCore;

/// Fill a buffer of the given length with random bytes.
pub fn random_vec(len: usize) -> Vec<u8> {
    let mut data = vec![0; len];
    rand::thread_rng().fill_bytes(&mut data);
    data
}
