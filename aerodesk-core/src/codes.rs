use rand::Rng;
use uuid::Uuid;

use crate::{CoreError, CoreResult};

pub const RESERVATION_CODE_LEN: usize = 8;

/// Upper bound on random draws before giving up with a `Conflict`. Collisions
/// are negligible at 36^8 codes, but the allocation loop must still terminate.
pub const MAX_CODE_ATTEMPTS: usize = 10;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draw a single candidate reservation code (8 uppercase alphanumerics).
pub fn random_reservation_code() -> String {
    let mut rng = rand::thread_rng();
    (0..RESERVATION_CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Allocate a reservation code that `is_taken` does not know about yet.
///
/// The uniqueness check must run against the same persisted set the insert
/// will hit; callers inside a database transaction pass a closure over that
/// transaction's view.
pub fn generate_reservation_code<F>(mut is_taken: F) -> CoreResult<String>
where
    F: FnMut(&str) -> bool,
{
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = random_reservation_code();
        if !is_taken(&code) {
            return Ok(code);
        }
    }
    Err(CoreError::conflict(
        "could not allocate a unique reservation code, please retry",
    ))
}

/// Opaque ticket barcode. UUID-formatted per the e-ticket contract.
pub fn generate_barcode() -> String {
    Uuid::new_v4().to_string()
}
