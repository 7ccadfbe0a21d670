use rand::Rng;

use crate::db_types::OrderCode;

const ORDER_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ORDER_CODE_LEN: usize = 10;

/// Generates a fresh order code: 10 uppercase alphanumeric characters, ~52 bits of entropy, which is
/// collision-resistant within any plausible active order population. Uniqueness is additionally enforced by the
/// unique index on the order-code column.
pub fn new_order_code() -> OrderCode {
    let mut rng = rand::thread_rng();
    let code = (0..ORDER_CODE_LEN)
        .map(|_| ORDER_CODE_ALPHABET[rng.gen_range(0..ORDER_CODE_ALPHABET.len())] as char)
        .collect::<String>();
    OrderCode(code)
}
