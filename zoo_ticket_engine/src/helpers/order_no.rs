use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::db_types::OrderNo;

pub const ORDER_NO_LENGTH: usize = 16;
const ORDER_NO_ENTROPY_BYTES: usize = 12;

/// Generates a fresh order number: 12 bytes from the thread-local CSPRNG, base64url-encoded without padding, which is
/// exactly 16 URL-safe characters.
pub fn new_order_no() -> OrderNo {
    let bytes = rand::random::<[u8; ORDER_NO_ENTROPY_BYTES]>();
    let mut s = URL_SAFE_NO_PAD.encode(bytes);
    s.truncate(ORDER_NO_LENGTH);
    OrderNo(s)
}
