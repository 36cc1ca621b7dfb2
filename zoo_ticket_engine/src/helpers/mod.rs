mod order_no;
mod payment_envelope;
mod status_codes;

pub use order_no::{new_order_no, ORDER_NO_LENGTH};
pub use payment_envelope::{EnvelopeCodec, EnvelopeError, PaddingMode, PaymentEnvelope, BLOCK_SIZE, KEY_LENGTH};
pub use status_codes::StatusCodeMap;
