//! The encrypted payload the gateway appends to the customer's return redirect.
//!
//! The payload is `<iv>:<ciphertext>`, both standard base64. The plaintext is a JSON object, encrypted with AES-256-CBC
//! under the first 32 bytes of the shared API key and PKCS#7 padded. Browsers and the gateway's own templating mangle
//! the payload on the way through: `+` turns into a space, `/` may be escaped as `\/`, and the whole value is sometimes
//! quoted. [`EnvelopeCodec::decode`] undoes all of that.
use aes::Aes256;
use base64::{engine::general_purpose::STANDARD, Engine};
use cbc::cipher::{
    block_padding::{NoPadding, Pkcs7},
    BlockDecryptMut,
    BlockEncryptMut,
    KeyIvInit,
};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use ztg_common::Secret;

use crate::db_types::OrderNo;

type Aes256CbcDec = cbc::Decryptor<Aes256>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;

pub const KEY_LENGTH: usize = 32;
pub const BLOCK_SIZE: usize = 16;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("The payload is not of the form <iv>:<ciphertext>")]
    InvalidEnvelopeFormat,
    #[error("The shared key must be at least {KEY_LENGTH} bytes long")]
    InvalidKey,
    #[error("Could not decode base64 data: {0}")]
    Base64DecodeError(String),
    #[error("The IV must be {BLOCK_SIZE} bytes, not {0}")]
    InvalidIvLength(usize),
    #[error("The ciphertext length ({0}) is not a positive multiple of {BLOCK_SIZE}")]
    InvalidCiphertextLength(usize),
    #[error("The plaintext padding is invalid")]
    InvalidPadding,
    #[error("The plaintext is not a valid payment record: {0}")]
    PlaintextNotStructured(String),
}

/// How PKCS#7 padding is removed after decryption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaddingMode {
    /// Strip `p` bytes when the final byte `p` is in `1..=16`, otherwise keep the plaintext as is. This is what the
    /// gateway's reference integration does.
    #[default]
    Lenient,
    /// Require well-formed PKCS#7 padding and fail with [`EnvelopeError::InvalidPadding`] otherwise.
    Strict,
}

/// The decoded callback record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEnvelope {
    pub transaction_id: String,
    pub order_no: OrderNo,
    pub status_code: String,
    pub status_message: String,
    pub transaction_date: String,
    pub bank_code: String,
    pub bank_name: String,
    pub message_token: String,
}

impl PaymentEnvelope {
    pub fn from_json(text: &str) -> Result<Self, EnvelopeError> {
        let text = text.trim_end_matches('\0').trim();
        let fields = serde_json::from_str::<Map<String, Value>>(text)
            .map_err(|e| EnvelopeError::PlaintextNotStructured(e.to_string()))?;
        let field = |name: &str| -> String {
            match fields.get(name) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::Bool(b)) => b.to_string(),
                _ => String::default(),
            }
        };
        let required = |name: &str| -> Result<String, EnvelopeError> {
            let v = field(name);
            if v.trim().is_empty() {
                Err(EnvelopeError::PlaintextNotStructured(format!("missing {name}")))
            } else {
                Ok(v.trim().to_string())
            }
        };
        Ok(Self {
            order_no: OrderNo(required("order_no")?),
            status_code: required("status_transaksi")?,
            transaction_id: field("id_transaksi"),
            status_message: field("status_message"),
            transaction_date: field("tarikh_transaksi"),
            bank_code: field("kod_bank"),
            bank_name: field("nama_bank"),
            message_token: field("jp_msg_token"),
        })
    }
}

/// Decrypts (and, for test fixtures and tooling, encrypts) gateway envelopes. Stateless apart from its configuration.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeCodec {
    key: Secret<String>,
    padding: PaddingMode,
}

impl EnvelopeCodec {
    pub fn new(key: Secret<String>) -> Self {
        Self { key, padding: PaddingMode::Lenient }
    }

    pub fn with_padding_mode(mut self, padding: PaddingMode) -> Self {
        self.padding = padding;
        self
    }

    pub fn padding_mode(&self) -> PaddingMode {
        self.padding
    }

    fn key_bytes(&self) -> Result<&[u8], EnvelopeError> {
        let key = self.key.as_bytes();
        if key.len() < KEY_LENGTH {
            return Err(EnvelopeError::InvalidKey);
        }
        Ok(&key[..KEY_LENGTH])
    }

    pub fn decode(&self, payload: &str) -> Result<PaymentEnvelope, EnvelopeError> {
        let plaintext = self.decrypt(payload)?;
        let text = String::from_utf8(plaintext).map_err(|e| EnvelopeError::PlaintextNotStructured(e.to_string()))?;
        PaymentEnvelope::from_json(&text)
    }

    /// Decrypts the payload and removes the padding according to the configured [`PaddingMode`].
    pub fn decrypt(&self, payload: &str) -> Result<Vec<u8>, EnvelopeError> {
        let (iv, ciphertext) = split_payload(payload)?;
        let iv = decode_base64(&iv)?;
        let mut buf = decode_base64(&ciphertext)?;
        let key = self.key_bytes()?;
        if iv.len() != BLOCK_SIZE {
            return Err(EnvelopeError::InvalidIvLength(iv.len()));
        }
        let len = buf.len();
        if len == 0 || len % BLOCK_SIZE != 0 {
            return Err(EnvelopeError::InvalidCiphertextLength(len));
        }
        let decryptor = Aes256CbcDec::new_from_slices(key, &iv).map_err(|_| EnvelopeError::InvalidKey)?;
        let plain_len = decryptor
            .decrypt_padded_mut::<NoPadding>(&mut buf)
            .map_err(|_| EnvelopeError::InvalidCiphertextLength(len))?
            .len();
        buf.truncate(plain_len);
        strip_padding(buf, self.padding)
    }

    /// Encrypts `plaintext` with PKCS#7 padding and returns it in the gateway's `<iv>:<ciphertext>` format.
    pub fn seal(&self, iv: &[u8; BLOCK_SIZE], plaintext: &[u8]) -> Result<String, EnvelopeError> {
        let key = self.key_bytes()?;
        let encryptor = Aes256CbcEnc::new_from_slices(key, iv).map_err(|_| EnvelopeError::InvalidKey)?;
        let msg_len = plaintext.len();
        let mut buf = vec![0u8; msg_len + BLOCK_SIZE];
        buf[..msg_len].copy_from_slice(plaintext);
        let ciphertext = encryptor
            .encrypt_padded_mut::<Pkcs7>(&mut buf, msg_len)
            .map_err(|_| EnvelopeError::InvalidCiphertextLength(msg_len))?;
        Ok(format!("{}:{}", STANDARD.encode(iv), STANDARD.encode(ciphertext)))
    }
}

fn trim_quotes(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '"' || c == '\'')
}

fn normalize(part: &str) -> String {
    trim_quotes(part).replace("\\/", "/").replace(' ', "+")
}

fn split_payload(payload: &str) -> Result<(String, String), EnvelopeError> {
    let payload = trim_quotes(payload);
    let (iv, ciphertext) = payload.split_once(':').ok_or(EnvelopeError::InvalidEnvelopeFormat)?;
    Ok((normalize(iv), normalize(ciphertext)))
}

fn decode_base64(s: &str) -> Result<Vec<u8>, EnvelopeError> {
    STANDARD.decode(s).map_err(|e| EnvelopeError::Base64DecodeError(e.to_string()))
}

fn strip_padding(mut buf: Vec<u8>, mode: PaddingMode) -> Result<Vec<u8>, EnvelopeError> {
    let len = buf.len();
    let p = buf.last().copied().unwrap_or(0) as usize;
    let in_range = p > 0 && p <= BLOCK_SIZE && p <= len;
    match mode {
        PaddingMode::Lenient => {
            if in_range {
                buf.truncate(len - p);
            }
            Ok(buf)
        },
        PaddingMode::Strict => {
            if !in_range || !buf[len - p..].iter().all(|b| *b as usize == p) {
                return Err(EnvelopeError::InvalidPadding);
            }
            buf.truncate(len - p);
            Ok(buf)
        },
    }
}
