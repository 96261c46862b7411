//! Canonical CBOR encoding for checksum and signing input.
//!
//! RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats
//!
//! **FROZEN**: every registry bound to a checksum library depends on these
//! bytes. Changing field keys or order changes every content hash.

use std::collections::BTreeMap;

use ciborium::value::Value;

use crate::certificate::CertificatePayload;
use crate::crypto::PublicKey;
use crate::error::CoreError;
use crate::request::MintRequest;

/// Version tag written into every checksum input.
pub const CHECKSUM_INPUT_VERSION: u64 = 1;

/// Checksum input keys. Keys 0-23 encode as single bytes.
mod checksum_keys {
    pub const VERSION: u64 = 0;
    pub const RECIPIENT: u64 = 1;
    pub const COURSE_CODE: u64 = 2;
    pub const ISSUED_ON: u64 = 3;
    pub const ATTRIBUTES: u64 = 4;
}

/// Mint request keys (signing input).
mod request_keys {
    pub const RECIPIENT: u64 = 0;
    pub const COURSE_CODE: u64 = 1;
    pub const ISSUED_ON: u64 = 2;
    pub const ATTRIBUTES: u64 = 3;
    pub const METADATA_REF: u64 = 4;
}

/// The subset of CBOR the canonical encoder accepts.
///
/// Restricting the value space keeps encoding total: there is no input the
/// encoder has to reject.
#[derive(Debug, Clone)]
pub enum Canonical<'a> {
    Uint(u64),
    Bytes(&'a [u8]),
    Text(&'a str),
    Null,
    Map(Vec<(Canonical<'a>, Canonical<'a>)>),
}

/// Encode the checksum input for `(recipient, payload)`.
pub fn checksum_input_bytes(recipient: &PublicKey, payload: &CertificatePayload) -> Vec<u8> {
    use checksum_keys::*;

    let value = Canonical::Map(vec![
        (Canonical::Uint(VERSION), Canonical::Uint(CHECKSUM_INPUT_VERSION)),
        (Canonical::Uint(RECIPIENT), Canonical::Bytes(recipient.as_bytes())),
        (Canonical::Uint(COURSE_CODE), Canonical::Text(payload.course_code())),
        (Canonical::Uint(ISSUED_ON), Canonical::Text(payload.issued_on())),
        (Canonical::Uint(ATTRIBUTES), attributes_value(payload.attributes())),
    ]);
    encode(&value)
}

/// Encode a mint request to the bytes the issuer signs.
pub fn mint_request_bytes(request: &MintRequest) -> Vec<u8> {
    use request_keys::*;

    let metadata = match request.metadata_ref.as_deref() {
        Some(uri) => Canonical::Text(uri),
        None => Canonical::Null,
    };
    let value = Canonical::Map(vec![
        (Canonical::Uint(RECIPIENT), Canonical::Bytes(request.recipient.as_bytes())),
        (Canonical::Uint(COURSE_CODE), Canonical::Text(request.payload.course_code())),
        (Canonical::Uint(ISSUED_ON), Canonical::Text(request.payload.issued_on())),
        (Canonical::Uint(ATTRIBUTES), attributes_value(request.payload.attributes())),
        (Canonical::Uint(METADATA_REF), metadata),
    ]);
    encode(&value)
}

/// Encode an attribute map on its own (storage format).
pub fn attributes_bytes(attributes: &BTreeMap<String, String>) -> Vec<u8> {
    encode(&attributes_value(attributes))
}

/// Decode an attribute map previously written by [`attributes_bytes`].
pub fn decode_attributes(bytes: &[u8]) -> Result<BTreeMap<String, String>, CoreError> {
    let value: Value =
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))?;

    let entries = match value {
        Value::Map(entries) => entries,
        _ => return Err(CoreError::DecodingError("attributes: expected map".into())),
    };

    let mut attributes = BTreeMap::new();
    for (k, v) in entries {
        match (k, v) {
            (Value::Text(k), Value::Text(v)) => {
                attributes.insert(k, v);
            }
            _ => {
                return Err(CoreError::DecodingError(
                    "attributes: expected text keys and values".into(),
                ))
            }
        }
    }
    Ok(attributes)
}

fn attributes_value(attributes: &BTreeMap<String, String>) -> Canonical<'_> {
    Canonical::Map(
        attributes
            .iter()
            .map(|(k, v)| (Canonical::Text(k), Canonical::Text(v)))
            .collect(),
    )
}

/// Encode a value to canonical bytes.
pub fn encode(value: &Canonical<'_>) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value);
    buf
}

fn encode_value_to(buf: &mut Vec<u8>, value: &Canonical<'_>) {
    match value {
        Canonical::Uint(n) => encode_head(buf, 0, *n),
        Canonical::Bytes(b) => {
            encode_head(buf, 2, b.len() as u64);
            buf.extend_from_slice(b);
        }
        Canonical::Text(s) => {
            encode_head(buf, 3, s.len() as u64);
            buf.extend_from_slice(s.as_bytes());
        }
        Canonical::Null => buf.push(0xf6),
        Canonical::Map(entries) => encode_map(buf, entries),
    }
}

/// Write a major type and argument using the shortest form.
fn encode_head(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | n as u8);
    } else if n <= u8::MAX as u64 {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= u16::MAX as u64 {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= u32::MAX as u64 {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Maps are written with keys sorted by their encoded bytes.
fn encode_map(buf: &mut Vec<u8>, entries: &[(Canonical<'_>, Canonical<'_>)]) {
    let mut encoded: Vec<(Vec<u8>, &Canonical<'_>)> = entries
        .iter()
        .map(|(k, v)| (encode(k), v))
        .collect();
    encoded.sort_by(|a, b| a.0.cmp(&b.0));

    encode_head(buf, 5, encoded.len() as u64);
    for (key, value) in encoded {
        buf.extend_from_slice(&key);
        encode_value_to(buf, value);
    }
}
