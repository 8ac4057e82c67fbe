//! Canonical CBOR encoding for deterministic block hashing.
//!
//! This module implements RFC 8949 Core Deterministic Encoding, restricted to
//! the shapes a block needs:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - Floats always use the 8-byte form, `-0.0` is normalised to `0.0`,
//!   and non-finite values are rejected
//!
//! The same logical block content therefore always yields the same bytes,
//! and so the same digest, regardless of call site or platform.

use ciborium::value::Value;

use crate::error::CoreError;
use crate::transaction::Transaction;
use crate::types::BlockHash;

/// Block field keys (integer keys for compact encoding).
mod keys {
    pub const INDEX: u64 = 0;
    pub const TIMESTAMP: u64 = 1;
    pub const TRANSACTIONS: u64 = 2;
    pub const PREVIOUS_HASH: u64 = 3;
}

/// Transaction field keys.
mod tx_keys {
    pub const FROM: u64 = 0;
    pub const TO: u64 = 1;
    pub const AMOUNT: u64 = 2;
}

/// Encode the four hashed block fields to canonical CBOR bytes.
///
/// Format: `{0: index, 1: timestamp, 2: [tx...], 3: previous_hash}`
pub fn canonical_block_bytes(
    index: u64,
    timestamp: i64,
    transactions: &[Transaction],
    previous_hash: &BlockHash,
) -> Result<Vec<u8>, CoreError> {
    let entries = vec![
        (Value::Integer(keys::INDEX.into()), Value::Integer(index.into())),
        (
            Value::Integer(keys::TIMESTAMP.into()),
            Value::Integer(timestamp.into()),
        ),
        (
            Value::Integer(keys::TRANSACTIONS.into()),
            transactions_to_cbor_value(transactions)?,
        ),
        (
            Value::Integer(keys::PREVIOUS_HASH.into()),
            Value::Bytes(previous_hash.0.to_vec()),
        ),
    ];

    encode_cbor_value_canonical(&Value::Map(entries))
}

/// Encode a transaction list on its own.
///
/// Used by storage backends for the serialized `transactions` column, so the
/// persisted form is byte-identical to what the digest covered.
pub fn encode_transactions(transactions: &[Transaction]) -> Result<Vec<u8>, CoreError> {
    encode_cbor_value_canonical(&transactions_to_cbor_value(transactions)?)
}

/// Decode a transaction list produced by [`encode_transactions`].
pub fn decode_transactions(bytes: &[u8]) -> Result<Vec<Transaction>, CoreError> {
    let value: Value =
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        _ => return Err(CoreError::DecodingError("expected array".into())),
    };

    items.iter().map(cbor_value_to_transaction).collect()
}

fn transactions_to_cbor_value(transactions: &[Transaction]) -> Result<Value, CoreError> {
    let items = transactions
        .iter()
        .enumerate()
        .map(|(i, tx)| transaction_to_cbor_value(i, tx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Array(items))
}

fn transaction_to_cbor_value(position: usize, tx: &Transaction) -> Result<Value, CoreError> {
    if !tx.is_encodable() {
        return Err(CoreError::EncodingError(format!(
            "transaction {} has non-finite amount {}",
            position, tx.amount
        )));
    }

    Ok(Value::Map(vec![
        (Value::Integer(tx_keys::FROM.into()), Value::Text(tx.from.clone())),
        (Value::Integer(tx_keys::TO.into()), Value::Text(tx.to.clone())),
        (Value::Integer(tx_keys::AMOUNT.into()), Value::Float(tx.amount)),
    ]))
}

fn cbor_value_to_transaction(value: &Value) -> Result<Transaction, CoreError> {
    let map = match value {
        Value::Map(m) => m,
        _ => return Err(CoreError::DecodingError("expected transaction map".into())),
    };

    let get = |key: u64| -> Option<&Value> {
        map.iter()
            .find(|(k, _)| matches!(k, Value::Integer(i) if i128::from(*i) == key as i128))
            .map(|(_, v)| v)
    };

    let from = match get(tx_keys::FROM) {
        Some(Value::Text(s)) => s.clone(),
        _ => return Err(CoreError::DecodingError("missing from".into())),
    };

    let to = match get(tx_keys::TO) {
        Some(Value::Text(s)) => s.clone(),
        _ => return Err(CoreError::DecodingError("missing to".into())),
    };

    let amount = match get(tx_keys::AMOUNT) {
        Some(Value::Float(f)) => *f,
        Some(Value::Integer(i)) => i128::from(*i) as f64,
        _ => return Err(CoreError::DecodingError("missing amount".into())),
    };

    Ok(Transaction { from, to, amount })
}

fn encode_cbor_value_canonical(value: &Value) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value)?;
    Ok(buf)
}

fn encode_value_to(buf: &mut Vec<u8>, value: &Value) -> Result<(), CoreError> {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr)?,
        Value::Map(entries) => encode_map_canonical(buf, entries)?,
        Value::Float(f) => encode_float(buf, *f)?,
        other => {
            return Err(CoreError::EncodingError(format!(
                "unsupported CBOR value: {:?}",
                other
            )))
        }
    }
    Ok(())
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();

    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        let abs = (-1 - n) as u64;
        encode_uint(buf, 1, abs);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a float as an IEEE-754 double (major type 7, additional info 27).
fn encode_float(buf: &mut Vec<u8>, f: f64) -> Result<(), CoreError> {
    if !f.is_finite() {
        return Err(CoreError::EncodingError(format!("non-finite float {}", f)));
    }
    let f = if f == 0.0 { 0.0 } else { f };
    buf.push(0xfb);
    buf.extend_from_slice(&f.to_bits().to_be_bytes());
    Ok(())
}

/// Encode a byte string (major type 2).
fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode an array (major type 4).
fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) -> Result<(), CoreError> {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value_to(buf, item)?;
    }
    Ok(())
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) -> Result<(), CoreError> {
    let mut key_value_pairs: Vec<(Vec<u8>, &Value)> = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let mut key_buf = Vec::new();
        encode_value_to(&mut key_buf, k)?;
        key_value_pairs.push((key_buf, v));
    }

    key_value_pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, key_value_pairs.len() as u64);
    for (key_bytes, value) in key_value_pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_genesis_layout() {
        let bytes = canonical_block_bytes(0, 0, &[], &BlockHash::ZERO).unwrap();

        let mut expected = vec![0xa4, 0x00, 0x00, 0x01, 0x00, 0x02, 0x80, 0x03, 0x58, 0x20];
        expected.extend_from_slice(&[0u8; 32]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_transaction_layout() {
        let bytes = encode_transactions(&[Transaction::new("A", "B", 5.0)]).unwrap();

        assert_eq!(
            bytes,
            vec![
                0x81, // array(1)
                0xa3, // map(3)
                0x00, 0x61, b'A', // 0: "A"
                0x01, 0x61, b'B', // 1: "B"
                0x02, 0xfb, 0x40, 0x14, 0, 0, 0, 0, 0, 0, // 2: 5.0
            ]
        );
    }

    #[test]
    fn test_canonical_encoding_deterministic() {
        let txs = vec![
            Transaction::new("alice", "bob", 12.5),
            Transaction::new("bob", "carol", 0.25),
        ];
        let prev = BlockHash::from_bytes([0x11; 32]);

        let b1 = canonical_block_bytes(7, 1736870400000, &txs, &prev).unwrap();
        let b2 = canonical_block_bytes(7, 1736870400000, &txs, &prev).unwrap();
        assert_eq!(b1, b2);
    }

    #[test]
    fn test_transaction_order_matters() {
        let a = Transaction::new("a", "b", 1.0);
        let b = Transaction::new("b", "a", 1.0);
        let prev = BlockHash::ZERO;

        let ab = canonical_block_bytes(1, 1, &[a.clone(), b.clone()], &prev).unwrap();
        let ba = canonical_block_bytes(1, 1, &[b, a], &prev).unwrap();
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_negative_zero_normalised() {
        let pos = encode_transactions(&[Transaction::new("a", "b", 0.0)]).unwrap();
        let neg = encode_transactions(&[Transaction::new("a", "b", -0.0)]).unwrap();
        assert_eq!(pos, neg);
    }

    #[test]
    fn test_non_finite_amount_rejected() {
        let txs = vec![
            Transaction::new("a", "b", 1.0),
            Transaction::new("a", "b", f64::NAN),
        ];
        let err = canonical_block_bytes(1, 1, &txs, &BlockHash::ZERO).unwrap_err();
        assert!(matches!(err, CoreError::EncodingError(msg) if msg.contains("transaction 1")));

        let err = encode_transactions(&[Transaction::new("a", "b", f64::NEG_INFINITY)]);
        assert!(err.is_err());
    }

    #[test]
    fn test_negative_timestamp_encoding() {
        let bytes = canonical_block_bytes(0, -1, &[], &BlockHash::ZERO).unwrap();
        // key 1 followed by major type 1 value 0 (-1)
        assert_eq!(&bytes[3..5], &[0x01, 0x20]);
    }

    #[test]
    fn test_integer_encoding() {
        let mut buf = Vec::new();

        encode_uint(&mut buf, 0, 23);
        assert_eq!(buf, vec![0x17]);

        buf.clear();
        encode_uint(&mut buf, 0, 24);
        assert_eq!(buf, vec![0x18, 24]);

        buf.clear();
        encode_uint(&mut buf, 0, 256);
        assert_eq!(buf, vec![0x19, 0x01, 0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, 1 << 32);
        assert_eq!(buf, vec![0x1b, 0, 0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_map_key_ordering() {
        let mut buf = Vec::new();
        let entries = vec![
            (Value::Integer(3.into()), Value::Integer(30.into())),
            (Value::Integer(0.into()), Value::Integer(0.into())),
        ];
        encode_map_canonical(&mut buf, &entries).unwrap();

        assert_eq!(buf, vec![0xa2, 0x00, 0x00, 0x03, 0x18, 30]);
    }

    #[test]
    fn test_transactions_decode() {
        let txs = vec![
            Transaction::new("alice", "bob", 12.5),
            Transaction::new("", "carol", -3.0),
        ];
        let bytes = encode_transactions(&txs).unwrap();
        assert_eq!(decode_transactions(&bytes).unwrap(), txs);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_transactions(&[0xa0]).is_err());
        assert!(decode_transactions(&[0x81, 0x01]).is_err());
        assert!(decode_transactions(&[]).is_err());
    }
}
