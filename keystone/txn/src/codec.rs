//! Versioned key codec.
//!
//! A user key and a timestamp are packed into a single ordered byte key.
//! The user key goes through a memcomparable byte encoding first: it is cut
//! into groups of eight bytes, each group padded with zeros to full size and
//! terminated by a marker byte of `0xff - pad_count`. The encoding preserves
//! lexicographic order and is prefix-free, so the encoded entries of two
//! different user keys never interleave no matter what timestamp suffixes
//! follow them.
//!
//! The timestamp is appended as the bitwise complement in big-endian. For a
//! fixed user key, larger timestamps therefore sort *before* smaller ones,
//! so "newest version at or below `ts`" is a forward seek to
//! `encode_key(key, ts)`.

use keystone_common::{Key, Timestamp};
use keystone_storage::{StorageError, StorageResult};

/// Length of the encoded timestamp suffix.
pub const TS_SUFFIX_LEN: usize = 8;

const ENC_GROUP_SIZE: usize = 8;
const ENC_MARKER: u8 = 0xff;
const ENC_PAD: u8 = 0x00;

/// Memcomparable encoding of a raw user key, without a timestamp suffix.
/// Seeking to `encode_bytes(k)` lands at the first encoded entry whose user
/// key is `>= k`.
pub fn encode_bytes(key: &[u8]) -> Key {
    let groups = key.len() / ENC_GROUP_SIZE + 1;
    let mut encoded = Vec::with_capacity(groups * (ENC_GROUP_SIZE + 1) + TS_SUFFIX_LEN);
    for chunk in key.chunks(ENC_GROUP_SIZE) {
        encoded.extend_from_slice(chunk);
        if chunk.len() == ENC_GROUP_SIZE {
            encoded.push(ENC_MARKER);
        } else {
            let pad = ENC_GROUP_SIZE - chunk.len();
            encoded.resize(encoded.len() + pad, ENC_PAD);
            encoded.push(ENC_MARKER - pad as u8);
        }
    }
    // A key filling its last group exactly still needs a terminating padded
    // group; otherwise its encoding would be a prefix of its extensions'.
    if key.len() % ENC_GROUP_SIZE == 0 {
        encoded.resize(encoded.len() + ENC_GROUP_SIZE, ENC_PAD);
        encoded.push(ENC_MARKER - ENC_GROUP_SIZE as u8);
    }
    encoded
}

/// Decode the leading memcomparable user key; returns the key and the number
/// of encoded bytes it occupied.
fn decode_bytes(encoded: &[u8]) -> StorageResult<(Key, usize)> {
    let mut key = Vec::with_capacity(encoded.len());
    let mut consumed = 0;
    loop {
        let rest = &encoded[consumed..];
        if rest.len() < ENC_GROUP_SIZE + 1 {
            return Err(StorageError::Corrupted(format!(
                "truncated encoded key: {} bytes left in group",
                rest.len()
            )));
        }
        let group = &rest[..ENC_GROUP_SIZE];
        let marker = rest[ENC_GROUP_SIZE];
        consumed += ENC_GROUP_SIZE + 1;
        let pad = (ENC_MARKER - marker) as usize;
        if pad > ENC_GROUP_SIZE {
            return Err(StorageError::Corrupted(format!(
                "invalid group marker {marker:#x} in encoded key"
            )));
        }
        key.extend_from_slice(&group[..ENC_GROUP_SIZE - pad]);
        if pad > 0 {
            if group[ENC_GROUP_SIZE - pad..].iter().any(|&b| b != ENC_PAD) {
                return Err(StorageError::Corrupted(
                    "non-zero padding in encoded key".into(),
                ));
            }
            return Ok((key, consumed));
        }
    }
}

/// Encode `(key, ts)` into a single ordered byte key.
pub fn encode_key(key: &[u8], ts: Timestamp) -> Key {
    let mut encoded = encode_bytes(key);
    encoded.extend_from_slice(&(!ts.raw()).to_be_bytes());
    encoded
}

/// Recover both parts of an encoded key exactly.
pub fn decode_key(encoded: &[u8]) -> StorageResult<(Key, Timestamp)> {
    let (user, consumed) = decode_bytes(encoded)?;
    if encoded.len() - consumed != TS_SUFFIX_LEN {
        return Err(StorageError::Corrupted(format!(
            "encoded key has a {}-byte timestamp suffix",
            encoded.len() - consumed
        )));
    }
    Ok((user, decode_ts(encoded)?))
}

/// The user-key prefix of an encoded key.
pub fn user_key(encoded: &[u8]) -> StorageResult<Key> {
    Ok(decode_bytes(encoded)?.0)
}

/// The timestamp suffix of an encoded key.
pub fn decode_ts(encoded: &[u8]) -> StorageResult<Timestamp> {
    if encoded.len() < TS_SUFFIX_LEN {
        return Err(StorageError::Corrupted(format!(
            "encoded key too short: {} bytes",
            encoded.len()
        )));
    }
    let mut suffix = [0u8; TS_SUFFIX_LEN];
    suffix.copy_from_slice(&encoded[encoded.len() - TS_SUFFIX_LEN..]);
    Ok(Timestamp::with_ts(!u64::from_be_bytes(suffix)))
}
