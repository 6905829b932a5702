//! Minimal DER walker for pulling the EC point out of a SubjectPublicKeyInfo.
//!
//! ```text
//! SubjectPublicKeyInfo ::= SEQUENCE {
//!     algorithm         AlgorithmIdentifier,
//!     subjectPublicKey  BIT STRING }
//! ```
//!
//! Only definite-length, single-byte-tag encodings are understood, which is
//! all DER allows for this structure.

use crate::error::KeyError;

pub const UNCOMPRESSED_POINT: u8 = 0x04;

const TAG_SEQUENCE: u8 = 0x30;
const TAG_BIT_STRING: u8 = 0x03;

struct Tlv<'a> {
    tag: u8,
    content: &'a [u8],
    rest: &'a [u8],
}

fn malformed(msg: &str) -> KeyError {
    KeyError::MalformedKey(msg.to_string())
}

fn read_tlv(input: &[u8]) -> Result<Tlv<'_>, KeyError> {
    let (&tag, rest) = input
        .split_first()
        .ok_or_else(|| malformed("truncated DER element"))?;
    if tag & 0x1f == 0x1f {
        return Err(malformed("multi-byte DER tags are not supported"));
    }

    let (&first, rest) = rest
        .split_first()
        .ok_or_else(|| malformed("truncated DER length"))?;
    let (len, rest) = if first < 0x80 {
        (usize::from(first), rest)
    } else {
        let octets = usize::from(first & 0x7f);
        if octets == 0 {
            return Err(malformed("indefinite length is not valid DER"));
        }
        if octets > std::mem::size_of::<usize>() || rest.len() < octets {
            return Err(malformed("truncated DER length"));
        }
        let (len_bytes, rest) = rest.split_at(octets);
        let len = len_bytes
            .iter()
            .fold(0usize, |acc, b| (acc << 8) | usize::from(*b));
        (len, rest)
    };

    if rest.len() < len {
        return Err(malformed("DER element overruns its container"));
    }
    let (content, rest) = rest.split_at(len);
    Ok(Tlv { tag, content, rest })
}

/// Returns the `(X, Y)` coordinates embedded in a DER SubjectPublicKeyInfo.
///
/// Both coordinates are exactly `curve_byte_size` bytes wide; leading zero
/// bytes are kept.
pub fn extract_point(
    der: &[u8],
    curve_byte_size: usize,
) -> Result<(Vec<u8>, Vec<u8>), KeyError> {
    let spki = read_tlv(der)?;
    if spki.tag != TAG_SEQUENCE {
        return Err(malformed("expected SubjectPublicKeyInfo SEQUENCE"));
    }

    let mut children = spki.content;
    while !children.is_empty() {
        let tlv = read_tlv(children)?;
        if tlv.tag == TAG_BIT_STRING {
            let (&unused_bits, point) = tlv
                .content
                .split_first()
                .ok_or_else(|| malformed("empty BIT STRING"))?;
            if unused_bits != 0 {
                return Err(malformed("public key BIT STRING has unused bits"));
            }
            return split_point(point, curve_byte_size);
        }
        children = tlv.rest;
    }

    Err(malformed("no BIT STRING in SubjectPublicKeyInfo"))
}

/// Splits an uncompressed SEC1 point into fixed-width `(X, Y)` windows.
pub fn split_point(
    point: &[u8],
    curve_byte_size: usize,
) -> Result<(Vec<u8>, Vec<u8>), KeyError> {
    let coords = match point.split_first() {
        Some((&UNCOMPRESSED_POINT, coords)) => coords,
        _ => return Err(malformed("not an uncompressed point")),
    };

    if coords.len() % 2 != 0 {
        return Err(malformed("point coordinates have odd length"));
    }
    if coords.len() / 2 != curve_byte_size {
        return Err(KeyError::MalformedKey(format!(
            "expected {curve_byte_size}-byte coordinates, got {}",
            coords.len() / 2
        )));
    }

    let (x, y) = coords.split_at(curve_byte_size);
    Ok((x.to_vec(), y.to_vec()))
}
