//! Minimal DER (Distinguished Encoding Rules) codec.
//!
//! Only the subset of [ITU X.690] needed by JOSE is supported:
//!
//! * `SEQUENCE { INTEGER r, INTEGER s }` ECDSA signatures, which JWS transports
//!   as fixed-width `r‖s` (see [`ecdsa_der_to_fixed`] and [`ecdsa_fixed_to_der`]);
//! * RSA public keys (`SubjectPublicKeyInfo`) and private keys (PKCS#1 / PKCS#8),
//!   used to bridge JWK members and the native key objects.
//!
//! All failures are reported as [`ErrorKind::Encoding`](crate::ErrorKind::Encoding).
//!
//! [ITU X.690]: https://www.itu.int/ITU-T/studygroups/com17/languages/X.690-0207.pdf

use crate::{JoseError, Result};

mod constants;
use constants::{
    DER_LENGTH_LONG_FORM_FLAG, DER_LENGTH_MAX_OCTETS, DER_LENGTH_SHORT_FORM_MAX, DER_TAG_INTEGER,
    DER_TAG_SEQUENCE, INTEGER_SIGN_BIT_MASK,
};

mod ecdsa;
pub use ecdsa::{ecdsa_der_to_fixed, ecdsa_fixed_to_der};

mod rsa;
pub use rsa::{
    RsaPrivateKeyComponents, decode_pkcs8_rsa_private_key, encode_pkcs8_rsa_private_key,
    encode_rsa_subject_public_key_info,
};

#[derive(Debug, Clone)]
/// Cursor over a DER encoded input.
pub struct DerReader<'a> {
    input: &'a [u8],
    position: usize,
}

impl<'a> DerReader<'a> {
    /// Create a new [`DerReader`] positioned at the start of `input`.
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, position: 0 }
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.input.len() - self.position
    }

    /// Returns true if all input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read a single byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        let byte = self
            .input
            .get(self.position)
            .copied()
            .ok_or_else(|| JoseError::encoding("unexpected end of DER input"))?;
        self.position += 1;
        Ok(byte)
    }

    /// Read exactly `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(JoseError::encoding(format!(
                "DER element of {len} bytes exceeds remaining input of {} bytes",
                self.remaining()
            )));
        }
        let bytes = &self.input[self.position..self.position + len];
        self.position += len;
        Ok(bytes)
    }

    /// Read the identifier octet and check it matches `expected`.
    pub fn read_tag(&mut self, expected: u8) -> Result<()> {
        let tag = self.read_byte()?;
        if tag != expected {
            return Err(JoseError::encoding(format!(
                "unexpected DER tag {tag:#04x}, expected {expected:#04x}"
            )));
        }
        Ok(())
    }

    /// Read a complete tag-length-value element and return its content.
    pub fn read_element(&mut self, tag: u8) -> Result<&'a [u8]> {
        self.read_tag(tag)?;
        let len = read_length(self)?;
        self.read_bytes(len)
    }

    /// Read a `SEQUENCE` and return a reader over its content.
    pub fn read_sequence(&mut self) -> Result<DerReader<'a>> {
        self.read_element(DER_TAG_SEQUENCE).map(DerReader::new)
    }

    /// Consume the reader, failing if any input is left.
    pub fn finish(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(JoseError::encoding(format!(
                "{} trailing bytes after DER element",
                self.remaining()
            )))
        }
    }
}

/// Read a DER length, short form (< 128) or long form
/// with one up to four big-endian length octets.
///
/// Four length octets are accepted, so the largest length is `u32::MAX`.
/// Five or more length octets, non-minimal and indefinite lengths
/// fail with [`ErrorKind::Encoding`](crate::ErrorKind::Encoding).
pub fn read_length(reader: &mut DerReader<'_>) -> Result<usize> {
    let first = reader.read_byte()?;
    if first & DER_LENGTH_LONG_FORM_FLAG == 0 {
        return Ok(first as usize);
    }

    let octets = (first & !DER_LENGTH_LONG_FORM_FLAG) as usize;
    if octets == 0 {
        return Err(JoseError::encoding("indefinite DER length is not allowed"));
    }
    if octets > DER_LENGTH_MAX_OCTETS {
        return Err(JoseError::encoding(format!(
            "unsupported DER length field of {octets} octets"
        )));
    }

    let bytes = reader.read_bytes(octets)?;
    if bytes[0] == 0 {
        return Err(JoseError::encoding("non-minimal DER length"));
    }
    let len = bytes
        .iter()
        .fold(0usize, |len, byte| (len << 8) | *byte as usize);
    if len <= DER_LENGTH_SHORT_FORM_MAX {
        return Err(JoseError::encoding("long form used for short DER length"));
    }
    Ok(len)
}

/// Write a DER length as defined in section 8.1.3 of [ITU X.690].
///
/// `len` must not exceed `u32::MAX`, the largest length [`read_length`] accepts.
/// Elements written by this crate hold keys and signatures of a few kilobytes.
///
/// [ITU X.690]: https://www.itu.int/ITU-T/studygroups/com17/languages/X.690-0207.pdf
pub fn write_length(out: &mut Vec<u8>, len: usize) {
    debug_assert!(
        u32::try_from(len).is_ok(),
        "DER length {len} needs more than {DER_LENGTH_MAX_OCTETS} octets"
    );
    if len <= DER_LENGTH_SHORT_FORM_MAX {
        out.push(len as u8);
        return;
    }

    let be = len.to_be_bytes();
    let skip = be.iter().take_while(|byte| **byte == 0).count();
    let octets = &be[skip..];
    out.push(DER_LENGTH_LONG_FORM_FLAG | octets.len() as u8);
    out.extend_from_slice(octets);
}

/// Read a DER INTEGER as an unsigned value, right-aligned
/// into `output` with zero bytes as left padding.
///
/// At most one leading zero sign byte is stripped. Fails if the
/// remaining value does not fit in `output` or if it is negative.
pub fn read_unsigned_integer(reader: &mut DerReader<'_>, output: &mut [u8]) -> Result<()> {
    let value = read_unsigned_integer_bytes(reader)?;
    if value.len() > output.len() {
        return Err(JoseError::encoding(format!(
            "DER integer of {} bytes does not fit in {} bytes",
            value.len(),
            output.len()
        )));
    }

    let padding = output.len() - value.len();
    output[..padding].fill(0);
    output[padding..].copy_from_slice(value);
    Ok(())
}

/// Read a DER INTEGER as an unsigned big-endian value,
/// with at most one leading zero sign byte stripped.
pub fn read_unsigned_integer_bytes<'a>(reader: &mut DerReader<'a>) -> Result<&'a [u8]> {
    let value = reader.read_element(DER_TAG_INTEGER)?;
    match value {
        [] => Err(JoseError::encoding("empty DER integer")),
        [first, ..] if first & INTEGER_SIGN_BIT_MASK != 0 => {
            Err(JoseError::encoding("negative DER integer"))
        }
        [0, rest @ ..] if !rest.is_empty() => Ok(rest),
        value => Ok(value),
    }
}

/// Write a DER INTEGER: tag `0x02`, length and the bytes verbatim.
///
/// The caller must prefix a zero byte when the high bit of the
/// first byte is set, or use [`write_unsigned_integer`].
pub fn write_integer(out: &mut Vec<u8>, value: &[u8]) {
    out.push(DER_TAG_INTEGER);
    write_length(out, value.len());
    out.extend_from_slice(value);
}

/// Write an unsigned big-endian value as a minimal, non-negative DER INTEGER.
pub fn write_unsigned_integer(out: &mut Vec<u8>, value: &[u8]) {
    let skip = value.iter().take_while(|byte| **byte == 0).count();
    let minimal = match &value[skip..] {
        [] => &[0u8][..],
        minimal => minimal,
    };

    if minimal[0] & INTEGER_SIGN_BIT_MASK != 0 {
        let mut signed = Vec::with_capacity(minimal.len() + 1);
        signed.push(0);
        signed.extend_from_slice(minimal);
        write_integer(out, &signed);
    } else {
        write_integer(out, minimal);
    }
}

/// Write a complete tag-length-value element.
pub(crate) fn write_element(out: &mut Vec<u8>, tag: u8, content: &[u8]) {
    out.push(tag);
    write_length(out, content.len());
    out.extend_from_slice(content);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use tokio_test::assert_err;

    fn length_roundtrip(len: usize) -> usize {
        let mut out = Vec::new();
        write_length(&mut out, len);
        let mut reader = DerReader::new(&out);
        let read = read_length(&mut reader).unwrap();
        reader.finish().unwrap();
        read
    }

    #[test]
    fn length_short_and_long_form() {
        for len in [
            0,
            1,
            127,
            128,
            255,
            256,
            65_535,
            65_536,
            16_777_216,
            u32::MAX as usize,
        ] {
            assert_eq!(length_roundtrip(len), len, "len {len}");
        }

        let mut out = Vec::new();
        write_length(&mut out, 127);
        assert_eq!(out, [0x7f]);

        out.clear();
        write_length(&mut out, 128);
        assert_eq!(out, [0x81, 0x80]);

        out.clear();
        write_length(&mut out, 0x0102);
        assert_eq!(out, [0x82, 0x01, 0x02]);

        out.clear();
        write_length(&mut out, 0x0100_0000);
        assert_eq!(out, [0x84, 0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn length_rejects_unsupported_forms() {
        for input in [
            &[0x80][..],                              // indefinite
            &[0x85, 0x01, 0x00, 0x00, 0x00, 0x00][..], // 5 length octets
            &[0x81, 0x05][..],                        // long form for short length
            &[0x82, 0x00, 0x90][..],                  // leading zero
            &[0x82, 0x01][..],                        // truncated
        ] {
            let err = read_length(&mut DerReader::new(input)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Encoding, "input {input:02x?}");
        }
    }

    #[test]
    fn unsigned_integer_is_right_aligned() {
        let mut reader = DerReader::new(&[0x02, 0x02, 0x01, 0x02]);
        let mut output = [0xffu8; 4];
        read_unsigned_integer(&mut reader, &mut output).unwrap();
        assert_eq!(output, [0, 0, 1, 2]);
    }

    #[test]
    fn unsigned_integer_strips_sign_byte() {
        let mut reader = DerReader::new(&[0x02, 0x03, 0x00, 0x80, 0x01]);
        let mut output = [0u8; 2];
        read_unsigned_integer(&mut reader, &mut output).unwrap();
        assert_eq!(output, [0x80, 0x01]);
    }

    #[test]
    fn unsigned_integer_too_long_fails() {
        let mut reader = DerReader::new(&[0x02, 0x03, 0x01, 0x02, 0x03]);
        let mut output = [0u8; 2];
        assert_err!(read_unsigned_integer(&mut reader, &mut output));
    }

    #[test]
    fn negative_integer_fails() {
        let mut reader = DerReader::new(&[0x02, 0x01, 0x80]);
        assert_err!(read_unsigned_integer_bytes(&mut reader));
    }

    #[test]
    fn write_unsigned_integer_adds_sign_byte() {
        let mut out = Vec::new();
        write_unsigned_integer(&mut out, &[0x00, 0x00, 0xff]);
        assert_eq!(out, [0x02, 0x02, 0x00, 0xff]);

        out.clear();
        write_unsigned_integer(&mut out, &[0x00, 0x00]);
        assert_eq!(out, [0x02, 0x01, 0x00]);

        out.clear();
        write_integer(&mut out, &[0x7f]);
        assert_eq!(out, [0x02, 0x01, 0x7f]);
    }

    #[test]
    fn reader_reports_trailing_bytes() {
        let mut reader = DerReader::new(&[0x02, 0x01, 0x01, 0x00]);
        read_unsigned_integer_bytes(&mut reader).unwrap();
        assert_err!(reader.finish());
    }
}
