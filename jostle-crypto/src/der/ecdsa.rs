use super::{
    DerReader, constants::DER_TAG_SEQUENCE, read_unsigned_integer, write_element,
    write_unsigned_integer,
};
use crate::{JoseError, Result};

/// Convert an ASN.1 DER `SEQUENCE { INTEGER r, INTEGER s }` ECDSA signature
/// into the fixed-width `r‖s` form used by JWS ([rfc7518, section 3.4]).
///
/// `width` is the total output width, e.g. 64 bytes for P-256,
/// 96 bytes for P-384 and 132 bytes for P-521.
///
/// [rfc7518, section 3.4]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.4
pub fn ecdsa_der_to_fixed(der: &[u8], width: usize) -> Result<Vec<u8>> {
    if width == 0 || width % 2 != 0 {
        return Err(JoseError::encoding(format!(
            "invalid fixed-width ECDSA signature size {width}"
        )));
    }

    let mut reader = DerReader::new(der);
    let mut sequence = reader.read_sequence()?;
    reader.finish()?;

    let mut output = vec![0u8; width];
    let (r, s) = output.split_at_mut(width / 2);
    read_unsigned_integer(&mut sequence, r)?;
    read_unsigned_integer(&mut sequence, s)?;
    sequence.finish()?;

    Ok(output)
}

/// Convert a fixed-width `r‖s` JWS ECDSA signature into the
/// ASN.1 DER form consumed by the signature primitive.
pub fn ecdsa_fixed_to_der(signature: &[u8]) -> Result<Vec<u8>> {
    if signature.is_empty() || signature.len() % 2 != 0 {
        return Err(JoseError::encoding(format!(
            "invalid fixed-width ECDSA signature size {}",
            signature.len()
        )));
    }

    let (r, s) = signature.split_at(signature.len() / 2);
    let mut content = Vec::with_capacity(signature.len() + 6);
    write_unsigned_integer(&mut content, r);
    write_unsigned_integer(&mut content, s);

    let mut der = Vec::with_capacity(content.len() + 4);
    write_element(&mut der, DER_TAG_SEQUENCE, &content);
    Ok(der)
}
