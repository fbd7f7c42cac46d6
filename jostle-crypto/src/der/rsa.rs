use std::fmt;

use zeroize::{Zeroize, Zeroizing};

use super::{
    DerReader,
    constants::{
        BIT_STRING_NO_UNUSED_BITS, DER_TAG_BIT_STRING, DER_TAG_OCTET_STRING, DER_TAG_SEQUENCE,
        RSA_ALGORITHM_IDENTIFIER,
    },
    read_unsigned_integer_bytes, write_element, write_unsigned_integer,
};
use crate::{JoseError, Result};

/// The version of both the PKCS#8 `PrivateKeyInfo` and
/// the two-prime PKCS#1 `RSAPrivateKey` structures.
const VERSION_ZERO: [u8; 1] = [0x00];

/// Unsigned big-endian components of an RSA private key,
/// as listed in appendix A.1.2 of [RFC 8017](https://datatracker.ietf.org/doc/rfc8017/).
///
/// The private members are zeroed when dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct RsaPrivateKeyComponents {
    /// modulus
    pub n: Vec<u8>,
    /// public exponent
    pub e: Vec<u8>,
    /// private exponent
    pub d: Vec<u8>,
    /// first prime factor
    pub p: Vec<u8>,
    /// second prime factor
    pub q: Vec<u8>,
    /// first factor CRT exponent
    pub dp: Vec<u8>,
    /// second factor CRT exponent
    pub dq: Vec<u8>,
    /// first CRT coefficient
    pub qi: Vec<u8>,
}

impl fmt::Debug for RsaPrivateKeyComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPrivateKeyComponents")
            .field("n_len", &self.n.len())
            .field("e", &self.e)
            .finish_non_exhaustive()
    }
}

impl Drop for RsaPrivateKeyComponents {
    fn drop(&mut self) {
        self.d.zeroize();
        self.p.zeroize();
        self.q.zeroize();
        self.dp.zeroize();
        self.dq.zeroize();
        self.qi.zeroize();
    }
}

/// In section 4.1 of [RFC 5280](https://datatracker.ietf.org/doc/rfc5280/) the standard DER
/// encoded public key format is defined as
///```text
/// SubjectPublicKeyInfo = SEQUENCE {
///     algorithm AlgorithmIdentifier,
///     subjectPublicKey BIT STRING
/// }
///```
/// The subject public key `BIT STRING` contains a DER encoded RSA public key sequence
///```text
/// RSAPublicKey = SEQUENCE {
///     modulus INTEGER,
///     exponent INTEGER,
/// }
/// ```
/// defined in section 2.3.1 of [RFC 3279](https://datatracker.ietf.org/doc/rfc3279/).
pub fn encode_rsa_subject_public_key_info(n: &[u8], e: &[u8]) -> Vec<u8> {
    let mut rsa_public_key = Vec::with_capacity(n.len() + e.len() + 16);
    write_unsigned_integer(&mut rsa_public_key, n);
    write_unsigned_integer(&mut rsa_public_key, e);

    let mut bit_string = Vec::with_capacity(rsa_public_key.len() + 8);
    bit_string.push(BIT_STRING_NO_UNUSED_BITS);
    write_element(&mut bit_string, DER_TAG_SEQUENCE, &rsa_public_key);

    let mut content = Vec::with_capacity(RSA_ALGORITHM_IDENTIFIER.len() + bit_string.len() + 8);
    content.extend_from_slice(&RSA_ALGORITHM_IDENTIFIER);
    write_element(&mut content, DER_TAG_BIT_STRING, &bit_string);

    let mut spki = Vec::with_capacity(content.len() + 8);
    write_element(&mut spki, DER_TAG_SEQUENCE, &content);
    spki
}

/// Encode the components as an unencrypted PKCS#8 `PrivateKeyInfo`
/// ([RFC 5208, section 5](https://datatracker.ietf.org/doc/html/rfc5208#section-5)),
/// wrapping a two-prime PKCS#1 `RSAPrivateKey`
/// ([RFC 8017, appendix A.1.2](https://datatracker.ietf.org/doc/html/rfc8017#appendix-A.1.2)).
///
/// ```text
/// PrivateKeyInfo ::= SEQUENCE {
///     version                   Version,
///     privateKeyAlgorithm       AlgorithmIdentifier,
///     privateKey                OCTET STRING
/// }
/// ```
pub fn encode_pkcs8_rsa_private_key(key: &RsaPrivateKeyComponents) -> Zeroizing<Vec<u8>> {
    let mut rsa_private_key = Zeroizing::new(Vec::with_capacity(key.n.len() * 5));
    for value in [
        VERSION_ZERO.as_slice(),
        key.n.as_slice(),
        key.e.as_slice(),
        key.d.as_slice(),
        key.p.as_slice(),
        key.q.as_slice(),
        key.dp.as_slice(),
        key.dq.as_slice(),
        key.qi.as_slice(),
    ] {
        write_unsigned_integer(&mut rsa_private_key, value);
    }

    let mut sequence = Zeroizing::new(Vec::with_capacity(rsa_private_key.len() + 8));
    write_element(&mut sequence, DER_TAG_SEQUENCE, &rsa_private_key);

    let mut content = Zeroizing::new(Vec::with_capacity(sequence.len() + 32));
    write_unsigned_integer(&mut content, &VERSION_ZERO);
    content.extend_from_slice(&RSA_ALGORITHM_IDENTIFIER);
    write_element(&mut content, DER_TAG_OCTET_STRING, &sequence);

    let mut pkcs8 = Zeroizing::new(Vec::with_capacity(content.len() + 8));
    write_element(&mut pkcs8, DER_TAG_SEQUENCE, &content);
    pkcs8
}

/// Decode an unencrypted PKCS#8 `PrivateKeyInfo` holding a two-prime RSA private key.
///
/// Optional trailing attributes of the `PrivateKeyInfo` are ignored.
pub fn decode_pkcs8_rsa_private_key(der: &[u8]) -> Result<RsaPrivateKeyComponents> {
    let mut reader = DerReader::new(der);
    let mut info = reader.read_sequence()?;
    reader.finish()?;

    expect_version_zero(&mut info)?;
    let algorithm = info.read_bytes(RSA_ALGORITHM_IDENTIFIER.len())?;
    if algorithm != RSA_ALGORITHM_IDENTIFIER {
        return Err(JoseError::encoding(
            "PKCS#8 private key is not an rsaEncryption key",
        ));
    }

    let private_key = info.read_element(DER_TAG_OCTET_STRING)?;
    let mut outer = DerReader::new(private_key);
    let mut key = outer.read_sequence()?;
    outer.finish()?;

    expect_version_zero(&mut key)?;
    let mut next = || read_unsigned_integer_bytes(&mut key).map(<[u8]>::to_vec);
    let components = RsaPrivateKeyComponents {
        n: next()?,
        e: next()?,
        d: next()?,
        p: next()?,
        q: next()?,
        dp: next()?,
        dq: next()?,
        qi: next()?,
    };
    key.finish()?;
    Ok(components)
}

fn expect_version_zero(reader: &mut DerReader<'_>) -> Result<()> {
    match read_unsigned_integer_bytes(reader)? {
        [0] => Ok(()),
        version => Err(JoseError::encoding(format!(
            "unsupported DER structure version {version:02x?}"
        ))),
    }
}
