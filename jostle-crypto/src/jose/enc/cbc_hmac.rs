use aws_lc_rs::{
    cipher::{
        AES_128, AES_256, Algorithm, DecryptionContext, EncryptionContext,
        PaddedBlockDecryptingKey, PaddedBlockEncryptingKey, UnboundCipherKey,
    },
    constant_time, hmac,
    iv::FixedLength,
};
use zeroize::Zeroizing;

use crate::{
    JoseError, Result,
    jose::{ContentEncryptionHandler, JWEEncryption},
};

const IV_LEN: usize = 16;

#[derive(Debug, Clone, Copy)]
/// AES CBC with HMAC SHA-2 authenticated encryption
/// (`A128CBC-HS256`, `A256CBC-HS512`) as defined in rfc7518, section 5.2.
///
/// The CEK is split in a MAC key (first half) and an encryption key (second half).
/// The tag is the first half of `HMAC(AAD ‖ IV ‖ ciphertext ‖ AL)`,
/// where `AL` is the bit length of the AAD as a 64 bit big-endian integer.
pub struct AesCbcHmacContentEncryption {
    enc: JWEEncryption,
    cipher: &'static Algorithm,
    mac: hmac::Algorithm,
}

impl AesCbcHmacContentEncryption {
    /// `A128CBC-HS256`
    pub const A128CBC_HS256: Self = Self {
        enc: JWEEncryption::A128CbcHs256,
        cipher: &AES_128,
        mac: hmac::HMAC_SHA256,
    };

    /// `A256CBC-HS512`
    pub const A256CBC_HS512: Self = Self {
        enc: JWEEncryption::A256CbcHs512,
        cipher: &AES_256,
        mac: hmac::HMAC_SHA512,
    };

    fn tag_len(&self) -> usize {
        self.key_len() / 2
    }

    fn split_key<'a>(&self, cek: &'a [u8]) -> Result<(&'a [u8], &'a [u8])> {
        if cek.len() != self.key_len() {
            return Err(JoseError::cryptographic_failure());
        }
        Ok(cek.split_at(self.key_len() / 2))
    }

    fn compute_tag(&self, mac_key: &[u8], aad: &[u8], iv: &[u8], ciphertext: &[u8]) -> Vec<u8> {
        let al = (aad.len() as u64).wrapping_mul(8).to_be_bytes();

        let mut ctx = hmac::Context::with_key(&hmac::Key::new(self.mac, mac_key));
        ctx.update(aad);
        ctx.update(iv);
        ctx.update(ciphertext);
        ctx.update(&al);
        let mut tag = ctx.sign().as_ref().to_vec();
        tag.truncate(self.tag_len());
        tag
    }
}

impl ContentEncryptionHandler for AesCbcHmacContentEncryption {
    fn algorithm(&self) -> &str {
        self.enc.as_str()
    }

    fn key_len(&self) -> usize {
        self.enc.key_len()
    }

    fn iv_len(&self) -> usize {
        IV_LEN
    }

    fn encrypt(
        &self,
        cek: &[u8],
        iv: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        let (mac_key, enc_key) = self.split_key(cek)?;
        let iv_block = FixedLength::<IV_LEN>::try_from(iv)
            .map_err(|err| JoseError::new(crate::ErrorKind::Encoding, err))?;

        let key = UnboundCipherKey::new(self.cipher, enc_key)
            .and_then(PaddedBlockEncryptingKey::cbc_pkcs7)
            .map_err(|err| JoseError::new(crate::ErrorKind::Encoding, err))?;
        let mut ciphertext = plaintext.to_vec();
        key.less_safe_encrypt(&mut ciphertext, EncryptionContext::Iv128(iv_block))
            .map_err(|err| JoseError::new(crate::ErrorKind::Encoding, err))?;

        let tag = self.compute_tag(mac_key, aad, iv, &ciphertext);
        Ok((ciphertext, tag))
    }

    fn decrypt(
        &self,
        cek: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        let (mac_key, enc_key) = self.split_key(cek)?;
        let iv_block =
            FixedLength::<IV_LEN>::try_from(iv).map_err(JoseError::cryptographic_failure_from)?;

        let expected = self.compute_tag(mac_key, aad, iv, ciphertext);
        let tag_ok = constant_time::verify_slices_are_equal(&expected, tag).is_ok();

        // decrypt regardless of the tag outcome, padding errors and
        // tag errors must not be distinguishable
        let mut buffer = Zeroizing::new(ciphertext.to_vec());
        let plaintext_len = match UnboundCipherKey::new(self.cipher, enc_key)
            .and_then(PaddedBlockDecryptingKey::cbc_pkcs7)
        {
            Ok(key) => key
                .decrypt(&mut buffer, DecryptionContext::Iv128(iv_block))
                .map(|plaintext| plaintext.len()),
            Err(err) => Err(err),
        };

        match (tag_ok, plaintext_len) {
            (true, Ok(len)) => {
                buffer.truncate(len);
                Ok(buffer)
            }
            _ => Err(JoseError::cryptographic_failure()),
        }
    }
}
