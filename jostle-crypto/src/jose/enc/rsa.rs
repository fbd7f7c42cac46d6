use aws_lc_rs::rsa::{
    OAEP_SHA1_MGF1SHA1, OAEP_SHA256_MGF1SHA256, OaepAlgorithm, OaepPrivateDecryptingKey,
    OaepPublicEncryptingKey, Pkcs1PrivateDecryptingKey, Pkcs1PublicEncryptingKey,
};
use zeroize::Zeroizing;

use crate::{
    ErrorKind, JoseError, Result,
    jose::{JWEAlgorithm, Key, KeyManagementHandler},
};

#[derive(Debug, Clone, Copy)]
enum Padding {
    Pkcs1,
    Oaep(&'static OaepAlgorithm),
}

#[derive(Debug, Clone, Copy)]
/// RSA key encryption: `RSA1_5`, `RSA-OAEP` and `RSA-OAEP-256`.
///
/// For `RSA1_5` a random CEK is substituted when the encrypted key does not
/// decrypt to a CEK of the expected size, so that a padding failure only
/// surfaces as the same failure as a bad authentication tag
/// (rfc7516, section 11.5).
pub struct RsaKeyManagement {
    alg: JWEAlgorithm,
    padding: Padding,
}

impl RsaKeyManagement {
    /// `RSA1_5`
    pub const RSA1_5: Self = Self {
        alg: JWEAlgorithm::Rsa1_5,
        padding: Padding::Pkcs1,
    };

    /// `RSA-OAEP`
    pub const RSA_OAEP: Self = Self {
        alg: JWEAlgorithm::RsaOaep,
        padding: Padding::Oaep(&OAEP_SHA1_MGF1SHA1),
    };

    /// `RSA-OAEP-256`
    pub const RSA_OAEP_256: Self = Self {
        alg: JWEAlgorithm::RsaOaep256,
        padding: Padding::Oaep(&OAEP_SHA256_MGF1SHA256),
    };
}

impl KeyManagementHandler for RsaKeyManagement {
    fn algorithm(&self) -> &str {
        self.alg.as_str()
    }

    fn encrypt_content_encryption_key(&self, key: &Key, cek: &[u8]) -> Result<Vec<u8>> {
        let public = key
            .rsa_public_key()
            .ok_or_else(|| key.mismatch(self.algorithm()))?
            .encrypting_key()?;
        let backend_err = |err| JoseError::new(ErrorKind::KeyResolution, err);

        match self.padding {
            Padding::Pkcs1 => {
                let public = Pkcs1PublicEncryptingKey::new(public).map_err(backend_err)?;
                let mut output = vec![0u8; public.ciphertext_size()];
                let len = public.encrypt(cek, &mut output).map_err(backend_err)?.len();
                output.truncate(len);
                Ok(output)
            }
            Padding::Oaep(algorithm) => {
                let public = OaepPublicEncryptingKey::new(public).map_err(backend_err)?;
                let mut output = vec![0u8; public.ciphertext_size()];
                let len = public
                    .encrypt(algorithm, cek, &mut output, None)
                    .map_err(backend_err)?
                    .len();
                output.truncate(len);
                Ok(output)
            }
        }
    }

    fn decrypt_content_encryption_key(
        &self,
        key: &Key,
        encrypted_key: &[u8],
        cek_len: usize,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let Key::RsaPrivate(private) = key else {
            return Err(key.mismatch(self.algorithm()));
        };
        let private = private.decrypting_key()?;

        match self.padding {
            Padding::Pkcs1 => {
                let mut fallback = Zeroizing::new(vec![0u8; cek_len]);
                aws_lc_rs::rand::fill(&mut fallback)
                    .map_err(|err| JoseError::new(ErrorKind::KeyResolution, err))?;

                let private = Pkcs1PrivateDecryptingKey::new(private)
                    .map_err(|err| JoseError::new(ErrorKind::KeyResolution, err))?;
                let mut output = Zeroizing::new(vec![0u8; private.min_output_size()]);
                let cek = match private.decrypt(encrypted_key, &mut output) {
                    Ok(cek) if cek.len() == cek_len => Zeroizing::new(cek.to_vec()),
                    _ => fallback,
                };
                Ok(cek)
            }
            Padding::Oaep(algorithm) => {
                let private = OaepPrivateDecryptingKey::new(private)
                    .map_err(|err| JoseError::new(ErrorKind::KeyResolution, err))?;
                let mut output = Zeroizing::new(vec![0u8; private.min_output_size()]);
                match private.decrypt(algorithm, encrypted_key, &mut output, None) {
                    Ok(cek) if cek.len() == cek_len => Ok(Zeroizing::new(cek.to_vec())),
                    _ => Err(JoseError::cryptographic_failure()),
                }
            }
        }
    }
}
