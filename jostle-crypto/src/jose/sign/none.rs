use crate::{Result, jose::SigningHandler};

#[derive(Debug, Clone, Copy, Default)]
/// Handler for unsecured JWS (`alg: none`).
///
/// Produces and only accepts an empty signature.
pub struct NoneSigningHandler;

impl SigningHandler for NoneSigningHandler {
    fn algorithm(&self) -> &str {
        "none"
    }

    fn sign(&self, _data: &[u8]) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn verify(&self, _data: &[u8], signature: &[u8]) -> bool {
        signature.is_empty()
    }
}
