use crate::{ClaimsSet, Header};

#[derive(Debug, Clone, PartialEq)]
/// Unsecured JWT: `b64(header).b64(claims).`
pub struct PlainJwt {
    header: Header,
    claims: ClaimsSet,
}

impl PlainJwt {
    pub(crate) fn new(header: Header, claims: ClaimsSet) -> Self {
        Self { header, claims }
    }

    /// Header of the token.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Claims of the token.
    ///
    /// Nothing protects these claims, they can be changed by anyone.
    pub fn claims(&self) -> &ClaimsSet {
        &self.claims
    }

    /// Consume the token into its claims.
    pub fn into_claims(self) -> ClaimsSet {
        self.claims
    }
}
