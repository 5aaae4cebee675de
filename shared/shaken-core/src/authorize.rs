//! Authentication Service (C5): orchestrates C3+C4 to produce a SIP Identity
//! header from call parameters, a signing key, and a certificate.

use p256::ecdsa::SigningKey;

use crate::error::Result;
use crate::identity_header;
use crate::passport::{self, PassportClaims, PassportParams, SignedPassport};

/// Result of `authorize_keep_passport`: the emitted header plus the signed
/// PASSporT object, for callers that want to log or re-serialize it.
pub struct AuthorizeResult {
    pub identity_header: String,
    pub passport: SignedPassport,
}

/// Build, sign, and package a PASSporT as a SIP Identity header (§4.5).
pub fn authorize(params: &PassportParams, signing_key: &SigningKey, cert_x5u: &str) -> Result<String> {
    let signed = passport::sign(params, signing_key)?;
    Ok(identity_header::serialize(&signed.compact(), cert_x5u))
}

/// Same as `authorize`, but also returns the signed PASSporT object.
pub fn authorize_keep_passport(
    params: &PassportParams,
    signing_key: &SigningKey,
    cert_x5u: &str,
) -> Result<AuthorizeResult> {
    let signed = passport::sign(params, signing_key)?;
    let identity_header = identity_header::serialize(&signed.compact(), cert_x5u);
    Ok(AuthorizeResult {
        identity_header,
        passport: signed,
    })
}

/// Convenience: recover typed claims from a just-signed PASSporT without a
/// round trip through the wire format. Useful for callers that want to log
/// the claims they just emitted.
pub fn claims_of(signed: &SignedPassport) -> Result<PassportClaims> {
    let policy = passport::VerifyPolicy::default();
    passport::verify_payload_claims(&signed.payload, signed.payload["iat"].as_i64().unwrap_or(0), &policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::passport::{DestIdentity, OrigIdentity};

    #[test]
    fn authorize_emits_well_formed_identity_header() {
        let kp = KeyPair::generate().unwrap();
        let params = PassportParams::new(
            "https://sp.example/sp.pem",
            OrigIdentity::Tn("01256789999".into()),
            DestIdentity::Tn(vec!["01256500600".into()]),
            1577836800,
        );

        let header = authorize(&params, &kp.signing_key, "https://sp.example/sp.pem").unwrap();
        assert!(header.contains(";info=<https://sp.example/sp.pem>"));
        assert!(header.contains(";alg=ES256"));
        assert!(header.contains(";ppt=shaken"));
        assert_eq!(header.matches('.').count(), 2);
    }

    #[test]
    fn authorize_keep_passport_returns_claims_matching_params() {
        let kp = KeyPair::generate().unwrap();
        let params = PassportParams::new(
            "https://sp.example/sp.pem",
            OrigIdentity::Tn("01256789999".into()),
            DestIdentity::Tn(vec!["01256500600".into()]),
            1577836800,
        );

        let result = authorize_keep_passport(&params, &kp.signing_key, "https://sp.example/sp.pem").unwrap();
        let claims = claims_of(&result.passport).unwrap();
        assert_eq!(claims.orig, OrigIdentity::Tn("01256789999".into()));
        assert_eq!(claims.dest, DestIdentity::Tn(vec!["01256500600".into()]));
    }
}
