//! X.509 engine (C2): CSR generation, CA self-signed issuance, end-entity
//! issuance from a CSR, the TNAuthList extension (RFC 8226), OpenSSL-style
//! subject-hash filenames, and RFC 5280 basic chain validation.
//!
//! TNAuthList (OID 1.3.6.1.5.5.7.1.26) is, per RFC 8226 §9, a SEQUENCE of
//! TNEntry CHOICEs (SPC, TN range, or single TN). This module carries the
//! simpler shape the rest of this crate's interfaces already assume — one
//! IA5String value, the `tn_auth_list_uri` the tooling and the orchestration
//! layer pass around — encoded as a minimal DER IA5String TLV rather than
//! the full TNEntry grammar.

use rcgen::{
    BasicConstraints, Certificate, CertificateParams, CertificateSigningRequestParams,
    CustomExtension, DistinguishedName, DnType, IsCa, KeyPair as RcgenKeyPair, KeyUsagePurpose,
};
use sha1::{Digest as Sha1Digest, Sha1};
use time::{Duration, OffsetDateTime};
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::ParsedExtension;
use x509_parser::oid_registry::asn1_rs::Oid;
use x509_parser::prelude::FromDer;
use x509_parser::revocation_list::CertificateRevocationList;

use crate::crypto::KeyPair;
use crate::error::{Result, ShakenError};

/// DER-encoded arcs of 1.3.6.1.5.5.7.1.26 (RFC 8226 §9), the TNAuthList
/// extension OID.
const TN_AUTH_LIST_OID_DER: &[u8] = &[0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x01, 0x1A];

/// 1.3.6.1.5.5.7.1.26, RFC 8226 §9.
pub fn tn_auth_list_oid() -> Oid<'static> {
    Oid::new(std::borrow::Cow::Borrowed(TN_AUTH_LIST_OID_DER))
}

const TN_AUTH_LIST_OID: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 1, 26];

fn encode_ia5string(s: &str) -> Vec<u8> {
    der_tlv(0x16, s.as_bytes())
}

fn encode_der_length(len: usize, out: &mut Vec<u8>) {
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let len_bytes = len.to_be_bytes();
        let first_nonzero = len_bytes.iter().position(|&b| b != 0).unwrap_or(len_bytes.len() - 1);
        let significant = &len_bytes[first_nonzero..];
        out.push(0x80 | significant.len() as u8);
        out.extend_from_slice(significant);
    }
}

/// Build a DER tag-length-value for `tag` over `content`.
fn der_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    encode_der_length(content.len(), &mut out);
    out.extend_from_slice(content);
    out
}

fn decode_ia5string(content: &[u8]) -> Result<String> {
    if content.len() < 2 || content[0] != 0x16 {
        return Err(ShakenError::UnsupportedCredential(
            "TNAuthList extension is not an IA5String TLV".into(),
        ));
    }
    let len = content[1] as usize;
    let (value, rest) = if len < 0x80 {
        (&content[2..], 2)
    } else {
        let n_len_bytes = (len & 0x7f) as usize;
        let mut actual_len = 0usize;
        for &b in &content[2..2 + n_len_bytes] {
            actual_len = (actual_len << 8) | b as usize;
        }
        (&content[2 + n_len_bytes..], 2 + n_len_bytes)
    };
    let _ = rest;
    std::str::from_utf8(value)
        .map(str::to_string)
        .map_err(|e| ShakenError::UnsupportedCredential(format!("TNAuthList value is not UTF-8: {e}")))
}

fn rcgen_key_pair_from(key_pair: &KeyPair) -> Result<RcgenKeyPair> {
    let secret = p256::SecretKey::from(key_pair.signing_key.clone());
    let pkcs8_der = p256::pkcs8::EncodePrivateKey::to_pkcs8_der(&secret)
        .map_err(|e| ShakenError::CryptoError(format!("failed to encode key for rcgen: {e}")))?;
    RcgenKeyPair::from_der(pkcs8_der.as_bytes())
        .map_err(|e| ShakenError::CryptoError(format!("rcgen rejected keypair: {e}")))
}

fn subject_distinguished_name(country: &str, common_name: &str) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CountryName, country);
    dn.push(DnType::CommonName, common_name);
    dn
}

/// Result of issuing a certificate: DER and PEM forms plus the signer's
/// private key PEM (useful immediately after issuing a CA cert).
pub struct IssuedCert {
    pub der: Vec<u8>,
    pub pem: String,
}

/// Parameters for self-signed CA issuance.
pub struct CaCertParams<'a> {
    pub issuer_c: &'a str,
    pub issuer_cn: &'a str,
    pub serial: u64,
    pub validity_days: i64,
}

/// Issue a self-signed CA certificate (§4.2).
pub fn issue_ca_cert(key_pair: &KeyPair, params: &CaCertParams) -> Result<IssuedCert> {
    let rcgen_kp = rcgen_key_pair_from(key_pair)?;

    let mut cert_params = CertificateParams::default();
    cert_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    cert_params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
    cert_params.distinguished_name = subject_distinguished_name(params.issuer_c, params.issuer_cn);
    cert_params.serial_number = Some(rcgen::SerialNumber::from_slice(&params.serial.to_be_bytes()));
    cert_params.not_before = OffsetDateTime::now_utc();
    cert_params.not_after = OffsetDateTime::now_utc() + Duration::days(params.validity_days);

    let cert = cert_params
        .self_signed(&rcgen_kp)
        .map_err(|e| ShakenError::CryptoError(format!("CA self-sign failed: {e}")))?;

    Ok(IssuedCert {
        der: cert.der().to_vec(),
        pem: cert.pem(),
    })
}

/// Generate a CSR carrying the subject and a TNAuthList request attribute
/// encoding `spc` (§4.2).
pub fn generate_csr(key_pair: &KeyPair, subject_c: &str, subject_cn: &str, spc: u32) -> Result<String> {
    let rcgen_kp = rcgen_key_pair_from(key_pair)?;

    let mut cert_params = CertificateParams::default();
    cert_params.distinguished_name = subject_distinguished_name(subject_c, subject_cn);
    cert_params
        .custom_extensions
        .push(CustomExtension::from_oid_content(TN_AUTH_LIST_OID, encode_ia5string(&spc.to_string())));

    let csr = cert_params
        .serialize_request(&rcgen_kp)
        .map_err(|e| ShakenError::CryptoError(format!("CSR generation failed: {e}")))?;

    Ok(csr.pem())
}

/// Parameters for issuing an end-entity certificate from a CSR.
pub struct SpCertParams<'a> {
    pub issuer_c: &'a str,
    pub issuer_cn: &'a str,
    pub serial: u64,
    pub validity_days: i64,
    pub tn_auth_list_uri: &'a str,
}

/// Issue an end-entity certificate from a CSR, signed by `ca_cert`/`ca_key`
/// (§4.2). Verifies the CSR's own signature implicitly (rcgen rejects a CSR
/// whose embedded signature does not match its content), copies the CSR's
/// subject, and embeds the TNAuthList extension.
pub fn issue_sp_cert(ca_cert_der: &[u8], ca_key: &KeyPair, csr_pem: &str, params: &SpCertParams) -> Result<IssuedCert> {
    let ca_cert_der_wrapped = rcgen::CertificateDer::from(ca_cert_der);
    let ca_params = CertificateParams::from_ca_cert_der(&ca_cert_der_wrapped, rcgen_key_pair_from(ca_key)?)
        .map_err(|e| ShakenError::UnsupportedCredential(format!("malformed CA certificate: {e}")))?;
    let rcgen_ca_key = rcgen_key_pair_from(ca_key)?;
    let ca_cert = ca_params
        .self_signed(&rcgen_ca_key)
        .map_err(|e| ShakenError::CryptoError(format!("failed to reload CA certificate: {e}")))?;

    let mut csr_params = CertificateSigningRequestParams::from_pem(csr_pem)
        .map_err(|e| ShakenError::InvalidIdentityHeader(format!("malformed CSR: {e}")))?;

    csr_params
        .params
        .custom_extensions
        .push(CustomExtension::from_oid_content(
            TN_AUTH_LIST_OID,
            encode_ia5string(params.tn_auth_list_uri),
        ));
    csr_params.params.serial_number = Some(rcgen::SerialNumber::from_slice(&params.serial.to_be_bytes()));
    csr_params.params.not_before = OffsetDateTime::now_utc();
    csr_params.params.not_after = OffsetDateTime::now_utc() + Duration::days(params.validity_days);

    let _ = (params.issuer_c, params.issuer_cn); // issuer identity comes from `ca_cert`'s own subject

    let cert = csr_params
        .signed_by(&ca_cert, &rcgen_ca_key)
        .map_err(|e| ShakenError::CryptoError(format!("CSR signing failed: {e}")))?;

    Ok(IssuedCert {
        der: cert.der().to_vec(),
        pem: cert.pem(),
    })
}

/// Normalize PEM-or-DER certificate bytes to DER, auto-detecting the form
/// (§6, "Wire formats"). Shared by the verification path and by anything
/// loading certs from disk or off the wire.
pub fn pem_or_der_to_der(bytes: &[u8]) -> Result<Vec<u8>> {
    if bytes.starts_with(b"-----BEGIN") {
        let (_, pem) = x509_parser::pem::parse_x509_pem(bytes)
            .map_err(|e| ShakenError::UnsupportedCredential(format!("malformed certificate PEM: {e}")))?;
        Ok(pem.contents)
    } else {
        Ok(bytes.to_vec())
    }
}

/// Compute the OpenSSL-compatible subject-hash filename (`<8-hex>.0`) for a
/// certificate's subject name.
///
/// OpenSSL's `X509_NAME_hash` (what `c_rehash` and every STIR/SHAKEN trust
/// directory key on) does not hash the subject's as-encoded DER — it hashes
/// a *canonical* re-encoding: each attribute value is converted to UTF8,
/// leading/trailing whitespace is trimmed, internal whitespace runs collapse
/// to a single space, and ASCII letters are lowercased, before DER-encoding
/// the name back with those canonical values (RFC 5280 §7.1). Hashing the
/// raw TLV here would silently disagree with OpenSSL for any subject whose
/// input had different casing or spacing, defeating the whole point of the
/// filename convention.
pub fn subject_hash_filename(cert_der: &[u8]) -> Result<String> {
    let (_, cert) =
        X509Certificate::from_der(cert_der).map_err(|e| ShakenError::UnsupportedCredential(format!("malformed certificate: {e:?}")))?;
    let canonical = canonical_name_der(cert.subject())?;
    let mut hasher = Sha1::new();
    hasher.update(&canonical);
    let digest = hasher.finalize();
    let hash_u32 = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
    Ok(format!("{hash_u32:08x}.0"))
}

/// Re-encode `name` the way OpenSSL's `x509_name_canon` does: per RDN, per
/// attribute, canonicalize the string value and re-emit it as `UTF8String`,
/// preserving the original attribute-type OID and RDN/ATV grouping. Used
/// only to compute the subject-hash filename above — never for anything the
/// signature covers.
fn canonical_name_der(name: &x509_parser::x509::X509Name) -> Result<Vec<u8>> {
    let mut rdns_der = Vec::new();
    for rdn in name.iter_rdn() {
        let mut atv_ders: Vec<Vec<u8>> = Vec::new();
        for atv in rdn.iter() {
            let value = atv.as_str().map_err(|e| {
                ShakenError::UnsupportedCredential(format!("unsupported subject attribute value: {e}"))
            })?;
            let canonical_value = canonicalize_directory_string(value);
            let atv_content = [
                der_tlv(0x06, atv.attr_type().as_bytes()),
                der_tlv(0x0C, canonical_value.as_bytes()),
            ]
            .concat();
            atv_ders.push(der_tlv(0x30, &atv_content));
        }
        // DER SET OF requires elements sorted by their encoding; a no-op for
        // the single-valued RDNs this module issues but correct for any
        // multi-valued RDN a loaded certificate might carry.
        atv_ders.sort();
        rdns_der.push(der_tlv(0x31, &atv_ders.concat()));
    }
    Ok(der_tlv(0x30, &rdns_der.concat()))
}

/// OpenSSL's canonical directory-string form: trim leading/trailing ASCII
/// whitespace, collapse internal whitespace runs to one space, lowercase
/// ASCII letters. Non-ASCII bytes pass through unchanged.
fn canonicalize_directory_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for c in s.trim().chars() {
        if c.is_ascii_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(c.to_ascii_lowercase());
            prev_space = false;
        }
    }
    out
}

/// Outcome of RFC 5280 basic path validation against a trust-roots set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    Ok,
    Untrusted,
    Revoked,
    Expired,
    NotYetValid,
    MalformedCert,
    MissingTnAuthList,
    /// The certificate advertises a CRL distribution point but no CRL
    /// matching its issuer was supplied, under `require_crl_when_published`.
    CrlUnavailable,
}

/// Chain-validation policy knobs.
#[derive(Debug, Clone, Copy)]
pub struct ChainPolicy {
    /// If true, a CA with a CRL directory entry but no matching CRL for the
    /// candidate cert is rejected. Default per §4.2: reject.
    pub require_crl_when_published: bool,
}

impl Default for ChainPolicy {
    fn default() -> Self {
        Self {
            require_crl_when_published: true,
        }
    }
}

/// Validate `cert_der` against `trust_roots` (self-signed CA certs, DER) and
/// optional `crls` (DER-encoded CRLs). Returns the outcome and, on success,
/// the TNAuthList URI extracted from the certificate.
pub fn validate_chain(
    cert_der: &[u8],
    trust_roots: &[Vec<u8>],
    crls: &[Vec<u8>],
    policy: &ChainPolicy,
) -> Result<(ChainOutcome, Option<String>)> {
    let (_, cert) = match X509Certificate::from_der(cert_der) {
        Ok(parsed) => parsed,
        Err(_) => return Ok((ChainOutcome::MalformedCert, None)),
    };

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    if now < cert.validity().not_before.timestamp() {
        return Ok((ChainOutcome::NotYetValid, None));
    }
    if now > cert.validity().not_after.timestamp() {
        return Ok((ChainOutcome::Expired, None));
    }

    let mut issuer_cert: Option<X509Certificate> = None;
    for root_der in trust_roots {
        if let Ok((_, root)) = X509Certificate::from_der(root_der) {
            if root.subject() == cert.issuer() {
                issuer_cert = Some(root);
                break;
            }
        }
    }
    let issuer_cert = match issuer_cert {
        Some(c) => c,
        None => return Ok((ChainOutcome::Untrusted, None)),
    };

    if cert.verify_signature(Some(issuer_cert.public_key())).is_err() {
        return Ok((ChainOutcome::Untrusted, None));
    }

    let mut matching_crl_found = false;
    for crl_der in crls {
        if let Ok((_, crl)) = CertificateRevocationList::from_der(crl_der) {
            if crl.issuer() == issuer_cert.subject() {
                matching_crl_found = true;
                for revoked in crl.iter_revoked_certificates() {
                    if revoked.raw_serial() == cert.raw_serial() {
                        return Ok((ChainOutcome::Revoked, None));
                    }
                }
            }
        }
    }

    if policy.require_crl_when_published && !matching_crl_found && advertises_crl_distribution_point(&cert) {
        return Ok((ChainOutcome::CrlUnavailable, None));
    }

    let tn_auth_list_uri = match cert.get_extension_unique(&tn_auth_list_oid()) {
        Ok(Some(ext)) => match ext.parsed_extension() {
            ParsedExtension::UnsupportedExtension { .. } | ParsedExtension::Unparsed => {
                Some(decode_ia5string(ext.value)?)
            }
            _ => Some(decode_ia5string(ext.value)?),
        },
        Ok(None) => None,
        Err(_) => None,
    };

    if tn_auth_list_uri.is_none() {
        return Ok((ChainOutcome::MissingTnAuthList, None));
    }

    Ok((ChainOutcome::Ok, tn_auth_list_uri))
}

/// Whether `cert` carries a CRL Distribution Points extension (OID
/// 2.5.29.31, RFC 5280 §4.2.1.13) — i.e. whether its issuer publishes a CRL
/// this cert should be checked against.
fn advertises_crl_distribution_point(cert: &X509Certificate) -> bool {
    cert.extensions()
        .iter()
        .any(|ext| matches!(ext.parsed_extension(), ParsedExtension::CRLDistributionPoints(_)))
}

/// Map a chain outcome to a `ShakenError`, per §4.2.
pub fn outcome_to_error(outcome: ChainOutcome) -> Option<ShakenError> {
    match outcome {
        ChainOutcome::Ok => None,
        ChainOutcome::Untrusted => Some(ShakenError::UnsupportedCredential("untrusted issuer".into())),
        ChainOutcome::Revoked => Some(ShakenError::UnsupportedCredential("certificate revoked".into())),
        ChainOutcome::Expired => Some(ShakenError::UnsupportedCredential("certificate expired".into())),
        ChainOutcome::NotYetValid => Some(ShakenError::UnsupportedCredential("certificate not yet valid".into())),
        ChainOutcome::MalformedCert => Some(ShakenError::UnsupportedCredential("malformed certificate".into())),
        ChainOutcome::MissingTnAuthList => {
            Some(ShakenError::InvalidIdentityHeader("certificate missing TNAuthList extension".into()))
        }
        ChainOutcome::CrlUnavailable => Some(ShakenError::UnsupportedCredential(
            "no CRL available for a certificate whose issuer publishes one".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ia5string_round_trips() {
        let encoded = encode_ia5string("https://sp.example/tn-auth.json");
        let decoded = decode_ia5string(&encoded).unwrap();
        assert_eq!(decoded, "https://sp.example/tn-auth.json");
    }

    #[test]
    fn issue_ca_cert_and_compute_subject_hash() {
        let kp = KeyPair::generate().unwrap();
        let ca = issue_ca_cert(
            &kp,
            &CaCertParams {
                issuer_c: "US",
                issuer_cn: "Example Root CA",
                serial: 1,
                validity_days: 3650,
            },
        )
        .unwrap();
        let filename = subject_hash_filename(&ca.der).unwrap();
        assert!(filename.ends_with(".0"));
        assert_eq!(filename.len(), 10);
    }

    #[test]
    fn csr_then_issued_cert_carries_tn_auth_list() {
        let ca_kp = KeyPair::generate().unwrap();
        let ca = issue_ca_cert(
            &ca_kp,
            &CaCertParams {
                issuer_c: "US",
                issuer_cn: "Example Root CA",
                serial: 1,
                validity_days: 3650,
            },
        )
        .unwrap();

        let sp_kp = KeyPair::generate().unwrap();
        let csr_pem = generate_csr(&sp_kp, "US", "Example SP", 1234).unwrap();

        let sp_cert = issue_sp_cert(
            &ca.der,
            &ca_kp,
            &csr_pem,
            &SpCertParams {
                issuer_c: "US",
                issuer_cn: "Example Root CA",
                serial: 2,
                validity_days: 365,
                tn_auth_list_uri: "https://sp.example/tn-auth.json",
            },
        )
        .unwrap();

        let (outcome, uri) = validate_chain(&sp_cert.der, &[ca.der.clone()], &[], &ChainPolicy::default()).unwrap();
        assert_eq!(outcome, ChainOutcome::Ok);
        assert_eq!(uri.as_deref(), Some("https://sp.example/tn-auth.json"));
    }

    #[test]
    fn validate_chain_rejects_unknown_issuer() {
        let kp = KeyPair::generate().unwrap();
        let ca = issue_ca_cert(
            &kp,
            &CaCertParams {
                issuer_c: "US",
                issuer_cn: "Example Root CA",
                serial: 1,
                validity_days: 3650,
            },
        )
        .unwrap();

        let (outcome, _) = validate_chain(&ca.der, &[], &[], &ChainPolicy::default()).unwrap();
        assert_eq!(outcome, ChainOutcome::Untrusted);
    }

    #[test]
    fn subject_hash_ignores_case_and_whitespace() {
        let kp_a = KeyPair::generate().unwrap();
        let ca_a = issue_ca_cert(
            &kp_a,
            &CaCertParams {
                issuer_c: "US",
                issuer_cn: "Example Root CA",
                serial: 1,
                validity_days: 3650,
            },
        )
        .unwrap();

        let kp_b = KeyPair::generate().unwrap();
        let ca_b = issue_ca_cert(
            &kp_b,
            &CaCertParams {
                issuer_c: "US",
                issuer_cn: "EXAMPLE   root   ca",
                serial: 1,
                validity_days: 3650,
            },
        )
        .unwrap();

        // Different keys and serials, same subject up to case/whitespace: the
        // canonical hash must agree even though the raw subject DER bytes
        // differ byte-for-byte.
        assert_eq!(subject_hash_filename(&ca_a.der).unwrap(), subject_hash_filename(&ca_b.der).unwrap());
    }

    #[test]
    fn cert_without_crl_distribution_point_is_not_flagged() {
        let ca_kp = KeyPair::generate().unwrap();
        let ca = issue_ca_cert(
            &ca_kp,
            &CaCertParams {
                issuer_c: "US",
                issuer_cn: "Example Root CA",
                serial: 1,
                validity_days: 3650,
            },
        )
        .unwrap();
        let (_, cert) = X509Certificate::from_der(&ca.der).unwrap();
        assert!(!advertises_crl_distribution_point(&cert));
    }

    /// Builds an end-entity cert carrying both the TNAuthList extension and a
    /// CRL Distribution Points extension with a single URI distribution
    /// point, bypassing `generate_csr`/`issue_sp_cert` (neither accepts
    /// extra custom extensions).
    fn issue_sp_cert_with_crl_distribution_point(
        ca_cert_der: &[u8],
        ca_key: &KeyPair,
        sp_key: &KeyPair,
        tn_auth_list_uri: &str,
    ) -> IssuedCert {
        let ca_cert_der_wrapped = rcgen::CertificateDer::from(ca_cert_der);
        let ca_params = CertificateParams::from_ca_cert_der(&ca_cert_der_wrapped, rcgen_key_pair_from(ca_key).unwrap()).unwrap();
        let rcgen_ca_key = rcgen_key_pair_from(ca_key).unwrap();
        let ca_cert = ca_params.self_signed(&rcgen_ca_key).unwrap();

        let uri_ga = der_tlv(0x86, b"http://crl.example/ca.crl");
        let fullname = der_tlv(0xA0, &uri_ga);
        let distribution_point_name = der_tlv(0xA0, &fullname);
        let distribution_point = der_tlv(0x30, &distribution_point_name);
        let crl_distribution_points = der_tlv(0x30, &distribution_point);

        let rcgen_sp_key = rcgen_key_pair_from(sp_key).unwrap();
        let mut cert_params = CertificateParams::default();
        cert_params.distinguished_name = subject_distinguished_name("US", "Example SP");
        cert_params
            .custom_extensions
            .push(CustomExtension::from_oid_content(TN_AUTH_LIST_OID, encode_ia5string(tn_auth_list_uri)));
        cert_params
            .custom_extensions
            .push(CustomExtension::from_oid_content(&[2, 5, 29, 31], crl_distribution_points));
        cert_params.serial_number = Some(rcgen::SerialNumber::from_slice(&2u64.to_be_bytes()));
        cert_params.not_before = OffsetDateTime::now_utc();
        cert_params.not_after = OffsetDateTime::now_utc() + Duration::days(365);

        let cert = cert_params.signed_by(&rcgen_sp_key, &ca_cert, &rcgen_ca_key).unwrap();
        IssuedCert {
            der: cert.der().to_vec(),
            pem: cert.pem(),
        }
    }

    #[test]
    fn validate_chain_rejects_missing_crl_when_distribution_point_advertised() {
        let ca_kp = KeyPair::generate().unwrap();
        let ca = issue_ca_cert(
            &ca_kp,
            &CaCertParams {
                issuer_c: "US",
                issuer_cn: "Example Root CA",
                serial: 1,
                validity_days: 3650,
            },
        )
        .unwrap();
        let sp_kp = KeyPair::generate().unwrap();
        let sp_cert = issue_sp_cert_with_crl_distribution_point(&ca.der, &ca_kp, &sp_kp, "https://sp.example/tn-auth.json");

        let (outcome, _) =
            validate_chain(&sp_cert.der, &[ca.der.clone()], &[], &ChainPolicy::default()).unwrap();
        assert_eq!(outcome, ChainOutcome::CrlUnavailable);

        let lenient = ChainPolicy {
            require_crl_when_published: false,
        };
        let (outcome, uri) = validate_chain(&sp_cert.der, &[ca.der], &[], &lenient).unwrap();
        assert_eq!(outcome, ChainOutcome::Ok);
        assert_eq!(uri.as_deref(), Some("https://sp.example/tn-auth.json"));
    }
}
