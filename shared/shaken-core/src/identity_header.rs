//! SIP Identity header grammar (C4): `<JWS>;info=<URL>;alg=ES256;ppt=shaken`.
//!
//! This module only knows about the header *string*; it never touches a SIP
//! message. Structural failures (missing dot, empty segment, missing or
//! malformed parameter) are reported as 438 here. An unreachable `info` URL
//! is a verification-time concern (436) and is not this module's job.

use crate::error::{Result, ShakenError};
use crate::passport::ALG;

/// A parsed Identity header: the three JWS segments plus its parameters.
#[derive(Debug, Clone)]
pub struct IdentityHeader {
    pub header_b64: String,
    pub payload_b64: String,
    pub signature_b64: String,
    pub info_url: String,
    pub alg: String,
    pub ppt: Option<String>,
}

/// Serialize a compact JWS and cert URL into an Identity header value.
pub fn serialize(jws: &str, info_url: &str) -> String {
    format!("{jws};info=<{info_url}>;alg={ALG};ppt=shaken")
}

/// Parse an Identity header value.
///
/// `allow_missing_ppt` permits legacy peers that omit `ppt` (§9); off by
/// default, since the spec treats absent `ppt` on receive as 438.
pub fn parse(raw: &str, allow_missing_ppt: bool) -> Result<IdentityHeader> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ShakenError::InvalidIdentityHeader("empty Identity header".into()));
    }

    let mut segments = raw.split(';');
    let jws = segments
        .next()
        .ok_or_else(|| ShakenError::InvalidIdentityHeader("empty Identity header".into()))?
        .trim();

    let (header_b64, payload_b64, signature_b64) = split_jws(jws)?;

    let mut info_url: Option<String> = None;
    let mut alg: Option<String> = None;
    let mut ppt: Option<String> = None;

    for param in segments {
        let param = param.trim();
        if param.is_empty() {
            continue;
        }
        let (key, value) = param
            .split_once('=')
            .ok_or_else(|| ShakenError::InvalidIdentityHeader(format!("malformed parameter: {param}")))?;
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        match key.as_str() {
            "info" => {
                let stripped = value
                    .strip_prefix('<')
                    .and_then(|v| v.strip_suffix('>'))
                    .ok_or_else(|| {
                        ShakenError::InvalidIdentityHeader("info parameter must be enclosed in <>".into())
                    })?;
                info_url = Some(stripped.to_string());
            }
            "alg" => alg = Some(value.to_string()),
            "ppt" => ppt = Some(value.to_string()),
            _ => {}
        }
    }

    let info_url = info_url.ok_or_else(|| ShakenError::InvalidIdentityHeader("missing info parameter".into()))?;

    let alg = alg.ok_or_else(|| ShakenError::InvalidIdentityHeader("missing alg parameter".into()))?;
    if alg != ALG {
        return Err(ShakenError::InvalidIdentityHeader(format!("unsupported alg: {alg}")));
    }

    match &ppt {
        Some(p) if p == "shaken" => {}
        Some(other) => {
            return Err(ShakenError::InvalidIdentityHeader(format!("unsupported ppt: {other}")))
        }
        None if allow_missing_ppt => {}
        None => return Err(ShakenError::InvalidIdentityHeader("missing ppt parameter".into())),
    }

    Ok(IdentityHeader {
        header_b64,
        payload_b64,
        signature_b64,
        info_url,
        alg,
        ppt,
    })
}

/// Locate the two structural dots and require exactly three non-empty
/// base64url segments.
fn split_jws(jws: &str) -> Result<(String, String, String)> {
    let mut parts = jws.splitn(3, '.');
    let header = parts.next().unwrap_or("");
    let payload = parts
        .next()
        .ok_or_else(|| ShakenError::InvalidIdentityHeader("missing structural dot".into()))?;
    let signature = parts
        .next()
        .ok_or_else(|| ShakenError::InvalidIdentityHeader("missing structural dot".into()))?;

    if header.is_empty() || payload.is_empty() || signature.is_empty() {
        return Err(ShakenError::InvalidIdentityHeader(
            "JWS segment must have three non-empty parts".into(),
        ));
    }

    Ok((header.to_string(), payload.to_string(), signature.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_then_serialize_round_trips() {
        let jws = "eHh4.eXl5.enp6";
        let url = "https://sp.example/sp.pem";
        let header = serialize(jws, url);
        let parsed = parse(&header, false).unwrap();
        assert_eq!(parsed.info_url, url);
        assert_eq!(format!("{}.{}.{}", parsed.header_b64, parsed.payload_b64, parsed.signature_b64), jws);
    }

    #[test]
    fn missing_second_dot_rejected_as_structural() {
        let header = "eHh4.eXl5;info=<https://sp.example/sp.pem>;alg=ES256;ppt=shaken";
        let err = parse(header, false).unwrap_err();
        assert_eq!(err.sip_status(), 438);
    }

    #[test]
    fn empty_middle_segment_rejected() {
        let header = "eHh4..enp6;info=<https://sp.example/sp.pem>;alg=ES256;ppt=shaken";
        let err = parse(header, false).unwrap_err();
        assert_eq!(err.sip_status(), 438);
    }

    #[test]
    fn missing_ppt_rejected_by_default_but_tolerated_under_flag() {
        let header = "eHh4.eXl5.enp6;info=<https://sp.example/sp.pem>;alg=ES256";
        assert_eq!(parse(header, false).unwrap_err().sip_status(), 438);
        assert!(parse(header, true).is_ok());
    }

    #[test]
    fn unsupported_alg_rejected() {
        let header = "eHh4.eXl5.enp6;info=<https://sp.example/sp.pem>;alg=RS256;ppt=shaken";
        let err = parse(header, false).unwrap_err();
        assert_eq!(err.sip_status(), 438);
    }
}
