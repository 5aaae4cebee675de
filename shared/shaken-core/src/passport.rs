//! PASSporT claim model, canonical JSON, and JWS sign/verify (C3).
//!
//! Canonical JSON is produced via `serde_json::Value`, whose default map
//! type serializes keys in sorted order. That sorted order is deterministic
//! and, for the payload shape this module emits, happens to coincide with
//! the literal byte sequence RFC 8225 examples show — but the only thing
//! that actually matters is that the bytes signed are the exact bytes
//! transmitted; this module never re-serializes received JSON to verify it.

use p256::ecdsa::SigningKey;
use serde_json::{Map, Value};

use crate::crypto;
use crate::error::{Result, ShakenError};

pub const ALG: &str = "ES256";
pub const TYP: &str = "passport";
pub const PPT: &str = "shaken";

/// `orig` identity: always a single entry, `tn` scalar or `uri` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrigIdentity {
    Tn(String),
    Uri(Vec<String>),
}

/// `dest` identity: always an array value, regardless of key (RFC 8588 §5.2.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestIdentity {
    Tn(Vec<String>),
    Uri(Vec<String>),
}

/// Inputs to build one PASSporT.
#[derive(Debug, Clone)]
pub struct PassportParams {
    pub x5u: String,
    pub attest: Option<String>,
    pub orig: OrigIdentity,
    pub dest: DestIdentity,
    pub iat: i64,
    pub origid: Option<String>,
    /// Present unless the caller explicitly wants `ppt` omitted (non-default).
    pub ppt: Option<String>,
}

impl PassportParams {
    pub fn new(x5u: impl Into<String>, orig: OrigIdentity, dest: DestIdentity, iat: i64) -> Self {
        Self {
            x5u: x5u.into(),
            attest: None,
            orig,
            dest,
            iat,
            origid: None,
            ppt: Some(PPT.to_string()),
        }
    }
}

/// Claims recovered from a verified (or merely parsed) PASSporT.
#[derive(Debug, Clone, PartialEq)]
pub struct PassportClaims {
    pub attest: Option<String>,
    pub orig: OrigIdentity,
    pub dest: DestIdentity,
    pub iat: i64,
    pub origid: Option<String>,
}

/// A signed PASSporT: the two canonical JSON objects plus their base64url
/// segments and the raw signature bytes, as actually transmitted.
#[derive(Debug, Clone)]
pub struct SignedPassport {
    pub header: Value,
    pub payload: Value,
    pub header_b64: String,
    pub payload_b64: String,
    pub signature_b64: String,
}

impl SignedPassport {
    /// Compact JWS form `H.P.S`.
    pub fn compact(&self) -> String {
        format!("{}.{}.{}", self.header_b64, self.payload_b64, self.signature_b64)
    }
}

fn orig_to_json(orig: &OrigIdentity) -> Value {
    let mut map = Map::new();
    match orig {
        OrigIdentity::Tn(v) => {
            map.insert("tn".to_string(), Value::String(v.clone()));
        }
        OrigIdentity::Uri(v) => {
            map.insert(
                "uri".to_string(),
                Value::Array(v.iter().cloned().map(Value::String).collect()),
            );
        }
    }
    Value::Object(map)
}

fn dest_to_json(dest: &DestIdentity) -> Value {
    let mut map = Map::new();
    match dest {
        DestIdentity::Tn(v) => {
            map.insert(
                "tn".to_string(),
                Value::Array(v.iter().cloned().map(Value::String).collect()),
            );
        }
        DestIdentity::Uri(v) => {
            map.insert(
                "uri".to_string(),
                Value::Array(v.iter().cloned().map(Value::String).collect()),
            );
        }
    }
    Value::Object(map)
}

/// Build the header and payload objects from `params` (§3, §4.3).
pub fn build(params: &PassportParams) -> (Value, Value) {
    let mut header = Map::new();
    header.insert("alg".to_string(), Value::String(ALG.to_string()));
    header.insert("typ".to_string(), Value::String(TYP.to_string()));
    if let Some(ppt) = &params.ppt {
        header.insert("ppt".to_string(), Value::String(ppt.clone()));
    }
    header.insert("x5u".to_string(), Value::String(params.x5u.clone()));

    let mut payload = Map::new();
    if let Some(attest) = &params.attest {
        payload.insert("attest".to_string(), Value::String(attest.clone()));
    }
    payload.insert("dest".to_string(), dest_to_json(&params.dest));
    payload.insert("iat".to_string(), Value::Number(params.iat.into()));
    payload.insert("orig".to_string(), orig_to_json(&params.orig));
    if let Some(origid) = &params.origid {
        payload.insert("origid".to_string(), Value::String(origid.clone()));
    }

    (Value::Object(header), Value::Object(payload))
}

fn canonical_json(value: &Value) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| ShakenError::GeneralError(format!("failed to serialize claims: {e}")))
}

/// Build, canonically encode, and sign a PASSporT (C1 + C3).
pub fn sign(params: &PassportParams, signing_key: &SigningKey) -> Result<SignedPassport> {
    let (header, payload) = build(params);
    let header_b64 = crypto::b64url_encode(canonical_json(&header)?.as_bytes());
    let payload_b64 = crypto::b64url_encode(canonical_json(&payload)?.as_bytes());
    let signing_input = format!("{header_b64}.{payload_b64}");
    let sig = crypto::sign(signing_key, signing_input.as_bytes())?;
    let signature_b64 = crypto::b64url_encode(&sig);

    Ok(SignedPassport {
        header,
        payload,
        header_b64,
        payload_b64,
        signature_b64,
    })
}

/// The ASCII bytes that were (or must be) signed: `H + "." + P`, exactly as
/// received — this function never re-serializes parsed JSON back to bytes.
pub fn signing_input(header_b64: &str, payload_b64: &str) -> Vec<u8> {
    format!("{header_b64}.{payload_b64}").into_bytes()
}

/// Decode a base64url JSON segment into a `Value`.
pub fn decode_json_segment(b64: &str) -> Result<Value> {
    let bytes = crypto::b64url_decode(b64)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ShakenError::InvalidIdentityHeader(format!("malformed JSON: {e}")))
}

/// Policy knobs governing receive-side leniency for legacy peers (§9).
#[derive(Debug, Clone, Copy)]
pub struct VerifyPolicy {
    pub freshness_window_secs: i64,
    pub allow_missing_ppt: bool,
    pub allow_scalar_dest_tn: bool,
}

impl Default for VerifyPolicy {
    fn default() -> Self {
        Self {
            freshness_window_secs: 60,
            allow_missing_ppt: false,
            allow_scalar_dest_tn: false,
        }
    }
}

/// Validate header invariants (§3) and return the `x5u` value.
pub fn verify_header_claims(header: &Value, policy: &VerifyPolicy) -> Result<String> {
    let obj = header
        .as_object()
        .ok_or_else(|| ShakenError::InvalidIdentityHeader("header is not a JSON object".into()))?;

    match obj.get("alg").and_then(Value::as_str) {
        Some(ALG) => {}
        _ => return Err(ShakenError::InvalidIdentityHeader("alg must be ES256".into())),
    }

    match obj.get("typ").and_then(Value::as_str) {
        Some(TYP) => {}
        _ => return Err(ShakenError::InvalidIdentityHeader("typ must be passport".into())),
    }

    match obj.get("ppt").and_then(Value::as_str) {
        Some(PPT) => {}
        Some(other) => {
            return Err(ShakenError::InvalidIdentityHeader(format!(
                "unsupported ppt: {other}"
            )))
        }
        None if policy.allow_missing_ppt => {}
        None => return Err(ShakenError::InvalidIdentityHeader("missing ppt".into())),
    }

    let x5u = obj
        .get("x5u")
        .and_then(Value::as_str)
        .ok_or_else(|| ShakenError::InvalidIdentityHeader("missing x5u".into()))?;

    if url::Url::parse(x5u).is_err() {
        return Err(ShakenError::InvalidIdentityHeader(format!(
            "x5u is not a valid absolute URL: {x5u}"
        )));
    }

    Ok(x5u.to_string())
}

fn parse_orig(value: &Value) -> Result<OrigIdentity> {
    let obj = value
        .as_object()
        .ok_or_else(|| ShakenError::InvalidIdentityHeader("orig is not an object".into()))?;
    if obj.len() != 1 {
        return Err(ShakenError::InvalidIdentityHeader(
            "orig must have exactly one key".into(),
        ));
    }
    if let Some(tn) = obj.get("tn") {
        let s = tn
            .as_str()
            .ok_or_else(|| ShakenError::InvalidIdentityHeader("orig.tn must be a string".into()))?;
        return Ok(OrigIdentity::Tn(s.to_string()));
    }
    if let Some(uri) = obj.get("uri") {
        let values = json_string_array(uri, "orig.uri")?;
        return Ok(OrigIdentity::Uri(values));
    }
    Err(ShakenError::InvalidIdentityHeader(
        "orig must have a tn or uri key".into(),
    ))
}

fn parse_dest(value: &Value, allow_scalar_dest_tn: bool) -> Result<DestIdentity> {
    let obj = value
        .as_object()
        .ok_or_else(|| ShakenError::InvalidIdentityHeader("dest is not an object".into()))?;
    if obj.len() != 1 {
        return Err(ShakenError::InvalidIdentityHeader(
            "dest must have exactly one key".into(),
        ));
    }
    if let Some(tn) = obj.get("tn") {
        if let Some(s) = tn.as_str() {
            if !allow_scalar_dest_tn {
                return Err(ShakenError::InvalidIdentityHeader(
                    "dest.tn must be an array (RFC 8588 §5.2.1)".into(),
                ));
            }
            return Ok(DestIdentity::Tn(vec![s.to_string()]));
        }
        let values = json_string_array(tn, "dest.tn")?;
        return Ok(DestIdentity::Tn(values));
    }
    if let Some(uri) = obj.get("uri") {
        let values = json_string_array(uri, "dest.uri")?;
        return Ok(DestIdentity::Uri(values));
    }
    Err(ShakenError::InvalidIdentityHeader(
        "dest must have a tn or uri key".into(),
    ))
}

fn json_string_array(value: &Value, field: &str) -> Result<Vec<String>> {
    let arr = value
        .as_array()
        .ok_or_else(|| ShakenError::InvalidIdentityHeader(format!("{field} must be an array")))?;
    if arr.is_empty() {
        return Err(ShakenError::InvalidIdentityHeader(format!("{field} must be non-empty")));
    }
    arr.iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| ShakenError::InvalidIdentityHeader(format!("{field} entries must be strings")))
        })
        .collect()
}

/// Validate payload invariants (§3), enforce the freshness window, and
/// return typed claims.
pub fn verify_payload_claims(payload: &Value, now: i64, policy: &VerifyPolicy) -> Result<PassportClaims> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ShakenError::InvalidIdentityHeader("payload is not a JSON object".into()))?;

    let attest = match obj.get("attest") {
        None => None,
        Some(Value::String(s)) if s == "A" || s == "B" || s == "C" => Some(s.clone()),
        Some(_) => return Err(ShakenError::InvalidIdentityHeader("invalid attest value".into())),
    };

    let orig_value = obj
        .get("orig")
        .ok_or_else(|| ShakenError::InvalidIdentityHeader("missing orig".into()))?;
    let orig = parse_orig(orig_value)?;

    let dest_value = obj
        .get("dest")
        .ok_or_else(|| ShakenError::InvalidIdentityHeader("missing dest".into()))?;
    let dest = parse_dest(dest_value, policy.allow_scalar_dest_tn)?;

    let iat = obj
        .get("iat")
        .and_then(Value::as_i64)
        .ok_or_else(|| ShakenError::InvalidIdentityHeader("missing or non-integer iat".into()))?;

    if (now - iat).abs() > policy.freshness_window_secs {
        return Err(ShakenError::StaleDate(format!(
            "iat {iat} outside freshness window of {}s (now={now})",
            policy.freshness_window_secs
        )));
    }

    let origid = match obj.get("origid") {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(ShakenError::InvalidIdentityHeader("origid must be a string".into())),
    };

    Ok(PassportClaims {
        attest,
        orig,
        dest,
        iat,
        origid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    fn sample_params() -> PassportParams {
        let mut params = PassportParams::new(
            "https://sp.example/sp.pem",
            OrigIdentity::Tn("01256789999".into()),
            DestIdentity::Tn(vec!["01256500600".into()]),
            1577836800,
        );
        params.attest = Some("A".into());
        params.origid = Some("ref".into());
        params
    }

    #[test]
    fn build_matches_literal_scenario_payload() {
        let (_, payload) = build(&sample_params());
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            json,
            r#"{"attest":"A","dest":{"tn":["01256500600"]},"iat":1577836800,"orig":{"tn":"01256789999"},"origid":"ref"}"#
        );
    }

    #[test]
    fn sign_then_verify_round_trips_claims() {
        let kp = KeyPair::generate().unwrap();
        let params = sample_params();
        let signed = sign(&params, &kp.signing_key).unwrap();

        let header = decode_json_segment(&signed.header_b64).unwrap();
        let payload = decode_json_segment(&signed.payload_b64).unwrap();
        let policy = VerifyPolicy {
            freshness_window_secs: 60,
            ..Default::default()
        };

        let x5u = verify_header_claims(&header, &policy).unwrap();
        assert_eq!(x5u, "https://sp.example/sp.pem");

        let claims = verify_payload_claims(&payload, 1577836800, &policy).unwrap();
        assert_eq!(claims.attest.as_deref(), Some("A"));
        assert_eq!(claims.orig, OrigIdentity::Tn("01256789999".into()));
        assert_eq!(claims.dest, DestIdentity::Tn(vec!["01256500600".into()]));
    }

    #[test]
    fn stale_iat_rejected() {
        let (_, payload) = build(&sample_params());
        let policy = VerifyPolicy::default();
        let err = verify_payload_claims(&payload, 1577836800 + 3600, &policy).unwrap_err();
        assert_eq!(err.sip_status(), 403);
    }

    #[test]
    fn scalar_dest_tn_rejected_by_default() {
        let mut map = Map::new();
        map.insert("tn".to_string(), Value::String("01256500600".into()));
        let dest_value = Value::Object(map);
        let err = parse_dest(&dest_value, false).unwrap_err();
        assert_eq!(err.sip_status(), 438);
    }

    #[test]
    fn scalar_dest_tn_accepted_under_compat_flag() {
        let mut map = Map::new();
        map.insert("tn".to_string(), Value::String("01256500600".into()));
        let dest_value = Value::Object(map);
        let dest = parse_dest(&dest_value, true).unwrap();
        assert_eq!(dest, DestIdentity::Tn(vec!["01256500600".into()]));
    }

    #[test]
    fn missing_ppt_rejected_by_default() {
        let mut header = Map::new();
        header.insert("alg".to_string(), Value::String(ALG.to_string()));
        header.insert("typ".to_string(), Value::String(TYP.to_string()));
        header.insert("x5u".to_string(), Value::String("https://sp.example/sp.pem".into()));
        let header = Value::Object(header);
        let err = verify_header_claims(&header, &VerifyPolicy::default()).unwrap_err();
        assert_eq!(err.sip_status(), 438);
    }
}
