//! CHAP (Challenge-Handshake Authentication Protocol)
//!
//! RFC 1994 as profiled by RFC 3720 Section 8.2: the response is
//! MD5(identifier || secret || challenge) over that exact byte order.
//! `Chap` is the target side of one exchange (challenge out, response
//! in); `MutualChap` computes the reverse response when the initiator
//! demands the target authenticate itself too. Neither is ever reused
//! across login attempts.

use crate::error::{LoginError, LoginResult};
use rand::Rng;

/// Challenge length in bytes
pub const CHAP_CHALLENGE_LEN: usize = 1024;

/// MD5 digest length in bytes
pub const CHAP_DIGEST_LEN: usize = 16;

/// The only CHAP algorithm identifier this target accepts (MD5)
pub const CHAP_ALGORITHM_MD5: &str = "5";

/// Compute MD5(id || secret || challenge)
fn chap_digest(id: u8, secret: &str, challenge: &[u8]) -> [u8; CHAP_DIGEST_LEN] {
    let mut data = Vec::with_capacity(1 + secret.len() + challenge.len());
    data.push(id);
    data.extend_from_slice(secret.as_bytes());
    data.extend_from_slice(challenge);
    md5::compute(&data).0
}

/// Constant-time equality for digests
fn digest_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Decode a wire big-binary value: hex digits with an optional
/// `0x`/`0X` prefix.
fn decode_big_binary(text: &str) -> LoginResult<Vec<u8>> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    hex::decode(digits)
        .map_err(|e| LoginError::MalformedUnit(format!("invalid hex value \"{}\": {}", text, e)))
}

/// Encode a binary value as `0x`-prefixed hex for a text key
fn encode_big_binary(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Target-side CHAP state for one login attempt
#[derive(Debug)]
pub struct Chap {
    id: u8,
    challenge: Vec<u8>,
    /// Response recorded by `receive_response`, awaiting verification
    response: Option<[u8; CHAP_DIGEST_LEN]>,
}

impl Default for Chap {
    fn default() -> Self {
        Self::new()
    }
}

impl Chap {
    /// Allocate a random identifier and challenge. The challenge must
    /// be unpredictable; a peer that can guess it can forge responses.
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        let id = rng.gen::<u8>();
        let mut challenge = vec![0u8; CHAP_CHALLENGE_LEN];
        rng.fill(&mut challenge[..]);
        Chap {
            id,
            challenge,
            response: None,
        }
    }

    /// The identifier formatted for the CHAP_I key
    pub fn encode_id(&self) -> String {
        self.id.to_string()
    }

    /// The challenge formatted for the CHAP_C key
    pub fn encode_challenge(&self) -> String {
        encode_big_binary(&self.challenge)
    }

    /// Decode and record the peer's CHAP_R value.
    ///
    /// Fails if the encoding is invalid or the digest length is wrong.
    pub fn receive_response(&mut self, response: &str) -> LoginResult<()> {
        let bytes = decode_big_binary(response)?;
        if bytes.len() != CHAP_DIGEST_LEN {
            return Err(LoginError::MalformedUnit(format!(
                "CHAP response has wrong length: {} bytes, expected {}",
                bytes.len(),
                CHAP_DIGEST_LEN
            )));
        }
        let mut digest = [0u8; CHAP_DIGEST_LEN];
        digest.copy_from_slice(&bytes);
        self.response = Some(digest);
        Ok(())
    }

    /// Verify the recorded response against the shared secret
    pub fn authenticate(&self, secret: &str) -> LoginResult<()> {
        let response = self.response.ok_or_else(|| {
            LoginError::ProtocolViolation("CHAP response verified before it was received".into())
        })?;
        let expected = chap_digest(self.id, secret, &self.challenge);
        if digest_eq(&response, &expected) {
            Ok(())
        } else {
            Err(LoginError::PermissionDenied(
                "CHAP response does not match".to_string(),
            ))
        }
    }
}

/// Reverse CHAP: the target proving knowledge of the mutual secret to
/// the initiator, over a challenge the initiator supplied.
#[derive(Debug)]
pub struct MutualChap {
    secret: String,
    peer_id: Option<u8>,
    peer_challenge: Option<Vec<u8>>,
}

impl MutualChap {
    pub fn new(secret: &str) -> Self {
        MutualChap {
            secret: secret.to_string(),
            peer_id: None,
            peer_challenge: None,
        }
    }

    /// Decode the initiator-supplied CHAP_I and CHAP_C values
    pub fn receive(&mut self, id: &str, challenge: &str) -> LoginResult<()> {
        let id = id.parse::<u8>().map_err(|_| {
            LoginError::MalformedUnit(format!("invalid CHAP identifier \"{}\"", id))
        })?;
        let challenge = decode_big_binary(challenge)?;
        if challenge.is_empty() {
            return Err(LoginError::MalformedUnit("empty CHAP challenge".to_string()));
        }
        self.peer_id = Some(id);
        self.peer_challenge = Some(challenge);
        Ok(())
    }

    /// The computed CHAP_R value for the success response
    pub fn response(&self) -> LoginResult<String> {
        let (id, challenge) = match (self.peer_id, &self.peer_challenge) {
            (Some(id), Some(challenge)) => (id, challenge),
            _ => {
                return Err(LoginError::ProtocolViolation(
                    "mutual CHAP response requested before challenge was received".into(),
                ))
            }
        };
        Ok(encode_big_binary(&chap_digest(id, &self.secret, challenge)))
    }
}
