//! Text key negotiation sets
//!
//! Login negotiation exchanges NUL-terminated `name=value` strings
//! packed into the PDU data segment. A `KeySet` is the ordered form of
//! one payload: insertion order is significant, keys are unique within
//! a set, and the pair count is bounded.

use crate::error::{LoginError, LoginResult};

/// Maximum number of key=value pairs in one set
pub const KEYS_MAX: usize = 1024;

/// Sentinel value meaning "this key does not apply"; such keys are
/// passed over by negotiation entirely.
pub const IRRELEVANT: &str = "Irrelevant";

/// Sentinel answer for keys the target does not recognize
pub const NOT_UNDERSTOOD: &str = "NotUnderstood";

/// An ordered, bounded set of text negotiation keys
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    pairs: Vec<(String, String)>,
}

impl KeySet {
    pub fn new() -> Self {
        KeySet { pairs: Vec::new() }
    }

    /// Parse a PDU data segment into a key set.
    ///
    /// Fails if a pair lacks `=`, if the final pair is not
    /// NUL-terminated, or if the pair count exceeds [`KEYS_MAX`].
    pub fn load(data: &[u8]) -> LoginResult<Self> {
        let mut keys = KeySet::new();

        if data.is_empty() {
            return Ok(keys);
        }
        if *data.last().unwrap() != 0 {
            return Err(LoginError::MalformedUnit(
                "key payload does not end with NUL".to_string(),
            ));
        }

        for chunk in data[..data.len() - 1].split(|&b| b == 0) {
            let s = std::str::from_utf8(chunk).map_err(|_| {
                LoginError::MalformedUnit("key pair is not valid UTF-8".to_string())
            })?;
            let eq = s.find('=').ok_or_else(|| {
                LoginError::MalformedUnit(format!("key pair \"{}\" without '='", s))
            })?;
            if eq == 0 {
                return Err(LoginError::MalformedUnit(format!(
                    "key pair \"{}\" with empty name",
                    s
                )));
            }
            if keys.pairs.len() >= KEYS_MAX {
                return Err(LoginError::ProtocolViolation(format!(
                    "too many keys in one login PDU (max {})",
                    KEYS_MAX
                )));
            }
            keys.pairs.push((s[..eq].to_string(), s[eq + 1..].to_string()));
        }

        Ok(keys)
    }

    /// Append a pair. Negotiating the same key twice within one set is
    /// a caller bug; the set is append-only and never overwrites.
    pub fn add(&mut self, name: &str, value: &str) {
        debug_assert!(
            self.find(name).is_none(),
            "key \"{}\" added twice to one set",
            name
        );
        debug_assert!(self.pairs.len() < KEYS_MAX);
        self.pairs.push((name.to_string(), value.to_string()));
    }

    /// Append a pair with its value formatted from an integer
    pub fn add_int(&mut self, name: &str, value: i64) {
        self.add(name, &value.to_string());
    }

    /// Look up a key, preserving absence as `None`
    pub fn find(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Serialize back to the wire text format, preserving order
    pub fn save(&self) -> Vec<u8> {
        let mut data = Vec::new();
        for (name, value) in &self.pairs {
            data.extend_from_slice(name.as_bytes());
            data.push(b'=');
            data.extend_from_slice(value.as_bytes());
            data.push(0);
        }
        data
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
