//! Per-connection login state
//!
//! A `Connection` is created when the transport accepts a socket and is
//! owned by exactly one worker until login succeeds (the caller then
//! hands it to the data-transfer engine) or fails (the caller drops
//! it). Session type, target binding, and authenticated identity are
//! each set once and never revised.

use crate::chap::Chap;
use std::net::SocketAddr;

/// Maximum iSCSI name length (RFC 3720 Section 3.2.6.1)
pub const MAX_NAME_LEN: usize = 223;

/// Clamp for MaxRecvDataSegmentLength and FirstBurstLength
pub const MAX_DATA_SEGMENT_LENGTH: u32 = 128 * 1024;

/// Clamp for MaxBurstLength
pub const MAX_BURST_LENGTH: u32 = 16776192;

/// Session type negotiated on the first Login Request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionType {
    /// Bound to a specific storage target
    Normal,
    /// Used only to enumerate available targets
    Discovery,
}

/// Header/data digest choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestType {
    #[default]
    None,
    Crc32c,
}

/// Mutable state for one connection's login phase
#[derive(Debug)]
pub struct Connection {
    /// Peer network address, checked against portal allow-lists
    pub peer_addr: SocketAddr,
    /// ISID from the first request, echoed in every response
    pub isid: [u8; 6],
    /// Set once from the first request; never revised
    pub session_type: Option<SessionType>,
    /// Set once from the first request; never revised
    pub initiator_name: Option<String>,
    /// May be updated by later InitiatorAlias keys
    pub initiator_alias: Option<String>,
    /// Name of the bound target, Normal sessions only; set once
    pub target_name: Option<String>,

    /// Last CmdSN seen; inbound requests may not decrease it
    pub cmd_sn: u32,
    /// Next StatSN to assign; peers must acknowledge it exactly
    pub stat_sn: u32,

    pub header_digest: DigestType,
    pub data_digest: DigestType,
    pub max_data_segment_length: u32,
    pub max_burst_length: u32,
    pub immediate_data: bool,

    /// Authenticated CHAP user; set only after verification succeeds
    pub user: Option<String>,
    /// The consumed CHAP exchange, retained for the discovery phase
    pub chap: Option<Chap>,
}

impl Connection {
    pub fn new(peer_addr: SocketAddr) -> Self {
        Connection {
            peer_addr,
            isid: [0u8; 6],
            session_type: None,
            initiator_name: None,
            initiator_alias: None,
            target_name: None,
            cmd_sn: 0,
            stat_sn: 0,
            header_digest: DigestType::None,
            data_digest: DigestType::None,
            max_data_segment_length: 8192,
            max_burst_length: 262144,
            immediate_data: false,
            user: None,
            chap: None,
        }
    }

    pub fn is_discovery(&self) -> bool {
        self.session_type == Some(SessionType::Discovery)
    }
}

/// Validate iSCSI name syntax: bounded length, a known type prefix,
/// and the restricted character set RFC 3722 reduces names to.
pub fn valid_iscsi_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return false;
    }
    if !(name.starts_with("iqn.") || name.starts_with("eui.") || name.starts_with("naa.")) {
        return false;
    }
    name.chars().all(|c| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | ':')
    })
}
