//! Auth groups and the login policy gate
//!
//! An auth group is a named policy bundle: the required authentication
//! type, zero or more CHAP entries, and optional allow-lists of
//! initiator names and initiator portals. The login state machine
//! consults the group resolved for the session's target (or the portal
//! group's discovery policy) before deciding how to authenticate.
//!
//! A group whose type was never set denies access. Absent configuration
//! fails closed, it never means "no authentication".

use crate::error::{LoginError, LoginResult};
use std::net::{IpAddr, SocketAddr};

/// One CHAP credential tuple within an auth group
#[derive(Debug, Clone)]
pub struct AuthEntry {
    /// Initiator-side CHAP user
    pub user: String,
    /// Initiator-side CHAP secret
    pub secret: String,
    /// Target-side user for mutual CHAP
    pub mutual_user: Option<String>,
    /// Target-side secret for mutual CHAP
    pub mutual_secret: Option<String>,
}

impl AuthEntry {
    pub fn chap(user: impl Into<String>, secret: impl Into<String>) -> Self {
        AuthEntry {
            user: user.into(),
            secret: secret.into(),
            mutual_user: None,
            mutual_secret: None,
        }
    }

    pub fn chap_mutual(
        user: impl Into<String>,
        secret: impl Into<String>,
        mutual_user: impl Into<String>,
        mutual_secret: impl Into<String>,
    ) -> Self {
        AuthEntry {
            user: user.into(),
            secret: secret.into(),
            mutual_user: Some(mutual_user.into()),
            mutual_secret: Some(mutual_secret.into()),
        }
    }
}

/// Auth group policy type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthGroupType {
    /// No type was ever configured
    #[default]
    Unknown,
    Deny,
    NoAuthentication,
    Chap,
    ChapMutual,
}

/// What the state machine must do for a session bound to a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredMethod {
    /// Proceed without authentication
    None,
    /// Run the CHAP sub-exchange
    Chap,
    /// Refuse the login outright
    Deny,
    /// Group exists but carries no policy; treated exactly like Deny
    Unconfigured,
}

/// An initiator portal allow-list entry: address plus prefix length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitiatorPortal {
    addr: IpAddr,
    prefix_len: u8,
}

impl InitiatorPortal {
    /// Parse `"addr"` or `"addr/prefix"`
    pub fn parse(spec: &str) -> LoginResult<Self> {
        let (addr_part, prefix_part) = match spec.split_once('/') {
            Some((a, p)) => (a, Some(p)),
            None => (spec, None),
        };
        let addr: IpAddr = addr_part.parse().map_err(|_| {
            LoginError::MalformedUnit(format!("invalid initiator portal \"{}\"", spec))
        })?;
        let max_prefix = match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        let prefix_len = match prefix_part {
            Some(p) => {
                let len: u8 = p.parse().map_err(|_| {
                    LoginError::MalformedUnit(format!("invalid portal prefix \"{}\"", spec))
                })?;
                if len > max_prefix {
                    return Err(LoginError::MalformedUnit(format!(
                        "portal prefix too long in \"{}\"",
                        spec
                    )));
                }
                len
            }
            None => max_prefix,
        };
        Ok(InitiatorPortal { addr, prefix_len })
    }

    /// Whether the peer address falls inside this portal's prefix
    pub fn matches(&self, peer: IpAddr) -> bool {
        match (self.addr, peer) {
            (IpAddr::V4(net), IpAddr::V4(host)) => {
                let mask = if self.prefix_len == 0 {
                    0
                } else {
                    u32::MAX << (32 - u32::from(self.prefix_len))
                };
                (u32::from(net) & mask) == (u32::from(host) & mask)
            }
            (IpAddr::V6(net), IpAddr::V6(host)) => {
                let mask = if self.prefix_len == 0 {
                    0
                } else {
                    u128::MAX << (128 - u32::from(self.prefix_len))
                };
                (u128::from(net) & mask) == (u128::from(host) & mask)
            }
            _ => false,
        }
    }
}

/// A named authentication policy
#[derive(Debug, Clone, Default)]
pub struct AuthGroup {
    /// Group name, when the configuration names it
    pub name: Option<String>,
    group_type: AuthGroupType,
    entries: Vec<AuthEntry>,
    allowed_names: Vec<String>,
    allowed_portals: Vec<InitiatorPortal>,
}

impl AuthGroup {
    /// A group with no type set; denies everything until configured
    pub fn new() -> Self {
        AuthGroup::default()
    }

    pub fn no_authentication() -> Self {
        AuthGroup {
            group_type: AuthGroupType::NoAuthentication,
            ..Default::default()
        }
    }

    pub fn deny() -> Self {
        AuthGroup {
            group_type: AuthGroupType::Deny,
            ..Default::default()
        }
    }

    /// A CHAP group; initiators authenticate but may not demand
    /// target authentication back.
    pub fn chap(entries: Vec<AuthEntry>) -> Self {
        AuthGroup {
            group_type: AuthGroupType::Chap,
            entries,
            ..Default::default()
        }
    }

    pub fn chap_mutual(entries: Vec<AuthEntry>) -> Self {
        AuthGroup {
            group_type: AuthGroupType::ChapMutual,
            entries,
            ..Default::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restrict logins to this initiator name. The first call switches
    /// the group from "allow all" to allow-list semantics.
    pub fn allow_name(mut self, name: impl Into<String>) -> Self {
        self.allowed_names.push(name.into());
        self
    }

    /// Restrict logins to initiators within this portal spec
    pub fn allow_portal(mut self, spec: &str) -> LoginResult<Self> {
        self.allowed_portals.push(InitiatorPortal::parse(spec)?);
        Ok(self)
    }

    pub fn group_type(&self) -> AuthGroupType {
        self.group_type
    }

    /// Resolve an auth entry by CHAP user name
    pub fn find(&self, user: &str) -> Option<&AuthEntry> {
        self.entries.iter().find(|e| e.user == user)
    }

    /// The authentication the state machine must enforce for this
    /// group. An unconfigured group resolves to `Unconfigured`, which
    /// callers must treat as deny.
    pub fn required_method(&self) -> RequiredMethod {
        match self.group_type {
            AuthGroupType::NoAuthentication => RequiredMethod::None,
            AuthGroupType::Chap | AuthGroupType::ChapMutual => RequiredMethod::Chap,
            AuthGroupType::Deny => RequiredMethod::Deny,
            AuthGroupType::Unknown => RequiredMethod::Unconfigured,
        }
    }

    /// Enforce the initiator-name allow-list. An empty list allows all.
    pub fn check_initiator_name(&self, name: &str) -> LoginResult<()> {
        if self.allowed_names.is_empty() || self.allowed_names.iter().any(|n| n == name) {
            Ok(())
        } else {
            Err(LoginError::NotAllowed(format!(
                "initiator \"{}\" does not match allowed initiator names",
                name
            )))
        }
    }

    /// Enforce the initiator-portal allow-list. An empty list allows all.
    pub fn check_initiator_portal(&self, peer: &SocketAddr) -> LoginResult<()> {
        if self.allowed_portals.is_empty()
            || self.allowed_portals.iter().any(|p| p.matches(peer.ip()))
        {
            Ok(())
        } else {
            Err(LoginError::NotAllowed(format!(
                "initiator {} does not match allowed initiator portals",
                peer
            )))
        }
    }
}
