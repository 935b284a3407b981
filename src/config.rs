//! Read-only configuration records consulted during login
//!
//! The long-term configuration model lives outside this crate; login
//! only needs a consistent snapshot of the portal group a connection
//! arrived on: its tag, its discovery auth policy, and the targets it
//! exports. All of it is read-only for the duration of one attempt.

use crate::auth::AuthGroup;

/// A storage target as seen by the login phase
#[derive(Debug, Clone)]
pub struct Target {
    name: String,
    alias: Option<String>,
    auth_group: AuthGroup,
}

impl Target {
    pub fn new(name: impl Into<String>, auth_group: AuthGroup) -> Self {
        Target {
            name: name.into(),
            alias: None,
            auth_group,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn auth_group(&self) -> &AuthGroup {
        &self.auth_group
    }
}

/// The portal group a transport connection was accepted on
#[derive(Debug, Clone)]
pub struct PortalGroup {
    tag: u16,
    discovery_auth_group: AuthGroup,
    targets: Vec<Target>,
}

impl PortalGroup {
    /// A portal group with the given tag. Discovery sessions deny
    /// access until a discovery auth group is configured.
    pub fn new(tag: u16) -> Self {
        PortalGroup {
            tag,
            discovery_auth_group: AuthGroup::new(),
            targets: Vec::new(),
        }
    }

    pub fn with_discovery_auth_group(mut self, group: AuthGroup) -> Self {
        self.discovery_auth_group = group;
        self
    }

    pub fn add_target(mut self, target: Target) -> Self {
        self.targets.push(target);
        self
    }

    pub fn tag(&self) -> u16 {
        self.tag
    }

    pub fn discovery_auth_group(&self) -> &AuthGroup {
        &self.discovery_auth_group
    }

    /// Resolve a target by name, preserving absence as `None`
    pub fn find_target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name() == name)
    }
}
