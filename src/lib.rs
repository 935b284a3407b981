//! iSCSI target login phase
//!
//! Implements the target side of the iSCSI Login Phase (RFC 3720):
//! Login PDU parsing, text key negotiation, CHAP authentication with
//! optional mutual authentication, auth group policy, and operational
//! parameter negotiation up to the Full Feature Phase transition.
//!
//! The entry point is [`login::login`], which drives one connection
//! over any [`transport::PduTransport`] until the login phase either
//! completes or fails:
//!
//! ```no_run
//! use std::net::TcpListener;
//! use iscsi_login::auth::AuthGroup;
//! use iscsi_login::config::{PortalGroup, Target};
//! use iscsi_login::conn::Connection;
//! use iscsi_login::login::login;
//! use iscsi_login::transport::TcpPduTransport;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let portal_group = PortalGroup::new(1)
//!         .with_discovery_auth_group(AuthGroup::no_authentication())
//!         .add_target(Target::new(
//!             "iqn.2026-08.com.example:disk0",
//!             AuthGroup::no_authentication(),
//!         ));
//!
//!     let listener = TcpListener::bind("0.0.0.0:3260")?;
//!     let (stream, peer_addr) = listener.accept()?;
//!     let mut conn = Connection::new(peer_addr);
//!     let mut transport = TcpPduTransport::new(stream);
//!
//!     login(&mut conn, &mut transport, &portal_group)?;
//!     // conn now carries the negotiated parameters; hand it to the
//!     // data transfer engine.
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod chap;
pub mod config;
pub mod conn;
pub mod error;
pub mod keys;
pub mod login;
pub mod pdu;
pub mod transport;

pub use crate::conn::Connection;
pub use crate::error::{LoginError, LoginResult};
pub use crate::keys::KeySet;
pub use crate::login::login;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
