//! Transport boundary
//!
//! The login state machine never parses raw framing; it exchanges
//! decoded [`RawPdu`]s through [`PduTransport`]. Reads and writes are
//! blocking and strictly alternating within one connection.
//! `TcpPduTransport` is the production implementation; tests drive the
//! state machine through scripted in-memory transports.

use crate::error::{LoginError, LoginResult};
use crate::pdu::{RawPdu, BHS_SIZE};
use std::io::{Read, Write};
use std::net::TcpStream;

/// Blocking PDU exchange on one connection
pub trait PduTransport {
    /// Receive the next framed PDU
    fn recv_pdu(&mut self) -> LoginResult<RawPdu>;

    /// Send one PDU
    fn send_pdu(&mut self, pdu: &RawPdu) -> LoginResult<()>;
}

/// PDU framing over a TCP stream
pub struct TcpPduTransport {
    stream: TcpStream,
}

impl TcpPduTransport {
    pub fn new(stream: TcpStream) -> Self {
        TcpPduTransport { stream }
    }

    pub fn stream(&self) -> &TcpStream {
        &self.stream
    }
}

impl PduTransport for TcpPduTransport {
    fn recv_pdu(&mut self) -> LoginResult<RawPdu> {
        let mut buf = vec![0u8; BHS_SIZE];
        self.stream.read_exact(&mut buf).map_err(LoginError::Io)?;

        // Data segment length lives in bytes 5-7; the data segment is
        // padded to a 4-byte boundary on the wire.
        let data_len =
            ((buf[5] as u32) << 16) | ((buf[6] as u32) << 8) | (buf[7] as u32);
        let padded_len = data_len.div_ceil(4) * 4;

        if padded_len > 0 {
            let mut data_buf = vec![0u8; padded_len as usize];
            self.stream.read_exact(&mut data_buf).map_err(LoginError::Io)?;
            buf.extend_from_slice(&data_buf);
        }

        RawPdu::from_bytes(&buf)
    }

    fn send_pdu(&mut self, pdu: &RawPdu) -> LoginResult<()> {
        self.stream
            .write_all(&pdu.to_bytes())
            .map_err(LoginError::Io)?;
        Ok(())
    }
}
