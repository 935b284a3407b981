//! iSCSI Login PDU parsing and serialization
//!
//! Binary format of the 48-byte BHS (Basic Header Segment) and the
//! Login Request / Login Response PDUs, per RFC 3720 Sections 10.12
//! and 10.13. Only the login phase opcodes are interpreted here; the
//! data-transfer PDUs belong to the full feature phase and are out of
//! scope for this crate.

use crate::error::{LoginError, LoginResult};
use byteorder::{BigEndian, ByteOrder, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

/// BHS (Basic Header Segment) size in bytes
pub const BHS_SIZE: usize = 48;

/// iSCSI PDU opcodes (RFC 3720 Section 10)
pub mod opcode {
    /// Login Request (initiator → target)
    pub const LOGIN_REQUEST: u8 = 0x03;
    /// Login Response (target → initiator)
    pub const LOGIN_RESPONSE: u8 = 0x23;
    /// Immediate delivery bit in byte 0
    pub const IMMEDIATE: u8 = 0x40;
}

/// Login PDU flag bits (byte 1)
pub mod flags {
    pub const TRANSIT: u8 = 0x80;
    pub const CONTINUE: u8 = 0x40;
}

/// Login stage values carried in the CSG/NSG flag bits
pub mod stage {
    pub const SECURITY_NEGOTIATION: u8 = 0;
    pub const OPERATIONAL_NEGOTIATION: u8 = 1;
    pub const FULL_FEATURE_PHASE: u8 = 3;
}

/// Login status classes and details (RFC 3720 Section 10.13.5)
pub mod login_status {
    pub const SUCCESS: u8 = 0x00;
    pub const INITIATOR_ERROR: u8 = 0x02;

    pub const DETAIL_GENERIC: u8 = 0x00;
    pub const DETAIL_AUTH_FAILURE: u8 = 0x01;
    pub const DETAIL_AUTHORIZATION_FAILURE: u8 = 0x02;
    pub const DETAIL_TARGET_NOT_FOUND: u8 = 0x03;
    pub const DETAIL_UNSUPPORTED_VERSION: u8 = 0x05;
    pub const DETAIL_MISSING_PARAMETER: u8 = 0x07;
    pub const DETAIL_INVALID_DURING_LOGIN: u8 = 0x0b;
}

/// A framed PDU as it crosses the transport boundary: decoded header
/// fields plus the text payload, before interpretation by opcode.
#[derive(Debug, Clone)]
pub struct RawPdu {
    /// Opcode (lower 6 bits of byte 0)
    pub opcode: u8,
    /// Immediate flag (bit 6 of byte 0)
    pub immediate: bool,
    /// Opcode-specific flags (byte 1)
    pub flags: u8,
    /// Bytes 2-3; Version-max/Version-min for login requests
    pub fields: [u8; 2],
    /// Total AHS length (4-byte units)
    pub ahs_length: u8,
    /// Bytes 8-15; ISID + TSIH for login PDUs
    pub lun: [u8; 8],
    /// Initiator Task Tag (bytes 16-19)
    pub itt: u32,
    /// Opcode-specific fields (bytes 20-47)
    pub specific: [u8; 28],
    /// Data segment (unpadded)
    pub data: Vec<u8>,
}

impl Default for RawPdu {
    fn default() -> Self {
        Self::new()
    }
}

impl RawPdu {
    pub fn new() -> Self {
        RawPdu {
            opcode: 0,
            immediate: false,
            flags: 0,
            fields: [0u8; 2],
            ahs_length: 0,
            lun: [0u8; 8],
            itt: 0,
            specific: [0u8; 28],
            data: Vec::new(),
        }
    }

    /// Parse a PDU from bytes
    ///
    /// The buffer must contain the 48-byte BHS; if the header announces
    /// a data segment, the buffer must contain that too.
    pub fn from_bytes(buf: &[u8]) -> LoginResult<Self> {
        if buf.len() < BHS_SIZE {
            return Err(LoginError::MalformedUnit(format!(
                "PDU too short: {} bytes, need at least {}",
                buf.len(),
                BHS_SIZE
            )));
        }

        let mut cursor = Cursor::new(buf);

        // Byte 0: immediate flag (bit 6) and opcode (bits 0-5)
        let byte0 = cursor.read_u8().map_err(LoginError::Io)?;
        let immediate = (byte0 & opcode::IMMEDIATE) != 0;
        let op = byte0 & 0x3F;

        let pdu_flags = cursor.read_u8().map_err(LoginError::Io)?;

        let mut fields = [0u8; 2];
        std::io::Read::read_exact(&mut cursor, &mut fields).map_err(LoginError::Io)?;

        // Byte 4: Total AHS Length, bytes 5-7: Data Segment Length
        let ahs_length = cursor.read_u8().map_err(LoginError::Io)?;
        let ds_len_high = cursor.read_u8().map_err(LoginError::Io)? as u32;
        let ds_len_low = cursor.read_u16::<BigEndian>().map_err(LoginError::Io)? as u32;
        let data_length = (ds_len_high << 16) | ds_len_low;

        let mut lun = [0u8; 8];
        std::io::Read::read_exact(&mut cursor, &mut lun).map_err(LoginError::Io)?;

        let itt = cursor.read_u32::<BigEndian>().map_err(LoginError::Io)?;

        let mut specific = [0u8; 28];
        std::io::Read::read_exact(&mut cursor, &mut specific).map_err(LoginError::Io)?;

        let ahs_bytes = (ahs_length as usize) * 4;
        let padded_data_len = (data_length as usize).div_ceil(4) * 4;
        let total_len = BHS_SIZE + ahs_bytes + padded_data_len;

        if buf.len() < total_len {
            return Err(LoginError::MalformedUnit(format!(
                "PDU incomplete: {} bytes, need {} (BHS={}, AHS={}, data={})",
                buf.len(),
                total_len,
                BHS_SIZE,
                ahs_bytes,
                padded_data_len
            )));
        }

        let data_start = BHS_SIZE + ahs_bytes;
        let data = buf[data_start..data_start + data_length as usize].to_vec();

        Ok(RawPdu {
            opcode: op,
            immediate,
            flags: pdu_flags,
            fields,
            ahs_length,
            lun,
            itt,
            specific,
            data,
        })
    }

    /// Serialize to bytes, padding the data segment to a 4-byte boundary
    pub fn to_bytes(&self) -> Vec<u8> {
        let padded_data_len = self.data.len().div_ceil(4) * 4;
        let total_len = BHS_SIZE + padded_data_len;

        let mut buf = Vec::with_capacity(total_len);

        let byte0 = (if self.immediate { opcode::IMMEDIATE } else { 0 }) | (self.opcode & 0x3F);
        buf.push(byte0);
        buf.push(self.flags);
        buf.extend_from_slice(&self.fields);

        buf.push(self.ahs_length);
        let data_len = self.data.len() as u32;
        buf.push(((data_len >> 16) & 0xFF) as u8);
        buf.write_u16::<BigEndian>((data_len & 0xFFFF) as u16).unwrap();

        buf.extend_from_slice(&self.lun);
        buf.write_u32::<BigEndian>(self.itt).unwrap();
        buf.extend_from_slice(&self.specific);
        buf.extend_from_slice(&self.data);

        while buf.len() < total_len {
            buf.push(0);
        }

        buf
    }
}

/// A decoded Login Request PDU
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub immediate: bool,
    /// Transit ("T") flag
    pub transit: bool,
    /// Continue ("C") flag
    pub cont: bool,
    /// Current stage
    pub csg: u8,
    /// Next stage (meaningful only with `transit`)
    pub nsg: u8,
    pub version_max: u8,
    pub version_min: u8,
    /// Initiator session id, copied verbatim into responses
    pub isid: [u8; 6],
    /// Target session identifying handle; must be 0 on the first request
    pub tsih: u16,
    pub itt: u32,
    pub cid: u16,
    pub cmd_sn: u32,
    pub exp_stat_sn: u32,
    /// Text key payload
    pub data: Vec<u8>,
}

impl LoginRequest {
    /// Interpret a raw PDU as a Login Request
    pub fn parse(raw: &RawPdu) -> LoginResult<Self> {
        if raw.opcode != opcode::LOGIN_REQUEST {
            return Err(LoginError::MalformedUnit(format!(
                "expected Login Request opcode 0x03, got 0x{:02x}",
                raw.opcode
            )));
        }

        let mut isid = [0u8; 6];
        isid.copy_from_slice(&raw.lun[0..6]);
        let tsih = BigEndian::read_u16(&raw.lun[6..8]);

        Ok(LoginRequest {
            immediate: raw.immediate,
            transit: (raw.flags & flags::TRANSIT) != 0,
            cont: (raw.flags & flags::CONTINUE) != 0,
            csg: (raw.flags >> 2) & 0x03,
            nsg: raw.flags & 0x03,
            version_max: raw.fields[0],
            version_min: raw.fields[1],
            isid,
            tsih,
            itt: raw.itt,
            cid: BigEndian::read_u16(&raw.specific[0..2]),
            cmd_sn: BigEndian::read_u32(&raw.specific[4..8]),
            exp_stat_sn: BigEndian::read_u32(&raw.specific[8..12]),
            data: raw.data.clone(),
        })
    }

    /// Build the raw PDU for this request
    pub fn to_raw(&self) -> RawPdu {
        let mut raw = RawPdu::new();
        raw.opcode = opcode::LOGIN_REQUEST;
        raw.immediate = self.immediate;
        raw.flags = (if self.transit { flags::TRANSIT } else { 0 })
            | (if self.cont { flags::CONTINUE } else { 0 })
            | ((self.csg & 0x03) << 2)
            | (self.nsg & 0x03);
        raw.fields = [self.version_max, self.version_min];
        raw.lun[0..6].copy_from_slice(&self.isid);
        BigEndian::write_u16(&mut raw.lun[6..8], self.tsih);
        raw.itt = self.itt;
        BigEndian::write_u16(&mut raw.specific[0..2], self.cid);
        BigEndian::write_u32(&mut raw.specific[4..8], self.cmd_sn);
        BigEndian::write_u32(&mut raw.specific[8..12], self.exp_stat_sn);
        raw.data = self.data.clone();
        raw
    }
}

/// A Login Response PDU under construction or decoded for inspection
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub transit: bool,
    pub cont: bool,
    pub csg: u8,
    pub nsg: u8,
    pub isid: [u8; 6],
    pub tsih: u16,
    pub itt: u32,
    pub stat_sn: u32,
    pub exp_cmd_sn: u32,
    pub max_cmd_sn: u32,
    pub status_class: u8,
    pub status_detail: u8,
    pub data: Vec<u8>,
}

impl LoginResponse {
    /// Interpret a raw PDU as a Login Response
    pub fn parse(raw: &RawPdu) -> LoginResult<Self> {
        if raw.opcode != opcode::LOGIN_RESPONSE {
            return Err(LoginError::MalformedUnit(format!(
                "expected Login Response opcode 0x23, got 0x{:02x}",
                raw.opcode
            )));
        }

        let mut isid = [0u8; 6];
        isid.copy_from_slice(&raw.lun[0..6]);
        let tsih = BigEndian::read_u16(&raw.lun[6..8]);

        Ok(LoginResponse {
            transit: (raw.flags & flags::TRANSIT) != 0,
            cont: (raw.flags & flags::CONTINUE) != 0,
            csg: (raw.flags >> 2) & 0x03,
            nsg: raw.flags & 0x03,
            isid,
            tsih,
            itt: raw.itt,
            stat_sn: BigEndian::read_u32(&raw.specific[4..8]),
            exp_cmd_sn: BigEndian::read_u32(&raw.specific[8..12]),
            max_cmd_sn: BigEndian::read_u32(&raw.specific[12..16]),
            status_class: raw.specific[16],
            status_detail: raw.specific[17],
            data: raw.data.clone(),
        })
    }

    /// Build the raw PDU for this response
    pub fn to_raw(&self) -> RawPdu {
        let mut raw = RawPdu::new();
        raw.opcode = opcode::LOGIN_RESPONSE;
        raw.flags = (if self.transit { flags::TRANSIT } else { 0 })
            | (if self.cont { flags::CONTINUE } else { 0 })
            | ((self.csg & 0x03) << 2)
            | (self.nsg & 0x03);
        // Version-max / Version-active, both 0 for this dialect
        raw.fields = [0, 0];
        raw.lun[0..6].copy_from_slice(&self.isid);
        BigEndian::write_u16(&mut raw.lun[6..8], self.tsih);
        raw.itt = self.itt;
        BigEndian::write_u32(&mut raw.specific[4..8], self.stat_sn);
        BigEndian::write_u32(&mut raw.specific[8..12], self.exp_cmd_sn);
        BigEndian::write_u32(&mut raw.specific[12..16], self.max_cmd_sn);
        raw.specific[16] = self.status_class;
        raw.specific[17] = self.status_detail;
        raw.data = self.data.clone();
        raw
    }
}
