//! Login phase state machine
//!
//! Drives one connection from the first Login Request to the Full
//! Feature Phase transition: initial validation, auth policy
//! resolution, the CHAP sub-exchange when required, and operational
//! parameter negotiation. Every validation failure is fatal to the
//! connection; exactly one reject response is sent before the error
//! propagates to the caller, except for a non-login opcode on the very
//! first PDU, which is dropped without a response.

use crate::auth::{AuthGroup, AuthGroupType, RequiredMethod};
use crate::chap::{Chap, MutualChap, CHAP_ALGORITHM_MD5, CHAP_CHALLENGE_LEN};
use crate::config::{PortalGroup, Target};
use crate::conn::{
    valid_iscsi_name, Connection, DigestType, SessionType, MAX_BURST_LENGTH,
    MAX_DATA_SEGMENT_LENGTH,
};
use crate::error::{LoginError, LoginResult};
use crate::keys::{KeySet, IRRELEVANT, NOT_UNDERSTOOD};
use crate::pdu::{login_status, opcode, stage, LoginRequest, LoginResponse};
use crate::transport::PduTransport;
use log::{debug, warn};
use rand::Rng;

/// Check whether a comma-separated value list contains a token
fn list_contains(list: &str, what: &str) -> bool {
    list.split(',').any(|token| token == what)
}

/// Which of two choices a comma-separated preference list names first
fn list_prefers(list: &str, choice1: &str, choice2: &str) -> Option<u8> {
    for token in list.split(',') {
        if token == choice1 {
            return Some(1);
        }
        if token == choice2 {
            return Some(2);
        }
    }
    None
}

/// Run the login phase on one connection.
///
/// On success the connection holds the negotiated parameters and (when
/// CHAP ran) the authenticated user; the caller hands it to the data
/// transfer engine. On error the connection must be closed; the reject
/// response, when one is allowed, has already been sent.
pub fn login<T: PduTransport>(
    conn: &mut Connection,
    transport: &mut T,
    portal_group: &PortalGroup,
) -> LoginResult<()> {
    LoginPhase {
        conn,
        transport,
        portal_group,
    }
    .run()
}

struct LoginPhase<'a, T: PduTransport> {
    conn: &'a mut Connection,
    transport: &'a mut T,
    portal_group: &'a PortalGroup,
}

impl<'a, T: PduTransport> LoginPhase<'a, T> {
    /// Receive and validate the next Login Request.
    ///
    /// The first PDU of a connection is special: a non-login opcode
    /// there must terminate the connection without any response.
    fn receive(&mut self, initial: bool) -> LoginResult<LoginRequest> {
        let raw = self.transport.recv_pdu()?;

        if raw.opcode != opcode::LOGIN_REQUEST {
            if initial {
                return Err(LoginError::BadFirstPdu(raw.opcode));
            }
            let err = LoginError::ProtocolViolation(format!(
                "received invalid opcode 0x{:02x}",
                raw.opcode
            ));
            let mut isid = [0u8; 6];
            isid.copy_from_slice(&raw.lun[0..6]);
            if let Some((class, detail)) = err.reject_status() {
                self.send_reject(isid, raw.itt, class, detail);
            }
            return Err(err);
        }

        let request = LoginRequest::parse(&raw)?;

        if request.cont {
            return self.fail(
                &request,
                LoginError::UnsupportedParameter(
                    "received Login PDU with unsupported \"C\" flag".to_string(),
                ),
            );
        }
        if request.version_max != 0 {
            return self.fail(
                &request,
                LoginError::UnsupportedParameter(format!(
                    "received Login PDU with unsupported Version-max 0x{:x}",
                    request.version_max
                )),
            );
        }
        if request.version_min != 0 {
            return self.fail(
                &request,
                LoginError::UnsupportedParameter(format!(
                    "received Login PDU with unsupported Version-min 0x{:x}",
                    request.version_min
                )),
            );
        }
        if request.cmd_sn < self.conn.cmd_sn {
            return self.fail(
                &request,
                LoginError::SequenceViolation(format!(
                    "received Login PDU with decreasing CmdSN: was {}, is {}",
                    self.conn.cmd_sn, request.cmd_sn
                )),
            );
        }
        if !initial && request.exp_stat_sn != self.conn.stat_sn {
            return self.fail(
                &request,
                LoginError::SequenceViolation(format!(
                    "received Login PDU with wrong ExpStatSN: is {}, should be {}",
                    request.exp_stat_sn, self.conn.stat_sn
                )),
            );
        }
        self.conn.cmd_sn = request.cmd_sn;

        Ok(request)
    }

    /// Start a response to a request: copy the ISID and task tag,
    /// assign the next StatSN, and acknowledge the current CmdSN.
    fn new_response(&mut self, request: &LoginRequest) -> LoginResponse {
        let stat_sn = self.conn.stat_sn;
        self.conn.stat_sn = self.conn.stat_sn.wrapping_add(1);
        LoginResponse {
            transit: false,
            cont: false,
            csg: stage::SECURITY_NEGOTIATION,
            nsg: stage::SECURITY_NEGOTIATION,
            isid: request.isid,
            tsih: 0,
            itt: request.itt,
            stat_sn,
            exp_cmd_sn: self.conn.cmd_sn,
            max_cmd_sn: self.conn.cmd_sn,
            status_class: login_status::SUCCESS,
            status_detail: 0,
            data: Vec::new(),
        }
    }

    /// Best-effort transmission of a reject response. The connection
    /// is being torn down anyway, so a send failure is only logged.
    fn send_reject(&mut self, isid: [u8; 6], itt: u32, class: u8, detail: u8) {
        debug!(
            "sending Login Response PDU with failure class 0x{:02x}/0x{:02x}",
            class, detail
        );
        let stat_sn = self.conn.stat_sn;
        self.conn.stat_sn = self.conn.stat_sn.wrapping_add(1);
        let response = LoginResponse {
            transit: false,
            cont: false,
            csg: stage::SECURITY_NEGOTIATION,
            nsg: stage::SECURITY_NEGOTIATION,
            isid,
            tsih: 0,
            itt,
            stat_sn,
            exp_cmd_sn: self.conn.cmd_sn,
            max_cmd_sn: self.conn.cmd_sn,
            status_class: class,
            status_detail: detail,
            data: Vec::new(),
        };
        if let Err(e) = self.transport.send_pdu(&response.to_raw()) {
            warn!("failed to send login reject: {}", e);
        }
    }

    /// Send the single reject this error calls for, then propagate it
    fn fail<V>(&mut self, request: &LoginRequest, err: LoginError) -> LoginResult<V> {
        if let Some((class, detail)) = err.reject_status() {
            self.send_reject(request.isid, request.itt, class, detail);
        }
        Err(err)
    }

    fn run(&mut self) -> LoginResult<()> {
        debug!("beginning Login Phase; waiting for Login PDU");
        let request = self.receive(true)?;

        if request.tsih != 0 {
            return self.fail(
                &request,
                LoginError::UnsupportedParameter(
                    "received Login PDU with non-zero TSIH".to_string(),
                ),
            );
        }
        self.conn.isid = request.isid;

        let request_keys = match KeySet::load(&request.data) {
            Ok(keys) => keys,
            Err(e) => return self.fail(&request, e),
        };

        let initiator_name = match request_keys.find("InitiatorName") {
            Some(name) => name.to_string(),
            None => {
                return self.fail(
                    &request,
                    LoginError::MissingParameter(
                        "received Login PDU without InitiatorName".to_string(),
                    ),
                )
            }
        };
        if !valid_iscsi_name(&initiator_name) {
            return self.fail(
                &request,
                LoginError::MalformedUnit(format!(
                    "received Login PDU with invalid InitiatorName \"{}\"",
                    initiator_name
                )),
            );
        }
        self.conn.initiator_name = Some(initiator_name.clone());

        if let Some(alias) = request_keys.find("InitiatorAlias") {
            self.conn.initiator_alias = Some(alias.to_string());
        }

        let session_type = match request_keys.find("SessionType") {
            None | Some("Normal") => SessionType::Normal,
            Some("Discovery") => SessionType::Discovery,
            Some(other) => {
                return self.fail(
                    &request,
                    LoginError::MalformedUnit(format!(
                        "received Login PDU with invalid SessionType \"{}\"",
                        other
                    )),
                )
            }
        };
        self.conn.session_type = Some(session_type);

        let pg: &'a PortalGroup = self.portal_group;
        let target: Option<&'a Target> = if session_type == SessionType::Normal {
            let target_name = match request_keys.find("TargetName") {
                Some(name) => name,
                None => {
                    return self.fail(
                        &request,
                        LoginError::MissingParameter(
                            "received Login PDU without TargetName".to_string(),
                        ),
                    )
                }
            };
            match pg.find_target(target_name) {
                Some(target) => {
                    self.conn.target_name = Some(target.name().to_string());
                    Some(target)
                }
                None => {
                    return self.fail(
                        &request,
                        LoginError::NotFound(format!(
                            "requested target \"{}\" not found",
                            target_name
                        )),
                    )
                }
            }
        } else {
            None
        };

        let ag: &'a AuthGroup = match target {
            Some(target) => {
                match target.auth_group().name.as_deref() {
                    Some(ag_name) => debug!(
                        "initiator requests to connect to target \"{}\"; auth-group \"{}\"",
                        target.name(),
                        ag_name
                    ),
                    None => debug!(
                        "initiator requests to connect to target \"{}\"",
                        target.name()
                    ),
                }
                target.auth_group()
            }
            None => {
                let ag = pg.discovery_auth_group();
                match ag.name.as_deref() {
                    Some(ag_name) => {
                        debug!("initiator requests discovery session; auth-group \"{}\"", ag_name)
                    }
                    None => debug!("initiator requests discovery session"),
                }
                ag
            }
        };

        if let Err(e) = ag.check_initiator_name(&initiator_name) {
            return self.fail(&request, e);
        }
        if let Err(e) = ag.check_initiator_portal(&self.conn.peer_addr) {
            return self.fail(&request, e);
        }

        // The initiator may skip straight to operational negotiation,
        // but only when the resolved policy requires no authentication.
        if request.csg == stage::OPERATIONAL_NEGOTIATION {
            if ag.required_method() != RequiredMethod::None {
                return self.fail(
                    &request,
                    LoginError::PermissionDenied(
                        "initiator skipped the authentication, but authentication is required"
                            .to_string(),
                    ),
                );
            }
            debug!(
                "initiator skipped the authentication, and we don't need it; \
                 proceeding with negotiation"
            );
            return self.negotiate(target, Some(request));
        }

        match ag.required_method() {
            RequiredMethod::None => {
                debug!(
                    "authentication not required; \
                     transitioning to operational parameter negotiation"
                );
                if !request.transit {
                    warn!("initiator did not set the \"T\" flag; transitioning anyway");
                }

                let mut response = self.new_response(&request);
                response.transit = true;
                response.nsg = stage::OPERATIONAL_NEGOTIATION;
                let mut response_keys = KeySet::new();
                // Echoing AuthMethod=None is required by the Linux
                // initiator, but only when the initiator offered it.
                if let Some(auth_method) = request_keys.find("AuthMethod") {
                    if list_contains(auth_method, "None") {
                        response_keys.add("AuthMethod", "None");
                    }
                }
                if let Some(target) = target {
                    self.add_target_keys(&mut response_keys, target);
                }
                response.data = response_keys.save();
                self.transport.send_pdu(&response.to_raw())?;

                self.negotiate(target, None)
            }
            RequiredMethod::Deny => self.fail(
                &request,
                LoginError::PermissionDenied("auth-type is \"deny\"".to_string()),
            ),
            RequiredMethod::Unconfigured => self.fail(
                &request,
                LoginError::PermissionDenied("auth-type not set, denying access".to_string()),
            ),
            RequiredMethod::Chap => {
                debug!("CHAP authentication required");

                let auth_method = match request_keys.find("AuthMethod") {
                    Some(method) => method,
                    None => {
                        return self.fail(
                            &request,
                            LoginError::MissingParameter(
                                "received Login PDU without AuthMethod".to_string(),
                            ),
                        )
                    }
                };
                if !list_contains(auth_method, "CHAP") {
                    return self.fail(
                        &request,
                        LoginError::PermissionDenied(format!(
                            "initiator requests unsupported AuthMethod \"{}\" \
                             instead of \"CHAP\"",
                            auth_method
                        )),
                    );
                }

                let mut response = self.new_response(&request);
                let mut response_keys = KeySet::new();
                response_keys.add("AuthMethod", "CHAP");
                if let Some(target) = target {
                    self.add_target_keys(&mut response_keys, target);
                }
                response.data = response_keys.save();
                self.transport.send_pdu(&response.to_raw())?;

                self.chap_exchange(ag)?;
                self.negotiate(target, None)
            }
        }
    }

    /// The CHAP sub-exchange: CHAP_A in, challenge out, CHAP_N/CHAP_R
    /// in, success (with the mutual response when requested) out.
    fn chap_exchange(&mut self, ag: &AuthGroup) -> LoginResult<()> {
        debug!("beginning CHAP authentication; waiting for CHAP_A");
        let request = self.receive(false)?;
        let request_keys = match KeySet::load(&request.data) {
            Ok(keys) => keys,
            Err(e) => return self.fail(&request, e),
        };

        let chap_a = match request_keys.find("CHAP_A") {
            Some(value) => value,
            None => {
                return self.fail(
                    &request,
                    LoginError::MissingParameter(
                        "received CHAP Login PDU without CHAP_A".to_string(),
                    ),
                )
            }
        };
        if !list_contains(chap_a, CHAP_ALGORITHM_MD5) {
            return self.fail(
                &request,
                LoginError::PermissionDenied(format!(
                    "received CHAP Login PDU with unsupported CHAP_A \"{}\"",
                    chap_a
                )),
            );
        }

        let mut chap = Chap::new();

        debug!(
            "sending CHAP_C, binary challenge size is {} bytes",
            CHAP_CHALLENGE_LEN
        );
        let mut response = self.new_response(&request);
        let mut response_keys = KeySet::new();
        response_keys.add("CHAP_A", CHAP_ALGORITHM_MD5);
        response_keys.add("CHAP_I", &chap.encode_id());
        response_keys.add("CHAP_C", &chap.encode_challenge());
        response.data = response_keys.save();
        self.transport.send_pdu(&response.to_raw())?;

        debug!("waiting for CHAP_N/CHAP_R");
        let request = self.receive(false)?;
        let request_keys = match KeySet::load(&request.data) {
            Ok(keys) => keys,
            Err(e) => return self.fail(&request, e),
        };

        let chap_n = match request_keys.find("CHAP_N") {
            Some(value) => value,
            None => {
                return self.fail(
                    &request,
                    LoginError::MissingParameter(
                        "received CHAP Login PDU without CHAP_N".to_string(),
                    ),
                )
            }
        };
        let chap_r = match request_keys.find("CHAP_R") {
            Some(value) => value,
            None => {
                return self.fail(
                    &request,
                    LoginError::MissingParameter(
                        "received CHAP Login PDU without CHAP_R".to_string(),
                    ),
                )
            }
        };
        if let Err(e) = chap.receive_response(chap_r) {
            return self.fail(&request, e);
        }

        let auth = match ag.find(chap_n) {
            Some(auth) => auth,
            None => {
                return self.fail(
                    &request,
                    LoginError::PermissionDenied(format!(
                        "received CHAP Login with invalid user \"{}\"",
                        chap_n
                    )),
                )
            }
        };
        if chap.authenticate(&auth.secret).is_err() {
            return self.fail(
                &request,
                LoginError::PermissionDenied(format!(
                    "CHAP authentication failed for user \"{}\"",
                    auth.user
                )),
            );
        }

        debug!(
            "authentication succeeded for user \"{}\"; transitioning to Negotiation Phase",
            auth.user
        );

        let mut response = self.new_response(&request);
        response.transit = true;
        response.nsg = stage::OPERATIONAL_NEGOTIATION;

        let chap_i = request_keys.find("CHAP_I");
        let chap_c = request_keys.find("CHAP_C");
        if chap_i.is_some() || chap_c.is_some() {
            let chap_i = match chap_i {
                Some(value) => value,
                None => {
                    return self.fail(
                        &request,
                        LoginError::MissingParameter(
                            "initiator requested target authentication, \
                             but didn't send CHAP_I"
                                .to_string(),
                        ),
                    )
                }
            };
            let chap_c = match chap_c {
                Some(value) => value,
                None => {
                    return self.fail(
                        &request,
                        LoginError::MissingParameter(
                            "initiator requested target authentication, \
                             but didn't send CHAP_C"
                                .to_string(),
                        ),
                    )
                }
            };
            let (mutual_user, mutual_secret) = match (
                ag.group_type(),
                auth.mutual_user.as_deref(),
                auth.mutual_secret.as_deref(),
            ) {
                (AuthGroupType::ChapMutual, Some(user), Some(secret)) => (user, secret),
                _ => {
                    return self.fail(
                        &request,
                        LoginError::PermissionDenied(format!(
                            "initiator requests target authentication for user \"{}\", \
                             but mutual user/secret is not set",
                            auth.user
                        )),
                    )
                }
            };

            debug!("performing mutual authentication as user \"{}\"", mutual_user);
            let mut rchap = MutualChap::new(mutual_secret);
            if let Err(e) = rchap.receive(chap_i, chap_c) {
                return self.fail(&request, e);
            }
            let chap_r_out = match rchap.response() {
                Ok(value) => value,
                Err(e) => return self.fail(&request, e),
            };
            let mut response_keys = KeySet::new();
            response_keys.add("CHAP_N", mutual_user);
            response_keys.add("CHAP_R", &chap_r_out);
            response.data = response_keys.save();
        } else {
            debug!("initiator did not request target authentication");
        }

        self.transport.send_pdu(&response.to_raw())?;

        self.conn.user = Some(auth.user.clone());
        self.conn.chap = Some(chap);
        Ok(())
    }

    /// Operational parameter negotiation: answer every offered key,
    /// accepting further Login Requests until the initiator sets the
    /// transit flag, then finalize with the Full Feature Phase
    /// transition and a fresh TSIH.
    fn negotiate(
        &mut self,
        target: Option<&Target>,
        mut pending: Option<LoginRequest>,
    ) -> LoginResult<()> {
        let skipped_security = pending.is_some();
        if !skipped_security {
            debug!("beginning operational parameter negotiation; waiting for Login PDU");
        }

        let mut first = true;
        loop {
            let request = match pending.take() {
                Some(request) => request,
                None => self.receive(false)?,
            };

            let request_keys = match KeySet::load(&request.data) {
                Ok(keys) => keys,
                Err(e) => return self.fail(&request, e),
            };

            let mut response_keys = KeySet::new();
            if first && skipped_security && self.conn.session_type == Some(SessionType::Normal) {
                if let Some(target) = target {
                    self.add_target_keys(&mut response_keys, target);
                }
            }

            for (name, value) in request_keys.iter() {
                if let Err(e) =
                    self.negotiate_key(name, value, skipped_security, &mut response_keys)
                {
                    return self.fail(&request, e);
                }
            }

            let mut response = self.new_response(&request);
            response.csg = stage::OPERATIONAL_NEGOTIATION;
            response.data = response_keys.save();

            if request.transit {
                debug!(
                    "operational parameter negotiation done; \
                     transitioning to Full Feature Phase"
                );
                response.transit = true;
                response.nsg = stage::FULL_FEATURE_PHASE;
                response.tsih = rand::thread_rng().gen_range(1..=u16::MAX);
                self.transport.send_pdu(&response.to_raw())?;
                return Ok(());
            }

            response.nsg = stage::OPERATIONAL_NEGOTIATION;
            self.transport.send_pdu(&response.to_raw())?;
            first = false;
        }
    }

    /// Apply the negotiation rule for one offered key
    fn negotiate_key(
        &mut self,
        name: &str,
        value: &str,
        skipped_security: bool,
        response_keys: &mut KeySet,
    ) -> LoginResult<()> {
        match name {
            // Identity keys are fixed by the first PDU. Once a real
            // security phase fixed them, resending any of them is
            // fatal; on a connection that skipped security they are
            // consumed without an answer for the rest of negotiation.
            "InitiatorName" | "SessionType" | "TargetName" => {
                if !skipped_security {
                    return Err(LoginError::ProtocolViolation(format!(
                        "initiator resent {}",
                        name
                    )));
                }
                Ok(())
            }
            "InitiatorAlias" => {
                self.conn.initiator_alias = Some(value.to_string());
                Ok(())
            }
            _ if value == IRRELEVANT => Ok(()),
            "HeaderDigest" | "DataDigest" => {
                self.negotiate_digest(name, value, response_keys);
                Ok(())
            }
            "MaxConnections" => {
                response_keys.add(name, "1");
                Ok(())
            }
            "InitialR2T" => {
                response_keys.add(name, "Yes");
                Ok(())
            }
            "ImmediateData" => {
                if self.conn.is_discovery() {
                    debug!("discovery session; ImmediateData irrelevant");
                    response_keys.add(name, IRRELEVANT);
                } else if value == "Yes" {
                    self.conn.immediate_data = true;
                    response_keys.add(name, "Yes");
                } else {
                    self.conn.immediate_data = false;
                    response_keys.add(name, "No");
                }
                Ok(())
            }
            "MaxRecvDataSegmentLength" => {
                let offered = parse_positive(name, value)?;
                let capped = if offered > i64::from(MAX_DATA_SEGMENT_LENGTH) {
                    debug!(
                        "capping MaxRecvDataSegmentLength from {} to {}",
                        offered, MAX_DATA_SEGMENT_LENGTH
                    );
                    MAX_DATA_SEGMENT_LENGTH
                } else {
                    offered as u32
                };
                self.conn.max_data_segment_length = capped;
                response_keys.add_int(name, i64::from(capped));
                Ok(())
            }
            "MaxBurstLength" => {
                let offered = parse_positive(name, value)?;
                let capped = if offered > i64::from(MAX_BURST_LENGTH) {
                    debug!(
                        "capping MaxBurstLength from {} to {}",
                        offered, MAX_BURST_LENGTH
                    );
                    MAX_BURST_LENGTH
                } else {
                    offered as u32
                };
                self.conn.max_burst_length = capped;
                // The reply echoes the offered value; only the stored
                // value is capped.
                response_keys.add(name, value);
                Ok(())
            }
            "FirstBurstLength" => {
                let offered = parse_positive(name, value)?;
                let capped = if offered > i64::from(MAX_DATA_SEGMENT_LENGTH) {
                    debug!(
                        "capping FirstBurstLength from {} to {}",
                        offered, MAX_DATA_SEGMENT_LENGTH
                    );
                    MAX_DATA_SEGMENT_LENGTH
                } else {
                    offered as u32
                };
                response_keys.add_int(name, i64::from(capped));
                Ok(())
            }
            "DefaultTime2Wait" => {
                response_keys.add(name, value);
                Ok(())
            }
            "DefaultTime2Retain" => {
                response_keys.add(name, "0");
                Ok(())
            }
            "MaxOutstandingR2T" => {
                response_keys.add(name, "1");
                Ok(())
            }
            "DataPDUInOrder" => {
                response_keys.add(name, "Yes");
                Ok(())
            }
            "DataSequenceInOrder" => {
                response_keys.add(name, "Yes");
                Ok(())
            }
            "ErrorRecoveryLevel" => {
                response_keys.add(name, "0");
                Ok(())
            }
            "OFMarker" => {
                response_keys.add(name, "No");
                Ok(())
            }
            "IFMarker" => {
                response_keys.add(name, "No");
                Ok(())
            }
            _ => {
                debug!("unknown key \"{}\"; responding with NotUnderstood", name);
                response_keys.add(name, NOT_UNDERSTOOD);
                Ok(())
            }
        }
    }

    /// Digest negotiation is a preference-list choice between CRC32C
    /// and None; discovery sessions always answer None.
    fn negotiate_digest(&mut self, name: &str, value: &str, response_keys: &mut KeySet) {
        if self.conn.is_discovery() {
            debug!("discovery session; digests disabled");
            response_keys.add(name, "None");
            return;
        }

        match list_prefers(value, "CRC32C", "None") {
            Some(1) => {
                debug!("initiator prefers CRC32C for {}; we'll use it", name);
                match name {
                    "HeaderDigest" => self.conn.header_digest = DigestType::Crc32c,
                    _ => self.conn.data_digest = DigestType::Crc32c,
                }
                response_keys.add(name, "CRC32C");
            }
            Some(_) => {
                debug!("initiator prefers not to do {}; we'll comply", name);
                response_keys.add(name, "None");
            }
            None => {
                warn!(
                    "initiator sent unrecognized {} value \"{}\"; will use None",
                    name, value
                );
                response_keys.add(name, "None");
            }
        }
    }

    /// Target alias and portal group tag, sent to Normal sessions
    /// alongside the first response of their security or (when skipped)
    /// operational phase.
    fn add_target_keys(&self, response_keys: &mut KeySet, target: &Target) {
        if let Some(alias) = target.alias() {
            response_keys.add("TargetAlias", alias);
        }
        response_keys.add_int("TargetPortalGroupTag", i64::from(self.portal_group.tag()));
    }
}

/// Parse a numeric key value; non-positive or unparseable is fatal
fn parse_positive(name: &str, value: &str) -> LoginResult<i64> {
    match value.parse::<i64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(LoginError::MalformedUnit(format!(
            "received invalid {} \"{}\"",
            name, value
        ))),
    }
}
