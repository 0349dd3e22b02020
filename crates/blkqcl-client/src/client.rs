use std::time::Duration;

use blkqcl_core::encoding::tree::Element;
use blkqcl_core::envelope::{self, ResultEnvelope};
use blkqcl_core::services::configuration::{
    self, SetFactorySettingsRequest, SetUserSettingsRequest, GET_FACTORY_SETTINGS,
    GET_USER_SETTINGS, RESET_TO_FACTORY_DEFAULTS,
};
use blkqcl_core::services::device_management::{
    self, ClearAlarmsRequest, GetToggleSwitchStateRequest, SetDeviceNameRequest,
    SetLaserPointerRequest, SetPowerStateRequest, SetToggleSwitchStateRequest, GET_ALARMS,
    GET_BATTERY_STATUS, GET_DEVICE_NAME, GET_LASER_POINTER_ON, GET_POWER_STATE,
    GET_VERSION_DETAILS,
};
use blkqcl_core::services::laser_operation::{
    self, DelayRequest, MoveTuneRequest, StepTuneRequest, SweepTuneRequest,
    EXTERNALLY_CONTROLLED_TUNE, STOP_LASERS,
};
use blkqcl_core::services::registers::{self, ControlUnit, PeekRequest, PokeRequest};
use blkqcl_core::services::scan::{self, InterleavedScanRequest, StepScanRequest, SweepScanRequest};
use blkqcl_core::services::sensors::{self, ReadSensorsRequest};
use blkqcl_core::services::bare_command;
use blkqcl_core::types::{AlarmSelection, SensorSelection, ToggleState, ToggleSwitch};
use blkqcl_core::{CommandResult, DecodeError, ProtocolVersion, Spectrum};
use blkqcl_transport::{
    Authorization, HttpRequest, HttpTransport, KeepAliveTransport, PipelinedTransport, Transport,
};

use crate::config::{ClientConfig, VersionSelector};
use crate::fault;
use crate::ClientError;

/// An async client bound to one device and one protocol version.
///
/// Every operation takes `&mut self`; a client serves one call at a time.
#[derive(Debug)]
pub struct BlkqclClient<T: Transport = HttpTransport> {
    transport: T,
    version: ProtocolVersion,
    authorization: Option<Authorization>,
    last_envelope: ResultEnvelope,
}

impl BlkqclClient<HttpTransport> {
    /// Connects per `config`, negotiating the protocol version when it is not
    /// given explicitly.
    ///
    /// Negotiation always runs over a keep-alive connection. A pipelined
    /// transport replaces it once the version is bound, so the negotiation request
    /// is never the one frozen for replay.
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let options = config.transport_options();
        let keep_alive = KeepAliveTransport::new(config.endpoint().clone(), options);
        let mut client = Self::with_transport(
            HttpTransport::KeepAlive(keep_alive),
            config.version(),
            config.authorization().cloned(),
        )
        .await?;

        if let Some(depth) = config.pipelining().depth() {
            log::debug!("switching {} to pipelined mode, depth {depth}", config.endpoint());
            client.transport.close().await;
            client.transport = HttpTransport::Pipelined(PipelinedTransport::new(
                config.endpoint().clone(),
                options,
                depth,
            ));
        }
        Ok(client)
    }
}

impl<T: Transport> BlkqclClient<T> {
    /// Wraps an existing transport. An explicit version is used as given;
    /// `Automatic` negotiates with the device before returning.
    pub async fn with_transport(
        transport: T,
        version: VersionSelector,
        authorization: Option<Authorization>,
    ) -> Result<Self, ClientError> {
        let mut client = Self {
            transport,
            version: ProtocolVersion::NEWEST,
            authorization,
            last_envelope: ResultEnvelope::default(),
        };
        match version {
            VersionSelector::Explicit(v) => client.version = v,
            VersionSelector::Automatic => client.negotiate().await?,
        }
        Ok(client)
    }

    /// Tries `GetDeviceName` under each known namespace, newest first. Only a
    /// SOAP fault moves on to the next older revision.
    async fn negotiate(&mut self) -> Result<(), ClientError> {
        for version in ProtocolVersion::ALL {
            self.version = version;
            match self.get_device_name().await {
                Ok(name) => {
                    log::debug!("device {name:?} speaks {version}");
                    return Ok(());
                }
                Err(ClientError::Fault(fault)) => {
                    log::debug!("device rejected {version}: {fault}");
                }
                Err(err) => return Err(err),
            }
        }
        Err(ClientError::NegotiationFailed)
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Metadata of the most recent response.
    pub fn last_envelope(&self) -> ResultEnvelope {
        self.last_envelope
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn close(&mut self) {
        self.transport.close().await;
    }

    /// Sends one fragment and returns the raw body of a 2xx response.
    async fn exchange(&mut self, fragment: &str) -> Result<Vec<u8>, ClientError> {
        self.last_envelope = ResultEnvelope::default();
        let request = HttpRequest::soap(envelope::wrap(fragment, self.version))
            .with_authorization(self.authorization.as_ref());
        let response = self.transport.round_trip(&request).await?;
        response.error_for_status().map_err(fault::translate)
    }

    /// Sends one fragment and parses the response document.
    async fn call(&mut self, fragment: &str) -> Result<Element, ClientError> {
        let body = self.exchange(fragment).await?;
        let root = envelope::unwrap(&body)?;
        self.last_envelope.timestamp = envelope::timestamp(&root)?;
        Ok(root)
    }

    async fn call_bare(&mut self, command: &str) -> Result<Element, ClientError> {
        self.call(&bare_command(command)).await
    }

    async fn scan(&mut self, fragment: &str) -> Result<Spectrum, ClientError> {
        let body = self.exchange(fragment).await?;
        let result = scan::decode_spectrum(&body)?;
        self.last_envelope.timestamp = result.timestamp;
        Ok(result.spectrum)
    }

    pub async fn get_device_name(&mut self) -> Result<String, ClientError> {
        let root = self.call_bare(GET_DEVICE_NAME).await?;
        Ok(device_management::decode_device_name(&root, self.version)?)
    }

    pub async fn set_device_name(&mut self, name: &str) -> Result<(), ClientError> {
        self.call(&SetDeviceNameRequest { name }.encode()).await?;
        Ok(())
    }

    pub async fn get_factory_settings(&mut self) -> Result<CommandResult, ClientError> {
        let root = self.call_bare(GET_FACTORY_SETTINGS).await?;
        Ok(configuration::decode_factory_settings(&root, self.version)?)
    }

    pub async fn set_factory_settings(&mut self, settings: &CommandResult) -> Result<(), ClientError> {
        let fragment = SetFactorySettingsRequest { settings }.encode(self.version)?;
        self.call(&fragment).await?;
        Ok(())
    }

    pub async fn reset_to_factory_defaults(&mut self) -> Result<(), ClientError> {
        self.call_bare(RESET_TO_FACTORY_DEFAULTS).await?;
        Ok(())
    }

    pub async fn get_user_settings(&mut self) -> Result<CommandResult, ClientError> {
        let root = self.call_bare(GET_USER_SETTINGS).await?;
        Ok(configuration::decode_user_settings(&root, self.version)?)
    }

    pub async fn set_user_settings(&mut self, settings: &CommandResult) -> Result<(), ClientError> {
        let fragment = SetUserSettingsRequest { settings }.encode(self.version)?;
        self.call(&fragment).await?;
        Ok(())
    }

    pub async fn get_alarms(&mut self) -> Result<Vec<String>, ClientError> {
        let root = self.call_bare(GET_ALARMS).await?;
        Ok(device_management::decode_alarms(&root, self.version))
    }

    /// Clears the selected alarms and returns the ones still active.
    pub async fn clear_alarms(&mut self, selection: AlarmSelection) -> Result<Vec<String>, ClientError> {
        let root = self.call(&ClearAlarmsRequest { selection }.encode()).await?;
        Ok(device_management::decode_alarms(&root, self.version))
    }

    pub async fn get_battery_status(&mut self) -> Result<CommandResult, ClientError> {
        let root = self.call_bare(GET_BATTERY_STATUS).await?;
        Ok(device_management::decode_battery_status(&root, self.version)?)
    }

    pub async fn get_power_state(&mut self) -> Result<String, ClientError> {
        let root = self.call_bare(GET_POWER_STATE).await?;
        Ok(device_management::decode_power_state(&root, self.version)?)
    }

    pub async fn set_power_state(&mut self, state: &str) -> Result<(), ClientError> {
        self.call(&SetPowerStateRequest { state }.encode()).await?;
        Ok(())
    }

    pub async fn get_version_details(&mut self) -> Result<CommandResult, ClientError> {
        let root = self.call_bare(GET_VERSION_DETAILS).await?;
        Ok(device_management::decode_version_details(&root, self.version)?)
    }

    pub async fn get_laser_pointer_on(&mut self) -> Result<bool, ClientError> {
        let root = self.call_bare(GET_LASER_POINTER_ON).await?;
        Ok(device_management::decode_laser_pointer(&root, self.version)?)
    }

    pub async fn set_laser_pointer_on(&mut self, on: bool) -> Result<(), ClientError> {
        self.call(&SetLaserPointerRequest { on }.encode()).await?;
        Ok(())
    }

    pub async fn get_toggle_switch_state(
        &mut self,
        which: ToggleSwitch,
    ) -> Result<ToggleState, ClientError> {
        let root = self.call(&GetToggleSwitchStateRequest { which }.encode()).await?;
        Ok(device_management::decode_toggle_state(&root, self.version)?)
    }

    pub async fn set_toggle_switch_state(
        &mut self,
        which: ToggleSwitch,
        state: ToggleState,
    ) -> Result<(), ClientError> {
        self.call(&SetToggleSwitchStateRequest { which, state }.encode())
            .await?;
        Ok(())
    }

    pub async fn read_sensors(
        &mut self,
        selection: SensorSelection,
    ) -> Result<CommandResult, ClientError> {
        let fragment = ReadSensorsRequest { selection }.encode()?;
        let root = self.call(&fragment).await?;
        Ok(sensors::decode_sensor_readings(&root, self.version)?)
    }

    pub async fn stop_lasers(&mut self) -> Result<(), ClientError> {
        self.call_bare(STOP_LASERS).await?;
        Ok(())
    }

    /// Returns the wave number the device settled on.
    pub async fn move_tune(&mut self, request: &MoveTuneRequest) -> Result<f64, ClientError> {
        let root = self.call(&request.encode(self.version)?).await?;
        Ok(laser_operation::decode_move_tune(&root, self.version)?)
    }

    /// Returns every wave number visited.
    pub async fn step_tune(&mut self, request: &StepTuneRequest) -> Result<Vec<f64>, ClientError> {
        let root = self.call(&request.encode(self.version)?).await?;
        Ok(laser_operation::decode_step_tune(&root, self.version)?)
    }

    /// On 2014 revisions each repeat is a separate request, sent back to back.
    pub async fn sweep_tune(&mut self, request: &SweepTuneRequest) -> Result<(), ClientError> {
        let repeated = request.encode(self.version)?;
        if repeated.sends > 1 && !request.inter_repeat_delay.is_zero() {
            log::warn!(
                "{} cannot delay between sweep repeats; ignoring {:?}",
                self.version,
                request.inter_repeat_delay
            );
        }
        for _ in 0..repeated.sends {
            self.call(&repeated.fragment).await?;
        }
        Ok(())
    }

    pub async fn externally_controlled_tune(&mut self) -> Result<(), ClientError> {
        self.call_bare(EXTERNALLY_CONTROLLED_TUNE).await?;
        Ok(())
    }

    /// Device-side pause, useful between queued operations.
    pub async fn delay(&mut self, duration: Duration) -> Result<(), ClientError> {
        self.call(&DelayRequest { duration }.encode()).await?;
        Ok(())
    }

    pub async fn step_scan(&mut self, request: &StepScanRequest) -> Result<Spectrum, ClientError> {
        let fragment = request.encode(self.version)?;
        self.scan(&fragment).await
    }

    pub async fn sweep_scan(&mut self, request: &SweepScanRequest) -> Result<Spectrum, ClientError> {
        let fragment = request.encode()?;
        self.scan(&fragment).await
    }

    pub async fn interleaved_scan(
        &mut self,
        request: &InterleavedScanRequest,
    ) -> Result<Spectrum, ClientError> {
        let fragment = request.encode(self.version)?;
        self.scan(&fragment).await
    }

    async fn peek(
        &mut self,
        unit: ControlUnit,
        register: &str,
        repeat_count: u32,
    ) -> Result<Vec<i64>, ClientError> {
        let repeated = PeekRequest {
            unit,
            register,
            repeat_count,
        }
        .encode(self.version)?;
        let mut values = Vec::new();
        for _ in 0..repeated.sends {
            let root = self.call(&repeated.fragment).await?;
            values.extend(registers::decode_peek_values(&root, self.version)?);
        }
        Ok(values)
    }

    async fn peek_one(&mut self, unit: ControlUnit, register: &str) -> Result<i64, ClientError> {
        let values = self.peek(unit, register, 1).await?;
        values
            .first()
            .copied()
            .ok_or(ClientError::Decode(DecodeError::MissingElement("Value")))
    }

    async fn poke(&mut self, unit: ControlUnit, register: &str, value: i64) -> Result<(), ClientError> {
        let fragment = PokeRequest {
            unit,
            register,
            value,
        }
        .encode()?;
        self.call(&fragment).await?;
        Ok(())
    }

    pub async fn acu_peek(&mut self, register: &str) -> Result<i64, ClientError> {
        self.peek_one(ControlUnit::Acu, register).await
    }

    /// Reads `register` `repeat_count` times, in order.
    pub async fn acu_peek_repeated(
        &mut self,
        register: &str,
        repeat_count: u32,
    ) -> Result<Vec<i64>, ClientError> {
        self.peek(ControlUnit::Acu, register, repeat_count).await
    }

    pub async fn acu_poke(&mut self, register: &str, value: i64) -> Result<(), ClientError> {
        self.poke(ControlUnit::Acu, register, value).await
    }

    pub async fn ccu_peek(&mut self, register: &str) -> Result<i64, ClientError> {
        self.peek_one(ControlUnit::Ccu, register).await
    }

    pub async fn ccu_peek_repeated(
        &mut self,
        register: &str,
        repeat_count: u32,
    ) -> Result<Vec<i64>, ClientError> {
        self.peek(ControlUnit::Ccu, register, repeat_count).await
    }

    pub async fn ccu_poke(&mut self, register: &str, value: i64) -> Result<(), ClientError> {
        self.poke(ControlUnit::Ccu, register, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blkqcl_core::types::LaserTransition;
    use blkqcl_core::services::scan::CoAdd;
    use blkqcl_transport::{HttpResponse, TransportError};
    use std::collections::VecDeque;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Debug, Default)]
    struct MockState {
        sent: Mutex<Vec<HttpRequest>>,
        replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    }

    #[derive(Debug, Clone)]
    struct MockTransport {
        state: Arc<MockState>,
    }

    impl MockTransport {
        fn new() -> (Self, Arc<MockState>) {
            let state = Arc::new(MockState::default());
            (
                Self {
                    state: state.clone(),
                },
                state,
            )
        }
    }

    impl Transport for MockTransport {
        async fn round_trip(
            &mut self,
            request: &HttpRequest,
        ) -> Result<HttpResponse, TransportError> {
            self.state.sent.lock().await.push(request.clone());
            self.state
                .replies
                .lock()
                .await
                .pop_front()
                .unwrap_or(Err(TransportError::ConnectionClosed))
        }

        async fn close(&mut self) {}
    }

    async fn push(state: &MockState, reply: HttpResponse) {
        state.replies.lock().await.push_back(Ok(reply));
    }

    fn ok(version: ProtocolVersion, body: &str) -> HttpResponse {
        HttpResponse::new(200, "OK", Vec::new(), envelope::wrap(body, version).into_bytes())
    }

    fn soap_fault() -> HttpResponse {
        let body = "<soapenv:Envelope xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\">\
                    <soapenv:Body><soapenv:Fault><faultcode>soapenv:Client</faultcode>\
                    <faultstring>Unknown namespace</faultstring></soapenv:Fault></soapenv:Body>\
                    </soapenv:Envelope>";
        HttpResponse::new(500, "Internal Server Error", Vec::new(), body.as_bytes().to_vec())
    }

    fn device_name(version: ProtocolVersion) -> HttpResponse {
        ok(
            version,
            "<blk:GetDeviceNameResponse>Bench 2</blk:GetDeviceNameResponse>",
        )
    }

    fn body_of(request: &HttpRequest) -> String {
        String::from_utf8(request.body().to_vec()).unwrap()
    }

    fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
        request
            .headers()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    async fn explicit(
        version: ProtocolVersion,
    ) -> (BlkqclClient<MockTransport>, Arc<MockState>) {
        let (transport, state) = MockTransport::new();
        let client = BlkqclClient::with_transport(transport, version.into(), None)
            .await
            .unwrap();
        (client, state)
    }

    #[tokio::test]
    async fn negotiation_walks_down_to_first_accepted_version() {
        let (transport, state) = MockTransport::new();
        push(&state, soap_fault()).await;
        push(&state, soap_fault()).await;
        push(&state, device_name(ProtocolVersion::V2015_05)).await;

        let client = BlkqclClient::with_transport(transport, VersionSelector::Automatic, None)
            .await
            .unwrap();
        assert_eq!(client.version(), ProtocolVersion::V2015_05);

        let sent = state.sent.lock().await;
        assert_eq!(sent.len(), 3);
        assert!(body_of(&sent[0]).contains(ProtocolVersion::V2017_04.namespace()));
        assert!(body_of(&sent[1]).contains(ProtocolVersion::V2016_05.namespace()));
        assert!(body_of(&sent[2]).contains(ProtocolVersion::V2015_05.namespace()));
        assert!(body_of(&sent[2]).contains("<blk:GetDeviceName/>"));
    }

    #[tokio::test]
    async fn negotiation_fails_when_every_version_faults() {
        let (transport, state) = MockTransport::new();
        for _ in ProtocolVersion::ALL {
            push(&state, soap_fault()).await;
        }
        let err = BlkqclClient::with_transport(transport, VersionSelector::Automatic, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NegotiationFailed));
        assert_eq!(state.sent.lock().await.len(), 5);
    }

    #[tokio::test]
    async fn negotiation_stops_on_transport_error() {
        let (transport, state) = MockTransport::new();
        state
            .replies
            .lock()
            .await
            .push_back(Err(TransportError::ResponseTimeout));
        let err = BlkqclClient::with_transport(transport, VersionSelector::Automatic, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::ResponseTimeout)
        ));
        assert_eq!(state.sent.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn negotiation_stops_on_non_fault_status() {
        let (transport, state) = MockTransport::new();
        push(
            &state,
            HttpResponse::new(401, "Unauthorized", Vec::new(), Vec::new()),
        )
        .await;
        let err = BlkqclClient::with_transport(transport, VersionSelector::Automatic, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::HttpStatus(ref e) if e.status == 401));
        assert_eq!(state.sent.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn explicit_version_skips_negotiation() {
        let (client, state) = explicit(ProtocolVersion::V2014_07).await;
        assert_eq!(client.version(), ProtocolVersion::V2014_07);
        assert!(state.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn authorization_is_sent_with_every_request() {
        let (transport, state) = MockTransport::new();
        push(&state, device_name(ProtocolVersion::V2017_04)).await;
        push(&state, ok(ProtocolVersion::V2017_04, "<blk:StopLasersResponse/>")).await;

        let auth = Authorization::basic("operator", "secret").unwrap();
        let mut client =
            BlkqclClient::with_transport(transport, VersionSelector::Automatic, Some(auth.clone()))
                .await
                .unwrap();
        client.stop_lasers().await.unwrap();

        let sent = state.sent.lock().await;
        assert_eq!(sent.len(), 2);
        for request in sent.iter() {
            assert_eq!(header(request, "Authorization"), Some(auth.header_value()));
        }
    }

    #[tokio::test]
    async fn fault_after_negotiation_surfaces_fault_string() {
        let (mut client, state) = explicit(ProtocolVersion::V2016_05).await;
        push(&state, soap_fault()).await;
        let err = client.stop_lasers().await.unwrap_err();
        match err {
            ClientError::Fault(fault) => {
                assert_eq!(fault.fault_string, "Unknown namespace");
                assert_eq!(fault.status(), 500);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn sweep_tune_repeats_client_side_on_2014() {
        let request = SweepTuneRequest {
            start: 1000.0,
            end: 1100.0,
            rate: 10.0,
            repeat_count: 3,
            inter_repeat_delay: Duration::from_secs(2),
        };

        let (mut client, state) = explicit(ProtocolVersion::V2014_04).await;
        for _ in 0..3 {
            push(&state, ok(ProtocolVersion::V2014_04, "<blk:SweepTuneResponse/>")).await;
        }
        client.sweep_tune(&request).await.unwrap();
        let sent = state.sent.lock().await;
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|r| !body_of(r).contains("repeatCount")));
        drop(sent);

        let (mut client, state) = explicit(ProtocolVersion::V2017_04).await;
        push(&state, ok(ProtocolVersion::V2017_04, "<blk:SweepTuneResponse/>")).await;
        client.sweep_tune(&request).await.unwrap();
        let sent = state.sent.lock().await;
        assert_eq!(sent.len(), 1);
        let body = body_of(&sent[0]);
        assert!(body.contains("repeatCount=\"3\""));
        assert!(body.contains("interRepeatDelay=\"PT2S\""));
    }

    #[tokio::test]
    async fn last_envelope_tracks_latest_timestamp() {
        let (mut client, state) = explicit(ProtocolVersion::V2016_05).await;
        push(
            &state,
            ok(
                ProtocolVersion::V2016_05,
                "<blk:GetPowerStateResponse>Ready</blk:GetPowerStateResponse>\
                 <blk:timestamp>1462900000.25</blk:timestamp>",
            ),
        )
        .await;
        push(
            &state,
            ok(ProtocolVersion::V2016_05, "<blk:StopLasersResponse/>"),
        )
        .await;

        assert_eq!(client.get_power_state().await.unwrap(), "Ready");
        assert_eq!(client.last_envelope().timestamp, Some(1462900000.25));
        client.stop_lasers().await.unwrap();
        assert_eq!(client.last_envelope().timestamp, None);
    }

    #[tokio::test]
    async fn repeated_peek_on_2014_sends_one_request_per_read() {
        let (mut client, state) = explicit(ProtocolVersion::V2014_07).await;
        for value in [7, 8, 9] {
            push(
                &state,
                ok(
                    ProtocolVersion::V2014_07,
                    &format!("<blk:CCUPeekResponse><blk:Value>{value}</blk:Value></blk:CCUPeekResponse>"),
                ),
            )
            .await;
        }
        let values = client.ccu_peek_repeated("TEC_SETPOINT", 3).await.unwrap();
        assert_eq!(values, vec![7, 8, 9]);

        let sent = state.sent.lock().await;
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|r| !body_of(r).contains("RepeatCount")));
    }

    #[tokio::test]
    async fn repeated_peek_uses_repeat_count_from_2015() {
        let (mut client, state) = explicit(ProtocolVersion::V2015_05).await;
        push(
            &state,
            ok(
                ProtocolVersion::V2015_05,
                "<blk:ACUPeekResponse><blk:Value>1</blk:Value><blk:Value>-2</blk:Value>\
                 </blk:ACUPeekResponse>",
            ),
        )
        .await;
        let values = client.acu_peek_repeated("MIRROR_POS", 2).await.unwrap();
        assert_eq!(values, vec![1, -2]);

        let sent = state.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert!(body_of(&sent[0]).contains("<blk:RepeatCount>2</blk:RepeatCount>"));
    }

    #[tokio::test]
    async fn huge_legacy_peek_streams_requests_until_failure() {
        let (mut client, state) = explicit(ProtocolVersion::V2014_04).await;
        for value in [4, 5] {
            push(
                &state,
                ok(
                    ProtocolVersion::V2014_04,
                    &format!("<blk:ACUPeekResponse><blk:Value>{value}</blk:Value></blk:ACUPeekResponse>"),
                ),
            )
            .await;
        }
        let err = client
            .acu_peek_repeated("GAIN", u32::MAX)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::ConnectionClosed)
        ));
        assert_eq!(state.sent.lock().await.len(), 3);
    }

    #[tokio::test]
    async fn huge_repeat_count_on_newer_schema_is_one_request() {
        let (mut client, state) = explicit(ProtocolVersion::V2016_05).await;
        push(
            &state,
            ok(
                ProtocolVersion::V2016_05,
                "<blk:CCUPeekResponse><blk:Value>1</blk:Value></blk:CCUPeekResponse>",
            ),
        )
        .await;
        let values = client.ccu_peek_repeated("GAIN", u32::MAX).await.unwrap();
        assert_eq!(values, vec![1]);
        let sent = state.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert!(body_of(&sent[0]).contains("<blk:RepeatCount>4294967295</blk:RepeatCount>"));
    }

    #[tokio::test]
    async fn invalid_argument_is_rejected_before_sending() {
        let (mut client, state) = explicit(ProtocolVersion::V2017_04).await;
        let err = client.acu_peek_repeated("MIRROR_POS", 0).await.unwrap_err();
        assert!(matches!(err, ClientError::Encode(_)));
        assert!(state.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn step_scan_returns_spectrum_and_timestamp() {
        let (mut client, state) = explicit(ProtocolVersion::V2017_04).await;
        push(
            &state,
            ok(
                ProtocolVersion::V2017_04,
                "<blk:StepScanResponse><blk:Spectrum>\
                 <blk:Measurement waveNumber=\"1000.0\" intensity=\"0.5\"/>\
                 <blk:Measurement intensity=\"0.75\" waveNumber=\"1005.0\"/>\
                 </blk:Spectrum></blk:StepScanResponse><blk:timestamp>12.5</blk:timestamp>",
            ),
        )
        .await;

        let spectrum = client
            .step_scan(&StepScanRequest {
                start: 1000.0,
                end: 1005.0,
                delta: 5.0,
                dwell: Duration::from_millis(50),
                transition: LaserTransition::LaserOn,
                co_add: CoAdd {
                    scans_per_spectrum: 1,
                    delay_between: Duration::ZERO,
                },
            })
            .await
            .unwrap();
        assert_eq!(spectrum.len(), 2);
        assert_eq!(spectrum.get(1005.0), Some(0.75));
        assert_eq!(client.last_envelope().timestamp, Some(12.5));
    }

    #[tokio::test]
    async fn move_tune_returns_device_wave_number() {
        let (mut client, state) = explicit(ProtocolVersion::V2016_05).await;
        push(
            &state,
            ok(
                ProtocolVersion::V2016_05,
                "<blk:MoveTuneResponse><blk:WaveNumber>1234.5</blk:WaveNumber></blk:MoveTuneResponse>",
            ),
        )
        .await;
        let reached = client
            .move_tune(&MoveTuneRequest::single(1234.5, LaserTransition::LaserOn))
            .await
            .unwrap();
        assert_eq!(reached, 1234.5);
    }
}
