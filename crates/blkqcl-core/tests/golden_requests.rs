use std::time::Duration;

use blkqcl_core::envelope::{self, wrap};
use blkqcl_core::fault::fault_string;
use blkqcl_core::services::device_management::{ClearAlarmsRequest, SetToggleSwitchStateRequest};
use blkqcl_core::services::laser_operation::{MoveTuneRequest, StepTuneRequest, SweepTuneRequest};
use blkqcl_core::services::registers::{decode_peek_values, ControlUnit, PeekRequest};
use blkqcl_core::services::scan::{decode_spectrum, CoAdd, InterleavedScanRequest, StepScanRequest};
use blkqcl_core::services::{bare_command, configuration, Repeated};
use blkqcl_core::types::{
    AlarmSelection, LaserTransition, ScanResolution, ToggleState, ToggleSwitch,
};
use blkqcl_core::{CommandResult, ProtocolVersion, Value};

fn envelope_for(version: ProtocolVersion, body: &str) -> String {
    format!(
        "<soapenv:Envelope xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\" \
         xmlns:blk=\"{}\"><soapenv:Header/><soapenv:Body>{body}</soapenv:Body></soapenv:Envelope>",
        version.namespace()
    )
}

#[test]
fn negotiation_envelope_matches_fixture() {
    assert_eq!(
        wrap(&bare_command("GetDeviceName"), ProtocolVersion::V2017_04),
        "<soapenv:Envelope xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\" \
         xmlns:blk=\"http://www.blockeng.com/Schemas/2017-04/BLKQCL/\"><soapenv:Header/>\
         <soapenv:Body><blk:GetDeviceName/></soapenv:Body></soapenv:Envelope>"
    );
}

#[test]
fn move_tune_per_revision() {
    let single = MoveTuneRequest::single(1150.0, LaserTransition::LaserOff);
    assert_eq!(
        wrap(&single.encode(ProtocolVersion::V2014_07).unwrap(), ProtocolVersion::V2014_07),
        envelope_for(
            ProtocolVersion::V2014_07,
            "<blk:MoveTune waveNumber=\"1150.0\" duringTransition=\"LaserOff\"/>"
        )
    );

    let many = MoveTuneRequest {
        wave_numbers: vec![1000.0, 1010.25],
        transition: LaserTransition::LaserOn,
    };
    assert_eq!(
        many.encode(ProtocolVersion::V2016_05).unwrap(),
        "<blk:MoveTune duringTransition=\"LaserOn\"><blk:WaveNumber>1000.0</blk:WaveNumber>\
         <blk:WaveNumber>1010.25</blk:WaveNumber></blk:MoveTune>"
    );
}

#[test]
fn step_tune_attribute_names_follow_revision() {
    let request = StepTuneRequest {
        start: 1000.0,
        end: 1100.0,
        delta: 0.5,
        dwell: Duration::from_millis(250),
        transition: LaserTransition::LaserOn,
    };
    assert_eq!(
        request.encode(ProtocolVersion::V2014_04).unwrap(),
        "<blk:StepTune startWaveNumber=\"1000.0\" stopWaveNumber=\"1100.0\" stepSize=\"0.5\" \
         dwellTime=\"PT0.25S\" duringTransition=\"LaserOn\"/>"
    );
    assert_eq!(
        request.encode(ProtocolVersion::V2017_04).unwrap(),
        "<blk:StepTune start=\"1000.0\" end=\"1100.0\" delta=\"0.5\" \
         dwellTime=\"PT0.25S\" duringTransition=\"LaserOn\"/>"
    );
}

#[test]
fn sweep_tune_repeats_client_side_before_2015() {
    let request = SweepTuneRequest {
        start: 900.0,
        end: 1200.0,
        rate: 100.0,
        repeat_count: 3,
        inter_repeat_delay: Duration::from_secs(2),
    };
    let legacy = request.encode(ProtocolVersion::V2014_07).unwrap();
    assert_eq!(legacy.sends, 3);
    assert_eq!(
        legacy.fragment,
        "<blk:SweepTune start=\"900.0\" end=\"1200.0\" sweepRate=\"100.0\"/>"
    );

    assert_eq!(
        request.encode(ProtocolVersion::V2015_05).unwrap(),
        Repeated::once(
            "<blk:SweepTune start=\"900.0\" end=\"1200.0\" sweepRate=\"100.0\" \
             repeatCount=\"3\" interRepeatDelay=\"PT2S\"/>"
                .to_string()
        )
    );
}

#[test]
fn scans_carry_co_add_block() {
    let co_add = CoAdd {
        scans_per_spectrum: 4,
        delay_between: Duration::from_millis(100),
    };
    let step = StepScanRequest {
        start: 1000.0,
        end: 1001.0,
        delta: 1.0,
        dwell: Duration::from_secs(1),
        transition: LaserTransition::LaserOff,
        co_add,
    };
    assert_eq!(
        step.encode(ProtocolVersion::V2016_05).unwrap(),
        "<blk:StepScan><blk:Start>1000.0</blk:Start><blk:End>1001.0</blk:End>\
         <blk:Delta>1.0</blk:Delta><blk:DwellTime>PT1S</blk:DwellTime>\
         <blk:DuringTransition>LaserOff</blk:DuringTransition>\
         <blk:ScansPerSpectrum>4</blk:ScansPerSpectrum>\
         <blk:DelayBetweenCoAdds>PT0.1S</blk:DelayBetweenCoAdds></blk:StepScan>"
    );

    let interleaved = InterleavedScanRequest {
        measurement_time: Duration::from_secs(5),
        resolution: ScanResolution::NaturalBinning,
        co_add: CoAdd::default(),
    };
    assert_eq!(
        interleaved.encode(ProtocolVersion::V2014_04).unwrap(),
        "<blk:InterleavedScan><blk:DeltaResolution>NaturalBinning</blk:DeltaResolution>\
         <blk:SingleSpectrumMeasurementTime>PT5S</blk:SingleSpectrumMeasurementTime>\
         <blk:ScansPerSpectrum>1</blk:ScansPerSpectrum>\
         <blk:DelayBetweenCoAdds>PT0S</blk:DelayBetweenCoAdds></blk:InterleavedScan>"
    );
}

#[test]
fn device_management_fragments() {
    assert_eq!(
        ClearAlarmsRequest {
            selection: AlarmSelection::All,
        }
        .encode(),
        "<blk:ClearAlarms><blk:All/></blk:ClearAlarms>"
    );
    assert_eq!(
        SetToggleSwitchStateRequest {
            which: ToggleSwitch::SolenoidB,
            state: ToggleState::On,
        }
        .encode(),
        "<blk:SetToggleSwitchState><blk:Which>SolenoidB</blk:Which>\
         <blk:State>On</blk:State></blk:SetToggleSwitchState>"
    );
}

#[test]
fn peek_request_and_response() {
    let request = PeekRequest {
        unit: ControlUnit::Ccu,
        register: "TEC_SETPOINT",
        repeat_count: 2,
    };
    assert_eq!(
        request.encode(ProtocolVersion::V2017_04).unwrap(),
        Repeated::once(
            "<blk:CCUPeek><blk:RegisterName>TEC_SETPOINT</blk:RegisterName>\
             <blk:RepeatCount>2</blk:RepeatCount></blk:CCUPeek>"
                .to_string()
        )
    );

    let response = envelope_for(
        ProtocolVersion::V2017_04,
        "<blk:CCUPeekResponse><blk:Value>17</blk:Value><blk:Value>-3</blk:Value>\
         </blk:CCUPeekResponse>",
    );
    let root = envelope::unwrap(response.as_bytes()).unwrap();
    assert_eq!(
        decode_peek_values(&root, ProtocolVersion::V2017_04).unwrap(),
        vec![17, -3]
    );
}

#[test]
fn user_settings_written_for_blk15() {
    let settings: CommandResult = [
        ("DetectorTemperatureSetPoint", Value::Float(-30.0)),
        ("GainDAC", Value::Int(2)),
    ]
    .into_iter()
    .collect();
    assert_eq!(
        configuration::SetUserSettingsRequest {
            settings: &settings,
        }
        .encode(ProtocolVersion::V2014_04)
        .unwrap(),
        "<blk:SetUserSettings><blk:GainDAC>2</blk:GainDAC>\
         <blk:CCUTemperatureSetPoint>-30.0</blk:CCUTemperatureSetPoint></blk:SetUserSettings>"
    );
}

#[test]
fn scan_response_streams_measurements() {
    let response = envelope_for(
        ProtocolVersion::V2016_05,
        "<blk:StepScanResponse><blk:timestamp>1496.25</blk:timestamp><blk:Measurements>\
         <blk:Measurement waveNumber=\"1000.0\" intensity=\"0.5\"/>\
         <blk:Measurement intensity=\"0.75\" waveNumber=\"1001.0\"/>\
         </blk:Measurements></blk:StepScanResponse>",
    );
    let result = decode_spectrum(response.as_bytes()).unwrap();
    assert_eq!(result.timestamp, Some(1496.25));
    assert_eq!(result.spectrum.len(), 2);
    assert_eq!(result.spectrum.get(1001.0), Some(0.75));
}

#[test]
fn fault_body_yields_fault_string() {
    let body = "<soapenv:Envelope xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\">\
                <soapenv:Body><soapenv:Fault><faultcode>soapenv:Server</faultcode>\
                <faultstring> Laser interlock open </faultstring></soapenv:Fault>\
                </soapenv:Body></soapenv:Envelope>";
    assert_eq!(
        fault_string(body.as_bytes()).as_deref(),
        Some("Laser interlock open")
    );
}
