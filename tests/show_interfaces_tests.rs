//! End-to-end tests over the built-in Cisco IOS template
use ifdiag::diagnostics::{observe, Severity};
use ifdiag::template::{TemplateRegistry, SHOW_INTERFACES_TEMPLATE};
use ifdiag::{analyze, evaluate, parse, ParseError};

const SHOW_INTERFACES: &str = "\
FastEthernet0/1 is up, line protocol is up (connected)
  Hardware is Fast Ethernet, address is 0011.2233.4401 (bia 0011.2233.4401)
  Description: legacy printer
  MTU 1500 bytes, BW 10000 Kbit/sec, DLY 1000 usec,
     reliability 255/255, txload 1/255, rxload 1/255
  Encapsulation ARPA, loopback not set
  Half-duplex, 10Mb/s, media type is 10/100BaseTX
  input flow-control is off, output flow-control is unsupported
     5 minute input rate 0 bits/sec, 0 packets/sec
     1024 packets input, 65536 bytes, 0 no buffer
     0 runts, 0 giants, 0 throttles
     1 input errors, 1 CRC, 0 frame, 0 overrun, 0 ignored
     2048 packets output, 131072 bytes, 0 underruns
     0 output errors, 0 collisions, 1 interface resets

GigabitEthernet0/1 is up, line protocol is up (connected)
  Hardware is Gigabit Ethernet, address is 0011.2233.4402 (bia 0011.2233.4402)
  MTU 1500 bytes, BW 1000000 Kbit/sec, DLY 10 usec,
  Full-duplex, 1000Mb/s, media type is 10/100/1000BaseTX
     0 input errors, 0 CRC, 0 frame, 0 overrun, 0 ignored
     0 output errors, 0 collisions, 0 interface resets
";

fn registry() -> TemplateRegistry {
    TemplateRegistry::with_builtin()
}

#[test]
fn test_two_interfaces_end_to_end() {
    let template = registry()
        .definition(SHOW_INTERFACES_TEMPLATE)
        .expect("builtin template");

    let records = parse(SHOW_INTERFACES, &template, false).expect("parse");
    assert_eq!(records.len(), 2, "one record per interface");

    assert_eq!(records[0].scalar("INTERFACE"), "FastEthernet0/1");
    assert_eq!(records[0].scalar("DESCRIPTION"), "legacy printer");
    assert_eq!(records[0].scalar("ADDRESS"), "0011.2233.4401");
    assert_eq!(records[0].scalar("PROTOCOL_STATUS"), "up (connected)");
    assert_eq!(records[1].scalar("INTERFACE"), "GigabitEthernet0/1");
    // Description is not Filldown, so it does not leak into the next record
    assert_eq!(records[1].scalar("DESCRIPTION"), "");

    let findings = evaluate(&observe(&records));
    assert_eq!(findings.len(), 2);
    assert!(findings.iter().all(|f| f.severity == Severity::Medium));
    assert!(findings.iter().all(|f| f.message.contains("FastEthernet0/1")));
    assert_eq!(
        findings[0].message,
        "Interface FastEthernet0/1 is operating in half-duplex mode."
    );
    assert_eq!(
        findings[1].message,
        "Interface FastEthernet0/1 reports errors (input=1, output=0, crc=1)."
    );
}

#[test]
fn test_observations_are_normalized() {
    let template = registry().definition(SHOW_INTERFACES_TEMPLATE).unwrap();
    let response = analyze(SHOW_INTERFACES, &template, false).unwrap();

    let first = &response.interfaces[0];
    assert_eq!(first.duplex, "half-duplex");
    assert_eq!(first.speed, "10Mbps");
    assert_eq!((first.input_errs, first.output_errs, first.crc), (1, 0, 1));

    let second = &response.interfaces[1];
    assert_eq!(second.duplex, "full-duplex");
    assert_eq!(second.speed, "1000Mbps");
    assert_eq!((second.input_errs, second.output_errs, second.crc), (0, 0, 0));

    assert_eq!(response.raw, SHOW_INTERFACES);
}

#[test]
fn test_auto_speed_passes_through() {
    let template = registry().definition(SHOW_INTERFACES_TEMPLATE).unwrap();
    let text = "\
GigabitEthernet1/0/3 is down, line protocol is down (notconnect)
  Hardware is Gigabit Ethernet, address is 00aa.bbcc.dd03 (bia 00aa.bbcc.dd03)
  Auto-duplex, Auto-speed, media type is 10/100/1000BaseTX
";

    let response = analyze(text, &template, false).unwrap();
    assert_eq!(response.interfaces.len(), 1);
    assert_eq!(response.interfaces[0].speed, "Auto-speed");
    assert_eq!(response.interfaces[0].duplex, "auto-duplex");
    assert!(response.findings.is_empty());
}

#[test]
fn test_crlf_output() {
    let template = registry().definition(SHOW_INTERFACES_TEMPLATE).unwrap();
    let text = SHOW_INTERFACES.replace('\n', "\r\n");

    let records = parse(&text, &template, false).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].scalar("SPEED"), "1000Mb/s");
}

#[test]
fn test_strict_mode_reports_first_unmatched_line() {
    let template = registry().definition(SHOW_INTERFACES_TEMPLATE).unwrap();

    let err = parse(SHOW_INTERFACES, &template, true).unwrap_err();
    match err {
        ParseError::UnmatchedLine {
            line_number,
            state,
            line,
        } => {
            assert_eq!(line_number, 5);
            assert_eq!(state, "Start");
            assert!(line.contains("reliability 255/255"));
        }
        other => panic!("expected unmatched line, got {:?}", other),
    }
}

#[test]
fn test_empty_output_yields_nothing() {
    let template = registry().definition(SHOW_INTERFACES_TEMPLATE).unwrap();
    let response = analyze("", &template, true).unwrap();
    assert!(response.interfaces.is_empty());
    assert!(response.findings.is_empty());
}
