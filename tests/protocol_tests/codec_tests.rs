//! Codec Tests
//!
//! Tests for command encoding, line reading and reply classification.

use std::io::{BufReader, Cursor, Read};

use glsclient::protocol::{
    read_line, read_reply, write_command, Command, FrameLimits, Opcode, Reply,
};
use glsclient::{ErrorKind, GlsError, Position, Waypoint};

// =============================================================================
// Helper Functions
// =============================================================================

fn reply_to(command: &Command, wire: &str) -> glsclient::Result<Reply> {
    let mut reader = Cursor::new(wire.as_bytes().to_vec());
    read_reply(&mut reader, command, FrameLimits::default())
}

fn reply(wire: &str) -> glsclient::Result<Reply> {
    reply_to(&Command::list_groups(), wire)
}

// =============================================================================
// Command Encoding Tests
// =============================================================================

#[test]
fn test_encode_handshake_commands() {
    assert_eq!(Command::version("2").unwrap().encode(), b"V2\n");
    assert_eq!(Command::login("kichkasch", None).unwrap().encode(), b"Nkichkasch\n");
    assert_eq!(
        Command::login("kichkasch", Some("secret")).unwrap().encode(),
        b"Nkichkasch,secret\n"
    );
    assert_eq!(Command::device("DummyDevice").unwrap().encode(), b"DDummyDevice\n");
}

#[test]
fn test_encode_queries_have_empty_argument() {
    assert_eq!(Command::list_groups().encode(), b"G\n");
    assert_eq!(Command::query_positions().encode(), b"P\n");
    assert_eq!(Command::query_waypoints().encode(), b"W\n");
    assert_eq!(Command::quit().encode(), b"Q\n");
}

#[test]
fn test_encode_submissions() {
    let position = Position::new(23.4545, 45.345345, 1234.34, 89.63, 180.0);
    assert_eq!(
        Command::submit_position(&position).unwrap().text(),
        "P23.4545,45.345345,1234.34,89.63,180"
    );

    let waypoint = Waypoint::new(23.234, 234.34343, 125.0, "Carpool Parking Space");
    assert_eq!(
        Command::submit_waypoint(&waypoint).unwrap().text(),
        "W23.234,234.34343,125,Carpool Parking Space"
    );
}

#[test]
fn test_command_accessors() {
    let cmd = Command::join_group("OpenMoko").unwrap();
    assert_eq!(cmd.opcode(), Opcode::Group);
    assert_eq!(cmd.argument(), "OpenMoko");
    assert_eq!(cmd.text(), "GOpenMoko");
}

#[test]
fn test_write_command() {
    let mut buffer = Vec::new();
    write_command(&mut buffer, &Command::join_group("Beta").unwrap()).unwrap();
    assert_eq!(buffer, b"GBeta\n");
}

// =============================================================================
// Line Reading Tests
// =============================================================================

#[test]
fn test_read_line_strips_terminator() {
    let mut reader = Cursor::new(b"K\nGAlpha\r\n".to_vec());
    assert_eq!(read_line(&mut reader, 1024).unwrap(), Some("K".to_string()));
    assert_eq!(read_line(&mut reader, 1024).unwrap(), Some("GAlpha".to_string()));
    assert_eq!(read_line(&mut reader, 1024).unwrap(), None);
}

#[test]
fn test_read_line_across_small_buffers() {
    // A 2-byte buffer forces the line to be assembled from several fills
    let data = Cursor::new(b"Palice,1,2,3,4,5\nF\n".to_vec());
    let mut reader = BufReader::with_capacity(2, data);

    assert_eq!(
        read_line(&mut reader, 1024).unwrap(),
        Some("Palice,1,2,3,4,5".to_string())
    );
    assert_eq!(read_line(&mut reader, 1024).unwrap(), Some("F".to_string()));
}

#[test]
fn test_read_line_too_long() {
    let long = format!("G{}\n", "x".repeat(2000));
    let mut reader = Cursor::new(long.into_bytes());

    let err = read_line(&mut reader, 1024).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[test]
fn test_read_line_exactly_at_limit() {
    let line = format!("G{}\n", "x".repeat(1022));
    assert_eq!(line.len(), 1024);
    let mut reader = Cursor::new(line.into_bytes());

    let read = read_line(&mut reader, 1024).unwrap().unwrap();
    assert_eq!(read.len(), 1023);
}

#[test]
fn test_read_line_truncated_is_transport_error() {
    let mut reader = Cursor::new(b"GAlp".to_vec());
    let err = read_line(&mut reader, 1024).unwrap_err();

    match err {
        GlsError::Transport(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("Expected Transport, got {:?}", other),
    }
}

#[test]
fn test_read_line_invalid_utf8() {
    let mut reader = Cursor::new(vec![b'G', 0xFF, 0xFE, b'\n']);
    let err = read_line(&mut reader, 1024).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

// =============================================================================
// Reply Classification Tests
// =============================================================================

#[test]
fn test_ok_is_single_line() {
    assert_eq!(reply("K\n").unwrap(), Reply::Line("K".to_string()));
}

#[test]
fn test_unknown_tag_is_single_line() {
    assert_eq!(reply("Q\n").unwrap(), Reply::Line("Q".to_string()));
    assert_eq!(reply("2,3\n").unwrap(), Reply::Line("2,3".to_string()));
}

#[test]
fn test_change_tag_is_business_rule_error_for_any_command() {
    let commands = [
        Command::version("2").unwrap(),
        Command::list_groups(),
        Command::join_group("Beta").unwrap(),
        Command::query_positions(),
    ];

    for command in &commands {
        match reply_to(command, "C\n").unwrap_err() {
            GlsError::BusinessRule { command: text } => assert_eq!(text, command.text()),
            other => panic!("Expected BusinessRule, got {:?}", other),
        }
    }
}

#[test]
fn test_error_tag_is_validation_error_for_any_command() {
    for command in [Command::device("x").unwrap(), Command::query_waypoints()] {
        let err = reply_to(&command, "E\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

#[test]
fn test_business_rule_error_redacts_password() {
    let login = Command::login("CathodioN", Some("test")).unwrap();
    match reply_to(&login, "C\n").unwrap_err() {
        GlsError::BusinessRule { command } => assert_eq!(command, "NCathodioN,<redacted>"),
        other => panic!("Expected BusinessRule, got {:?}", other),
    }
}

#[test]
fn test_empty_line_is_protocol_error() {
    let err = reply("\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert!(err.to_string().contains("no data returned"));
}

#[test]
fn test_no_data_is_protocol_error() {
    let err = reply("").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[test]
fn test_group_sequence() {
    let result = reply("GAlpha\nGBeta\nF\n").unwrap();

    assert_eq!(
        result,
        Reply::Sequence(vec!["GAlpha".into(), "GBeta".into(), "F".into()])
    );
    assert_eq!(result.records().len(), 2);
}

#[test]
fn test_terminator_alone_is_empty_sequence() {
    let result = reply("F\n").unwrap();
    assert_eq!(result, Reply::Sequence(vec!["F".into()]));
    assert!(result.records().is_empty());
}

#[test]
fn test_sequence_consumes_terminator_only() {
    let mut reader = Cursor::new(b"Pa,1,2,3,4,5\nF\nK\n".to_vec());

    let first =
        read_reply(&mut reader, &Command::query_positions(), FrameLimits::default()).unwrap();
    assert_eq!(first.records().len(), 1);

    // The next reply starts right after the terminator
    let second = read_reply(&mut reader, &Command::list_groups(), FrameLimits::default()).unwrap();
    assert!(second.is_ok());
}

#[test]
fn test_sequence_keeps_mixed_lines_until_terminator() {
    let result = reply("Wa,1,2,3,x\nKstray\nF\n").unwrap();
    assert_eq!(result.records().len(), 2);
}

#[test]
fn test_sequence_without_terminator_is_transport_error() {
    let err = reply("GAlpha\nGBeta\n").unwrap_err();

    match err {
        GlsError::Transport(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("Expected Transport, got {:?}", other),
    }
}

#[test]
fn test_empty_line_inside_sequence_is_protocol_error() {
    let err = reply("GAlpha\n\nF\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[test]
fn test_sequence_line_limit() {
    let limits = FrameLimits {
        max_reply_lines: 3,
        ..FrameLimits::default()
    };
    let mut reader = Cursor::new(b"GA\nGB\nGC\nGD\nF\n".to_vec());

    let err = read_reply(&mut reader, &Command::list_groups(), limits).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);

    let mut reader = Cursor::new(b"GA\nGB\nF\n".to_vec());
    assert!(read_reply(&mut reader, &Command::list_groups(), limits).is_ok());
}

#[test]
fn test_read_reply_from_chunked_reader() {
    let data = Cursor::new(b"GAlpha\nGBeta\nF\n".to_vec());
    let mut reader = BufReader::with_capacity(3, data.take(1024));

    let result = read_reply(&mut reader, &Command::list_groups(), FrameLimits::default()).unwrap();
    assert_eq!(result.records().len(), 2);
}
