//! End-to-end protocol tests against JSON-lines log files on disk.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use base64::Engine;
use baglens_core::{Scalar, Time, Value};
use baglens_session::{dispatch, HostArg, Multiplexer, Reply, SessionError};
use serde_json::json;

fn b64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn int8() -> serde_json::Value {
    json!({"name": "int8", "kind": {"builtin": "int8"}})
}

fn string() -> serde_json::Value {
    json!({"name": "string", "kind": {"builtin": "string"}})
}

/// A log with a `Status { code: int8, tags: string[] }` type on `/status`
/// and plain strings on `/chatter`.
fn write_log(dir: &tempfile::TempDir) -> PathBuf {
    let status = json!({
        "name": "Status",
        "kind": {"composite": [
            {"name": "code", "type": int8()},
            {"name": "tags", "type": string(), "array": "variable"}
        ]}
    });

    let mut status_payload = vec![3u8];
    status_payload.extend_from_slice(&2u32.to_le_bytes());
    for tag in ["ok", "warm"] {
        status_payload.extend_from_slice(&(tag.len() as u32).to_le_bytes());
        status_payload.extend_from_slice(tag.as_bytes());
    }

    let mut hello = 5u32.to_le_bytes().to_vec();
    hello.extend_from_slice(b"hello");

    let lines = [
        json!({"kind": "type", "descriptor": status}),
        json!({"kind": "type", "descriptor": string()}),
        json!({"kind": "entry", "channel": "/status", "time": {"sec": 10, "nsec": 0},
               "type_name": "Status", "payload": b64(&status_payload)}),
        json!({"kind": "entry", "channel": "/chatter", "time": {"sec": 11, "nsec": 250},
               "type_name": "string", "payload": b64(&hello)}),
        json!({"kind": "entry", "channel": "/chatter", "time": {"sec": 12, "nsec": 0},
               "type_name": "string", "payload": b64(&[1, 0, 0])}),
    ];

    let path = dir.path().join("run.log");
    let mut file = fs::File::create(&path).unwrap();
    for line in &lines {
        writeln!(file, "{}", line).unwrap();
    }
    path
}

fn construct(mux: &mut Multiplexer, path: &str) -> Result<u64, SessionError> {
    match dispatch(mux, &[0u64.into(), "construct".into(), path.into()])? {
        Reply::Handle(handle) => Ok(handle),
        other => panic!("expected a handle, got {:?}", other),
    }
}

#[test]
fn read_status_then_chatter() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(&dir);
    let mut mux = Multiplexer::new();
    let h = construct(&mut mux, path.to_str().unwrap()).unwrap();

    let reply = dispatch(&mut mux, &[h.into(), "channels".into()]).unwrap();
    assert_eq!(
        reply,
        Reply::Strings(vec!["/chatter".to_string(), "/status".to_string()])
    );

    dispatch(&mut mux, &[h.into(), "reset_view".into(), "/status".into()]).unwrap();
    let Reply::Message(message) =
        dispatch(&mut mux, &[h.into(), "read_one".into(), true.into()]).unwrap()
    else {
        panic!("expected a message");
    };
    assert_eq!(message.value.get("code"), Some(&Value::Scalar(Scalar::Int8(3))));
    assert_eq!(
        message.value.get("tags").and_then(Value::as_array).map(|a| a.len()),
        Some(2)
    );
    let meta = message.meta.unwrap();
    assert_eq!(meta.type_name, "Status");
    assert_eq!(meta.timestamp, Time::new(10, 0));

    assert_eq!(
        dispatch(&mut mux, &[h.into(), "has_next".into()]).unwrap(),
        Reply::Bool(false)
    );

    dispatch(&mut mux, &[h.into(), "reset_view".into(), HostArg::from(&["/chatter"][..])]).unwrap();
    let Reply::Message(message) =
        dispatch(&mut mux, &[h.into(), "read_one".into(), false.into()]).unwrap()
    else {
        panic!("expected a message");
    };
    assert_eq!(message.value, Value::Scalar(Scalar::String("hello".to_string())));
    assert!(message.meta.is_none());
}

#[test]
fn corrupt_record_stops_read_all() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(&dir);
    let mut mux = Multiplexer::new();
    let h = construct(&mut mux, path.to_str().unwrap()).unwrap();

    dispatch(&mut mux, &[h.into(), "reset_view".into(), "/chatter".into()]).unwrap();
    let err = dispatch(&mut mux, &[h.into(), "read_all".into(), true.into()]).unwrap_err();
    assert!(matches!(err, SessionError::Decode(_)));

    // The good record was consumed; the bad one is still at the cursor.
    assert_eq!(
        dispatch(&mut mux, &[h.into(), "has_next".into()]).unwrap(),
        Reply::Bool(true)
    );
    assert!(dispatch(&mut mux, &[h.into(), "read_one".into(), false.into()]).is_err());
}

#[test]
fn missing_log_cannot_be_opened() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.log");
    let mut mux = Multiplexer::new();
    let err = construct(&mut mux, missing.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, SessionError::CannotOpenLog { .. }));
    assert!(mux.is_empty());
}

#[test]
fn lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(&dir);
    let path = path.to_str().unwrap();
    let mut mux = Multiplexer::new();

    let a = construct(&mut mux, path).unwrap();
    let b = construct(&mut mux, path).unwrap();
    assert!(b > a && a != 0);

    dispatch(&mut mux, &[0u64.into(), "destruct".into(), a.into()]).unwrap();
    assert!(matches!(
        dispatch(&mut mux, &[a.into(), "has_next".into()]),
        Err(SessionError::InvalidHandle(_))
    ));
    assert_eq!(
        dispatch(&mut mux, &[b.into(), "has_next".into()]).unwrap(),
        Reply::Bool(false)
    );

    // b is dropped with the multiplexer.
    drop(mux);
}
