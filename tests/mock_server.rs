//! Integration tests driving a real `Connection` against a scripted TCP
//! peer that plays the server side of the handshake and a handful of
//! `COM_QUERY` exchanges (§8 scenarios S1, S2, S5).
//!
//! The server-side bytes below are authored directly rather than built
//! through the crate's (private) protocol encoders, since these tests only
//! exercise the crate's public surface.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use myriad_core::{Connection, MySqlConnectOptions};

fn frame(seq: u8, payload: &[u8]) -> Vec<u8> {
    let len = payload.len();
    let mut out = vec![(len & 0xFF) as u8, ((len >> 8) & 0xFF) as u8, ((len >> 16) & 0xFF) as u8, seq];
    out.extend_from_slice(payload);
    out
}

fn lenenc_str(s: &str) -> Vec<u8> {
    assert!(s.len() < 0xFB, "test helper only supports short strings");
    let mut v = vec![s.len() as u8];
    v.extend_from_slice(s.as_bytes());
    v
}

fn lenenc_empty() -> Vec<u8> {
    vec![0x00]
}

fn lenenc_int(n: u64) -> Vec<u8> {
    assert!(n < 0xFB, "test helper only supports single-byte lenenc ints");
    vec![n as u8]
}

/// Capability bits this mock server advertises: `PROTOCOL_41 | SECURE_CONNECTION
/// | CONNECT_WITH_DB | PLUGIN_AUTH | PLUGIN_AUTH_LENENC_DATA | DEPRECATE_EOF`.
const CAPABILITY_FLAGS_1: u16 = 0x8208;
const CAPABILITY_FLAGS_2: u16 = 0x0128;

fn handshake_v10() -> Vec<u8> {
    let mut p = Vec::new();
    p.push(10); // protocol_version
    p.extend_from_slice(b"8.0.32\0");
    p.extend_from_slice(&1u32.to_le_bytes()); // connection_id
    p.extend_from_slice(b"01234567"); // scramble part 1 (8 bytes)
    p.push(0); // reserved
    p.extend_from_slice(&CAPABILITY_FLAGS_1.to_le_bytes());
    p.push(0x21); // charset
    p.extend_from_slice(&0x0002u16.to_le_bytes()); // status: SERVER_STATUS_AUTOCOMMIT
    p.extend_from_slice(&CAPABILITY_FLAGS_2.to_le_bytes());
    p.push(21); // auth_plugin_data_len
    p.extend_from_slice(&[0u8; 6]); // reserved
    p.extend_from_slice(&[0u8; 4]); // capability_flags_3 (we are not a MariaDB build)
    p.extend_from_slice(b"890123456789"); // scramble part 2 (12 bytes)
    p.push(0); // reserved
    p.extend_from_slice(b"mysql_native_password\0");
    p
}

fn ok_packet(affected_rows: u64, last_insert_id: u64) -> Vec<u8> {
    let mut p = vec![0x00];
    p.extend(lenenc_int(affected_rows));
    p.extend(lenenc_int(last_insert_id));
    p.extend_from_slice(&0x0002u16.to_le_bytes()); // status
    p.extend_from_slice(&0u16.to_le_bytes()); // warnings
    p
}

/// The `DEPRECATE_EOF`-flavored terminating `OK` packet (header `0xFE`).
fn ok_terminator() -> Vec<u8> {
    let mut p = vec![0xFE];
    p.extend(lenenc_int(0));
    p.extend(lenenc_int(0));
    p.extend_from_slice(&0x0002u16.to_le_bytes());
    p.extend_from_slice(&0u16.to_le_bytes());
    p
}

fn err_packet(code: u16, sql_state: &str, message: &str) -> Vec<u8> {
    let mut p = vec![0xFF];
    p.extend_from_slice(&code.to_le_bytes());
    p.push(b'#');
    p.extend_from_slice(sql_state.as_bytes());
    p.extend_from_slice(message.as_bytes());
    p
}

fn column_definition(name: &str, field_type: u8) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend(lenenc_str("def"));
    p.extend(lenenc_empty()); // schema
    p.extend(lenenc_empty()); // table_alias
    p.extend(lenenc_empty()); // table
    p.extend(lenenc_str(name)); // column_alias
    p.extend(lenenc_str(name)); // column
    p.push(0x0c); // fixed-length fields marker
    p.extend_from_slice(&33u16.to_le_bytes()); // char_set (utf8_general_ci)
    p.extend_from_slice(&64u32.to_le_bytes()); // max_size
    p.push(field_type);
    p.extend_from_slice(&0u16.to_le_bytes()); // flags
    p.push(0); // decimals
    p
}

fn text_row(values: &[&str]) -> Vec<u8> {
    let mut p = Vec::new();
    for v in values {
        p.extend(lenenc_str(v));
    }
    p
}

async fn read_one_packet(socket: &mut TcpStream) {
    let mut buf = [0u8; 4096];
    let _ = socket.read(&mut buf).await.expect("client packet");
}

async fn write_packets(socket: &mut TcpStream, packets: &[Vec<u8>]) {
    for p in packets {
        socket.write_all(p).await.expect("write to client");
    }
    socket.flush().await.expect("flush to client");
}

async fn perform_handshake(socket: &mut TcpStream) {
    write_packets(socket, &[frame(0, &handshake_v10())]).await;
    read_one_packet(socket).await; // HandshakeResponse41
    write_packets(socket, &[frame(2, &ok_packet(0, 0))]).await;
}

async fn start_server() -> (std::net::SocketAddr, TcpListener) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (addr, listener)
}

fn options_for(addr: std::net::SocketAddr) -> MySqlConnectOptions {
    MySqlConnectOptions::new().host(&addr.ip().to_string()).port(addr.port()).username("root")
}

#[tokio::test]
async fn select_returns_one_row_and_no_affected_rows() {
    let (addr, listener) = start_server().await;

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        perform_handshake(&mut socket).await;

        read_one_packet(&mut socket).await; // COM_QUERY

        write_packets(
            &mut socket,
            &[
                frame(1, &lenenc_int(1)), // column count
                frame(2, &column_definition("@@version", 253)),
                frame(3, &text_row(&["8.0.32"])),
                frame(4, &ok_terminator()),
            ],
        )
        .await;
    });

    let mut connection = Connection::connect(&options_for(addr)).await.unwrap();
    let mut stream = connection.query("SELECT @@version").await.unwrap();

    let row = stream.next().await.unwrap().expect("one row");
    let version: String = row.try_get("@@version").unwrap();
    assert_eq!(version, "8.0.32");

    assert!(stream.next().await.unwrap().is_none());
    assert_eq!(stream.affected_rows(), 0);
    assert_eq!(stream.last_insert_id(), 0);

    server.await.unwrap();
}

#[tokio::test]
async fn connect_with_socket_runs_the_handshake_over_a_caller_supplied_stream() {
    let (addr, listener) = start_server().await;

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        perform_handshake(&mut socket).await;
    });

    // Stands in for a caller that already upgraded the stream to TLS (or a
    // Unix socket, or anything else `AsyncRead + AsyncWrite`) before handing
    // it to the driver; this crate never sees or cares which.
    let socket = TcpStream::connect(addr).await.unwrap();
    let connection = Connection::connect_with_socket(socket, &options_for(addr)).await.unwrap();
    assert_eq!(connection.server_version(), "8.0.32");

    server.await.unwrap();
}

#[tokio::test]
async fn insert_reports_affected_rows_and_last_insert_id() {
    let (addr, listener) = start_server().await;

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        perform_handshake(&mut socket).await;

        read_one_packet(&mut socket).await; // COM_QUERY
        write_packets(&mut socket, &[frame(1, &ok_packet(2, 42))]).await;
    });

    let mut connection = Connection::connect(&options_for(addr)).await.unwrap();
    let mut stream = connection.query("INSERT INTO t(x) VALUES(1),(2)").await.unwrap();

    assert!(stream.next().await.unwrap().is_none());
    assert_eq!(stream.affected_rows(), 2);
    assert_eq!(stream.last_insert_id(), 42);

    server.await.unwrap();
}

#[tokio::test]
async fn auth_switch_to_caching_sha2_password_is_rejected() {
    let (addr, listener) = start_server().await;

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        write_packets(&mut socket, &[frame(0, &handshake_v10())]).await;
        read_one_packet(&mut socket).await; // HandshakeResponse41

        let mut switch = vec![0xFEu8];
        switch.extend_from_slice(b"caching_sha2_password\0");
        switch.extend_from_slice(b"0123456789012345678\0");
        write_packets(&mut socket, &[frame(2, &switch)]).await;
    });

    let err = Connection::connect(&options_for(addr)).await.unwrap_err();
    assert!(matches!(err, myriad_core::Error::Unsupported { .. }));

    server.await.unwrap();
}

#[tokio::test]
async fn reset_statement_awaits_an_ok_unlike_close() {
    let (addr, listener) = start_server().await;

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        perform_handshake(&mut socket).await;

        read_one_packet(&mut socket).await; // COM_STMT_PREPARE
        write_packets(&mut socket, &[frame(1, &{
            let mut p = vec![0x00];
            p.extend_from_slice(&7u32.to_le_bytes()); // statement_id
            p.extend_from_slice(&0u16.to_le_bytes()); // columns
            p.extend_from_slice(&0u16.to_le_bytes()); // params
            p.push(0);
            p.extend_from_slice(&0u16.to_le_bytes());
            p
        })])
        .await;

        read_one_packet(&mut socket).await; // COM_STMT_RESET
        write_packets(&mut socket, &[frame(1, &ok_packet(0, 0))]).await;
    });

    let mut connection = Connection::connect(&options_for(addr)).await.unwrap();
    let statement = connection.prepare("SELECT 1").await.unwrap();
    connection.reset_statement(&statement).await.unwrap();

    server.await.unwrap();
}

#[tokio::test]
async fn server_error_resyncs_the_connection_to_idle() {
    let (addr, listener) = start_server().await;

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        perform_handshake(&mut socket).await;

        read_one_packet(&mut socket).await; // the failing COM_QUERY
        write_packets(&mut socket, &[frame(1, &err_packet(1146, "42S02", "Table 'nope' doesn't exist"))]).await;

        read_one_packet(&mut socket).await; // the follow-up COM_QUERY
        write_packets(
            &mut socket,
            &[
                frame(1, &lenenc_int(1)),
                frame(2, &column_definition("1", 8)),
                frame(3, &text_row(&["1"])),
                frame(4, &ok_terminator()),
            ],
        )
        .await;
    });

    let mut connection = Connection::connect(&options_for(addr)).await.unwrap();

    let mut failing = connection.query("SELECT * FROM nope").await.unwrap();
    let err = failing.next().await.unwrap_err();
    assert!(matches!(err, myriad_core::Error::ServerError { code: 1146, .. }));
    drop(failing);

    let mut ok = connection.query("SELECT 1").await.unwrap();
    let row = ok.next().await.unwrap().expect("one row");
    let value: i64 = row.try_get("1").unwrap();
    assert_eq!(value, 1);

    server.await.unwrap();
}
