use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use astm_lis::server::{self, ServerConfig};
use astm_lis::session::MessageBundle;

async fn start_server(config: ServerConfig) -> (std::net::SocketAddr, mpsc::Receiver<MessageBundle>) {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel(8);
    tokio::spawn(async move {
        let _ = server::serve(listener, config, tx).await;
    });
    (addr, rx)
}

async fn read_byte(stream: &mut TcpStream) -> u8 {
    let mut buf = [0u8; 1];
    stream.read_exact(&mut buf).await.unwrap();
    buf[0]
}

#[tokio::test]
async fn single_frame_session_delivers_stripped_lis2a_body() {
    let config = ServerConfig {
        timeout: Duration::from_secs(5),
        ..ServerConfig::default()
    };
    let (addr, mut rx) = start_server(config).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    stream.write_all(&[0x05]).await.unwrap(); // ENQ
    assert_eq!(read_byte(&mut stream).await, 0x06); // ACK

    let payload = b"2A|B|C|D\r\x03";
    let cs = astm_lis::codec::checksum(payload);
    let mut frame = vec![0x02u8];
    frame.extend_from_slice(payload);
    frame.extend_from_slice(cs.as_bytes());
    frame.extend_from_slice(b"\r\n");
    stream.write_all(&frame).await.unwrap();
    assert_eq!(read_byte(&mut stream).await, 0x06); // ACK

    stream.write_all(&[0x04]).await.unwrap(); // EOT

    let bundle = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bundle.queue_payload, b"A|B|C|D\r\x03".to_vec());
}

#[tokio::test]
async fn double_enq_is_naked_and_connection_stays_open() {
    let config = ServerConfig {
        timeout: Duration::from_secs(5),
        ..ServerConfig::default()
    };
    let (addr, _rx) = start_server(config).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    stream.write_all(&[0x05]).await.unwrap();
    assert_eq!(read_byte(&mut stream).await, 0x06);

    stream.write_all(&[0x05]).await.unwrap();
    assert_eq!(read_byte(&mut stream).await, 0x15); // NAK
}

#[tokio::test]
async fn bad_checksum_is_naked_and_buffers_are_unaffected() {
    let config = ServerConfig {
        timeout: Duration::from_secs(5),
        ..ServerConfig::default()
    };
    let (addr, mut rx) = start_server(config).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    stream.write_all(&[0x05]).await.unwrap(); // ENQ
    assert_eq!(read_byte(&mut stream).await, 0x06);

    // Correct payload, deliberately wrong checksum bytes.
    let bad_frame = b"\x021A|B|C|D\r\x0300\r\n";
    stream.write_all(bad_frame).await.unwrap();
    assert_eq!(read_byte(&mut stream).await, 0x15); // NAK

    stream.write_all(&[0x04]).await.unwrap(); // EOT
    // Nothing was accumulated, so no bundle should ever reach the consumer.
    let result = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
    assert!(result.is_err(), "no message should have been delivered");
}

#[tokio::test]
async fn chunked_message_is_reassembled_end_to_end() {
    let config = ServerConfig {
        timeout: Duration::from_secs(5),
        ..ServerConfig::default()
    };
    let (addr, mut rx) = start_server(config).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    stream.write_all(&[0x05]).await.unwrap(); // ENQ
    assert_eq!(read_byte(&mut stream).await, 0x06);

    // First chunk: seq '1', body "foo|1", ETB-terminated.
    let chunk_payload = b"1foo|1\x17";
    let cs1 = astm_lis::codec::checksum(chunk_payload);
    let mut chunk = vec![0x02u8];
    chunk.extend_from_slice(chunk_payload);
    chunk.extend_from_slice(cs1.as_bytes());
    chunk.extend_from_slice(b"\r\n");
    stream.write_all(&chunk).await.unwrap();
    assert_eq!(read_byte(&mut stream).await, 0x06);

    // Terminal frame: seq '2', body "bar|2", CR ETX-terminated.
    let terminal_payload = b"2bar|2\r\x03";
    let cs2 = astm_lis::codec::checksum(terminal_payload);
    let mut terminal = vec![0x02u8];
    terminal.extend_from_slice(terminal_payload);
    terminal.extend_from_slice(cs2.as_bytes());
    terminal.extend_from_slice(b"\r\n");
    stream.write_all(&terminal).await.unwrap();
    assert_eq!(read_byte(&mut stream).await, 0x06);

    stream.write_all(&[0x04]).await.unwrap(); // EOT

    let bundle = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bundle.queue_payload, b"foo|1bar|2\r\x03".to_vec());
}

#[tokio::test]
async fn idle_connection_is_closed_after_timeout() {
    let config = ServerConfig {
        timeout: Duration::from_millis(100),
        ..ServerConfig::default()
    };
    let (addr, _rx) = start_server(config).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;

    let mut buf = [0u8; 1];
    let n = stream.read(&mut buf).await.unwrap();
    assert_eq!(n, 0, "server should have closed the connection after the timeout");
}
