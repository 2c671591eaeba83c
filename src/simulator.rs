//! Simulator/sender: replays one or more captured ASTM messages against a
//! running server. Ported from `original_source/simulator.py`'s
//! `send_messages`/`send_message`, in the style of the workspace's
//! informal `test_astm_client.rs`.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::constants::{ACK, CR, EOT, ENQ, LF};
use crate::error::Result;

/// Splits a captured file's bytes into lines the way `f.readlines()` would,
/// with trailing `CR`/`LF` stripped from each line.
pub fn split_into_lines(bytes: &[u8]) -> Vec<Vec<u8>> {
    bytes
        .split(|&b| b == LF)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut line = line.to_vec();
            while line.last() == Some(&CR) {
                line.pop();
            }
            line
        })
        .collect()
}

/// Sends one message (its already-framed lines) over an established
/// connection: `ENQ`, wait `ACK`, each line with an inter-frame delay
/// awaiting `ACK`, then `EOT`.
pub async fn send_message(stream: &mut TcpStream, lines: &[Vec<u8>], delay: Duration) -> Result<()> {
    log::info!("-> ENQ");
    stream.write_all(&[ENQ]).await?;
    let mut resp = [0u8; 1];
    stream.read_exact(&mut resp).await?;
    log::info!("<- {:#04x}", resp[0]);

    for line in lines {
        tokio::time::sleep(delay).await;
        log::info!("-> {} bytes", line.len());
        stream.write_all(line).await?;
        stream.read_exact(&mut resp).await?;
        if resp[0] != ACK {
            log::error!("expected ACK, got {:#04x}", resp[0]);
            break;
        }
    }

    log::info!("-> EOT");
    stream.write_all(&[EOT]).await?;
    stream.read_exact(&mut resp).await?;
    log::info!("<- {:#04x}", resp[0]);
    Ok(())
}

/// Opens a single connection and sends every message through it in order.
pub async fn send_messages(address: &str, port: u16, messages: &[Vec<Vec<u8>>], delay: Duration) -> Result<()> {
    let mut stream = TcpStream::connect((address, port)).await?;
    log::info!("connected to {address}:{port}");
    for lines in messages {
        send_message(&mut stream, lines, delay).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_lines_and_strips_trailing_crlf() {
        let data = b"H|\\^&|||\r\nP|1|PAT001\r\nL|1|N\r\n";
        let lines = split_into_lines(data);
        assert_eq!(lines, vec![b"H|\\^&|||".to_vec(), b"P|1|PAT001".to_vec(), b"L|1|N".to_vec()]);
    }
}
