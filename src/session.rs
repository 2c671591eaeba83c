//! Link protocol engine: one `Session` per inbound TCP connection, driven
//! by explicit events rather than the callback methods (`on_enq`/`on_ack`/
//! `on_nak`/`on_eot`/`handle_message`) of `original_source/protocol.py`'s
//! `ASTMProtocol`. Replies are returned by value (`LinkReply`), never
//! raised as exceptions (`NotAccepted`, `InvalidState` in
//! `original_source/exceptions.py`).

use crate::codec::{decode_message, is_chunked_message, join_chunks, strip_frame};
use crate::constants::{ACK, EOT, ENQ, NAK, STX};

/// One discrete unit of link-layer input: a control byte or a complete
/// STX-framed wire frame.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Enq,
    Ack,
    Nak,
    Eot,
    Frame(Vec<u8>),
    Other(Vec<u8>),
}

/// The message payload selected for the outbound consumer queue, per the
/// configured `MessageFormat`, plus the raw ASTM blob always available for
/// the optional capture-file writer.
#[derive(Debug, Clone)]
pub struct MessageBundle {
    pub queue_payload: Vec<u8>,
    pub astm_blob: Vec<u8>,
    pub format: MessageFormat,
    /// The transfer's first raw message, kept around so a capture writer
    /// can derive the sender name for its filename.
    pub header_message: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    Lis2a,
    Astm,
}

impl Default for MessageFormat {
    fn default() -> Self {
        MessageFormat::Lis2a
    }
}

/// Replies the link engine can hand back to the connection task. Never a
/// panic or an `Err` -- codec/schema failures during frame handling become
/// `Nak`, matching the "failure isolation" contract.
#[derive(Debug, Clone)]
pub enum LinkReply {
    Ack,
    Nak,
    Flush(MessageBundle),
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Idle,
    Transfer,
}

/// Per-connection state. Created on accept, reset on EOT/timeout/close.
pub struct Session {
    state: SessionState,
    chunks: Vec<Vec<u8>>,
    messages: Vec<Vec<u8>>,
    format: MessageFormat,
}

impl Session {
    pub fn new(format: MessageFormat) -> Self {
        Session {
            state: SessionState::Idle,
            chunks: Vec::new(),
            messages: Vec::new(),
            format,
        }
    }

    pub fn in_transfer(&self) -> bool {
        self.state == SessionState::Transfer
    }

    pub fn pending_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.chunks.clear();
        self.messages.clear();
    }

    fn handle_message(&mut self, frame: Vec<u8>) -> LinkReply {
        if is_chunked_message(&frame) {
            self.chunks.push(frame);
            return LinkReply::Ack;
        }
        let message = if !self.chunks.is_empty() {
            self.chunks.push(frame);
            let joined = match join_chunks(&self.chunks) {
                Ok(j) => j,
                Err(e) => {
                    log::warn!("failed to join chunked message: {e}");
                    self.chunks.clear();
                    return LinkReply::Nak;
                }
            };
            self.chunks.clear();
            joined
        } else {
            frame
        };
        match decode_message(&message) {
            Ok(_) => {
                self.messages.push(message);
                LinkReply::Ack
            }
            Err(e) => {
                log::warn!("message rejected: {e}");
                LinkReply::Nak
            }
        }
    }

    fn flush(&mut self) -> LinkReply {
        if self.messages.is_empty() {
            // EOT right after ENQ with nothing accumulated: treated as a
            // keep-alive and silently reset.
            self.reset();
            return LinkReply::None;
        }
        let lis2a: Vec<u8> = self
            .messages
            .iter()
            .flat_map(|m| strip_frame(m).to_vec())
            .collect();
        let astm: Vec<u8> = self.messages.concat();
        let header_message = self.messages[0].clone();
        let queue_payload = match self.format {
            MessageFormat::Lis2a => lis2a,
            MessageFormat::Astm => astm.clone(),
        };
        self.reset();
        LinkReply::Flush(MessageBundle {
            queue_payload,
            astm_blob: astm,
            format: self.format,
            header_message,
        })
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> LinkReply {
        use SessionState::*;
        match (self.state, event) {
            (Idle, SessionEvent::Enq) => {
                self.state = Transfer;
                LinkReply::Ack
            }
            (Transfer, SessionEvent::Enq) => {
                log::warn!("ENQ received while already in transfer");
                LinkReply::Nak
            }
            (Idle, SessionEvent::Frame(_)) => {
                self.chunks.clear();
                LinkReply::Nak
            }
            (Transfer, SessionEvent::Frame(frame)) => self.handle_message(frame),
            (Transfer, SessionEvent::Eot) => self.flush(),
            (Idle, SessionEvent::Eot) => {
                log::error!("EOT received outside a transfer");
                LinkReply::None
            }
            (_, SessionEvent::Ack) => {
                log::error!("server must not be ACKed");
                LinkReply::None
            }
            (_, SessionEvent::Nak) => {
                log::error!("server must not be NAKed");
                LinkReply::None
            }
            (_, SessionEvent::Other(_)) => {
                log::debug!("unable to dispatch data");
                LinkReply::None
            }
        }
    }
}

/// Classifies one complete unit of link-layer bytes.
pub fn classify(unit: Vec<u8>) -> SessionEvent {
    match unit.as_slice() {
        [ENQ] => SessionEvent::Enq,
        [ACK] => SessionEvent::Ack,
        [NAK] => SessionEvent::Nak,
        [EOT] => SessionEvent::Eot,
        [first, ..] if *first == STX => SessionEvent::Frame(unit),
        _ => SessionEvent::Other(unit),
    }
}

/// Pulls the next discrete unit (a single control byte, or a complete
/// STX-framed wire frame) out of an accumulating read buffer. Returns
/// `None` when the buffer holds an incomplete frame, in which case the
/// caller should read more bytes before calling again.
pub fn extract_unit(buf: &mut Vec<u8>) -> Option<Vec<u8>> {
    if buf.is_empty() {
        return None;
    }
    match buf[0] {
        ENQ | ACK | NAK | EOT => Some(buf.drain(0..1).collect()),
        STX => {
            let marker_pos = buf
                .iter()
                .enumerate()
                .skip(1)
                .find(|(_, &b)| b == crate::constants::ETX || b == crate::constants::ETB)
                .map(|(i, _)| i)?;
            let end = marker_pos + 1 + 2 + 2; // marker + checksum(2) + CRLF(2)
            if buf.len() >= end {
                Some(buf.drain(..end).collect())
            } else {
                None
            }
        }
        _ => Some(buf.drain(0..1).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::checksum;
    use crate::constants::{CR, ETX, LF};

    fn frame(seq: u8, body: &str) -> Vec<u8> {
        let mut payload = vec![b'0' + seq];
        payload.extend_from_slice(body.as_bytes());
        payload.push(CR);
        payload.push(ETX);
        let cs = checksum(&payload);
        let mut out = vec![STX];
        out.extend_from_slice(&payload);
        out.extend_from_slice(cs.as_bytes());
        out.push(CR);
        out.push(LF);
        out
    }

    #[test]
    fn single_frame_session_flushes_stripped_body() {
        let mut session = Session::new(MessageFormat::Lis2a);
        assert!(matches!(
            session.handle_event(SessionEvent::Enq),
            LinkReply::Ack
        ));
        let f = frame(2, "A|B|C|D");
        assert!(matches!(
            session.handle_event(SessionEvent::Frame(f)),
            LinkReply::Ack
        ));
        match session.handle_event(SessionEvent::Eot) {
            LinkReply::Flush(bundle) => {
                assert_eq!(bundle.queue_payload, [b"A|B|C|D", &[CR, ETX][..]].concat());
            }
            other => panic!("expected flush, got {other:?}"),
        }
        assert!(!session.in_transfer());
        assert_eq!(session.message_count(), 0);
    }

    #[test]
    fn double_enq_is_rejected() {
        let mut session = Session::new(MessageFormat::Lis2a);
        session.handle_event(SessionEvent::Enq);
        assert!(matches!(
            session.handle_event(SessionEvent::Enq),
            LinkReply::Nak
        ));
        assert!(session.in_transfer());
    }

    #[test]
    fn bad_checksum_is_nak_and_preserves_state() {
        let mut session = Session::new(MessageFormat::Lis2a);
        session.handle_event(SessionEvent::Enq);
        let mut bad = frame(1, "A|B|C|D");
        let len = bad.len();
        bad[len - 4] = b'0';
        bad[len - 3] = b'0';
        assert!(matches!(
            session.handle_event(SessionEvent::Frame(bad)),
            LinkReply::Nak
        ));
        assert!(session.in_transfer());
        assert_eq!(session.message_count(), 0);
    }

    #[test]
    fn eot_with_no_messages_is_silent_reset() {
        let mut session = Session::new(MessageFormat::Lis2a);
        session.handle_event(SessionEvent::Enq);
        assert!(matches!(
            session.handle_event(SessionEvent::Eot),
            LinkReply::None
        ));
        assert!(!session.in_transfer());
    }

    #[test]
    fn chunked_message_is_reassembled_before_flush() {
        let mut session = Session::new(MessageFormat::Lis2a);
        session.handle_event(SessionEvent::Enq);

        let mut p1 = vec![b'1'];
        p1.extend_from_slice(b"foo|1");
        p1.push(crate::constants::ETB);
        let cs1 = checksum(&p1);
        let mut c1 = vec![STX];
        c1.extend_from_slice(&p1);
        c1.extend_from_slice(cs1.as_bytes());
        c1.push(CR);
        c1.push(LF);

        assert!(matches!(
            session.handle_event(SessionEvent::Frame(c1)),
            LinkReply::Ack
        ));
        assert_eq!(session.pending_chunk_count(), 1);

        let last = frame(2, "bar|2");
        assert!(matches!(
            session.handle_event(SessionEvent::Frame(last)),
            LinkReply::Ack
        ));
        assert_eq!(session.pending_chunk_count(), 0);
        assert_eq!(session.message_count(), 1);
    }

    #[test]
    fn extract_unit_splits_control_bytes_and_frames() {
        let mut buf = vec![ENQ];
        assert_eq!(extract_unit(&mut buf), Some(vec![ENQ]));
        assert!(buf.is_empty());

        let f = frame(1, "A");
        let mut buf2 = f.clone();
        buf2.extend_from_slice(&[ENQ]);
        let first = extract_unit(&mut buf2).unwrap();
        assert_eq!(first, f);
        assert_eq!(extract_unit(&mut buf2), Some(vec![ENQ]));
    }
}
