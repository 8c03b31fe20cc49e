/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/8/26
******************************************************************************/

//! Integration tests for the receiver endpoint with mock collaborators.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use fixgate_core::{
    ConnectionId, DisconnectReason, LibraryId, MessageStatus, MsgTypeCode, SequenceIndex,
    SessionId,
};
use fixgate_receiver::{
    AuthenticationResult, Authenticator, Backpressure, Channel, EndpointConfig, EndpointHooks,
    Position, ReadOutcome, ReceiverEndpoint, Record, Sink,
};
use fixgate_tagvalue::LogonView;
use fixgate_tagvalue::checksum::{calculate_checksum, format_checksum};

const CONN: ConnectionId = ConnectionId::new(9);
const LIB: LibraryId = LibraryId::new(3);
const SOH: u8 = 0x01;

/// Builds a complete FIX message with a correct checksum.
fn fix_message(body: &str) -> Vec<u8> {
    let mut msg = format!("8=FIX.4.2\x019={}\x01{}", body.len(), body).into_bytes();
    let checksum = calculate_checksum(&msg);
    msg.extend_from_slice(b"10=");
    msg.extend_from_slice(&format_checksum(checksum));
    msg.push(SOH);
    msg
}

fn logon_message() -> Vec<u8> {
    fix_message("35=A\x0149=INI\x0156=ACC\x01108=30\x01")
}

// --- mock channel ---------------------------------------------------------

enum ChannelEvent {
    Chunk(Vec<u8>),
    Eof,
    Fault(io::ErrorKind),
}

#[derive(Default)]
struct ChannelState {
    script: VecDeque<ChannelEvent>,
    shut_down: bool,
}

struct MockChannel(Rc<RefCell<ChannelState>>);

impl Channel for MockChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        let mut state = self.0.borrow_mut();
        match state.script.pop_front() {
            None => Ok(ReadOutcome::Bytes(0)),
            Some(ChannelEvent::Chunk(mut chunk)) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                if n < chunk.len() {
                    let rest = chunk.split_off(n);
                    state.script.push_front(ChannelEvent::Chunk(rest));
                }
                Ok(ReadOutcome::Bytes(n))
            }
            Some(ChannelEvent::Eof) => Ok(ReadOutcome::Closed),
            Some(ChannelEvent::Fault(kind)) => Err(kind.into()),
        }
    }

    fn shutdown(&mut self) {
        self.0.borrow_mut().shut_down = true;
    }
}

// --- mock sink ------------------------------------------------------------

#[derive(Debug)]
struct PublishedRecord {
    bytes: Vec<u8>,
    msg_type: MsgTypeCode,
    session_id: Option<SessionId>,
    status: MessageStatus,
    library_id: LibraryId,
}

#[derive(Default)]
struct SinkState {
    records: Vec<PublishedRecord>,
    backpressure_next: usize,
    next_position: u64,
}

struct MockSink(Rc<RefCell<SinkState>>);

impl Sink for MockSink {
    fn publish(&mut self, record: Record<'_>) -> Result<Position, Backpressure> {
        let mut state = self.0.borrow_mut();
        if state.backpressure_next > 0 {
            state.backpressure_next -= 1;
            return Err(Backpressure);
        }
        state.next_position += record.bytes.len() as u64;
        let position = Position::new(state.next_position);
        state.records.push(PublishedRecord {
            bytes: record.bytes.to_vec(),
            msg_type: record.msg_type,
            session_id: record.session_id,
            status: record.status,
            library_id: record.library_id,
        });
        Ok(position)
    }
}

// --- mock authenticator ---------------------------------------------------

#[derive(Default)]
struct AuthState {
    script: VecDeque<AuthenticationResult>,
    ready: bool,
    /// SenderCompID of every logon handed to the authenticator.
    calls: Vec<Vec<u8>>,
}

struct MockAuthenticator(Rc<RefCell<AuthState>>);

impl Authenticator for MockAuthenticator {
    fn authenticate(
        &mut self,
        logon: &LogonView<'_>,
        _connection_id: ConnectionId,
        _library_id: LibraryId,
    ) -> AuthenticationResult {
        let mut state = self.0.borrow_mut();
        state.calls.push(logon.sender_comp_id().to_vec());
        state.script.pop_front().unwrap_or(AuthenticationResult::Valid {
            session_id: SessionId::new(7),
            sequence_index: SequenceIndex::new(0),
        })
    }

    fn position_reached(&mut self, _required_position: Position) -> bool {
        self.0.borrow().ready
    }
}

// --- recording hooks ------------------------------------------------------

#[derive(Default)]
struct HookLog {
    messages: Vec<(Vec<u8>, MsgTypeCode, Option<SessionId>)>,
    scheduled: Vec<(LibraryId, ConnectionId, DisconnectReason)>,
    session_disconnects: Vec<Option<SessionId>>,
    cancelled: Vec<ConnectionId>,
    removed: Vec<(LibraryId, ConnectionId)>,
}

struct RecordingHooks(Rc<RefCell<HookLog>>);

impl EndpointHooks for RecordingHooks {
    fn on_message(&mut self, bytes: &[u8], msg_type: MsgTypeCode, session_id: Option<SessionId>) {
        self.0
            .borrow_mut()
            .messages
            .push((bytes.to_vec(), msg_type, session_id));
    }

    fn schedule_disconnect(
        &mut self,
        library_id: LibraryId,
        connection_id: ConnectionId,
        reason: DisconnectReason,
    ) {
        self.0
            .borrow_mut()
            .scheduled
            .push((library_id, connection_id, reason));
    }

    fn on_session_disconnected(&mut self, session_id: Option<SessionId>) {
        self.0.borrow_mut().session_disconnects.push(session_id);
    }

    fn cancel_registration(&mut self, connection_id: ConnectionId) {
        self.0.borrow_mut().cancelled.push(connection_id);
    }

    fn on_endpoint_removed(&mut self, library_id: LibraryId, connection_id: ConnectionId) {
        self.0.borrow_mut().removed.push((library_id, connection_id));
    }
}

// --- harness --------------------------------------------------------------

struct Harness {
    endpoint: ReceiverEndpoint<MockChannel, MockSink, MockAuthenticator, RecordingHooks>,
    channel: Rc<RefCell<ChannelState>>,
    sink: Rc<RefCell<SinkState>>,
    auth: Rc<RefCell<AuthState>>,
    hooks: Rc<RefCell<HookLog>>,
}

impl Harness {
    fn new(session: Option<(SessionId, SequenceIndex)>) -> Self {
        let channel = Rc::new(RefCell::new(ChannelState::default()));
        let sink = Rc::new(RefCell::new(SinkState::default()));
        let auth = Rc::new(RefCell::new(AuthState::default()));
        let hooks = Rc::new(RefCell::new(HookLog::default()));

        let endpoint = ReceiverEndpoint::new(
            MockChannel(Rc::clone(&channel)),
            MockSink(Rc::clone(&sink)),
            MockAuthenticator(Rc::clone(&auth)),
            RecordingHooks(Rc::clone(&hooks)),
            EndpointConfig {
                connection_id: CONN,
                library_id: LIB,
                buffer_capacity: 1024,
                session,
            },
        );

        Self {
            endpoint,
            channel,
            sink,
            auth,
            hooks,
        }
    }

    /// Harness for an already-authenticated (resumed) session.
    fn resumed() -> Self {
        Self::new(Some((SessionId::new(42), SequenceIndex::new(1))))
    }

    fn feed(&self, bytes: Vec<u8>) {
        self.channel
            .borrow_mut()
            .script
            .push_back(ChannelEvent::Chunk(bytes));
    }
}

// --- tests ----------------------------------------------------------------

#[test]
fn test_end_to_end_logon() {
    let mut h = Harness::new(None);
    let logon = logon_message();
    h.feed(logon.clone());

    let processed = h.endpoint.poll();
    assert_eq!(processed, logon.len() * 2, "read plus consumed");

    let sink = h.sink.borrow();
    assert_eq!(sink.records.len(), 1);
    let record = &sink.records[0];
    assert_eq!(record.bytes, logon);
    assert_eq!(record.msg_type, MsgTypeCode::from_byte(b'A'));
    assert_eq!(record.status, MessageStatus::Ok);
    assert_eq!(record.session_id, Some(SessionId::new(7)));
    drop(sink);

    assert_eq!(h.endpoint.session_id(), Some(SessionId::new(7)));
    assert_eq!(h.hooks.borrow().messages.len(), 1);

    // Nothing left buffered.
    assert_eq!(h.endpoint.poll(), 0);
}

#[test]
fn test_split_read_equivalence() {
    let msg = fix_message("35=D\x0149=INI\x0156=ACC\x01");

    // One read.
    let mut whole = Harness::resumed();
    whole.feed(msg.clone());
    whole.endpoint.poll();

    // Three reads interleaved with polls.
    let mut split = Harness::resumed();
    split.feed(msg[..7].to_vec());
    split.feed(msg[7..19].to_vec());
    split.feed(msg[19..].to_vec());
    for _ in 0..3 {
        split.endpoint.poll();
    }

    let whole_records = whole.sink.borrow();
    let split_records = split.sink.borrow();
    assert_eq!(whole_records.records.len(), 1);
    assert_eq!(split_records.records.len(), 1);
    assert_eq!(whole_records.records[0].bytes, split_records.records[0].bytes);
    assert_eq!(
        whole_records.records[0].msg_type,
        split_records.records[0].msg_type
    );
    assert_eq!(
        whole_records.records[0].status,
        split_records.records[0].status
    );
}

#[test]
fn test_backpressure_resumption_exactness() {
    let mut h = Harness::resumed();
    let first = fix_message("35=D\x0149=A\x01");
    let second = fix_message("35=8\x0149=B\x01");
    let mut stream = first.clone();
    stream.extend_from_slice(&second);
    h.feed(stream);

    h.sink.borrow_mut().backpressure_next = 1;
    h.endpoint.poll();
    assert!(h.sink.borrow().records.is_empty(), "nothing published yet");

    // The stuck message is retried first; nothing overtakes it.
    h.endpoint.poll();
    let sink = h.sink.borrow();
    assert_eq!(sink.records.len(), 2);
    assert_eq!(sink.records[0].bytes, first);
    assert_eq!(sink.records[1].bytes, second);
}

#[test]
fn test_invalid_checksum_forwarded_not_dropped() {
    let mut h = Harness::resumed();
    let mut bad = fix_message("35=D\x0149=A\x01");
    bad[17] ^= 0x01; // corrupt a body byte, not the declared checksum
    let good = fix_message("35=8\x0149=B\x01");
    let mut stream = bad.clone();
    stream.extend_from_slice(&good);
    h.feed(stream);

    h.endpoint.poll();
    let sink = h.sink.borrow();
    assert_eq!(sink.records.len(), 2);
    assert_eq!(sink.records[0].status, MessageStatus::InvalidChecksum);
    assert_eq!(sink.records[0].bytes, bad);
    assert_eq!(sink.records[1].status, MessageStatus::Ok);
    assert_eq!(sink.records[1].bytes, good);
}

#[test]
fn test_garbage_condemns_whole_buffer() {
    let mut h = Harness::resumed();
    let garbage = b"definitely not a fix message".to_vec();
    h.feed(garbage.clone());

    h.endpoint.poll();
    let sink = h.sink.borrow();
    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.records[0].status, MessageStatus::Invalid);
    assert_eq!(sink.records[0].msg_type, MsgTypeCode::INVALID);
    assert_eq!(sink.records[0].bytes, garbage);
    drop(sink);

    // The condemned region was consumed; the connection stays up.
    assert!(!h.endpoint.has_disconnected());
    assert_eq!(h.endpoint.poll(), 0);
}

#[test]
fn test_condemned_buffer_retained_under_backpressure() {
    let mut h = Harness::resumed();
    let garbage = b"definitely not a fix message".to_vec();
    h.feed(garbage.clone());

    h.sink.borrow_mut().backpressure_next = 1;
    h.endpoint.poll();
    assert!(h.sink.borrow().records.is_empty());

    h.endpoint.poll();
    let sink = h.sink.borrow();
    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.records[0].bytes, garbage);
}

#[test]
fn test_resync_emits_invalid_body_length_then_next_message() {
    let mut h = Harness::resumed();
    // Rewrite the declared body length in place so it lands short of the
    // real checksum tag.
    let mut bad = fix_message("35=A\x0149=SENDER\x01");
    bad.splice(10..15, b"9=11\x01".iter().copied());
    let good = fix_message("35=D\x01");
    let mut stream = bad.clone();
    stream.extend_from_slice(&good);
    h.feed(stream);

    h.endpoint.poll();
    let sink = h.sink.borrow();
    assert_eq!(sink.records.len(), 2);
    assert_eq!(sink.records[0].status, MessageStatus::InvalidBodyLength);
    assert_eq!(sink.records[0].bytes, bad);
    assert_eq!(sink.records[0].msg_type, MsgTypeCode::UNKNOWN);
    assert_eq!(sink.records[1].status, MessageStatus::Ok);
    assert_eq!(sink.records[1].bytes, good);
}

#[test]
fn test_authentication_gates_first_message() {
    let mut h = Harness::new(None);
    h.auth
        .borrow_mut()
        .script
        .push_back(AuthenticationResult::Invalid {
            reason: DisconnectReason::FailedAuthentication,
        });
    h.feed(logon_message());

    h.endpoint.poll();

    assert!(h.sink.borrow().records.is_empty(), "rejected logon never published");
    assert!(h.endpoint.has_disconnected());
    let hooks = h.hooks.borrow();
    assert_eq!(
        hooks.scheduled,
        vec![(LIB, CONN, DisconnectReason::FailedAuthentication)]
    );
    assert_eq!(hooks.session_disconnects, vec![None]);
    assert_eq!(hooks.cancelled, vec![CONN]);
    assert_eq!(hooks.removed, vec![(LIB, CONN)]);
}

#[test]
fn test_backpressured_authentication_retried_verbatim() {
    let mut h = Harness::new(None);
    let logon = logon_message();
    h.auth
        .borrow_mut()
        .script
        .push_back(AuthenticationResult::Backpressured {
            required_position: Position::new(5),
        });
    h.feed(logon.clone());

    // First poll frames the logon and stashes the backpressured result.
    h.endpoint.poll();
    assert!(h.sink.borrow().records.is_empty());
    assert_eq!(h.auth.borrow().calls.len(), 1);
    assert_eq!(h.endpoint.session_id(), None);

    // Readiness not reached: no progress, no repeated authentication.
    assert_eq!(h.endpoint.poll(), 0);
    assert_eq!(h.auth.borrow().calls.len(), 1);

    // Once ready, the identical logon is retried and resolves.
    h.auth.borrow_mut().ready = true;
    let processed = h.endpoint.poll();
    assert_eq!(processed, logon.len());

    let auth = h.auth.borrow();
    assert_eq!(auth.calls.len(), 2);
    assert_eq!(auth.calls[0], auth.calls[1], "identical inputs on retry");
    drop(auth);

    let sink = h.sink.borrow();
    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.records[0].bytes, logon);
    assert_eq!(sink.records[0].status, MessageStatus::Ok);
    assert_eq!(sink.records[0].session_id, Some(SessionId::new(7)));
    drop(sink);

    assert_eq!(h.endpoint.session_id(), Some(SessionId::new(7)));
}

#[test]
fn test_first_message_not_a_logon_is_condemned() {
    let mut h = Harness::new(None);
    let order = fix_message("35=D\x0149=INI\x0156=ACC\x01");
    h.feed(order.clone());

    h.endpoint.poll();

    let sink = h.sink.borrow();
    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.records[0].status, MessageStatus::Invalid);
    assert_eq!(sink.records[0].bytes, order);
    drop(sink);

    assert!(h.auth.borrow().calls.is_empty());
    assert!(!h.endpoint.has_disconnected());
}

#[test]
fn test_remote_disconnect() {
    let mut h = Harness::resumed();
    h.channel.borrow_mut().script.push_back(ChannelEvent::Eof);

    h.endpoint.poll();

    assert!(h.endpoint.has_disconnected());
    let hooks = h.hooks.borrow();
    assert_eq!(
        hooks.scheduled,
        vec![(LIB, CONN, DisconnectReason::RemoteDisconnect)]
    );
    assert_eq!(hooks.session_disconnects, vec![Some(SessionId::new(42))]);
    assert_eq!(hooks.removed, vec![(LIB, CONN)]);
}

#[test]
fn test_io_fault_disconnects() {
    let mut h = Harness::resumed();
    h.channel
        .borrow_mut()
        .script
        .push_back(ChannelEvent::Fault(io::ErrorKind::PermissionDenied));

    h.endpoint.poll();

    assert!(h.endpoint.has_disconnected());
    assert_eq!(h.hooks.borrow().scheduled.len(), 1);
}

#[test]
fn test_no_logon_disconnect_is_idempotent() {
    let mut h = Harness::new(None);
    h.endpoint.on_no_logon_disconnect();
    h.endpoint.on_no_logon_disconnect();

    let hooks = h.hooks.borrow();
    assert_eq!(hooks.scheduled, vec![(LIB, CONN, DisconnectReason::NoLogon)]);
    assert_eq!(hooks.removed.len(), 1);
    drop(hooks);

    assert_eq!(h.endpoint.poll(), 0);
}

#[test]
fn test_close_releases_socket_without_router_removal() {
    let mut h = Harness::resumed();
    h.endpoint.close(DisconnectReason::ApplicationRequested);

    assert!(h.channel.borrow().shut_down);
    assert!(h.endpoint.has_disconnected());
    let hooks = h.hooks.borrow();
    assert_eq!(
        hooks.scheduled,
        vec![(LIB, CONN, DisconnectReason::ApplicationRequested)]
    );
    assert!(hooks.removed.is_empty(), "close is driven by the router");
    drop(hooks);

    // Closing again emits nothing further.
    h.endpoint.close(DisconnectReason::ApplicationRequested);
    assert_eq!(h.hooks.borrow().scheduled.len(), 1);
}

#[test]
fn test_pause_and_play() {
    let mut h = Harness::resumed();
    let msg = fix_message("35=D\x0149=A\x01");
    h.feed(msg.clone());

    h.endpoint.pause();
    assert_eq!(h.endpoint.poll(), 0);
    assert!(h.sink.borrow().records.is_empty());

    h.endpoint.play();
    h.endpoint.poll();
    assert_eq!(h.sink.borrow().records.len(), 1);
}

#[test]
fn test_library_id_reassignment_applies_to_later_records() {
    let mut h = Harness::resumed();
    h.endpoint.assign_library_id(LibraryId::new(11));
    assert_eq!(h.endpoint.library_id(), LibraryId::new(11));

    h.feed(fix_message("35=D\x0149=A\x01"));
    h.endpoint.poll();
    let sink = h.sink.borrow();
    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.records[0].library_id, LibraryId::new(11));
}

#[test]
fn test_buffered_message_published_after_eof() {
    let mut h = Harness::resumed();
    let msg = fix_message("35=D\x0149=A\x01");
    h.feed(msg.clone());

    // The message arrives but the bus refuses it, so it stays buffered.
    h.sink.borrow_mut().backpressure_next = 1;
    h.endpoint.poll();
    assert!(h.sink.borrow().records.is_empty());

    // The peer then closes; the retained message must still go out.
    h.channel.borrow_mut().script.push_back(ChannelEvent::Eof);
    h.endpoint.poll();

    assert!(h.endpoint.has_disconnected());
    let sink = h.sink.borrow();
    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.records[0].bytes, msg);
    assert_eq!(sink.records[0].status, MessageStatus::Ok);
}
