use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio::sync::mpsc::{self, Receiver, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::protocol::{Envelope, MAX_FRAME_SIZE, Message, PacketError};
use super::stats::{NetworkStats, StatsCounters};

#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },
    #[error("failed to accept peer: {0}")]
    Accept(io::Error),
    #[error("failed to connect to {addr}: {source}")]
    Connect { addr: String, source: io::Error },
    #[error("send queue full")]
    QueueFull,
    #[error("receive failed: {0}")]
    Receive(io::Error),
    #[error("connection closed")]
    Closed,
    #[error(transparent)]
    Packet(#[from] PacketError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    PeerClosed,
    Closed,
}

/// Listening half of host mode. Accepts exactly one peer.
pub struct HostListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl HostListener {
    pub async fn bind(addr: &str) -> Result<Self, NetError> {
        let listener = TcpListener::bind(addr).await.map_err(|source| NetError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        let local_addr = listener.local_addr().map_err(|source| NetError::Bind {
            addr: addr.to_string(),
            source,
        })?;

        Ok(Self {
            listener,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Blocks until one peer connects. The listening socket is released on return.
    pub async fn accept(self) -> Result<Connection, NetError> {
        log::info!("Waiting for a peer on {}", self.local_addr);
        let (stream, peer_addr) = self.listener.accept().await.map_err(NetError::Accept)?;
        log::info!("Peer connected from {}", peer_addr);
        Ok(Connection::from_stream(stream, peer_addr))
    }
}

pub async fn connect(addr: &str) -> Result<Connection, NetError> {
    log::info!("Connecting to {}", addr);
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| NetError::Connect {
            addr: addr.to_string(),
            source,
        })?;
    let peer_addr = stream.peer_addr().map_err(|source| NetError::Connect {
        addr: addr.to_string(),
        source,
    })?;
    log::info!("Connected to {}", peer_addr);
    Ok(Connection::from_stream(stream, peer_addr))
}

/// Outgoing chat and fire requests that may wait for the writer before
/// `send` starts refusing them.
pub const SEND_QUEUE_CAPACITY: usize = 32;

/// One duplex peer connection.
///
/// Two tasks own the socket halves. The receive task decodes frames and
/// forwards them over a channel that the owner drains with
/// [`Connection::try_recv`]. The send task writes whatever the owner hands
/// it: queued messages through [`Connection::send`] and a latest-value slot
/// through [`Connection::publish`]. Neither call waits on the socket, so a
/// peer that stops reading only stalls the send task.
pub struct Connection {
    peer_addr: SocketAddr,
    outgoing: Option<mpsc::Sender<Message>>,
    latest: Option<watch::Sender<Option<Message>>>,
    incoming: UnboundedReceiver<Envelope>,
    receive_task: JoinHandle<()>,
    send_task: JoinHandle<()>,
    state: ConnectionState,
    counters: Arc<StatsCounters>,
}

impl Connection {
    fn from_stream(stream: TcpStream, peer_addr: SocketAddr) -> Self {
        if let Err(e) = stream.set_nodelay(true) {
            log::warn!("Could not disable Nagle on {}: {}", peer_addr, e);
        }

        let (reader, writer) = stream.into_split();
        let counters = Arc::new(StatsCounters::default());

        let (incoming_tx, incoming) = mpsc::unbounded_channel();
        let receive_task = tokio::spawn(receive_loop(reader, incoming_tx, Arc::clone(&counters)));

        let (outgoing, queued) = mpsc::channel(SEND_QUEUE_CAPACITY);
        let (latest, latest_rx) = watch::channel(None);
        let send_task = tokio::spawn(send_loop(
            writer,
            queued,
            latest_rx,
            Arc::clone(&counters),
            peer_addr,
        ));

        Self {
            peer_addr,
            outgoing: Some(outgoing),
            latest: Some(latest),
            incoming,
            receive_task,
            send_task,
            state: ConnectionState::Connected,
            counters,
        }
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn stats(&self) -> NetworkStats {
        self.counters.snapshot()
    }

    /// Queues a message for delivery in order. Fails without waiting when
    /// the connection is closed or the queue is full; write errors surface
    /// later in the log and in [`NetworkStats::send_failures`].
    pub fn send(&mut self, message: Message) -> Result<(), NetError> {
        let outgoing = self.outgoing.as_ref().ok_or(NetError::Closed)?;

        match outgoing.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.counters.record_send_failure();
                Err(NetError::QueueFull)
            }
            Err(TrySendError::Closed(_)) => {
                self.counters.record_send_failure();
                Err(NetError::Closed)
            }
        }
    }

    /// Replaces the pending periodic message. Only the most recent one is
    /// written if the send task falls behind.
    pub fn publish(&mut self, message: Message) -> Result<(), NetError> {
        let latest = self.latest.as_ref().ok_or(NetError::Closed)?;
        latest.send_replace(Some(message));
        Ok(())
    }

    /// Non-blocking take of the next received message.
    pub fn try_recv(&mut self) -> Option<Message> {
        match self.incoming.try_recv() {
            Ok(envelope) => Some(envelope.message),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if self.state == ConnectionState::Connected {
                    self.state = ConnectionState::PeerClosed;
                }
                None
            }
        }
    }

    /// Waits for the next received message, `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<Message> {
        match self.incoming.recv().await {
            Some(envelope) => Some(envelope.message),
            None => {
                if self.state == ConnectionState::Connected {
                    self.state = ConnectionState::PeerClosed;
                }
                None
            }
        }
    }

    /// Stops accepting outgoing messages and stops the receive task. The send
    /// task flushes what is already queued, then shuts down the write half.
    /// Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        self.state = ConnectionState::Closed;

        self.outgoing.take();
        self.latest.take();
        self.receive_task.abort();
        self.incoming.close();
        log::info!("Connection to {} closed", self.peer_addr);
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
        // A writer stuck on a peer that never reads would otherwise hold the socket.
        self.send_task.abort();
    }
}

enum ReadFrame {
    Data(Vec<u8>),
    Eof,
}

async fn read_frame(reader: &mut OwnedReadHalf) -> Result<ReadFrame, NetError> {
    let len = match reader.read_u32().await {
        Ok(len) => len as usize,
        Err(e) if is_closed(&e) => return Ok(ReadFrame::Eof),
        Err(e) => return Err(NetError::Receive(e)),
    };

    if len > MAX_FRAME_SIZE {
        return Err(PacketError::FrameTooLarge(len).into());
    }

    let mut body = vec![0u8; len];
    match reader.read_exact(&mut body).await {
        Ok(_) => Ok(ReadFrame::Data(body)),
        Err(e) if is_closed(&e) => Ok(ReadFrame::Eof),
        Err(e) => Err(NetError::Receive(e)),
    }
}

fn is_closed(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}

async fn receive_loop(
    mut reader: OwnedReadHalf,
    incoming: UnboundedSender<Envelope>,
    counters: Arc<StatsCounters>,
) {
    loop {
        let body = match read_frame(&mut reader).await {
            Ok(ReadFrame::Data(body)) => body,
            Ok(ReadFrame::Eof) => {
                log::info!("Stream closed by peer");
                break;
            }
            Err(e) => {
                log::error!("Receive loop stopped: {}", e);
                break;
            }
        };

        match Envelope::deserialize(&body) {
            Ok(envelope) => {
                counters.record_received(body.len(), envelope.sequence);
                log::trace!(
                    "Received {} (seq {})",
                    envelope.message.kind(),
                    envelope.sequence
                );
                if incoming.send(envelope).is_err() {
                    break;
                }
            }
            Err(e) => {
                counters.record_malformed(body.len());
                log::warn!("Dropping malformed message ({} bytes): {}", body.len(), e);
            }
        }
    }
}

async fn send_loop(
    mut writer: OwnedWriteHalf,
    mut queued: Receiver<Message>,
    mut latest: watch::Receiver<Option<Message>>,
    counters: Arc<StatsCounters>,
    peer_addr: SocketAddr,
) {
    let mut sequence: u32 = 0;
    let mut latest_open = true;

    loop {
        let message = tokio::select! {
            biased;
            message = queued.recv() => match message {
                Some(message) => message,
                None => break,
            },
            changed = latest.changed(), if latest_open => {
                if changed.is_err() {
                    latest_open = false;
                    continue;
                }
                let pending = latest.borrow_and_update().clone();
                match pending {
                    Some(message) => message,
                    None => continue,
                }
            }
        };

        let kind = message.kind();
        let frame = match Envelope::new(sequence, message).to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                counters.record_send_failure();
                log::warn!("Could not encode {}: {}", kind, e);
                continue;
            }
        };
        sequence = sequence.wrapping_add(1);

        match writer.write_all(&frame).await {
            Ok(()) => {
                counters.record_sent(frame.len());
                log::trace!("Sent {} (seq {})", kind, sequence.wrapping_sub(1));
            }
            Err(e) => {
                counters.record_send_failure();
                log::warn!("Failed to send {} to {}: {}", kind, peer_addr, e);
            }
        }
    }

    log::debug!("Send task for {} finished", peer_addr);
}
