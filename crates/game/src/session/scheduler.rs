use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{self, MissedTickBehavior};

use crate::net::{Connection, Message};
use crate::simulation::SimulationConfig;

use super::{ChatSink, LocalAction, LocalEvent, Renderer, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    pub tick_interval: Duration,
    pub network_interval: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self::from(&SimulationConfig::default())
    }
}

impl From<&SimulationConfig> for SessionTiming {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            tick_interval: config.tick_interval,
            network_interval: config.network_interval,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The local player asked to quit.
    LocalQuit,
    /// The match was terminated after a declined rematch.
    Finished,
    /// The remote side closed the stream.
    PeerClosed,
}

/// Drives one session until it ends, then closes the connection.
///
/// Everything mutable lives in this loop. Received messages are drained
/// at the start of each simulation tick; local events are handled as they
/// arrive. Outgoing messages are handed to the connection's send task, so
/// the loop never waits on the socket. Send failures are logged and the
/// loop keeps going. If the front end closes its event channel the session
/// runs on until the peer leaves.
pub async fn run_session<S, C, R>(
    session: &mut S,
    connection: &mut Connection,
    local: &mut UnboundedReceiver<LocalEvent>,
    chat: &mut C,
    renderer: &mut R,
    timing: SessionTiming,
) -> SessionEnd
where
    S: Session + ?Sized,
    C: ChatSink,
    R: Renderer + ?Sized,
{
    let mut sim_timer = time::interval(timing.tick_interval);
    sim_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut net_timer = time::interval(timing.network_interval);
    net_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    log::info!(
        "Session started as {} with {}",
        session.side(),
        connection.peer_addr()
    );

    let mut frontend_open = true;

    let end = loop {
        tokio::select! {
            _ = sim_timer.tick() => {
                while let Some(message) = connection.try_recv() {
                    session.handle_message(message, chat);
                }
                if !connection.is_open() {
                    break SessionEnd::PeerClosed;
                }

                session.on_sim_tick(Instant::now());
                renderer.redraw(&session.frame());

                if session.is_finished() {
                    break SessionEnd::Finished;
                }
            }
            _ = net_timer.tick() => {
                if let Some(message) = session.on_network_tick() {
                    let kind = message.kind();
                    if let Err(e) = connection.publish(message) {
                        log::warn!("Failed to send {}: {}", kind, e);
                    }
                }
            }
            event = local.recv(), if frontend_open => match event {
                Some(event) => match session.handle_local(event) {
                    LocalAction::None => {}
                    LocalAction::Send(message) => send(connection, message),
                    LocalAction::Quit => break SessionEnd::LocalQuit,
                },
                None => {
                    log::info!("Local input closed, running until the peer leaves");
                    frontend_open = false;
                }
            },
        }
    };

    let stats = connection.stats();
    log::info!(
        "Session ended ({:?}): sent {} messages / {} bytes, received {} messages / {} bytes, {} malformed",
        end,
        stats.messages_sent,
        stats.bytes_sent,
        stats.messages_received,
        stats.bytes_received,
        stats.malformed_messages
    );
    connection.close();
    end
}

fn send(connection: &mut Connection, message: Message) {
    let kind = message.kind();
    if let Err(e) = connection.send(message) {
        log::warn!("Failed to send {}: {}", kind, e);
    }
}
