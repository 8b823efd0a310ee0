mod chat;
mod client;
mod host;
mod scheduler;

use std::time::Instant;

pub use chat::{ChatSink, LogChat};
pub use client::ClientSession;
pub use host::HostSession;
pub use scheduler::{SessionEnd, SessionTiming, run_session};

use crate::net::{GameState, Message};
use crate::simulation::Side;

/// Something the local front end did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalEvent {
    KeyDown(u16),
    KeyUp(u16),
    Chat(String),
    /// Accept a rematch after the match is over.
    Restart,
    /// Refuse a rematch after the match is over.
    Decline,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalAction {
    None,
    Send(Message),
    Quit,
}

/// Read-only view handed to the renderer after every simulation tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub local: Side,
    pub state: GameState,
}

pub trait Renderer {
    fn redraw(&mut self, frame: &Frame);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn redraw(&mut self, _frame: &Frame) {}
}

/// Traces every frame. Useful when running without a display.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn redraw(&mut self, frame: &Frame) {
        let state = &frame.state;
        log::trace!(
            "frame: host {:?} {:?}, peer {:?} {:?}, {} projectiles",
            state.host.position,
            state.host.direction,
            state.peer.position,
            state.peer.direction,
            state.projectiles.len()
        );
    }
}

/// One side of a match, driven by [`run_session`].
pub trait Session {
    fn side(&self) -> Side;

    /// Routes a message received from the other side.
    fn handle_message(&mut self, message: Message, chat: &mut dyn ChatSink);

    fn handle_local(&mut self, event: LocalEvent) -> LocalAction;

    fn on_sim_tick(&mut self, now: Instant);

    /// The message to send on this network tick, if any.
    fn on_network_tick(&mut self) -> Option<Message>;

    fn frame(&self) -> Frame;

    /// True once the session has nothing left to do.
    fn is_finished(&self) -> bool {
        false
    }
}
