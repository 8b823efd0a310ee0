use std::time::Instant;

use crate::input::{InputQueue, InputSnapshot};
use crate::map::WallMap;
use crate::net::Message;
use crate::simulation::{MatchState, Side, Simulation};

use super::{ChatSink, Frame, LocalAction, LocalEvent, Session};

/// The authoritative side. Owns the simulation and the peer's input queue.
pub struct HostSession<M> {
    simulation: Simulation<M>,
    remote_inputs: InputQueue,
    held: InputSnapshot,
    announce_final: bool,
}

impl<M: WallMap> HostSession<M> {
    pub fn new(simulation: Simulation<M>) -> Self {
        let remote_inputs = InputQueue::new(simulation.config().input_queue_capacity);
        Self {
            simulation,
            remote_inputs,
            held: InputSnapshot::new(),
            announce_final: false,
        }
    }

    pub fn simulation(&self) -> &Simulation<M> {
        &self.simulation
    }

    pub fn pending_inputs(&self) -> usize {
        self.remote_inputs.len()
    }

    pub fn held(&self) -> &InputSnapshot {
        &self.held
    }

    fn restart(&mut self) {
        if !matches!(self.simulation.state(), MatchState::Over { .. }) {
            log::debug!("Restart ignored in state {:?}", self.simulation.state());
            return;
        }

        match self.simulation.reset() {
            Ok(()) => {
                self.held.clear();
                self.remote_inputs.clear();
                self.announce_final = false;
            }
            Err(e) => log::error!("Could not restart match: {}", e),
        }
    }
}

impl<M: WallMap> Session for HostSession<M> {
    fn side(&self) -> Side {
        Side::Host
    }

    fn handle_message(&mut self, message: Message, chat: &mut dyn ChatSink) {
        match message {
            Message::FireRequest => {
                if let Some(id) = self.simulation.fire(Side::Peer) {
                    log::debug!("Peer fired projectile {}", id);
                }
            }
            Message::PlayerInput(snapshot) => {
                if self.remote_inputs.push(snapshot).is_some() {
                    log::warn!(
                        "Input queue full, dropped oldest snapshot ({} dropped so far)",
                        self.remote_inputs.dropped()
                    );
                }
            }
            Message::ChatMessage(text) => chat.on_chat(&text),
            Message::GameState(_) => {
                log::debug!("Ignoring GAME_STATE from peer");
            }
        }
    }

    fn handle_local(&mut self, event: LocalEvent) -> LocalAction {
        match event {
            LocalEvent::KeyDown(code) => {
                if self.simulation.config().host_bindings.is_fire(code) {
                    if let Some(id) = self.simulation.fire(Side::Host) {
                        log::debug!("Host fired projectile {}", id);
                    }
                } else if self.simulation.state().is_playing() {
                    self.held.press(code);
                }
                LocalAction::None
            }
            LocalEvent::KeyUp(code) => {
                self.held.release(code);
                LocalAction::None
            }
            LocalEvent::Chat(text) => LocalAction::Send(Message::ChatMessage(text)),
            LocalEvent::Restart => {
                self.restart();
                LocalAction::None
            }
            LocalEvent::Decline => {
                if self.simulation.decline() {
                    log::info!("Rematch declined, ending session");
                }
                LocalAction::None
            }
            LocalEvent::Quit => LocalAction::Quit,
        }
    }

    fn on_sim_tick(&mut self, _now: Instant) {
        let report = self.simulation.tick(&self.held, &mut self.remote_inputs);
        if report.winner.is_some() {
            self.held.clear();
            self.announce_final = true;
        }
    }

    fn on_network_tick(&mut self) -> Option<Message> {
        if self.simulation.state().is_playing() || self.announce_final {
            self.announce_final = false;
            Some(Message::GameState(self.simulation.snapshot()))
        } else {
            None
        }
    }

    fn frame(&self) -> Frame {
        Frame {
            local: Side::Host,
            state: self.simulation.snapshot(),
        }
    }

    fn is_finished(&self) -> bool {
        self.simulation.state() == MatchState::Terminated
    }
}
