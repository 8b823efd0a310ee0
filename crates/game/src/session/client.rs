use std::time::Instant;

use glam::IVec2;

use crate::client::{Interpolator, LocalPredictor};
use crate::input::InputSnapshot;
use crate::map::WallMap;
use crate::net::{GameState, Message, ProjectileState, TankState};
use crate::simulation::{Side, SimulationConfig, Tank};

use super::{ChatSink, Frame, LocalAction, LocalEvent, Session};

/// The non-authoritative side.
///
/// Predicts its own tank from local keys, interpolates the host's tank
/// toward the latest snapshot, and mirrors the projectile list verbatim.
pub struct ClientSession<M> {
    map: M,
    config: SimulationConfig,
    own: Tank,
    remote: Tank,
    placed: bool,
    projectiles: Vec<ProjectileState>,
    interpolator: Interpolator,
    predictor: LocalPredictor,
    held: InputSnapshot,
    winner: Option<Side>,
    authoritative_own: Option<TankState>,
}

impl<M: WallMap> ClientSession<M> {
    pub fn new(map: M, config: SimulationConfig) -> Self {
        let interpolator = Interpolator::new(config.network_interval, config.stale_snapshot_after);
        let predictor = LocalPredictor::new(config.peer_bindings, config.peer_speed);
        Self {
            map,
            own: Tank::new(Side::Peer, IVec2::ZERO),
            remote: Tank::new(Side::Host, IVec2::ZERO),
            placed: false,
            projectiles: Vec::new(),
            interpolator,
            predictor,
            held: InputSnapshot::new(),
            winner: None,
            authoritative_own: None,
            config,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn own_tank(&self) -> &Tank {
        &self.own
    }

    pub fn remote_tank(&self) -> &Tank {
        &self.remote
    }

    /// The host's last word on where our tank is. Only reported, never applied
    /// after the initial placement.
    pub fn authoritative_own(&self) -> Option<&TankState> {
        self.authoritative_own.as_ref()
    }

    pub fn projectiles(&self) -> &[ProjectileState] {
        &self.projectiles
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn is_placed(&self) -> bool {
        self.placed
    }

    pub fn held(&self) -> &InputSnapshot {
        &self.held
    }

    /// Takes in a host snapshot received at `now`.
    ///
    /// Both tanks jump to the snapshot on the first one, and again on the
    /// first one after a finished match is reset.
    pub fn apply_snapshot(&mut self, state: GameState, now: Instant) {
        let restarted = self.winner.is_some() && state.winner.is_none();
        if !self.placed || restarted {
            self.own.set_state(&state.peer);
            self.own.velocity = IVec2::ZERO;
            self.remote.set_state(&state.host);
            self.interpolator.clear();
            self.placed = true;
            log::info!(
                "Placed at {:?}, host at {:?}",
                state.peer.position,
                state.host.position
            );
        }

        if state.winner != self.winner {
            match state.winner {
                Some(winner) => log::info!("Match over, {} wins", winner),
                None => log::info!("Match restarted"),
            }
            self.held.clear();
        }

        self.interpolator.set_target(state.host, now);
        self.authoritative_own = Some(state.peer);
        self.projectiles = state.projectiles;
        self.winner = state.winner;
    }
}

impl<M: WallMap> Session for ClientSession<M> {
    fn side(&self) -> Side {
        Side::Peer
    }

    fn handle_message(&mut self, message: Message, chat: &mut dyn ChatSink) {
        match message {
            Message::GameState(state) => self.apply_snapshot(state, Instant::now()),
            Message::ChatMessage(text) => chat.on_chat(&text),
            other => log::debug!("Ignoring {} from host", other.kind()),
        }
    }

    fn handle_local(&mut self, event: LocalEvent) -> LocalAction {
        match event {
            LocalEvent::KeyDown(code) => {
                if self.winner.is_some() {
                    return LocalAction::None;
                }
                if self.predictor.bindings().is_fire(code) {
                    return LocalAction::Send(Message::FireRequest);
                }
                self.held.press(code);
                LocalAction::None
            }
            LocalEvent::KeyUp(code) => {
                self.held.release(code);
                LocalAction::None
            }
            LocalEvent::Chat(text) => LocalAction::Send(Message::ChatMessage(text)),
            LocalEvent::Restart | LocalEvent::Decline => {
                log::debug!("Only the host decides on a rematch");
                LocalAction::None
            }
            LocalEvent::Quit => LocalAction::Quit,
        }
    }

    fn on_sim_tick(&mut self, now: Instant) {
        if !self.placed || self.winner.is_some() {
            return;
        }

        self.predictor
            .advance(&mut self.own, &self.held, &self.map, &self.remote);
        self.interpolator.update(&mut self.remote, now);
    }

    fn on_network_tick(&mut self) -> Option<Message> {
        if self.winner.is_some() {
            return None;
        }
        Some(Message::PlayerInput(self.held.clone()))
    }

    fn frame(&self) -> Frame {
        Frame {
            local: Side::Peer,
            state: GameState {
                host: self.remote.state(),
                peer: self.own.state(),
                projectiles: self.projectiles.clone(),
                winner: self.winner,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::input::key;
    use crate::map::TileMap;
    use crate::simulation::Direction;

    fn session() -> ClientSession<TileMap> {
        ClientSession::new(TileMap::battlefield(), SimulationConfig::default())
    }

    fn snapshot(host: [i32; 2], peer: [i32; 2], winner: Option<Side>) -> GameState {
        GameState {
            host: TankState {
                position: host,
                direction: Direction::Up,
            },
            peer: TankState {
                position: peer,
                direction: Direction::Up,
            },
            projectiles: vec![ProjectileState {
                id: 0,
                owner: Side::Host,
                position: [host[0] + 15, host[1] + 22],
                direction: Direction::Up,
            }],
            winner,
        }
    }

    #[test]
    fn test_first_snapshot_places_both_tanks() {
        let mut session = session();
        assert!(!session.is_placed());

        session.apply_snapshot(snapshot([100, 100], [600, 800], None), Instant::now());

        assert!(session.is_placed());
        assert_eq!(session.own_tank().position, IVec2::new(600, 800));
        assert_eq!(session.remote_tank().position, IVec2::new(100, 100));
        assert_eq!(session.projectiles().len(), 1);
    }

    #[test]
    fn test_own_tank_is_not_reconciled() {
        let mut session = session();
        let start = Instant::now();
        session.apply_snapshot(snapshot([100, 100], [600, 800], None), start);

        session.handle_local(LocalEvent::KeyDown(key::LEFT));
        session.on_sim_tick(start + Duration::from_millis(16));
        assert_eq!(session.own_tank().position, IVec2::new(596, 800));

        session.apply_snapshot(snapshot([100, 100], [600, 800], None), start);
        assert_eq!(session.own_tank().position, IVec2::new(596, 800));
        assert_eq!(
            session.authoritative_own().map(|s| s.position),
            Some([600, 800])
        );
    }

    #[test]
    fn test_remote_tank_is_interpolated() {
        let mut session = session();
        let start = Instant::now();
        session.apply_snapshot(snapshot([100, 100], [600, 800], None), start);
        session.apply_snapshot(snapshot([140, 100], [600, 800], None), start);

        session.on_sim_tick(start + Duration::from_millis(25));
        assert_eq!(session.remote_tank().position, IVec2::new(120, 100));

        session.on_sim_tick(start + Duration::from_millis(600));
        assert_eq!(session.remote_tank().position, IVec2::new(120, 100));
    }

    #[test]
    fn test_fire_key_requests_fire() {
        let mut session = session();
        assert_eq!(
            session.handle_local(LocalEvent::KeyDown(key::SLASH)),
            LocalAction::Send(Message::FireRequest)
        );
        assert!(session.held().is_empty());

        session.handle_local(LocalEvent::KeyDown(key::UP));
        assert_eq!(
            session.on_network_tick(),
            Some(Message::PlayerInput(InputSnapshot::from_codes([key::UP])))
        );
    }

    #[test]
    fn test_routes_messages_by_role() {
        let mut session = session();
        let mut chat: Vec<String> = Vec::new();

        session.handle_message(Message::FireRequest, &mut chat);
        session.handle_message(
            Message::PlayerInput(InputSnapshot::from_codes([key::A])),
            &mut chat,
        );
        session.handle_message(Message::ChatMessage("hi".into()), &mut chat);
        assert_eq!(chat, vec!["hi".to_string()]);
        assert!(!session.is_placed());

        session.handle_message(
            Message::GameState(snapshot([100, 100], [600, 800], None)),
            &mut chat,
        );
        assert!(session.is_placed());
    }

    #[test]
    fn test_winner_stops_and_restart_resumes() {
        let mut session = session();
        let start = Instant::now();
        session.apply_snapshot(snapshot([100, 100], [600, 800], None), start);
        session.handle_local(LocalEvent::KeyDown(key::LEFT));

        session.apply_snapshot(snapshot([100, 100], [600, 800], Some(Side::Host)), start);
        assert_eq!(session.winner(), Some(Side::Host));
        assert!(session.held().is_empty());
        assert_eq!(session.on_network_tick(), None);
        assert_eq!(
            session.handle_local(LocalEvent::KeyDown(key::SLASH)),
            LocalAction::None
        );

        session.apply_snapshot(snapshot([300, 300], [800, 700], None), start);
        assert_eq!(session.winner(), None);
        assert_eq!(session.own_tank().position, IVec2::new(800, 700));
        assert_eq!(session.remote_tank().position, IVec2::new(300, 300));
        assert!(session.on_network_tick().is_some());
    }
}
