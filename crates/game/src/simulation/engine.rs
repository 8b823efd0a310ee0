use glam::IVec2;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::input::{InputQueue, InputSnapshot};
use crate::map::WallMap;
use crate::net::GameState;

use super::config::SimulationConfig;
use super::entity::{Side, TANK_SIZE, Tank};
use super::projectile::Projectile;
use super::spawn::{SpawnError, spawn_pair};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    Playing,
    Over { winner: Side },
    Terminated,
}

impl MatchState {
    pub fn is_playing(&self) -> bool {
        matches!(self, MatchState::Playing)
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            MatchState::Over { winner } => Some(*winner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub projectile_id: u32,
    pub shooter: Side,
}

impl Hit {
    pub fn victim(&self) -> Side {
        self.shooter.opponent()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u32,
    pub inputs_applied: usize,
    pub hits: Vec<Hit>,
    /// Set only on the tick that ended the match.
    pub winner: Option<Side>,
}

/// Authoritative match state. Only the host runs this.
pub struct Simulation<M> {
    config: SimulationConfig,
    map: M,
    host: Tank,
    peer: Tank,
    projectiles: Vec<Projectile>,
    next_projectile_id: u32,
    state: MatchState,
    tick: u32,
    rng: StdRng,
}

impl<M: WallMap> Simulation<M> {
    pub fn new(map: M, config: SimulationConfig) -> Result<Self, SpawnError> {
        Self::with_rng(map, config, StdRng::from_entropy())
    }

    pub fn with_seed(map: M, config: SimulationConfig, seed: u64) -> Result<Self, SpawnError> {
        Self::with_rng(map, config, StdRng::seed_from_u64(seed))
    }

    /// Starts a match with both tanks at fixed positions, skipping spawn sampling.
    pub fn with_positions(map: M, config: SimulationConfig, host: IVec2, peer: IVec2) -> Self {
        Self::from_parts(map, config, host, peer, StdRng::seed_from_u64(0))
    }

    fn with_rng(map: M, config: SimulationConfig, mut rng: StdRng) -> Result<Self, SpawnError> {
        let (host, peer) = spawn_pair(
            &map,
            &mut rng,
            config.spawn_area,
            TANK_SIZE,
            config.max_spawn_attempts,
        )?;
        Ok(Self::from_parts(map, config, host, peer, rng))
    }

    fn from_parts(map: M, config: SimulationConfig, host: IVec2, peer: IVec2, rng: StdRng) -> Self {
        Self {
            config,
            map,
            host: Tank::new(Side::Host, host),
            peer: Tank::new(Side::Peer, peer),
            projectiles: Vec::new(),
            next_projectile_id: 0,
            state: MatchState::Playing,
            tick: 0,
            rng,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn tank(&self, side: Side) -> &Tank {
        match side {
            Side::Host => &self.host,
            Side::Peer => &self.peer,
        }
    }

    pub fn tank_mut(&mut self, side: Side) -> &mut Tank {
        match side {
            Side::Host => &mut self.host,
            Side::Peer => &mut self.peer,
        }
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn current_tick(&self) -> u32 {
        self.tick
    }

    /// Spawns a projectile from `side`'s barrel. Ignored unless the match is in play.
    pub fn fire(&mut self, side: Side) -> Option<u32> {
        if !self.state.is_playing() {
            log::debug!("Ignoring {} fire, match not in play", side);
            return None;
        }

        let id = self.next_projectile_id;
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);

        let tank = self.tank(side);
        let projectile = Projectile::new(id, side, tank.muzzle(), tank.direction);
        self.projectiles.push(projectile);

        Some(id)
    }

    /// Advances the match one fixed step.
    ///
    /// `local` is the host's held keys; every queued peer snapshot is applied
    /// in arrival order before anything moves. When several projectiles hit
    /// in the same tick all of them are reported, and the one with the
    /// lowest id decides the winner.
    pub fn tick(&mut self, local: &InputSnapshot, remote: &mut InputQueue) -> TickReport {
        let mut report = TickReport {
            tick: self.tick,
            ..Default::default()
        };

        if !self.state.is_playing() {
            let discarded = remote.drain().count();
            if discarded > 0 {
                log::debug!("Discarded {} peer inputs, match not in play", discarded);
            }
            return report;
        }

        let host_controls = self.config.host_bindings.controls(local);
        self.host.apply_controls(host_controls, self.config.host_speed);

        for snapshot in remote.drain() {
            let controls = self.config.peer_bindings.controls(&snapshot);
            self.peer.apply_controls(controls, self.config.peer_speed);
            report.inputs_applied += 1;
        }

        self.host.step(&self.peer, &self.map);
        self.peer.step(&self.host, &self.map);

        let step = self.config.projectile_speed;
        for projectile in &mut self.projectiles {
            projectile.advance(step);

            let bounds = projectile.bounds();
            if self.map.is_colliding_with_wall(bounds) {
                projectile.active = false;
                continue;
            }

            let target = match projectile.target() {
                Side::Host => &self.host,
                Side::Peer => &self.peer,
            };
            if bounds.intersects(&target.bounds()) {
                projectile.active = false;
                report.hits.push(Hit {
                    projectile_id: projectile.id,
                    shooter: projectile.owner,
                });
            }
        }

        self.projectiles.retain(|p| p.active);

        if let Some(first) = report.hits.first() {
            let winner = first.shooter;
            self.state = MatchState::Over { winner };
            report.winner = Some(winner);
            log::info!(
                "Tick {}: {} tank hit by projectile {}, {} wins",
                self.tick,
                first.victim(),
                first.projectile_id,
                winner
            );
        }

        self.tick = self.tick.wrapping_add(1);
        report
    }

    /// Starts a fresh match: new spawn positions, no projectiles, no winner.
    pub fn reset(&mut self) -> Result<(), SpawnError> {
        if self.state == MatchState::Terminated {
            log::warn!("Ignoring reset of a terminated match");
            return Ok(());
        }

        let (host, peer) = spawn_pair(
            &self.map,
            &mut self.rng,
            self.config.spawn_area,
            TANK_SIZE,
            self.config.max_spawn_attempts,
        )?;

        self.host = Tank::new(Side::Host, host);
        self.peer = Tank::new(Side::Peer, peer);
        self.projectiles.clear();
        self.state = MatchState::Playing;
        log::info!("Match reset at tick {}", self.tick);
        Ok(())
    }

    /// Declines a rematch. Only valid once the match is over.
    pub fn decline(&mut self) -> bool {
        if let MatchState::Over { .. } = self.state {
            self.state = MatchState::Terminated;
            true
        } else {
            false
        }
    }

    pub fn snapshot(&self) -> GameState {
        GameState {
            host: self.host.state(),
            peer: self.peer.state(),
            projectiles: self.projectiles.iter().map(Projectile::state).collect(),
            winner: self.state.winner(),
        }
    }
}
