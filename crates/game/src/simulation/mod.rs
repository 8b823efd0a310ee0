mod config;
mod engine;
mod entity;
mod projectile;
mod spawn;

pub use config::SimulationConfig;
pub use engine::{Hit, MatchState, Simulation, TickReport};
pub use entity::{Direction, Side, TANK_SIZE, Tank};
pub use projectile::{PROJECTILE_SIZE, Projectile};
pub use spawn::{SpawnError, find_spawn, spawn_pair};
