use std::time::Duration;

use crate::input::{DEFAULT_INPUT_QUEUE_CAPACITY, KeyBindings};
use crate::map::Rect;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub tick_interval: Duration,
    pub network_interval: Duration,
    pub stale_snapshot_after: Duration,
    pub host_speed: i32,
    pub peer_speed: i32,
    pub projectile_speed: i32,
    pub host_bindings: KeyBindings,
    pub peer_bindings: KeyBindings,
    pub spawn_area: Rect,
    pub max_spawn_attempts: u32,
    pub input_queue_capacity: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(16),
            network_interval: Duration::from_millis(50),
            stale_snapshot_after: Duration::from_millis(500),
            host_speed: 6,
            peer_speed: 4,
            projectile_speed: 10,
            host_bindings: KeyBindings::HOST,
            peer_bindings: KeyBindings::PEER,
            spawn_area: Rect::new(120, 60, 900, 750),
            max_spawn_attempts: 10_000,
            input_queue_capacity: DEFAULT_INPUT_QUEUE_CAPACITY,
        }
    }
}
