use std::fmt;

use glam::IVec2;
use rkyv::{Archive, Deserialize, Serialize};

use crate::input::Controls;
use crate::map::{Rect, WallMap};
use crate::net::TankState;

pub const TANK_SIZE: IVec2 = IVec2::new(45, 35);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    pub fn unit(self) -> IVec2 {
        match self {
            Direction::Left => IVec2::NEG_X,
            Direction::Up => IVec2::NEG_Y,
            Direction::Right => IVec2::X,
            Direction::Down => IVec2::Y,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Which tank a value belongs to: the host-controlled one or the peer-controlled one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum Side {
    Host,
    Peer,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Host => Side::Peer,
            Side::Peer => Side::Host,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Host => f.write_str("host"),
            Side::Peer => f.write_str("peer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tank {
    pub side: Side,
    pub position: IVec2,
    pub velocity: IVec2,
    pub direction: Direction,
    pub size: IVec2,
}

impl Tank {
    pub fn new(side: Side, position: IVec2) -> Self {
        Self {
            side,
            position,
            velocity: IVec2::ZERO,
            direction: Direction::Up,
            size: TANK_SIZE,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_position(self.position, self.size)
    }

    /// Rebuilds velocity from held controls. Keys are checked left, right,
    /// up, down; a later key on the same axis overrides an earlier one, and
    /// the last matching key sets the facing.
    pub fn apply_controls(&mut self, controls: Controls, speed: i32) {
        self.velocity = IVec2::ZERO;

        if controls.contains(Controls::LEFT) {
            self.direction = Direction::Left;
            self.velocity.x = -speed;
        }
        if controls.contains(Controls::RIGHT) {
            self.direction = Direction::Right;
            self.velocity.x = speed;
        }
        if controls.contains(Controls::UP) {
            self.direction = Direction::Up;
            self.velocity.y = -speed;
        }
        if controls.contains(Controls::DOWN) {
            self.direction = Direction::Down;
            self.velocity.y = speed;
        }
    }

    /// Integrates one step of velocity. If the new box hits a wall or the
    /// other tank, the move is undone and velocity zeroed. Returns whether
    /// the move was blocked.
    pub fn step<M: WallMap + ?Sized>(&mut self, other: &Tank, map: &M) -> bool {
        let previous = self.position;
        self.position += self.velocity;

        let bounds = self.bounds();
        if map.is_colliding_with_wall(bounds) || bounds.intersects(&other.bounds()) {
            self.position = previous;
            self.velocity = IVec2::ZERO;
            return true;
        }
        false
    }

    /// Where a shot leaves the barrel for the current facing.
    pub fn muzzle(&self) -> IVec2 {
        let (w, h) = (self.size.x, self.size.y);
        if self.direction.is_horizontal() {
            self.position + IVec2::new(w / 2, h / 2 - 2)
        } else {
            self.position + IVec2::new(h / 2 - 2, w / 2)
        }
    }

    pub fn state(&self) -> TankState {
        TankState {
            position: self.position.to_array(),
            direction: self.direction,
        }
    }

    pub fn set_state(&mut self, state: &TankState) {
        self.position = IVec2::from_array(state.position);
        self.direction = state.direction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TileMap;

    struct NoWalls;

    impl WallMap for NoWalls {
        fn is_colliding_with_wall(&self, _rect: Rect) -> bool {
            false
        }
    }

    #[test]
    fn test_opposite_keys_resolve_in_check_order() {
        let mut tank = Tank::new(Side::Host, IVec2::new(100, 100));

        tank.apply_controls(Controls::LEFT | Controls::RIGHT, 6);
        assert_eq!(tank.velocity, IVec2::new(6, 0));
        assert_eq!(tank.direction, Direction::Right);

        tank.apply_controls(Controls::UP | Controls::DOWN, 6);
        assert_eq!(tank.velocity, IVec2::new(0, 6));
        assert_eq!(tank.direction, Direction::Down);

        tank.apply_controls(Controls::LEFT | Controls::UP, 4);
        assert_eq!(tank.velocity, IVec2::new(-4, -4));
        assert_eq!(tank.direction, Direction::Up);

        tank.apply_controls(Controls::empty(), 4);
        assert_eq!(tank.velocity, IVec2::ZERO);
        assert_eq!(tank.direction, Direction::Up);
    }

    #[test]
    fn test_step_reverts_into_wall() {
        let map = TileMap::battlefield();
        let other = Tank::new(Side::Peer, IVec2::new(600, 800));
        let mut tank = Tank::new(Side::Host, IVec2::new(32, 100));
        tank.apply_controls(Controls::LEFT, 6);

        assert!(tank.step(&other, &map));
        assert_eq!(tank.position, IVec2::new(32, 100));
        assert_eq!(tank.velocity, IVec2::ZERO);
    }

    #[test]
    fn test_step_reverts_into_other_tank() {
        let other = Tank::new(Side::Peer, IVec2::new(150, 100));
        let mut tank = Tank::new(Side::Host, IVec2::new(100, 100));
        tank.apply_controls(Controls::RIGHT, 6);

        assert!(tank.step(&other, &NoWalls));
        assert_eq!(tank.position, IVec2::new(100, 100));

        tank.apply_controls(Controls::LEFT, 6);
        assert!(!tank.step(&other, &NoWalls));
        assert_eq!(tank.position, IVec2::new(94, 100));
    }

    #[test]
    fn test_muzzle_follows_facing() {
        let mut tank = Tank::new(Side::Peer, IVec2::new(100, 200));
        tank.direction = Direction::Right;
        assert_eq!(tank.muzzle(), IVec2::new(122, 215));

        tank.direction = Direction::Down;
        assert_eq!(tank.muzzle(), IVec2::new(115, 222));
    }
}
