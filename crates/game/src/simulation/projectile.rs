use glam::IVec2;

use crate::map::Rect;
use crate::net::ProjectileState;

use super::entity::{Direction, Side};

pub const PROJECTILE_SIZE: IVec2 = IVec2::new(6, 6);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projectile {
    pub id: u32,
    pub owner: Side,
    pub position: IVec2,
    pub direction: Direction,
    pub active: bool,
}

impl Projectile {
    pub fn new(id: u32, owner: Side, position: IVec2, direction: Direction) -> Self {
        Self {
            id,
            owner,
            position,
            direction,
            active: true,
        }
    }

    pub fn advance(&mut self, step: i32) {
        self.position += self.direction.unit() * step;
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_position(self.position, PROJECTILE_SIZE)
    }

    /// The tank this projectile is allowed to hit.
    pub fn target(&self) -> Side {
        self.owner.opponent()
    }

    pub fn state(&self) -> ProjectileState {
        ProjectileState {
            id: self.id,
            owner: self.owner,
            position: self.position.to_array(),
            direction: self.direction,
        }
    }
}
