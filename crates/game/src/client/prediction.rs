use crate::input::{InputSnapshot, KeyBindings};
use crate::map::WallMap;
use crate::simulation::Tank;

/// Advances the client's own tank straight from held keys.
///
/// The result is never reconciled against the host's copy.
#[derive(Debug, Clone, Copy)]
pub struct LocalPredictor {
    bindings: KeyBindings,
    speed: i32,
}

impl LocalPredictor {
    pub fn new(bindings: KeyBindings, speed: i32) -> Self {
        Self { bindings, speed }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Returns whether the move was blocked by a wall or the opponent.
    pub fn advance<M: WallMap + ?Sized>(
        &self,
        tank: &mut Tank,
        held: &InputSnapshot,
        map: &M,
        opponent: &Tank,
    ) -> bool {
        tank.apply_controls(self.bindings.controls(held), self.speed);
        tank.step(opponent, map)
    }
}
