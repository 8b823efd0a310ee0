mod geometry;
mod tiles;

pub use geometry::Rect;
pub use tiles::{TILE_SIZE, TileMap};

/// Collision query the simulation runs against map geometry.
pub trait WallMap {
    fn is_colliding_with_wall(&self, rect: Rect) -> bool;
}

impl<M: WallMap + ?Sized> WallMap for &M {
    fn is_colliding_with_wall(&self, rect: Rect) -> bool {
        (**self).is_colliding_with_wall(rect)
    }
}

impl<M: WallMap + ?Sized> WallMap for Box<M> {
    fn is_colliding_with_wall(&self, rect: Rect) -> bool {
        (**self).is_colliding_with_wall(rect)
    }
}
