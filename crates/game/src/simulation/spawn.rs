use glam::IVec2;
use rand::Rng;

use crate::map::{Rect, WallMap};

#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    #[error("no free spawn position after {attempts} attempts")]
    NoFreeSpace { attempts: u32 },
}

/// Rejection-samples a top-left position inside `area` whose box of `size`
/// is clear of walls and of `avoid`.
pub fn find_spawn<M, R>(
    map: &M,
    rng: &mut R,
    area: Rect,
    size: IVec2,
    avoid: Option<Rect>,
    max_attempts: u32,
) -> Result<IVec2, SpawnError>
where
    M: WallMap + ?Sized,
    R: Rng,
{
    for _ in 0..max_attempts {
        let x = area.x + rng.gen_range(0..area.width.max(1));
        let y = area.y + rng.gen_range(0..area.height.max(1));
        let candidate = Rect::from_position(IVec2::new(x, y), size);

        if map.is_colliding_with_wall(candidate) {
            continue;
        }
        if avoid.is_some_and(|other| candidate.intersects(&other)) {
            continue;
        }
        return Ok(candidate.position());
    }

    Err(SpawnError::NoFreeSpace {
        attempts: max_attempts,
    })
}

/// Places two boxes of `size` that clear the walls and each other.
pub fn spawn_pair<M, R>(
    map: &M,
    rng: &mut R,
    area: Rect,
    size: IVec2,
    max_attempts: u32,
) -> Result<(IVec2, IVec2), SpawnError>
where
    M: WallMap + ?Sized,
    R: Rng,
{
    let first = find_spawn(map, rng, area, size, None, max_attempts)?;
    let second = find_spawn(
        map,
        rng,
        area,
        size,
        Some(Rect::from_position(first, size)),
        max_attempts,
    )?;
    Ok((first, second))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::map::TileMap;
    use crate::simulation::TANK_SIZE;

    struct AllWalls;

    impl WallMap for AllWalls {
        fn is_colliding_with_wall(&self, _rect: Rect) -> bool {
            true
        }
    }

    #[test]
    fn test_spawn_lands_on_open_floor() {
        let map = TileMap::battlefield();
        let mut rng = StdRng::seed_from_u64(7);
        let area = Rect::new(120, 60, 900, 750);

        for _ in 0..200 {
            let (a, b) = spawn_pair(&map, &mut rng, area, TANK_SIZE, 10_000).unwrap();
            let a_box = Rect::from_position(a, TANK_SIZE);
            let b_box = Rect::from_position(b, TANK_SIZE);

            assert!(!map.is_colliding_with_wall(a_box));
            assert!(!map.is_colliding_with_wall(b_box));
            assert!(!a_box.intersects(&b_box));
            assert!(a.x >= 120 && a.x < 1020 && a.y >= 60 && a.y < 810);
        }
    }

    #[test]
    fn test_all_walls_gives_up() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = find_spawn(
            &AllWalls,
            &mut rng,
            Rect::new(120, 60, 900, 750),
            TANK_SIZE,
            None,
            500,
        );

        assert!(matches!(
            result,
            Err(SpawnError::NoFreeSpace { attempts: 500 })
        ));
    }
}
