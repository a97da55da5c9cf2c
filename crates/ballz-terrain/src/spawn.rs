//! Spawn point selection.

use glam::Vec2;
use rand::Rng;

use ballz_core::constants::SPAWN_SELECT_TRIES;

/// Pick `count` spawn positions from `points`.
///
/// Each pick makes a bounded number of random draws looking for a point not
/// handed out yet, then settles for whatever the last draw gave. Returns an
/// empty list when the map declares no spawn points.
pub fn select_spawn_points<R: Rng + ?Sized>(points: &[Vec2], count: usize, rng: &mut R) -> Vec<Vec2> {
    if points.is_empty() {
        return Vec::new();
    }
    let mut used = vec![false; points.len()];
    let mut picked = Vec::with_capacity(count);
    for _ in 0..count {
        let mut idx = rng.gen_range(0..points.len());
        for _ in 1..SPAWN_SELECT_TRIES {
            if !used[idx] {
                break;
            }
            idx = rng.gen_range(0..points.len());
        }
        used[idx] = true;
        picked.push(points[idx]);
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn points() -> Vec<Vec2> {
        (0..4).map(|i| Vec2::new(i as f32, 0.0)).collect()
    }

    #[test]
    fn test_same_seed_same_picks() {
        let a = select_spawn_points(&points(), 3, &mut ChaCha8Rng::seed_from_u64(7));
        let b = select_spawn_points(&points(), 3, &mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_picks_distinct_when_possible() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let picks = select_spawn_points(&points(), 2, &mut rng);
        assert_eq!(picks.len(), 2);
        assert_ne!(picks[0], picks[1]);
    }

    #[test]
    fn test_more_picks_than_points() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let picks = select_spawn_points(&points()[..1], 3, &mut rng);
        assert_eq!(picks, vec![Vec2::ZERO; 3]);
    }

    #[test]
    fn test_no_points() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(select_spawn_points(&[], 2, &mut rng).is_empty());
    }
}
