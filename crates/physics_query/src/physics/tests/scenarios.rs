//! Ray and sweep queries against a unit box at the origin

use super::support::{down, ready_queries, unit_box_world, FaultyWorld};
use crate::config::{QueryConfig, WorldConfig};
use crate::foundation::math::Vec3;
use crate::physics::backend::{BackendError, PhysicsBackend, SharedShape};
use crate::physics::scratch::ScratchHandles;
use crate::physics::{PhysicsQueries, QueryError, QueryStats, SweepHit};
use approx::assert_relative_eq;

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Vec3 {
        Vec3::new(1.0, 1.0, 1.0)
    }

    fn above() -> Vec3 {
        Vec3::new(0.0, 0.0, 5.0)
    }

    #[test]
    fn test_ray_reaches_box() {
        let (mut queries, _, probe) = ready_queries();
        assert!(queries.ray_test(probe, down(), 10.0).unwrap());
    }

    #[test]
    fn test_short_ray_misses_box() {
        let (mut queries, _, probe) = ready_queries();
        assert!(!queries.ray_test(probe, down(), 2.0).unwrap());
    }

    #[test]
    fn test_ray_cast_reports_fraction_and_body() {
        let (mut queries, block, probe) = ready_queries();
        let hit = queries.ray_cast(probe, down(), 10.0).unwrap();

        assert_eq!(hit.body, Some(block));
        assert_relative_eq!(hit.hit_fraction, 0.4, epsilon = 1e-4);

        let miss = queries.ray_cast(probe, down(), 2.0).unwrap();
        assert!(!miss.has_hit());
        assert_eq!(miss.hit_fraction, 1.0);
    }

    #[test]
    fn test_ray_ignores_casting_body_collider() {
        let (mut world, block, _) = unit_box_world(&WorldConfig::default());
        let player = world.add_body(above(), Some(SharedShape::ball(0.5)));
        let mut queries = PhysicsQueries::new(QueryConfig::default());
        queries.initialize(world).unwrap();

        let hit = queries.ray_cast(player, down(), 10.0).unwrap();
        assert_eq!(hit.body, Some(block));
    }

    #[test]
    fn test_ray_follows_moving_body() {
        let (mut queries, _, probe) = ready_queries();
        queries
            .world_mut()
            .unwrap()
            .set_body_position(probe, Vec3::new(5.0, 0.0, 5.0))
            .unwrap();

        assert!(!queries.ray_test(probe, down(), 10.0).unwrap());
    }

    #[test]
    fn test_box_sweep_hits_box() {
        let (mut queries, _, _) = ready_queries();
        let hit = queries.box_sweep_test(above(), unit(), down(), 10.0).unwrap();

        assert!(hit.has_hit);
        assert!(hit.hit_fraction < 1.0);
        assert_relative_eq!(hit.hit_fraction, 0.35, epsilon = 1e-3);
    }

    #[test]
    fn test_box_sweep_away_from_box_misses() {
        let (mut queries, _, _) = ready_queries();
        let hit = queries
            .box_sweep_test(above(), unit(), Vec3::new(0.0, 0.0, 1.0), 10.0)
            .unwrap();

        assert_eq!(hit, SweepHit::miss());
    }

    #[test]
    fn test_allowed_penetration_follows_direction_of_motion() {
        let (world, _, _) = unit_box_world(&WorldConfig::default());
        let config = QueryConfig {
            allowed_penetration: 0.2,
            ..QueryConfig::default()
        };
        let mut queries = PhysicsQueries::new(config);
        queries.initialize(world).unwrap();
        let grazing = Vec3::new(0.0, 0.0, 1.45);

        let deeper = queries.box_sweep_test(grazing, unit(), down(), 3.0).unwrap();
        assert!(deeper.has_hit);
        assert_relative_eq!(deeper.hit_fraction, 0.0, epsilon = 1e-4);

        let away = queries
            .box_sweep_test(grazing, unit(), Vec3::new(0.0, 0.0, 1.0), 3.0)
            .unwrap();
        assert_eq!(away, SweepHit::miss());
    }

    #[test]
    fn test_hit_fraction_stays_in_unit_range() {
        let (mut queries, _, _) = ready_queries();
        let directions = [
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(0.2, -0.1, -1.0),
            Vec3::new(1.0, 0.0, 0.0),
        ];

        for direction in directions {
            let direction = direction.normalize();
            for distance in [0.5, 3.0, 3.5, 10.0, 100.0] {
                let hit = queries.box_sweep_test(above(), unit(), direction, distance).unwrap();
                assert!((0.0..=1.0).contains(&hit.hit_fraction), "{hit:?}");
                if !hit.has_hit {
                    assert_eq!(hit.hit_fraction, 1.0);
                }
            }
        }
    }

    #[test]
    fn test_rays_do_not_allocate() {
        let (mut queries, _, probe) = ready_queries();
        let before = queries.world().unwrap().native_stats();

        for i in 0..100 {
            let distance = if i % 2 == 0 { 10.0 } else { 2.0 };
            queries.ray_test(probe, down(), distance).unwrap();
        }

        assert_eq!(queries.world().unwrap().native_stats(), before);
    }

    #[test]
    fn test_each_sweep_allocates_and_releases_one_shape() {
        let (mut queries, _, _) = ready_queries();
        let before = queries.world().unwrap().native_stats();
        let sweeps = 25_u64;

        for _ in 0..sweeps {
            queries.box_sweep_test(above(), unit(), down(), 10.0).unwrap();
        }

        let after = queries.world().unwrap().native_stats();
        assert_eq!(after.allocated, before.allocated + sweeps);
        assert_eq!(after.released, before.released + sweeps);
        assert_eq!(after.live(), ScratchHandles::COUNT as u64);
    }

    #[test]
    fn test_failed_sweep_still_releases_shape() {
        let (world, _, _) = unit_box_world(&WorldConfig::default());
        let mut queries = PhysicsQueries::new(QueryConfig::default());
        queries.initialize(FaultyWorld::new(world)).unwrap();
        queries.world_mut().unwrap().fail_sweeps = true;
        let before = queries.world().unwrap().native_stats();

        let result = queries.box_sweep_test(above(), unit(), down(), 10.0);
        assert!(matches!(
            result,
            Err(QueryError::Backend(BackendError::Unsupported(_)))
        ));

        let after = queries.world().unwrap().native_stats();
        assert_eq!(after.allocated, before.allocated + 1);
        assert_eq!(after.released, before.released + 1);

        queries.world_mut().unwrap().fail_sweeps = false;
        assert!(queries.box_sweep_test(above(), unit(), down(), 10.0).unwrap().has_hit);
    }

    #[test]
    fn test_shape_exhaustion_reports_resource_error() {
        let capacity = ScratchHandles::COUNT;
        let (world, _, probe) = unit_box_world(&WorldConfig { native_handle_capacity: capacity });
        let mut queries = PhysicsQueries::new(QueryConfig::default());
        queries.initialize(world).unwrap();

        assert_eq!(
            queries.box_sweep_test(above(), unit(), down(), 10.0),
            Err(QueryError::ResourceExhausted { capacity })
        );

        // Cached handles are intact and still usable
        assert_eq!(queries.world().unwrap().native_stats().live(), capacity as u64);
        assert!(queries.ray_test(probe, down(), 10.0).unwrap());
    }

    #[test]
    fn test_invalid_arguments_rejected() {
        let (mut queries, _, probe) = ready_queries();
        let removed = {
            let world = queries.world_mut().unwrap();
            let ghost = world.add_body(Vec3::zeros(), None);
            world.remove_body(ghost).unwrap();
            ghost
        };

        let cases = [
            queries.ray_test(probe, Vec3::new(0.0, 0.0, -2.0), 10.0),
            queries.ray_test(probe, down(), 0.0),
            queries.ray_test(probe, down(), -1.0),
            queries.ray_test(probe, down(), f32::INFINITY),
            queries.ray_test(removed, down(), 10.0),
        ];
        for case in cases {
            assert!(matches!(case, Err(QueryError::InvalidArgument(_))), "{case:?}");
        }

        let nan = Vec3::new(f32::NAN, 0.0, 0.0);
        let sweeps = [
            queries.box_sweep_test(nan, unit(), down(), 10.0),
            queries.box_sweep_test(above(), Vec3::new(-1.0, 1.0, 1.0), down(), 10.0),
            queries.box_sweep_test(above(), unit(), Vec3::zeros(), 10.0),
            queries.box_sweep_test(above(), unit(), down(), 0.0),
        ];
        for case in sweeps {
            assert!(matches!(case, Err(QueryError::InvalidArgument(_))), "{case:?}");
        }

        assert_eq!(queries.stats(), QueryStats::default());
    }

    #[test]
    fn test_validation_can_be_disabled() {
        let (world, _, probe) = unit_box_world(&WorldConfig::default());
        let config = QueryConfig {
            validate_arguments: false,
            ..QueryConfig::default()
        };
        let mut queries = PhysicsQueries::new(config);
        queries.initialize(world).unwrap();

        // Unnormalized direction scales the ray: 2 * 2.5 reaches z = 0
        assert!(queries.ray_test(probe, Vec3::new(0.0, 0.0, -2.0), 2.5).unwrap());
    }

    #[test]
    fn test_stats_count_queries_and_hits() {
        let (mut queries, _, probe) = ready_queries();

        queries.ray_test(probe, down(), 10.0).unwrap();
        queries.ray_test(probe, down(), 2.0).unwrap();
        queries.box_sweep_test(above(), unit(), down(), 10.0).unwrap();

        assert_eq!(
            queries.stats(),
            QueryStats {
                ray_tests: 2,
                ray_hits: 1,
                sweep_tests: 1,
                sweep_hits: 1,
            }
        );
    }
}
