#[cfg(test)]
mod tests {
    use glam::Vec2;

    use crate::commands::GameCommand;
    use crate::components::{Ball, Shot, ShotTarget};
    use crate::config::{ConfigError, SimConfig};
    use crate::enums::*;
    use crate::events::{ImpactEvent, ImpactOutcome};
    use crate::state::{EntityState, KindState, WorldSnapshot};
    use crate::types::{EntityId, PlayerId, SimTime};

    fn ball_state(id: u32, x: f32) -> EntityState {
        EntityState {
            id: EntityId(id),
            position: Vec2::new(x, 0.0),
            rotation: 0.0,
            velocity: Vec2::ZERO,
            radius: 0.5,
            is_static: false,
            data: KindState::Ball(Ball {
                health: 100.0,
                max_health: 100.0,
                aim_direction: Vec2::X,
                shoot_charge: 0.0,
                player: PlayerId(1),
            }),
        }
    }

    #[test]
    fn test_session_state_toggle() {
        assert_eq!(SessionState::Running.toggled(), SessionState::Paused);
        assert_eq!(SessionState::Paused.toggled(), SessionState::Running);
    }

    #[test]
    fn test_sim_time_advance() {
        let mut t = SimTime::default();
        t.advance(0.5);
        t.advance(0.5);
        assert_eq!(t.tick, 2);
        assert!((t.elapsed_secs - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_entity_state_lerp_keeps_identity() {
        let pre = ball_state(3, 0.0);
        let mut post = ball_state(3, 10.0);
        post.rotation = 1.0;
        post.velocity = Vec2::new(4.0, -2.0);

        let mid = pre.lerp(&post, 0.25);
        assert_eq!(mid.id, EntityId(3));
        assert!((mid.position.x - 2.5).abs() < 1e-6);
        assert!((mid.rotation - 0.25).abs() < 1e-6);
        assert!((mid.velocity - Vec2::new(1.0, -0.5)).length() < 1e-6);
        assert_eq!(mid.kind(), EntityKind::Ball);
    }

    #[test]
    fn test_snapshot_entity_lookup() {
        let snap = WorldSnapshot {
            time_secs: 0.0,
            terrain_revision: 0,
            entities: vec![ball_state(1, 0.0), ball_state(4, 1.0), ball_state(9, 2.0)],
        };
        assert_eq!(snap.entity(EntityId(4)).map(|e| e.position.x), Some(1.0));
        assert!(snap.entity(EntityId(5)).is_none());
    }

    #[test]
    fn test_snapshot_serde_keeps_kind_data() {
        let shot = EntityState {
            data: KindState::Shot(Shot {
                explosion_radius: 1.0,
                health_impact_at_direct_hit: 25.0,
                is_instant_shot: true,
                target: Some(ShotTarget {
                    entity: None,
                    position: Vec2::new(3.0, 3.0),
                }),
                shooter: Some(EntityId(1)),
            }),
            ..ball_state(2, 0.0)
        };
        let snap = WorldSnapshot {
            time_secs: 0.016,
            terrain_revision: 7,
            entities: vec![shot],
        };
        let json = serde_json::to_string(&snap).unwrap();
        let back: WorldSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn test_command_json_is_tagged() {
        let json = serde_json::to_string(&GameCommand::Fire {
            ball: EntityId(1),
            instant: false,
        })
        .unwrap();
        assert!(json.contains("\"type\":\"Fire\""), "got {json}");

        let back: GameCommand = serde_json::from_str(r#"{"type":"GameMessage"}"#).unwrap();
        assert!(matches!(back, GameCommand::GameMessage));
    }

    #[test]
    fn test_impact_event_serde() {
        let ev = ImpactEvent {
            shot: EntityId(11),
            trigger: ImpactTrigger::Raycast,
            outcome: ImpactOutcome::DirectHit {
                ball: EntityId(2),
                damage: 25.0,
                health_after: 5.0,
            },
        };
        let json = serde_json::to_string(&ev).unwrap();
        let back: ImpactEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ev);
    }

    #[test]
    fn test_config_partial_json_uses_defaults() {
        let config = SimConfig::from_json_str(r#"{ "seed": 7, "max_crater_radius": 3.0 }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.max_crater_radius, Some(3.0));
        assert_eq!(config.snapshot_capacity, SimConfig::default().snapshot_capacity);
        assert_eq!(config.ball, SimConfig::default().ball);
    }

    #[test]
    fn test_config_rejects_zero_capacity() {
        let err = SimConfig::from_json_str(r#"{ "snapshot_capacity": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "snapshot_capacity",
                ..
            }
        ));
    }

    #[test]
    fn test_config_rejects_bad_json() {
        let err = SimConfig::from_json_str("{ seed: }").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_config_load_missing_file() {
        let err = SimConfig::load(std::path::Path::new("/nonexistent/ballz.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
