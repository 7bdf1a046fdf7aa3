use cyber_strike::compute::new_session;
use cyber_strike::entities::*;
use cyber_strike::levels::*;

#[test]
fn bounds_overlap_is_strict() {
    let a = Bounds { x: 0.0, y: 0.0, size: 10.0 };
    let touching = Bounds { x: 10.0, y: 0.0, size: 10.0 };
    let overlapping = Bounds { x: 9.5, y: 9.5, size: 10.0 };
    let far = Bounds { x: 50.0, y: 50.0, size: 10.0 };

    assert!(!a.intersects(&touching));
    assert!(a.intersects(&overlapping));
    assert!(overlapping.intersects(&a));
    assert!(!a.intersects(&far));
}

#[test]
fn heading_reverses_and_signs() {
    assert_eq!(Heading::Left.reversed(), Heading::Right);
    assert_eq!(Heading::Right.reversed(), Heading::Left);
    assert_eq!(Heading::Left.sign(), -1.0);
    assert_eq!(Heading::Right.sign(), 1.0);
}

#[test]
fn player_spawns_bottom_centre() {
    let p = Player::at_spawn();
    assert_eq!(p.x, 290.0);
    assert_eq!(p.y, 370.0);
    assert!(p.alive);
    assert!(!p.power_up);
}

#[test]
fn boss_bounds_follow_centre_and_size() {
    let mut boss = Boss::dormant(30);
    assert_eq!(boss.x(), 260.0);
    assert_eq!(boss.y(), 30.0);

    boss.size = 40.0;
    let b = boss.bounds();
    assert_eq!((b.x, b.y, b.size), (280.0, 50.0, 40.0));
    assert_eq!(b.center(), (300.0, 70.0));
}

#[test]
fn boss_health_fraction_is_clamped() {
    let mut boss = Boss::dormant(50);
    boss.health = 25;
    assert_eq!(boss.health_fraction(), 0.5);
    boss.health = -3;
    assert_eq!(boss.health_fraction(), 0.0);
}

#[test]
fn session_clone_is_independent() {
    let original = new_session(1);
    let mut cloned = original.clone();

    cloned.player.x = 99.0;
    cloned.score = 999;
    cloned.enemies.push(Enemy {
        x: 5.0,
        y: 5.0,
        size: ENEMY_SIZE,
        speed: 2.0,
        zigzag: 1.0,
        heading: Heading::Left,
    });

    assert_eq!(original.player.x, 290.0);
    assert_eq!(original.score, 0);
    assert!(original.enemies.is_empty());
}

// ── Level table ───────────────────────────────────────────────────────────────

#[test]
fn levels_get_strictly_harder() {
    for level in 1..MAX_LEVEL {
        let a = level_config(level);
        let b = level_config(level + 1);
        assert!(b.boss_time_secs < a.boss_time_secs);
        assert!(b.boss_health > a.boss_health);
        assert!(b.enemy_speed > a.enemy_speed);
        assert!(b.spawn_interval_frames < a.spawn_interval_frames);
        assert!(b.max_enemies > a.max_enemies);
        assert!(b.minion_interval_frames < a.minion_interval_frames);
    }
}

#[test]
fn level_one_matches_tuning() {
    let cfg = level_config(1);
    assert_eq!(cfg.boss_time_secs, 30);
    assert_eq!(cfg.boss_health, 30);
    assert_eq!(cfg.spawn_interval_frames, 42);
    assert_eq!(cfg.max_enemies, 6);
    assert_eq!(cfg.minion_interval_frames, 100);
}

#[test]
fn out_of_range_level_falls_back() {
    assert_eq!(level_config(0), level_config(1));
    assert_eq!(level_config(9), level_config(1));
    assert_eq!(clamp_level(0), 1);
    assert_eq!(clamp_level(7), MAX_LEVEL);
    assert_eq!(level_intro(42).title, level_intro(5).title);
}
