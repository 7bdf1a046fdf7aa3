use std::time::Duration;

use cyber_strike::compute::physics::{self, FIRE_COOLDOWN, MAX_BULLETS};
use cyber_strike::compute::spawn;
use cyber_strike::compute::*;
use cyber_strike::entities::*;
use cyber_strike::levels::level_config;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_state() -> GameSession {
    new_session(1)
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn frame_at(now_ms: u64) -> FrameTime {
    FrameTime { now: ms(now_ms), dt: ms(16) }
}

fn idle() -> HeldInput {
    HeldInput::default()
}

fn enemy_at(x: f32, y: f32) -> Enemy {
    Enemy { x, y, size: ENEMY_SIZE, speed: 2.0, zigzag: 1.0, heading: Heading::Right }
}

fn count_shots(events: &[GameEvent]) -> usize {
    events
        .iter()
        .filter(|e| {
            matches!(
                e,
                GameEvent::Sound(cyber_strike::audio::SoundEffect::Shoot)
                    | GameEvent::Sound(cyber_strike::audio::SoundEffect::ShootTriple)
            )
        })
        .count()
}

// ── new_session ───────────────────────────────────────────────────────────────

#[test]
fn new_session_defaults() {
    let s = new_session(3);
    assert_eq!(s.level, 3);
    assert_eq!(s.lives, 3);
    assert_eq!(s.score, 0);
    assert_eq!(s.frame, 0);
    assert_eq!(s.status, GameStatus::Playing);
    assert_eq!(s.boss.phase, BossPhase::Dormant);
    assert_eq!(s.boss.max_health, 70);
    assert!(s.enemies.is_empty() && s.bullets.is_empty() && s.timers.is_empty());
}

#[test]
fn new_session_clamps_level() {
    assert_eq!(new_session(0).level, 1);
    assert_eq!(new_session(12).level, 5);
}

// ── movement ──────────────────────────────────────────────────────────────────

#[test]
fn move_left_normal() {
    let mut s = make_state(); // x=290
    physics::apply_movement(&mut s, &HeldInput { left: true, ..idle() });
    assert_eq!(s.player.x, 285.0);
}

#[test]
fn move_clamps_at_edges() {
    let mut s = make_state();
    s.player.x = 2.0;
    s.player.y = 378.0;
    physics::apply_movement(&mut s, &HeldInput { left: true, down: true, ..idle() });
    assert_eq!(s.player.x, 0.0);
    assert_eq!(s.player.y, CANVAS_H - PLAYER_SIZE);

    s.player.x = 578.0;
    s.player.y = 3.0;
    physics::apply_movement(&mut s, &HeldInput { right: true, up: true, ..idle() });
    assert_eq!(s.player.x, CANVAS_W - PLAYER_SIZE);
    assert_eq!(s.player.y, 0.0);
}

#[test]
fn dead_player_does_not_move() {
    let mut s = make_state();
    s.player.alive = false;
    physics::apply_movement(&mut s, &HeldInput { left: true, ..idle() });
    assert_eq!(s.player.x, 290.0);
}

#[test]
fn tick_does_not_mutate_original() {
    let s = make_state();
    let _ = tick(&s, &HeldInput { left: true, fire: true, ..idle() }, frame_at(0), &mut seeded_rng());
    assert_eq!(s.player.x, 290.0);
    assert!(s.bullets.is_empty());
}

// ── firing ────────────────────────────────────────────────────────────────────

#[test]
fn single_shot_is_centred() {
    let mut s = make_state();
    assert!(physics::try_fire(&mut s, ms(0)));
    assert_eq!(s.bullets.len(), 1);
    assert_eq!(s.bullets[0].x, 290.0 + 10.0 - 2.5);
    assert_eq!(s.bullets[0].y, 370.0);
}

#[test]
fn shield_fires_three_bullets() {
    let mut s = make_state();
    s.player.power_up = true;
    assert!(physics::try_fire(&mut s, ms(0)));
    let xs: Vec<f32> = s.bullets.iter().map(|b| b.x).collect();
    assert_eq!(xs, vec![290.0, 300.0, 310.0]);
}

#[test]
fn fire_rejected_inside_cooldown() {
    let mut s = make_state();
    assert!(physics::try_fire(&mut s, ms(1000)));
    assert!(!physics::try_fire(&mut s, ms(1179)));
    assert!(physics::try_fire(&mut s, ms(1180)));
    assert_eq!(s.bullets.len(), 2);
}

#[test]
fn fire_rejected_at_bullet_cap_or_when_dead() {
    let mut s = make_state();
    s.bullets = vec![Bullet { x: 0.0, y: 200.0, speed: 7.0 }; MAX_BULLETS];
    assert!(!physics::try_fire(&mut s, ms(0)));

    let mut s = make_state();
    s.player.alive = false;
    assert!(!physics::try_fire(&mut s, ms(0)));
}

#[test]
fn held_fire_rate_follows_wall_clock() {
    // 60 FPS frames, fire held for 1800 ms -> floor(1800 / 180) ± 1 shots
    let mut s = make_state();
    let mut rng = seeded_rng();
    let fire = HeldInput { fire: true, ..idle() };
    let mut shots = 0;
    let mut now = 0;
    while now < 1800 {
        s = tick(&s, &fire, FrameTime { now: ms(now), dt: ms(16) }, &mut rng);
        shots += count_shots(&s.events);
        s.events.clear();
        s.enemies.clear();
        now += 16;
    }
    let expected = (1800 / FIRE_COOLDOWN.as_millis()) as usize;
    assert!(shots + 1 >= expected && shots <= expected + 1, "shots = {shots}");
}

#[test]
fn fire_rate_independent_of_frame_rate() {
    let fire = HeldInput { fire: true, ..idle() };
    let mut counts = Vec::new();
    for step in [4u64, 16, 33] {
        let mut s = make_state();
        let mut rng = seeded_rng();
        let mut shots = 0;
        let mut now = 0;
        while now < 1800 {
            s = tick(&s, &fire, FrameTime { now: ms(now), dt: ms(step) }, &mut rng);
            shots += count_shots(&s.events);
            s.events.clear();
            s.enemies.clear();
            now += step;
        }
        counts.push(shots);
    }
    let min = *counts.iter().min().unwrap();
    let max = *counts.iter().max().unwrap();
    assert!(max - min <= 1, "counts = {counts:?}");
}

// ── tick: frame counter & motion ──────────────────────────────────────────────

#[test]
fn tick_increments_frame_and_level_time() {
    let mut s = make_state();
    s.frame = 5;
    let s2 = tick(&s, &idle(), frame_at(0), &mut seeded_rng());
    assert_eq!(s2.frame, 6);
    assert_eq!(s2.level_elapsed, ms(16));
}

#[test]
fn tick_bullet_moves_up_and_leaves_top() {
    let mut s = make_state();
    s.bullets.push(Bullet { x: 100.0, y: 100.0, speed: 7.0 });
    s.bullets.push(Bullet { x: 200.0, y: 7.0, speed: 7.0 });
    let s2 = tick(&s, &idle(), frame_at(0), &mut seeded_rng());
    assert_eq!(s2.bullets.len(), 1);
    assert_eq!(s2.bullets[0].y, 93.0);
}

#[test]
fn enemy_zigzags_and_reflects() {
    let mut s = make_state();
    s.enemies.push(Enemy { heading: Heading::Left, ..enemy_at(1.0, 50.0) });
    physics::advance_entities(&mut s);
    let e = &s.enemies[0];
    assert_eq!(e.y, 52.0);
    assert_eq!(e.x, 0.0);
    assert_eq!(e.heading, Heading::Right);

    physics::advance_entities(&mut s);
    assert_eq!(s.enemies[0].x, 1.0);
}

#[test]
fn enemy_removed_only_once_past_bottom() {
    let mut s = make_state();
    s.enemies.push(enemy_at(100.0, 395.5));
    physics::advance_entities(&mut s); // 397.5
    assert_eq!(s.enemies.len(), 1);
    physics::advance_entities(&mut s); // 399.5
    assert_eq!(s.enemies.len(), 1);
    physics::advance_entities(&mut s); // 401.5
    assert!(s.enemies.is_empty());
}

#[test]
fn pickups_fall_and_leave_bottom() {
    let mut s = make_state();
    s.boosters.push(Pickup { x: 10.0, y: 398.5, size: BOOSTER_SIZE, speed: BOOSTER_SPEED });
    s.life_pickups.push(Pickup { x: 10.0, y: 100.0, size: LIFE_PICKUP_SIZE, speed: LIFE_PICKUP_SPEED });
    physics::advance_entities(&mut s);
    assert!(s.boosters.is_empty());
    assert!((s.life_pickups[0].y - 101.8).abs() < 1e-4);
}

#[test]
fn explosions_grow_and_fade_out() {
    let mut s = make_state();
    s.explosions.push(Explosion { x: 50.0, y: 50.0, radius: 5.0, alpha: 1.0 });
    physics::advance_entities(&mut s);
    assert_eq!(s.explosions[0].radius, 7.0);
    assert!((s.explosions[0].alpha - 0.95).abs() < 1e-6);
    for _ in 0..25 {
        physics::advance_entities(&mut s);
    }
    assert!(s.explosions.is_empty());
}

// ── spawner ───────────────────────────────────────────────────────────────────

#[test]
fn tick_enemy_spawns_on_interval() {
    // Level 1 interval = 42 frames
    let mut s = make_state();
    s.frame = 40;
    let s2 = tick(&s, &idle(), frame_at(0), &mut seeded_rng());
    assert!(s2.enemies.is_empty());

    let s3 = tick(&s2, &idle(), frame_at(16), &mut seeded_rng());
    assert_eq!(s3.enemies.len(), 1);
    assert_eq!(s3.last_enemy_spawn_frame, 42);
    assert_eq!(s3.enemies[0].y, 2.0); // spawned at 0, moved once
}

#[test]
fn spawned_enemy_within_level_ranges() {
    let mut rng = seeded_rng();
    for _ in 0..200 {
        let mut s = make_state();
        s.frame = 100;
        assert!(spawn::spawn_enemy(&mut s, &mut rng));
        let e = &s.enemies[0];
        assert_eq!(e.y, 0.0);
        assert!(e.x >= 0.0 && e.x <= CANVAS_W - ENEMY_SIZE);
        assert!(e.zigzag >= 0.8 && e.zigzag <= 2.3);
        assert_eq!(e.speed, level_config(1).enemy_speed);
    }
}

#[test]
fn enemy_spawn_respects_cap() {
    let mut s = make_state();
    s.frame = 1000;
    s.enemies = vec![enemy_at(10.0, 10.0); level_config(1).max_enemies];
    assert!(!spawn::spawn_enemy(&mut s, &mut seeded_rng()));
}

#[test]
fn booster_chance_is_half_a_percent() {
    let mut rng = seeded_rng();
    let mut s = make_state();
    let mut spawned = 0;
    for _ in 0..100_000 {
        if spawn::spawn_booster(&mut s, &mut rng) {
            spawned += 1;
        }
    }
    assert_eq!(s.boosters.len(), spawned);
    assert!((400..=600).contains(&spawned), "spawned = {spawned}");
}

#[test]
fn life_pickup_is_very_rare_and_gated() {
    let mut rng = seeded_rng();
    let mut s = make_state();
    let spawned = (0..100_000).filter(|_| spawn::spawn_life_pickup(&mut s, &mut rng)).count();
    assert!((40..=130).contains(&spawned), "spawned = {spawned}");

    let mut paused = make_state();
    paused.paused = true;
    let mut dead = make_state();
    dead.player.alive = false;
    for _ in 0..20_000 {
        assert!(!spawn::spawn_life_pickup(&mut paused, &mut rng));
        assert!(!spawn::spawn_life_pickup(&mut dead, &mut rng));
    }
}

#[test]
fn minions_need_active_boss() {
    let mut s = make_state();
    s.frame = 500;
    assert!(!spawn::spawn_minion(&mut s, &mut seeded_rng()));
}

#[test]
fn minion_spawns_under_boss_on_its_interval() {
    let mut s = make_state();
    s.boss.phase = BossPhase::Active;
    s.frame = 99;
    assert!(!spawn::spawn_minion(&mut s, &mut seeded_rng()));

    s.frame = 100;
    assert!(spawn::spawn_minion(&mut s, &mut seeded_rng()));
    let e = &s.enemies[0];
    assert_eq!(e.y, 110.0); // boss.y + boss.size
    assert!(e.x >= 270.0 && e.x < 310.0);
    assert_eq!(s.last_minion_spawn_frame, 100);
}

#[test]
fn minions_may_exceed_cap_by_two() {
    let mut s = make_state();
    s.boss.phase = BossPhase::Active;
    s.frame = 1000;
    s.enemies = vec![enemy_at(10.0, 10.0); level_config(1).max_enemies + 1];
    assert!(spawn::spawn_minion(&mut s, &mut seeded_rng()));

    s.frame = 2000;
    assert!(!spawn::spawn_minion(&mut s, &mut seeded_rng()));
}

// ── pause ─────────────────────────────────────────────────────────────────────

#[test]
fn paused_tick_changes_nothing() {
    let mut s = make_state();
    s.enemies.push(enemy_at(100.0, 100.0));
    let paused = toggle_pause(&s);
    assert!(paused.paused);
    let after = tick(&paused, &HeldInput { fire: true, left: true, ..idle() }, frame_at(0), &mut seeded_rng());
    assert_eq!(after, paused);
    assert!(!toggle_pause(&paused).paused);
}

#[test]
fn pause_ignored_outside_play() {
    let mut s = make_state();
    s.status = GameStatus::GameOver;
    assert!(!toggle_pause(&s).paused);
}

// ── restart & next level ──────────────────────────────────────────────────────

#[test]
fn restart_resets_score_lives_and_bumps_attempt() {
    let mut s = new_session(2);
    s.score = 340;
    s.lives = 1;
    s.status = GameStatus::GameOver;
    let r = restart_level(&s);
    assert_eq!(r.level, 2);
    assert_eq!(r.score, 0);
    assert_eq!(r.lives, 3);
    assert_eq!(r.status, GameStatus::Playing);
    assert_eq!(r.attempt, s.attempt + 1);
}

#[test]
fn next_level_keeps_score_and_lives() {
    let mut s = make_state();
    s.score = 420;
    s.lives = 4;
    s.frame = 2000;
    s.level_elapsed = Duration::from_secs(35);
    s.boss.phase = BossPhase::Defeated;
    s.enemies.push(enemy_at(10.0, 10.0));
    s.status = GameStatus::LevelCleared { next_level: 2 };

    let n = start_next_level(&s);
    assert_eq!(n.level, 2);
    assert_eq!(n.score, 420);
    assert_eq!(n.lives, 4);
    assert_eq!(n.status, GameStatus::Playing);
    assert_eq!(n.boss.phase, BossPhase::Dormant);
    assert_eq!(n.boss.health, 50);
    assert_eq!(n.level_elapsed, Duration::ZERO);
    assert_eq!(n.last_enemy_spawn_frame, 2000);
    assert!(n.enemies.is_empty());
    assert_eq!(n.attempt, s.attempt + 1);
}

#[test]
fn next_level_requires_cleared_status() {
    let s = make_state();
    assert_eq!(start_next_level(&s), s);
}
