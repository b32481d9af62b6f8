mod common;

use common::{bank, tick, CountingSink, HeldKeys, RecordingAudio, StubContent};
use rand::rngs::StdRng;
use rand::SeedableRng;
use space_raiders::entity::Vec2;
use space_raiders::interface::Key;
use space_raiders::level::LEVELS;
use space_raiders::sim::Simulation;
use space_raiders::starfield::Starfield;
use space_raiders::{GameError, World};

fn sim_at(level: usize) -> Simulation {
    Simulation::new(
        level,
        World::default(),
        &mut StubContent,
        StdRng::seed_from_u64(42),
    )
    .unwrap()
}

// ── Construction ──────────────────────────────────────────────────────────────

#[test]
fn fresh_simulation_starts_clean() {
    let sim = sim_at(1);
    assert_eq!(sim.level(), 1);
    assert_eq!(sim.score(), 0);
    assert_eq!(sim.lives(), 3);
    assert!(!sim.is_over());
    assert!(!sim.is_paused());
    assert_eq!(sim.formation().alive_count(), 18); // 3 x 6 on level 1
}

#[test]
fn out_of_catalog_levels_are_configuration_errors() {
    let world = World::default();
    let zero = Simulation::new(0, world, &mut StubContent, StdRng::seed_from_u64(1));
    assert!(matches!(zero, Err(GameError::UnknownLevel(0))));

    let beyond = Simulation::new(99, world, &mut StubContent, StdRng::seed_from_u64(1));
    assert!(matches!(beyond, Err(GameError::UnknownLevel(99))));
}

// ── Pause ─────────────────────────────────────────────────────────────────────

#[test]
fn pause_is_a_reference_count() {
    let mut sim = sim_at(1);
    let idle = HeldKeys::none();
    let mut audio = RecordingAudio::default();

    sim.pause(true);
    sim.pause(true);
    sim.pause(false);
    assert!(sim.is_paused());

    // Nothing moves while any pause is outstanding.
    let before = sim.formation().enemy(0).position();
    sim.update(&tick(33), &idle, &mut audio);
    assert_eq!(sim.formation().enemy(0).position(), before);

    sim.pause(false);
    assert!(!sim.is_paused());
    sim.update(&tick(66), &idle, &mut audio);
    assert_ne!(sim.formation().enemy(0).position(), before);
}

// ── Level progression ─────────────────────────────────────────────────────────

#[test]
fn next_level_rebuilds_the_wave_and_keeps_the_player() {
    let mut sim = sim_at(1);
    sim.next_level();
    assert_eq!(sim.level(), 2);
    assert_eq!(sim.formation().alive_count(), 24); // 3 x 8 on level 2
    assert_eq!(sim.lives(), 3);
}

#[test]
fn progression_wraps_past_the_catalog_end() {
    let mut sim = sim_at(1);
    for _ in 0..LEVELS.len() {
        sim.next_level();
    }
    assert_eq!(sim.level(), 1);
}

// ── Power-up throttling ───────────────────────────────────────────────────────

#[test]
fn concurrent_powerups_are_capped() {
    let mut sim = sim_at(1);
    for _ in 0..5 {
        sim.spawn_powerup(Vec2::new(500.0, 100.0));
    }
    assert_eq!(sim.active_powerups(), 3);
}

// ── Draw submission ───────────────────────────────────────────────────────────

#[test]
fn only_live_entities_are_submitted() {
    let sim = sim_at(1);
    let mut sink = CountingSink::default();
    sim.submit(&mut sink);
    // 100 stars + ship + burner + 18 enemies with exhausts. Hidden
    // missiles, shots, effects, power-ups and the shield submit
    // nothing.
    assert_eq!(sink.submissions, 100 + 2 + 36);
}

// ── Starfield hazards ─────────────────────────────────────────────────────────

#[test]
fn asteroid_population_respects_the_cap() {
    let world = World::default();
    let mut rng = StdRng::seed_from_u64(7);
    let mut starfield = Starfield::new(world, &bank(), &mut rng).unwrap();
    starfield.set_max_asteroids(2);

    for frame in 1..600 {
        starfield.update(&tick(frame * 33), true, &mut rng);
        assert!(starfield.asteroid_count() <= 2);
    }
    // A 2 % spawn chance over 600 frames: the sky is not empty.
    assert!(starfield.asteroid_count() > 0);
}

// ── Longer smoke run ──────────────────────────────────────────────────────────

#[test]
fn invariants_hold_over_a_busy_run() {
    let mut sim = sim_at(1);
    let fire = HeldKeys::holding(&[Key::Fire, Key::Right]);
    let mut audio = RecordingAudio::default();

    for frame in 1..400 {
        sim.update(&tick(frame * 33), &fire, &mut audio);
        // Bounded by the largest grid in the catalog, whatever level
        // the run has reached.
        assert!(sim.formation().alive_count() <= 45);
        assert!(sim.formation().shots_in_flight() <= 3);
        assert!(sim.active_powerups() <= 3);
        assert!(sim.lives() <= 3);
    }
}
