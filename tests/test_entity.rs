mod common;

use common::tick;
use space_raiders::entity::{BoundingBox, Entity, EntityState, Vec2};
use space_raiders::interface::VisualHandle;
use space_raiders::pool::ObjectPool;
use space_raiders::GameError;

fn visual(width: u32, height: u32) -> VisualHandle {
    VisualHandle {
        id: 1,
        width,
        height,
    }
}

/// A visible 100x100 entity with no box trim, centred at (x, y).
fn entity_at(x: f32, y: f32) -> Entity {
    let mut entity = Entity::with_visual(visual(100, 100), 1).unwrap();
    entity.pos = Vec2::new(x, y);
    entity.shrink_factor = 0.0;
    entity
}

// ── Visual binding ────────────────────────────────────────────────────────────

#[test]
fn init_visual_rejects_zero_frames() {
    let mut entity = Entity::new();
    assert!(matches!(
        entity.init_visual(visual(100, 100), 0),
        Err(GameError::InvalidFrameCount)
    ));
}

#[test]
fn init_visual_splits_sheet_into_frames() {
    let mut entity = Entity::new();
    entity.init_visual(visual(100, 100), 10).unwrap();
    assert_eq!(entity.height(), 10.0); // 100 px sheet / 10 frames
    assert_eq!(entity.width(), 100.0);
}

#[test]
#[should_panic(expected = "no visual bound")]
fn bounds_without_visual_is_a_programming_error() {
    let entity = Entity::new();
    let _ = entity.bounds();
}

// ── Bounding boxes ────────────────────────────────────────────────────────────

#[test]
fn bounds_are_centred_on_position() {
    let entity = entity_at(50.0, 50.0);
    let bounds = entity.bounds();
    assert_eq!(bounds.x, 0.0);
    assert_eq!(bounds.y, 0.0);
    assert_eq!(bounds.width, 100.0);
    assert_eq!(bounds.height, 100.0);
}

#[test]
fn shrink_trims_and_recentres() {
    let bounds = BoundingBox {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 100.0,
    }
    .shrink(0.1);
    // Width and height scale by (1 - s); the centre stays at (50, 50).
    assert!((bounds.width - 90.0).abs() < 1e-3);
    assert!((bounds.height - 90.0).abs() < 1e-3);
    assert!((bounds.x - 5.0).abs() < 1e-3);
    assert!((bounds.y - 5.0).abs() < 1e-3);
    assert!((bounds.x + bounds.width / 2.0 - 50.0).abs() < 1e-3);
}

#[test]
fn shrink_never_goes_negative_in_range() {
    let bounds = BoundingBox {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 100.0,
    }
    .shrink(0.99);
    assert!(bounds.width > 0.0);
    assert!(bounds.height > 0.0);
}

#[test]
fn boxes_touching_edges_do_not_intersect() {
    // Centres 100 apart with half-extent sum exactly 100: no overlap.
    let a = entity_at(0.0, 0.0);
    let b = entity_at(100.0, 0.0);
    assert!(!a.intersects(&b));

    let c = entity_at(99.0, 0.0);
    assert!(a.intersects(&c));
    assert!(c.intersects(&a)); // symmetric
}

#[test]
fn hidden_entities_never_intersect() {
    let a = entity_at(0.0, 0.0);
    let mut b = entity_at(0.0, 0.0); // dead overlap
    assert!(a.intersects(&b));

    b.state = EntityState::Hidden;
    assert!(!a.intersects(&b));
    assert!(!b.intersects(&a));

    b.state = EntityState::Disabled;
    assert!(!a.intersects(&b)); // Disabled draws but never collides
}

// ── Update ────────────────────────────────────────────────────────────────────

#[test]
fn update_is_a_no_op_while_hidden() {
    let mut entity = entity_at(10.0, 10.0);
    entity.velocity = Vec2::new(100.0, 0.0);
    entity.state = EntityState::Hidden;
    entity.update(&tick(33));
    assert_eq!(entity.pos.x, 10.0);
}

#[test]
fn update_integrates_velocity_over_delta() {
    let mut entity = entity_at(10.0, 10.0);
    entity.velocity = Vec2::new(100.0, -50.0);
    let t = space_raiders::entity::GameTime {
        total: std::time::Duration::from_millis(500),
        delta: std::time::Duration::from_millis(500),
    };
    entity.update(&t);
    assert!((entity.pos.x - 60.0).abs() < 1e-3);
    assert!((entity.pos.y - (10.0 - 25.0)).abs() < 1e-3);
}

#[test]
fn animation_advances_on_the_fps_clock() {
    let mut entity = Entity::with_visual(visual(100, 100), 10).unwrap();
    // Default 8 fps: one frame per 125 ms.
    entity.update(&tick(100)); // first update only latches the clock
    assert_eq!(entity.frame(), 0);
    entity.update(&tick(300)); // 200 ms later
    assert_eq!(entity.frame(), 1);
    entity.update(&tick(350)); // only 50 ms later
    assert_eq!(entity.frame(), 1);
}

#[test]
fn hide_on_animation_end_hides_after_wrap() {
    let mut entity = Entity::with_visual(visual(100, 100), 2).unwrap();
    entity.hide_on_animation_end = true;
    entity.update(&tick(100));
    entity.update(&tick(300)); // frame 0 -> 1
    assert_eq!(entity.frame(), 1);
    assert!(entity.is_visible());
    entity.update(&tick(500)); // wraps to 0 -> hidden
    assert_eq!(entity.state, EntityState::Hidden);
}

#[test]
fn spin_rotates_while_updating() {
    let mut entity = entity_at(0.0, 0.0);
    entity.spin = 1.0;
    let t = space_raiders::entity::GameTime {
        total: std::time::Duration::from_millis(500),
        delta: std::time::Duration::from_millis(500),
    };
    entity.update(&t);
    assert!((entity.angle - 0.5).abs() < 1e-3);
}

// ── Pools ─────────────────────────────────────────────────────────────────────

fn pool_of(n: usize) -> ObjectPool<Entity> {
    let slots = (0..n)
        .map(|i| {
            let mut entity = Entity::new();
            entity.init_visual(visual(100, 100), 1).unwrap();
            // Tag the slot so tests can tell them apart.
            entity.pos = Vec2::new(i as f32, 0.0);
            entity
        })
        .collect();
    ObjectPool::new("test", slots)
}

#[test]
fn acquire_walks_slots_in_order() {
    let mut pool = pool_of(3);
    for expected in 0..3 {
        let slot = pool.acquire().unwrap();
        assert_eq!(slot.pos.x, expected as f32);
        slot.state = EntityState::Visible;
    }
    assert_eq!(pool.in_use(), 3);
}

#[test]
fn saturated_pool_returns_none() {
    let mut pool = pool_of(2);
    pool.acquire().unwrap().state = EntityState::Visible;
    pool.acquire().unwrap().state = EntityState::Visible;
    assert!(pool.acquire().is_none());
}

#[test]
fn released_slot_becomes_acquirable_again() {
    let mut pool = pool_of(2);
    pool.acquire().unwrap().state = EntityState::Visible;
    pool.acquire().unwrap().state = EntityState::Visible;

    // Release slot 0 by hiding it.
    for slot in pool.iter_mut() {
        if slot.pos.x == 0.0 {
            slot.hide();
        }
    }
    let slot = pool.acquire().unwrap();
    assert_eq!(slot.pos.x, 0.0);
}

#[test]
fn round_robin_spreads_reuse_across_slots() {
    let mut pool = pool_of(3);
    // Acquire slot 0, release it immediately...
    pool.acquire().unwrap().state = EntityState::Visible;
    for slot in pool.iter_mut() {
        slot.hide();
    }
    // ...the next acquire must move on to slot 1, not hand 0 back.
    assert_eq!(pool.acquire().unwrap().pos.x, 1.0);
}

#[test]
fn reset_clears_motion_but_keeps_presets() {
    let mut pool = pool_of(1);
    {
        let slot = pool.acquire().unwrap();
        slot.state = EntityState::Visible;
        slot.velocity = Vec2::new(5.0, 5.0);
        slot.scale = 0.4;
        slot.hide();
    }
    let slot = pool.acquire().unwrap();
    assert_eq!(slot.velocity, Vec2::zeros());
    assert_eq!(slot.scale, 0.4); // per-type preset survives reuse
    assert!(slot.visual().is_some());
}
