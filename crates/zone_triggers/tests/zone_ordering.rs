//! Integration tests for zone occupancy under reordered raw signals

use parking_lot::Mutex;
use std::sync::Arc;
use zone_triggers::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Logical {
    Entered(EntityRef),
    Left(EntityRef),
}

fn record(handle: &ZoneHandle) -> Arc<Mutex<Vec<Logical>>> {
    let events = Arc::new(Mutex::new(Vec::new()));

    let entered = events.clone();
    handle.on_entered(move |e| entered.lock().push(Logical::Entered(e.entity_ref())));
    let left = events.clone();
    handle.on_left(move |e| left.lock().push(Logical::Left(e.entity_ref())));

    events
}

/// All orderings of `items`
fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut result = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head.clone());
            result.push(tail);
        }
    }
    result
}

#[test]
fn test_dedup_for_every_interleaving() {
    let scene = MemoryScene::new();
    let shape = scene.add_zone_shape();
    let convoy = scene.spawn_entity(EntityKind::Convoy, "Convoy_1", "Convoy", [0.0; 3]);
    let colliders: Vec<ColliderId> = (0..3).map(|_| scene.add_collider(convoy)).collect();

    let orders = permutations(&colliders);
    for enter_order in &orders {
        for exit_order in &orders {
            let mut tracker = ZoneTracker::new("Yard", shape);
            let events = record(&tracker.handle());

            for &c in enter_order {
                tracker.on_raw_overlap_begin(&scene, c);
            }
            assert_eq!(tracker.colliders_inside(convoy), 3);
            for &c in exit_order {
                tracker.on_raw_overlap_end(&scene, c);
            }

            assert_eq!(
                *events.lock(),
                vec![Logical::Entered(convoy), Logical::Left(convoy)],
                "enter {:?} exit {:?}",
                enter_order,
                exit_order
            );
            assert_eq!(tracker.occupant_count(), 0);
        }
    }
}

#[test]
fn test_dedup_when_exits_overlap_enters() {
    let scene = MemoryScene::new();
    let shape = scene.add_zone_shape();
    let convoy = scene.spawn_entity(EntityKind::Convoy, "Convoy_1", "Convoy", [0.0; 3]);
    let c: Vec<ColliderId> = (0..3).map(|_| scene.add_collider(convoy)).collect();

    let mut tracker = ZoneTracker::new("Yard", shape);
    let events = record(&tracker.handle());

    // Colliders move through the zone one after another without it ever
    // becoming empty
    tracker.on_raw_overlap_begin(&scene, c[0]);
    tracker.on_raw_overlap_begin(&scene, c[1]);
    tracker.on_raw_overlap_end(&scene, c[0]);
    tracker.on_raw_overlap_begin(&scene, c[2]);
    tracker.on_raw_overlap_end(&scene, c[1]);
    tracker.on_raw_overlap_end(&scene, c[2]);

    assert_eq!(
        *events.lock(),
        vec![Logical::Entered(convoy), Logical::Left(convoy)]
    );
}

#[test]
fn test_deactivation_inside_enter_handler() {
    let scene = MemoryScene::new();
    let mut zones = ZoneSystem::new();
    let shape = scene.add_zone_shape();
    let handle = zones.add_zone(&scene, "Pit", shape);

    let entity = scene.spawn_entity(EntityKind::Generic, "Goblin_1", "Goblin", [0.0; 3]);
    let colliders = [
        scene.add_collider(entity),
        scene.add_collider(entity),
        scene.add_collider(entity),
    ];

    let events = record(&handle);

    // The rule's action deactivates whatever enters
    let host = scene.clone();
    let action = FnAction::new(move |activation: &Activation| {
        for &e in &activation.entities {
            host.set_entity_active(e, false);
        }
    });
    let mut rule = TriggerRule::new(
        TriggerRuleConfig::new().with_trigger_on_enter(true),
        vec![handle.clone()],
        action,
    )
    .unwrap();
    rule.init();

    // begin(A) deactivates the entity, so the host reports end(A) before
    // the begin signals of B and C
    let emitted = zones.process(
        &scene,
        [
            RawOverlap::begin(shape, colliders[0]),
            RawOverlap::end(shape, colliders[0]),
            RawOverlap::begin(shape, colliders[1]),
            RawOverlap::begin(shape, colliders[2]),
        ],
    );

    assert_eq!(emitted, 2);
    assert_eq!(
        *events.lock(),
        vec![Logical::Entered(entity), Logical::Left(entity)]
    );
    assert!(!zones.zone(shape).unwrap().contains(entity));
    assert_eq!(rule.occupancy_count(), 0);
    assert_eq!(rule.invariant_violations(), 0);

    // Late end signals for B and C are dropped as well
    zones.process(
        &scene,
        [
            RawOverlap::end(shape, colliders[1]),
            RawOverlap::end(shape, colliders[2]),
        ],
    );
    assert_eq!(events.lock().len(), 2);
    assert_eq!(rule.invariant_violations(), 0);
}

#[test]
fn test_destroyed_entity_is_evicted() {
    let scene = MemoryScene::new();
    let shape = scene.add_zone_shape();
    let entity = scene.spawn_entity(EntityKind::Convoy, "Cart_1", "Convoy", [0.0; 3]);
    let a = scene.add_collider(entity);
    let b = scene.add_collider(entity);

    let mut tracker = ZoneTracker::new("Yard", shape);
    let events = record(&tracker.handle());

    tracker.on_raw_overlap_begin(&scene, a);
    tracker.on_raw_overlap_begin(&scene, b);
    scene.destroy_entity(entity);
    tracker.on_raw_overlap_end(&scene, b);
    tracker.on_raw_overlap_end(&scene, a);

    // Re-entering after destruction is stale
    assert!(!tracker.on_raw_overlap_begin(&scene, a));

    assert_eq!(
        *events.lock(),
        vec![Logical::Entered(entity), Logical::Left(entity)]
    );
    assert_eq!(tracker.occupant_count(), 0);
}

#[test]
fn test_reentry_after_leaving() {
    let scene = MemoryScene::new();
    let shape = scene.add_zone_shape();
    let entity = scene.spawn_entity(EntityKind::Generic, "Goblin_1", "Goblin", [0.0; 3]);
    let a = scene.add_collider(entity);

    let mut tracker = ZoneTracker::new("Vault", shape);
    let events = record(&tracker.handle());

    for _ in 0..2 {
        tracker.on_raw_overlap_begin(&scene, a);
        tracker.on_raw_overlap_end(&scene, a);
    }

    assert_eq!(
        *events.lock(),
        vec![
            Logical::Entered(entity),
            Logical::Left(entity),
            Logical::Entered(entity),
            Logical::Left(entity),
        ]
    );
}

#[test]
fn test_non_sensor_zone_still_tracks() {
    let scene = MemoryScene::new();
    let shape = scene.add_zone_shape();
    scene.set_sensor(shape, false);

    let tracker = ZoneTracker::attach(&scene, "Solid", shape);
    assert_eq!(tracker.shape(), shape);
    assert_eq!(tracker.occupant_count(), 0);
}
