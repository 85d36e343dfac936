//! Whole-engine scenarios: entities, components, the bus and observers
//! working together through the [`World`] surface.

use std::cell::RefCell;
use std::rc::Rc;

use engine_app::{EngineConfig, TickConfig, TickLoop, World};
use engine_event::{
    Diagnostic, Event, EventBus, EventKind, Observer, ObserverError, RecordingSink, shared,
};
use gameplay::{AchievementTracker, Autosave, GameLog, Health, Hud, Movable, PlayerControl};
use glam::Vec3;

/// Appends its label to a shared call log.
struct Labelled {
    label: &'static str,
    calls: Rc<RefCell<Vec<&'static str>>>,
}

impl Observer for Labelled {
    fn on_event(&mut self, _event: &Event) -> Result<(), ObserverError> {
        self.calls.borrow_mut().push(self.label);
        Ok(())
    }
}

struct Panicky;

impl Observer for Panicky {
    fn on_event(&mut self, _event: &Event) -> Result<(), ObserverError> {
        panic!("observer blew up");
    }
}

#[test]
fn test_hero_moves_one_step_per_tick() {
    let mut world = World::new();
    let hero = world.create_entity("Hero");
    world
        .attach_component(hero, Movable::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0)))
        .unwrap();

    world.tick();

    let movable = world.get_component::<Movable>(hero).unwrap();
    assert_eq!(movable.position.x, 1.0);
    assert_eq!(movable.position.y, 1.0);
}

#[test]
fn test_lethal_damage_freezes_hero() {
    let mut world = World::new();
    let hero = world.create_entity("Hero");
    world
        .attach_component(hero, Movable::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0)))
        .unwrap();
    world.attach_component(hero, Health::full(100)).unwrap();

    let hit = Event::new(EventKind::Damage, "Dragon")
        .with_target("Hero")
        .with_amount(150);
    world.broadcast(hero, &hit).unwrap();

    assert!(world.get_component::<Health>(hero).unwrap().current <= 0);
    assert!(!world.entity(hero).unwrap().is_active());

    let before = world.get_component::<Movable>(hero).unwrap().position;
    let summary = world.tick();
    assert_eq!(summary.updated, 0);
    assert_eq!(world.get_component::<Movable>(hero).unwrap().position, before);
    // Deactivation alone never destroys.
    assert!(world.entity(hero).is_some());
}

#[test]
fn test_observers_notified_in_subscription_order() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let observers: Vec<_> = ["A", "B", "C"]
        .into_iter()
        .map(|label| {
            shared(Labelled {
                label,
                calls: Rc::clone(&calls),
            })
        })
        .collect();

    let world = World::new();
    for observer in &observers {
        world.subscribe(observer);
    }

    let report = world
        .publish(&Event::new(EventKind::GameSaved, "System"))
        .unwrap();
    assert_eq!(report.delivered, 3);
    assert_eq!(*calls.borrow(), vec!["A", "B", "C"]);
}

#[test]
fn test_publish_with_no_subscribers_is_noop() {
    let world = World::new();
    let report = world
        .publish(&Event::new(EventKind::PlayerMoved, "Hero"))
        .unwrap();
    assert_eq!(report.notified(), 0);
}

#[test]
fn test_panicking_observer_does_not_block_others() {
    let sink = RecordingSink::new();
    let world = World::with_bus(EventBus::new().with_sink(sink.clone()));

    let panicky = shared(Panicky);
    let log = shared(GameLog::new());
    world.subscribe(&panicky);
    world.subscribe(&log);

    let report = world
        .publish(&Event::new(EventKind::LevelUp, "Hero").with_amount(2))
        .unwrap();
    assert_eq!(report.delivered, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(log.borrow().entries(), ["[Hero] leveled up (2)"]);
    assert!(matches!(
        sink.entries().as_slice(),
        [Diagnostic::ObserverPanicked { .. }]
    ));
}

#[test]
fn test_emitted_events_reach_observers() {
    let mut world = World::new();
    let hud = shared(Hud::default());
    let log = shared(GameLog::new());
    world.subscribe(&hud);
    world.subscribe(&log);

    let hero = world.create_entity("Hero");
    world.attach_component(hero, Movable::at(Vec3::ZERO)).unwrap();
    world.attach_component(hero, PlayerControl::default()).unwrap();
    world.attach_component(hero, Health::full(100)).unwrap();

    world.get_component_mut::<Movable>(hero).unwrap().velocity = Vec3::new(1.0, 0.0, 0.0);
    world.tick();
    assert_eq!(hud.borrow().minimap(), Some("(1.0, 0.0, 0.0)"));

    let hit = Event::new(EventKind::Damage, "Goblin")
        .with_target("Hero")
        .with_amount(15);
    world.deliver(&hit).unwrap();
    assert_eq!(hud.borrow().health(), Some(("Hero", 85)));
    assert_eq!(
        log.borrow().entries().last().map(String::as_str),
        Some("[Hero] health is now (85)")
    );
}

#[test]
fn test_destroyed_entity_purged_after_tick() {
    let mut world = World::new();
    let goner = world.create_entity("Goner");
    world
        .attach_component(goner, Movable::new(Vec3::ZERO, Vec3::X))
        .unwrap();

    assert!(world.destroy_entity(goner));
    assert!(world.get_component::<Movable>(goner).is_some());

    let summary = world.tick();
    assert_eq!(summary.destroyed, vec![goner]);
    assert_eq!(summary.updated, 0);
    assert!(world.get_component::<Movable>(goner).is_none());
    assert!(!world.destroy_entity(goner));
}

#[test]
fn test_scripted_session_unlocks_achievements() {
    let world = World::new();
    let achievements = shared(AchievementTracker::new());
    let autosave = shared(Autosave::new());
    world.subscribe(&achievements);
    world.subscribe(&autosave);

    let script = [
        Event::new(EventKind::EnemyDefeated, "Player1").with_target("Goblin"),
        Event::new(EventKind::LevelUp, "Player1").with_amount(10),
        Event::new(EventKind::ItemAcquired, "Player1").with_target("Excalibur"),
        Event::new(EventKind::EnemyDefeated, "Player1").with_target("Dragon"),
        Event::new(EventKind::LevelUp, "Player1").with_amount(50),
        Event::new(EventKind::GameSaved, "System").with_target("autosave"),
    ];
    for event in &script {
        world.publish(event).unwrap();
    }

    let names: Vec<_> = achievements
        .borrow()
        .unlocked()
        .iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(
        names,
        vec![
            AchievementTracker::GRADUATE,
            AchievementTracker::LEGENDARY_WEAPON,
            AchievementTracker::DRAGONSLAYER,
            AchievementTracker::LEGENDARY_HERO,
        ]
    );
    assert_eq!(autosave.borrow().saves(), 6);
    assert_eq!(autosave.borrow().last_saver(), Some("System"));
}

#[test]
fn test_tick_loop_runs_configured_ticks() {
    let config = EngineConfig::from_json_str(r#"{ "tick": { "tick_rate": 1000.0, "max_ticks": 4 } }"#)
        .unwrap();
    let mut world = World::with_config(&config);
    let hero = world.create_entity("Hero");
    world
        .attach_component(hero, Movable::new(Vec3::ZERO, Vec3::Y))
        .unwrap();

    let mut tick_loop = TickLoop::new(config.tick.clone(), world).unwrap();
    tick_loop.run();

    assert_eq!(tick_loop.tick_id(), 4);
    let world = tick_loop.into_world();
    assert_eq!(
        world.get_component::<Movable>(hero).map(|m| m.position),
        Some(Vec3::new(0.0, 4.0, 0.0))
    );
    assert_eq!(TickConfig::default().max_ticks, 0);
}
