//! # arena
//!
//! A player and an enemy on a shared event bus. Every few ticks the enemy
//! takes a hit; a short quest script runs before the loop starts. The
//! achievement tracker, HUD, autosave and game log all watch the bus.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use engine_app::{EngineConfig, TickLoop, World};
use engine_event::{Event, EventKind, shared};
use gameplay::{AchievementTracker, Autosave, GameLog, Health, Hud, Movable, PlayerControl};
use glam::Vec3;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arena", about = "Scripted skirmish on the component engine")]
struct Args {
    /// Path to a JSON engine config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to run (overrides the config)
    #[arg(short, long, default_value_t = 40)]
    ticks: u64,

    /// Ticks per second (overrides the config)
    #[arg(long)]
    tick_rate: Option<f64>,

    /// Ticks between hits on the enemy
    #[arg(long, default_value_t = 30)]
    hit_every: u64,

    /// Damage per hit
    #[arg(long, default_value_t = 15)]
    damage: i64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("arena=info".parse()?)
                .add_directive("gameplay=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };
    config = config.with_max_ticks(args.ticks);
    if let Some(rate) = args.tick_rate {
        config = config.with_tick_rate(rate);
    }
    config.validate()?;

    let mut world = World::with_config(&config);

    let achievements = shared(AchievementTracker::new());
    let hud = shared(Hud::default());
    let autosave = shared(Autosave::new());
    let log = shared(GameLog::new());
    world.subscribe(&achievements);
    world.subscribe(&hud);
    world.subscribe(&autosave);
    world.subscribe(&log);

    let player = world.create_entity("Player");
    world.attach_component(player, Movable::default())?;
    world.attach_component(player, PlayerControl::default())?;
    world.attach_component(player, Health::full(100))?;

    let enemy = world.create_entity("Enemy");
    world.attach_component(enemy, Movable::new(Vec3::ZERO, Vec3::new(0.2, 0.0, 0.0)))?;
    world.attach_component(enemy, Health::full(50))?;

    for event in quest_script() {
        world.publish(&event)?;
    }

    let hit_every = args.hit_every.max(1);
    let damage = args.damage;
    let mut tick_loop = TickLoop::new(config.tick.clone(), world)?;
    tick_loop.run_with(|world, summary| {
        if summary.tick_id % hit_every != 0 {
            return;
        }
        let hit = Event::new(EventKind::Damage, "Player")
            .with_target("Enemy")
            .with_amount(damage);
        if let Err(err) = world.deliver(&hit) {
            warn!(%err, "hit missed");
        }
    });

    let world = tick_loop.into_world();
    for (name, id) in [("Player", player), ("Enemy", enemy)] {
        let position = world.get_component::<Movable>(id).map(|m| m.position);
        let health = world.get_component::<Health>(id).map(|h| h.current);
        let active = world.entity(id).is_some_and(|e| e.is_active());
        info!(name, ?position, ?health, active, "final state");
    }

    for achievement in achievements.borrow().unlocked() {
        info!(name = achievement.name, description = %achievement.description, "achievement");
    }
    info!(saves = autosave.borrow().saves(), entries = log.borrow().entries().len(), "session over");

    Ok(())
}

/// The quest that plays out before the first tick.
fn quest_script() -> Vec<Event> {
    let mut script = vec![
        Event::new(EventKind::PlayerMoved, "Player").at("Starting Village"),
        Event::new(EventKind::EnemyDefeated, "Player")
            .with_target("Goblin")
            .with_amount(1)
            .at("Dark Forest"),
        Event::new(EventKind::ItemAcquired, "Player")
            .with_target("Healing Potion")
            .with_amount(3)
            .at("Dark Forest"),
        Event::new(EventKind::HealthChanged, "Player")
            .with_amount(85)
            .at("Dark Forest"),
    ];
    script.extend((1..=10).map(|n| {
        Event::new(EventKind::EnemyDefeated, "Player")
            .with_target("Skeleton")
            .with_amount(n)
            .at("Crypt")
    }));
    script.extend([
        Event::new(EventKind::LevelUp, "Player").with_amount(10).at("Crypt"),
        Event::new(EventKind::ItemAcquired, "Player")
            .with_target("Excalibur")
            .with_amount(1)
            .at("Dragon's Lair"),
        Event::new(EventKind::EnemyDefeated, "Player")
            .with_target("Dragon")
            .with_amount(1)
            .at("Dragon's Lair"),
        Event::new(EventKind::LevelUp, "Player").with_amount(50).at("Dragon's Lair"),
        Event::new(EventKind::GameSaved, "System").with_target("autosave"),
    ]);
    script
}
