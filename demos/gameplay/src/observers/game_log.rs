use engine_event::{Event, EventKind, Observer, ObserverError};
use tracing::info;

/// Keeps a readable line for every event, in arrival order.
#[derive(Debug, Default)]
pub struct GameLog {
    entries: Vec<String>,
}

impl GameLog {
    /// An empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Logged lines in arrival order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Format an event as `[source] verb target (amount) @ location`.
    ///
    /// The target is omitted when empty, the amount unless positive, and
    /// the location when empty.
    #[must_use]
    pub fn format_entry(event: &Event) -> String {
        let mut line = format!("[{}] {}", event.source, verb(event.kind));
        if event.has_target() {
            line.push_str(&format!(" {}", event.target));
        }
        if event.amount > 0 {
            line.push_str(&format!(" ({})", event.amount));
        }
        if !event.location.is_empty() {
            line.push_str(&format!(" @ {}", event.location));
        }
        line
    }
}

fn verb(kind: EventKind) -> &'static str {
    match kind {
        EventKind::PlayerMoved => "moved",
        EventKind::LevelUp => "leveled up",
        EventKind::ItemAcquired => "acquired",
        EventKind::EnemyDefeated => "defeated",
        EventKind::HealthChanged => "health is now",
        EventKind::GameSaved => "saved the game",
        EventKind::Damage => "hit",
        EventKind::Heal => "healed",
        EventKind::Died => "died",
    }
}

impl Observer for GameLog {
    fn on_event(&mut self, event: &Event) -> Result<(), ObserverError> {
        let line = Self::format_entry(event);
        info!(target: "game_log", "{line}");
        self.entries.push(line);
        Ok(())
    }

    fn name(&self) -> &str {
        "game_log"
    }
}
