use engine_event::{Event, EventKind, Observer, ObserverError};
use tracing::info;

/// Saves progress whenever something worth keeping happens.
#[derive(Debug, Default)]
pub struct Autosave {
    saves: u32,
    last_saver: Option<String>,
}

impl Autosave {
    /// An autosave that has not saved yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saves performed.
    #[must_use]
    pub fn saves(&self) -> u32 {
        self.saves
    }

    /// Whose progress was saved last.
    #[must_use]
    pub fn last_saver(&self) -> Option<&str> {
        self.last_saver.as_deref()
    }

    /// Returns `true` for the kinds that trigger a save.
    #[must_use]
    pub fn triggers_on(kind: EventKind) -> bool {
        matches!(
            kind,
            EventKind::LevelUp
                | EventKind::ItemAcquired
                | EventKind::EnemyDefeated
                | EventKind::GameSaved
        )
    }
}

impl Observer for Autosave {
    fn on_event(&mut self, event: &Event) -> Result<(), ObserverError> {
        if Self::triggers_on(event.kind) {
            self.saves += 1;
            self.last_saver = Some(event.source.clone());
            info!(player = %event.source, saves = self.saves, "progress saved");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "autosave"
    }
}
