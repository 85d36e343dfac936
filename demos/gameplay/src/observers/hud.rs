use engine_event::{Event, EventKind, Observer, ObserverError};
use tracing::info;

/// Heads-up display. Tracks what the player would see and logs every
/// refresh.
#[derive(Debug)]
pub struct Hud {
    /// Scale of the health bar.
    max_health: i64,
    minimap: Option<String>,
    health: Option<(String, i64)>,
    lines: Vec<String>,
}

impl Hud {
    /// A blank HUD whose health bar is scaled to `max_health`.
    #[must_use]
    pub fn new(max_health: i64) -> Self {
        Self {
            max_health,
            minimap: None,
            health: None,
            lines: Vec::new(),
        }
    }

    /// Last location shown on the minimap.
    #[must_use]
    pub fn minimap(&self) -> Option<&str> {
        self.minimap.as_deref()
    }

    /// Last health bar shown, as `(who, hit points)`.
    #[must_use]
    pub fn health(&self) -> Option<(&str, i64)> {
        self.health.as_ref().map(|(who, hp)| (who.as_str(), *hp))
    }

    /// Every line drawn so far.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn show(&mut self, line: String) {
        info!(target: "hud", "{line}");
        self.lines.push(line);
    }
}

impl Default for Hud {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Observer for Hud {
    fn on_event(&mut self, event: &Event) -> Result<(), ObserverError> {
        match event.kind {
            EventKind::PlayerMoved => {
                self.minimap = Some(event.location.clone());
                self.show(format!("minimap: {}", event.location));
            }
            EventKind::HealthChanged => {
                self.health = Some((event.source.clone(), event.amount));
                self.show(format!(
                    "{} health: {}/{}",
                    event.source, event.amount, self.max_health
                ));
            }
            EventKind::LevelUp => {
                self.show(format!("{} reached level {}!", event.source, event.amount));
            }
            EventKind::EnemyDefeated => {
                self.show(format!("{} defeated!", event.target));
            }
            _ => {}
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "hud"
    }
}
