use std::collections::HashMap;

use engine_event::{Event, EventKind, Observer, ObserverError};
use tracing::info;

/// Level needed for [`AchievementTracker::GRADUATE`].
pub const GRADUATE_LEVEL: i64 = 10;
/// Level needed for [`AchievementTracker::LEGENDARY_HERO`].
pub const LEGENDARY_LEVEL: i64 = 50;
/// Defeats of one target needed for [`AchievementTracker::CENTURION`].
pub const CENTURION_DEFEATS: u32 = 100;

/// An unlocked achievement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    /// One of the `AchievementTracker` name constants.
    pub name: &'static str,
    /// What earned it, e.g. "reached level 10".
    pub description: String,
}

/// Unlocks achievements from level, defeat and item events. Each
/// achievement unlocks at most once.
#[derive(Debug, Default)]
pub struct AchievementTracker {
    unlocked: Vec<Achievement>,
    defeats: HashMap<String, u32>,
}

impl AchievementTracker {
    /// Level up to [`GRADUATE_LEVEL`] or beyond.
    pub const GRADUATE: &'static str = "Graduate";
    /// Level up to [`LEGENDARY_LEVEL`] or beyond.
    pub const LEGENDARY_HERO: &'static str = "Legendary Hero";
    /// Defeat the Dragon.
    pub const DRAGONSLAYER: &'static str = "Dragonslayer";
    /// Defeat [`CENTURION_DEFEATS`] enemies with the same name.
    pub const CENTURION: &'static str = "Centurion";
    /// Acquire Excalibur.
    pub const LEGENDARY_WEAPON: &'static str = "Legendary Weapon";

    /// A tracker with nothing unlocked.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Achievements in unlock order.
    #[must_use]
    pub fn unlocked(&self) -> &[Achievement] {
        &self.unlocked
    }

    /// Returns `true` once the achievement called `name` has unlocked.
    #[must_use]
    pub fn is_unlocked(&self, name: &str) -> bool {
        self.unlocked.iter().any(|a| a.name == name)
    }

    /// How many times `target` has been defeated.
    #[must_use]
    pub fn defeats_of(&self, target: &str) -> u32 {
        self.defeats.get(target).copied().unwrap_or(0)
    }

    fn unlock(&mut self, name: &'static str, description: impl Into<String>) {
        if self.is_unlocked(name) {
            return;
        }
        let description = description.into();
        info!(achievement = name, %description, "achievement unlocked");
        self.unlocked.push(Achievement { name, description });
    }
}

impl Observer for AchievementTracker {
    fn on_event(&mut self, event: &Event) -> Result<(), ObserverError> {
        match event.kind {
            EventKind::LevelUp => {
                if event.amount >= GRADUATE_LEVEL {
                    self.unlock(Self::GRADUATE, format!("reached level {GRADUATE_LEVEL}"));
                }
                if event.amount >= LEGENDARY_LEVEL {
                    self.unlock(Self::LEGENDARY_HERO, format!("reached level {LEGENDARY_LEVEL}"));
                }
            }
            EventKind::EnemyDefeated => {
                if event.target == "Dragon" {
                    self.unlock(Self::DRAGONSLAYER, "defeated the Dragon");
                }
                let count = self.defeats.entry(event.target.clone()).or_default();
                *count += 1;
                if *count >= CENTURION_DEFEATS {
                    let description = format!("defeated {CENTURION_DEFEATS} {}", event.target);
                    self.unlock(Self::CENTURION, description);
                }
            }
            EventKind::ItemAcquired => {
                if event.target == "Excalibur" {
                    self.unlock(Self::LEGENDARY_WEAPON, "acquired Excalibur");
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "achievements"
    }
}
