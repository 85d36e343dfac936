//! Example observers reacting to game events.

mod achievements;
mod autosave;
mod game_log;
mod hud;

pub use achievements::{Achievement, AchievementTracker};
pub use autosave::Autosave;
pub use game_log::GameLog;
pub use hud::Hud;
