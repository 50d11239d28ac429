pub mod collector;
pub mod composer;
pub mod config;
pub mod notifier;
pub mod orchestrator;
pub mod schedule;
pub mod sources;
pub mod types;

pub use collector::{CollectItems, Collector};
pub use composer::{ComposeDigest, GeminiComposer};
pub use config::Config;
pub use notifier::{Notify, TelegramNotifier};
pub use orchestrator::{Orchestrator, RunOutcome};
pub use schedule::DailySchedule;
pub use types::*;
