use std::sync::Arc;

use crate::config::GameConfig;
use crate::services::controls::GameBot;
use crate::services::session::SessionCoordinator;

/// Shared game resources handed to whatever drives the bot.
#[derive(Clone)]
pub struct AppState {
    pub config: GameConfig,
    pub coordinator: Arc<SessionCoordinator>,
    pub bot: Arc<GameBot>,
}

impl AppState {
    pub fn new(config: GameConfig, coordinator: Arc<SessionCoordinator>, bot: GameBot) -> Self {
        Self {
            config,
            coordinator,
            bot: Arc::new(bot),
        }
    }

    pub fn coordinator(&self) -> &Arc<SessionCoordinator> {
        &self.coordinator
    }

    pub fn bot(&self) -> &GameBot {
        &self.bot
    }
}
