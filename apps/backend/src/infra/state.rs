use std::sync::Arc;

use crate::adapters::CsvRecordSink;
use crate::config::GameConfig;
use crate::error::AppError;
use crate::messaging::Messenger;
use crate::repos::RecordSink;
use crate::services::controls::GameBot;
use crate::services::session::SessionCoordinator;
use crate::state::app_state::AppState;

/// Builder for creating AppState instances (used in both tests and the simulator)
pub struct StateBuilder {
    config: GameConfig,
    messenger: Option<Arc<dyn Messenger>>,
    sink: Option<Arc<dyn RecordSink>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            config: GameConfig::default(),
            messenger: None,
            sink: None,
        }
    }
    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }
    pub fn with_messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = Some(messenger);
        self
    }
    pub fn with_record_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> Result<AppState, AppError> {
        self.config.validate()?;
        let messenger = self
            .messenger
            .ok_or_else(|| AppError::config("A messenger is required to build the game state"))?;
        // CSV log in the export directory unless a sink was supplied
        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(CsvRecordSink::new(self.config.export_dir.clone())));

        let coordinator =
            SessionCoordinator::new(Arc::clone(&messenger), sink, self.config.round_timeout);
        let bot = GameBot::new(self.config.clone(), Arc::clone(&coordinator), messenger);
        Ok(AppState::new(self.config, coordinator, bot))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
