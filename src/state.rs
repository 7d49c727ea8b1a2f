use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::ai::SuggestionEngine;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub suggestions: Arc<dyn SuggestionEngine>,
}
