use std::sync::Arc;

use anyhow::Result;
use chrono_tz::Tz;

use crate::database::Database;
use crate::models::Settings;
use crate::services::{analyzer::Analyzer, auth_client::AuthClient};

pub struct AppState {
    pub settings: Settings,
    pub db: Database,
    pub auth: AuthClient,
    pub analyzer: Analyzer,
    pub timezone: Tz,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Arc<Self>> {
        let db = Database::new(&settings.storage.database_path);
        db.init()?;

        let auth = AuthClient::new(settings.auth.clone());
        let analyzer = Analyzer::new(settings.ai.clone())?;
        if !analyzer.is_configured() {
            log::warn!("AI analysis is disabled or has no API key; analysis requests will fail");
        }

        let timezone = settings.server.timezone.parse::<Tz>().unwrap_or_else(|e| {
            log::warn!("Unknown timezone {}, using UTC: {}", settings.server.timezone, e);
            Tz::UTC
        });

        Ok(Arc::new(Self {
            settings,
            db,
            auth,
            analyzer,
            timezone,
        }))
    }
}
