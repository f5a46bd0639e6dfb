pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::application::InsightsEngine;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::llm_clients::gemini::GeminiClient;
use crate::infrastructure::storage;
use crate::interfaces::http::{start_server, AppState};

/// Wire the engine and HTTP surface together and serve until shutdown.
pub async fn run(config: AppConfig) -> std::io::Result<()> {
    let upload_dir = storage::ensure_upload_root(&config.upload_dir)?;

    if !config.llm.has_credentials() {
        warn!("GEMINI_API_KEY not set, insight responses will use canned text");
    }
    let engine = InsightsEngine::new(Arc::new(GeminiClient::new()), config.llm.clone());

    let state = AppState {
        engine,
        upload_dir,
        sessions: Mutex::new(HashMap::new()),
    };

    let server = start_server(&config.server, state)?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        "insighta backend listening"
    );
    server.await
}
