use crate::auth::TokenVerifier;
use axum::extract::FromRef;
use domain::IngestEvent;
use engine::CommandEnvelope;
use storage::Db;
use tokio::sync::{broadcast, mpsc};

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub sender: mpsc::Sender<CommandEnvelope>,
    pub tx_ingest: broadcast::Sender<IngestEvent>,
    pub auth: TokenVerifier,
    pub identity_salt: String,
}

impl FromRef<AppState> for Db {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
