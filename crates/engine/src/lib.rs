mod executor;
pub mod identity;

pub use executor::{EngineReply, Executor};
pub use identity::{session_fingerprint, IdentityResolver};

use domain::{AppCommand, EngineError, IngestEvent};
use storage::Db;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// One request through the engine: the command plus the channel the HTTP
/// layer is waiting on for the outcome.
pub struct CommandEnvelope {
    pub cmd: AppCommand,
    pub resp: oneshot::Sender<Result<EngineReply, EngineError>>,
}

/// Runs the moderation worker until the command channel closes or the token
/// is cancelled. Commands are applied strictly in arrival order, which is
/// what gives a user's rapid reaction changes their submission-order
/// guarantee.
pub async fn start_with_cancel_token(
    db: Db,
    moderator: domain::ContentModerator,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    tx_ingest: broadcast::Sender<IngestEvent>,
    cancel_token: CancellationToken,
) -> anyhow::Result<()> {
    let executor = Executor::new(db, moderator, tx_ingest);
    loop {
        tokio::select! {
            envelope = rx.recv() => {
                let Some(CommandEnvelope { cmd, resp }) = envelope else { break };
                let result = executor.execute(cmd).await;
                if let Err(e) = &result {
                    warn!("command rejected: {e}");
                }
                let _ = resp.send(result);
            }
            _ = cancel_token.cancelled() => break,
        }
    }
    Ok(())
}

pub async fn start(
    db: Db,
    moderator: domain::ContentModerator,
    rx: mpsc::Receiver<CommandEnvelope>,
    tx_ingest: broadcast::Sender<IngestEvent>,
) -> anyhow::Result<()> {
    start_with_cancel_token(db, moderator, rx, tx_ingest, CancellationToken::new()).await
}
