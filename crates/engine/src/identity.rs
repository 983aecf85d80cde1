use async_trait::async_trait;
use domain::Actor;
use sha2::{Digest, Sha256};

/// Longest session identifier we will store or match bans against.
const MAX_SESSION_ID_LEN: usize = 100;

/// Seam to the external identity provider: turns a bearer credential into a
/// registered user id, or `None` when the credential is absent or invalid.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_user(&self, bearer: Option<&str>) -> Option<String>;
}

/// Stable anonymous identity for actors without an account, derived from the
/// connection rather than a credential. Salted so fingerprints cannot be
/// recomputed by third parties.
pub fn session_fingerprint(ip: &str, user_agent: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hasher.update(user_agent.as_bytes());
    hasher.update(salt.as_bytes());
    let mut id = format!("anon-{}", hex::encode(hasher.finalize()));
    id.truncate(MAX_SESSION_ID_LEN);
    id
}

/// Resolves a request to an actor: registered user when the resolver accepts
/// the bearer token, session fingerprint otherwise.
pub async fn resolve_actor(
    resolver: &dyn IdentityResolver,
    bearer: Option<&str>,
    ip: &str,
    user_agent: &str,
    salt: &str,
) -> Actor {
    match resolver.resolve_user(bearer).await {
        Some(user_id) => Actor::User(user_id),
        None => Actor::Session(session_fingerprint(ip, user_agent, salt)),
    }
}
