use super::auth::AuthTokenValue;
use anyhow::Result;

/// Identity only: handles and the session tokens that resolve to them.
pub trait UserStore: Send + Sync {
    /// Creates a new user and returns its id. Fails if the handle is taken.
    fn create_user(&self, user_handle: &str) -> Result<usize>;

    fn get_user_id(&self, user_handle: &str) -> Result<Option<usize>>;

    fn add_auth_token(&self, user_id: usize, token: &AuthTokenValue) -> Result<()>;

    fn get_user_id_for_token(&self, token: &AuthTokenValue) -> Result<Option<usize>>;
}
