pub mod auth;
mod user_store;

pub use auth::AuthTokenValue;
pub use user_store::UserStore;

use anyhow::Result;
use tracing::info;

/// Issues a fresh session token for `user_handle`, creating the user first
/// if the handle is unknown.
pub fn issue_auth_token(store: &dyn UserStore, user_handle: &str) -> Result<AuthTokenValue> {
    let user_id = match store.get_user_id(user_handle)? {
        Some(id) => id,
        None => {
            let id = store.create_user(user_handle)?;
            info!("Created user {} with id {}", user_handle, id);
            id
        }
    };
    let token = AuthTokenValue::generate();
    store.add_auth_token(user_id, &token)?;
    Ok(token)
}
