use rand::{distr::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

pub const AUTH_TOKEN_LENGTH: usize = 64;

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct AuthTokenValue(pub String);

impl AuthTokenValue {
    pub fn generate() -> AuthTokenValue {
        let random_string: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(AUTH_TOKEN_LENGTH)
            .map(char::from)
            .collect();
        AuthTokenValue(random_string)
    }
}
