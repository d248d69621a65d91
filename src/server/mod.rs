pub mod config;
mod http_layers;
mod music_routes;
pub mod server;
pub(self) mod session;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
pub use session::{COOKIE_SESSION_TOKEN_KEY, HEADER_SESSION_TOKEN_KEY};
