pub mod access;
pub mod api_key;
pub mod generator;
pub mod header;
pub mod service;

pub use access::{Claims, TokenType};
pub use generator::generate_token;
pub use header::{bearer_token, MalformedHeaderError};
pub use service::{TokenError, TokenService};
