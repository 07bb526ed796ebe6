pub mod filter;

pub use filter::{clean_body, MAX_CHIRP_LEN};
