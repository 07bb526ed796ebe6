mod cleaner;

pub use cleaner::{run_cleanup, start_expiration_cleaner};
