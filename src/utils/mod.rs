pub mod constants;
pub mod url_resolve;

pub use constants::*;
pub use url_resolve::resolve;
