mod discord;
mod types;

pub use discord::*;
pub use types::*;
