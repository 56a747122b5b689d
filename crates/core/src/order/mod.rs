mod store;
mod supabase;
mod types;

pub use store::*;
pub use supabase::*;
pub use types::*;
