pub mod api;
pub mod keepalive;
pub mod state;
