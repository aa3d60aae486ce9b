pub mod backend_client;
pub mod refresh_timer;
