pub mod engine;
pub mod errors;
pub mod feed;
pub mod indicators;
pub mod session;
pub mod time_point;
