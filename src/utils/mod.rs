pub mod scheduler;
pub mod serdealizers;
#[cfg(test)]
pub mod testing;
