pub mod clock;
pub mod commands;
pub mod errors;
pub mod execution;
pub mod network;
pub mod types;

#[cfg(test)]
mod tests;
