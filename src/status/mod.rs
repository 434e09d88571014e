pub mod classifier;
pub mod models;
