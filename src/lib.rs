// Psyche - Adaptive self-reflection interview
// Library exports

pub mod advisory;
pub mod cli;
pub mod config;
pub mod errors;
pub mod identity;
pub mod interview;
pub mod logging;
pub mod speech;
pub mod storage;
