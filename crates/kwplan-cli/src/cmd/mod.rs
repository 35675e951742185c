pub mod classify;
pub mod config;
pub mod ctr;
pub mod run;
