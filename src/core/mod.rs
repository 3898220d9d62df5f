pub mod analysis;
pub mod config;
pub mod engine;
pub mod keys;
pub mod script;
pub mod session;
pub mod storage;
pub mod taxonomy;
pub mod template;
pub mod visuals;
