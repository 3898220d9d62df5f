//! Plain data types shared by the generator, the store and the session.

pub mod outline;
pub mod project;
