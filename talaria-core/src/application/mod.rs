pub mod dispatcher;
pub mod executor;
pub mod registry;
pub mod session;
pub mod transcript;
