pub mod live;
pub mod permissions;
pub mod scripted;
