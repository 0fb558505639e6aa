pub mod account;
pub mod attendance;
pub mod mail;
pub mod role;
pub mod summary;
