pub mod account;
pub mod attendance;
pub mod dashboard;
pub mod mail;
pub mod upload;
