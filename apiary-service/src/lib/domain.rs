pub mod access;
pub mod account;
pub mod password_reset;
pub mod user;
