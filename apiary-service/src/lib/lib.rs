pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use domain::access;
pub use domain::account;
pub use domain::password_reset;
pub use domain::user;
pub use outbound::repositories;
