pub mod argon2;
pub mod errors;
mod legacy;

pub use self::argon2::HashScheme;
pub use self::argon2::PasswordHasher;
pub use errors::PasswordError;
