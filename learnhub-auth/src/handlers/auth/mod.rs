pub mod password;
pub mod registration;
pub mod session;
pub mod two_factor;
