pub mod company;
pub mod error;
pub mod follow;
pub mod profile;
pub mod user;
