pub mod company;
pub mod follow;
pub mod user;
