pub use super::company::Entity as Company;
pub use super::follow::Entity as Follow;
pub use super::user::Entity as User;
