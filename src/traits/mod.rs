//! Operation traits implemented by GitLab entity types.
//!
//! Each entity implements the traits its endpoints support. Actions that
//! do not fit one of them (create, delete, member management) are free
//! functions next to the entity.

mod get;
mod list;
mod update;

pub use get::Get;
pub use list::List;
pub use update::Update;
