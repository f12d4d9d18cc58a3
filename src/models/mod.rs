//! GitLab API model types.

mod common;
mod deploy_key;
mod group;
mod issue;
mod label;
mod merge_request;
mod milestone;
mod note;
mod project;
mod repository;
mod snippet;
mod system_hook;
mod user;

pub use common::*;
pub use deploy_key::*;
pub use group::*;
pub use issue::*;
pub use label::*;
pub use merge_request::*;
pub use milestone::*;
pub use note::*;
pub use project::*;
pub use repository::*;
pub use snippet::*;
pub use system_hook::*;
pub use user::*;
