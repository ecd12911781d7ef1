pub mod user;
pub mod profile;
pub mod event;
pub mod job;
pub mod announcement;
pub mod pagination;
pub mod validation;

pub use user::*;
pub use profile::*;
pub use event::*;
pub use job::*;
pub use announcement::*;
pub use pagination::*;
