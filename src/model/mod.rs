//! Resource models mirrored from the admin API, and the forms that write them.

pub mod book;
pub mod category;
pub mod transaction;
pub mod user;
pub mod validation;

pub use book::*;
pub use category::*;
pub use transaction::*;
pub use user::*;
