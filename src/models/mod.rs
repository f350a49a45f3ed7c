//! Registry API model types.

mod krate;
mod taxonomy;
mod user;

pub use krate::*;
pub use taxonomy::*;
pub use user::*;
