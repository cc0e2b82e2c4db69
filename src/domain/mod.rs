pub mod admission;
pub mod event;
pub mod request;
pub mod user;

pub use event::*;
pub use request::*;
pub use user::*;
