pub mod admin;
pub mod events;
pub mod requests;
pub mod root;
