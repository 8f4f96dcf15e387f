pub mod inspect;
pub mod list;
pub mod send;
pub mod session;
