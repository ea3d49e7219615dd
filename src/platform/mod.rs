pub mod environment;
pub mod page;
