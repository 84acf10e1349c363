//! Async front end, behind the `async` feature
pub mod discovery;
