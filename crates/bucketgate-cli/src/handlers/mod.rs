//! HTTP request handlers

pub mod files;
pub mod service;
pub mod stream;
pub mod upload;

pub use files::*;
pub use service::*;
pub use stream::*;
pub use upload::*;
