pub mod audio;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod levels;
pub mod profile;

pub use error::{Error, Result};
