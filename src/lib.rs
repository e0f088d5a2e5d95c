#![allow(async_fn_in_trait)]
pub mod config;
pub mod copernicus;
pub mod download_plan;
mod error;
pub mod geometry;
pub mod http;
pub mod logger;
pub mod pipeline;
mod progress;
pub mod selection;

pub use error::{Error, Result};
