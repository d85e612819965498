mod client;
mod error;
mod retry;

pub use client::VisionClient;
pub use error::VisionError;
