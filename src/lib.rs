pub mod api_listing;
pub mod candidates;
pub mod config;
pub mod discovery;
mod error;
pub mod fetch;
pub mod folder_ref;
pub mod gallery;
pub mod local;
pub mod models;
pub mod resolve;
pub mod sniff;
pub mod validate;

pub use error::{GalleryError, Result};
