mod api;
mod pages;

pub use api::{download_all, download_file};
pub use pages::{generate_handler, index};
