pub mod config;
pub mod error;
pub mod fonts;
pub mod id;
pub mod pdf;
pub mod pipeline;
pub mod render;
pub mod routes;
pub mod sheet;
pub mod state;
pub mod storage;
pub mod templates;
