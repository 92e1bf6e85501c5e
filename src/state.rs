use crate::config::Config;
use crate::fonts::FontSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fonts: Arc<FontSet>,
}
