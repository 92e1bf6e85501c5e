use std::sync::OnceLock;
use tera::Tera;

static TERA: OnceLock<Tera> = OnceLock::new();

pub fn get_tera() -> &'static Tera {
    TERA.get_or_init(|| {
        let mut tera = Tera::default();
        if let Err(e) = tera.add_template_files([("templates/index.html", Some("index.html"))]) {
            tracing::error!("failed to load templates: {}", e);
        }
        tera
    })
}
