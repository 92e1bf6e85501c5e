use std::path::PathBuf;

#[derive(Clone)]
pub struct Config {
    pub upload_folder: PathBuf,
    pub output_folder: PathBuf,
    pub font_regular: Option<PathBuf>,
    pub font_bold: Option<PathBuf>,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();

        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let upload_folder = base_dir.join(
            std::env::var("UPLOAD_FOLDER").unwrap_or_else(|_| "uploads".to_string()),
        );
        let output_folder = base_dir.join(
            std::env::var("OUTPUT_FOLDER").unwrap_or_else(|_| "certificates".to_string()),
        );

        // Unset means probe the platform's usual serif locations at startup.
        let font_regular = std::env::var("FONT_REGULAR").ok().map(PathBuf::from);
        let font_bold = std::env::var("FONT_BOLD").ok().map(PathBuf::from);

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .unwrap_or(5000);

        Ok(Self {
            upload_folder,
            output_folder,
            font_regular,
            font_bold,
            host,
            port,
        })
    }
}
