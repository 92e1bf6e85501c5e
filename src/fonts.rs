use ab_glyph::FontVec;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

// Probed in order when no explicit path is configured. Any serif face with a
// regular/bold pair works; metrics differ slightly between families.
const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
    "/usr/share/fonts/truetype/liberation2/LiberationSerif-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSerif.ttf",
    "/usr/share/fonts/TTF/DejaVuSerif.ttf",
    "/usr/share/fonts/liberation-serif/LiberationSerif-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Times New Roman.ttf",
    "C:\\Windows\\Fonts\\times.ttf",
];

const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Bold.ttf",
    "/usr/share/fonts/truetype/liberation2/LiberationSerif-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif-Bold.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSerifBold.ttf",
    "/usr/share/fonts/TTF/DejaVuSerif-Bold.ttf",
    "/usr/share/fonts/liberation-serif/LiberationSerif-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Times New Roman Bold.ttf",
    "C:\\Windows\\Fonts\\timesbd.ttf",
];

/// The two serif faces every render needs, resolved once at startup.
#[derive(Debug)]
pub struct FontSet {
    pub regular: FontVec,
    pub bold: FontVec,
}

impl FontSet {
    pub fn load(regular: Option<&Path>, bold: Option<&Path>) -> Result<Self> {
        Ok(Self {
            regular: load_face(regular, REGULAR_CANDIDATES, "FONT_REGULAR")?,
            bold: load_face(bold, BOLD_CANDIDATES, "FONT_BOLD")?,
        })
    }
}

fn load_face(configured: Option<&Path>, candidates: &[&str], env_var: &str) -> Result<FontVec> {
    let path = match configured {
        Some(p) => p.to_path_buf(),
        None => candidates
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
            .ok_or_else(|| {
                Error::FontLoad(format!(
                    "no serif face found in the usual locations; set {} or install fonts-liberation",
                    env_var
                ))
            })?,
    };

    let data = std::fs::read(&path)
        .map_err(|e| Error::FontLoad(format!("{}: {}", path.display(), e)))?;
    FontVec::try_from_vec(data)
        .map_err(|_| Error::FontLoad(format!("{} is not a parseable font", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_path_that_does_not_exist_is_a_font_error() {
        let missing = Path::new("/definitely/not/a/font.ttf");
        let err = FontSet::load(Some(missing), Some(missing)).unwrap_err();
        assert!(matches!(err, Error::FontLoad(_)));
    }

    #[test]
    fn probe_finds_a_face_or_reports_the_env_override() {
        match FontSet::load(None, None) {
            Ok(fonts) => {
                use ab_glyph::Font;
                assert!(fonts.regular.glyph_count() > 0);
                assert!(fonts.bold.glyph_count() > 0);
            }
            Err(Error::FontLoad(msg)) => assert!(msg.contains("FONT_")),
            Err(other) => panic!("unexpected error: {}", other),
        }
    }
}
