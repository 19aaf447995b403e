//! TrueType font discovery.
//!
//! No font is embedded. A configured path is tried first, then a list of
//! common system locations. Without any font the maps are still drawn, only
//! the glyphs are missing.

use std::path::{Path, PathBuf};

use rusttype::Font;
use tracing::{debug, warn};

const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Regular and bold faces used for map text.
#[derive(Default)]
pub struct FontSet {
    regular: Option<Font<'static>>,
    bold: Option<Font<'static>>,
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("regular", &self.regular.is_some())
            .field("bold", &self.bold.is_some())
            .finish()
    }
}

impl FontSet {
    /// No fonts; text is skipped.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the configured font, falling back to system fonts.
    ///
    /// The bold face comes from the system list; when none is found the
    /// regular face is used for bold text too.
    pub fn load(configured: Option<&Path>) -> Self {
        let regular = match configured {
            Some(path) => load_font(path).or_else(|| {
                warn!(path = %path.display(), "Configured font unusable, trying system fonts");
                first_available(REGULAR_CANDIDATES)
            }),
            None => first_available(REGULAR_CANDIDATES),
        };
        let bold = first_available(BOLD_CANDIDATES);

        Self { regular, bold }
    }

    pub fn is_empty(&self) -> bool {
        self.regular.is_none() && self.bold.is_none()
    }

    /// Face for the requested weight, falling back to the other weight.
    pub fn face(&self, bold: bool) -> Option<&Font<'static>> {
        if bold {
            self.bold.as_ref().or(self.regular.as_ref())
        } else {
            self.regular.as_ref().or(self.bold.as_ref())
        }
    }
}

fn first_available(candidates: &[&str]) -> Option<Font<'static>> {
    candidates
        .iter()
        .map(PathBuf::from)
        .filter(|p| p.is_file())
        .find_map(|p| load_font(&p))
}

fn load_font(path: &Path) -> Option<Font<'static>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Font not readable");
            return None;
        }
    };

    match Font::try_from_vec(bytes) {
        Some(font) => {
            debug!(path = %path.display(), "Loaded font");
            Some(font)
        }
        None => {
            warn!(path = %path.display(), "Not a usable TrueType font");
            None
        }
    }
}
