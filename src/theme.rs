use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub text_color: String,
    pub fill_active: String,
    pub fill_common: String,
    pub stroke_active: String,
    pub stroke_common: String,
    pub stroke_full: String,
    pub background: String,
}

impl Theme {
    /// The product palette: magenta highlights on near-white glyphs.
    pub fn clinical() -> Self {
        Self {
            font_family: "SF Pro Display, -apple-system, system-ui, sans-serif".to_string(),
            text_color: "#525252".to_string(),
            fill_active: "#C85FC4".to_string(),
            fill_common: "#FFFCFF".to_string(),
            stroke_active: "#C85FC4".to_string(),
            stroke_common: "#AEAEAE".to_string(),
            stroke_full: "#000000".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    /// Monochrome variant for printed charts.
    pub fn print() -> Self {
        Self {
            font_family: "SF Pro Display, -apple-system, system-ui, sans-serif".to_string(),
            text_color: "#000000".to_string(),
            fill_active: "#444444".to_string(),
            fill_common: "#FFFFFF".to_string(),
            stroke_active: "#000000".to_string(),
            stroke_common: "#666666".to_string(),
            stroke_full: "#000000".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}
