//! Cell formatting
//!
//! Formatting never influences evaluation; the engine only carries it along.

mod alignment;

pub use alignment::TextAlign;

/// Formatting attributes of a cell
///
/// Every attribute is optional. Unset attributes fall back to whatever the
/// presentation layer uses by default.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct CellFormat {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub bold: Option<bool>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub italic: Option<bool>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub underline: Option<bool>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub text_align: Option<TextAlign>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub text_color: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub background_color: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub font_size: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub font_family: Option<String>,
    /// Shorthand text color used by older documents
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub color: Option<String>,
}

impl CellFormat {
    /// Create an empty format
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bold
    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    /// Set italic
    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    /// Set horizontal alignment
    pub fn align(mut self, align: TextAlign) -> Self {
        self.text_align = Some(align);
        self
    }

    /// Set text color
    pub fn text_color<S: Into<String>>(mut self, color: S) -> Self {
        self.text_color = Some(color.into());
        self
    }

    /// Overlay every attribute set in `patch` onto this format
    pub fn merge(&mut self, patch: &CellFormat) {
        fn overlay<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if let Some(v) = value {
                *target = Some(v.clone());
            }
        }

        overlay(&mut self.bold, &patch.bold);
        overlay(&mut self.italic, &patch.italic);
        overlay(&mut self.underline, &patch.underline);
        overlay(&mut self.text_align, &patch.text_align);
        overlay(&mut self.text_color, &patch.text_color);
        overlay(&mut self.background_color, &patch.background_color);
        overlay(&mut self.font_size, &patch.font_size);
        overlay(&mut self.font_family, &patch.font_family);
        overlay(&mut self.color, &patch.color);
    }

    /// Check if no attribute is set
    pub fn is_empty(&self) -> bool {
        *self == CellFormat::default()
    }
}
