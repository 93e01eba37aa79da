//! Configuration types for delta conversion.

use crate::common::{Error, Result};
use crate::ooxml::docx::numbering::ListStyle;
use crate::ooxml::opc::constants::MEDIA_PREFIX;
use serde::{Deserialize, Serialize};

/// Configuration options for delta conversion.
///
/// # Examples
///
/// ```rust
/// use docx_delta::delta::ConvertOptions;
///
/// let options = ConvertOptions::new()
///     .with_hyperlink_style("InternetLink")
///     .with_bullet_text("-");
/// assert_eq!(options.hyperlink_style, "InternetLink");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Character style applied to the run of a hyperlink
    pub hyperlink_style: String,
    /// Member name prefix of image parts
    pub media_prefix: String,
    /// Level text of bullet lists
    pub bullet_text: String,
    /// Level text of ordered lists
    pub ordered_text: String,
    /// Left indent added per list level, in twentieths of a point
    pub indent_step_twips: u32,
    /// Hanging indent of list levels, in twentieths of a point
    pub hanging_twips: u32,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        let list = ListStyle::default();
        Self {
            hyperlink_style: "Hyperlink".to_string(),
            media_prefix: MEDIA_PREFIX.to_string(),
            bullet_text: list.bullet_text,
            ordered_text: list.ordered_text,
            indent_step_twips: list.indent_step_twips,
            hanging_twips: list.hanging_twips,
        }
    }
}

impl ConvertOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a YAML document; missing keys keep their defaults.
    ///
    /// ```rust
    /// use docx_delta::delta::ConvertOptions;
    ///
    /// let options = ConvertOptions::from_yaml_str("bullet_text: \"-\"\n").unwrap();
    /// assert_eq!(options.bullet_text, "-");
    /// assert_eq!(options.ordered_text, "%1.");
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_saphyr::from_str(yaml).map_err(|e| Error::Config(e.to_string()))
    }

    #[inline]
    pub fn with_hyperlink_style(mut self, style_id: impl Into<String>) -> Self {
        self.hyperlink_style = style_id.into();
        self
    }

    #[inline]
    pub fn with_media_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.media_prefix = prefix.into();
        self
    }

    #[inline]
    pub fn with_bullet_text(mut self, text: impl Into<String>) -> Self {
        self.bullet_text = text.into();
        self
    }

    #[inline]
    pub fn with_ordered_text(mut self, text: impl Into<String>) -> Self {
        self.ordered_text = text.into();
        self
    }

    /// Set the per-level indent and hanging indent of list levels.
    #[inline]
    pub fn with_list_indents(mut self, step_twips: u32, hanging_twips: u32) -> Self {
        self.indent_step_twips = step_twips;
        self.hanging_twips = hanging_twips;
        self
    }

    /// The level templates these options describe.
    pub fn list_style(&self) -> ListStyle {
        ListStyle {
            ordered_text: self.ordered_text.clone(),
            bullet_text: self.bullet_text.clone(),
            indent_step_twips: self.indent_step_twips,
            hanging_twips: self.hanging_twips,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_list_style() {
        let options = ConvertOptions::default();
        assert_eq!(options.list_style(), ListStyle::default());
        assert_eq!(options.media_prefix, "word/media/");
    }

    #[test]
    fn test_yaml_overrides() {
        let options = ConvertOptions::from_yaml_str(
            "hyperlink_style: Link\nindent_step_twips: 360\nhanging_twips: 180\n",
        )
        .unwrap();
        assert_eq!(options.hyperlink_style, "Link");
        assert_eq!(options.list_style().indent_step_twips, 360);
        assert_eq!(options.bullet_text, "\u{25CF}");
    }

    #[test]
    fn test_yaml_error_is_config() {
        let err = ConvertOptions::from_yaml_str("indent_step_twips: lots\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
