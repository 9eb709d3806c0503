//! Declared template formats and their comma-separated string form.

use crate::value::Value;

/// An ordered sequence of template format names.
///
/// Accepted by [`crate::UserConfig::set_template_formats`] either as an
/// explicit sequence or as a single comma-separated string, which is split
/// on commas with each entry trimmed. Order is preserved; entries are not
/// deduplicated or validated here.
///
/// # Examples
///
/// ```rust
/// use strata_config::TemplateFormats;
///
/// let formats = TemplateFormats::from("html, njk , md");
/// assert_eq!(formats.as_slice(), ["html", "njk", "md"]);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TemplateFormats(Vec<String>);

impl TemplateFormats {
    /// Borrow the format names in declaration order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Consume the formats, yielding the owned sequence.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for TemplateFormats {
    fn from(value: &str) -> Self {
        Self(value.split(',').map(|format| format.trim().to_owned()).collect())
    }
}

impl From<String> for TemplateFormats {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Vec<String>> for TemplateFormats {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl From<Vec<&str>> for TemplateFormats {
    fn from(value: Vec<&str>) -> Self {
        Self(value.into_iter().map(ToOwned::to_owned).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TemplateFormats {
    fn from(value: [&str; N]) -> Self {
        Self(value.into_iter().map(ToOwned::to_owned).collect())
    }
}

impl From<TemplateFormats> for Value {
    fn from(value: TemplateFormats) -> Self {
        Self::Array(value.into_vec().into_iter().map(Self::String).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_separated_strings_split_and_trim() {
        let formats = TemplateFormats::from("html, njk , md");
        assert_eq!(formats.as_slice(), ["html", "njk", "md"]);
    }

    #[test]
    fn empty_segments_survive_the_split() {
        let formats = TemplateFormats::from("");
        assert_eq!(formats.as_slice(), [""]);
    }

    #[test]
    fn sequences_pass_through_unchanged() {
        let formats = TemplateFormats::from(vec!["md", "html"]);
        assert_eq!(formats.as_slice(), ["md", "html"]);
    }

    #[test]
    fn into_vec_yields_the_owned_entries() {
        let formats = TemplateFormats::from("md, html");
        assert_eq!(formats.into_vec(), ["md", "html"]);
    }
}
