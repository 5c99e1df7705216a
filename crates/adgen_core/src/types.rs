use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Opaque, server-assigned identifier of one generation job.
pub type TaskId = String;

/// Writing style the backend applies to the generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Style {
    /// Short, punchy copy.
    #[default]
    Brief,
    /// Detailed listing text.
    Professional,
    /// Informal social-media post.
    Social,
}

impl Style {
    pub const ALL: [Style; 3] = [Style::Brief, Style::Professional, Style::Social];

    /// Value sent in the `style` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            Style::Brief => "brief",
            Style::Professional => "professional",
            Style::Social => "social",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStyle(pub String);

impl fmt::Display for UnknownStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown style {:?}", self.0)
    }
}

impl std::error::Error for UnknownStyle {}

impl FromStr for Style {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Style::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownStyle(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Characteristic {
    pub name: String,
    pub value: String,
}

/// Terminal success payload of a task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdResult {
    /// In the order the backend returned them.
    pub characteristics: Vec<Characteristic>,
    pub ad_text: String,
}

/// Where the result screen takes its image preview from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewSource {
    /// Derived from the image selected in this run.
    Fresh(String),
    /// Read back from the session record after a reload.
    Cached(String),
}

impl PreviewSource {
    pub fn url(&self) -> &str {
        match self {
            PreviewSource::Fresh(url) | PreviewSource::Cached(url) => url,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, PreviewSource::Cached(_))
    }
}

/// A file the user picked for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSelection {
    pub path: PathBuf,
    /// Declared media type, e.g. `image/jpeg`.
    pub media_type: String,
    pub style: Style,
}

impl ImageSelection {
    pub fn preview_url(&self) -> String {
        fresh_preview_url(&self.path)
    }
}

/// Local preview reference for a selected file: a `file://` URL when the path
/// is absolute, the plain path otherwise.
pub fn fresh_preview_url(path: &Path) -> String {
    match url::Url::from_file_path(path) {
        Ok(url) => url.to_string(),
        Err(()) => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_parses_wire_names_case_insensitively() {
        assert_eq!("brief".parse::<Style>(), Ok(Style::Brief));
        assert_eq!(" Social ".parse::<Style>(), Ok(Style::Social));
        assert_eq!(
            "modernist".parse::<Style>(),
            Err(UnknownStyle("modernist".to_string()))
        );
    }

    #[cfg(unix)]
    #[test]
    fn absolute_paths_become_file_urls() {
        let url = fresh_preview_url(Path::new("/tmp/house photo.jpg"));
        assert_eq!(url, "file:///tmp/house%20photo.jpg");
    }

    #[test]
    fn relative_paths_are_kept_verbatim() {
        assert_eq!(fresh_preview_url(Path::new("house.png")), "house.png");
    }
}
