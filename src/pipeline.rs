//! One request-scoped redesign run: recolor, optionally remap,
//! serialize.

use crate::advisor::ColorScheme;
use crate::deck::Presentation;
use crate::error::{Error, Result};
use crate::remap::{self, RemapWarning};
use crate::style;
use std::fmt;
use std::path::{Path, PathBuf};

/// What to do to a deck.
#[derive(Debug, Clone)]
pub struct DesignOptions {
    /// Colors to apply: background fill plus title/body text colors.
    pub scheme: ColorScheme,
    /// Layout template index to rebuild slides under, if any.
    pub layout: Option<usize>,
}

impl DesignOptions {
    pub fn new(scheme: ColorScheme) -> Self {
        Self {
            scheme,
            layout: None,
        }
    }

    pub fn with_layout(mut self, layout_index: usize) -> Self {
        self.layout = Some(layout_index);
        self
    }
}

/// A degraded-but-successful condition from a run.
///
/// These never fail the run; the recolored deck is still produced and
/// the condition is carried here so the caller can tell the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesignWarning {
    /// The requested layout index does not exist; the remap step was
    /// skipped.
    InvalidLayout { index: usize, count: usize },
    /// No slide had extractable text; the remap step was skipped.
    NoExtractableContent,
    /// Per-slide remap condition.
    Remap(RemapWarning),
}

impl fmt::Display for DesignWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesignWarning::InvalidLayout { index, count } => write!(
                f,
                "layout {index} does not exist (the deck has {count} layout(s)); slides were not rebuilt"
            ),
            DesignWarning::NoExtractableContent => {
                write!(f, "no extractable content in any slide; slides were not rebuilt")
            }
            DesignWarning::Remap(warning) => warning.fmt(f),
        }
    }
}

/// What happened during a run, beyond the output bytes.
#[derive(Debug, Clone, Default)]
pub struct DesignReport {
    pub warnings: Vec<DesignWarning>,
    /// Slides appended by the remap step, separator included.
    pub slides_appended: usize,
    pub separator_added: bool,
}

impl DesignReport {
    /// True when nothing degraded.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// A finished run: the output deck and its report.
#[derive(Debug, Clone)]
pub struct Designed {
    pub bytes: Vec<u8>,
    pub report: DesignReport,
}

/// Run the full redesign over .pptx bytes.
///
/// Recolors every slide (background, then title/body run colors), then
/// rebuilds slides under the requested layout when one was asked for.
/// The remap's two abortive conditions degrade into report warnings
/// while recoloring stands; anything else is a hard failure and no
/// output is produced.
pub fn redesign_bytes(data: &[u8], options: &DesignOptions) -> Result<Designed> {
    let mut prs = Presentation::from_bytes(data.to_vec())?;

    style::apply_background(&mut prs, &options.scheme.background)?;
    style::apply_text_colors(&mut prs, &options.scheme.title, &options.scheme.body)?;

    let mut report = DesignReport::default();
    if let Some(layout_index) = options.layout {
        match remap::remap(&mut prs, layout_index) {
            Ok(summary) => {
                report.slides_appended = summary.appended;
                report.separator_added = summary.separator_added;
                report
                    .warnings
                    .extend(summary.warnings.into_iter().map(DesignWarning::Remap));
            }
            Err(Error::InvalidLayout { index, count }) => {
                report
                    .warnings
                    .push(DesignWarning::InvalidLayout { index, count });
            }
            Err(Error::NoExtractableContent) => {
                report.warnings.push(DesignWarning::NoExtractableContent);
            }
            Err(other) => return Err(other),
        }
    }

    Ok(Designed {
        bytes: prs.save_to_bytes()?,
        report,
    })
}

/// Run the full redesign over a file, writing the result next to it
/// under the derived name `designed_<originalName>`.
///
/// Returns the output path and the run's report.
pub fn redesign_file(
    path: impl AsRef<Path>,
    options: &DesignOptions,
) -> Result<(PathBuf, DesignReport)> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let designed = redesign_bytes(&data, options)?;

    let original_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "presentation.pptx".to_string());
    let output = path.with_file_name(designed_filename(&original_name));
    std::fs::write(&output, &designed.bytes)?;
    Ok((output, designed.report))
}

/// The derived output filename for a source deck.
pub fn designed_filename(original: &str) -> String {
    format!("designed_{original}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_designed_filename() {
        assert_eq!(designed_filename("quarterly.pptx"), "designed_quarterly.pptx");
    }

    #[test]
    fn test_warning_display() {
        let warning = DesignWarning::InvalidLayout { index: 7, count: 3 };
        assert_eq!(
            warning.to_string(),
            "layout 7 does not exist (the deck has 3 layout(s)); slides were not rebuilt"
        );
        assert_eq!(
            DesignWarning::NoExtractableContent.to_string(),
            "no extractable content in any slide; slides were not rebuilt"
        );
    }
}
