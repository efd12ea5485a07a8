//! File Selector: captures one resume file from a drop or the picker dialog
//! and hands it to a single callback.
//!
//! Nothing is rejected here. Type and size limits are advisory: files outside
//! them are logged via [`advisory_warnings`] and still passed through.

use std::fmt;

use tracing::{debug, warn};

use crate::models::SelectedFile;

pub const HINT_TEXT: &str = "PDF or Text files (Max 5MB)";
pub const EMPTY_LABEL: &str = "Upload your resume";
pub const READY_LABEL: &str = "Ready to analyze";

pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "txt"];
pub const ADVISORY_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Input events from the drop zone and the picker.
#[derive(Debug, Clone)]
pub enum FileEvent {
    DragEnter,
    DragOver,
    DragLeave,
    /// Files in the order the platform listed them.
    Drop(Vec<SelectedFile>),
    PickerChange(Vec<SelectedFile>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryWarning {
    TooLarge { size: usize, limit: usize },
    UnexpectedType { extension: Option<String> },
}

impl fmt::Display for AdvisoryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisoryWarning::TooLarge { size, limit } => {
                write!(f, "file is {size} bytes, above the advised {limit}")
            }
            AdvisoryWarning::UnexpectedType {
                extension: Some(ext),
            } => write!(f, "'.{ext}' is not a PDF or text file"),
            AdvisoryWarning::UnexpectedType { extension: None } => {
                write!(f, "file has no extension")
            }
        }
    }
}

/// Checks a file against the advisory hints. Never blocks the file.
pub fn advisory_warnings(file: &SelectedFile) -> Vec<AdvisoryWarning> {
    let mut warnings = Vec::new();
    if file.size() > ADVISORY_MAX_BYTES {
        warnings.push(AdvisoryWarning::TooLarge {
            size: file.size(),
            limit: ADVISORY_MAX_BYTES,
        });
    }
    let extension = file.extension();
    let accepted = extension
        .as_deref()
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext));
    if !accepted {
        warnings.push(AdvisoryWarning::UnexpectedType { extension });
    }
    warnings
}

type OnSelect = Box<dyn FnMut(SelectedFile) + Send>;

pub struct FileSelector {
    on_select: OnSelect,
    drag_active: bool,
    loading: bool,
    current_name: Option<String>,
}

impl FileSelector {
    pub fn new(on_select: impl FnMut(SelectedFile) + Send + 'static) -> Self {
        Self {
            on_select: Box::new(on_select),
            drag_active: false,
            loading: false,
            current_name: None,
        }
    }

    /// Applies one input event. Returns true when the callback fired.
    pub fn handle(&mut self, event: FileEvent) -> bool {
        match event {
            FileEvent::DragEnter | FileEvent::DragOver => {
                self.drag_active = true;
                false
            }
            FileEvent::DragLeave => {
                self.drag_active = false;
                false
            }
            FileEvent::Drop(files) => {
                self.drag_active = false;
                self.capture(files)
            }
            FileEvent::PickerChange(files) => {
                if self.loading {
                    debug!("Picker change ignored while loading");
                    return false;
                }
                self.capture(files)
            }
        }
    }

    /// Extra files beyond the first are dropped without notice.
    fn capture(&mut self, files: Vec<SelectedFile>) -> bool {
        let Some(file) = files.into_iter().next() else {
            return false;
        };

        for warning in advisory_warnings(&file) {
            warn!("Resume {}: {}", file.name(), warning);
        }

        self.current_name = Some(file.name().to_string());
        (self.on_select)(file);
        true
    }

    /// Disables the picker while an analysis is running.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_drag_active(&self) -> bool {
        self.drag_active
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_ready(&self) -> bool {
        self.current_name.is_some() && !self.loading
    }

    pub fn display_name(&self) -> &str {
        self.current_name.as_deref().unwrap_or(EMPTY_LABEL)
    }
}
