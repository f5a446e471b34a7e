use thiserror::Error;

/// Line/column pair inside a document (both 1-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Where an error happened: always the file, and a position when the
/// underlying failure exposed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Document identity (the id handed to the loader).
    pub file: String,
    /// Optional position inside the file.
    pub position: Option<Position>,
}

impl SourceLocation {
    /// Location naming only the file.
    pub fn file(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            position: None,
        }
    }

    /// Location with a precise line and column.
    pub fn at(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            position: Some(Position { line, column }),
        }
    }

    /// Line number, when known.
    pub fn line(&self) -> Option<usize> {
        self.position.map(|p| p.line)
    }

    /// Column number, when known.
    pub fn column(&self) -> Option<usize> {
        self.position.map(|p| p.column)
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some(Position { line, column }) => write!(f, "{}:{}:{}", self.file, line, column),
            None => write!(f, "{}", self.file),
        }
    }
}

/// What went wrong with a frontmatter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterErrorKind {
    /// The YAML itself failed to parse.
    Syntax,
    /// Opening `---` without a closing fence.
    Unterminated,
    /// The block parsed, but its root is not a mapping.
    NotAMapping,
}

/// Malformed metadata block at the top of a markdown document.
#[derive(Debug, Clone, Error)]
#[error("{message} ({location})")]
pub struct FrontmatterError {
    /// Human-readable reason.
    pub message: String,
    /// File plus line/column when available.
    pub location: SourceLocation,
    /// Failure category.
    pub kind: FrontmatterErrorKind,
}

impl FrontmatterError {
    /// Creates an error of the given kind.
    pub fn new(
        kind: FrontmatterErrorKind,
        message: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self {
            message: message.into(),
            location,
            kind,
        }
    }

    /// Replaces the message, keeping the location.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// Replaces the location, keeping the message.
    pub fn set_location(&mut self, location: SourceLocation) {
        self.location = location;
    }
}

/// Non-fatal diagnostics raised while loading a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// The legacy `setup` frontmatter key (components in `.md` files).
    DeprecatedSetup {
        /// Document identity.
        file: String,
    },
}

impl LoadWarning {
    /// File the warning refers to.
    pub fn file(&self) -> &str {
        match self {
            LoadWarning::DeprecatedSetup { file } => file,
        }
    }
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadWarning::DeprecatedSetup { file } => write!(
                f,
                "[{}] Astro now supports MDX! Support for components in \".md\" (or alternative \
                 extensions like \".markdown\") files using the \"setup\" frontmatter is no longer \
                 enabled by default. Migrate this file to MDX.",
                file
            ),
        }
    }
}
