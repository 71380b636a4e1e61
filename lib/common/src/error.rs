use oxiri::IriParseError;
use std::fmt;
use std::io;

/// An error raised by any stage of a conversion.
///
/// The core never recovers from these: every variant aborts the current conversion and is
/// surfaced to the caller as is.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// The name or MIME type is not in the format registry.
    #[error("The format '{0}' is unknown")]
    UnknownFormat(String),
    /// The format is registered but can not be read.
    #[error("The format '{0}' has no parser")]
    NoParserForFormat(String),
    /// The format is registered but can not be written.
    #[error("The format '{0}' has no serializer")]
    NoSerializerForFormat(String),
    /// Neither the file name nor the content allowed to pick a format.
    #[error("{}", FormatGuessFailedDisplay(.source_name.as_deref()))]
    FormatGuessFailed {
        /// The name of the source whose format was guessed, if any.
        source_name: Option<String>,
    },
    /// The input is not valid for the selected format.
    #[error(transparent)]
    MalformedInput(#[from] MalformedInputError),
    /// A format with the same name is already registered.
    #[error("The format '{0}' is already registered")]
    DuplicateFormat(String),
    /// The name can not be used as a format name.
    #[error("'{0}' is not a valid format name")]
    InvalidFormatName(String),
    /// The base IRI is invalid.
    #[error("Invalid base IRI '{iri}': {error}")]
    InvalidBaseIri {
        /// The IRI itself.
        iri: String,
        /// The parsing error.
        #[source]
        error: IriParseError,
    },
    /// The parser ran out of its statement or time budget.
    #[error("The parse budget was exceeded: {0}")]
    BudgetExceeded(BudgetExceeded),
    /// Error from the OS I/O layer.
    #[error(transparent)]
    Io(#[from] io::Error),
}

struct FormatGuessFailedDisplay<'a>(Option<&'a str>);

impl fmt::Display for FormatGuessFailedDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(name) => write!(f, "Not able to guess the format of '{name}'"),
            None => f.write_str("Not able to guess the input format"),
        }
    }
}

impl From<ConvertError> for io::Error {
    #[inline]
    fn from(error: ConvertError) -> Self {
        match error {
            ConvertError::Io(error) => error,
            ConvertError::MalformedInput(error) => error.into(),
            _ => Self::new(io::ErrorKind::InvalidInput, error),
        }
    }
}

/// Which limit of a parse budget was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetExceeded {
    /// More statements than allowed were read.
    Statements(usize),
    /// The deadline passed.
    Deadline,
}

impl fmt::Display for BudgetExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Statements(max) => write!(f, "more than {max} statements"),
            Self::Deadline => f.write_str("deadline reached"),
        }
    }
}

/// A syntax error raised by a concrete parser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct MalformedInputError {
    format: String,
    position: Option<TextPosition>,
    message: String,
}

impl MalformedInputError {
    /// Builds an error for the format `format`.
    pub fn new(
        format: impl Into<String>,
        position: Option<TextPosition>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            format: format.into(),
            position,
            message: message.into(),
        }
    }

    /// Builds an error without any position information.
    pub fn msg(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(format, None, message)
    }

    /// The name of the format that was being parsed.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Where the error happened, if the grammar reports it.
    pub fn position(&self) -> Option<TextPosition> {
        self.position
    }

    /// The error message of the parser.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for MalformedInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(
                f,
                "Malformed {} input at {position}: {}",
                self.format, self.message
            ),
            None => write!(f, "Malformed {} input: {}", self.format, self.message),
        }
    }
}

impl From<MalformedInputError> for io::Error {
    #[inline]
    fn from(error: MalformedInputError) -> Self {
        Self::new(io::ErrorKind::InvalidData, error)
    }
}

/// A position in a text: `line` and `column` start at 0, `offset` is in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPosition {
    pub line: u64,
    pub column: u64,
    pub offset: Option<u64>,
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} column {}", self.line + 1, self.column + 1)
    }
}
