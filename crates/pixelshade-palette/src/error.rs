use std::fmt;

/// An error produced while reading a palette or generating shader code from it.
#[derive(Debug, Clone, PartialEq)]
pub enum PaletteError {
    /// A non-blank line is not `#` followed by exactly 6 hex digits.
    MalformedHex {
        /// 1-based line number in the palette source.
        line: usize,
        text: String,
    },
    /// The palette contains no entries.
    Empty,
    /// The shader template does not contain the palette marker.
    MissingMarker { marker: &'static str },
}

impl fmt::Display for PaletteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaletteError::MalformedHex { line, text } => write!(
                f,
                "malformed hex '{text}' on line {line}; expecting a # followed by 6 hex digits"
            ),
            PaletteError::Empty => write!(f, "palette has no colors"),
            PaletteError::MissingMarker { marker } => {
                write!(f, "shader template is missing the `{marker}` marker")
            }
        }
    }
}

impl std::error::Error for PaletteError {}
