//! Errors raised while decoding an AFP stream.

/// One variant per way a parse can fail.  The string payload is the
/// site-specific message; the MO:DCA exception code (where the architecture
/// defines one) comes from [`ErrorKind::modca_code`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("{0}")]
    EndOfFile(String),
    #[error("{0}")]
    InvalidStructuredField(String),
    #[error("{0}")]
    RequiredParameterMissing(String),
    #[error("{0}")]
    EndOfStream(String),
    #[error("{0}")]
    UnrecognizedStructuredField(String),
    #[error("{0}")]
    PaddingNotImplemented(String),
    #[error("{0}")]
    InvalidTriplet(String),
    #[error("{0}")]
    UnrecognizedTriplet(String),
    #[error("{0}")]
    InvalidControlSequence(String),
    #[error("{0}")]
    UnknownFunction(String),
    #[error("{0}")]
    RepeatingGroup(String),
    #[error("{0}")]
    UnrecognizedIdentifierCode(String),
    #[error("{0}")]
    IncompleteParameter(String),
    #[error("Error reading file: {0}")]
    Io(String),
}

impl ErrorKind {
    /// The exception code from the MO:DCA reference.  Zero means an error
    /// the architecture does not assign a code to.
    pub fn modca_code(&self) -> u8 {
        match self {
            ErrorKind::RequiredParameterMissing(_) => 0x04,
            ErrorKind::UnrecognizedStructuredField(_) => 0x10,
            ErrorKind::UnrecognizedTriplet(_) => 0x10,
            ErrorKind::UnrecognizedIdentifierCode(_) => 0x40,
            ErrorKind::IncompleteParameter(_) => 0x02,
            _ => 0x00,
        }
    }
}

/// A fatal parse error, annotated by the stream driver with the 1-based
/// ordinal of the structured field being read and the byte offset at which
/// that field starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub field_no: Option<u64>,
    pub field_start_offset: Option<u64>,
}

impl ParseError {
    pub fn new(kind: ErrorKind) -> ParseError {
        ParseError {
            kind,
            field_no: None,
            field_start_offset: None,
        }
    }

    pub fn modca_code(&self) -> u8 {
        self.kind.modca_code()
    }

    /// The code-prefixed message without the field/offset context, as
    /// recorded for non-fatal exceptions.
    pub fn message(&self) -> String {
        let code = self.kind.modca_code();
        if code == 0 {
            self.kind.to_string()
        } else {
            format!("0x{:02X} {}", code, self.kind)
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())?;
        let mut sep = " -";
        if let Some(n) = self.field_no {
            write!(f, "{} field {}", sep, n)?;
            sep = ";";
        }
        if let Some(o) = self.field_start_offset {
            write!(f, "{} start offset {}", sep, o)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<ErrorKind> for ParseError {
    fn from(kind: ErrorKind) -> ParseError {
        ParseError::new(kind)
    }
}

#[test]
fn test_display_without_context() {
    let e = ParseError::new(ErrorKind::InvalidTriplet(String::from(
        "Not enough data to parse triplet 1 Id",
    )));
    assert_eq!(e.to_string(), "Not enough data to parse triplet 1 Id");
}

#[test]
fn test_display_with_code_and_context() {
    let mut e = ParseError::new(ErrorKind::UnrecognizedStructuredField(String::from(
        "Unrecognized structured field 0xD3FFFF",
    )));
    e.field_no = Some(1);
    e.field_start_offset = Some(0);
    assert_eq!(
        e.to_string(),
        "0x10 Unrecognized structured field 0xD3FFFF - field 1; start offset 0"
    );
}

#[test]
fn test_modca_codes() {
    assert_eq!(
        ErrorKind::RequiredParameterMissing(String::new()).modca_code(),
        0x04
    );
    assert_eq!(
        ErrorKind::IncompleteParameter(String::new()).modca_code(),
        0x02
    );
    assert_eq!(
        ErrorKind::UnrecognizedIdentifierCode(String::new()).modca_code(),
        0x40
    );
    assert_eq!(ErrorKind::InvalidTriplet(String::new()).modca_code(), 0x00);
}
