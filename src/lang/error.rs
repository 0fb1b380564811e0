use super::{Column, LineNumber};

#[derive(Clone, PartialEq)]
pub struct Error {
    code: u16,
    line_number: Option<LineNumber>,
    column: Column,
    message: String,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident, ..$col:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_column($col)
    };
    ($err:ident, $line:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_line_number($line)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, ..$col:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_column($col)
            .message($msg)
    };
    ($err:ident, $line:expr, ..$col:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_line_number($line)
            .in_column($col)
    };
    ($err:ident, $line:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_line_number($line)
            .message($msg)
    };
    ($err:ident, $line:expr, ..$col:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_line_number($line)
            .in_column($col)
            .message($msg)
    };
}

/// Broad classification of an [`Error`] as seen by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Malformed command or argument; the shell stays usable.
    Parse,
    /// Rejected by a compiler stage. Only reported through `CompileError`.
    Compile,
    /// Raised inside the executing script.
    Runtime,
    /// Operation not valid in the current shell state.
    State,
    /// File system trouble.
    Io,
    /// The execution engine could not be constructed.
    Fatal,
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code: code as u16,
            line_number: None,
            column: 0..0,
            message: String::new(),
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code as u16
    }

    pub fn line_number(&self) -> Option<LineNumber> {
        self.line_number
    }

    pub fn column(&self) -> Column {
        self.column.clone()
    }

    pub fn text(&self) -> &str {
        &self.message
    }

    pub fn in_line_number(&self, line: LineNumber) -> Error {
        Error {
            code: self.code,
            line_number: Some(line),
            column: self.column.clone(),
            message: self.message.clone(),
        }
    }

    /// Attach a line number only when the error does not already carry one.
    pub fn or_line_number(self, line: Option<LineNumber>) -> Error {
        match (self.line_number, line) {
            (None, Some(line)) => self.in_line_number(line),
            _ => self,
        }
    }

    pub fn in_column(&self, column: &Column) -> Error {
        Error {
            code: self.code,
            line_number: self.line_number,
            column: column.clone(),
            message: self.message.clone(),
        }
    }

    pub fn message(&self, message: &str) -> Error {
        Error {
            code: self.code,
            line_number: self.line_number,
            column: self.column.clone(),
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> Kind {
        match self.code {
            2 | 70 => Kind::Parse,
            53 | 57 | 58 | 64 | 66 => Kind::Io,
            71 | 72 | 74 => Kind::State,
            73 => Kind::Fatal,
            _ => Kind::Runtime,
        }
    }

    fn code_str(&self) -> &'static str {
        match self.code {
            1 => "NEXT WITHOUT FOR",
            2 => "SYNTAX ERROR",
            3 => "RETURN WITHOUT GOSUB",
            5 => "ILLEGAL FUNCTION CALL",
            6 => "OVERFLOW",
            7 => "OUT OF MEMORY",
            8 => "UNDEFINED LINE",
            11 => "DIVISION BY ZERO",
            13 => "TYPE MISMATCH",
            18 => "UNDEFINED FUNCTION",
            23 => "LINE BUFFER OVERFLOW",
            26 => "FOR WITHOUT NEXT",
            51 => "INTERNAL ERROR",
            53 => "FILE NOT FOUND",
            57 => "DISK I/O ERROR",
            58 => "FILE ALREADY EXISTS",
            64 => "BAD FILE NAME",
            66 => "DIRECT STATEMENT IN FILE",
            70 => "Unknown command",
            71 => "ILLEGAL STATE",
            72 => "NO CART OPEN",
            73 => "ENGINE FAILURE",
            74 => "NOTHING TO SAVE",
            75 => "BREAK",
            _ => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NextWithoutFor = 1,
    SyntaxError = 2,
    ReturnWithoutGosub = 3,
    IllegalFunctionCall = 5,
    Overflow = 6,
    OutOfMemory = 7,
    UndefinedLine = 8,
    DivisionByZero = 11,
    TypeMismatch = 13,
    UndefinedFunction = 18,
    LineBufferOverflow = 23,
    ForWithoutNext = 26,
    InternalError = 51,
    FileNotFound = 53,
    DiskIoError = 57,
    FileAlreadyExists = 58,
    BadFileName = 64,
    DirectStatementInFile = 66,
    UnknownCommand = 70,
    InvalidState = 71,
    NoCart = 72,
    EngineFailure = 73,
    NothingToSave = 74,
    Break = 75,
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Error {
        let msg = error.to_string();
        match error.kind() {
            std::io::ErrorKind::NotFound => error!(FileNotFound; &msg),
            std::io::ErrorKind::AlreadyExists => error!(FileAlreadyExists; &msg),
            _ => error!(DiskIoError; &msg),
        }
    }
}

impl std::error::Error for Error {}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let code_str = self.code_str();
        let mut suffix = String::new();
        if let Some(line_number) = self.line_number {
            suffix.push_str(&format!(" {}", line_number));
        }
        if (0..0) != self.column {
            suffix.push_str(&format!(" ({}..{})", self.column.start, self.column.end));
        }
        if code_str.is_empty() {
            return write!(f, "PROGRAM ERROR {}", self.code);
        }
        if suffix.is_empty() {
            if self.message.is_empty() {
                write!(f, "{}", code_str)
            } else {
                write!(f, "{}: {}", code_str, self.message)
            }
        } else if self.message.is_empty() {
            write!(f, "{} IN{}", code_str, suffix)
        } else {
            write!(f, "{} IN{}; {}", code_str, suffix, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_direct() {
        assert_eq!(error!(SyntaxError).to_string(), "SYNTAX ERROR");
        assert_eq!(
            error!(UnknownCommand; "FOO").to_string(),
            "Unknown command: FOO"
        );
    }

    #[test]
    fn test_display_located() {
        let e = error!(SyntaxError, 10, ..&(4..6); "EXPECTED EXPRESSION");
        assert_eq!(e.to_string(), "SYNTAX ERROR IN 10 (4..6); EXPECTED EXPRESSION");
        assert_eq!(error!(Break, 20).to_string(), "BREAK IN 20");
    }

    #[test]
    fn test_or_line_number_keeps_existing() {
        let e = error!(Overflow, 10).or_line_number(Some(20));
        assert_eq!(e.line_number(), Some(10));
        let e = error!(Overflow).or_line_number(Some(20));
        assert_eq!(e.line_number(), Some(20));
    }

    #[test]
    fn test_kind() {
        assert_eq!(error!(UnknownCommand).kind(), Kind::Parse);
        assert_eq!(error!(DivisionByZero, 10).kind(), Kind::Runtime);
        assert_eq!(error!(InvalidState).kind(), Kind::State);
        assert_eq!(error!(FileNotFound).kind(), Kind::Io);
    }
}
