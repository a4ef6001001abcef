//! Stable error codes.
//!
//! | Range | Phase |
//! |---|---|
//! | `E0xxx` | tokenizer |
//! | `E1xxx` | parser |
//! | `E3xxx` | static conflicts, in declaration order of the conflict kinds |
//! | `E6xxx` | runtime exceptions |

use std::fmt;

/// Every code the toolchain can report.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCode {
    // Tokenizer
    /// Unrecognized glyph or unterminated literal
    E0001,

    // Parser
    /// Unparsable expression
    E1001,
    /// Unparsable type
    E1002,

    // Conflicts
    /// Unknown name
    E3001,
    /// Unknown type name
    E3002,
    /// Bind value does not match its declared type
    E3003,
    /// Input value does not match the input's type
    E3004,
    /// Required input missing from an evaluation
    E3005,
    /// More inputs than the function declares
    E3006,
    /// Evaluating something that is not a function
    E3007,
    /// Name defined twice in one scope
    E3008,
    /// Names that differ only by case
    E3009,
    /// Condition is not boolean
    E3010,
    /// Operand type does not fit the operator
    E3011,
    /// Operand units do not match
    E3012,
    /// Unknown property
    E3013,
    /// Expected a stream
    E3014,
    /// `.` outside a reaction or conversion
    E3015,
    /// Row is missing a cell
    E3016,
    /// Row has too many cells
    E3017,
    /// Cell does not match its column type
    E3018,
    /// Column without a type
    E3019,
    /// Unknown column
    E3020,
    /// Query is not boolean
    E3021,
    /// Sources borrow each other in a cycle
    E3022,
    /// Binds depend on each other in a cycle
    E3023,
    /// Borrowed source or name does not exist
    E3024,
    /// Block does not end with an expression
    E3025,
    /// Expression value is never used
    E3026,
    /// Structure does not implement an interface function
    E3027,
    /// Function body does not match its output type
    E3028,
    /// Placeholder left in the program
    E3029,
    /// Unparsable syntax
    E3030,
    /// No conversion between two types
    E3031,
    /// Required input after an optional one
    E3032,

    // Runtime
    /// Unknown name at runtime
    E6001,
    /// Value of the wrong type
    E6002,
    /// Wrong number of inputs
    E6003,
    /// Missing input
    E6004,
    /// Not a function
    E6005,
    /// Unknown property
    E6006,
    /// Missing conversion
    E6007,
    /// Division by zero
    E6008,
    /// Step limit exceeded
    E6009,
    /// Call depth limit exceeded
    E6010,
    /// Placeholder evaluated
    E6011,
    /// Unparsable code evaluated
    E6012,
    /// Expected a value, found none
    E6013,
    /// Unknown stream
    E6014,
}

impl ErrorCode {
    /// Conflict codes, in declaration order.
    pub const CONFLICTS: [ErrorCode; 32] = [
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E3005,
        ErrorCode::E3006,
        ErrorCode::E3007,
        ErrorCode::E3008,
        ErrorCode::E3009,
        ErrorCode::E3010,
        ErrorCode::E3011,
        ErrorCode::E3012,
        ErrorCode::E3013,
        ErrorCode::E3014,
        ErrorCode::E3015,
        ErrorCode::E3016,
        ErrorCode::E3017,
        ErrorCode::E3018,
        ErrorCode::E3019,
        ErrorCode::E3020,
        ErrorCode::E3021,
        ErrorCode::E3022,
        ErrorCode::E3023,
        ErrorCode::E3024,
        ErrorCode::E3025,
        ErrorCode::E3026,
        ErrorCode::E3027,
        ErrorCode::E3028,
        ErrorCode::E3029,
        ErrorCode::E3030,
        ErrorCode::E3031,
        ErrorCode::E3032,
    ];

    /// Runtime exception codes, in declaration order.
    pub const EXCEPTIONS: [ErrorCode; 14] = [
        ErrorCode::E6001,
        ErrorCode::E6002,
        ErrorCode::E6003,
        ErrorCode::E6004,
        ErrorCode::E6005,
        ErrorCode::E6006,
        ErrorCode::E6007,
        ErrorCode::E6008,
        ErrorCode::E6009,
        ErrorCode::E6010,
        ErrorCode::E6011,
        ErrorCode::E6012,
        ErrorCode::E6013,
        ErrorCode::E6014,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E3007 => "E3007",
            ErrorCode::E3008 => "E3008",
            ErrorCode::E3009 => "E3009",
            ErrorCode::E3010 => "E3010",
            ErrorCode::E3011 => "E3011",
            ErrorCode::E3012 => "E3012",
            ErrorCode::E3013 => "E3013",
            ErrorCode::E3014 => "E3014",
            ErrorCode::E3015 => "E3015",
            ErrorCode::E3016 => "E3016",
            ErrorCode::E3017 => "E3017",
            ErrorCode::E3018 => "E3018",
            ErrorCode::E3019 => "E3019",
            ErrorCode::E3020 => "E3020",
            ErrorCode::E3021 => "E3021",
            ErrorCode::E3022 => "E3022",
            ErrorCode::E3023 => "E3023",
            ErrorCode::E3024 => "E3024",
            ErrorCode::E3025 => "E3025",
            ErrorCode::E3026 => "E3026",
            ErrorCode::E3027 => "E3027",
            ErrorCode::E3028 => "E3028",
            ErrorCode::E3029 => "E3029",
            ErrorCode::E3030 => "E3030",
            ErrorCode::E3031 => "E3031",
            ErrorCode::E3032 => "E3032",
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E6003 => "E6003",
            ErrorCode::E6004 => "E6004",
            ErrorCode::E6005 => "E6005",
            ErrorCode::E6006 => "E6006",
            ErrorCode::E6007 => "E6007",
            ErrorCode::E6008 => "E6008",
            ErrorCode::E6009 => "E6009",
            ErrorCode::E6010 => "E6010",
            ErrorCode::E6011 => "E6011",
            ErrorCode::E6012 => "E6012",
            ErrorCode::E6013 => "E6013",
            ErrorCode::E6014 => "E6014",
        }
    }

    pub fn is_lexer_error(&self) -> bool {
        self.as_str().starts_with("E0")
    }

    pub fn is_parser_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    pub fn is_conflict(&self) -> bool {
        self.as_str().starts_with("E3")
    }

    pub fn is_runtime_error(&self) -> bool {
        self.as_str().starts_with("E6")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
