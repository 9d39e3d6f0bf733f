use std::fmt;

/// Error codes for all definition-building diagnostics.
///
/// Format: E#### where the first digit indicates the stage:
/// - E0xxx: Environment errors
/// - E1xxx: Name resolution errors
/// - E2xxx: Ancestry errors
/// - E3xxx: Method table errors
/// - E4xxx: Generic errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Environment Errors (E0xxx)
    /// Conflicting declarations of one type name
    E0001,

    // Resolution Errors (E1xxx)
    /// Reference to an unknown type
    E1001,
    /// Unknown superclass
    E1002,
    /// Unknown module self type
    E1003,

    // Ancestry Errors (E2xxx)
    /// Mixin target of the wrong kind
    E2001,
    /// Superclass is not a class
    E2002,
    /// Cyclic ancestry
    E2003,

    // Method Table Errors (E3xxx)
    /// Duplicate method in one declaration body
    E3001,
    /// Same method from two interface mixins
    E3002,
    /// Alias chain refers back to itself
    E3003,
    /// Alias of an unknown method
    E3004,
    /// Invalid overload (no arms, or nothing to overload)
    E3005,

    // Generic Errors (E4xxx)
    /// Wrong number of type arguments
    E4001,
    /// Type parameter used against its variance
    E4002,
}

impl ErrorCode {
    /// All error code variants, for exhaustive testing.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E3005,
        ErrorCode::E4001,
        ErrorCode::E4002,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
        }
    }

    pub fn is_resolution_error(&self) -> bool {
        matches!(self, ErrorCode::E1001 | ErrorCode::E1002 | ErrorCode::E1003)
    }

    pub fn is_ancestry_error(&self) -> bool {
        matches!(self, ErrorCode::E2001 | ErrorCode::E2002 | ErrorCode::E2003)
    }

    pub fn is_method_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E3001
                | ErrorCode::E3002
                | ErrorCode::E3003
                | ErrorCode::E3004
                | ErrorCode::E3005
        )
    }

    pub fn is_generic_error(&self) -> bool {
        matches!(self, ErrorCode::E4001 | ErrorCode::E4002)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse an error code string like `"E3001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
