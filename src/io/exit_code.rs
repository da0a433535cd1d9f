//! Process exit codes shared by all commands.

/// Exit status of a CLI command.
///
/// Scripts can tell "nothing found" apart from real failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    /// The query ran but matched nothing
    NotFound = 1,
    GeneralError = 2,
    /// Settings could not be read or written
    ConfigError = 3,
    /// Input files could not be parsed (simulation file, search fragments)
    ParseError = 4,
    /// Search fragments loaded but failed validation
    ValidationFailed = 5,
}

impl ExitCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            ExitCode::Success,
            ExitCode::NotFound,
            ExitCode::GeneralError,
            ExitCode::ConfigError,
            ExitCode::ParseError,
            ExitCode::ValidationFailed,
        ];
        let mut values: Vec<u8> = codes.iter().map(|c| c.as_u8()).collect();
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), codes.len());
        assert!(ExitCode::Success.is_success());
        assert!(!ExitCode::NotFound.is_success());
    }
}
