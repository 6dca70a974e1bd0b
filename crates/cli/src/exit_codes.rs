//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Description                                              |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified)                              |
//! | 2    | CLI usage error (bad flag value)                         |
//! | 3    | Invalid config file                                      |
//! | 4    | Input missing/unreadable, or no name column in its header |
//! | 5    | Output directory or file could not be written            |
//! | 6    | `--fail-on-unmatched` and unmatched names exist          |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `recon_exit_code` or the command's error handling

use docrecon_engine::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, threshold out of range on the command line.
pub const EXIT_USAGE: u8 = 2;

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// An input file is missing or unreadable, or has none of the name columns.
pub const EXIT_INPUT: u8 = 4;

/// Output directory, table, or JSON file could not be written.
pub const EXIT_OUTPUT: u8 = 5;

/// Run succeeded but `--fail-on-unmatched` was given and names remain unmatched.
pub const EXIT_UNMATCHED: u8 = 6;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) | ReconError::InvalidThreshold(_) => {
            EXIT_INVALID_CONFIG
        }
        ReconError::MissingColumn { .. } | ReconError::Io(_) => EXIT_INPUT,
        ReconError::Cancelled { .. } => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrecon_engine::Side;

    #[test]
    fn engine_errors_map_to_registry() {
        assert_eq!(recon_exit_code(&ReconError::InvalidThreshold(120)), EXIT_INVALID_CONFIG);
        assert_eq!(recon_exit_code(&ReconError::ConfigParse("x".into())), EXIT_INVALID_CONFIG);
        assert_eq!(
            recon_exit_code(&ReconError::MissingColumn { side: Side::Right, columns: vec!["Name".into()] }),
            EXIT_INPUT
        );
        assert_eq!(recon_exit_code(&ReconError::Io("bad".into())), EXIT_INPUT);
    }

    #[test]
    fn codes_are_distinct() {
        let codes = [EXIT_SUCCESS, EXIT_ERROR, EXIT_USAGE, EXIT_INVALID_CONFIG, EXIT_INPUT, EXIT_OUTPUT, EXIT_UNMATCHED];
        let unique: std::collections::BTreeSet<u8> = codes.iter().copied().collect();
        assert_eq!(unique.len(), codes.len());
    }
}
