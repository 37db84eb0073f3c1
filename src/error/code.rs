/// Error codes with category prefix
///
/// Categories:
/// - ARG: Command line usage errors
/// - BND: Configuration bundle errors
/// - REG: Job registry errors
/// - STO: Local job store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Argument errors (ARG001-ARG099)
    /// Malformed invocation
    Arg001,

    // Bundle errors (BND001-BND099)
    /// Bundle missing or unparseable
    Bnd001,
    /// Bundle decryption failed
    Bnd002,

    // Registry errors (REG001-REG099)
    /// Duplicate job name
    Reg001,
    /// Invalid job configuration
    Reg002,
    /// Registry unreadable
    Reg003,
    /// Registry write failed
    Reg004,

    // Storage errors (STO001-STO099)
    /// Local store could not be provisioned
    Sto001,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "REG001")
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Arg001 => "ARG001",
            ErrorCode::Bnd001 => "BND001",
            ErrorCode::Bnd002 => "BND002",
            ErrorCode::Reg001 => "REG001",
            ErrorCode::Reg002 => "REG002",
            ErrorCode::Reg003 => "REG003",
            ErrorCode::Reg004 => "REG004",
            ErrorCode::Sto001 => "STO001",
        }
    }

    /// Returns the general cause description
    pub fn cause(&self) -> &'static str {
        match self {
            ErrorCode::Arg001 => "The command line arguments are malformed",
            ErrorCode::Bnd001 => "The configuration bundle does not exist or could not be parsed",
            ErrorCode::Bnd002 => "The configuration bundle is encrypted and could not be decrypted",
            ErrorCode::Reg001 => "A backup with the same name (ignoring case) is already registered",
            ErrorCode::Reg002 => "The imported backup configuration failed validation",
            ErrorCode::Reg003 => "The job registry file could not be read",
            ErrorCode::Reg004 => "The job registry could not be updated; it was left unchanged",
            ErrorCode::Sto001 => {
                "The backup was registered, but its local database could not be created"
            }
        }
    }

    /// Returns remediation steps, in the order they should be tried
    pub fn remediation(&self) -> &'static [&'static str] {
        match self {
            ErrorCode::Arg001 => &[
                "Pass --import-metadata=true or --import-metadata=false",
                "Write advanced options as KEY=VALUE",
                "Use 'job-import --help' for usage information",
            ],
            ErrorCode::Bnd001 => &[
                "Verify the bundle path is correct",
                "Re-export the configuration if the file is damaged",
            ],
            ErrorCode::Bnd002 => &[
                "Check the passphrase used when exporting",
                "Unset JOB_IMPORT_PASSPHRASE if it holds a stale value",
            ],
            ErrorCode::Reg001 => &[
                "Rename the existing backup",
                "Or edit the Name field of the bundle before importing",
            ],
            ErrorCode::Reg002 => &[
                "Fix the reported field in the bundle",
                "Re-export the configuration from a working installation",
            ],
            ErrorCode::Reg003 => &[
                "Check permissions of the registry file",
                "Restore the registry from a backup if it is corrupted",
            ],
            ErrorCode::Reg004 => &[
                "Check free disk space and permissions of the data folder",
                "Retry the import",
            ],
            ErrorCode::Sto001 => &[
                "Make the jobs folder writable",
                "Remove the registered backup manually, or create its local database at the reported path",
                "Do not simply re-run the import: the name is already taken",
            ],
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
