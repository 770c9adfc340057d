//! Error kinds for the dorina library.
//!
//! The CLI maps these onto exit codes: user errors (unknown names, invalid
//! queries) exit 1, IO and catalog errors exit 2.

use std::path::PathBuf;

/// Errors produced by the catalog, the selectors, and the query engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The data directory itself could not be read.
    #[error("cannot read catalog at {}: {source}", path.display())]
    Catalog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No assembly with this name exists in the catalog.
    #[error("unknown assembly: {0}")]
    UnknownAssembly(String),

    /// No regulator with this name exists for the requested assembly.
    #[error("unknown regulator: {0}")]
    UnknownRegulator(String),

    /// The requested region class has no backing file in this assembly.
    #[error("unknown region: {0}")]
    UnknownRegion(String),

    /// A BED or GFF3 line failed to parse.
    #[error("{}:{line}: {reason}", file.display())]
    MalformedRecord {
        file: PathBuf,
        line: usize,
        reason: String,
    },

    /// A chromosome of the input stream is absent from the sizes table.
    #[error("chromosome not in sizes table: {0}")]
    MissingChromosome(String),

    /// A regulator set that must be non-empty was empty.
    #[error("empty regulator set for match mode 'any'")]
    EmptySet,

    /// The query combines options in an unsupported way.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// IO failure outside the catalog walk.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Whether this error is the user's fault (bad names, bad query shape)
    /// rather than a broken installation or data directory.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownAssembly(_)
                | Error::UnknownRegulator(_)
                | Error::UnknownRegion(_)
                | Error::EmptySet
                | Error::InvalidQuery(_)
        )
    }
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_split() {
        assert!(Error::UnknownAssembly("hg19".into()).is_user_error());
        assert!(Error::UnknownRegulator("X".into()).is_user_error());
        assert!(Error::EmptySet.is_user_error());
        assert!(!Error::MissingChromosome("chrM".into()).is_user_error());
        assert!(!Error::MalformedRecord {
            file: "x.bed".into(),
            line: 3,
            reason: "bad".into()
        }
        .is_user_error());
    }

    #[test]
    fn test_malformed_record_names_file_and_line() {
        let err = Error::MalformedRecord {
            file: "regions/all.gff".into(),
            line: 42,
            reason: "start > end".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("all.gff"));
        assert!(msg.contains("42"));
        assert!(msg.contains("start > end"));
    }
}
