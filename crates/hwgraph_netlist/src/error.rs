//! Error types for netlist loading and lookup.

/// Errors that can occur when reading a netlist document or resolving names in it.
#[derive(Debug, thiserror::Error)]
pub enum NetlistError {
    /// An I/O error occurred while reading the netlist file.
    #[error("failed to read netlist: {0}")]
    Io(#[from] std::io::Error),

    /// The JSON content could not be parsed into a netlist.
    #[error("failed to parse netlist: {0}")]
    Parse(String),

    /// No module carries the `top` attribute.
    #[error("cannot find top module: no module has the 'top' attribute")]
    MissingTop,

    /// An explicitly requested top module does not exist.
    #[error("unknown module '{0}'")]
    UnknownModule(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_top() {
        let err = NetlistError::MissingTop;
        assert_eq!(
            format!("{err}"),
            "cannot find top module: no module has the 'top' attribute"
        );
    }

    #[test]
    fn display_unknown_module() {
        let err = NetlistError::UnknownModule("alu".to_string());
        assert_eq!(format!("{err}"), "unknown module 'alu'");
    }

    #[test]
    fn display_parse_error() {
        let err = NetlistError::Parse("expected value at line 1 column 1".to_string());
        assert_eq!(
            format!("{err}"),
            "failed to parse netlist: expected value at line 1 column 1"
        );
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = NetlistError::Io(io_err);
        assert!(format!("{err}").starts_with("failed to read netlist:"));
    }
}
