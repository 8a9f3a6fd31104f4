//! The driver's own error type, unifying every failure `main` can propagate
//! behind one `anyhow`-compatible enum.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Pass(#[from] joosc_pass::PassError),

    #[error("pass `{0}` is not registered")]
    UnknownPass(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_pass_message_names_the_pass() {
        let err = DriverError::UnknownPass("not-a-pass".to_string());
        assert_eq!(err.to_string(), "pass `not-a-pass` is not registered");
    }
}
