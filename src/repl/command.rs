//! Command parsing.

use crate::error::{Result, StoreError};

/// A parsed input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Get { key: String },
    Set { key: String, value: String },
    Unset { key: String },
    NumEqualTo { value: String },
    Begin,
    Commit,
    Rollback,
    End,
}

impl Command {
    /// Parse a line into a command.
    ///
    /// Returns `Ok(None)` for a blank line. Missing arguments become empty
    /// strings, which the store treats as a no-op; extra arguments are ignored.
    pub fn parse(line: &str, ignore_case: bool) -> Result<Option<Self>> {
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return Ok(None);
        };

        let mut arg = || tokens.next().unwrap_or_default().to_string();

        let upper;
        let lookup = if ignore_case {
            upper = name.to_ascii_uppercase();
            upper.as_str()
        } else {
            name
        };

        let command = match lookup {
            "GET" => Command::Get { key: arg() },
            "SET" => {
                let key = arg();
                let value = arg();
                Command::Set { key, value }
            }
            "UNSET" => Command::Unset { key: arg() },
            "NUMEQUALTO" => Command::NumEqualTo { value: arg() },
            "BEGIN" => Command::Begin,
            "COMMIT" => Command::Commit,
            "ROLLBACK" => Command::Rollback,
            "END" => Command::End,
            _ => return Err(StoreError::UnknownCommand(name.to_string())),
        };

        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        assert_eq!(
            Command::parse("SET x 10", false).unwrap(),
            Some(Command::Set {
                key: "x".to_string(),
                value: "10".to_string()
            })
        );
        assert_eq!(
            Command::parse("  GET   x ", false).unwrap(),
            Some(Command::Get {
                key: "x".to_string()
            })
        );
        assert_eq!(
            Command::parse("ROLLBACK", false).unwrap(),
            Some(Command::Rollback)
        );
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(Command::parse("", false).unwrap(), None);
        assert_eq!(Command::parse(" \t ", false).unwrap(), None);
    }

    #[test]
    fn test_missing_and_extra_arguments() {
        assert_eq!(
            Command::parse("SET x", false).unwrap(),
            Some(Command::Set {
                key: "x".to_string(),
                value: String::new()
            })
        );
        assert_eq!(
            Command::parse("UNSET a b c", false).unwrap(),
            Some(Command::Unset {
                key: "a".to_string()
            })
        );
    }

    #[test]
    fn test_case_handling() {
        assert!(matches!(
            Command::parse("get x", false),
            Err(StoreError::UnknownCommand(ref name)) if name == "get"
        ));
        assert_eq!(
            Command::parse("numEqualTo 1", true).unwrap(),
            Some(Command::NumEqualTo {
                value: "1".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_command_message() {
        let err = Command::parse("FOO bar", false).unwrap_err();
        assert_eq!(err.to_string(), "Unable to find FOO command.");
    }
}
