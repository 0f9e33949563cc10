use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use rocket::request::FromParam;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A voter's civic credential number, normalized.
///
/// Voters key these in with dots, dashes and spaces in arbitrary places;
/// parsing strips the separators and upper-cases the series letters so the
/// same credential always compares equal.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Credencial(String);

#[derive(Debug, Error)]
#[error("credencial inválida: {0:?}")]
pub struct ParseCredencialError(pub String);

impl Credencial {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Credencial {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Credencial {
    type Err = ParseCredencialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalizada: String = s
            .chars()
            .filter(|c| !matches!(c, '.' | '-') && !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if normalizada.is_empty() || !normalizada.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ParseCredencialError(s.to_string()));
        }
        Ok(Self(normalizada))
    }
}

impl TryFrom<String> for Credencial {
    type Error = ParseCredencialError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Credencial> for String {
    fn from(credencial: Credencial) -> Self {
        credencial.0
    }
}

impl<'a> FromParam<'a> for Credencial {
    type Error = ParseCredencialError;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_separators() {
        let c: Credencial = "1.234.567-8".parse().unwrap();
        assert_eq!(c.as_str(), "12345678");
    }

    #[test]
    fn series_letters_are_uppercased() {
        let c: Credencial = "abc 12345".parse().unwrap();
        assert_eq!(c.as_str(), "ABC12345");
    }

    #[test]
    fn rejects_empty_and_symbols() {
        assert!("".parse::<Credencial>().is_err());
        assert!("  .- ".parse::<Credencial>().is_err());
        assert!("12#45".parse::<Credencial>().is_err());
    }
}
