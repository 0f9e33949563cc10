use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use rocket::request::FromParam;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An opaque random identifier, rendered as 16 hex digits.
///
/// Drawn from the thread RNG rather than a counter so identifiers reveal
/// nothing about creation order.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Id(u64);

#[derive(Debug, Error)]
#[error("identificador inválido: se esperan 16 dígitos hexadecimales")]
pub struct ParseIdError;

impl Id {
    pub fn new() -> Self {
        Self(rand::random())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for Id {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 16 {
            return Err(ParseIdError);
        }
        u64::from_str_radix(s, 16).map(Id).map_err(|_| ParseIdError)
    }
}

impl TryFrom<String> for Id {
    type Error = ParseIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.to_string()
    }
}

impl<'a> FromParam<'a> for Id {
    type Error = ParseIdError;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display() {
        let id = Id::new();
        assert_eq!(id, id.to_string().parse().unwrap());
    }

    #[test]
    fn rejects_bad_input() {
        assert!("".parse::<Id>().is_err());
        assert!("123".parse::<Id>().is_err());
        assert!("zzzzzzzzzzzzzzzz".parse::<Id>().is_err());
    }
}
