use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use rocket::request::FromParam;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A polling circuit number.
///
/// Circuit numbers arrive as digit strings, possibly zero-padded
/// (`"001"` and `"1"` are the same circuit). On the wire and in logs they
/// are always rendered padded to at least three digits.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Circuito(u32);

#[derive(Debug, Error)]
#[error("número de circuito inválido: {0:?}")]
pub struct ParseCircuitoError(pub String);

impl Circuito {
    pub fn numero(self) -> u32 {
        self.0
    }

    /// The receipt prefix this circuit stamps on its comprobantes.
    pub fn prefijo_comprobante(self) -> String {
        format!("C{:03}", self.0)
    }
}

impl From<u32> for Circuito {
    fn from(numero: u32) -> Self {
        Self(numero)
    }
}

impl Display for Circuito {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl FromStr for Circuito {
    type Err = ParseCircuitoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        if digits.is_empty()
            || digits.len() > 6
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ParseCircuitoError(s.to_string()));
        }
        digits
            .parse()
            .map(Circuito)
            .map_err(|_| ParseCircuitoError(s.to_string()))
    }
}

impl TryFrom<String> for Circuito {
    type Error = ParseCircuitoError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Circuito> for String {
    fn from(circuito: Circuito) -> Self {
        circuito.to_string()
    }
}

impl<'a> FromParam<'a> for Circuito {
    type Error = ParseCircuitoError;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_is_irrelevant_on_parse() {
        let a: Circuito = "001".parse().unwrap();
        let b: Circuito = "1".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "001");
    }

    #[test]
    fn wide_numbers_keep_their_digits() {
        let c: Circuito = "1234".parse().unwrap();
        assert_eq!(c.to_string(), "1234");
        assert_eq!(c.prefijo_comprobante(), "C1234");
    }

    #[test]
    fn rejects_non_digits() {
        assert!("12a".parse::<Circuito>().is_err());
        assert!("".parse::<Circuito>().is_err());
        assert!("1234567".parse::<Circuito>().is_err());
    }
}
