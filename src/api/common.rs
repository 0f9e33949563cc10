use serde::{Deserialize, Serialize};

/// Plain confirmation payload: the terminals surface `mensaje` verbatim.
#[derive(Debug, Serialize, Deserialize)]
pub struct Mensaje {
    pub mensaje: String,
}

impl Mensaje {
    pub fn new(mensaje: String) -> Self {
        Self { mensaje }
    }
}
