//! models/recipient_model.rs
//! Destinatarios tal como los guarda la tabla `clients`.

use serde::{Deserialize, Serialize};

/// Valor de la columna de envío que marca un destinatario como enviado.
pub const SENT_MARKER: &str = "OUI";
/// Valor con el que se insertan los destinatarios nuevos.
pub const UNSENT_MARKER: &str = "NON";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: i64,
    /// Vacío si la fila no tiene dirección.
    pub email: String,
    pub name: Option<String>,
    pub sent_flag: Option<String>,
}

impl Recipient {
    /// Cualquier valor distinto de "OUI" (o ausente) cuenta como no enviado.
    #[cfg(test)]
    pub fn is_sent(&self) -> bool {
        self.sent_flag.as_deref() == Some(SENT_MARKER)
    }
}

/// Alta de un destinatario (comando `add`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRecipient {
    pub email: String,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub company: Option<String>,
    pub civility: Option<String>,
    pub source: Option<String>,
}
