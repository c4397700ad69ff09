//! Lexical feature extraction for column names.
//!
//! A column name is split into lower-cased tokens on every run of
//! characters that are neither letters nor digits. Each token is then
//! matched by substring against fixed keyword lists, one list per signal.

use serde::{Deserialize, Serialize};

/// Character budget before the length penalty starts.
const LENGTH_BUDGET: usize = 18;
/// Scale applied to the characters beyond the budget.
const LENGTH_PENALTY_SCALE: f64 = 10.0;

pub(crate) const DATE_KEYWORDS: &[&str] = &[
    "fecha", "date", "dia", "día", "mes", "año", "hora", "time", "vencimiento", "periodo",
    "inicio", "corte", "day",
];

pub(crate) const NUMBER_KEYWORDS: &[&str] = &[
    "monto", "valor", "precio", "costo", "importe", "saldo", "pago", "amount", "price", "cost",
    "tarifa", "peso",
];

pub(crate) const IDENTITY_KEYWORDS: &[&str] = &[
    "codigo", "código", "cedula", "cédula", "documento", "nit", "identific", "dni", "serial",
    "uuid", "code", "ticket", "orden",
];

pub(crate) const COUNT_KEYWORDS: &[&str] = &[
    "cantidad", "total", "numero", "número", "nro", "qty", "count", "unidades", "conteo", "items",
];

pub(crate) const LOCATION_KEYWORDS: &[&str] = &[
    "ciudad", "zona", "region", "región", "barrio", "sector", "municipio", "departamento",
    "pais", "país", "sede", "localidad", "city", "country",
];

pub(crate) const BOOLEAN_KEYWORDS: &[&str] = &[
    "activo", "activa", "habilitado", "aplica", "requiere", "tiene", "flag", "enabled", "active",
    "valido", "válido", "confirmado", "cumple",
];

pub(crate) const TEXT_KEYWORDS: &[&str] = &[
    "nombre", "descripcion", "descripción", "observacion", "observación", "comentario", "nota",
    "detalle", "name", "description", "comment", "motivo", "titulo", "título",
];

pub(crate) const PHOTO_KEYWORDS: &[&str] = &[
    "foto", "photo", "imagen", "image", "evidencia", "selfie", "picture", "img",
];

pub(crate) const ADDRESS_KEYWORDS: &[&str] = &[
    "direcc", "address", "calle", "carrera", "domicilio", "avenida", "nomenclatura",
];

/// Number of entries in a [`FeatureVector`].
pub const FEATURE_COUNT: usize = 8;

/// Named positions inside a [`FeatureVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Date = 0,
    Number = 1,
    Identity = 2,
    Count = 3,
    Location = 4,
    Boolean = 5,
    Text = 6,
    LengthPenalty = 7,
}

/// Lexical signal counts for one column name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn get(&self, signal: Signal) -> f64 {
        self.0[signal as usize]
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }
}

/// Column name split into tokens together with its feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFeatures {
    pub tokens: Vec<String>,
    pub vector: FeatureVector,
}

/// Splits on any run of non-alphanumeric characters and lower-cases tokens.
pub fn tokenize(name: &str) -> Vec<String> {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Tokens that contain at least one of the keywords.
pub(crate) fn matching_tokens<'a>(tokens: &'a [String], keywords: &[&str]) -> Vec<&'a str> {
    tokens
        .iter()
        .filter(|token| token_matches(token, keywords))
        .map(String::as_str)
        .collect()
}

fn token_matches(token: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| token.contains(keyword))
}

/// Extracts the eight lexical signals for a column name.
pub fn extract_features(name: &str) -> ExtractedFeatures {
    let tokens = tokenize(name);
    let mut vector = [0.0; FEATURE_COUNT];

    let lists: [(Signal, &[&str]); 7] = [
        (Signal::Date, DATE_KEYWORDS),
        (Signal::Number, NUMBER_KEYWORDS),
        (Signal::Identity, IDENTITY_KEYWORDS),
        (Signal::Count, COUNT_KEYWORDS),
        (Signal::Location, LOCATION_KEYWORDS),
        (Signal::Boolean, BOOLEAN_KEYWORDS),
        (Signal::Text, TEXT_KEYWORDS),
    ];
    for token in &tokens {
        for (signal, keywords) in lists {
            if token_matches(token, keywords) {
                vector[signal as usize] += 1.0;
            }
        }
    }

    let total_chars: usize = tokens.iter().map(|t| t.chars().count()).sum();
    vector[Signal::LengthPenalty as usize] =
        total_chars.saturating_sub(LENGTH_BUDGET) as f64 / LENGTH_PENALTY_SCALE;

    ExtractedFeatures {
        tokens,
        vector: FeatureVector(vector),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_on_non_alphanumeric_runs() {
        assert_eq!(
            tokenize("Fecha_de--Visita (día)"),
            vec!["fecha", "de", "visita", "día"]
        );
        assert!(tokenize(" -- ").is_empty());
    }

    #[test]
    fn counts_one_hit_per_token_and_signal() {
        let features = extract_features("Valor pago total");
        assert_eq!(features.vector.get(Signal::Number), 2.0); // valor, pago
        assert_eq!(features.vector.get(Signal::Count), 1.0);
        assert_eq!(features.vector.get(Signal::Date), 0.0);
    }

    #[test]
    fn length_penalty_beyond_budget() {
        // 24 letters in total, 6 over the budget
        let features = extract_features("observaciones adicionales");
        assert!((features.vector.get(Signal::LengthPenalty) - 0.6).abs() < 1e-9);

        let short = extract_features("Nombre");
        assert_eq!(short.vector.get(Signal::LengthPenalty), 0.0);
    }

    #[test]
    fn unknown_names_produce_a_zero_vector() {
        assert!(extract_features("xyz").vector.is_zero());
        assert!(extract_features("").vector.is_zero());
    }
}
