use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Field type inferred for a spreadsheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Number,
    Text,
    Date,
    Boolean,
    Address,
    Photo,
    Select,
    Multiselect,
}

impl FieldType {
    pub const ALL: [FieldType; 8] = [
        FieldType::Number,
        FieldType::Text,
        FieldType::Date,
        FieldType::Boolean,
        FieldType::Address,
        FieldType::Photo,
        FieldType::Select,
        FieldType::Multiselect,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Number => "number",
            FieldType::Text => "text",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
            FieldType::Address => "address",
            FieldType::Photo => "photo",
            FieldType::Select => "select",
            FieldType::Multiselect => "multiselect",
        }
    }

    /// Types that carry a tabular schema (used by the strong-schema signal).
    pub fn is_schema_type(&self) -> bool {
        matches!(self, FieldType::Date | FieldType::Number | FieldType::Text)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        FieldType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| ModelError::UnknownLabel {
                kind: "field type",
                value: s.to_string(),
            })
    }
}

/// Classification of a single detected column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnClassification {
    pub column: String,
    pub field_type: FieldType,
    /// Probability of the winning type, in `[0, 1]`.
    pub confidence: f64,
    #[serde(default)]
    pub evidence: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_parses_labels() {
        assert_eq!("Date".parse::<FieldType>().unwrap(), FieldType::Date);
        assert_eq!(
            " multiselect ".parse::<FieldType>().unwrap(),
            FieldType::Multiselect
        );
        assert!("currency".parse::<FieldType>().is_err());
    }

    #[test]
    fn schema_types() {
        let schema: Vec<_> = FieldType::ALL
            .into_iter()
            .filter(FieldType::is_schema_type)
            .collect();
        assert_eq!(
            schema,
            vec![FieldType::Number, FieldType::Text, FieldType::Date]
        );
    }
}
