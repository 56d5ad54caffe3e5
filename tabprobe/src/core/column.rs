//! Semantic column types and column descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The semantic type tag a host attaches to a dataset column.
///
/// Serialized as the host's tag string (`"Integer"`, `"NumID"`, `"UUID"`, ...).
/// Tags this library does not know survive as [`ColumnType::Other`].
///
/// # Examples
///
/// ```rust
/// use tabprobe::core::ColumnType;
///
/// let ty: ColumnType = serde_json::from_str("\"NumID\"").unwrap();
/// assert_eq!(ty, ColumnType::NumId);
/// assert!(ty.is_textual());
///
/// let odd: ColumnType = serde_json::from_str("\"Blob\"").unwrap();
/// assert_eq!(odd, ColumnType::Other("Blob".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    Integer,
    Bool,
    NumId,
    DateTime,
    String,
    Duration,
    Numeric,
    Text,
    Geo,
    Uuid,
    Id,
    /// A tag outside the known set
    Other(String),
}

/// Which column types carry their condition operand as text.
///
/// Two variants of this rule exist in host integrations. `Narrow` only counts
/// `String`, `Text` and `ID`; `Extended` also counts `NumID`, `UUID` and `Geo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextualPolicy {
    Narrow,
    #[default]
    Extended,
}

impl ColumnType {
    /// Returns the host tag for this type.
    pub fn as_str(&self) -> &str {
        match self {
            ColumnType::Integer => "Integer",
            ColumnType::Bool => "Bool",
            ColumnType::NumId => "NumID",
            ColumnType::DateTime => "DateTime",
            ColumnType::String => "String",
            ColumnType::Duration => "Duration",
            ColumnType::Numeric => "Numeric",
            ColumnType::Text => "Text",
            ColumnType::Geo => "Geo",
            ColumnType::Uuid => "UUID",
            ColumnType::Id => "ID",
            ColumnType::Other(tag) => tag,
        }
    }

    /// Returns true when condition operands for this type are strings,
    /// under the extended policy.
    pub fn is_textual(&self) -> bool {
        self.is_textual_with(TextualPolicy::Extended)
    }

    /// Returns true when condition operands for this type are strings.
    pub fn is_textual_with(&self, policy: TextualPolicy) -> bool {
        match self {
            ColumnType::String | ColumnType::Text | ColumnType::Id => true,
            ColumnType::NumId | ColumnType::Uuid | ColumnType::Geo => {
                policy == TextualPolicy::Extended
            }
            ColumnType::Integer
            | ColumnType::Bool
            | ColumnType::DateTime
            | ColumnType::Duration
            | ColumnType::Numeric
            | ColumnType::Other(_) => false,
        }
    }

    /// Returns true only for geo-point columns.
    pub fn is_geo(&self) -> bool {
        matches!(self, ColumnType::Geo)
    }
}

/// Optional-argument form of [`ColumnType::is_textual`]; a missing type is not textual.
pub fn is_textual_type(column_type: Option<&ColumnType>) -> bool {
    column_type.is_some_and(ColumnType::is_textual)
}

/// Optional-argument form of [`ColumnType::is_geo`].
pub fn is_geo_type(column_type: Option<&ColumnType>) -> bool {
    column_type.is_some_and(ColumnType::is_geo)
}

impl From<String> for ColumnType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "Integer" => ColumnType::Integer,
            "Bool" => ColumnType::Bool,
            "NumID" => ColumnType::NumId,
            "DateTime" => ColumnType::DateTime,
            "String" => ColumnType::String,
            "Duration" => ColumnType::Duration,
            "Numeric" => ColumnType::Numeric,
            "Text" => ColumnType::Text,
            "Geo" => ColumnType::Geo,
            "UUID" => ColumnType::Uuid,
            "ID" => ColumnType::Id,
            _ => ColumnType::Other(tag),
        }
    }
}

impl From<&str> for ColumnType {
    fn from(tag: &str) -> Self {
        ColumnType::from(tag.to_string())
    }
}

impl From<ColumnType> for String {
    fn from(ty: ColumnType) -> Self {
        match ty {
            ColumnType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column descriptor as reported by the host's `info` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub id: usize,
    pub title: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl ColumnInfo {
    pub fn new(id: usize, title: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id,
            title: title.into(),
            column_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KNOWN: [ColumnType; 11] = [
        ColumnType::Integer,
        ColumnType::Bool,
        ColumnType::NumId,
        ColumnType::DateTime,
        ColumnType::String,
        ColumnType::Duration,
        ColumnType::Numeric,
        ColumnType::Text,
        ColumnType::Geo,
        ColumnType::Uuid,
        ColumnType::Id,
    ];

    #[test]
    fn test_tag_round_trip() {
        for ty in ALL_KNOWN {
            let tag = ty.as_str().to_string();
            assert_eq!(ColumnType::from(tag), ty);
        }
    }

    #[test]
    fn test_extended_textual_set() {
        let textual: Vec<_> = ALL_KNOWN.iter().filter(|t| t.is_textual()).collect();
        assert_eq!(
            textual,
            vec![
                &ColumnType::NumId,
                &ColumnType::String,
                &ColumnType::Text,
                &ColumnType::Geo,
                &ColumnType::Uuid,
                &ColumnType::Id,
            ]
        );
    }

    #[test]
    fn test_narrow_textual_set() {
        let textual: Vec<_> = ALL_KNOWN
            .iter()
            .filter(|t| t.is_textual_with(TextualPolicy::Narrow))
            .collect();
        assert_eq!(
            textual,
            vec![&ColumnType::String, &ColumnType::Text, &ColumnType::Id]
        );
    }

    #[test]
    fn test_optional_predicates() {
        assert!(!is_textual_type(None));
        assert!(!is_geo_type(None));
        assert!(is_geo_type(Some(&ColumnType::Geo)));
        assert!(!is_geo_type(Some(&ColumnType::Numeric)));
        assert!(!is_textual_type(Some(&ColumnType::Other("Blob".into()))));
    }

    #[test]
    fn test_column_info_serde() {
        let json = r#"{"id":2,"title":"Where","type":"Geo"}"#;
        let info: ColumnInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info, ColumnInfo::new(2, "Where", ColumnType::Geo));
        assert_eq!(serde_json::to_string(&info).unwrap(), json);
    }
}
