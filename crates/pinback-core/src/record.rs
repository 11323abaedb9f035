use crate::dimension::NO_DIMENSION;
use serde::{Deserialize, Deserializer, Serialize};

/// One archive item as returned by `GET /images`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageRecord {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub date: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default = "unknown_dimension", deserialize_with = "dimension_or_na")]
    pub dimension: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub ocr_text: Option<String>,
}

impl ImageRecord {
    /// Minimal record; mostly for tests and local catalogs.
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            image_url: None,
            date: None,
            kind: None,
            dimension: unknown_dimension(),
            color: None,
            ocr_text: None,
        }
    }

    /// Title with the slug dashes turned back into spaces.
    pub fn display_title(&self) -> String {
        self.title.replace('-', " ")
    }

    /// `"<date>, <dimension>"` caption line.
    pub fn caption(&self) -> String {
        format!("{}, {}", self.date.as_deref().unwrap_or(NO_DIMENSION), self.dimension)
    }

    /// Leading four-digit year of `date`, if any.
    pub fn year(&self) -> Option<i32> {
        let d = self.date.as_deref()?.trim();
        let digits: String = d.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.len() == 4 {
            digits.parse().ok()
        } else {
            None
        }
    }
}

fn unknown_dimension() -> String {
    NO_DIMENSION.to_string()
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }
    Ok(match Option::<Raw>::deserialize(d)? {
        Some(Raw::Text(s)) => Some(s),
        Some(Raw::Int(n)) => Some(n.to_string()),
        Some(Raw::Float(n)) => Some(n.to_string()),
        None => None,
    })
}

fn dimension_or_na<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_else(unknown_dimension))
}
