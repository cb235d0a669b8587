//! Catalog records as delivered by the data collaborator.
//!
//! Every field except `id` is deserialized leniently: wrong shapes collapse to
//! "absent" instead of failing the whole record, so one malformed product never
//! poisons a catalog load.

use crate::text::normalize;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;

const UNSORTABLE_REFERENCE: u64 = 999_999;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Product {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(
        rename = "referencia",
        default,
        deserialize_with = "lenient::opt_string"
    )]
    pub reference: Option<String>,
    #[serde(rename = "ref", default, deserialize_with = "lenient::string_list")]
    pub references: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub oem: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub fmsi: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub wva: Option<String>,
    #[serde(
        rename = "fabricante",
        default,
        deserialize_with = "lenient::opt_string"
    )]
    pub manufacturer: Option<String>,
    #[serde(rename = "posicion", default, deserialize_with = "lenient::opt_string")]
    pub position: Option<String>,
    #[serde(rename = "medidas", default, deserialize_with = "lenient::dimensions")]
    pub dimensions: Dimensions,
    #[serde(
        rename = "aplicaciones",
        default,
        deserialize_with = "lenient::fitments"
    )]
    pub applications: Vec<Fitment>,
    #[serde(rename = "imagenes", default, deserialize_with = "lenient::string_list")]
    pub images: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Dimensions {
    #[serde(rename = "ancho", default)]
    pub width: Option<f64>,
    #[serde(rename = "alto", default)]
    pub height: Option<f64>,
}

/// One vehicle-compatibility record (an "aplicación").
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fitment {
    #[serde(rename = "marca", default)]
    pub brand: Option<String>,
    #[serde(rename = "modelo", default)]
    pub model: Option<String>,
    #[serde(rename = "serie", default)]
    pub series: Option<String>,
    #[serde(rename = "año", default)]
    pub year: Option<String>,
    #[serde(rename = "posicion", default)]
    pub position: Option<String>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Position {
    #[serde(rename = "delantera")]
    Front,
    #[serde(rename = "trasera")]
    Rear,
}

impl Position {
    pub fn label(self) -> &'static str {
        match self {
            Position::Front => "delantera",
            Position::Rear => "trasera",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match normalize(value).as_str() {
            "delantera" => Some(Position::Front),
            "trasera" => Some(Position::Rear),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Installation positions a product supports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PositionSet {
    front: bool,
    rear: bool,
}

impl PositionSet {
    pub fn contains(self, position: Position) -> bool {
        match position {
            Position::Front => self.front,
            Position::Rear => self.rear,
        }
    }

    pub fn is_empty(self) -> bool {
        !self.front && !self.rear
    }

    /// Adds a raw catalog value. `AMBAS` expands to both positions; values
    /// other than the two known positions contribute nothing.
    fn insert_raw(&mut self, raw: &str) {
        match normalize(raw).as_str() {
            "ambas" => {
                self.front = true;
                self.rear = true;
            }
            "delantera" => self.front = true,
            "trasera" => self.rear = true,
            _ => {}
        }
    }
}

impl Product {
    /// Positions from the root `posicion` when present, otherwise the union
    /// of every fitment's own position.
    pub fn position_set(&self) -> PositionSet {
        let mut set = PositionSet::default();
        if let Some(root) = self.position.as_deref().filter(|raw| !raw.trim().is_empty()) {
            set.insert_raw(root);
            return set;
        }
        for fitment in &self.applications {
            if let Some(position) = fitment.position.as_deref() {
                set.insert_raw(position);
            }
        }
        set
    }

    /// Alternate references split on whitespace, in catalog order.
    pub fn reference_tokens(&self) -> impl Iterator<Item = &str> {
        self.references
            .iter()
            .flat_map(|reference| reference.split_whitespace())
    }

    /// First run of digits in the first alternate reference.
    pub fn sortable_reference_number(&self) -> u64 {
        let Some(first) = self.references.first() else {
            return UNSORTABLE_REFERENCE;
        };
        let digits: String = first
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().unwrap_or(UNSORTABLE_REFERENCE)
    }

    pub fn application_count(&self) -> usize {
        self.applications.len()
    }

    /// One-line description of the fitments: the first vehicle plus how
    /// many more follow.
    pub fn application_summary(&self) -> String {
        let Some(first) = self.applications.first() else {
            return "Sin aplicaciones".to_string();
        };
        let brand = first.brand.as_deref().unwrap_or_default();
        let model = first
            .model
            .as_deref()
            .filter(|model| *model != "undefined")
            .unwrap_or_default();
        let mut text = format!("{brand} {model}").trim().to_string();
        if text.is_empty() {
            text = match first.year.as_deref() {
                Some(year) if !year.is_empty() => format!("Año: {year}"),
                _ => "Sin detalles".to_string(),
            };
        }
        let remaining = self.applications.len() - 1;
        if remaining > 0 {
            text.push_str(&format!(", +{remaining} más"));
        }
        text
    }
}

mod lenient {
    use super::Dimensions;
    use super::Fitment;
    use crate::text::parse_leading_float;
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::de::Error as _;
    use serde_json::Map;
    use serde_json::Value;

    pub(super) fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        scalar(&value)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| D::Error::custom("product id must be a non-empty string or number"))
    }

    pub(super) fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(scalar(&value))
    }

    pub(super) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match &value {
            Value::Array(items) => items.iter().filter_map(scalar).collect(),
            Value::String(_) | Value::Number(_) => scalar(&value).into_iter().collect(),
            _ => Vec::new(),
        })
    }

    pub(super) fn dimensions<'de, D>(deserializer: D) -> Result<Dimensions, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let Value::Object(fields) = value else {
            return Ok(Dimensions::default());
        };
        Ok(Dimensions {
            width: fields.get("ancho").and_then(number_like),
            height: fields.get("alto").and_then(number_like),
        })
    }

    pub(super) fn fitments<'de, D>(deserializer: D) -> Result<Vec<Fitment>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let Value::Array(items) = value else {
            return Ok(Vec::new());
        };
        Ok(items
            .iter()
            .filter_map(|item| match item {
                Value::Object(fields) => Some(fitment(fields)),
                _ => None,
            })
            .collect())
    }

    fn fitment(fields: &Map<String, Value>) -> Fitment {
        let field = |key: &str| fields.get(key).and_then(scalar);
        Fitment {
            brand: field("marca"),
            model: field("modelo"),
            series: field("serie"),
            year: field("año"),
            position: field("posicion"),
        }
    }

    fn scalar(value: &Value) -> Option<String> {
        match value {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    fn number_like(value: &Value) -> Option<f64> {
        match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => parse_leading_float(text),
            _ => None,
        }
    }
}
