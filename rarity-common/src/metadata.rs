//! NFT metadata record types
//!
//! A collection is an ordered list of [`NftDocument`]s. The scoring core only
//! looks at each document's [`MetadataRecord`], the ordered list of
//! `trait_type`/`value` pairs, and writes `rarityScore` back onto entries.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One trait on an item, e.g. `Background = Red`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitEntry {
    /// Trait name (`"Background"`)
    #[serde(default)]
    pub trait_type: String,

    /// Trait value. Numbers and booleans are normalized to the text a
    /// JavaScript object key would give them, so `5`, `5.0` and `"5"` agree.
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub value: String,

    /// Rarity of this value rounded to hundredths, set by the scorer
    #[serde(
        rename = "rarityScore",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rarity_score: Option<f64>,
}

impl TraitEntry {
    pub fn new(trait_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            trait_type: trait_type.into(),
            value: value.into(),
            rarity_score: None,
        }
    }
}

/// Ordered trait entries of a single item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataRecord {
    pub attributes: Vec<TraitEntry>,
}

impl MetadataRecord {
    pub fn new(attributes: Vec<TraitEntry>) -> Self {
        Self { attributes }
    }

    /// Build a record from `(trait_type, value)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            attributes: pairs
                .into_iter()
                .map(|(k, v)| TraitEntry::new(k, v))
                .collect(),
        }
    }

    /// Number of traits on this record
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Split the record into position-aligned trait type and value sequences
    pub fn traits_and_values(&self) -> (Vec<&str>, Vec<&str>) {
        self.attributes
            .iter()
            .map(|entry| (entry.trait_type.as_str(), entry.value.as_str()))
            .unzip()
    }
}

/// Token metadata document as read from the collection file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftDocument {
    /// Token identifier; numeric ids are kept as their decimal text
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub token_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Image link, possibly `ipfs://`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Metadata URI used to look the image up when `image` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,

    #[serde(default)]
    pub attributes: MetadataRecord,
}

/// Accept a JSON string, number, boolean or null where text is expected.
///
/// Null maps to the empty string so the schema check can report the field
/// instead of failing the whole file at parse time.
fn deserialize_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(number_text(&n)),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string, number or boolean, found {}",
            other
        ))),
    }
}

/// Text of a JSON number as a JavaScript object key would spell it.
///
/// Integral floats drop the fraction (`5.0` and `5` both give `"5"`,
/// `1e2` gives `"100"`); magnitudes below 1e-6 or from 1e21 up use
/// exponent form with an explicit sign (`1e-7`, `1e+21`).
fn number_text(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    let f = match n.as_f64() {
        Some(f) => f,
        None => return n.to_string(),
    };

    if f == 0.0 {
        return "0".to_string();
    }
    let magnitude = f.abs();
    if magnitude < 1e-6 || magnitude >= 1e21 {
        let text = format!("{:e}", f);
        return match text.find('e') {
            Some(pos) if !text[pos + 1..].starts_with('-') => {
                format!("{}e+{}", &text[..pos], &text[pos + 1..])
            }
            _ => text,
        };
    }
    if f.fract() == 0.0 {
        return format!("{}", f as i128);
    }
    format!("{}", f)
}
