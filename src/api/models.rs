use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// GET /heroes
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct HeroSummary {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[cfg(test)]
impl HeroSummary {
    pub fn from_key(key: &str) -> Self {
        HeroSummary {
            key: key.to_string(),
            name: key.to_string(),
            role: None,
        }
    }
}

// GET /heroes/stats, one record per hero. Fields are read leniently so that a bad
// record for some other hero cannot spoil the whole array.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HeroStatRecord {
    #[serde(default, deserialize_with = "lenient_key")]
    pub hero: String,
    #[serde(default, deserialize_with = "lenient_rate")]
    pub winrate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_rate")]
    pub pickrate: Option<f64>,
}

impl HeroStatRecord {
    /// Both rates, if the record carries them as numbers.
    pub fn rates(&self) -> Option<(f64, f64)> {
        Some((self.winrate?, self.pickrate?))
    }
}

fn lenient_key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().unwrap_or_default().to_string())
}

fn lenient_rate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64())
}
