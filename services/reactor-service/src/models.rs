use serde::{Deserialize, Deserializer, Serialize};

/// One sample of reactor state as posted by the controller agent.
///
/// Absent, `null` and unknown fields are tolerated on decode; the encoded form
/// always carries every field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    #[serde(deserialize_with = "wire::string")]
    pub status: String,
    #[serde(rename = "energyStored", deserialize_with = "wire::float")]
    pub energy_stored: f64,
    #[serde(rename = "energyProducedLastTick", deserialize_with = "wire::float")]
    pub energy_produced_last_tick: f64,
    #[serde(rename = "fuelTemp", deserialize_with = "wire::float")]
    pub fuel_temp: f64,
    #[serde(rename = "casingTemp", deserialize_with = "wire::float")]
    pub casing_temp: f64,
    #[serde(rename = "fuelAmount", deserialize_with = "wire::int")]
    pub fuel_amount: i64,
    #[serde(rename = "wasteAmount", deserialize_with = "wire::int")]
    pub waste_amount: i64,
    #[serde(rename = "fuelConsumedLastTick", deserialize_with = "wire::float")]
    pub fuel_consumed_last_tick: f64,
    #[serde(rename = "fuelReactivity", deserialize_with = "wire::float")]
    pub fuel_reactivity: f64,
    #[serde(rename = "computerID", deserialize_with = "wire::int")]
    pub computer_id: i64,
    #[serde(rename = "computerLabel", deserialize_with = "wire::string")]
    pub computer_label: String,
    #[serde(rename = "controlRodInsertion", deserialize_with = "wire::float")]
    pub control_rod_insertion: f64,
    #[serde(rename = "reactorType", deserialize_with = "wire::string")]
    pub reactor_type: String,
    #[serde(deserialize_with = "wire::int")]
    pub timestamp: i64,
}

impl Snapshot {
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        // Decode through a map so only objects are accepted; repeated keys keep the last value.
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(body)?;
        serde_json::from_value(serde_json::Value::Object(object))
    }

    /// Replaces whatever the client sent with the server's clock.
    pub fn stamped(mut self, unix_secs: i64) -> Self {
        self.timestamp = unix_secs;
        self
    }
}

/// Lenient numeric decoding: agents disagree on integer vs float encodings.
mod wire {
    use super::*;
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(match Option::<Number>::deserialize(deserializer)? {
            Some(Number::Int(value)) => value as f64,
            Some(Number::Float(value)) => value,
            None => 0.0,
        })
    }

    pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Option::<Number>::deserialize(deserializer)? {
            Some(Number::Int(value)) => Ok(value),
            Some(Number::Float(value)) => {
                // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
                if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
                    Ok(value as i64)
                } else {
                    Err(D::Error::custom(format!(
                        "expected an integer, found {value}"
                    )))
                }
            }
            None => Ok(0),
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }
}
