use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::{de, Deserialize, Deserializer, Serialize};

/// Postal code as delivered by the gateway. The dataset mixes numeric and
/// string-typed pincodes, so both are kept as received. Integral floats
/// (`400001.0`) are read as numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Pincode {
    Number(u64),
    Text(String),
}

impl<'de> Deserialize<'de> for Pincode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPincode {
            Int(u64),
            Float(f64),
            Text(String),
        }

        match RawPincode::deserialize(deserializer)? {
            RawPincode::Int(value) => Ok(Pincode::Number(value)),
            RawPincode::Float(value) => integral(value).map(Pincode::Number).ok_or_else(|| {
                de::Error::custom(format!("pincode must be an integer, got {value}"))
            }),
            RawPincode::Text(value) => Ok(Pincode::Text(value)),
        }
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pincode::Number(value) => write!(f, "{value}"),
            Pincode::Text(value) => f.write_str(value),
        }
    }
}

/// One row of enrolment, demographic and biometric counts keyed by
/// `(date, state, district, pincode)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub date: String,
    pub state: String,
    pub district: String,
    pub pincode: Pincode,
    #[serde(default, deserialize_with = "count")]
    pub age_0_5: u64,
    #[serde(default, deserialize_with = "count")]
    pub age_5_17: u64,
    #[serde(default, deserialize_with = "count")]
    pub age_18_greater: u64,
    #[serde(default, deserialize_with = "count")]
    pub demo_age_5_17: u64,
    #[serde(rename = "demo_age_17_", default, deserialize_with = "count")]
    pub demo_age_17_plus: u64,
    #[serde(default, deserialize_with = "count")]
    pub bio_age_5_17: u64,
    #[serde(rename = "bio_age_17_", default, deserialize_with = "count")]
    pub bio_age_17_plus: u64,
}

// Merged rows come back from the gateway with NaN-filled columns rendered as
// floats (`12.0`), so integral floats are accepted as counts.
fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCount {
        Int(u64),
        Float(f64),
    }

    match RawCount::deserialize(deserializer)? {
        RawCount::Int(value) => Ok(value),
        RawCount::Float(value) => integral(value).ok_or_else(|| {
            de::Error::custom(format!("count must be a non-negative integer, got {value}"))
        }),
    }
}

fn integral(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64)
        .then_some(value as u64)
}

/// State name to the districts that belong to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterVocabulary(BTreeMap<String, BTreeSet<String>>);

/// Key the gateway uses to answer an empty dataset: `{"states": []}`.
const EMPTY_DATASET_SENTINEL: &str = "states";

impl FilterVocabulary {
    pub fn new(entries: BTreeMap<String, Vec<String>>) -> Self {
        let mut vocabulary = BTreeMap::new();
        for (state, districts) in entries {
            if state == EMPTY_DATASET_SENTINEL && districts.is_empty() {
                continue;
            }
            vocabulary.insert(state, districts.into_iter().collect());
        }
        Self(vocabulary)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn districts(&self, state: &str) -> impl Iterator<Item = &str> {
        self.0
            .get(state)
            .into_iter()
            .flat_map(|districts| districts.iter().map(String::as_str))
    }

}

impl<'de> Deserialize<'de> for FilterVocabulary {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Vec<String>>::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record_json(pincode: serde_json::Value) -> serde_json::Value {
        json!({
            "date": "01-03-2025",
            "state": "StateA",
            "district": "D1",
            "pincode": pincode,
            "age_0_5": 4,
            "age_5_17": 2,
            "age_18_greater": 1,
            "demo_age_5_17": 3,
            "demo_age_17_": 9,
            "bio_age_5_17": 5,
            "bio_age_17_": 7
        })
    }

    #[test]
    fn accepts_numeric_and_string_pincodes() {
        let numeric: Record = serde_json::from_value(record_json(json!(400001))).expect("numeric");
        let text: Record = serde_json::from_value(record_json(json!("400001"))).expect("text");

        assert_eq!(numeric.pincode, Pincode::Number(400001));
        assert_eq!(text.pincode, Pincode::Text("400001".into()));
        assert_eq!(numeric.pincode.to_string(), text.pincode.to_string());
    }

    #[test]
    fn integral_float_pincode_reads_as_number() {
        let record: Record =
            serde_json::from_value(record_json(json!(400001.0))).expect("float pincode");
        assert_eq!(record.pincode, Pincode::Number(400001));
        assert_eq!(record.pincode.to_string(), "400001");

        assert!(serde_json::from_value::<Record>(record_json(json!(400001.5))).is_err());
    }

    #[test]
    fn maps_trailing_underscore_columns() {
        let record: Record = serde_json::from_value(record_json(json!(1))).expect("record");
        assert_eq!(record.demo_age_17_plus, 9);
        assert_eq!(record.bio_age_17_plus, 7);

        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["demo_age_17_"], 9);
        assert_eq!(value["bio_age_17_"], 7);
    }

    #[test]
    fn integral_float_counts_and_missing_columns_are_accepted() {
        let record: Record = serde_json::from_value(json!({
            "date": "02-03-2025",
            "state": "StateA",
            "district": "D1",
            "pincode": 1,
            "age_0_5": 12.0,
            "age_5_17": 3
        }))
        .expect("record");

        assert_eq!(record.age_0_5, 12);
        assert_eq!(record.age_5_17, 3);
        assert_eq!(record.bio_age_17_plus, 0);
    }

    #[test]
    fn fractional_or_negative_counts_are_rejected() {
        let mut fractional = record_json(json!(1));
        fractional["age_0_5"] = json!(1.5);
        assert!(serde_json::from_value::<Record>(fractional).is_err());

        let mut negative = record_json(json!(1));
        negative["age_5_17"] = json!(-2);
        assert!(serde_json::from_value::<Record>(negative).is_err());
    }

    #[test]
    fn vocabulary_deduplicates_and_sorts_districts() {
        let vocabulary: FilterVocabulary = serde_json::from_value(json!({
            "StateB": ["D3"],
            "StateA": ["D2", "D1", "D2"]
        }))
        .expect("vocabulary");

        assert_eq!(vocabulary.states().collect::<Vec<_>>(), vec!["StateA", "StateB"]);
        assert_eq!(
            vocabulary.districts("StateA").collect::<Vec<_>>(),
            vec!["D1", "D2"]
        );
        assert_eq!(vocabulary.districts("StateB").collect::<Vec<_>>(), vec!["D3"]);
        assert_eq!(vocabulary.districts("Nowhere").count(), 0);
    }

    #[test]
    fn empty_dataset_sentinel_becomes_empty_vocabulary() {
        let vocabulary: FilterVocabulary =
            serde_json::from_value(json!({ "states": [] })).expect("vocabulary");
        assert!(vocabulary.is_empty());
    }
}
