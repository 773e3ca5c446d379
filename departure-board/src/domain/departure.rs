//! Departure records as delivered by the feed.

use serde::{Deserialize, Deserializer, Serialize};

use super::time::{DepartureTime, TimeError};

/// Category of vehicle serving a departure.
///
/// The feed sends a free-text product name. The handful of products that
/// get a dedicated icon are recognised; everything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransportType {
    SBahn,
    UBahn,
    InterCityExpress,
    TaxiBus,
    Other(String),
}

impl TransportType {
    /// The product name as the feed spells it.
    pub fn as_str(&self) -> &str {
        match self {
            TransportType::SBahn => "S-Bahn",
            TransportType::UBahn => "U-Bahn",
            TransportType::InterCityExpress => "InterCityExpress",
            TransportType::TaxiBus => "TaxiBus",
            TransportType::Other(name) => name,
        }
    }

    /// Font Awesome icon name used by the board.
    ///
    /// Unrecognised products (trams, regional buses, ...) fall back to `bus`.
    pub fn icon(&self) -> &'static str {
        match self {
            TransportType::SBahn | TransportType::InterCityExpress => "train",
            TransportType::UBahn => "subway",
            TransportType::TaxiBus => "taxi",
            TransportType::Other(_) => "bus",
        }
    }
}

impl Default for TransportType {
    fn default() -> Self {
        TransportType::Other(String::new())
    }
}

impl From<String> for TransportType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "S-Bahn" => TransportType::SBahn,
            "U-Bahn" => TransportType::UBahn,
            "InterCityExpress" => TransportType::InterCityExpress,
            "TaxiBus" => TransportType::TaxiBus,
            _ => TransportType::Other(s),
        }
    }
}

impl From<TransportType> for String {
    fn from(t: TransportType) -> Self {
        match t {
            TransportType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// One upcoming departure from the feed's `raw` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDeparture {
    /// Line or route label, e.g. "U79" or "ICE 123".
    #[serde(default, deserialize_with = "lenient_string")]
    pub line: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub destination: String,

    #[serde(rename = "type", default, deserialize_with = "lenient_transport_type")]
    pub transport_type: TransportType,

    /// Scheduled date, "DD-MM-YYYY". Empty when the feed omits it.
    #[serde(rename = "sched_date", default, deserialize_with = "lenient_string")]
    pub scheduled_date: String,

    /// Scheduled time of day, "HH:MM". Empty when the feed omits it.
    #[serde(rename = "sched_time", default, deserialize_with = "lenient_string")]
    pub scheduled_time: String,

    /// The feed's own minutes-until-departure. Upstream caching makes this
    /// lag by several minutes, so it is kept for diagnostics only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// Reported delay in minutes, when the feed knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<serde_json::Value>,
}

impl RawDeparture {
    /// Create a departure with the required fields only.
    pub fn new(
        line: impl Into<String>,
        destination: impl Into<String>,
        transport_type: TransportType,
        scheduled_date: impl Into<String>,
        scheduled_time: impl Into<String>,
    ) -> Self {
        Self {
            line: line.into(),
            destination: destination.into(),
            transport_type,
            scheduled_date: scheduled_date.into(),
            scheduled_time: scheduled_time.into(),
            countdown: None,
            platform: None,
            delay: None,
        }
    }

    /// Parse the scheduled date and time into a local instant.
    pub fn departure_time(&self) -> Result<DepartureTime, TimeError> {
        DepartureTime::parse(&self.scheduled_date, &self.scheduled_time)
    }
}

/// Accept any JSON scalar where text is expected.
///
/// A null or odd-typed field must not reject the whole feed document; the
/// record survives with an empty or stringified value and the time filter
/// drops it if its schedule cannot be parsed.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

fn lenient_transport_type<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<TransportType, D::Error> {
    lenient_string(deserializer).map(TransportType::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_type_from_feed_names() {
        assert_eq!(TransportType::from("S-Bahn".to_string()), TransportType::SBahn);
        assert_eq!(TransportType::from("U-Bahn".to_string()), TransportType::UBahn);
        assert_eq!(
            TransportType::from("InterCityExpress".to_string()),
            TransportType::InterCityExpress
        );
        assert_eq!(TransportType::from("TaxiBus".to_string()), TransportType::TaxiBus);
        assert_eq!(
            TransportType::from("Straßenbahn".to_string()),
            TransportType::Other("Straßenbahn".to_string())
        );
    }

    #[test]
    fn transport_type_icons() {
        assert_eq!(TransportType::SBahn.icon(), "train");
        assert_eq!(TransportType::InterCityExpress.icon(), "train");
        assert_eq!(TransportType::UBahn.icon(), "subway");
        assert_eq!(TransportType::TaxiBus.icon(), "taxi");
        assert_eq!(TransportType::Other("Bus".into()).icon(), "bus");
        assert_eq!(TransportType::default().icon(), "bus");
    }

    #[test]
    fn deserialize_feed_record() {
        let json = r#"{
            "line": "U79",
            "destination": "Duisburg Meiderich Süd Bf",
            "type": "U-Bahn",
            "sched_date": "15-03-2024",
            "sched_time": "14:30",
            "countdown": "4",
            "platform": "2",
            "delay": 0,
            "lineref": {"identifier": "ignored"}
        }"#;

        let dep: RawDeparture = serde_json::from_str(json).unwrap();
        assert_eq!(dep.line, "U79");
        assert_eq!(dep.transport_type, TransportType::UBahn);
        assert_eq!(dep.scheduled_date, "15-03-2024");
        assert_eq!(dep.scheduled_time, "14:30");
        assert_eq!(dep.platform.as_deref(), Some("2"));
        assert!(dep.countdown.is_some());
        assert!(dep.departure_time().is_ok());
    }

    #[test]
    fn deserialize_minimal_record() {
        let json = r#"{
            "line": "SB50",
            "destination": "Kaarst",
            "sched_date": "15-03-2024",
            "sched_time": "14:30",
            "platform": null
        }"#;

        let dep: RawDeparture = serde_json::from_str(json).unwrap();
        assert_eq!(dep.transport_type, TransportType::default());
        assert_eq!(dep.platform, None);
        assert_eq!(dep.countdown, None);
    }

    #[test]
    fn deserialize_tolerates_null_and_missing_fields() {
        let json = r#"{
            "line": 706,
            "destination": null,
            "type": null,
            "sched_date": "15-03-2024",
            "sched_time": null
        }"#;

        let dep: RawDeparture = serde_json::from_str(json).unwrap();
        assert_eq!(dep.line, "706");
        assert_eq!(dep.destination, "");
        assert_eq!(dep.transport_type, TransportType::default());
        assert_eq!(dep.scheduled_time, "");
        assert!(dep.departure_time().is_err());

        let dep: RawDeparture = serde_json::from_str(r#"{"line": "U79"}"#).unwrap();
        assert_eq!(dep.scheduled_date, "");
        assert!(dep.departure_time().is_err());
    }

    #[test]
    fn serialize_uses_feed_field_names() {
        let dep = RawDeparture::new("S8", "Mönchengladbach", TransportType::SBahn, "15-03-2024", "09:05");
        let value = serde_json::to_value(&dep).unwrap();
        assert_eq!(value["type"], "S-Bahn");
        assert_eq!(value["sched_date"], "15-03-2024");
        assert_eq!(value["sched_time"], "09:05");
        assert!(value.get("countdown").is_none());
    }
}
