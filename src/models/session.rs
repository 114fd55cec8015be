use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Kind of work a session is dedicated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionType {
    #[serde(rename = "Deep Work")]
    DeepWork,
    #[serde(rename = "Creative Flow")]
    CreativeFlow,
    Analysis,
    Planning,
    Learning,
    Communication,
    Review,
    Other,
}

impl SessionType {
    pub const ALL: [SessionType; 8] = [
        SessionType::DeepWork,
        SessionType::CreativeFlow,
        SessionType::Analysis,
        SessionType::Planning,
        SessionType::Learning,
        SessionType::Communication,
        SessionType::Review,
        SessionType::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SessionType::DeepWork => "Deep Work",
            SessionType::CreativeFlow => "Creative Flow",
            SessionType::Analysis => "Analysis",
            SessionType::Planning => "Planning",
            SessionType::Learning => "Learning",
            SessionType::Communication => "Communication",
            SessionType::Review => "Review",
            SessionType::Other => "Other",
        }
    }
}

/// How well the session delivered on its intended outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fulfillment {
    #[serde(rename = "Yes, completely")]
    Completely,
    Mostly,
    Partially,
    #[serde(rename = "Not really")]
    NotReally,
}

impl Fulfillment {
    pub const ALL: [Fulfillment; 4] = [
        Fulfillment::Completely,
        Fulfillment::Mostly,
        Fulfillment::Partially,
        Fulfillment::NotReally,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Fulfillment::Completely => "Yes, completely",
            Fulfillment::Mostly => "Mostly",
            Fulfillment::Partially => "Partially",
            Fulfillment::NotReally => "Not really",
        }
    }
}

/// A finished focus session. Never modified once appended to the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: i64,
    pub date: NaiveDate,
    #[serde(with = "clock_time")]
    pub start_time: NaiveTime,
    pub duration: u32, // completed minutes
    pub planned_duration: u32,
    pub purpose: String,
    pub outcome: String,
    pub session_type: SessionType,
    pub session_focus: String,
    pub fulfilled: Fulfillment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<String>,
    pub timestamp: DateTime<Local>,
}

/// `HH:MM` wall-clock times as written by the history file.
mod clock_time {
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid start time '{}'", raw)))
    }

    pub(super) fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        // Some locales render midnight as 24:MM
        let normalized = match raw.strip_prefix("24:") {
            Some(rest) => format!("00:{}", rest),
            None => raw.to_string(),
        };
        NaiveTime::parse_from_str(&normalized, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&normalized, "%H:%M"))
            .ok()
            .map(|t| t.with_second(0).unwrap_or(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> SessionRecord {
        SessionRecord {
            id: 1_715_767_200_000,
            date: NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
            duration: 45,
            planned_duration: 60,
            purpose: "Ship the release for the team".to_string(),
            outcome: "Changelog drafted".to_string(),
            session_type: SessionType::DeepWork,
            session_focus: "Release notes".to_string(),
            fulfilled: Fulfillment::Mostly,
            reflection: Some("Stay off chat next time".to_string()),
            timestamp: Local.with_ymd_and_hms(2024, 5, 15, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_serializes_with_storage_field_names() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["date"], "2024-05-15");
        assert_eq!(json["startTime"], "09:15");
        assert_eq!(json["plannedDuration"], 60);
        assert_eq!(json["sessionType"], "Deep Work");
        assert_eq!(json["sessionFocus"], "Release notes");
        assert_eq!(json["fulfilled"], "Mostly");
    }

    #[test]
    fn test_deserializes_browser_written_record() {
        let raw = r#"{
            "id": 1715767200000,
            "date": "2024-05-15",
            "startTime": "24:05",
            "duration": 30,
            "plannedDuration": 30,
            "purpose": "p",
            "outcome": "o",
            "sessionType": "Creative Flow",
            "sessionFocus": "f",
            "fulfilled": "Yes, completely",
            "reflection": "",
            "timestamp": "2024-05-15T10:00:00.000Z"
        }"#;

        let record: SessionRecord = serde_json::from_str(raw).unwrap();

        assert_eq!(record.start_time, NaiveTime::from_hms_opt(0, 5, 0).unwrap());
        assert_eq!(record.session_type, SessionType::CreativeFlow);
        assert_eq!(record.fulfilled, Fulfillment::Completely);
        assert_eq!(record.reflection, Some(String::new()));
    }

    #[test]
    fn test_missing_reflection_is_none() {
        let mut record = sample();
        record.reflection = None;
        let json = serde_json::to_string(&record).unwrap();

        assert!(!json.contains("reflection"));
        let back: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.reflection, None);
    }

    #[test]
    fn test_unknown_session_type_is_rejected() {
        let json = serde_json::to_string(&sample()).unwrap().replace("Deep Work", "Napping");
        assert!(serde_json::from_str::<SessionRecord>(&json).is_err());
    }

    #[test]
    fn test_start_time_accepts_seconds() {
        assert_eq!(clock_time::parse("13:07:42"), NaiveTime::from_hms_opt(13, 7, 0));
        assert_eq!(clock_time::parse("bogus"), None);
    }

    #[test]
    fn test_labels_match_serialized_names() {
        for session_type in SessionType::ALL {
            let json = serde_json::to_value(session_type).unwrap();
            assert_eq!(json, session_type.label());
        }
        for fulfillment in Fulfillment::ALL {
            let json = serde_json::to_value(fulfillment).unwrap();
            assert_eq!(json, fulfillment.label());
        }
    }
}
