use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::FollowStatus;

// The backend exchanges status as its stored integer, not as a string
mod status_format {
    use super::FollowStatus;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(status: &FollowStatus, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i32(status.as_i32())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<FollowStatus, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = i32::deserialize(deserializer)?;
        FollowStatus::from_i32(value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown follow status {}", value)))
    }
}

/// A followed account, one row of the `follow` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUser {
    /// Database-assigned key, `None` until inserted
    #[serde(default)]
    pub uid: Option<i64>,
    /// Douyin account id, unique across the table
    pub douyin_id: String,
    pub nick: String,
    /// Avatar path relative to the static file root
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(rename = "isSpecial", default)]
    pub is_special: bool,
    #[serde(default)]
    pub remark: Option<String>,
    /// Follow timestamp in Unix epoch milliseconds
    pub follow_time: i64,
    #[serde(with = "status_format", default)]
    pub status: FollowStatus,
}

impl FollowUser {
    /// Follow time as a UTC datetime, `None` if out of chrono's range
    pub fn followed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.follow_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FollowUser {
        FollowUser {
            uid: None,
            douyin_id: "dy_20".to_string(),
            nick: "用户20".to_string(),
            avatar: Some("/avatars/20.jpg".to_string()),
            is_special: true,
            remark: Some(String::new()),
            follow_time: 1764047780250,
            status: FollowStatus::Following,
        }
    }

    #[test]
    fn test_json_field_names_match_backend() {
        let json = serde_json::to_value(sample()).expect("Failed to serialize");

        assert_eq!(json["douyinId"], "dy_20");
        assert_eq!(json["isSpecial"], true);
        assert_eq!(json["followTime"], 1764047780250i64);
        assert_eq!(json["status"], 1);
    }

    #[test]
    fn test_deserialize_rejects_unknown_status() {
        let json = r#"{"douyinId":"dy_1","nick":"n","followTime":1,"status":7}"#;
        assert!(serde_json::from_str::<FollowUser>(json).is_err());
    }

    #[test]
    fn test_followed_at_uses_milliseconds() {
        let user = sample();
        let at = user.followed_at().expect("timestamp in range");
        assert_eq!(at.timestamp_millis(), 1764047780250);
    }
}
