use serde::{Deserialize, Serialize};

/// Relationship state stored in the `status` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FollowStatus {
    #[default]
    Following,
    Unfollowed,
}

impl FollowStatus {
    pub fn as_i32(&self) -> i32 {
        match self {
            FollowStatus::Following => 1,
            FollowStatus::Unfollowed => 0,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(FollowStatus::Following),
            0 => Some(FollowStatus::Unfollowed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FollowStatus::Following => "following",
            FollowStatus::Unfollowed => "unfollowed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_integer_mapping() {
        assert_eq!(FollowStatus::Following.as_i32(), 1);
        assert_eq!(FollowStatus::Unfollowed.as_i32(), 0);
        assert_eq!(FollowStatus::from_i32(1), Some(FollowStatus::Following));
        assert_eq!(FollowStatus::from_i32(0), Some(FollowStatus::Unfollowed));
        assert_eq!(FollowStatus::from_i32(2), None);
    }

    #[test]
    fn test_status_label_matches_serde_name() {
        for status in [FollowStatus::Following, FollowStatus::Unfollowed] {
            let json = serde_json::to_string(&status).expect("serialize");
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }
}
