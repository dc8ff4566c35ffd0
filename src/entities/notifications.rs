use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Notification {
    pub id: u64,
    pub recipient_id: i64,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewMessage,
    Favorite,
    ListingStatus,
    PriceProposal,
    ReportOutcome,
}

impl NotificationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::NewMessage => "new_message",
            NotificationKind::Favorite => "favorite",
            NotificationKind::ListingStatus => "listing_status",
            NotificationKind::PriceProposal => "price_proposal",
            NotificationKind::ReportOutcome => "report_outcome",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "new_message" => Some(NotificationKind::NewMessage),
            "favorite" => Some(NotificationKind::Favorite),
            "listing_status" => Some(NotificationKind::ListingStatus),
            "price_proposal" => Some(NotificationKind::PriceProposal),
            "report_outcome" => Some(NotificationKind::ReportOutcome),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NotificationKind;

    #[test]
    fn kind_string_round_trip() {
        let kinds = [
            NotificationKind::NewMessage,
            NotificationKind::Favorite,
            NotificationKind::ListingStatus,
            NotificationKind::PriceProposal,
            NotificationKind::ReportOutcome,
        ];
        for kind in kinds {
            assert_eq!(NotificationKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(NotificationKind::from_str("price_drop"), None);
    }
}
