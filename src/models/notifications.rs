use crate::common::error::AppError;
use crate::entities::notifications::{Notification as NotificationEntity, NotificationKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PublishArgs {
    pub recipient_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationPageArgs {
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    25
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: u64,
    pub recipient_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl TryFrom<NotificationEntity> for Notification {
    type Error = AppError;

    fn try_from(value: NotificationEntity) -> Result<Self, Self::Error> {
        let kind = NotificationKind::from_str(&value.kind)
            .ok_or(AppError::NotificationsUnknownKind)?;
        Ok(Self {
            notification_id: value.id,
            recipient_id: value.recipient_id,
            kind,
            title: value.title,
            body: value.body,
            link: value.link,
            created_at: value.created_at,
            read: value.read_at.is_some(),
        })
    }
}
