//! crates/course_assistant_core/src/analytics.rs
//!
//! Dashboard figures aggregated from the chat log and visitor registry.

use crate::domain::ChatRecord;
use crate::ports::{DatabaseService, PortResult};
use chrono::{DateTime, NaiveTime, TimeZone, Utc};

/// Number of chats listed on the dashboard.
pub const RECENT_CHAT_LIMIT: i64 = 50;

#[derive(Debug, Clone)]
pub struct DashboardAnalytics {
    pub total_chats: i64,
    pub unique_days: i64,
    pub todays_chats: i64,
    pub total_visitors: i64,
    pub total_visits: i64,
    pub recent_chats: Vec<ChatRecord>,
}

/// Midnight UTC of the day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::default()))
}

impl DashboardAnalytics {
    pub async fn gather(db: &dyn DatabaseService, now: DateTime<Utc>) -> PortResult<Self> {
        let chats = db.chat_overview(start_of_day(now)).await?;
        let visitors = db.visitor_overview().await?;
        let recent_chats = db.recent_chat_records(Some(RECENT_CHAT_LIMIT)).await?;
        Ok(Self {
            total_chats: chats.total_chats,
            unique_days: chats.unique_days,
            todays_chats: chats.todays_chats,
            total_visitors: visitors.total_visitors,
            total_visits: visitors.total_visits,
            recent_chats,
        })
    }
}
