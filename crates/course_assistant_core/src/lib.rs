pub mod analytics;
pub mod auth;
pub mod catalog;
pub mod chat;
pub mod domain;
pub mod password;
pub mod ports;

pub use analytics::DashboardAnalytics;
pub use auth::{AdminAuthenticator, AuthError, IssuedSession, SessionStatus};
pub use catalog::CatalogError;
pub use chat::{ChatReply, ChatService};
pub use domain::{
    AdminCredentials, ChatOverview, ChatRecord, ChatTurn, Course, CourseCatalog, Visitor,
    VisitorOverview,
};
pub use ports::{ChatModelService, Clock, DatabaseService, PortError, PortResult, SystemClock};
