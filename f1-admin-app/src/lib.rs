//! Application layer of the admin tool: the participation store, the
//! assignment operation, notifications and the read side views.
//!
//! Everything here is generic over [`f1_admin_client::Backend`] and runs on a
//! single thread.

pub mod assignment;
pub mod dashboard;
pub mod drivers;
pub mod error;
pub mod grand_prix;
pub mod notification;
pub mod store;

#[cfg(test)]
mod fake;

pub use assignment::assign_participation;
pub use dashboard::{Dashboard, RecentParticipation, Section, TeamCount};
pub use drivers::{recent_races, DriverDetails, DriverRoster, RecentRace};
pub use error::{AssignmentError, DashboardError, RefreshError, WorkflowError};
pub use grand_prix::Calendar;
pub use notification::{Notification, NotificationCenter, NotificationId, NotificationKind};
pub use store::{fetch_participations, ParticipationStore, StoreState};
