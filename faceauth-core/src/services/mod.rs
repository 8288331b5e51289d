//! Service layer
//!
//! The camera controller, session store and status reporter are shared by
//! the page controllers built on top of them. Doctor and logging serve the
//! CLI.

pub mod camera;
pub mod control;
pub mod dashboard;
mod doctor;
pub mod logging;
pub mod login;
pub mod page;
pub mod register;
pub mod session;
pub mod status;

pub use camera::{CameraButtons, CameraController, CameraState, PreviewContent};
pub use control::{Control, LoadingGuard};
pub use dashboard::{DashboardPage, DashboardView};
pub use doctor::{CheckResult, DoctorResult, DoctorService, DoctorSummary};
pub use logging::{EntryPoint, EventCount, LogEntry, LogEvent, LoggingService};
pub use login::{LoginPage, LoginTab};
pub use page::{LoadOutcome, PageEnv};
pub use register::RegisterPage;
pub use session::{SessionState, SessionStore};
pub use status::StatusReporter;
