//! sacco-client: typed client and view-models for sacco-server
//!
//! - [`HttpClient`]: reqwest client with a cookie store, implements [`Backend`]
//! - [`SessionHandle`]: the auth gate shared by every view-model
//! - [`AdminPanel`]: paginated lists, selection, uploads and mutations
//! - [`PublicSearch`]: the unauthenticated lookup / verify / correct flow
//!
//! View-models hold an `Arc<dyn Backend>`, so tests drive them with an
//! in-memory backend instead of a server.

pub mod admin;
pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod notice;
pub mod paging;
pub mod search;
pub mod selection;
pub mod session;
pub mod upload;

pub use admin::{AdminPanel, Section, initial_section};
pub use backend::Backend;
pub use config::{ClientConfig, PageSizes};
pub use error::{ClientError, ClientResult};
pub use http::{Download, HttpClient, Upload};
pub use notice::{Notice, NoticeBoard, NoticeKind};
pub use paging::{Accept, ListRequest, ListState, Nav, PagedList};
pub use search::{CorrectionForm, PublicSearch, SearchState};
pub use selection::Selection;
pub use session::{Access, AuthState, SessionHandle};
pub use upload::{Template, UploadControl, UploadKind, UploadSummary};

// Re-export shared types for convenience
pub use shared::client::{
    BulkDeleteResponse, BulkUpdateReport, BulkUploadReport, CorrectionFilter, SearchResponse,
    SuccessFilter,
};
pub use shared::models::{CorrectionRequest, Member, Role, Stats, User};
pub use shared::permissions::{Capability, has_permission};
