//! Request/response types shared between server and client
//!
//! Every JSON body that crosses the wire is defined here so sacco-server and
//! sacco-client cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ErrorCode};
use crate::models::{CorrectionRequest, Member, SearchLog, User, Verification};
use crate::pagination::{Page, PageParams, PageResponse, total_pages};

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response data (the session itself travels in a cookie)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    #[serde(default)]
    pub message: String,
}

/// Generic `{message}` acknowledgement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// List queries
// =============================================================================

/// GET /admin/members query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// GET /admin/verifications query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Status filter for the corrections list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionFilter {
    #[default]
    All,
    Pending,
    Resolved,
}

/// GET /admin/corrections query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub status: CorrectionFilter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// GET /admin/corrections/download-all-pdf query
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionExportQuery {
    #[serde(default)]
    pub status: CorrectionFilter,
}

/// Outcome filter for the search log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuccessFilter {
    #[default]
    All,
    Success,
    Failed,
}

impl SuccessFilter {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Success => Some(true),
            Self::Failed => Some(false),
        }
    }
}

/// GET /admin/search-logs query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchLogQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub success: SuccessFilter,
}

macro_rules! page_params {
    ($($query:ty),* $(,)?) => {
        $(
            impl $query {
                pub fn page_params(&self) -> PageParams {
                    PageParams {
                        page: self.page,
                        per_page: self.per_page,
                    }
                }
            }
        )*
    };
}

page_params!(MemberQuery, VerificationQuery, CorrectionQuery, SearchLogQuery);

/// Trimmed text filter, `None` when blank
fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl MemberQuery {
    pub fn search_text(&self) -> Option<&str> {
        trimmed(&self.search)
    }
}

impl VerificationQuery {
    pub fn search_text(&self) -> Option<&str> {
        trimmed(&self.search)
    }
}

impl CorrectionQuery {
    pub fn search_text(&self) -> Option<&str> {
        trimmed(&self.search)
    }
}

// =============================================================================
// List responses
// =============================================================================

macro_rules! page_response {
    ($(#[$doc:meta])* $name:ident, $field:ident, $item:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub $field: Vec<$item>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub total: Option<u64>,
            #[serde(default)]
            pub page: u32,
            #[serde(default)]
            pub per_page: u32,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub pages: Option<u32>,
        }

        impl $name {
            /// One page out of `total` matching rows
            pub fn new($field: Vec<$item>, total: u64, page: Page) -> Self {
                Self {
                    $field,
                    total: Some(total),
                    page: page.page,
                    per_page: page.per_page,
                    pages: Some(total_pages(total, page.per_page)),
                }
            }
        }

        impl PageResponse for $name {
            type Item = $item;

            fn items(&self) -> &[$item] {
                &self.$field
            }

            fn into_items(self) -> Vec<$item> {
                self.$field
            }

            fn total(&self) -> Option<u64> {
                self.total
            }

            fn pages(&self) -> Option<u32> {
                self.pages
            }
        }
    };
}

page_response!(
    /// `{members[], total, page, per_page, pages}`
    MemberPage, members, Member
);
page_response!(
    /// `{verifications[], total, page, per_page, pages}`
    VerificationPage, verifications, Verification
);
page_response!(
    /// `{corrections[], total, page, per_page, pages}`
    CorrectionPage, corrections, CorrectionRequest
);
page_response!(
    /// `{logs[], total, page, per_page, pages}`
    SearchLogPage, logs, SearchLog
);

// =============================================================================
// Bulk member operations
// =============================================================================

/// POST /admin/members/bulk-delete body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<i64>,
}

/// Rows actually deleted; may be fewer than requested
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleteResponse {
    pub deleted: u64,
    #[serde(default)]
    pub requested: u64,
}

/// Result of a spreadsheet insert
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUploadReport {
    pub added: u64,
    pub skipped: u64,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Result of a spreadsheet update keyed by member number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateReport {
    pub updated: u64,
    pub not_found: u64,
    #[serde(default)]
    pub unchanged: u64,
    /// Number of rows that failed validation
    pub errors: u64,
    #[serde(default)]
    pub error_details: Vec<String>,
}

// =============================================================================
// Public search + verify/correct
// =============================================================================

/// POST /search body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub member_number: String,
    #[serde(default)]
    pub id_number: String,
}

impl SearchRequest {
    pub fn new(member_number: impl Into<String>, id_number: impl Into<String>) -> Self {
        Self {
            member_number: member_number.into(),
            id_number: id_number.into(),
        }
    }

    /// Both fields trimmed; fails when either is blank
    pub fn normalized(&self) -> AppResult<SearchRequest> {
        let member_number = self.member_number.trim();
        let id_number = self.id_number.trim();
        if member_number.is_empty() || id_number.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                "Both member number and ID number are required",
            ));
        }
        Ok(SearchRequest::new(member_number, id_number))
    }
}

/// `{found, member?, message?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub const NOT_FOUND_MESSAGE: &str = "No member found with the provided details";

impl SearchResponse {
    pub fn found(member: Member) -> Self {
        Self {
            found: true,
            member: Some(member),
            message: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            found: false,
            member: None,
            message: Some(NOT_FOUND_MESSAGE.to_string()),
        }
    }
}

/// POST /verify-details body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyDetailsRequest {
    pub member_id: i64,
    pub member_number: String,
    pub id_number: String,
    pub verified: bool,
}

/// POST /submit-correction body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionSubmission {
    pub member_id: i64,
    pub member_number: String,
    pub id_number: String,
    pub current_name: String,
    pub current_zone: String,
    pub current_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
}

impl CorrectionSubmission {
    /// At least one non-blank contact method
    pub fn has_contact(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.email) || present(&self.phone)
    }

    /// Checked on both sides of the wire
    pub fn validate(&self) -> AppResult<()> {
        if !self.has_contact() {
            return Err(AppError::new(ErrorCode::ContactRequired));
        }
        Ok(())
    }
}

/// `{message, id}` returned when a correction request is stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub id: Option<i64>,
}
