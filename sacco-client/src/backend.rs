//! The REST contract as a trait
//!
//! View-models only see [`Backend`], so they run unchanged against
//! [`HttpClient`] or an in-memory double.

use async_trait::async_trait;
use reqwest::Method;
use shared::client::{
    BulkDeleteRequest, BulkDeleteResponse, BulkUpdateReport, BulkUploadReport,
    CorrectionExportQuery, CorrectionFilter, CorrectionPage, CorrectionQuery,
    CorrectionSubmission, LoginRequest, LoginResponse, MemberPage, MemberQuery, MessageResponse,
    SearchLogPage, SearchLogQuery, SearchRequest, SearchResponse, SubmissionResponse,
    VerificationPage, VerificationQuery, VerifyDetailsRequest,
};
use shared::models::{
    CorrectionRequest, Member, MemberCreate, MemberUpdate, Stats, User, UserCreate, UserUpdate,
};

use crate::ClientResult;
use crate::http::{Download, HttpClient, Upload};

const NO_QUERY: [(&str, &str); 0] = [];

#[async_trait]
pub trait Backend: Send + Sync {
    // Auth
    async fn me(&self) -> ClientResult<User>;
    async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse>;
    async fn logout(&self) -> ClientResult<()>;

    // Members
    async fn list_members(&self, query: &MemberQuery) -> ClientResult<MemberPage>;
    async fn create_member(&self, member: &MemberCreate) -> ClientResult<Member>;
    async fn update_member(&self, id: i64, update: &MemberUpdate) -> ClientResult<Member>;
    async fn delete_member(&self, id: i64) -> ClientResult<()>;
    async fn bulk_delete(&self, request: &BulkDeleteRequest) -> ClientResult<BulkDeleteResponse>;
    async fn bulk_upload(&self, upload: Upload) -> ClientResult<BulkUploadReport>;
    async fn bulk_update(&self, upload: Upload) -> ClientResult<BulkUpdateReport>;
    async fn stats(&self) -> ClientResult<Stats>;

    // Users
    async fn list_users(&self) -> ClientResult<Vec<User>>;
    async fn create_user(&self, user: &UserCreate) -> ClientResult<User>;
    async fn update_user(&self, id: i64, update: &UserUpdate) -> ClientResult<User>;
    async fn delete_user(&self, id: i64) -> ClientResult<()>;

    // Logs and corrections
    async fn list_verifications(&self, query: &VerificationQuery)
    -> ClientResult<VerificationPage>;
    async fn list_corrections(&self, query: &CorrectionQuery) -> ClientResult<CorrectionPage>;
    async fn resolve_correction(&self, id: i64) -> ClientResult<CorrectionRequest>;
    async fn correction_pdf(&self, id: i64) -> ClientResult<Download>;
    async fn corrections_pdf(&self, status: CorrectionFilter) -> ClientResult<Download>;
    async fn list_search_logs(&self, query: &SearchLogQuery) -> ClientResult<SearchLogPage>;

    // Public
    async fn search(&self, request: &SearchRequest) -> ClientResult<SearchResponse>;
    async fn verify_details(&self, request: &VerifyDetailsRequest)
    -> ClientResult<MessageResponse>;
    async fn submit_correction(
        &self,
        submission: &CorrectionSubmission,
    ) -> ClientResult<SubmissionResponse>;
}

#[async_trait]
impl Backend for HttpClient {
    async fn me(&self) -> ClientResult<User> {
        self.get("/auth/me").await
    }

    async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        self.post("/auth/login", request).await
    }

    async fn logout(&self) -> ClientResult<()> {
        self.post_empty::<MessageResponse>("/auth/logout").await?;
        Ok(())
    }

    async fn list_members(&self, query: &MemberQuery) -> ClientResult<MemberPage> {
        self.get_query("/admin/members", query).await
    }

    async fn create_member(&self, member: &MemberCreate) -> ClientResult<Member> {
        self.post("/admin/members", member).await
    }

    async fn update_member(&self, id: i64, update: &MemberUpdate) -> ClientResult<Member> {
        self.send_json(Method::PUT, &format!("/admin/members/{id}"), update)
            .await
    }

    async fn delete_member(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/admin/members/{id}")).await
    }

    async fn bulk_delete(&self, request: &BulkDeleteRequest) -> ClientResult<BulkDeleteResponse> {
        self.post("/admin/members/bulk-delete", request).await
    }

    async fn bulk_upload(&self, upload: Upload) -> ClientResult<BulkUploadReport> {
        self.upload("/admin/members/bulk-upload", upload).await
    }

    async fn bulk_update(&self, upload: Upload) -> ClientResult<BulkUpdateReport> {
        self.upload("/admin/members/bulk-update", upload).await
    }

    async fn stats(&self) -> ClientResult<Stats> {
        self.get("/admin/stats").await
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.get("/admin/users").await
    }

    async fn create_user(&self, user: &UserCreate) -> ClientResult<User> {
        self.post("/admin/users", user).await
    }

    async fn update_user(&self, id: i64, update: &UserUpdate) -> ClientResult<User> {
        self.send_json(Method::PATCH, &format!("/admin/users/{id}"), update)
            .await
    }

    async fn delete_user(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/admin/users/{id}")).await
    }

    async fn list_verifications(
        &self,
        query: &VerificationQuery,
    ) -> ClientResult<VerificationPage> {
        self.get_query("/admin/verifications", query).await
    }

    async fn list_corrections(&self, query: &CorrectionQuery) -> ClientResult<CorrectionPage> {
        self.get_query("/admin/corrections", query).await
    }

    async fn resolve_correction(&self, id: i64) -> ClientResult<CorrectionRequest> {
        self.post_empty(&format!("/admin/corrections/{id}/resolve"))
            .await
    }

    async fn correction_pdf(&self, id: i64) -> ClientResult<Download> {
        self.download(
            &format!("/admin/corrections/{id}/download-pdf"),
            &NO_QUERY,
            &format!("correction_{id}.pdf"),
        )
        .await
    }

    async fn corrections_pdf(&self, status: CorrectionFilter) -> ClientResult<Download> {
        self.download(
            "/admin/corrections/download-all-pdf",
            &CorrectionExportQuery { status },
            "all_corrections.pdf",
        )
        .await
    }

    async fn list_search_logs(&self, query: &SearchLogQuery) -> ClientResult<SearchLogPage> {
        self.get_query("/admin/search-logs", query).await
    }

    async fn search(&self, request: &SearchRequest) -> ClientResult<SearchResponse> {
        self.post("/search", request).await
    }

    async fn verify_details(
        &self,
        request: &VerifyDetailsRequest,
    ) -> ClientResult<MessageResponse> {
        self.post("/verify-details", request).await
    }

    async fn submit_correction(
        &self,
        submission: &CorrectionSubmission,
    ) -> ClientResult<SubmissionResponse> {
        self.post("/submit-correction", submission).await
    }
}
