//! In-memory backend for driving the view-models

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use sacco_client::{Backend, ClientError, ClientResult, Download, Upload};
use shared::client::{
    BulkDeleteRequest, BulkDeleteResponse, BulkUpdateReport, BulkUploadReport, CorrectionFilter,
    CorrectionPage, CorrectionQuery, CorrectionSubmission, LoginRequest, LoginResponse,
    MemberPage, MemberQuery, MessageResponse, SearchLogPage, SearchLogQuery, SearchRequest,
    SearchResponse, SubmissionResponse, VerificationPage, VerificationQuery,
    VerifyDetailsRequest,
};
use shared::error::{AppError, ErrorBody, ErrorCode};
use shared::models::{
    CorrectionRequest, CorrectionStatus, Member, MemberCreate, MemberStatus, MemberUpdate, Role,
    SearchLog, Stats, User, UserCreate, UserUpdate, Verification,
};
use shared::pagination::{
    CORRECTIONS_PER_PAGE, MEMBERS_PER_PAGE, PageParams, SEARCH_LOGS_PER_PAGE,
    VERIFICATIONS_PER_PAGE,
};

fn api_error(err: AppError) -> ClientError {
    let body = ErrorBody::from(&err);
    let status = err.http_status().as_u16();
    match status {
        401 => ClientError::Unauthorized(body.error),
        403 => ClientError::Forbidden(body.error),
        _ => ClientError::Api {
            status,
            code: Some(err.code),
            message: body.error,
        },
    }
}

pub fn member(id: i64, number: &str, id_number: &str, name: &str, zone: &str) -> Member {
    Member {
        id,
        name: name.to_string(),
        member_number: number.to_string(),
        id_number: id_number.to_string(),
        zone: zone.to_string(),
        status: MemberStatus::Active,
        created_at: 0,
        updated_at: 0,
    }
}

pub fn user(id: i64, username: &str, role: Role) -> User {
    User {
        id,
        username: username.to_string(),
        email: format!("{username}@sacco.test"),
        role,
        is_active: true,
        last_login: None,
        created_at: 0,
    }
}

#[derive(Default)]
struct Store {
    members: Vec<Member>,
    users: Vec<(User, String)>,
    current: Option<i64>,
    verifications: Vec<Verification>,
    corrections: Vec<CorrectionRequest>,
    search_logs: Vec<SearchLog>,
    next_id: i64,
    offline: bool,
    offline_after: Option<&'static str>,
    calls: Vec<&'static str>,
}

impl Store {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn current_user(&self) -> Option<User> {
        let id = self.current?;
        self.users
            .iter()
            .find(|(u, _)| u.id == id && u.is_active)
            .map(|(u, _)| u.clone())
    }
}

#[derive(Clone, Default)]
pub struct MockBackend {
    store: Arc<Mutex<Store>>,
}

impl MockBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.store.lock().next_id = 1000;
        backend
    }

    pub fn with_user(self, id: i64, username: &str, password: &str, role: Role) -> Self {
        self.store
            .lock()
            .users
            .push((user(id, username, role), password.to_string()));
        self
    }

    pub fn with_member(self, member: Member) -> Self {
        self.store.lock().members.push(member);
        self
    }

    /// `count` members numbered M001..
    pub fn with_members(self, count: usize) -> Self {
        {
            let mut store = self.store.lock();
            for i in 1..=count {
                store.members.push(member(
                    i as i64,
                    &format!("M{i:03}"),
                    &format!("{:08}", 10_000_000 + i),
                    &format!("Member {i}"),
                    &format!("Zone {}", (b'A' + (i % 3) as u8) as char),
                ));
            }
        }
        self
    }

    pub fn with_correction(self, correction: CorrectionRequest) -> Self {
        self.store.lock().corrections.push(correction);
        self
    }

    /// Pretend the cookie already holds a session for `user_id`
    pub fn logged_in_as(self, user_id: i64) -> Self {
        self.store.lock().current = Some(user_id);
        self
    }

    pub fn expire_session(&self) {
        self.store.lock().current = None;
    }

    pub fn go_offline(&self) {
        self.store.lock().offline = true;
    }

    /// Let the next `call` through, then fail everything after it
    pub fn go_offline_after(&self, call: &'static str) {
        self.store.lock().offline_after = Some(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.store.lock().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.store.lock().calls.iter().filter(|c| **c == call).count()
    }

    pub fn member(&self, number: &str) -> Option<Member> {
        self.store
            .lock()
            .members
            .iter()
            .find(|m| m.member_number == number)
            .cloned()
    }

    pub fn member_ids(&self) -> Vec<i64> {
        self.store.lock().members.iter().map(|m| m.id).collect()
    }

    pub fn verifications(&self) -> Vec<Verification> {
        self.store.lock().verifications.clone()
    }

    pub fn corrections(&self) -> Vec<CorrectionRequest> {
        self.store.lock().corrections.clone()
    }

    pub fn search_logs(&self) -> Vec<SearchLog> {
        self.store.lock().search_logs.clone()
    }

    /// Record the call, fail when offline
    fn enter(&self, call: &'static str) -> ClientResult<parking_lot::MutexGuard<'_, Store>> {
        let mut store = self.store.lock();
        store.calls.push(call);
        if store.offline {
            return Err(ClientError::Network("connection refused".into()));
        }
        if store.offline_after == Some(call) {
            store.offline_after = None;
            store.offline = true;
        }
        Ok(store)
    }

    /// Like `enter`, plus a live session holding `cap`
    fn admin(
        &self,
        call: &'static str,
        cap: Option<shared::Capability>,
    ) -> ClientResult<parking_lot::MutexGuard<'_, Store>> {
        let store = self.enter(call)?;
        let Some(user) = store.current_user() else {
            return Err(api_error(AppError::session_expired()));
        };
        match cap {
            Some(cap) if !shared::has_permission(user.role, cap) => Err(api_error(
                AppError::forbidden(format!("Permission denied: {cap}")),
            )),
            _ => Ok(store),
        }
    }
}

fn page<T: Clone>(
    rows: &[T],
    params: PageParams,
    default: u32,
) -> (Vec<T>, u64, shared::pagination::Page) {
    let page = params.resolve(default);
    let items = rows
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect();
    (items, rows.len() as u64, page)
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Minimal CSV reader for the update template: header row, comma separated
fn csv_rows(bytes: &[u8]) -> (Vec<String>, Vec<Vec<String>>) {
    let text = String::from_utf8_lossy(bytes);
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let headers = lines
        .next()
        .map(|h| h.split(',').map(|c| c.trim().to_lowercase()).collect())
        .unwrap_or_default();
    let rows = lines
        .map(|l| l.split(',').map(|c| c.trim().to_string()).collect())
        .collect();
    (headers, rows)
}

#[async_trait]
impl Backend for MockBackend {
    async fn me(&self) -> ClientResult<User> {
        let store = self.enter("me")?;
        store
            .current_user()
            .ok_or_else(|| api_error(AppError::unauthorized()))
    }

    async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        let mut store = self.enter("login")?;
        let found = store
            .users
            .iter()
            .find(|(u, p)| u.username == request.username && *p == request.password)
            .map(|(u, _)| u.clone());
        match found {
            Some(user) if !user.is_active => Err(api_error(AppError::new(ErrorCode::AccountDisabled))),
            Some(user) => {
                store.current = Some(user.id);
                Ok(LoginResponse {
                    user,
                    message: "Login successful".into(),
                })
            }
            None => Err(api_error(AppError::invalid_credentials())),
        }
    }

    async fn logout(&self) -> ClientResult<()> {
        let mut store = self.enter("logout")?;
        store.current = None;
        Ok(())
    }

    async fn list_members(&self, query: &MemberQuery) -> ClientResult<MemberPage> {
        let store = self.admin("list_members", Some(shared::Capability::ManageMembers))?;
        let rows: Vec<Member> = store
            .members
            .iter()
            .filter(|m| match query.search_text() {
                Some(text) => {
                    contains(&m.name, text)
                        || contains(&m.member_number, text)
                        || contains(&m.id_number, text)
                        || contains(&m.zone, text)
                }
                None => true,
            })
            .cloned()
            .collect();
        let (items, total, page) = page(&rows, query.page_params(), MEMBERS_PER_PAGE);
        Ok(MemberPage::new(items, total, page))
    }

    async fn create_member(&self, member: &MemberCreate) -> ClientResult<Member> {
        let mut store = self.admin("create_member", Some(shared::Capability::ManageMembers))?;
        let new = member.validate().map_err(api_error)?;
        if store.members.iter().any(|m| m.member_number == new.member_number) {
            return Err(api_error(AppError::new(ErrorCode::MemberNumberExists)));
        }
        let id = store.id();
        let created = Member {
            id,
            name: new.name,
            member_number: new.member_number,
            id_number: new.id_number,
            zone: new.zone,
            status: new.status,
            created_at: 0,
            updated_at: 0,
        };
        store.members.push(created.clone());
        Ok(created)
    }

    async fn update_member(&self, id: i64, update: &MemberUpdate) -> ClientResult<Member> {
        let mut store = self.admin("update_member", Some(shared::Capability::ManageMembers))?;
        let changes = update.normalize().map_err(api_error)?;
        let member = store
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| api_error(AppError::new(ErrorCode::MemberNotFound)))?;
        if let Some(name) = changes.name {
            member.name = name;
        }
        if let Some(zone) = changes.zone {
            member.zone = zone;
        }
        if let Some(status) = changes.status {
            member.status = status;
        }
        Ok(member.clone())
    }

    async fn delete_member(&self, id: i64) -> ClientResult<()> {
        let mut store = self.admin("delete_member", Some(shared::Capability::ManageMembers))?;
        let before = store.members.len();
        store.members.retain(|m| m.id != id);
        if store.members.len() == before {
            return Err(api_error(AppError::new(ErrorCode::MemberNotFound)));
        }
        Ok(())
    }

    async fn bulk_delete(&self, request: &BulkDeleteRequest) -> ClientResult<BulkDeleteResponse> {
        let mut store = self.admin("bulk_delete", Some(shared::Capability::ManageMembers))?;
        let ids: BTreeSet<i64> = request.ids.iter().copied().collect();
        let before = store.members.len();
        store.members.retain(|m| !ids.contains(&m.id));
        Ok(BulkDeleteResponse {
            deleted: (before - store.members.len()) as u64,
            requested: ids.len() as u64,
        })
    }

    async fn bulk_upload(&self, upload: Upload) -> ClientResult<BulkUploadReport> {
        let mut store = self.admin("bulk_upload", Some(shared::Capability::ManageMembers))?;
        let (headers, rows) = csv_rows(&upload.bytes);
        let col = |name: &str| headers.iter().position(|h| h == name);
        let mut report = BulkUploadReport::default();
        for (i, row) in rows.iter().enumerate() {
            let cell = |name: &str| {
                col(name)
                    .and_then(|c| row.get(c))
                    .cloned()
                    .unwrap_or_default()
            };
            let payload = MemberCreate {
                name: cell("name"),
                member_number: cell("member_number"),
                id_number: cell("id_number"),
                zone: cell("zone"),
                status: Some(cell("status")),
            };
            match payload.validate() {
                Ok(new) if store.members.iter().any(|m| m.member_number == new.member_number) => {
                    report.skipped += 1;
                }
                Ok(new) => {
                    let id = store.id();
                    store.members.push(Member {
                        id,
                        name: new.name,
                        member_number: new.member_number,
                        id_number: new.id_number,
                        zone: new.zone,
                        status: new.status,
                        created_at: 0,
                        updated_at: 0,
                    });
                    report.added += 1;
                }
                Err(e) => report.errors.push(format!("Row {}: {}", i + 2, e.message)),
            }
        }
        Ok(report)
    }

    async fn bulk_update(&self, upload: Upload) -> ClientResult<BulkUpdateReport> {
        let mut store = self.admin("bulk_update", Some(shared::Capability::ManageMembers))?;
        let (headers, rows) = csv_rows(&upload.bytes);
        let col = |name: &str| headers.iter().position(|h| h == name);
        let mut report = BulkUpdateReport::default();
        for (i, row) in rows.iter().enumerate() {
            let cell = |name: &str| col(name).and_then(|c| row.get(c)).cloned();
            let Some(number) = cell("member_number").filter(|n| !n.is_empty()) else {
                report.errors += 1;
                report
                    .error_details
                    .push(format!("Row {}: member_number is required", i + 2));
                continue;
            };
            let update = MemberUpdate {
                name: cell("name"),
                id_number: cell("id_number"),
                zone: cell("zone"),
                status: cell("status"),
                ..Default::default()
            };
            let changes = match update.normalize() {
                Ok(changes) => changes,
                Err(e) => {
                    report.errors += 1;
                    report.error_details.push(format!("Row {}: {}", i + 2, e.message));
                    continue;
                }
            };
            let Some(member) = store.members.iter_mut().find(|m| m.member_number == number) else {
                report.not_found += 1;
                continue;
            };
            if changes.is_empty() {
                report.unchanged += 1;
                continue;
            }
            if let Some(name) = changes.name {
                member.name = name;
            }
            if let Some(id_number) = changes.id_number {
                member.id_number = id_number;
            }
            if let Some(zone) = changes.zone {
                member.zone = zone;
            }
            if let Some(status) = changes.status {
                member.status = status;
            }
            report.updated += 1;
        }
        Ok(report)
    }

    async fn stats(&self) -> ClientResult<Stats> {
        let store = self.admin("stats", None)?;
        let zones: BTreeSet<&str> = store.members.iter().map(|m| m.zone.as_str()).collect();
        let pending = store.corrections.iter().filter(|c| c.is_pending()).count() as i64;
        let successful = store.search_logs.iter().filter(|l| l.search_successful).count() as i64;
        let searches = store.search_logs.len() as i64;
        Ok(Stats {
            total_members: store.members.len() as i64,
            total_zones: zones.len() as i64,
            total_verifications: store.verifications.len() as i64,
            pending_corrections: pending,
            resolved_corrections: store.corrections.len() as i64 - pending,
            total_searches: searches,
            successful_searches: successful,
            failed_searches: searches - successful,
        })
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        let store = self.admin("list_users", Some(shared::Capability::ManageUsers))?;
        Ok(store.users.iter().map(|(u, _)| u.clone()).collect())
    }

    async fn create_user(&self, payload: &UserCreate) -> ClientResult<User> {
        let mut store = self.admin("create_user", Some(shared::Capability::ManageUsers))?;
        let new = payload.validate().map_err(api_error)?;
        if store.users.iter().any(|(u, _)| u.username == new.username) {
            return Err(api_error(AppError::new(ErrorCode::UsernameExists)));
        }
        let id = store.id();
        let mut created = user(id, &new.username, new.role);
        created.email = new.email;
        store.users.push((created.clone(), new.password));
        Ok(created)
    }

    async fn update_user(&self, id: i64, update: &UserUpdate) -> ClientResult<User> {
        let mut store = self.admin("update_user", Some(shared::Capability::ManageUsers))?;
        let role = match &update.role {
            Some(role) => Some(role.parse::<Role>().map_err(api_error)?),
            None => None,
        };
        let (user, password) = store
            .users
            .iter_mut()
            .find(|(u, _)| u.id == id)
            .ok_or_else(|| api_error(AppError::new(ErrorCode::UserNotFound)))?;
        if let Some(role) = role {
            user.role = role;
        }
        if let Some(active) = update.is_active {
            user.is_active = active;
        }
        if let Some(new_password) = &update.password {
            *password = new_password.clone();
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: i64) -> ClientResult<()> {
        let mut store = self.admin("delete_user", Some(shared::Capability::ManageUsers))?;
        if store.current == Some(id) {
            return Err(api_error(AppError::new(ErrorCode::CannotDeleteSelf)));
        }
        store.users.retain(|(u, _)| u.id != id);
        Ok(())
    }

    async fn list_verifications(&self, query: &VerificationQuery) -> ClientResult<VerificationPage> {
        let store = self.admin("list_verifications", Some(shared::Capability::ViewVerifications))?;
        let (items, total, page) = page(&store.verifications, query.page_params(), VERIFICATIONS_PER_PAGE);
        Ok(VerificationPage::new(items, total, page))
    }

    async fn list_corrections(&self, query: &CorrectionQuery) -> ClientResult<CorrectionPage> {
        let store = self.admin("list_corrections", Some(shared::Capability::ViewCorrections))?;
        let rows: Vec<CorrectionRequest> = store
            .corrections
            .iter()
            .filter(|c| match query.status {
                CorrectionFilter::All => true,
                CorrectionFilter::Pending => c.status == CorrectionStatus::Pending,
                CorrectionFilter::Resolved => c.status == CorrectionStatus::Resolved,
            })
            .filter(|c| {
                query
                    .search_text()
                    .is_none_or(|t| contains(&c.member_number, t) || contains(&c.current_name, t))
            })
            .cloned()
            .collect();
        let (items, total, page) = page(&rows, query.page_params(), CORRECTIONS_PER_PAGE);
        Ok(CorrectionPage::new(items, total, page))
    }

    async fn resolve_correction(&self, id: i64) -> ClientResult<CorrectionRequest> {
        let mut store = self.admin("resolve_correction", Some(shared::Capability::ManageCorrections))?;
        let by = store.current_user().map(|u| u.username);
        let correction = store
            .corrections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| api_error(AppError::new(ErrorCode::CorrectionNotFound)))?;
        if !correction.is_pending() {
            return Err(api_error(AppError::new(ErrorCode::CorrectionAlreadyResolved)));
        }
        correction.status = CorrectionStatus::Resolved;
        correction.resolved_at = Some(1);
        correction.resolved_by = by;
        Ok(correction.clone())
    }

    async fn correction_pdf(&self, id: i64) -> ClientResult<Download> {
        self.admin("correction_pdf", Some(shared::Capability::ViewCorrections))?;
        Ok(Download {
            filename: format!("correction_{id}.pdf"),
            content_type: "application/pdf".into(),
            bytes: b"%PDF-1.3".to_vec(),
        })
    }

    async fn corrections_pdf(&self, _status: CorrectionFilter) -> ClientResult<Download> {
        self.admin("corrections_pdf", Some(shared::Capability::ViewCorrections))?;
        Ok(Download {
            filename: "all_corrections_2026-01-01.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: b"%PDF-1.3".to_vec(),
        })
    }

    async fn list_search_logs(&self, query: &SearchLogQuery) -> ClientResult<SearchLogPage> {
        let store = self.admin("list_search_logs", None)?;
        let rows: Vec<SearchLog> = store
            .search_logs
            .iter()
            .filter(|l| query.success.as_bool().is_none_or(|s| l.search_successful == s))
            .cloned()
            .collect();
        let (items, total, page) = page(&rows, query.page_params(), SEARCH_LOGS_PER_PAGE);
        Ok(SearchLogPage::new(items, total, page))
    }

    async fn search(&self, request: &SearchRequest) -> ClientResult<SearchResponse> {
        let mut store = self.enter("search")?;
        let request = request.normalized().map_err(api_error)?;
        let found = store
            .members
            .iter()
            .find(|m| m.member_number == request.member_number && m.id_number == request.id_number)
            .cloned();
        let id = store.id();
        store.search_logs.push(SearchLog {
            id,
            member_number: request.member_number,
            id_number: request.id_number,
            search_successful: found.is_some(),
            ip_address: Some("127.0.0.1".into()),
            searched_at: 0,
        });
        Ok(match found {
            Some(member) => SearchResponse::found(member),
            None => SearchResponse::not_found(),
        })
    }

    async fn verify_details(&self, request: &VerifyDetailsRequest) -> ClientResult<MessageResponse> {
        let mut store = self.enter("verify_details")?;
        let member = store
            .members
            .iter()
            .find(|m| m.id == request.member_id)
            .cloned()
            .ok_or_else(|| api_error(AppError::new(ErrorCode::MemberNotFound)))?;
        if member.member_number != request.member_number || member.id_number != request.id_number {
            return Err(api_error(AppError::new(ErrorCode::MemberMismatch)));
        }
        let id = store.id();
        store.verifications.push(Verification {
            id,
            member_id: Some(member.id),
            member_name: member.name,
            member_number: member.member_number,
            id_number: member.id_number,
            zone: member.zone,
            verified_at: 0,
        });
        Ok(MessageResponse::new("Thank you for verifying your details"))
    }

    async fn submit_correction(
        &self,
        submission: &CorrectionSubmission,
    ) -> ClientResult<SubmissionResponse> {
        let mut store = self.enter("submit_correction")?;
        submission.validate().map_err(api_error)?;
        let id = store.id();
        store.corrections.push(CorrectionRequest {
            id,
            member_id: Some(submission.member_id),
            member_number: submission.member_number.clone(),
            id_number: submission.id_number.clone(),
            current_name: submission.current_name.clone(),
            current_zone: submission.current_zone.clone(),
            current_status: submission.current_status.clone(),
            correct_name: submission.correct_name.clone(),
            correct_zone: submission.correct_zone.clone(),
            email: submission.email.clone(),
            phone: submission.phone.clone(),
            additional_notes: submission.additional_notes.clone(),
            status: CorrectionStatus::Pending,
            submitted_at: 0,
            resolved_at: None,
            resolved_by: None,
        });
        Ok(SubmissionResponse {
            message: "Correction request submitted successfully".into(),
            id: Some(id),
        })
    }
}

/// Correction row for seeding the store
pub fn pending_correction(id: i64, member: &Member) -> CorrectionRequest {
    CorrectionRequest {
        id,
        member_id: Some(member.id),
        member_number: member.member_number.clone(),
        id_number: member.id_number.clone(),
        current_name: member.name.clone(),
        current_zone: member.zone.clone(),
        current_status: member.status.to_string(),
        correct_name: Some("Corrected Name".into()),
        correct_zone: None,
        email: Some("member@example.com".into()),
        phone: None,
        additional_notes: None,
        status: CorrectionStatus::Pending,
        submitted_at: 0,
        resolved_at: None,
        resolved_by: None,
    }
}
