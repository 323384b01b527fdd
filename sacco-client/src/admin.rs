//! Admin panel view-model
//!
//! Owns one paginated list per section, the member selection, both upload
//! controls and the banner. Every mutation posts, then re-fetches the
//! affected list and the stats. Once the server has accepted a change the
//! call succeeds even if that re-fetch fails.

use std::sync::Arc;

use shared::client::{BulkDeleteRequest, SuccessFilter};
use shared::models::{
    CorrectionRequest, Member, MemberCreate, MemberUpdate, Role, SearchLog, Stats, User,
    UserCreate, UserUpdate, Verification,
};
use shared::permissions::Capability;

use crate::backend::Backend;
use crate::error::PERMISSION_DENIED_MESSAGE;
use crate::http::Download;
use crate::notice::NoticeBoard;
use crate::paging::{Accept, CorrectionListFilter, ListRequest, Nav, PagedList};
use crate::selection::{EMPTY_SELECTION_MESSAGE, Selection, bulk_delete_message};
use crate::session::SessionHandle;
use crate::upload::{Template, UploadControl, UploadKind, UploadSummary};
use crate::{ClientConfig, ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Members,
    Verifications,
    Corrections,
    SearchLogs,
    Users,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Members,
        Section::Verifications,
        Section::Corrections,
        Section::SearchLogs,
        Section::Users,
    ];

    /// `None`: any logged-in user
    pub fn required_capability(&self) -> Option<Capability> {
        match self {
            Section::Members => Some(Capability::ManageMembers),
            Section::Verifications => Some(Capability::ViewVerifications),
            Section::Corrections => Some(Capability::ViewCorrections),
            Section::SearchLogs => None,
            Section::Users => Some(Capability::ManageUsers),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Section::Members => "Members",
            Section::Verifications => "Verifications",
            Section::Corrections => "Correction Requests",
            Section::SearchLogs => "Search Logs",
            Section::Users => "Users",
        }
    }
}

/// Where a role lands after login
pub fn initial_section(role: Role) -> Section {
    let caps = role.capabilities();
    if caps.contains(Capability::ManageMembers) {
        Section::Members
    } else if caps.contains(Capability::ViewVerifications) {
        Section::Verifications
    } else if caps.contains(Capability::ViewCorrections) {
        Section::Corrections
    } else {
        Section::SearchLogs
    }
}

pub struct AdminPanel {
    backend: Arc<dyn Backend>,
    session: SessionHandle,
    section: Section,
    pub members: PagedList<String, Member>,
    pub verifications: PagedList<String, Verification>,
    pub corrections: PagedList<CorrectionListFilter, CorrectionRequest>,
    pub search_logs: PagedList<SuccessFilter, SearchLog>,
    users: Vec<User>,
    stats: Option<Stats>,
    pub selection: Selection,
    awaiting_delete_confirmation: bool,
    pub import: UploadControl,
    pub update: UploadControl,
    busy: bool,
    pub notice: NoticeBoard,
}

impl AdminPanel {
    pub fn new(backend: Arc<dyn Backend>, session: SessionHandle, config: &ClientConfig) -> Self {
        let sizes = config.page_sizes;
        Self {
            backend,
            session,
            section: Section::SearchLogs,
            members: PagedList::new(sizes.members, String::new()),
            verifications: PagedList::new(sizes.verifications, String::new()),
            corrections: PagedList::new(sizes.corrections, CorrectionListFilter::default()),
            search_logs: PagedList::new(sizes.search_logs, SuccessFilter::All),
            users: Vec::new(),
            stats: None,
            selection: Selection::default(),
            awaiting_delete_confirmation: false,
            import: UploadControl::new(UploadKind::Import),
            update: UploadControl::new(UploadKind::Update),
            busy: false,
            notice: NoticeBoard::default(),
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn stats(&self) -> Option<&Stats> {
        self.stats.as_ref()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.session.can(capability)
    }

    /// Sections the current user may see; the rest are not rendered at all
    pub fn visible_sections(&self) -> Vec<Section> {
        if !self.session.is_authenticated() {
            return Vec::new();
        }
        Section::ALL
            .into_iter()
            .filter(|s| s.required_capability().is_none_or(|cap| self.can(cap)))
            .collect()
    }

    /// Land on the role's first section and load it
    pub async fn enter(&mut self) -> ClientResult<()> {
        let Some(user) = self.session.user() else {
            return Err(ClientError::Unauthorized(String::new()));
        };
        self.switch_section(initial_section(user.role)).await
    }

    pub async fn switch_section(&mut self, section: Section) -> ClientResult<()> {
        self.require(section.required_capability())?;
        self.section = section;
        self.selection.clear();
        self.awaiting_delete_confirmation = false;
        self.notice.clear();
        self.refresh().await
    }

    /// Reload the current section and the stats
    pub async fn refresh(&mut self) -> ClientResult<()> {
        self.load_section().await?;
        self.load_stats().await
    }

    async fn load_section(&mut self) -> ClientResult<()> {
        match self.section {
            Section::Members => {
                let request = self.members.state.request();
                self.fetch_members(request).await
            }
            Section::Verifications => {
                let request = self.verifications.state.request();
                self.fetch_verifications(request).await
            }
            Section::Corrections => {
                let request = self.corrections.state.request();
                self.fetch_corrections(request).await
            }
            Section::SearchLogs => {
                let request = self.search_logs.state.request();
                self.fetch_search_logs(request).await
            }
            Section::Users => self.load_users().await,
        }
    }

    pub async fn load_stats(&mut self) -> ClientResult<()> {
        match self.backend.stats().await {
            Ok(stats) => {
                self.stats = Some(stats);
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    // ==================== Errors / guards ====================

    /// Surface `err`; a 401 also ends the session
    fn fail<T>(&mut self, err: ClientError) -> ClientResult<T> {
        if err.is_unauthorized() {
            tracing::info!("Session expired, clearing local session");
            self.session.clear();
        }
        self.notice.client_error(&err);
        Err(err)
    }

    /// Local gate; never issues a request
    fn require(&mut self, capability: Option<Capability>) -> ClientResult<()> {
        if !self.session.is_authenticated() {
            return Err(ClientError::Unauthorized(String::new()));
        }
        match capability {
            Some(cap) if !self.can(cap) => {
                self.fail(ClientError::Forbidden(PERMISSION_DENIED_MESSAGE.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn start(&mut self, capability: Capability) -> ClientResult<()> {
        self.require(Some(capability))?;
        if self.busy {
            return Err(ClientError::Busy);
        }
        self.busy = true;
        self.notice.clear();
        Ok(())
    }

    fn validation<T>(&mut self, message: impl Into<String>) -> ClientResult<T> {
        self.fail(ClientError::Validation(message.into()))
    }

    // ==================== List fetches ====================
    //
    // A fetch that lands past the new last page follows up with that page,
    // so the loops end once a response is applied or dropped as stale.

    async fn fetch_members(&mut self, mut request: ListRequest<String>) -> ClientResult<()> {
        self.selection.clear();
        loop {
            self.members.begin(&request);
            match self.backend.list_members(&request.member_query()).await {
                Ok(page) => match self.members.apply(request.token, page) {
                    Accept::Refetch(next) => request = next,
                    Accept::Applied | Accept::Stale => return Ok(()),
                },
                Err(e) => {
                    self.members.fail(request.token);
                    return self.fail(e);
                }
            }
        }
    }

    async fn fetch_verifications(&mut self, mut request: ListRequest<String>) -> ClientResult<()> {
        loop {
            self.verifications.begin(&request);
            match self
                .backend
                .list_verifications(&request.verification_query())
                .await
            {
                Ok(page) => match self.verifications.apply(request.token, page) {
                    Accept::Refetch(next) => request = next,
                    Accept::Applied | Accept::Stale => return Ok(()),
                },
                Err(e) => {
                    self.verifications.fail(request.token);
                    return self.fail(e);
                }
            }
        }
    }

    async fn fetch_corrections(
        &mut self,
        mut request: ListRequest<CorrectionListFilter>,
    ) -> ClientResult<()> {
        loop {
            self.corrections.begin(&request);
            match self
                .backend
                .list_corrections(&request.correction_query())
                .await
            {
                Ok(page) => match self.corrections.apply(request.token, page) {
                    Accept::Refetch(next) => request = next,
                    Accept::Applied | Accept::Stale => return Ok(()),
                },
                Err(e) => {
                    self.corrections.fail(request.token);
                    return self.fail(e);
                }
            }
        }
    }

    async fn fetch_search_logs(
        &mut self,
        mut request: ListRequest<SuccessFilter>,
    ) -> ClientResult<()> {
        loop {
            self.search_logs.begin(&request);
            match self
                .backend
                .list_search_logs(&request.search_log_query())
                .await
            {
                Ok(page) => match self.search_logs.apply(request.token, page) {
                    Accept::Refetch(next) => request = next,
                    Accept::Applied | Accept::Stale => return Ok(()),
                },
                Err(e) => {
                    self.search_logs.fail(request.token);
                    return self.fail(e);
                }
            }
        }
    }

    /// Pager for the current section; `false` when the button is a no-op
    pub async fn navigate(&mut self, nav: Nav) -> ClientResult<bool> {
        match self.section {
            Section::Members => match nav.apply(&mut self.members.state) {
                Some(request) => self.fetch_members(request).await.map(|_| true),
                None => Ok(false),
            },
            Section::Verifications => match nav.apply(&mut self.verifications.state) {
                Some(request) => self.fetch_verifications(request).await.map(|_| true),
                None => Ok(false),
            },
            Section::Corrections => match nav.apply(&mut self.corrections.state) {
                Some(request) => self.fetch_corrections(request).await.map(|_| true),
                None => Ok(false),
            },
            Section::SearchLogs => match nav.apply(&mut self.search_logs.state) {
                Some(request) => self.fetch_search_logs(request).await.map(|_| true),
                None => Ok(false),
            },
            Section::Users => Ok(false),
        }
    }

    pub async fn search_members(&mut self, text: &str) -> ClientResult<()> {
        let request = self.members.state.set_filter(text.to_string());
        self.fetch_members(request).await
    }

    pub async fn search_verifications(&mut self, text: &str) -> ClientResult<()> {
        let request = self.verifications.state.set_filter(text.to_string());
        self.fetch_verifications(request).await
    }

    pub async fn filter_corrections(&mut self, filter: CorrectionListFilter) -> ClientResult<()> {
        let request = self.corrections.state.set_filter(filter);
        self.fetch_corrections(request).await
    }

    pub async fn filter_search_logs(&mut self, filter: SuccessFilter) -> ClientResult<()> {
        let request = self.search_logs.state.set_filter(filter);
        self.fetch_search_logs(request).await
    }

    /// Re-fetch the members list and the stats after a change
    async fn after_member_change(&mut self) -> ClientResult<()> {
        let request = self.members.state.request();
        self.fetch_members(request).await?;
        self.load_stats().await
    }

    /// Banner for a change the server already applied
    ///
    /// A failed re-fetch does not turn the change into an error: the result is
    /// still returned and the banner says the change went through but the
    /// view is stale.
    fn settle(&mut self, message: impl Into<String>, refreshed: ClientResult<()>) {
        let message = message.into();
        match refreshed {
            Ok(()) => self.notice.success(message),
            Err(e) => {
                tracing::warn!(error = %e, "Reload after a completed change failed");
                self.notice.error(format!(
                    "{message}, but the list could not be reloaded. {}",
                    e.user_message()
                ));
            }
        }
    }

    // ==================== Members ====================

    pub async fn create_member(&mut self, member: MemberCreate) -> ClientResult<Member> {
        if let Err(e) = member.validate() {
            return self.fail(e.into());
        }
        self.start(Capability::ManageMembers)?;
        let result = self.backend.create_member(&member).await;
        self.busy = false;
        let created = match result {
            Ok(created) => created,
            Err(e) => return self.fail(e),
        };
        tracing::info!(member_number = %created.member_number, "Member created");
        let refreshed = self.after_member_change().await;
        self.settle("Member added successfully", refreshed);
        Ok(created)
    }

    pub async fn update_member(&mut self, id: i64, update: MemberUpdate) -> ClientResult<Member> {
        if let Err(e) = update.normalize() {
            return self.fail(e.into());
        }
        self.start(Capability::ManageMembers)?;
        let result = self.backend.update_member(id, &update).await;
        self.busy = false;
        let member = match result {
            Ok(member) => member,
            Err(e) => return self.fail(e),
        };
        let refreshed = self.after_member_change().await;
        self.settle("Member updated successfully", refreshed);
        Ok(member)
    }

    pub async fn delete_member(&mut self, id: i64) -> ClientResult<()> {
        self.start(Capability::ManageMembers)?;
        let result = self.backend.delete_member(id).await;
        self.busy = false;
        if let Err(e) = result {
            return self.fail(e);
        }
        let refreshed = self.after_member_change().await;
        self.settle("Member deleted successfully", refreshed);
        Ok(())
    }

    /// Toggle every row of the loaded page
    pub fn toggle_select_page(&mut self) {
        let ids: Vec<i64> = self.members.items().iter().map(|m| m.id).collect();
        self.selection.toggle_page(&ids);
    }

    /// First step of bulk delete: the confirmation prompt
    pub fn request_bulk_delete(&mut self) -> ClientResult<String> {
        if self.selection.is_empty() {
            return self.validation(EMPTY_SELECTION_MESSAGE);
        }
        self.awaiting_delete_confirmation = true;
        Ok(format!(
            "Are you sure you want to delete {} member(s)?",
            self.selection.len()
        ))
    }

    pub fn cancel_bulk_delete(&mut self) {
        self.awaiting_delete_confirmation = false;
    }

    pub fn is_awaiting_delete_confirmation(&self) -> bool {
        self.awaiting_delete_confirmation
    }

    /// Second step: post the selected ids; the message uses the server's count
    pub async fn confirm_bulk_delete(&mut self) -> ClientResult<u64> {
        if self.selection.is_empty() {
            return self.validation(EMPTY_SELECTION_MESSAGE);
        }
        if !self.awaiting_delete_confirmation {
            return self.validation("Confirm the deletion first");
        }
        self.start(Capability::ManageMembers)?;
        self.awaiting_delete_confirmation = false;

        let request = BulkDeleteRequest {
            ids: self.selection.ids(),
        };
        let result = self.backend.bulk_delete(&request).await;
        self.busy = false;
        let response = match result {
            Ok(response) => response,
            Err(e) => return self.fail(e),
        };
        if response.deleted < request.ids.len() as u64 {
            tracing::debug!(
                requested = request.ids.len(),
                deleted = response.deleted,
                "Some selected members were already gone"
            );
        }

        self.selection.clear();
        let refreshed = self.after_member_change().await;
        self.settle(bulk_delete_message(response.deleted), refreshed);
        Ok(response.deleted)
    }

    // ==================== Uploads ====================

    fn control(&mut self, kind: UploadKind) -> &mut UploadControl {
        match kind {
            UploadKind::Import => &mut self.import,
            UploadKind::Update => &mut self.update,
        }
    }

    /// Run the picked file through bulk-upload or bulk-update
    pub async fn submit_upload(&mut self, kind: UploadKind) -> ClientResult<UploadSummary> {
        self.require(Some(Capability::ManageMembers))?;
        let upload = match self.control(kind).begin() {
            Ok(upload) => upload,
            Err(ClientError::Busy) => return Err(ClientError::Busy),
            Err(e) => return self.fail(e),
        };
        self.notice.clear();

        let result = match kind {
            UploadKind::Import => self
                .backend
                .bulk_upload(upload)
                .await
                .map(|report| UploadSummary::from(&report)),
            UploadKind::Update => self
                .backend
                .bulk_update(upload)
                .await
                .map(|report| UploadSummary::from(&report)),
        };

        match result {
            Ok(summary) => {
                self.control(kind).finish(Some(summary.clone()));
                let refreshed = self.after_member_change().await;
                self.settle(summary.message.clone(), refreshed);
                Ok(summary)
            }
            Err(e) => {
                self.control(kind).finish(None);
                self.fail(e)
            }
        }
    }

    pub fn template(&self, kind: UploadKind) -> Template {
        Template::for_kind(kind)
    }

    // ==================== Users ====================

    pub async fn load_users(&mut self) -> ClientResult<()> {
        self.require(Some(Capability::ManageUsers))?;
        match self.backend.list_users().await {
            Ok(users) => {
                self.users = users;
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    /// Delete is offered for everyone but the logged-in user
    pub fn can_delete_user(&self, user: &User) -> bool {
        self.can(Capability::ManageUsers)
            && self.session.user().is_some_and(|me| me.id != user.id)
    }

    pub async fn create_user(&mut self, user: UserCreate) -> ClientResult<User> {
        if let Err(e) = user.validate() {
            return self.fail(e.into());
        }
        self.start(Capability::ManageUsers)?;
        let result = self.backend.create_user(&user).await;
        self.busy = false;
        let created = match result {
            Ok(created) => created,
            Err(e) => return self.fail(e),
        };
        let refreshed = self.load_users().await;
        self.settle("User created successfully", refreshed);
        Ok(created)
    }

    pub async fn update_user(&mut self, id: i64, update: UserUpdate) -> ClientResult<User> {
        self.start(Capability::ManageUsers)?;
        let result = self.backend.update_user(id, &update).await;
        self.busy = false;
        let user = match result {
            Ok(user) => user,
            Err(e) => return self.fail(e),
        };
        let refreshed = self.load_users().await;
        self.settle("User updated successfully", refreshed);
        Ok(user)
    }

    pub async fn delete_user(&mut self, id: i64) -> ClientResult<()> {
        if self.session.user().is_some_and(|me| me.id == id) {
            return self.validation("You cannot delete your own account");
        }
        self.start(Capability::ManageUsers)?;
        let result = self.backend.delete_user(id).await;
        self.busy = false;
        if let Err(e) = result {
            return self.fail(e);
        }
        let refreshed = self.load_users().await;
        self.settle("User deleted successfully", refreshed);
        Ok(())
    }

    // ==================== Corrections ====================

    pub async fn resolve_correction(&mut self, id: i64) -> ClientResult<CorrectionRequest> {
        self.start(Capability::ManageCorrections)?;
        let result = self.backend.resolve_correction(id).await;
        self.busy = false;
        let correction = match result {
            Ok(correction) => correction,
            Err(e) => return self.fail(e),
        };
        let request = self.corrections.state.request();
        let refreshed = match self.fetch_corrections(request).await {
            Ok(()) => self.load_stats().await,
            Err(e) => Err(e),
        };
        self.settle("Correction marked as resolved", refreshed);
        Ok(correction)
    }

    pub async fn download_correction(&mut self, id: i64) -> ClientResult<Download> {
        self.require(Some(Capability::ViewCorrections))?;
        match self.backend.correction_pdf(id).await {
            Ok(download) => Ok(download),
            Err(e) => self.fail(e),
        }
    }

    /// Every correction matching the current status filter
    pub async fn download_all_corrections(&mut self) -> ClientResult<Download> {
        self.require(Some(Capability::ViewCorrections))?;
        let status = self.corrections.state.filter().status;
        match self.backend.corrections_pdf(status).await {
            Ok(download) => Ok(download),
            Err(e) => self.fail(e),
        }
    }

    pub async fn logout(&mut self) {
        self.session.logout(self.backend.as_ref()).await;
        self.selection.clear();
        self.users.clear();
        self.stats = None;
        self.notice.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_section_per_role() {
        assert_eq!(initial_section(Role::SuperAdmin), Section::Members);
        assert_eq!(initial_section(Role::MemberManager), Section::Members);
        assert_eq!(initial_section(Role::VerificationViewer), Section::Verifications);
        assert_eq!(initial_section(Role::CorrectionViewer), Section::Corrections);
    }

    #[test]
    fn search_logs_need_only_a_session() {
        assert_eq!(Section::SearchLogs.required_capability(), None);
        assert_eq!(
            Section::Users.required_capability(),
            Some(Capability::ManageUsers)
        );
    }
}
