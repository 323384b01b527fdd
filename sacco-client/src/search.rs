//! Public member lookup
//!
//! `idle -> searching -> found | not_found`. From `found` the member either
//! confirms the record or files a correction. Starting a new search drops
//! everything left over from the previous one.

use std::sync::Arc;

use shared::client::{CorrectionSubmission, NOT_FOUND_MESSAGE, SearchRequest, VerifyDetailsRequest};
use shared::models::Member;

use crate::backend::Backend;
use crate::notice::NoticeBoard;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Searching,
    Found(Member),
    NotFound(String),
}

/// Correction form, prefilled from the found record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionForm {
    pub current_name: String,
    pub current_zone: String,
    pub current_status: String,
    pub correct_name: String,
    pub correct_zone: String,
    pub email: String,
    pub phone: String,
    pub additional_notes: String,
}

impl CorrectionForm {
    pub fn for_member(member: &Member) -> Self {
        Self {
            current_name: member.name.clone(),
            current_zone: member.zone.clone(),
            current_status: member.status.to_string(),
            ..Default::default()
        }
    }

    fn submission(&self, member: &Member, query: &SearchRequest) -> CorrectionSubmission {
        let optional = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        CorrectionSubmission {
            member_id: member.id,
            member_number: query.member_number.clone(),
            id_number: query.id_number.clone(),
            current_name: self.current_name.clone(),
            current_zone: self.current_zone.clone(),
            current_status: self.current_status.clone(),
            correct_name: optional(&self.correct_name),
            correct_zone: optional(&self.correct_zone),
            email: optional(&self.email),
            phone: optional(&self.phone),
            additional_notes: optional(&self.additional_notes),
        }
    }
}

pub struct PublicSearch {
    backend: Arc<dyn Backend>,
    pub member_number: String,
    pub id_number: String,
    state: SearchState,
    /// Trimmed inputs of the search that produced `Found`
    query: Option<SearchRequest>,
    correction: Option<CorrectionForm>,
    in_flight: bool,
    pub notice: NoticeBoard,
}

impl PublicSearch {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            member_number: String::new(),
            id_number: String::new(),
            state: SearchState::Idle,
            query: None,
            correction: None,
            in_flight: false,
            notice: NoticeBoard::default(),
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn correction(&self) -> Option<&CorrectionForm> {
        self.correction.as_ref()
    }

    pub fn correction_mut(&mut self) -> Option<&mut CorrectionForm> {
        self.correction.as_mut()
    }

    fn found(&self) -> ClientResult<(Member, SearchRequest)> {
        match (&self.state, &self.query) {
            (SearchState::Found(member), Some(query)) => Ok((member.clone(), query.clone())),
            _ => Err(ClientError::Validation("Search for your record first".to_string())),
        }
    }

    fn start(&mut self) -> ClientResult<()> {
        if self.in_flight {
            return Err(ClientError::Busy);
        }
        self.in_flight = true;
        Ok(())
    }

    fn fail<T>(&mut self, err: ClientError) -> ClientResult<T> {
        self.notice.client_error(&err);
        Err(err)
    }

    fn reset(&mut self) {
        self.state = SearchState::Idle;
        self.query = None;
        self.correction = None;
        self.notice.clear();
    }

    pub async fn search(&mut self) -> ClientResult<()> {
        let request = match SearchRequest::new(&self.member_number, &self.id_number).normalized()
        {
            Ok(request) => request,
            Err(e) => return self.fail(e.into()),
        };
        self.start()?;
        self.reset();
        self.state = SearchState::Searching;

        let result = self.backend.search(&request).await;
        self.in_flight = false;
        match result {
            Ok(response) => {
                self.state = match response.member {
                    Some(member) if response.found => {
                        self.query = Some(request);
                        SearchState::Found(member)
                    }
                    _ => SearchState::NotFound(
                        response
                            .message
                            .unwrap_or_else(|| NOT_FOUND_MESSAGE.to_string()),
                    ),
                };
                Ok(())
            }
            Err(e) => {
                self.state = SearchState::Idle;
                self.fail(e)
            }
        }
    }

    /// "These details are correct"
    pub async fn confirm(&mut self) -> ClientResult<String> {
        let (member, query) = match self.found() {
            Ok(found) => found,
            Err(e) => return self.fail(e),
        };
        self.start()?;

        let request = VerifyDetailsRequest {
            member_id: member.id,
            member_number: query.member_number,
            id_number: query.id_number,
            verified: true,
        };
        let result = self.backend.verify_details(&request).await;
        self.in_flight = false;
        match result {
            Ok(response) => {
                self.finish(&response.message);
                Ok(response.message)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Open the correction form for the found member
    pub fn start_correction(&mut self) -> ClientResult<&mut CorrectionForm> {
        let (member, _) = self.found()?;
        Ok(self
            .correction
            .get_or_insert_with(|| CorrectionForm::for_member(&member)))
    }

    pub fn cancel_correction(&mut self) {
        self.correction = None;
    }

    /// Needs an email or a phone number; checked before any request
    pub async fn submit_correction(&mut self) -> ClientResult<String> {
        let (member, query) = match self.found() {
            Ok(found) => found,
            Err(e) => return self.fail(e),
        };
        let submission = self
            .correction
            .as_ref()
            .map(|form| form.submission(&member, &query));
        let Some(submission) = submission else {
            return self.fail(ClientError::Validation(
                "Open the correction form first".to_string(),
            ));
        };
        if let Err(e) = submission.validate() {
            return self.fail(e.into());
        }
        self.start()?;

        let result = self.backend.submit_correction(&submission).await;
        self.in_flight = false;
        match result {
            Ok(response) => {
                self.finish(&response.message);
                Ok(response.message)
            }
            Err(e) => self.fail(e),
        }
    }

    fn finish(&mut self, message: &str) {
        self.reset();
        self.member_number.clear();
        self.id_number.clear();
        self.notice.success(message);
    }
}
