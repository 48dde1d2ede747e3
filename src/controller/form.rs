use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{PortalError, ValidationError};
use crate::notifier::Notifier;
use crate::resource::{Draft, Resource, ResourceClient};

use super::list::RefreshSignal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Editing,
    Submitting,
}

#[derive(Debug)]
pub enum SubmitOutcome<T> {
    /// Accepted by the server; the record is present when the reply echoed it
    Saved(Option<T>),
    /// Rejected locally; nothing was sent
    Invalid(ValidationError),
    /// Another submission was still in flight
    Ignored,
    Failed(PortalError),
}

impl<T> SubmitOutcome<T> {
    pub fn is_saved(&self) -> bool {
        matches!(self, SubmitOutcome::Saved(_))
    }
}

struct FormInner<D> {
    draft: D,
    mode: FormMode,
    open: bool,
    touched: BTreeSet<&'static str>,
    errors: Option<ValidationError>,
}

impl<D: Draft> FormInner<D> {
    fn reset(&mut self, mode: FormMode, draft: D) {
        self.draft = draft;
        self.mode = mode;
        self.touched.clear();
        self.errors = None;
    }
}

/// Clears the in-flight flag however the submission ends
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Create/update form over a resource draft.
///
/// A successful submit clears the draft, closes the form and sends exactly one
/// refresh signal to the owning list.
pub struct FormController<R: Resource> {
    client: ResourceClient<R>,
    list: Arc<dyn RefreshSignal>,
    notifier: Arc<dyn Notifier>,
    submitting: AtomicBool,
    inner: Mutex<FormInner<R::Draft>>,
}

impl<R: Resource> FormController<R> {
    pub fn new(client: ResourceClient<R>, list: Arc<dyn RefreshSignal>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            list,
            notifier,
            submitting: AtomicBool::new(false),
            inner: Mutex::new(FormInner {
                draft: R::Draft::default(),
                mode: FormMode::Create,
                open: false,
                touched: BTreeSet::new(),
                errors: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormInner<R::Draft>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn open_create(&self) {
        let mut inner = self.lock();
        inner.reset(FormMode::Create, R::Draft::default());
        inner.open = true;
    }

    pub fn open_edit(&self, id: impl Into<String>, draft: R::Draft) {
        let mut inner = self.lock();
        inner.reset(FormMode::Edit(id.into()), draft);
        inner.open = true;
    }

    pub fn close(&self) {
        self.lock().open = false;
    }

    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    /// Applies `update` to the draft; ignored while a submission is in flight
    pub fn edit(&self, update: impl FnOnce(&mut R::Draft)) -> bool {
        if self.submitting.load(Ordering::Acquire) {
            tracing::debug!(resource = R::NOUN, "edit ignored, submitting");
            return false;
        }
        update(&mut self.lock().draft);
        true
    }

    pub fn touch(&self, field: &'static str) {
        self.lock().touched.insert(field);
    }

    pub fn draft(&self) -> R::Draft {
        self.lock().draft.clone()
    }

    pub fn mode(&self) -> FormMode {
        self.lock().mode.clone()
    }

    pub fn touched(&self) -> BTreeSet<&'static str> {
        self.lock().touched.clone()
    }

    pub fn field_errors(&self) -> Option<ValidationError> {
        self.lock().errors.clone()
    }

    pub fn state(&self) -> FormState {
        if self.submitting.load(Ordering::Acquire) {
            FormState::Submitting
        } else {
            FormState::Editing
        }
    }

    pub async fn submit(&self) -> SubmitOutcome<R::Record> {
        if self.submitting.load(Ordering::Acquire) {
            tracing::debug!(resource = R::NOUN, "submit ignored, already submitting");
            return SubmitOutcome::Ignored;
        }

        let prepared = {
            let mut inner = self.lock();
            match inner.draft.validate() {
                Ok(()) => {
                    inner.errors = None;
                    Ok((inner.draft.clone(), inner.mode.clone()))
                }
                Err(errors) => {
                    inner.touched.extend(R::Draft::FIELDS.iter().copied());
                    inner.errors = Some(errors.clone());
                    Err(errors)
                }
            }
        };
        let (draft, mode) = match prepared {
            Ok(prepared) => prepared,
            Err(errors) => {
                self.notifier.error(&errors.to_string());
                return SubmitOutcome::Invalid(errors);
            }
        };

        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return SubmitOutcome::Ignored;
        }
        let _in_flight = InFlight(&self.submitting);

        let (result, verb) = match &mode {
            FormMode::Create => (self.client.create(&draft).await, "created"),
            FormMode::Edit(id) => (self.client.update(id, &draft).await, "updated"),
        };

        match result {
            Ok(record) => {
                {
                    let mut inner = self.lock();
                    inner.reset(FormMode::Create, R::Draft::default());
                    inner.open = false;
                }
                self.notifier
                    .success(&format!("{} {} successfully", R::NOUN, verb));
                self.list.signal_refresh().await;
                SubmitOutcome::Saved(record)
            }
            Err(err) => {
                tracing::warn!(resource = R::NOUN, "submit failed: {}", err);
                self.notifier.error(&err.user_message());
                SubmitOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Gateway, HttpResponse};
    use crate::resources::{ReferralDraft, Referrals};
    use crate::testing::{endpoints, session_for, CountingRefresh, RecordingNotifier, RecordingTransport};
    use serde_json::json;
    use std::time::Duration;

    fn created_referral() -> HttpResponse {
        HttpResponse::json(
            201,
            json!({ "success": true, "message": "created", "data": {
                "_id": "ref-1", "giver_id": "me", "receiver_id": "r-1", "rating": 4
            }}),
        )
    }

    fn form(
        transport: Arc<RecordingTransport>,
    ) -> (FormController<Referrals>, Arc<CountingRefresh>, Arc<RecordingNotifier>) {
        let refresh = CountingRefresh::new();
        let notifier = RecordingNotifier::new();
        let client = ResourceClient::new(Gateway::new(session_for("me"), transport), Arc::new(endpoints()));
        (FormController::new(client, refresh.clone(), notifier.clone()), refresh, notifier)
    }

    fn fill(draft: &mut ReferralDraft) {
        draft.receiver_id = "r-1".to_string();
        draft.mobile_number = "9876543210".to_string();
        draft.rating = 4;
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_network() {
        let transport = RecordingTransport::respond(created_referral());
        let (form, refresh, notifier) = form(transport.clone());
        form.open_create();
        form.edit(|d| {
            fill(d);
            d.mobile_number = "12345".to_string();
        });

        let outcome = form.submit().await;

        assert!(matches!(outcome, SubmitOutcome::Invalid(ref e) if e.has("mobile_number")));
        assert_eq!(transport.call_count(), 0);
        assert_eq!(refresh.count(), 0);
        assert_eq!(form.touched().len(), ReferralDraft::FIELDS.len());
        assert!(form.is_open());
        assert_eq!(notifier.errors(), vec!["Please fill all required fields correctly".to_string()]);
    }

    #[tokio::test]
    async fn test_successful_create_clears_draft_and_refreshes_once() {
        let transport = RecordingTransport::respond(created_referral());
        let (form, refresh, notifier) = form(transport.clone());
        form.open_create();
        form.edit(fill);

        let outcome = form.submit().await;

        assert!(outcome.is_saved());
        assert_eq!(transport.call_count(), 1);
        assert_eq!(refresh.count(), 1);
        assert_eq!(form.draft(), ReferralDraft::default());
        assert!(!form.is_open());
        assert_eq!(form.state(), FormState::Editing);
        assert_eq!(notifier.successes(), vec!["Referral created successfully".to_string()]);
        assert_eq!(transport.requests()[0].body.as_ref().unwrap()["giver_id"], "me");
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_submit_while_submitting_is_ignored() {
        let transport = RecordingTransport::delayed(created_referral(), Duration::from_millis(200));
        let (form, refresh, _) = form(transport.clone());
        form.open_create();
        form.edit(fill);

        let (first, second) = tokio::join!(form.submit(), form.submit());

        assert!(first.is_saved());
        assert!(matches!(second, SubmitOutcome::Ignored));
        assert_eq!(transport.call_count(), 1);
        assert_eq!(refresh.count(), 1);
    }

    #[tokio::test]
    async fn test_created_reply_without_record_counts_as_saved() {
        let transport = RecordingTransport::respond(HttpResponse::json(
            201,
            json!({ "success": true, "message": "Referral created successfully" }),
        ));
        let (form, refresh, notifier) = form(transport.clone());
        form.open_create();
        form.edit(fill);

        let outcome = form.submit().await;

        assert!(matches!(outcome, SubmitOutcome::Saved(None)));
        assert_eq!(transport.call_count(), 1);
        assert_eq!(refresh.count(), 1);
        assert!(!form.is_open());
        assert_eq!(form.draft(), ReferralDraft::default());
        assert!(notifier.errors().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_during_submit_are_ignored() {
        let transport = RecordingTransport::delayed(created_referral(), Duration::from_millis(200));
        let (form, _, _) = form(transport.clone());
        form.open_create();
        form.edit(fill);

        let late_edit = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert_eq!(form.state(), FormState::Submitting);
            form.edit(|d| d.comments = "typed while saving".to_string())
        };
        let (outcome, applied) = tokio::join!(form.submit(), late_edit);

        assert!(outcome.is_saved());
        assert!(!applied);
        assert_eq!(transport.requests()[0].body.as_ref().unwrap()["comments"], "");
        assert!(form.edit(|d| d.comments = "after".to_string()));
        assert_eq!(form.draft().comments, "after");
    }

    #[tokio::test]
    async fn test_rate_limited_keeps_draft_and_reports_server_message() {
        let transport = RecordingTransport::respond(HttpResponse::json(
            429,
            json!({ "success": false, "message": "rate limited" }),
        ));
        let (form, refresh, notifier) = form(transport.clone());
        form.open_create();
        form.edit(fill);
        let before = form.draft();

        let outcome = form.submit().await;

        assert!(matches!(outcome, SubmitOutcome::Failed(ref e) if e.status() == Some(429)));
        assert_eq!(form.state(), FormState::Editing);
        assert_eq!(form.draft(), before);
        assert!(form.is_open());
        assert_eq!(refresh.count(), 0);
        assert_eq!(notifier.errors(), vec!["rate limited".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_session_aborts_before_mutation() {
        let transport = RecordingTransport::respond(created_referral());
        let client: ResourceClient<Referrals> = ResourceClient::new(
            Gateway::new(Arc::new(crate::session::Session::in_memory()), transport.clone()),
            Arc::new(endpoints()),
        );
        let refresh = CountingRefresh::new();
        let notifier = RecordingNotifier::new();
        let form = FormController::new(client, refresh.clone(), notifier.clone());
        form.edit(fill);

        let outcome = form.submit().await;

        assert!(matches!(outcome, SubmitOutcome::Failed(PortalError::AuthToken(_))));
        assert_eq!(transport.call_count(), 0);
        assert_eq!(notifier.errors(), vec!["No authentication token found".to_string()]);
    }

    #[tokio::test]
    async fn test_edit_mode_sends_update() {
        let transport = RecordingTransport::respond(created_referral());
        let (form, refresh, notifier) = form(transport.clone());
        let mut draft = ReferralDraft::default();
        fill(&mut draft);
        form.open_edit("ref-1", draft);

        assert!(form.submit().await.is_saved());

        let sent = transport.requests();
        assert_eq!(sent[0].method, crate::gateway::Method::Put);
        assert!(sent[0].target.ends_with("/update-referral/ref-1"));
        assert_eq!(form.mode(), FormMode::Create);
        assert_eq!(refresh.count(), 1);
        assert_eq!(notifier.successes(), vec!["Referral updated successfully".to_string()]);
    }
}
