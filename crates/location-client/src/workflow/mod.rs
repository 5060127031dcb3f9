// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Workflow dialogs as an explicit state machine.
//!
//! Both remote workflows (query a known location, process a new one) share
//! one dialog lifecycle: `input → working → closed-on-success`, with
//! `working → failure → {input, closed}` on a rejected or failed request.
//! [`Dialog`] owns the states and transitions; [`WorkflowController`] owns
//! dispatching requests on worker threads and routing replies back into the
//! machine, discarding replies whose dialog has since been closed or
//! superseded.
//!
//! Invariants upheld here:
//!
//! - at most one dialog is open at a time;
//! - `working` is only reachable through `input`'s submit, and accepts no
//!   further input (exactly one request in flight per open dialog);
//! - retry re-enters `input` with every previously entered field intact;
//! - a reply arriving after its dialog was closed never re-opens it.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use log::{info, warn};

use crate::protocol::{LocationResponse, Request, ServerReply};
use crate::transport::{Transport, TransportError};

/// Default radius form value, in meters.
pub const DEFAULT_RADIUS: &str = "200";

/// The two remote workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowKind {
    Query,
    Process,
}

impl WorkflowKind {
    /// Dialog title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Query => "Query location",
            Self::Process => "Process location",
        }
    }

    /// Body text while the request is in flight.
    #[must_use]
    pub fn working_message(self) -> &'static str {
        match self {
            Self::Query => "Querying location...",
            Self::Process => "Processing location...",
        }
    }

    /// Headline above the server reason in the failure state.
    #[must_use]
    pub fn failure_headline(self) -> &'static str {
        match self {
            Self::Query => "Failed to query location.",
            Self::Process => "Failed to process location.",
        }
    }
}

/// Dialog lifecycle states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogState {
    /// Collecting form input.
    Input,
    /// Exactly one request in flight; no input accepted.
    Working,
    /// The request failed; `reason` is the server's text, shown verbatim.
    Failure { reason: String },
}

/// Form state for the query workflow.
///
/// `names` stays `None` until the name list arrives from the server; the
/// selection control is disabled while it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryForm {
    pub names: Option<Vec<String>>,
    pub selected: usize,
}

impl QueryForm {
    /// Whether a name can be submitted.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.selected_name().is_some()
    }

    /// The currently selected name, once the list has arrived.
    #[must_use]
    pub fn selected_name(&self) -> Option<&str> {
        self.names
            .as_ref()
            .and_then(|names| names.get(self.selected))
            .map(String::as_str)
    }

    /// Install the server-supplied name list, preselecting `preselect` when
    /// it is present in the list.
    pub fn load_names(&mut self, names: Vec<String>, preselect: Option<&str>) {
        if let Some(current) = preselect {
            if let Some(index) = names.iter().position(|name| name == current) {
                self.selected = index;
            }
        }
        self.names = Some(names);
    }
}

/// An image attached to the process form, already encoded for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub file_name: String,
    /// `data:<mime>;base64,…` string as submitted to the server.
    pub data_url: String,
}

/// Form state for the process workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessForm {
    pub lat: String,
    pub lon: String,
    pub radius: String,
    pub surs: String,
    pub image: Option<ImageAttachment>,
}

impl Default for ProcessForm {
    fn default() -> Self {
        Self {
            lat: String::new(),
            lon: String::new(),
            radius: DEFAULT_RADIUS.to_string(),
            surs: String::new(),
            image: None,
        }
    }
}

/// Form payload of an open dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowForm {
    Query(QueryForm),
    Process(ProcessForm),
}

impl WorkflowForm {
    /// Build the request for the current form values, if submittable.
    ///
    /// The process form submits whatever the operator typed; validation is
    /// the server's job and failures come back through the envelope.
    fn request(&self) -> Option<Request> {
        match self {
            Self::Query(form) => form.selected_name().map(|name| Request::QueryLocation {
                location_name: name.to_string(),
            }),
            Self::Process(form) => Some(Request::ProcessLocation {
                lat: form.lat.clone(),
                lon: form.lon.clone(),
                radius: form.radius.clone(),
                surs: form.surs.clone(),
                image_base_64: form.image.as_ref().map(|image| image.data_url.clone()),
            }),
        }
    }
}

/// One open workflow dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct Dialog {
    state: DialogState,
    form: WorkflowForm,
}

impl Dialog {
    fn new(kind: WorkflowKind) -> Self {
        let form = match kind {
            WorkflowKind::Query => WorkflowForm::Query(QueryForm::default()),
            WorkflowKind::Process => WorkflowForm::Process(ProcessForm::default()),
        };
        Self {
            state: DialogState::Input,
            form,
        }
    }

    /// Which workflow this dialog drives.
    #[must_use]
    pub fn kind(&self) -> WorkflowKind {
        match self.form {
            WorkflowForm::Query(_) => WorkflowKind::Query,
            WorkflowForm::Process(_) => WorkflowKind::Process,
        }
    }

    #[must_use]
    pub fn state(&self) -> &DialogState {
        &self.state
    }

    #[must_use]
    pub fn form(&self) -> &WorkflowForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut WorkflowForm {
        &mut self.form
    }

    /// Submit the form: `input → working`, yielding the request to send.
    ///
    /// Any other state, or an unsubmittable form, is a no-op; `working` is
    /// never re-entrant.
    fn submit(&mut self) -> Option<Request> {
        if self.state != DialogState::Input {
            return None;
        }
        let request = self.form.request()?;
        self.state = DialogState::Working;
        Some(request)
    }

    /// Record a failed request: `working → failure`.
    fn fail(&mut self, reason: String) {
        if self.state == DialogState::Working {
            self.state = DialogState::Failure { reason };
        }
    }

    /// Retry after a failure: `failure → input`, form values intact.
    fn retry(&mut self) {
        if matches!(self.state, DialogState::Failure { .. }) {
            self.state = DialogState::Input;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Purpose {
    /// Name-list fetch issued when the query dialog opens.
    NameList,
    /// The dialog's single submission.
    Submission,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    seq: u64,
    purpose: Purpose,
}

type ReplyMessage = (u64, Purpose, Result<ServerReply, TransportError>);
type Waker = Arc<dyn Fn() + Send + Sync>;

/// Drives the workflow dialogs against a [`Transport`].
///
/// Requests run on worker threads; the frontend calls
/// [`poll`](Self::poll) every frame to route finished replies into the
/// dialog machine. An accepted location is returned to the caller, which is
/// responsible for replacing the response store and re-rendering dependents
/// in order.
pub struct WorkflowController {
    transport: Arc<dyn Transport>,
    dialog: Option<Dialog>,
    pending: Option<Pending>,
    seq: u64,
    reply_tx: Sender<ReplyMessage>,
    reply_rx: Receiver<ReplyMessage>,
    waker: Option<Waker>,
    threaded: bool,
}

impl std::fmt::Debug for WorkflowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowController")
            .field("dialog", &self.dialog)
            .field("pending", &self.pending)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

impl WorkflowController {
    /// Create a controller over the given transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (reply_tx, reply_rx) = channel();
        Self {
            transport,
            dialog: None,
            pending: None,
            seq: 0,
            reply_tx,
            reply_rx,
            waker: None,
            threaded: true,
        }
    }

    /// Controller whose dispatches record a pending request but spawn no
    /// worker; tests feed replies in by hand.
    #[cfg(test)]
    fn new_manual(transport: Arc<dyn Transport>) -> Self {
        let mut controller = Self::new(transport);
        controller.threaded = false;
        controller
    }

    /// Install a callback invoked from worker threads when a reply is ready,
    /// so the frontend can schedule a repaint.
    pub fn set_waker(&mut self, waker: Waker) {
        self.waker = Some(waker);
    }

    /// The open dialog, if any.
    #[must_use]
    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    /// Mutable access to the open dialog, for form editing.
    pub fn dialog_mut(&mut self) -> Option<&mut Dialog> {
        self.dialog.as_mut()
    }

    /// Whether any dialog is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.dialog.is_some()
    }

    /// Whether a request is in flight.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Open a workflow dialog.
    ///
    /// A no-op while any dialog is open: the modal is singular. Opening the
    /// query dialog immediately fetches the name list.
    pub fn open(&mut self, kind: WorkflowKind) -> bool {
        if self.dialog.is_some() {
            return false;
        }
        self.dialog = Some(Dialog::new(kind));
        if kind == WorkflowKind::Query {
            self.dispatch(Purpose::NameList, Request::QueryLocationNames);
        }
        true
    }

    /// Submit the open dialog's form.
    pub fn submit(&mut self) {
        let request = self.dialog.as_mut().and_then(Dialog::submit);
        if let Some(request) = request {
            info!("submitting workflow request: {}", request.action());
            self.dispatch(Purpose::Submission, request);
        }
    }

    /// Close the dialog from the input state. No side effect.
    pub fn cancel(&mut self) {
        if self
            .dialog
            .as_ref()
            .is_some_and(|dialog| *dialog.state() == DialogState::Input)
        {
            self.close();
        }
    }

    /// Close the dialog from the failure state, abandoning the workflow.
    pub fn acknowledge(&mut self) {
        if self
            .dialog
            .as_ref()
            .is_some_and(|dialog| matches!(dialog.state(), DialogState::Failure { .. }))
        {
            self.close();
        }
    }

    /// Return from the failure state to the input state for another attempt.
    pub fn retry(&mut self) {
        if let Some(dialog) = &mut self.dialog {
            dialog.retry();
        }
    }

    fn close(&mut self) {
        self.dialog = None;
        // Anything still in flight belongs to the closed dialog; its reply
        // must be discarded when it arrives.
        self.pending = None;
    }

    fn dispatch(&mut self, purpose: Purpose, request: Request) {
        self.seq += 1;
        self.pending = Some(Pending {
            seq: self.seq,
            purpose,
        });

        if !self.threaded {
            return;
        }

        let seq = self.seq;
        let transport = Arc::clone(&self.transport);
        let reply_tx = self.reply_tx.clone();
        let waker = self.waker.clone();
        thread::spawn(move || {
            let result = transport.post(&request);
            if reply_tx.send((seq, purpose, result)).is_ok() {
                if let Some(waker) = waker {
                    waker();
                }
            }
        });
    }

    #[cfg(test)]
    fn inject_reply(&self, seq: u64, purpose: Purpose, result: Result<ServerReply, TransportError>) {
        self.reply_tx
            .send((seq, purpose, result))
            .expect("controller owns the receiver");
    }

    /// Route finished replies into the dialog machine.
    ///
    /// `current_name` preselects the name list when it arrives. Returns an
    /// accepted [`LocationResponse`] when a submission succeeded; the dialog
    /// is already closed by then.
    pub fn poll(&mut self, current_name: Option<&str>) -> Option<LocationResponse> {
        let mut accepted = None;
        while let Ok((seq, purpose, result)) = self.reply_rx.try_recv() {
            let Some(pending) = self.pending else {
                // Dialog was closed while the request was in flight.
                continue;
            };
            if pending.seq != seq {
                continue;
            }
            self.pending = None;
            match purpose {
                Purpose::NameList => self.apply_name_list(result, current_name),
                Purpose::Submission => accepted = self.apply_submission(result),
            }
        }
        accepted
    }

    fn apply_name_list(
        &mut self,
        result: Result<ServerReply, TransportError>,
        current_name: Option<&str>,
    ) {
        let Some(dialog) = &mut self.dialog else {
            return;
        };
        let WorkflowForm::Query(form) = dialog.form_mut() else {
            return;
        };
        match result {
            Ok(ServerReply::LocationNames(names)) => form.load_names(names, current_name),
            Ok(ServerReply::Failure { reason }) => {
                warn!("failed to load location names: {reason}");
                form.load_names(Vec::new(), None);
            }
            Ok(ServerReply::Location(_)) => {
                warn!("unexpected payload for name list request");
                form.load_names(Vec::new(), None);
            }
            Err(error) => {
                warn!("failed to load location names: {error}");
                form.load_names(Vec::new(), None);
            }
        }
    }

    fn apply_submission(
        &mut self,
        result: Result<ServerReply, TransportError>,
    ) -> Option<LocationResponse> {
        let dialog = self.dialog.as_mut()?;
        if *dialog.state() != DialogState::Working {
            return None;
        }
        match result {
            Ok(ServerReply::Location(response)) => {
                info!("workflow accepted location: {}", response.name);
                self.dialog = None;
                Some(*response)
            }
            Ok(ServerReply::Failure { reason }) => {
                dialog.fail(reason);
                None
            }
            Ok(ServerReply::LocationNames(_)) => {
                dialog.fail("unexpected reply payload".to_string());
                None
            }
            Err(error) => {
                dialog.fail(error.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use indexmap::IndexMap;

    fn location(name: &str) -> LocationResponse {
        LocationResponse {
            name: name.to_string(),
            point: [53.5, 9.9],
            image_file_path: None,
            surs: IndexMap::new(),
            truth: None,
            computed: None,
            ways: IndexMap::new(),
            kml: "<kml/>".to_string(),
            kml_name: format!("{name}.kml"),
        }
    }

    /// Scripted transport; pops one reply per request, records requests.
    struct FakeTransport {
        replies: Mutex<VecDeque<Result<ServerReply, TransportError>>>,
        requests: Mutex<Vec<Request>>,
    }

    impl FakeTransport {
        fn new(replies: Vec<Result<ServerReply, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for FakeTransport {
        fn post(&self, request: &Request) -> Result<ServerReply, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(ServerReply::Failure {
                    reason: "no scripted reply".to_string(),
                }))
        }
    }

    /// Poll until the in-flight request has been routed.
    fn pump(
        controller: &mut WorkflowController,
        current_name: Option<&str>,
    ) -> Option<LocationResponse> {
        for _ in 0..400 {
            let accepted = controller.poll(current_name);
            if !controller.has_pending() {
                return accepted;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("reply never arrived");
    }

    fn process_form(dialog: &mut Dialog) -> &mut ProcessForm {
        match dialog.form_mut() {
            WorkflowForm::Process(form) => form,
            WorkflowForm::Query(_) => panic!("expected process form"),
        }
    }

    #[test]
    fn test_only_one_dialog_opens() {
        let transport = FakeTransport::new(vec![]);
        let mut controller = WorkflowController::new_manual(transport);

        assert!(controller.open(WorkflowKind::Process));
        assert!(!controller.open(WorkflowKind::Query));
        // The open dialog is unchanged.
        assert_eq!(
            controller.dialog().unwrap().kind(),
            WorkflowKind::Process
        );
    }

    #[test]
    fn test_query_open_loads_and_preselects_names() {
        let transport = FakeTransport::new(vec![Ok(ServerReply::LocationNames(vec![
            "Alpha".to_string(),
            "Beta".to_string(),
        ]))]);
        let mut controller = WorkflowController::new(transport.clone());

        controller.open(WorkflowKind::Query);
        pump(&mut controller, Some("Beta"));

        let dialog = controller.dialog().unwrap();
        let WorkflowForm::Query(form) = dialog.form() else {
            panic!("expected query form");
        };
        assert_eq!(
            form.names,
            Some(vec!["Alpha".to_string(), "Beta".to_string()])
        );
        assert_eq!(form.selected_name(), Some("Beta"));
        assert_eq!(transport.requests(), vec![Request::QueryLocationNames]);
    }

    #[test]
    fn test_name_list_failure_enables_empty_list() {
        let transport = FakeTransport::new(vec![Ok(ServerReply::Failure {
            reason: "no data".to_string(),
        })]);
        let mut controller = WorkflowController::new(transport);

        controller.open(WorkflowKind::Query);
        pump(&mut controller, None);

        let WorkflowForm::Query(form) = controller.dialog().unwrap().form() else {
            panic!("expected query form");
        };
        assert_eq!(form.names, Some(Vec::new()));
        assert!(!form.is_ready());
    }

    #[test]
    fn test_query_submit_before_names_is_noop() {
        let transport = FakeTransport::new(vec![]);
        let mut controller = WorkflowController::new_manual(transport);

        controller.open(WorkflowKind::Query);
        // The name list has not arrived; the form is not submittable.
        controller.submit();
        assert_eq!(*controller.dialog().unwrap().state(), DialogState::Input);
    }

    #[test]
    fn test_process_success_closes_and_yields_response() {
        let transport = FakeTransport::new(vec![Ok(ServerReply::Location(Box::new(location(
            "Manual",
        ))))]);
        let mut controller = WorkflowController::new(transport.clone());

        controller.open(WorkflowKind::Process);
        {
            let form = process_form(controller.dialog_mut().unwrap());
            form.lat = "53.5".to_string();
            form.lon = "9.9".to_string();
            form.surs = "smoking=\"no\"".to_string();
        }
        controller.submit();
        assert_eq!(*controller.dialog().unwrap().state(), DialogState::Working);

        let accepted = pump(&mut controller, None);
        assert_eq!(accepted.unwrap().name, "Manual");
        assert!(!controller.is_open());

        // Exactly one request, carrying the action and the typed fields.
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let fields = requests[0].form_fields();
        assert!(fields.contains(&("action", "process_location".to_string())));
        assert!(fields.contains(&("lat", "53.5".to_string())));
        assert!(fields.contains(&("radius", DEFAULT_RADIUS.to_string())));
    }

    #[test]
    fn test_failure_shows_reason_and_retry_preserves_form() {
        let transport = FakeTransport::new(vec![Ok(ServerReply::Failure {
            reason: "out of bounds".to_string(),
        })]);
        let mut controller = WorkflowController::new(transport);

        controller.open(WorkflowKind::Process);
        {
            let form = process_form(controller.dialog_mut().unwrap());
            form.lat = "91.0".to_string();
            form.lon = "9.9".to_string();
            form.radius = "500".to_string();
            form.surs = "smoking=\"no\"\nlit=\"yes\"".to_string();
            form.image = Some(ImageAttachment {
                file_name: "door.png".to_string(),
                data_url: "data:image/png;base64,AAAA".to_string(),
            });
        }
        controller.submit();

        let accepted = pump(&mut controller, None);
        assert!(accepted.is_none());
        assert_eq!(
            *controller.dialog().unwrap().state(),
            DialogState::Failure {
                reason: "out of bounds".to_string()
            }
        );

        controller.retry();
        let dialog = controller.dialog_mut().unwrap();
        assert_eq!(*dialog.state(), DialogState::Input);
        let form = process_form(dialog);
        assert_eq!(form.lat, "91.0");
        assert_eq!(form.lon, "9.9");
        assert_eq!(form.radius, "500");
        assert_eq!(form.surs, "smoking=\"no\"\nlit=\"yes\"");
        assert_eq!(form.image.as_ref().unwrap().file_name, "door.png");
    }

    #[test]
    fn test_transport_error_routes_to_failure() {
        let transport = FakeTransport::new(vec![Err(TransportError::Connection(
            "connection refused".to_string(),
        ))]);
        let mut controller = WorkflowController::new(transport);

        controller.open(WorkflowKind::Process);
        controller.submit();
        pump(&mut controller, None);

        let DialogState::Failure { reason } = controller.dialog().unwrap().state() else {
            panic!("expected failure state");
        };
        assert!(reason.contains("connection refused"));
    }

    #[test]
    fn test_acknowledge_closes_without_side_effect() {
        let transport = FakeTransport::new(vec![Ok(ServerReply::Failure {
            reason: "nope".to_string(),
        })]);
        let mut controller = WorkflowController::new(transport);

        controller.open(WorkflowKind::Process);
        controller.submit();
        pump(&mut controller, None);

        controller.acknowledge();
        assert!(!controller.is_open());
    }

    #[test]
    fn test_cancel_only_applies_in_input_state() {
        let transport = FakeTransport::new(vec![]);
        let mut controller = WorkflowController::new_manual(transport);

        controller.open(WorkflowKind::Process);
        controller.submit();
        assert_eq!(*controller.dialog().unwrap().state(), DialogState::Working);

        // Working accepts no input; the dialog stays open.
        controller.cancel();
        assert!(controller.is_open());
    }

    #[test]
    fn test_working_is_not_reentrant() {
        let transport = FakeTransport::new(vec![]);
        let mut controller = WorkflowController::new_manual(transport);

        controller.open(WorkflowKind::Process);
        controller.submit();
        let seq_after_first = controller.seq;
        controller.submit();
        assert_eq!(controller.seq, seq_after_first);
    }

    #[test]
    fn test_reply_after_cancel_is_discarded() {
        let transport = FakeTransport::new(vec![]);
        let mut controller = WorkflowController::new_manual(transport);

        controller.open(WorkflowKind::Query);
        controller.cancel();
        controller.inject_reply(
            1,
            Purpose::NameList,
            Ok(ServerReply::LocationNames(vec!["Stale".to_string()])),
        );
        assert!(controller.poll(None).is_none());
        assert!(!controller.is_open());
    }

    #[test]
    fn test_superseded_reply_is_discarded() {
        let transport = FakeTransport::new(vec![]);
        let mut controller = WorkflowController::new_manual(transport);

        controller.open(WorkflowKind::Query);
        controller.cancel();
        controller.open(WorkflowKind::Query);

        // The first dialog's name list arrives late.
        controller.inject_reply(
            1,
            Purpose::NameList,
            Ok(ServerReply::LocationNames(vec!["Stale".to_string()])),
        );
        controller.poll(None);
        let WorkflowForm::Query(form) = controller.dialog().unwrap().form() else {
            panic!("expected query form");
        };
        assert_eq!(form.names, None);

        // The second dialog's list applies normally.
        controller.inject_reply(
            2,
            Purpose::NameList,
            Ok(ServerReply::LocationNames(vec!["Fresh".to_string()])),
        );
        controller.poll(None);
        let WorkflowForm::Query(form) = controller.dialog().unwrap().form() else {
            panic!("expected query form");
        };
        assert_eq!(form.names, Some(vec!["Fresh".to_string()]));
    }

    #[test]
    fn test_failure_reply_after_close_does_not_reopen() {
        let transport = FakeTransport::new(vec![]);
        let mut controller = WorkflowController::new_manual(transport);

        controller.open(WorkflowKind::Process);
        controller.submit();
        controller.inject_reply(
            1,
            Purpose::Submission,
            Ok(ServerReply::Failure {
                reason: "first".to_string(),
            }),
        );
        controller.poll(None);
        controller.acknowledge();
        assert!(!controller.is_open());

        // A duplicate failure reply for the closed dialog arrives late.
        controller.inject_reply(
            1,
            Purpose::Submission,
            Ok(ServerReply::Failure {
                reason: "second".to_string(),
            }),
        );
        assert!(controller.poll(None).is_none());
        assert!(!controller.is_open());
    }

    #[test]
    fn test_retry_from_input_is_noop() {
        let transport = FakeTransport::new(vec![]);
        let mut controller = WorkflowController::new_manual(transport);

        controller.open(WorkflowKind::Process);
        controller.retry();
        assert_eq!(*controller.dialog().unwrap().state(), DialogState::Input);
    }
}
