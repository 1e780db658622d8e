//! Anchor lifecycle driver
//!
//! [`AnchorMachine`] pairs the [`AnchorState`] table with the side effects of
//! each state. At most one asynchronous operation is in flight at a time and
//! it always belongs to the current state: leaving a state aborts it, so a
//! completion that arrives late is never observed.

use crate::cache::AnchorCache;
use crate::error::AnchorError;
use crate::provider::AnchorProvider;
use crate::record::{AnchorEndpoints, AnchorRecord, AnchorUploadBody};
use crate::state::{anchor_events::*, AnchorState};
use enklu_core::{
    AsyncToken, EventId, HttpResponse, HttpService, StateMachine, TokenPoll, TrellisResponse,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outbound notifications, drained by the host once per tick
#[derive(Clone, Debug, PartialEq)]
pub enum AnchorNotification {
    StateChanged { from: AnchorState, to: AnchorState },
    /// Exported bytes were imported (or there was nothing to import)
    Loaded { version: u32 },
    /// An upload was accepted under a new version
    Saved { version: u32 },
    Failed { state: AnchorState, reason: String },
}

enum Operation {
    Idle,
    Downloading(AsyncToken<HttpResponse>),
    Importing(AsyncToken<()>),
    Exporting(AsyncToken<Vec<u8>>),
    Uploading {
        token: AsyncToken<HttpResponse>,
        bytes: Vec<u8>,
    },
}

impl Operation {
    fn abort(&mut self) {
        match self {
            Operation::Idle => {}
            Operation::Downloading(token) => token.abort(),
            Operation::Importing(token) => token.abort(),
            Operation::Exporting(token) => token.abort(),
            Operation::Uploading { token, .. } => token.abort(),
        }
    }

    fn is_idle(&self) -> bool {
        matches!(self, Operation::Idle)
    }
}

/// What a poll decided
enum Step {
    Wait(Operation),
    Send(EventId),
}

/// Drives one anchor through load, edit and save
pub struct AnchorMachine {
    record: AnchorRecord,
    endpoints: AnchorEndpoints,
    provider: Arc<dyn AnchorProvider>,
    http: Arc<dyn HttpService>,
    cache: Arc<dyn AnchorCache>,
    fsm: StateMachine<AnchorState>,
    operation: Operation,
    notifications: Vec<AnchorNotification>,
    last_error: Option<AnchorError>,
}

impl AnchorMachine {
    /// Create the machine and enter `Loading`
    pub fn new(
        record: AnchorRecord,
        endpoints: AnchorEndpoints,
        provider: Arc<dyn AnchorProvider>,
        http: Arc<dyn HttpService>,
        cache: Arc<dyn AnchorCache>,
    ) -> Self {
        let mut machine = Self {
            record,
            endpoints,
            provider,
            http,
            cache,
            fsm: StateMachine::new(AnchorState::Loading),
            operation: Operation::Idle,
            notifications: Vec::new(),
            last_error: None,
        };
        machine.enter(AnchorState::Loading);
        machine
    }

    pub fn state(&self) -> AnchorState {
        self.fsm.current()
    }

    pub fn is_locked(&self) -> bool {
        self.record.locked
    }

    pub fn record(&self) -> &AnchorRecord {
        &self.record
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Failure that last moved the machine to `Error`
    pub fn last_error(&self) -> Option<&AnchorError> {
        self.last_error.as_ref()
    }

    pub fn has_pending_operation(&self) -> bool {
        !self.operation.is_idle()
    }

    pub fn take_notifications(&mut self) -> Vec<AnchorNotification> {
        std::mem::take(&mut self.notifications)
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// `Ready`/`Moving` → `Moving`: allow the user to move the anchor
    pub fn begin_edit(&mut self) -> bool {
        self.command(BEGIN_EDIT, "begin_edit")
    }

    /// `Moving` → `Saving`: export and upload the new pose
    pub fn finalize_edit(&mut self) -> bool {
        self.command(FINALIZE_EDIT, "finalize_edit")
    }

    /// Any state → `Loading`: discard edits and reload
    pub fn abort_edit(&mut self) -> bool {
        self.command(ABORT_EDIT, "abort_edit")
    }

    /// `Error` → `Loading`
    pub fn retry(&mut self) -> bool {
        self.command(RETRY, "retry")
    }

    fn command(&mut self, event: EventId, name: &str) -> bool {
        if !self.fsm.can_send(event) {
            warn!(
                "anchor {}: {} ignored in state {:?}",
                self.record.id,
                name,
                self.state()
            );
            return false;
        }
        self.send(event)
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Poll the in-flight operation and advance the state
    pub fn update(&mut self) {
        let operation = std::mem::replace(&mut self.operation, Operation::Idle);
        let step = match operation {
            Operation::Idle => return,
            Operation::Downloading(mut token) => match token.poll() {
                TokenPoll::Pending => Step::Wait(Operation::Downloading(token)),
                TokenPoll::Ready(result) => self.on_downloaded(result),
            },
            Operation::Importing(mut token) => match token.poll() {
                TokenPoll::Pending => Step::Wait(Operation::Importing(token)),
                TokenPoll::Ready(result) => self.on_imported(result),
            },
            Operation::Exporting(mut token) => match token.poll() {
                TokenPoll::Pending => Step::Wait(Operation::Exporting(token)),
                TokenPoll::Ready(result) => self.on_exported(result),
            },
            Operation::Uploading { mut token, bytes } => match token.poll() {
                TokenPoll::Pending => Step::Wait(Operation::Uploading { token, bytes }),
                TokenPoll::Ready(result) => self.on_uploaded(result, bytes),
            },
        };

        match step {
            Step::Wait(operation) => self.operation = operation,
            Step::Send(event) => {
                self.send(event);
            }
        }
    }

    fn send(&mut self, event: EventId) -> bool {
        let Some(transition) = self.fsm.send(event) else {
            return false;
        };

        self.exit(transition.from);
        if transition.from != transition.to {
            debug!(
                "anchor {}: {:?} -> {:?}",
                self.record.id, transition.from, transition.to
            );
            self.notifications.push(AnchorNotification::StateChanged {
                from: transition.from,
                to: transition.to,
            });
        }
        self.enter(transition.to);
        true
    }

    fn exit(&mut self, _state: AnchorState) {
        self.operation.abort();
        self.operation = Operation::Idle;
    }

    fn enter(&mut self, state: AnchorState) {
        self.record.locked = state.is_locked();
        match state {
            AnchorState::Loading => self.start_load(),
            AnchorState::Saving => {
                self.operation = Operation::Exporting(self.provider.export(&self.record.id));
            }
            AnchorState::Ready => self.last_error = None,
            AnchorState::Moving | AnchorState::Error => {}
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    fn start_load(&mut self) {
        if !self.record.is_saved() {
            debug!("anchor {}: never saved, nothing to import", self.record.id);
            self.notifications
                .push(AnchorNotification::Loaded { version: 0 });
            self.send(LOAD_SUCCEEDED);
            return;
        }

        match self.cache.load(&self.record.id, self.record.version) {
            Ok(Some(bytes)) => {
                debug!(
                    "anchor {}: importing cached v{}",
                    self.record.id, self.record.version
                );
                self.operation = Operation::Importing(self.provider.import(&self.record.id, bytes));
                return;
            }
            Ok(None) => {}
            Err(err) => warn!("anchor {}: cache read failed: {}", self.record.id, err),
        }

        match self.record.url.clone() {
            Some(url) => {
                self.operation = Operation::Downloading(self.http.download(&url));
            }
            None => {
                let error = AnchorError::MissingSource(self.record.id.clone());
                self.fail(error);
                self.send(LOAD_FAILED);
            }
        }
    }

    fn on_downloaded(&mut self, result: enklu_core::Result<HttpResponse>) -> Step {
        match result.and_then(HttpResponse::error_for_status) {
            Ok(response) => {
                if let Err(err) =
                    self.cache
                        .save(&self.record.id, self.record.version, &response.body)
                {
                    warn!("anchor {}: cache write failed: {}", self.record.id, err);
                }
                Step::Wait(Operation::Importing(
                    self.provider.import(&self.record.id, response.body),
                ))
            }
            Err(err) => {
                self.fail(AnchorError::Download(err));
                Step::Send(LOAD_FAILED)
            }
        }
    }

    fn on_imported(&mut self, result: enklu_core::Result<()>) -> Step {
        match result {
            Ok(()) => {
                info!("anchor {}: loaded v{}", self.record.id, self.record.version);
                self.notifications.push(AnchorNotification::Loaded {
                    version: self.record.version,
                });
                Step::Send(LOAD_SUCCEEDED)
            }
            Err(err) => {
                self.fail(AnchorError::Import(err));
                Step::Send(LOAD_FAILED)
            }
        }
    }

    // =========================================================================
    // Saving
    // =========================================================================

    fn on_exported(&mut self, result: enklu_core::Result<Vec<u8>>) -> Step {
        match result {
            Ok(bytes) => {
                let url = self.endpoints.anchor_url(&self.record.id);
                let file_name = format!("{}.anchor", self.record.id);
                let token = self.http.post_file(&url, &file_name, bytes.clone());
                Step::Wait(Operation::Uploading { token, bytes })
            }
            Err(err) => {
                self.fail(AnchorError::Export(err));
                Step::Send(SAVE_FAILED)
            }
        }
    }

    fn on_uploaded(&mut self, result: enklu_core::Result<HttpResponse>, bytes: Vec<u8>) -> Step {
        let body = match Self::decode_upload(result) {
            Ok(body) => body,
            Err(err) => {
                self.fail(err);
                return Step::Send(SAVE_FAILED);
            }
        };

        self.record.version = body.version.unwrap_or(self.record.version + 1);
        if body.url.is_some() {
            self.record.url = body.url;
        }
        if let Err(err) = self.cache.save(&self.record.id, self.record.version, &bytes) {
            warn!("anchor {}: cache write failed: {}", self.record.id, err);
        }

        info!("anchor {}: saved v{}", self.record.id, self.record.version);
        self.notifications.push(AnchorNotification::Saved {
            version: self.record.version,
        });
        Step::Send(SAVE_SUCCEEDED)
    }

    fn decode_upload(
        result: enklu_core::Result<HttpResponse>,
    ) -> crate::error::Result<AnchorUploadBody> {
        let envelope: TrellisResponse<AnchorUploadBody> = result
            .and_then(HttpResponse::error_for_status)
            .and_then(|response| response.json())
            .map_err(AnchorError::Upload)?;

        if !envelope.success {
            return Err(AnchorError::Rejected(
                envelope.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(envelope.body.unwrap_or_default())
    }

    fn fail(&mut self, error: AnchorError) {
        warn!("anchor {}: {}", self.record.id, error);
        self.notifications.push(AnchorNotification::Failed {
            state: self.state(),
            reason: error.to_string(),
        });
        self.last_error = Some(error);
    }
}

impl std::fmt::Debug for AnchorMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchorMachine")
            .field("record", &self.record)
            .field("state", &self.state())
            .field("pending", &self.has_pending_operation())
            .finish()
    }
}
