//! Session actor — one per connected client.
//!
//! DESIGN
//! ======
//! A session owns everything one browser tab would: the logged-in name, the
//! latest participant snapshot, a wheel task, and a draw orchestrator. It
//! runs a `select!` loop over three sources:
//! - client commands (`login`, `spin`, `logout`)
//! - store snapshots, each replacing the local `Arc<People>` wholesale
//! - wheel events, forwarded as `wheel` frames; `Completed` triggers the write
//!
//! Every state change ends in a fresh `view` frame, so clients never patch
//! state themselves.
//!
//! LIFECYCLE
//! =========
//! 1. Spawn → wheel task started, initial `view` sent
//! 2. Commands and events processed until the command channel closes
//! 3. If a draw is in flight when the client leaves, keep running until the
//!    wheel has settled and the result is written, then exit

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::auth;
use super::draw::{self, DrawOrchestrator};
use crate::frame::{ClientFrame, ServerFrame, SessionView};
use crate::notify::Notifier;
use crate::store::{People, PeopleStore};
use crate::wheel::layout::layout_segments;
use crate::wheel::{WheelConfig, WheelEvent, WheelPhase, spawn_wheel};

const COMMAND_QUEUE_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Login { name: String, password: String },
    Spin,
    Logout,
}

impl From<ClientFrame> for SessionCommand {
    fn from(frame: ClientFrame) -> Self {
        match frame {
            ClientFrame::Login { name, password } => Self::Login { name, password },
            ClientFrame::Spin => Self::Spin,
            ClientFrame::Logout => Self::Logout,
        }
    }
}

struct Session {
    id: Uuid,
    store: Arc<dyn PeopleStore>,
    orchestrator: DrawOrchestrator,
    notifier: Arc<dyn Notifier>,
    outbound: mpsc::Sender<ServerFrame>,
    people: Arc<People>,
    current_user: Option<String>,
}

/// Spawn a session task. Frames for the client go to `outbound`; the
/// returned sender accepts client commands. Dropping it ends the session.
pub fn spawn_session(
    id: Uuid,
    store: Arc<dyn PeopleStore>,
    wheel_config: WheelConfig,
    outbound: mpsc::Sender<ServerFrame>,
) -> mpsc::Sender<SessionCommand> {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
    let (wheel, wheel_events) = spawn_wheel(wheel_config);
    let notifier: Arc<dyn Notifier> = Arc::new(outbound.clone());
    let snapshots = store.subscribe();

    let session = Session {
        id,
        orchestrator: DrawOrchestrator::new(store.clone(), wheel, notifier.clone()),
        store,
        notifier,
        outbound,
        people: snapshots.borrow().clone(),
        current_user: None,
    };
    tokio::spawn(run_session(session, rx, snapshots, wheel_events));
    tx
}

async fn run_session(
    mut session: Session,
    mut commands: mpsc::Receiver<SessionCommand>,
    mut snapshots: watch::Receiver<Arc<People>>,
    mut wheel_events: mpsc::Receiver<WheelEvent>,
) {
    let session_id = session.id;
    info!(%session_id, "session: started");
    session.send_view().await;

    let mut accepting = true;
    let mut feed_open = true;

    loop {
        if !accepting && !session.orchestrator.is_spinning() {
            break;
        }

        tokio::select! {
            cmd = commands.recv(), if accepting => {
                match cmd {
                    Some(cmd) => session.handle(cmd).await,
                    None => {
                        accepting = false;
                        if session.orchestrator.is_spinning() {
                            info!(%session_id, "session: client left mid-draw, finishing");
                        }
                    }
                }
            }
            changed = snapshots.changed(), if feed_open => {
                if changed.is_err() {
                    warn!(%session_id, "session: store feed closed");
                    feed_open = false;
                    continue;
                }
                session.people = snapshots.borrow_and_update().clone();
                session.send_view().await;
            }
            Some(event) = wheel_events.recv() => session.on_wheel_event(event).await,
            else => break,
        }
    }
    info!(%session_id, "session: ended");
}

impl Session {
    async fn handle(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Login { name, password } => {
                if self.orchestrator.is_spinning() {
                    debug!(session_id = %self.id, "session: login ignored during spin");
                    return;
                }
                self.login(&name, &password).await;
            }
            SessionCommand::Spin => {
                let result = self.orchestrator.draw(self.current_user.as_deref(), &self.people).await;
                if result.is_ok() {
                    self.send_view().await;
                }
            }
            SessionCommand::Logout => {
                if self.orchestrator.is_spinning() {
                    debug!(session_id = %self.id, "session: logout ignored during spin");
                    return;
                }
                if let Some(user) = self.current_user.take() {
                    info!(session_id = %self.id, %user, "session: logged out");
                }
                self.send_view().await;
            }
        }
    }

    async fn login(&mut self, name: &str, password: &str) {
        match auth::login(self.store.as_ref(), name, password).await {
            Ok((user, outcome)) => {
                info!(session_id = %self.id, %user, ?outcome, "session: logged in");
                self.notifier.notify(outcome.toast(&user));
                self.current_user = Some(user);
                // Creation may not have reached this session's snapshot yet.
                self.people = self.store.snapshot();
                self.send_view().await;
            }
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "session: login failed");
                self.notifier.notify(e.toast());
            }
        }
    }

    async fn on_wheel_event(&mut self, event: WheelEvent) {
        match event {
            WheelEvent::Frame(view) => {
                self.orchestrator.observe(&view);
                let idle = view.phase == WheelPhase::Idle;
                self.send(ServerFrame::Wheel(view)).await;
                if idle {
                    self.send_view().await;
                }
            }
            WheelEvent::Completed { winner } => {
                // Failures are already logged and toasted.
                let _ = self.orchestrator.complete(&winner).await;
                self.people = self.store.snapshot();
                self.send_view().await;
            }
        }
    }

    fn view(&self) -> SessionView {
        let user = self.current_user.as_deref();
        let candidates = draw::candidates(&self.people, user);
        let result = user.and_then(|u| self.orchestrator.result_for(u)).map(str::to_owned);
        let assigned_to = user
            .and_then(|u| self.people.get(u))
            .and_then(|p| p.assigned_to.clone())
            .or_else(|| result.clone());

        SessionView {
            people: self.people.values().cloned().collect(),
            current_user: self.current_user.clone(),
            assigned_to,
            segments: layout_segments(&candidates),
            spinning: self.orchestrator.is_spinning(),
            can_spin: self.orchestrator.can_spin(user, &self.people),
            result,
        }
    }

    async fn send_view(&self) {
        self.send(ServerFrame::View(self.view())).await;
    }

    async fn send(&self, frame: ServerFrame) {
        if self.outbound.send(frame).await.is_err() {
            debug!(session_id = %self.id, "session: client gone, frame dropped");
        }
    }
}
