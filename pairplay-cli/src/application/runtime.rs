use crate::application::session_connection::{LinkEvent, SessionConnection};
use crate::infrastructure::{ClientConfig, ClientError, Result, Transport};
use pairplay_core::{
    CallError, CallEvent, CallSignalingChannel, CallState, Dispatch, GameAction, GameEvent,
    LinkPhase, Message, RoomCode, RoomEvent, RoomProtocolHandler, Session,
};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// Capacity of the event broadcast; slow subscribers see `Lagged`
const EVENT_CAPACITY: usize = 256;

type CallReply = oneshot::Sender<std::result::Result<(), CallError>>;

/// Link status changes published to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum LinkStatus {
    Opened { rejoined: bool },
    Closed { code: Option<u16> },
    Reconnecting { attempt: u32, delay: Duration },
    GaveUp,
}

/// Everything the runtime publishes
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Link(LinkStatus),
    Room(RoomEvent),
    Call(CallEvent),
    /// `rtc:*` frame for the negotiator
    Rtc(Message),
    Game(GameEvent),
}

/// Snapshot of session state (read-only, cheap to clone)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub link: LinkPhase,
    pub session: Session,
    pub call: CallState,
    pub reconnect_attempts: u32,
}

enum SessionCommand {
    Connect(oneshot::Sender<Result<()>>),
    Disconnect,
    Resume,
    Send(Message),
    CreateRoom {
        player_name: String,
        avatar: Option<String>,
    },
    JoinRoom {
        room_code: RoomCode,
        player_name: String,
        avatar: Option<String>,
    },
    LeaveRoom,
    RegisterCall {
        character: String,
        player_name: String,
        reply: CallReply,
    },
    InitiateCall {
        target: String,
        reply: CallReply,
    },
    AcceptCall(CallReply),
    DeclineCall(CallReply),
    CancelCall(CallReply),
    FinishCall,
    SelectAge(u8),
    SelectGame {
        game: String,
        age: u8,
        total_questions: u32,
    },
    SendAction(GameAction),
    Shutdown,
}

/// Cloneable front door to a running session
#[derive(Clone)]
pub struct SessionHandle {
    cmd_tx: mpsc::UnboundedSender<SessionCommand>,
    events: broadcast::Sender<SessionEvent>,
    state_rx: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    fn submit(&self, cmd: SessionCommand) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| ClientError::RuntimeStopped)
    }

    async fn call(&self, build: impl FnOnce(CallReply) -> SessionCommand) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.submit(build(tx))?;
        rx.await.map_err(|_| ClientError::RuntimeStopped)??;
        Ok(())
    }

    /// Connect to the relay. Resolves once the link is open.
    pub async fn connect(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.submit(SessionCommand::Connect(tx))?;
        rx.await.map_err(|_| ClientError::RuntimeStopped)?
    }

    pub fn disconnect(&self) -> Result<()> {
        self.submit(SessionCommand::Disconnect)
    }

    /// App returned to the foreground
    pub fn resume(&self) -> Result<()> {
        self.submit(SessionCommand::Resume)
    }

    /// Send a raw frame (dropped unless the link is open)
    pub fn send(&self, message: Message) -> Result<()> {
        self.submit(SessionCommand::Send(message))
    }

    pub fn create_room(&self, player_name: impl Into<String>, avatar: Option<String>) -> Result<()> {
        self.submit(SessionCommand::CreateRoom {
            player_name: player_name.into(),
            avatar,
        })
    }

    pub fn join_room(
        &self,
        room_code: RoomCode,
        player_name: impl Into<String>,
        avatar: Option<String>,
    ) -> Result<()> {
        self.submit(SessionCommand::JoinRoom {
            room_code,
            player_name: player_name.into(),
            avatar,
        })
    }

    pub fn leave_room(&self) -> Result<()> {
        self.submit(SessionCommand::LeaveRoom)
    }

    pub async fn register_call(
        &self,
        character: impl Into<String>,
        player_name: impl Into<String>,
    ) -> Result<()> {
        let character = character.into();
        let player_name = player_name.into();
        self.call(|reply| SessionCommand::RegisterCall {
            character,
            player_name,
            reply,
        })
        .await
    }

    pub async fn initiate_call(&self, target: impl Into<String>) -> Result<()> {
        let target = target.into();
        self.call(|reply| SessionCommand::InitiateCall { target, reply })
            .await
    }

    pub async fn accept_call(&self) -> Result<()> {
        self.call(SessionCommand::AcceptCall).await
    }

    pub async fn decline_call(&self) -> Result<()> {
        self.call(SessionCommand::DeclineCall).await
    }

    pub async fn cancel_call(&self) -> Result<()> {
        self.call(SessionCommand::CancelCall).await
    }

    pub fn finish_call(&self) -> Result<()> {
        self.submit(SessionCommand::FinishCall)
    }

    pub fn select_age(&self, age: u8) -> Result<()> {
        self.submit(SessionCommand::SelectAge(age))
    }

    pub fn select_game(&self, game: impl Into<String>, age: u8, total_questions: u32) -> Result<()> {
        self.submit(SessionCommand::SelectGame {
            game: game.into(),
            age,
            total_questions,
        })
    }

    /// Relay an action produced by an `ActionSyncAdapter`
    pub fn send_action(&self, action: GameAction) -> Result<()> {
        self.submit(SessionCommand::SendAction(action))
    }

    /// New event subscription; any number may exist
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Get latest state snapshot (always succeeds, never blocks)
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state_rx.borrow().clone()
    }

    /// Subscribe to state changes
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_rx.clone()
    }
}

/// Background task owning the connection, room state and call channel
pub struct SessionRuntime {
    handle: SessionHandle,

    /// Handle to background task
    task_handle: tokio::task::JoinHandle<()>,
}

impl SessionRuntime {
    pub fn spawn<T: Transport>(transport: T, config: ClientConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (state_tx, state_rx) = watch::channel(SessionSnapshot::default());

        let event_loop = RuntimeLoop {
            connection: SessionConnection::new(transport, config),
            rooms: RoomProtocolHandler::new(),
            calls: CallSignalingChannel::new(),
            events: events.clone(),
            state_tx,
        };
        let task_handle = tokio::spawn(event_loop.run(cmd_rx));

        Self {
            handle: SessionHandle {
                cmd_tx,
                events,
                state_rx,
            },
            task_handle,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Shutdown runtime: closes the link and waits for the task to finish
    pub async fn shutdown(self) {
        if self.handle.submit(SessionCommand::Shutdown).is_err() {
            tracing::debug!("SessionRuntime already stopped");
        }
        let _ = self.task_handle.await;
    }
}

struct RuntimeLoop<T: Transport> {
    connection: SessionConnection<T>,
    rooms: RoomProtocolHandler,
    calls: CallSignalingChannel,
    events: broadcast::Sender<SessionEvent>,
    state_tx: watch::Sender<SessionSnapshot>,
}

impl<T: Transport> RuntimeLoop<T> {
    async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<SessionCommand>) {
        tracing::info!("SessionRuntime started");

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(SessionCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                event = self.connection.next_event() => self.handle_link_event(event),
            }
            self.publish_snapshot();
        }

        self.connection.disconnect();
        self.publish_snapshot();
        tracing::info!("SessionRuntime stopped");
    }

    fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Connect(reply) => self.connection.connect(Some(reply)),
            SessionCommand::Disconnect => {
                self.connection.disconnect();
                let code = self.rooms.session().room_code().cloned();
                self.rooms = RoomProtocolHandler::new();
                self.calls = CallSignalingChannel::new();
                if let Some(room_code) = code {
                    self.emit(SessionEvent::Room(RoomEvent::Left { room_code }));
                }
            }
            SessionCommand::Resume => {
                self.connection.resume();
            }
            SessionCommand::Send(message) => self.send(message),
            SessionCommand::CreateRoom {
                player_name,
                avatar,
            } => {
                let message = self.rooms.create_room(player_name, avatar);
                self.send(message);
            }
            SessionCommand::JoinRoom {
                room_code,
                player_name,
                avatar,
            } => {
                let message = self.rooms.join_room(room_code, player_name, avatar);
                self.send(message);
            }
            SessionCommand::LeaveRoom => {
                let code = self.rooms.session().room_code().cloned();
                let message = self.rooms.leave();
                self.sync_membership();
                self.send(message);
                if let Some(room_code) = code {
                    self.emit(SessionEvent::Room(RoomEvent::Left { room_code }));
                }
            }
            SessionCommand::RegisterCall {
                character,
                player_name,
                reply,
            } => {
                let result = self.calls.register(character, player_name);
                self.reply_call(result, reply);
            }
            SessionCommand::InitiateCall { target, reply } => {
                let result = self.calls.initiate(target);
                self.reply_call(result, reply);
            }
            SessionCommand::AcceptCall(reply) => {
                let result = self.calls.accept();
                self.reply_call(result, reply);
            }
            SessionCommand::DeclineCall(reply) => {
                let result = self.calls.decline();
                self.reply_call(result, reply);
            }
            SessionCommand::CancelCall(reply) => {
                let result = self.calls.cancel();
                self.reply_call(result, reply);
            }
            SessionCommand::FinishCall => self.calls.finish(),
            SessionCommand::SelectAge(age) => {
                let message = self.rooms.select_age(age);
                self.send(message);
            }
            SessionCommand::SelectGame {
                game,
                age,
                total_questions,
            } => {
                let message = self.rooms.select_game(game, age, total_questions);
                self.send(message);
            }
            SessionCommand::SendAction(action) => self.send(Message::GameAction(action)),
            SessionCommand::Shutdown => {}
        }
    }

    fn handle_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Opened { rejoined } => {
                if rejoined {
                    self.rooms.on_rejoin_sent();
                }
                self.emit(SessionEvent::Link(LinkStatus::Opened { rejoined }));
            }
            LinkEvent::Frame(message) => {
                if let Some(dispatch) = self.rooms.handle(message) {
                    self.route(dispatch);
                }
                self.sync_membership();
            }
            LinkEvent::Closed { code } => {
                self.emit(SessionEvent::Link(LinkStatus::Closed { code }));
            }
            LinkEvent::ReconnectScheduled { attempt, delay } => {
                self.emit(SessionEvent::Link(LinkStatus::Reconnecting { attempt, delay }));
            }
            LinkEvent::GaveUp => {
                self.emit(SessionEvent::Link(LinkStatus::GaveUp));
                let dispatch = self.rooms.on_connection_lost();
                self.route(dispatch);
            }
        }
    }

    fn route(&mut self, dispatch: Dispatch) {
        match dispatch {
            Dispatch::Room(event) => self.emit(SessionEvent::Room(event)),
            Dispatch::Call(message) => {
                let Some(event) = self.calls.handle(&message) else {
                    return;
                };
                if let CallEvent::Matched {
                    room_code,
                    initiated,
                } = &event
                {
                    let name = self.calls.player_name().unwrap_or_default().to_string();
                    let entered = self.rooms.on_call_matched(room_code.clone(), *initiated, name);
                    self.emit(SessionEvent::Call(event));
                    self.route(entered);
                    return;
                }
                self.emit(SessionEvent::Call(event));
            }
            Dispatch::Rtc(message) => self.emit(SessionEvent::Rtc(message)),
            Dispatch::Game(event) => self.emit(SessionEvent::Game(event)),
        }
    }

    fn send(&mut self, message: Message) {
        self.connection.send(&message);
    }

    fn reply_call(&mut self, result: std::result::Result<Message, CallError>, reply: CallReply) {
        let outcome = result.map(|message| {
            self.send(message);
        });
        let _ = reply.send(outcome);
    }

    fn sync_membership(&mut self) {
        self.connection.set_membership(self.rooms.membership());
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn publish_snapshot(&self) {
        let mut session = self.rooms.session().clone();
        session.set_link(self.connection.phase());
        let snapshot = SessionSnapshot {
            link: self.connection.phase(),
            session,
            call: self.calls.state().clone(),
            reconnect_attempts: self.connection.reconnect_state().attempt_count(),
        };
        self.state_tx.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }
}
