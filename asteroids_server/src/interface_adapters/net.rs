use crate::domain::{ChannelError, Outbound, PlayerChannel, PlayerId};
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use crate::interface_adapters::state::AppState;
use crate::use_cases::GameEvent;

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};
use tokio::sync::{mpsc, oneshot};
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    InputClosed,
    OutboxClosed,
    JoinRejected,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_MESSAGES: u32 = 10;

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

/// Bounded queue of messages waiting to be written to one player's socket.
///
/// Sending never waits: the game loop must not stall on a slow client.
pub struct Outbox {
    tx: mpsc::Sender<Outbound>,
}

impl Outbox {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl PlayerChannel for Outbox {
    fn send(&self, message: Outbound) -> Result<(), ChannelError> {
        self.tx.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ChannelError::Full,
            mpsc::error::TrySendError::Closed(_) => ChannelError::Closed,
        })
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        let conn_id = NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed);
        let span = info_span!("conn", conn_id, player_id = tracing::field::Empty);
        handle_socket(socket, state).instrument(span)
    })
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let mut ctx = match join_game(&state).await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(error = ?e, "failed to join game");
            let _ = send_close_with_reason(&mut socket, close_code::ERROR, "join failed").await;
            return;
        }
    };

    tracing::Span::current().record("player_id", ctx.player_id);
    info!(player_id = ctx.player_id, "client connected");

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }
}

struct ConnCtx {
    pub player_id: PlayerId,
    pub input_tx: mpsc::Sender<GameEvent>,
    pub outbox_rx: mpsc::Receiver<Outbound>,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,

    pub invalid_messages: u32,

    pub last_input_full_log: Instant,
    pub last_invalid_input_log: Instant,

    pub close_frame: Option<CloseFrame>,
}

enum LoopControl {
    Continue,
    Disconnect,
}

async fn join_game(state: &AppState) -> Result<ConnCtx, NetError> {
    let (outbox, outbox_rx) = Outbox::channel(state.outbox_capacity);
    let (reply, reply_rx) = oneshot::channel();

    // The game spawns the ship and queues the id message before replying.
    state
        .input_tx
        .send(GameEvent::Join {
            outbox: Box::new(outbox),
            reply,
        })
        .await
        .map_err(|_| NetError::InputClosed)?;
    let player_id = reply_rx.await.map_err(|_| NetError::JoinRejected)?;

    let now = Instant::now() - LOG_THROTTLE;
    Ok(ConnCtx {
        player_id,
        input_tx: state.input_tx.clone(),
        outbox_rx,

        msgs_in: 0,
        msgs_out: 0,
        bytes_in: 0,
        bytes_out: 0,

        invalid_messages: 0,

        last_input_full_log: now,
        last_invalid_input_log: now,

        close_frame: None,
    })
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

async fn send_close_with_reason(
    socket: &mut WebSocket,
    code: u16,
    reason: &'static str,
) -> Result<(), NetError> {
    socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await
        .map_err(NetError::Ws)?;
    socket.close().await.map_err(NetError::Ws)
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect: bool = tokio::select! {
            // Incoming Message from Client
            incoming = socket.recv() => {
                match ctx.handle_incoming(incoming) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            // Outgoing message queued by the game loop
            outbound = ctx.outbox_rx.recv() => {
                match outbound {
                    Some(message) => match ctx.forward(socket, message).await {
                        LoopControl::Continue => false,
                        LoopControl::Disconnect => true,
                    },
                    None => {
                        // The game dropped this player's outbox.
                        fatal = Some(NetError::OutboxClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    if let Err(e) = ctx.disconnect_cleanup().await {
        warn!(error = ?e, "error during disconnect cleanup");
        if fatal.is_none() {
            fatal = Some(e);
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

impl ConnCtx {
    fn handle_incoming(
        &mut self,
        incoming: Option<Result<Message, Error>>,
    ) -> Result<LoopControl, NetError> {
        let player_id = self.player_id;
        match incoming {
            Some(Ok(msg)) => match msg {
                Message::Text(text) => {
                    self.msgs_in += 1;
                    self.bytes_in += text.len() as u64;

                    match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(msg) => self.submit_command(msg),
                        Err(parse_err) => {
                            // Unknown commands fail to parse and count as invalid too.
                            self.invalid_messages += 1;
                            if should_log(&mut self.last_invalid_input_log) {
                                warn!(
                                    player_id,
                                    bytes = text.len(),
                                    error = %parse_err,
                                    "failed to parse client message"
                                );
                            }

                            if self.invalid_messages > MAX_INVALID_MESSAGES {
                                self.close_frame = Some(CloseFrame {
                                    code: close_code::POLICY,
                                    reason: "too many invalid messages".into(),
                                });
                                return Ok(LoopControl::Disconnect);
                            }

                            Ok(LoopControl::Continue)
                        }
                    }
                }
                Message::Binary(_) => {
                    self.close_frame = Some(CloseFrame {
                        code: close_code::UNSUPPORTED,
                        reason: "binary messages not supported".into(),
                    });
                    Ok(LoopControl::Disconnect)
                }
                Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
                Message::Close(_) => Ok(LoopControl::Disconnect),
            },
            Some(Err(e)) => {
                warn!(player_id, error = %e, "websocket recv error");
                Ok(LoopControl::Disconnect)
            }
            None => {
                info!(player_id, "websocket closed");
                Ok(LoopControl::Disconnect)
            }
        }
    }

    fn submit_command(&mut self, msg: ClientMessage) -> Result<LoopControl, NetError> {
        let event = GameEvent::Command {
            player_id: self.player_id,
            command: msg.command.into(),
            active: msg.arg,
        };
        match self.input_tx.try_send(event) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(mpsc::error::TrySendError::Full(_evt)) => {
                if should_log(&mut self.last_input_full_log) {
                    warn!(player_id = self.player_id, "input channel full; dropping command");
                }
                Ok(LoopControl::Continue)
            }
            Err(mpsc::error::TrySendError::Closed(_evt)) => Err(NetError::InputClosed),
        }
    }

    async fn forward(&mut self, socket: &mut WebSocket, message: Outbound) -> LoopControl {
        match send_message(socket, &ServerMessage::from(message)).await {
            Ok(bytes) => {
                self.msgs_out += 1;
                self.bytes_out += bytes as u64;
                LoopControl::Continue
            }
            Err(err) => {
                // Log unexpected send failures; disconnect will follow immediately.
                warn!(error = ?err, "failed to send message");
                LoopControl::Disconnect
            }
        }
    }

    async fn disconnect_cleanup(&self) -> Result<(), NetError> {
        let player_id = self.player_id;
        self.input_tx
            .send(GameEvent::Leave { player_id })
            .await
            .map_err(|_| NetError::InputClosed)?;

        debug!(
            player_id,
            msgs_in = self.msgs_in,
            msgs_out = self.msgs_out,
            bytes_in = self.bytes_in,
            bytes_out = self.bytes_out,
            invalid_messages = self.invalid_messages,
            "connection stats"
        );
        info!(player_id, "client disconnected");
        Ok(())
    }
}
