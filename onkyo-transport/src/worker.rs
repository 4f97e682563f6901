//! Background connection actor
//!
//! Spawns a thread with its own tokio runtime that owns the TCP connection
//! to one receiver, while the [`Transport`](crate::Transport) handle exposes
//! a sync API. Every write and every read for the device goes through this
//! one task, so commands and replies are naturally serialized.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bytes::BytesMut;
use eiscp_client::{encode, FrameDecoder, IscpMessage};
use onkyo_catalog::{Catalog, Verb, Zone};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

use crate::backoff::calculate_backoff;
use crate::command::ZoneCommand;
use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::event::{StatusNotification, TransportEvent};

/// Callback invoked once with the outcome of a command
pub type Completion = Box<dyn FnOnce(Result<(), TransportError>) + Send + 'static>;

/// Payload the receiver sends instead of a value when it refuses a command
const REJECTED_PAYLOAD: &str = "N/A";

/// Commands sent from the sync Transport handle to the background worker
pub(crate) enum Command {
    /// Translate, frame and write a command
    Send {
        command: ZoneCommand,
        on_complete: Completion,
    },
    /// Close the connection and stop the worker
    Shutdown,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Send { command, .. } => f.debug_struct("Send").field("command", command).finish(),
            Command::Shutdown => f.write_str("Shutdown"),
        }
    }
}

/// Everything the worker needs to run one device connection
pub(crate) struct WorkerContext {
    pub host: String,
    pub port: u16,
    pub zone: Zone,
    pub catalog: Arc<Catalog>,
    pub config: TransportConfig,
    pub event_tx: mpsc::Sender<TransportEvent>,
}

/// A command written to the receiver and waiting for its reply
struct Pending {
    /// ISCP code the reply will carry
    code: String,
    /// Command string for errors and logs
    command: String,
    deadline: Instant,
    on_complete: Option<Completion>,
}

enum ConnectOutcome {
    Connected(TcpStream),
    Failed(TransportError),
    Shutdown,
}

enum SessionEnd {
    Closed(String),
    Shutdown,
}

/// Spawns the background connection worker thread
pub(crate) fn spawn_transport_worker(
    ctx: WorkerContext,
    command_rx: UnboundedReceiver<Command>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!("Failed to create tokio runtime for transport worker: {}", e);
                return;
            }
        };

        rt.block_on(ctx.run(command_rx));
    })
}

fn complete(on_complete: Option<Completion>, result: Result<(), TransportError>) {
    if let Some(on_complete) = on_complete {
        on_complete(result);
    }
}

impl WorkerContext {
    fn emit(&self, event: TransportEvent) {
        // Nobody listening is not an error for the connection
        let _ = self.event_tx.send(event);
    }

    /// Connect, serve, and reconnect until shut down
    async fn run(self, mut command_rx: UnboundedReceiver<Command>) {
        let mut attempt: u32 = 0;
        let mut queued: VecDeque<(ZoneCommand, Completion)> = VecDeque::new();

        tracing::info!("Transport worker started for {}:{}", self.host, self.port);

        loop {
            match self.connect(&mut command_rx, &mut queued).await {
                ConnectOutcome::Connected(stream) => {
                    attempt = 0;
                    tracing::info!("Connected to receiver at {}:{}", self.host, self.port);
                    self.emit(TransportEvent::Connected {
                        host: self.host.clone(),
                        port: self.port,
                    });

                    match self.run_session(stream, &mut command_rx, &mut queued).await {
                        SessionEnd::Shutdown => {
                            self.emit(TransportEvent::Closed {
                                reason: "disconnected".to_string(),
                            });
                            break;
                        }
                        SessionEnd::Closed(reason) => {
                            tracing::info!(
                                "Connection to {}:{} closed: {}",
                                self.host,
                                self.port,
                                reason
                            );
                            self.emit(TransportEvent::Closed { reason });
                        }
                    }
                }
                ConnectOutcome::Failed(err) => {
                    tracing::warn!("{}", err);
                    self.emit(TransportEvent::Error(err));
                }
                ConnectOutcome::Shutdown => break,
            }

            for (command, on_complete) in queued.drain(..) {
                tracing::debug!("Dropping {} while disconnected", command);
                on_complete(Err(TransportError::NotConnected));
            }

            let retries_left = self
                .config
                .reconnect
                .max_retries
                .map_or(true, |max| attempt < max);

            if !self.config.auto_reconnect || !retries_left {
                tracing::info!(
                    "Not reconnecting to {}:{} (attempts: {})",
                    self.host,
                    self.port,
                    attempt
                );
                self.idle(None, &mut command_rx).await;
                break;
            }

            let delay = calculate_backoff(attempt, &self.config.reconnect);
            attempt = attempt.saturating_add(1);
            tracing::debug!(
                "Reconnecting to {}:{} in {:?} (attempt {})",
                self.host,
                self.port,
                delay,
                attempt
            );
            self.emit(TransportEvent::Debug(format!(
                "reconnecting in {:?} (attempt {})",
                delay, attempt
            )));

            if !self.idle(Some(delay), &mut command_rx).await {
                break;
            }
        }

        tracing::info!("Transport worker for {}:{} shut down", self.host, self.port);
    }

    /// Open the TCP connection, queueing commands that arrive meanwhile
    async fn connect(
        &self,
        command_rx: &mut UnboundedReceiver<Command>,
        queued: &mut VecDeque<(ZoneCommand, Completion)>,
    ) -> ConnectOutcome {
        tracing::debug!("Connecting to {}:{}", self.host, self.port);

        let timeout = self.config.connect_timeout;
        let connect = tokio::time::timeout(
            timeout,
            TcpStream::connect((self.host.as_str(), self.port)),
        );
        tokio::pin!(connect);

        loop {
            tokio::select! {
                result = &mut connect => {
                    let reason = match result {
                        Ok(Ok(stream)) => {
                            if let Err(e) = stream.set_nodelay(true) {
                                tracing::debug!("Failed to set TCP_NODELAY: {}", e);
                            }
                            return ConnectOutcome::Connected(stream);
                        }
                        Ok(Err(e)) => e.to_string(),
                        Err(_) => format!("timed out after {:?}", timeout),
                    };
                    return ConnectOutcome::Failed(TransportError::Connect {
                        host: self.host.clone(),
                        port: self.port,
                        reason,
                    });
                }
                command = command_rx.recv() => match command {
                    Some(Command::Send { command, on_complete }) => {
                        queued.push_back((command, on_complete));
                    }
                    Some(Command::Shutdown) | None => return ConnectOutcome::Shutdown,
                }
            }
        }
    }

    /// Wait while disconnected, failing commands immediately
    ///
    /// Returns `false` when the worker should stop. With no delay it waits
    /// until shutdown.
    async fn idle(&self, delay: Option<Duration>, command_rx: &mut UnboundedReceiver<Command>) -> bool {
        let sleep = tokio::time::sleep(delay.unwrap_or_default());
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep, if delay.is_some() => return true,
                command = command_rx.recv() => match command {
                    Some(Command::Send { command, on_complete }) => {
                        tracing::debug!("Dropping {} while disconnected", command);
                        on_complete(Err(TransportError::NotConnected));
                    }
                    Some(Command::Shutdown) | None => return false,
                }
            }
        }
    }

    /// Serve one open connection until it closes or the worker shuts down
    async fn run_session(
        &self,
        stream: TcpStream,
        command_rx: &mut UnboundedReceiver<Command>,
        queued: &mut VecDeque<(ZoneCommand, Completion)>,
    ) -> SessionEnd {
        let (mut reader, mut writer) = stream.into_split();
        let mut decoder = FrameDecoder::new();
        let mut pending: VecDeque<Pending> = VecDeque::new();
        let mut buf = BytesMut::with_capacity(4096);

        if self.config.query_on_connect {
            for verb in Verb::ALL {
                let query = ZoneCommand::query(self.zone, self.zone.verb(verb));
                if let Err(reason) = self.write_command(&mut writer, query, None, &mut pending).await {
                    return self.close(&mut pending, reason);
                }
            }
        }

        while let Some((command, on_complete)) = queued.pop_front() {
            if let Err(reason) = self
                .write_command(&mut writer, command, Some(on_complete), &mut pending)
                .await
            {
                return self.close(&mut pending, reason);
            }
        }

        loop {
            // Every command gets the same timeout, so the front is the oldest deadline
            let next_deadline = pending.front().map(|p| p.deadline);

            tokio::select! {
                read = reader.read_buf(&mut buf) => match read {
                    Ok(0) => {
                        return self.close(&mut pending, "connection closed by receiver".to_string());
                    }
                    Ok(_) => {
                        decoder.push(&buf);
                        buf.clear();
                        self.drain_frames(&mut decoder, &mut pending);
                    }
                    Err(e) => return self.close(&mut pending, e.to_string()),
                },
                command = command_rx.recv() => match command {
                    Some(Command::Send { command, on_complete }) => {
                        if let Err(reason) = self
                            .write_command(&mut writer, command, Some(on_complete), &mut pending)
                            .await
                        {
                            return self.close(&mut pending, reason);
                        }
                    }
                    Some(Command::Shutdown) | None => {
                        tracing::info!("Transport worker received shutdown command");
                        for p in pending.drain(..) {
                            complete(p.on_complete, Err(TransportError::Shutdown));
                        }
                        if let Err(e) = writer.shutdown().await {
                            tracing::debug!("Error closing connection: {}", e);
                        }
                        return SessionEnd::Shutdown;
                    }
                },
                _ = tokio::time::sleep_until(next_deadline.unwrap_or_else(Instant::now)),
                    if next_deadline.is_some() => {
                    self.expire(&mut pending);
                }
            }
        }
    }

    fn close(&self, pending: &mut VecDeque<Pending>, reason: String) -> SessionEnd {
        for p in pending.drain(..) {
            complete(p.on_complete, Err(TransportError::NotConnected));
        }
        SessionEnd::Closed(reason)
    }

    /// Translate and write one command
    ///
    /// Translation failures only fail the command. A failed write fails the
    /// command and returns the reason so the session can be torn down.
    async fn write_command(
        &self,
        writer: &mut OwnedWriteHalf,
        command: ZoneCommand,
        on_complete: Option<Completion>,
        pending: &mut VecDeque<Pending>,
    ) -> Result<(), String> {
        let encoded = match &command.token {
            Some(token) => self.catalog.encode_token(command.zone, &command.verb, token),
            None => self
                .catalog
                .encode(command.zone, &command.verb, &command.argument),
        };
        let message = match encoded {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Cannot translate {}: {}", command, e);
                complete(on_complete, Err(TransportError::Translate(e)));
                return Ok(());
            }
        };

        tracing::debug!("Sending {} as {}", command, message);
        self.emit(TransportEvent::Debug(format!("send {} ({})", message, command)));

        if let Err(e) = writer.write_all(&encode(&message)).await {
            let reason = e.to_string();
            tracing::warn!("Failed to send {}: {}", command, reason);
            complete(on_complete, Err(TransportError::Write(reason.clone())));
            self.emit(TransportEvent::Error(TransportError::Write(reason.clone())));
            return Err(reason);
        }

        pending.push_back(Pending {
            code: message.chars().take(3).collect(),
            command: command.to_string(),
            deadline: Instant::now() + self.config.command_timeout,
            on_complete,
        });

        Ok(())
    }

    fn drain_frames(&self, decoder: &mut FrameDecoder, pending: &mut VecDeque<Pending>) {
        loop {
            match decoder.next_frame() {
                Ok(Some(message)) => self.handle_message(&message, pending),
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Dropping malformed packet: {}", e);
                    self.emit(TransportEvent::Error(TransportError::Frame(e)));
                }
            }
        }
    }

    /// Resolve the oldest pending command with the same code, then report
    /// the message as status
    fn handle_message(&self, message: &IscpMessage, pending: &mut VecDeque<Pending>) {
        let (code, payload) = (message.code(), message.payload());
        self.emit(TransportEvent::Debug(format!("received {}", message)));

        let resolved = pending
            .iter()
            .position(|p| p.code == code)
            .and_then(|position| pending.remove(position));

        if payload == REJECTED_PAYLOAD {
            match resolved {
                Some(p) => {
                    tracing::warn!("Receiver rejected {}", p.command);
                    complete(p.on_complete, Err(TransportError::Rejected { command: p.command }));
                }
                None => tracing::debug!("Unsolicited rejection for {}", code),
            }
            return;
        }

        if let Some(p) = resolved {
            tracing::debug!("Reply {} completes {}", message, p.command);
            complete(p.on_complete, Ok(()));
        }

        match self.catalog.decode(code, payload) {
            Ok(decoded) => self.emit(TransportEvent::Status(StatusNotification::from(decoded))),
            Err(e) => tracing::debug!("Ignoring message {}: {}", message, e),
        }
    }

    fn expire(&self, pending: &mut VecDeque<Pending>) {
        let now = Instant::now();
        let after = self.config.command_timeout;

        while pending.front().is_some_and(|p| p.deadline <= now) {
            if let Some(p) = pending.pop_front() {
                tracing::warn!("No reply to {} within {:?}", p.command, after);
                complete(
                    p.on_complete,
                    Err(TransportError::Timeout {
                        command: p.command,
                        after,
                    }),
                );
            }
        }
    }
}
