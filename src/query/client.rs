//! ServerQuery client.
//!
//! A single TCP connection carries both command responses and unsolicited
//! notifications. A reader task splits them:
//!
//! ```text
//!                    ┌──────────────┐  Data.. Status   ┌────────────────┐
//!  TCP ── Transport ─┤  read_loop   ├─────────────────►│ execute() (1x) │
//!                    │              │  Notify          ├────────────────┤
//!                    └──────────────┴─────────────────►│ event stream   │
//!                                                      └────────────────┘
//! ```
//!
//! Commands are serialized by an async mutex, so at most one response is
//! outstanding at a time and responses arrive in command order.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, warn};
use ts_query_proto::transport::{CommandSink, ReplyStream};
use ts_query_proto::{Command, Notification, Record, Reply, Transport};

use super::events::participant;
use crate::error::QueryError;
use crate::roster::{DatabaseId, IdentityToken, Participant};

/// Responses buffered between the reader task and `execute`.
const REPLY_CHANNEL_SIZE: usize = 16;

/// Server property holding the host banner image URL.
pub const HOST_BANNER_PROPERTY: &str = "virtualserver_hostbanner_gfx_url";

type Response = Result<Vec<Record>, QueryError>;

/// Receiving end of the server's event stream. Closes when the connection does.
pub type NotificationStream = mpsc::UnboundedReceiver<Notification>;

struct Exchange {
    sink: CommandSink,
    replies: mpsc::Receiver<Response>,
    /// A command was sent but its response was never consumed (timeout or
    /// cancellation).
    in_flight: bool,
    /// Responses still owed to abandoned commands; discarded on arrival.
    stale: usize,
}

impl Exchange {
    async fn next_reply(&mut self) -> Response {
        loop {
            let response = self.replies.recv().await.ok_or(QueryError::ConnectionClosed)?;
            if self.stale > 0 {
                self.stale -= 1;
                debug!("Discarding response to abandoned command");
                continue;
            }
            return response;
        }
    }
}

pub struct QueryClient {
    exchange: Mutex<Exchange>,
    command_timeout: Duration,
}

impl QueryClient {
    /// Connect, consume the greeting and start the reader task.
    pub async fn connect(
        addr: &str,
        command_timeout: Duration,
    ) -> Result<(Self, NotificationStream), QueryError> {
        let transport = Transport::connect(addr).await?;
        info!(addr = %addr, "Connected to ServerQuery");
        Ok(Self::from_transport(transport, command_timeout))
    }

    /// Start a client over a transport whose greeting has been consumed.
    pub fn from_transport(
        transport: Transport,
        command_timeout: Duration,
    ) -> (Self, NotificationStream) {
        let (sink, stream) = transport.split();
        let (reply_tx, reply_rx) = mpsc::channel(REPLY_CHANNEL_SIZE);
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();

        tokio::spawn(read_loop(stream, reply_tx, notify_tx));

        let client = Self {
            exchange: Mutex::new(Exchange {
                sink,
                replies: reply_rx,
                in_flight: false,
                stale: 0,
            }),
            command_timeout,
        };
        (client, notify_rx)
    }

    /// Send a command and wait for its response records.
    pub async fn execute(&self, command: Command) -> Result<Vec<Record>, QueryError> {
        self.execute_within(command, self.command_timeout).await
    }

    /// Like [`execute`](Self::execute) with an explicit timeout.
    pub async fn execute_within(
        &self,
        command: Command,
        timeout: Duration,
    ) -> Result<Vec<Record>, QueryError> {
        let span = crate::telemetry::query_command(command.name());
        async move {
            let mut exchange = self.exchange.lock().await;
            if std::mem::take(&mut exchange.in_flight) {
                exchange.stale += 1;
            }

            exchange.sink.send(command).await?;
            exchange.in_flight = true;

            match tokio::time::timeout(timeout, exchange.next_reply()).await {
                Ok(response) => {
                    exchange.in_flight = false;
                    response
                }
                Err(_) => {
                    warn!(timeout = ?timeout, "ServerQuery command timed out");
                    Err(QueryError::Timeout)
                }
            }
        }
        .instrument(span)
        .await
    }

    pub async fn login(&self, user: &str, password: &str) -> Result<(), QueryError> {
        self.execute(Command::login(user, password)).await.map(drop)
    }

    pub async fn use_server(&self, server_id: u32) -> Result<(), QueryError> {
        self.execute(Command::use_server(server_id)).await.map(drop)
    }

    pub async fn whoami(&self) -> Result<Record, QueryError> {
        let records = self.execute(Command::whoami()).await?;
        Ok(records.into_iter().next().unwrap_or_default())
    }

    /// Subscribe to server-wide client enter/leave events.
    pub async fn register_server_events(&self) -> Result<(), QueryError> {
        self.execute(Command::register_server_events()).await.map(drop)
    }

    /// Snapshot of all connected clients. Records with missing fields are
    /// logged and skipped.
    pub async fn client_list(&self) -> Result<Vec<Participant>, QueryError> {
        let records = self.execute(Command::client_list()).await?;
        Ok(records
            .iter()
            .filter_map(|record| match participant(record) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!(error = %e, record = %record, "Skipping malformed clientlist entry");
                    None
                }
            })
            .collect())
    }

    /// Durable identity (`cluid`) for an account database id.
    pub async fn client_uid_from_dbid(
        &self,
        database_id: DatabaseId,
        timeout: Duration,
    ) -> Result<IdentityToken, QueryError> {
        let records = self
            .execute_within(Command::client_name_from_dbid(database_id.0), timeout)
            .await?;
        records
            .first()
            .and_then(|r| r.get("cluid"))
            .map(IdentityToken::from)
            .ok_or(QueryError::MissingField("cluid"))
    }

    /// Set the virtual server's host banner image URL.
    pub async fn set_host_banner(&self, value: &str) -> Result<(), QueryError> {
        self.execute(Command::server_edit(HOST_BANNER_PROPERTY, value))
            .await
            .map(drop)
    }

    /// Cheap round trip that keeps the query session from idling out.
    pub async fn keepalive(&self) -> Result<(), QueryError> {
        self.execute(Command::version()).await.map(drop)
    }

    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }
}

/// Send a keepalive every `interval` until the connection closes.
pub fn spawn_keepalive(client: Arc<QueryClient>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match client.keepalive().await {
                Ok(()) => debug!("Keepalive sent"),
                Err(QueryError::ConnectionClosed) => break,
                Err(e) => warn!(error = %e, code = e.error_code(), "Keepalive failed"),
            }
        }
    })
}

async fn read_loop(
    mut stream: ReplyStream,
    replies: mpsc::Sender<Response>,
    notifications: mpsc::UnboundedSender<Notification>,
) {
    let mut pending = Vec::new();

    while let Some(result) = stream.next().await {
        match result {
            Ok(Reply::Data(records)) => pending.extend(records),
            Ok(Reply::Status(status)) => {
                let records = std::mem::take(&mut pending);
                let response = if status.is_ok() {
                    Ok(records)
                } else {
                    Err(QueryError::Server {
                        id: status.id,
                        msg: status.msg,
                    })
                };
                if replies.send(response).await.is_err() {
                    break;
                }
            }
            Ok(Reply::Notify(notification)) => {
                if notifications.send(notification).is_err() {
                    debug!("Notification receiver dropped");
                }
            }
            Err(e) => {
                warn!(error = %e, "ServerQuery read failed");
                break;
            }
        }
    }

    info!("ServerQuery connection closed");
}
