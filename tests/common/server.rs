//! Scripted ServerQuery peer.
//!
//! Accepts one connection, sends the greeting, answers each command line
//! with whatever the responder returns, and writes pushed lines (events or
//! late replies) as soon as they are queued.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

enum Action {
    Line(String),
    Close,
}

/// A fake ServerQuery server bound to an ephemeral local port.
pub struct FakeQueryServer {
    addr: SocketAddr,
    commands: Arc<Mutex<Vec<String>>>,
    actions: mpsc::UnboundedSender<Action>,
}

#[allow(dead_code)]
impl FakeQueryServer {
    /// Spawn a server. `respond` maps a received command line to the reply
    /// lines (without terminators). An empty reply leaves the command
    /// unanswered.
    pub async fn spawn<F>(respond: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Vec<String> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let commands = Arc::new(Mutex::new(Vec::new()));
        let (actions, mut action_rx) = mpsc::unbounded_channel();

        let log = commands.clone();
        tokio::spawn(async move {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let (read_half, mut write_half) = stream.into_split();
            let mut lines = BufReader::new(read_half).lines();

            if write_half
                .write_all(b"TS3\n\rWelcome to the TeamSpeak 3 ServerQuery interface.\n\r")
                .await
                .is_err()
            {
                return;
            }

            loop {
                tokio::select! {
                    biased;
                    action = action_rx.recv() => match action {
                        Some(Action::Line(line)) => {
                            if write_half.write_all(format!("{}\n\r", line).as_bytes()).await.is_err() {
                                return;
                            }
                        }
                        Some(Action::Close) | None => return,
                    },
                    line = lines.next_line() => {
                        let Ok(Some(line)) = line else { return };
                        let line = line.trim_end_matches('\r').to_string();
                        let reply = respond(&line);
                        log.lock().unwrap().push(line);
                        for out in reply {
                            if write_half.write_all(format!("{}\n\r", out).as_bytes()).await.is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            commands,
            actions,
        })
    }

    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Write an unsolicited line.
    pub fn push(&self, line: &str) {
        let _ = self.actions.send(Action::Line(line.to_string()));
    }

    /// Drop the connection.
    pub fn close(&self) {
        let _ = self.actions.send(Action::Close);
    }

    /// Command lines received so far.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    /// Wait until a received command starts with `prefix`, returning it.
    pub async fn wait_for_command(&self, prefix: &str) -> Option<String> {
        for _ in 0..100 {
            if let Some(found) = self.commands().into_iter().find(|c| c.starts_with(prefix)) {
                return Some(found);
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        None
    }
}

/// Successful status line.
#[allow(dead_code)]
pub fn ok() -> String {
    "error id=0 msg=ok".to_string()
}
