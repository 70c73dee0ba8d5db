//! Transport tests against an in-process ServerQuery peer.

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use ts_query_proto::{Command, ProtocolError, Reply, Transport};

const GREETING: &[u8] = b"TS3\n\rWelcome to the TeamSpeak 3 ServerQuery interface, type \"help\" for a list of commands.\n\r";

#[tokio::test]
async fn test_connect_reads_greeting_and_exchanges_command() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, mut write) = stream.into_split();
        write.write_all(GREETING).await.unwrap();

        let mut lines = BufReader::new(read).lines();
        let line = lines.next_line().await.unwrap().unwrap();
        assert_eq!(line, "whoami");

        write
            .write_all(b"virtualserver_status=online client_id=1\n\rerror id=0 msg=ok\n\r")
            .await
            .unwrap();
    };

    let client = async move {
        let mut transport = Transport::connect(addr).await.unwrap();
        transport.write_command(&Command::whoami()).await.unwrap();

        let data = transport.read_reply().await.unwrap().unwrap();
        match data {
            Reply::Data(records) => assert_eq!(records[0].get("client_id"), Some("1")),
            other => panic!("expected data, got {:?}", other),
        }

        let status = transport.read_reply().await.unwrap().unwrap();
        assert!(matches!(status, Reply::Status(s) if s.is_ok()));

        assert!(transport.read_reply().await.unwrap().is_none());
    };

    tokio::join!(server, client);
}

#[tokio::test]
async fn test_connect_rejects_foreign_greeting() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        stream
            .write_all(b"SSH-2.0-OpenSSH_9.6\r\n")
            .await
            .unwrap();
    };

    let client = async move {
        let result = Transport::connect(addr).await;
        assert!(matches!(result, Err(ProtocolError::UnexpectedGreeting(_))));
    };

    tokio::join!(server, client);
}

#[tokio::test]
async fn test_split_preserves_buffered_notifications() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        // Greeting and an event in a single write so the event is already
        // buffered when the transport is split.
        let mut payload = GREETING.to_vec();
        payload.extend_from_slice(b"notifyclientleftview cfid=1 ctid=0 reasonid=8 clid=7\n\r");
        stream.write_all(&payload).await.unwrap();

        let mut lines = BufReader::new(stream).lines();
        assert_eq!(lines.next_line().await.unwrap().unwrap(), "version");
    };

    let client = async move {
        let transport = Transport::connect(addr).await.unwrap();
        let (mut sink, mut stream) = transport.split();

        match stream.next().await {
            Some(Ok(Reply::Notify(n))) => {
                assert_eq!(n.event, "clientleftview");
                assert_eq!(n.records[0].get("clid"), Some("7"));
            }
            other => panic!("expected notification, got {:?}", other),
        }

        sink.send(Command::version()).await.unwrap();
    };

    tokio::join!(server, client);
}
