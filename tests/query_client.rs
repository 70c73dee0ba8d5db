//! Integration tests for the ServerQuery client against a scripted peer.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::server::ok;
use common::{FakeQueryServer, Recorder};
use ts_activity::banner::BannerTemplate;
use ts_activity::bridge::Bridge;
use ts_activity::dispatch::EffectDispatcher;
use ts_activity::error::{BridgeError, QueryError};
use ts_activity::query::{QueryClient, QueryResolver, ServerBanner};
use ts_activity::roster::{ClientType, DatabaseId, IdentityResolver, ResolvePolicy, Roster};
use ts_activity::slots::SlotTable;
use ts_query_proto::Command;

const TIMEOUT: Duration = Duration::from_secs(2);

/// A server that accepts everything and knows a couple of clients.
fn standard_responses(line: &str) -> Vec<String> {
    let name = line.split(' ').next().unwrap_or_default();
    match name {
        "whoami" => vec![
            "virtualserver_status=online virtualserver_id=1 client_id=3 \
             client_nickname=serveradmin\\sfrom\\s127.0.0.1:5000"
                .to_string(),
            ok(),
        ],
        "clientlist" => vec![
            "clid=1 cid=1 client_database_id=11 client_nickname=Ann client_type=0|\
             clid=3 cid=1 client_database_id=1 client_nickname=serveradmin client_type=1|\
             clid=4 cid=2 client_nickname=broken client_type=0"
                .to_string(),
            ok(),
        ],
        "clientgetnamefromdbid" if line.contains("cldbid=11") => {
            vec!["cluid=annToken= cldbid=11 name=Ann".to_string(), ok()]
        }
        "clientgetnamefromdbid" if line.contains("cldbid=12") => {
            vec!["cluid=bobToken= cldbid=12 name=Bob".to_string(), ok()]
        }
        "clientgetnamefromdbid" => vec!["error id=512 msg=invalid\\sclientID".to_string()],
        "use" if line != "use sid=1" => vec!["error id=1024 msg=invalid\\sserverID".to_string()],
        "version" => vec![
            "version=3.13.7 build=1655727713 platform=Linux".to_string(),
            ok(),
        ],
        _ => vec![ok()],
    }
}

async fn connect(server: &FakeQueryServer) -> (QueryClient, ts_activity::query::NotificationStream) {
    QueryClient::connect(&server.address(), TIMEOUT)
        .await
        .expect("connect failed")
}

#[tokio::test]
async fn test_login_sequence() {
    let server = FakeQueryServer::spawn(standard_responses).await.unwrap();
    let (client, _events) = connect(&server).await;

    client.login("serveradmin", "pa ss").await.unwrap();
    client.use_server(1).await.unwrap();
    let me = client.whoami().await.unwrap();
    client.register_server_events().await.unwrap();

    assert_eq!(me.get("client_id"), Some("3"));
    assert_eq!(
        me.get("client_nickname"),
        Some("serveradmin from 127.0.0.1:5000")
    );
    assert_eq!(
        server.commands(),
        vec![
            "login client_login_name=serveradmin client_login_password=pa\\sss",
            "use sid=1",
            "whoami",
            "servernotifyregister event=server",
        ]
    );
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let server = FakeQueryServer::spawn(standard_responses).await.unwrap();
    let (client, _events) = connect(&server).await;

    let err = client.use_server(9).await.unwrap_err();

    match err {
        QueryError::Server { id, msg } => {
            assert_eq!(id, 1024);
            assert_eq!(msg, "invalid serverID");
        }
        other => panic!("expected server error, got {other}"),
    }
}

#[tokio::test]
async fn test_client_list_skips_malformed_entries() {
    let server = FakeQueryServer::spawn(standard_responses).await.unwrap();
    let (client, _events) = connect(&server).await;

    let clients = client.client_list().await.unwrap();

    assert_eq!(clients.len(), 2);
    assert_eq!(clients[0].display_name, "Ann");
    assert_eq!(clients[0].database_id, DatabaseId(11));
    assert_eq!(clients[1].client_type, ClientType::Query);
}

#[tokio::test]
async fn test_notifications_interleaved_with_response() {
    let server = FakeQueryServer::spawn(|line| {
        if line == "clientlist" {
            vec![
                "notifyclientleftview cfid=1 ctid=0 reasonid=8 clid=9".to_string(),
                "clid=1 client_database_id=11 client_nickname=Ann client_type=0".to_string(),
                ok(),
            ]
        } else {
            vec![ok()]
        }
    })
    .await
    .unwrap();
    let (client, mut events) = connect(&server).await;

    let clients = client.client_list().await.unwrap();
    let notification = tokio::time::timeout(TIMEOUT, events.recv())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(clients.len(), 1);
    assert_eq!(notification.event, "clientleftview");
    assert_eq!(notification.records[0].get("clid"), Some("9"));
}

#[tokio::test]
async fn test_unparseable_line_does_not_drop_connection() {
    let server = FakeQueryServer::spawn(standard_responses).await.unwrap();
    let (client, mut events) = connect(&server).await;

    server.push("notifyclientleftview cfid=1 ctid=0 reasonid=8 clid=9");
    server.push("error msg=weird");
    server.push("notifyclientleftview cfid=1 ctid=0 reasonid=8 clid=10");

    let mut handles = Vec::new();
    for _ in 0..2 {
        let notification = tokio::time::timeout(TIMEOUT, events.recv())
            .await
            .unwrap()
            .unwrap();
        handles.push(notification.records[0].get("clid").unwrap().to_string());
    }

    assert_eq!(handles, vec!["9", "10"]);
    assert!(client.keepalive().await.is_ok());
}

#[tokio::test]
async fn test_late_reply_is_discarded_after_timeout() {
    let server = FakeQueryServer::spawn(|line| match line {
        "whoami" => Vec::new(),
        "version" => vec!["version=3.13.7 platform=Linux".to_string(), ok()],
        _ => vec![ok()],
    })
    .await
    .unwrap();
    let (client, _events) = connect(&server).await;

    let err = client
        .execute_within(Command::whoami(), Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::Timeout));

    // The whoami reply shows up after the caller gave up
    server.push("virtualserver_id=1 client_id=3");
    server.push(&ok());

    let records = client.execute(Command::version()).await.unwrap();
    assert_eq!(records[0].get("version"), Some("3.13.7"));
}

#[tokio::test]
async fn test_cancelled_command_keeps_replies_aligned() {
    let server = FakeQueryServer::spawn(|line| match line {
        "whoami" => Vec::new(),
        "version" => vec!["version=3.13.7 platform=Linux".to_string(), ok()],
        _ => vec![ok()],
    })
    .await
    .unwrap();
    let (client, _events) = connect(&server).await;

    // Dropped by the outer timeout while waiting for its reply
    let abandoned =
        tokio::time::timeout(Duration::from_millis(100), client.execute(Command::whoami())).await;
    assert!(abandoned.is_err());
    assert!(server.wait_for_command("whoami").await.is_some());

    server.push("virtualserver_id=1 client_id=3");
    server.push(&ok());

    let records = client.execute(Command::version()).await.unwrap();
    assert_eq!(records[0].get("version"), Some("3.13.7"));
}

#[tokio::test]
async fn test_resolver_maps_lookup_results() {
    let server = FakeQueryServer::spawn(standard_responses).await.unwrap();
    let (client, _events) = connect(&server).await;
    let resolver = QueryResolver::new(Arc::new(client), TIMEOUT);

    let token = resolver.resolve(DatabaseId(11)).await.unwrap();
    assert_eq!(token.as_str(), "annToken=");

    let err = resolver.resolve(DatabaseId(77)).await.unwrap_err();
    assert!(matches!(
        err,
        ts_activity::error::ResolveError::NotFound(DatabaseId(77))
    ));
}

#[tokio::test]
async fn test_connection_close_ends_event_stream() {
    let server = FakeQueryServer::spawn(standard_responses).await.unwrap();
    let (client, mut events) = connect(&server).await;

    server.close();

    let end = tokio::time::timeout(TIMEOUT, events.recv()).await.unwrap();
    assert!(end.is_none());
    assert!(client.keepalive().await.is_err());
}

#[tokio::test]
async fn test_bridge_end_to_end() {
    let server = FakeQueryServer::spawn(standard_responses).await.unwrap();
    let (client, mut events) = connect(&server).await;
    let client = Arc::new(client);

    let slots: SlotTable = [("annToken=", 2), ("bobToken=", 4)].into_iter().collect();
    let template = BannerTemplate::parse("https://img.example/%s.png")
        .unwrap()
        .unwrap();
    let notes = Recorder::default();
    let mut bridge = Bridge::new(
        Roster::new(
            QueryResolver::new(client.clone(), TIMEOUT),
            ResolvePolicy::Abort,
        ),
        slots,
        EffectDispatcher::new(
            notes.clone(),
            Some((template, ServerBanner::new(client.clone()))),
        ),
    );

    let snapshot = client.client_list().await.unwrap();
    bridge.bootstrap(snapshot).await.unwrap();
    assert!(
        server
            .wait_for_command("serveredit virtualserver_hostbanner_gfx_url=https:\\/\\/img.example\\/2.png")
            .await
            .is_some()
    );

    server.push(
        "notifycliententerview cfid=0 ctid=1 reasonid=0 clid=5 \
         client_unique_identifier=bobToken= client_nickname=Bob \
         client_database_id=12 client_type=0",
    );

    // Run until the banner for both slots has been written
    let written = tokio::select! {
        result = bridge.run(&mut events) => panic!("bridge stopped early: {:?}", result),
        found = server.wait_for_command(
            "serveredit virtualserver_hostbanner_gfx_url=https:\\/\\/img.example\\/2_4.png",
        ) => found,
    };

    assert!(written.is_some());
    assert_eq!(notes.received(), vec!["Client connected: Bob"]);
    assert_eq!(bridge.roster().len(), 2);

    server.close();
    let err = bridge.run(&mut events).await.unwrap_err();
    assert!(matches!(err, BridgeError::ConnectionLost));
}
