mod common;

use std::time::Duration;

use adapters::ftp::TcpFtpConnector;
use adapters::ConnectionConfig;
use backend::errors::SessionError;
use backend::services::{
    run_transfer, RemoteTransferSession, SessionState, TransferDirection, TransferRequest,
};
use common::{ftp_config, MockFtpServer};
use tempfile::TempDir;
use tokio::net::TcpListener;

#[tokio::test]
async fn connect_resolves_when_ready_and_connected() {
    let server = MockFtpServer::default();
    let session = RemoteTransferSession::connect(&server, &ftp_config())
        .await
        .expect("session should connect");

    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.address(), "ftp.example.com:21");
    assert_eq!(server.log.events(), vec!["open"]);
}

#[tokio::test]
async fn connect_rejects_ready_without_connected_flag() {
    let server = MockFtpServer {
        connected_after_ready: false,
        ..Default::default()
    };

    let err = RemoteTransferSession::connect(&server, &ftp_config())
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Connection(_)));
    assert_eq!(server.log.count("close"), 1, "unauthenticated channel must be closed");
}

#[tokio::test]
async fn connect_surfaces_login_rejection_as_connection_error() {
    let server = MockFtpServer {
        open_error: Some((530, "Login incorrect".into())),
        ..Default::default()
    };

    let err = RemoteTransferSession::connect(&server, &ftp_config())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SessionError::Connection("Server replied 530: Login incorrect".into())
    );
}

#[tokio::test]
async fn invalid_config_never_reaches_the_transport() {
    let server = MockFtpServer::default();
    let config = ConnectionConfig::new("ftp.example.com", 0, "u", "p");

    let err = RemoteTransferSession::connect(&server, &config).await.unwrap_err();

    assert!(matches!(err, SessionError::Connection(_)));
    assert!(server.log.events().is_empty());
}

#[tokio::test]
async fn upload_closes_session_once_on_success() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("a.txt");
    tokio::fs::write(&local, b"profile export").await.unwrap();
    let server = MockFtpServer::default();

    let session = RemoteTransferSession::connect(&server, &ftp_config()).await.unwrap();
    let outcome = session
        .upload(&TransferRequest::upload(&local, "/remote/a.txt"))
        .await
        .unwrap();

    assert_eq!(outcome.direction, TransferDirection::Upload);
    assert_eq!(outcome.bytes, 14);
    assert_eq!(server.log.events(), vec!["open", "store", "close"]);
    assert_eq!(
        server.stored.lock().unwrap().get("/remote/a.txt").map(Vec::as_slice),
        Some(&b"profile export"[..])
    );
}

#[tokio::test]
async fn upload_error_mid_transfer_closes_and_reports_transfer_error() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("a.txt");
    tokio::fs::write(&local, b"data").await.unwrap();
    let server = MockFtpServer {
        store_error: Some((426, "Connection closed; transfer aborted".into())),
        ..Default::default()
    };

    let session = RemoteTransferSession::connect(&server, &ftp_config()).await.unwrap();
    let err = session
        .upload(&TransferRequest::upload(&local, "/remote/a.txt"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SessionError::Transfer("Server replied 426: Connection closed; transfer aborted".into())
    );
    assert_eq!(server.log.count("close"), 1);
}

#[tokio::test]
async fn upload_of_missing_local_file_still_closes() {
    let dir = TempDir::new().unwrap();
    let server = MockFtpServer::default();

    let err = run_transfer(
        &server,
        &ftp_config(),
        &TransferRequest::upload(dir.path().join("nope.txt"), "/remote/nope.txt"),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SessionError::Transfer(_)));
    assert_eq!(server.log.count("close"), 1);
}

#[tokio::test]
async fn download_writes_file_and_closes_once() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("b.txt");
    let server = MockFtpServer::default().with_file("/remote/b.txt", b"remote contents");

    let outcome = run_transfer(
        &server,
        &ftp_config(),
        &TransferRequest::download("/remote/b.txt", &local),
    )
    .await
    .unwrap();

    assert_eq!(outcome.bytes, 15);
    assert_eq!(tokio::fs::read(&local).await.unwrap(), b"remote contents");
    assert_eq!(
        server.log.events(),
        vec!["open", "retrieve", "finish", "close"]
    );
}

#[tokio::test]
async fn download_keeps_session_open_until_local_write_finishes() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("slow.bin");
    let body: Vec<u8> = (0..64u8).collect();
    let server = MockFtpServer {
        chunk_size: 4,
        chunk_delay: Duration::from_millis(15),
        observe_local: Some(local.clone()),
        ..Default::default()
    }
    .with_file("/remote/slow.bin", &body);

    run_transfer(
        &server,
        &ftp_config(),
        &TransferRequest::download("/remote/slow.bin", &local),
    )
    .await
    .unwrap();

    assert_eq!(*server.local_size_at_close.lock().unwrap(), vec![Some(64)]);
    assert_eq!(tokio::fs::read(&local).await.unwrap(), body);
}

#[tokio::test]
async fn download_of_missing_path_fails_without_creating_local_file() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("b.txt");
    let server = MockFtpServer::default();

    let err = run_transfer(
        &server,
        &ftp_config(),
        &TransferRequest::download("/missing", &local),
    )
    .await
    .unwrap_err();

    assert_eq!(
        err,
        SessionError::Transfer("Server replied 550: No such file or directory".into())
    );
    assert_eq!(server.log.count("close"), 1);
    assert!(!local.exists());
}

#[tokio::test]
async fn interrupted_download_keeps_only_what_was_sent() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("partial.bin");
    let server = MockFtpServer {
        abort_after: Some(10),
        ..Default::default()
    }
    .with_file("/remote/big.bin", &[7u8; 100]);

    let err = run_transfer(
        &server,
        &ftp_config(),
        &TransferRequest::download("/remote/big.bin", &local),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SessionError::Transfer(_)));
    assert_eq!(server.log.count("close"), 1);
    assert_eq!(tokio::fs::read(&local).await.unwrap().len(), 10);
}

#[tokio::test]
async fn mismatched_direction_is_rejected_and_closed() {
    let server = MockFtpServer::default().with_file("/remote/b.txt", b"x");
    let session = RemoteTransferSession::connect(&server, &ftp_config()).await.unwrap();

    let err = session
        .upload(&TransferRequest::download("/remote/b.txt", "/tmp/unused"))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Transfer(_)));
    assert_eq!(server.log.events(), vec!["open", "close"]);
}

#[tokio::test]
async fn unreachable_host_is_a_connection_error() {
    // Bind then drop so the port is very likely closed.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let connector = TcpFtpConnector::with_timeout(Duration::from_secs(2));
    let config = ConnectionConfig::new("127.0.0.1", port, "u", "p");

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        RemoteTransferSession::connect(&connector, &config),
    )
    .await
    .expect("connect must settle within the transport timeout");

    assert!(matches!(result, Err(SessionError::Connection(_))));
}

#[tokio::test]
async fn silent_server_hits_the_connector_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let connector = TcpFtpConnector::with_timeout(Duration::from_millis(200));
    let config = ConnectionConfig::new("127.0.0.1", port, "u", "p");

    let err = tokio::time::timeout(
        Duration::from_secs(5),
        RemoteTransferSession::connect(&connector, &config),
    )
    .await
    .expect("connect must not hang")
    .unwrap_err();

    match err {
        SessionError::Connection(message) => assert!(message.starts_with("Timed out")),
        other => panic!("expected connection error, got {other:?}"),
    }
}
