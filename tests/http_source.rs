use bluelight::fetch::{FetchError, HttpSource, StatusSource};
use mockito::Server;
use std::time::Duration;

fn source() -> HttpSource {
    HttpSource::new(Duration::from_secs(2)).expect("client should build")
}

#[tokio::test]
async fn returns_body_text() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/deploy/deploy-au")
        .with_status(200)
        .with_body("  testok\n")
        .create_async()
        .await;

    let body = source()
        .get_text(&format!("{}/deploy/deploy-au", server.url()))
        .await
        .unwrap();

    assert_eq!(body, "  testok\n");
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_still_returns_body() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/deploy/deploy")
        .with_status(503)
        .with_body("testfail")
        .create_async()
        .await;

    let body = source()
        .get_text(&format!("{}/deploy/deploy", server.url()))
        .await
        .unwrap();

    assert_eq!(body, "testfail");
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = source()
        .get_text(&format!("http://{addr}/deploy/deploy-ca"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Transport(_)));
    assert!(!err.to_string().is_empty());
}

#[tokio::test]
async fn silent_server_times_out() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let source = HttpSource::new(Duration::from_millis(200)).unwrap();

    let err = source
        .get_text(&format!("http://{addr}/deploy/deploy-us"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Transport(ref inner) if inner.is_timeout()));
    drop(listener);
}
