use std::time::Duration;

use plan_signup::{
    currency::CurrencyCode,
    errors::RateFetchError,
    rates::{HttpRateSource, RateSource},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::oneshot,
};

/// Serves one canned HTTP response and reports the request line it received.
async fn serve_once(
    status: &'static str,
    body: &'static str,
) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let read = socket.read(&mut buf).await.expect("read request");
            if read == 0 {
                break;
            }
            request.extend_from_slice(&buf[..read]);
            if request.windows(4).any(|window| window == b"\r\n\r\n") {
                break;
            }
        }
        let text = String::from_utf8_lossy(&request);
        let request_line = text.lines().next().unwrap_or_default().to_string();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n{}\r\n\r\n{}",
            status,
            body.len(),
            "Connection: close",
            body
        );
        socket.write_all(response.as_bytes()).await.expect("write response");
        socket.shutdown().await.ok();
        let _ = tx.send(request_line);
    });

    (format!("http://{}/latest", addr), rx)
}

#[tokio::test]
async fn fetches_rates_for_every_other_currency() {
    let (url, request) = serve_once(
        "200 OK",
        r#"{"base":"GBP","date":"2024-05-01","rates":{"EUR":1.17,"USD":1.27,"JPY":190.2}}"#,
    )
    .await;
    let source = HttpRateSource::new(url, Duration::from_secs(5)).expect("client");

    let table = source
        .fetch("GBP", &[CurrencyCode::Eur, CurrencyCode::Usd])
        .await
        .expect("rates");

    assert_eq!(table.get(&CurrencyCode::Usd), Some(&1.27));
    assert_eq!(table.get(&CurrencyCode::Eur), Some(&1.17));
    assert_eq!(table.len(), 2);

    let request_line = request.await.expect("request line");
    assert!(request_line.starts_with("GET /latest?"), "{request_line}");
    assert!(request_line.contains("from=GBP"), "{request_line}");
    assert!(request_line.contains("to=EUR"), "{request_line}");
}

#[tokio::test]
async fn rejected_requests_surface_the_status() {
    let (url, _request) = serve_once("404 Not Found", r#"{"message":"not found"}"#).await;
    let source = HttpRateSource::new(url, Duration::from_secs(5)).expect("client");

    let err = source
        .fetch("INVALID", &[CurrencyCode::Eur, CurrencyCode::Usd])
        .await
        .expect_err("status error");
    assert!(matches!(err, RateFetchError::Status(404)), "{err:?}");
}

#[tokio::test]
async fn unexpected_bodies_are_malformed() {
    let (url, _request) = serve_once("200 OK", r#"{"base":"GBP"}"#).await;
    let source = HttpRateSource::new(url, Duration::from_secs(5)).expect("client");

    let err = source
        .fetch("GBP", &[CurrencyCode::Usd])
        .await
        .expect_err("malformed");
    assert!(matches!(err, RateFetchError::Malformed(_)), "{err:?}");
}

#[tokio::test]
async fn unreachable_services_are_transport_errors() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let url = format!("http://{}/latest", addr);
    let source = HttpRateSource::new(url, Duration::from_secs(2)).expect("client");

    let err = source
        .fetch("GBP", &[CurrencyCode::Usd])
        .await
        .expect_err("connection refused");
    assert!(matches!(err, RateFetchError::Transport(_)), "{err:?}");
}
