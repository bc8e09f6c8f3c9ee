//! Responses cut short after the status line.

mod common;

use std::error::Error as _;

use anyhow::Result;
use opentok_client::{Condition, Error, OpenTokClient, OperationKind};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use common::{API_KEY, API_SECRET, FixedTokenGenerator, init_tracing, transport_options};

/// Serve one request with a status line that promises 100 body bytes but
/// sends three, then close the connection.
async fn truncated_server(status: &'static str) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        // Read the whole request so closing does not reset the connection.
        loop {
            let Ok(n) = socket.read(&mut buf).await else {
                return;
            };
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
            if let Some(end) = find_head_end(&request) {
                let body_len = content_length(&request[..end]);
                if request.len() >= end + body_len {
                    break;
                }
            }
        }
        let response = format!("HTTP/1.1 {}\r\nContent-Length: 100\r\n\r\nabc", status);
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });

    Ok(format!("http://{}", addr))
}

fn find_head_end(request: &[u8]) -> Option<usize> {
    request
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|pos| pos + 4)
}

fn content_length(head: &[u8]) -> usize {
    String::from_utf8_lossy(head)
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())
                .flatten()
        })
        .unwrap_or(0)
}

fn client_at(url: String) -> Result<OpenTokClient> {
    init_tracing();
    Ok(OpenTokClient::builder(API_KEY, API_SECRET)
        .api_url(url)
        .transport_options(transport_options())
        .token_generator(FixedTokenGenerator)
        .build()?)
}

#[tokio::test]
async fn test_truncated_success_body_is_unexpected_status() -> Result<()> {
    let client = client_at(truncated_server("200 OK").await?)?;

    let err = client.archives().get("A1").await.unwrap_err();

    assert!(matches!(
        err,
        Error::UnexpectedStatus {
            operation: OperationKind::GetArchive,
            status: 200,
            ..
        }
    ));
    assert!(err.source().is_some());
    Ok(())
}

#[tokio::test]
async fn test_truncated_session_body_is_transport_error() -> Result<()> {
    let client = client_at(truncated_server("200 OK").await?)?;

    let err = client.sessions().create(None).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Transport {
            operation: OperationKind::CreateSession,
            ..
        }
    ));
    assert!(err.source().is_some());
    Ok(())
}

#[tokio::test]
async fn test_known_failure_is_classified_before_the_body() -> Result<()> {
    let client = client_at(truncated_server("409 Conflict").await?)?;

    let err = client.archives().stop("A1").await.unwrap_err();

    assert_eq!(err.condition(), Some(Condition::ArchiveNotRecording));
    assert_eq!(err.archive_id(), Some("A1"));
    Ok(())
}
