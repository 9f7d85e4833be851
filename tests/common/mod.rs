//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use proxy_control::{ControlConfig, ControlServer, Shutdown};

/// Start the control service on an ephemeral loopback port.
///
/// The returned `Shutdown` must be kept alive for the lifetime of the test;
/// dropping it stops the server.
pub async fn spawn_control_service(config: ControlConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = ControlServer::new(config);
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    wait_until_ready(addr).await;
    (addr, shutdown)
}

/// Poll `/info/health` until the server accepts connections.
async fn wait_until_ready(addr: SocketAddr) {
    let client = http_client();
    for _ in 0..50 {
        if client
            .get(format!("http://{}/info/health", addr))
            .send()
            .await
            .is_ok()
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("control service at {} never became ready", addr);
}

/// Non-pooled client so each test drives fresh connections.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Start a raw TCP server that answers every request with a fixed HTTP
/// response, for driving the callback client into its failure paths.
#[allow(dead_code)]
pub async fn start_raw_backend(status_line: &'static str, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_line,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
