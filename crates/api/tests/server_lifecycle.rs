//! Tests for the server lifecycle: bind, listen, graceful shutdown.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use tasks_api::config::ServerConfig;
use tasks_api::server::{Server, ServerError};
use tasks_api::state::AppState;
use tasks_core::{Task, TaskError, TaskId, TaskRepository, TaskService};
use tokio::io::AsyncWriteExt;
use tokio::sync::{oneshot, Notify};

#[tokio::test]
async fn server_listens_then_drains_on_shutdown_trigger() {
    let server = Server::new(common::test_state().await, &common::test_config()).unwrap();
    let bound = server.bind().await.unwrap();
    let addr = bound.local_addr();
    assert_ne!(addr.port(), 0, "bind must resolve the ephemeral port");

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(bound.run_until(async move {
        let _ = shutdown_rx.await;
    }));

    // The socket accepts connections while running.
    let probe = tokio::net::TcpStream::connect(addr).await;
    assert!(probe.is_ok(), "server must be listening on {addr}");
    drop(probe);

    // Triggering shutdown makes run_until return cleanly.
    shutdown_tx.send(()).unwrap();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .expect("shutdown must complete promptly")
        .expect("serve task must not panic");
    assert_matches!(result, Ok(()));
}

#[tokio::test]
async fn fast_drain_under_a_deadline_returns_ok() {
    let config = ServerConfig {
        shutdown_timeout: Some(Duration::from_secs(5)),
        ..common::test_config()
    };
    let server = Server::new(common::test_state().await, &config).unwrap();
    let bound = server.bind().await.unwrap();

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(bound.run_until(async move {
        let _ = shutdown_rx.await;
    }));

    // Nothing in flight, so the drain finishes well inside the deadline.
    shutdown_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("shutdown must complete promptly")
        .expect("serve task must not panic");
    assert_matches!(result, Ok(()));
}

/// Repository whose reads never complete, to pin a request in flight
/// while the server tries to drain.
struct StallingRepo {
    reading: Arc<Notify>,
}

#[async_trait]
impl TaskRepository for StallingRepo {
    async fn get_all(&self) -> Result<Vec<Task>, TaskError> {
        self.reading.notify_one();
        std::future::pending::<()>().await;
        Ok(Vec::new())
    }

    async fn get_by_id(&self, _id: TaskId) -> Result<Task, TaskError> {
        Err(TaskError::NotFound)
    }

    async fn add(&self, task: Task) -> Result<Task, TaskError> {
        Ok(task)
    }

    async fn update(&self, task: &Task) -> Result<Task, TaskError> {
        Ok(task.clone())
    }

    async fn delete_by_id(&self, _id: TaskId) -> Result<Task, TaskError> {
        Err(TaskError::NotFound)
    }
}

#[tokio::test]
async fn stalled_drain_fails_at_the_configured_deadline() {
    let reading = Arc::new(Notify::new());
    let state = AppState {
        tasks: Arc::new(TaskService::new(Arc::new(StallingRepo {
            reading: Arc::clone(&reading),
        }))),
    };
    let limit = Duration::from_millis(250);
    let config = ServerConfig {
        shutdown_timeout: Some(limit),
        ..common::test_config()
    };
    let bound = Server::new(state, &config).unwrap().bind().await.unwrap();
    let addr = bound.local_addr();

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(bound.run_until(async move {
        let _ = shutdown_rx.await;
    }));

    // Park a request inside the stalled repository; the connection stays
    // open so the drain can never finish on its own.
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /tasks HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(5), reading.notified())
        .await
        .expect("request must reach the repository");

    shutdown_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("deadline must fire well before this")
        .expect("serve task must not panic");
    assert_matches!(result, Err(ServerError::ShutdownTimeout(d)) if d == limit);
    drop(stream);
}

#[tokio::test]
async fn binding_an_occupied_port_fails() {
    // Occupy an ephemeral port for the duration of the test.
    let occupant = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let taken = occupant.local_addr().unwrap();

    let config = ServerConfig {
        port: taken.port(),
        ..common::test_config()
    };
    let server = Server::new(common::test_state().await, &config).unwrap();

    let result = server.bind().await;
    assert_matches!(result, Err(ServerError::Bind { addr, .. }) if addr == taken);
}

#[tokio::test]
async fn invalid_bind_host_is_rejected_up_front() {
    let config = ServerConfig {
        host: "not-an-ip".to_string(),
        ..common::test_config()
    };

    let result = Server::new(common::test_state().await, &config);
    assert_matches!(result, Err(ServerError::Address { host, .. }) if host == "not-an-ip");
}
