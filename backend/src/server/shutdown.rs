//! Graceful shutdown driven by SIGINT or SIGTERM.
//!
//! The probes report draining first. The listener keeps serving for the grace
//! period so orchestrators observe the 503 and stop routing traffic; only then
//! is the server stopped.

use std::future::Future;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::web;
use tokio::task::JoinHandle;
use tracing::{error, info};

use shop_items::inbound::http::health::HealthState;

/// Resolve on the first SIGINT or SIGTERM.
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            error!(%error, "failed to install SIGINT handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                error!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT"),
        () = terminate => info!("received SIGTERM"),
    }
}

/// Once `signal` resolves, mark the service draining, wait `grace`, then stop
/// the server gracefully.
pub fn spawn_graceful_shutdown<S>(
    signal: S,
    server: ServerHandle,
    health: web::Data<HealthState>,
    grace: Duration,
) -> JoinHandle<()>
where
    S: Future<Output = ()> + 'static,
{
    actix_web::rt::spawn(async move {
        signal.await;
        health.mark_unhealthy();
        info!(?grace, "draining; probes now report unavailable");
        tokio::time::sleep(grace).await;
        server.stop(true).await;
    })
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::Arc;

    use actix_web::HttpServer;
    use reqwest::StatusCode;
    use rstest::rstest;
    use tokio::sync::oneshot;

    use shop_items::outbound::memory::InMemoryItemRepository;
    use shop_items::outbound::outbox::index_outbox_channel;

    use super::*;
    use crate::server::{build_app, build_http_state};

    #[rstest]
    #[actix_web::test]
    async fn probes_report_draining_before_the_listener_stops() {
        let health = web::Data::new(HealthState::new());
        health.mark_ready();
        let (outbox, _receiver) = index_outbox_channel(4);
        let http_state = build_http_state(
            Arc::new(InMemoryItemRepository::new()),
            Arc::new(outbox),
        );

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let addr = listener.local_addr().expect("listener addr");
        let app_health = health.clone();
        let server = HttpServer::new(move || build_app(app_health.clone(), http_state.clone()))
            .disable_signals()
            .shutdown_timeout(1)
            .workers(1)
            .listen(listener)
            .expect("listen")
            .run();

        let (trigger, signal) = oneshot::channel::<()>();
        let shutdown = spawn_graceful_shutdown(
            async move {
                let _ = signal.await;
            },
            server.handle(),
            health.clone(),
            Duration::from_millis(500),
        );
        let running = actix_web::rt::spawn(server);

        let client = reqwest::Client::new();
        let url = format!("http://{addr}/health/ready");
        let before = client.get(&url).send().await.expect("ready probe");
        assert_eq!(before.status(), StatusCode::OK);

        trigger.send(()).expect("signal delivered");
        let mut during = StatusCode::OK;
        for _ in 0..40 {
            during = client
                .get(&url)
                .send()
                .await
                .expect("listener still serving")
                .status();
            if during == StatusCode::SERVICE_UNAVAILABLE {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(during, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!health.is_alive());

        drop(client);
        shutdown.await.expect("shutdown task joins");
        running
            .await
            .expect("server task joins")
            .expect("server stops cleanly");
    }
}
