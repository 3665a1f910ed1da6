//! Bucket Audit Server - S3 security compliance scanner.
//!
//! This binary serves a small JSON API that inspects the security
//! configuration of S3 buckets and returns a weighted score, a letter grade,
//! and per-control findings for one bucket or a dashboard for many.
//!
//! # Usage
//!
//! ```text
//! GATEWAY_LISTEN=0.0.0.0:8080 bucketaudit-server
//! curl 'http://localhost:8080/scan?bucket=my-bucket'
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:8080` | Bind address |
//! | `DEFAULT_REGION` | `us-east-1` | Region for the S3 client (falls back to `AWS_REGION`) |
//! | `S3_ENDPOINT_URL` | *(unset)* | Endpoint override for S3-compatible providers |
//! | `S3_FORCE_PATH_STYLE` | `false` | Use path-style bucket addressing |
//! | `AUDIT_WEIGHTS` | *(defaults)* | Per-control deductions, e.g. `encryption=10,versioning=5` |
//! | `AUDIT_EXCLUDE_PATTERNS` | `state,log` | Name substrings skipped by account scans |
//! | `SECURE_TRANSPORT_STATUS` | `WARN` | Status when TLS-only access is not enforced |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod handler;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use bucketaudit_core::{AuditConfig, Auditor};
use bucketaudit_http::{AuditHttpConfig, AuditHttpService};
use bucketaudit_s3::{S3Probe, build_client};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::handler::AuditServerHandler;

/// Server version reported by `/info`.
const VERSION: &str = env!("CARGO_PKG_VERSION");

type Service = AuditHttpService<AuditServerHandler<S3Probe>>;

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

fn build_http_config() -> AuditHttpConfig {
    AuditHttpConfig {
        version: VERSION.to_owned(),
        ..AuditHttpConfig::default()
    }
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: Service) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight audits to complete.
    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Perform a health check by requesting `/health` from the running server.
///
/// Exits with code 0 if the response is 200 OK and reports `"running"`,
/// 1 otherwise.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = health_check_request(addr);
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if is_healthy_response(&response) {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

fn health_check_request(addr: &str) -> String {
    format!("GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n")
}

fn is_healthy_response(response: &str) -> bool {
    response.contains("200 OK") && response.contains("\"running\"")
}

#[tokio::main]
async fn main() -> Result<()> {
    let (config, config_issues) = AuditConfig::from_env();

    // Handle --health-check flag for container HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let addr = config.gateway_listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config.log_level)?;
    for issue in &config_issues {
        warn!(%issue, "ignoring invalid configuration value");
    }

    info!(
        region = %config.default_region,
        weights = %config.weights,
        excluded = ?config.excluded_name_patterns,
        secure_transport_status = %config.secure_transport_status,
        "initializing audit service",
    );

    // One client for the process lifetime.
    let client = build_client(&config).await;
    let auditor = Auditor::new(S3Probe::new(client), &config);
    let handler = AuditServerHandler(Arc::new(auditor));
    let service = AuditHttpService::new(Arc::new(handler), build_http_config());

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, version = VERSION, "starting Bucket Audit Server");

    serve(listener, service).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_request_health_endpoint() {
        let request = health_check_request("127.0.0.1:8080");
        assert!(request.starts_with("GET /health HTTP/1.1\r\n"));
        assert!(request.contains("Host: 127.0.0.1:8080"));
        assert!(request.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_should_accept_only_running_health_responses() {
        let healthy = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\r\n{\"status\":\"running\"}";
        assert!(is_healthy_response(healthy));
        assert!(!is_healthy_response(
            "HTTP/1.1 404 Not Found\r\n\r\n{\"code\":\"RouteNotFound\"}"
        ));
        assert!(!is_healthy_response("HTTP/1.1 200 OK\r\n\r\n{}"));
    }

    #[test]
    fn test_should_report_crate_version_in_info() {
        let config = build_http_config();
        assert_eq!(config.version, VERSION);
        assert_eq!(config.system_name, "S3 Security Compliance Scanner");
    }
}
