use crate::{
    error::PollError,
    metrics::{
        filter_snapshot,
        flatten,
        Accumulator,
        Role,
        Snapshot,
        Tags,
    },
};
use reqwest::Client as HttpClient;
use serde_json::Value;
use snapshot_gatherer_config::RoleConfig;
use std::time::Duration;
use url::Url;

/// Longest wait for the response headers of a snapshot request.
pub const RESPONSE_HEADER_TIMEOUT: Duration = Duration::from_secs(3);
/// Cap on a whole snapshot request, body included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(4);

/// HTTP client shared by every poll.
///
/// Built once with fixed timeouts and never reconfigured; clones share the
/// same connection pool.
#[derive(Debug, Clone)]
pub struct SnapshotClient {
    http: HttpClient,
    header_timeout: Duration,
}

impl SnapshotClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeouts(RESPONSE_HEADER_TIMEOUT, REQUEST_TIMEOUT)
    }

    pub fn with_timeouts(header_timeout: Duration, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = HttpClient::builder().timeout(request_timeout).build()?;
        Ok(Self { http, header_timeout })
    }

    /// GETs `/metrics/snapshot` from `fetch_address` and decodes the body.
    ///
    /// The status code is not inspected: any body that decodes to a JSON
    /// object is a snapshot.
    pub async fn fetch(&self, fetch_address: &str, timeout_hint_ms: u64) -> Result<Snapshot, PollError> {
        let url = snapshot_url(fetch_address, timeout_hint_ms)?;

        let response = tokio::time::timeout(self.header_timeout, self.http.get(url.clone()).send())
            .await
            .map_err(|_| PollError::HeaderTimeout(self.header_timeout, url.to_string()))?
            .map_err(PollError::Transport)?;

        let body = response.bytes().await.map_err(PollError::Body)?;

        // Only a JSON object is a snapshot; `null` and other top-level values fail to decode.
        serde_json::from_slice::<Snapshot>(&body).map_err(|_| PollError::Decode)
    }
}

/// Where to fetch from and how to tag the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Value of the `server` tag.
    pub host: String,
    /// `host:port` the request goes to.
    pub fetch_address: String,
}

impl Endpoint {
    /// Addresses without a port get `default_port` appended and are tagged
    /// with the address as written. Addresses with a port are fetched as-is
    /// and tagged with their host part.
    pub fn parse(address: &str, default_port: u16) -> Self {
        match split_host_port(address) {
            Some((host, _port)) => Self {
                host: host.to_string(),
                fetch_address: address.to_string(),
            },
            None => Self {
                host: address.to_string(),
                fetch_address: format!("{address}:{default_port}"),
            },
        }
    }

    pub fn tags(&self) -> Tags {
        Tags::from([("server".to_string(), self.host.clone())])
    }
}

/// Splits `host:port` or `[host]:port`. Returns `None` when there is no port
/// or the address is ambiguous (a bare IPv6 address).
fn split_host_port(address: &str) -> Option<(&str, &str)> {
    if let Some(rest) = address.strip_prefix('[') {
        let (host, after) = rest.split_once(']')?;
        let port = after.strip_prefix(':')?;
        return Some((host, port));
    }

    let (host, port) = address.rsplit_once(':')?;
    if host.contains(':') || host.contains('[') || host.contains(']') {
        return None;
    }
    Some((host, port))
}

fn snapshot_url(fetch_address: &str, timeout_hint_ms: u64) -> Result<Url, PollError> {
    let mut url = Url::parse(&format!("http://{fetch_address}/metrics/snapshot")).map_err(|source| {
        PollError::InvalidAddress {
            address: fetch_address.to_string(),
            source,
        }
    })?;
    url.query_pairs_mut()
        .append_pair("timeout", &format!("{timeout_hint_ms}ms"));
    Ok(url)
}

/// Polls one endpoint of `role` and hands the flattened snapshot to `acc`.
///
/// `config.timeout` must already be filled in; a zero is sent as-is.
#[instrument(level = "debug", skip_all, fields(role = %role, endpoint = %address))]
pub async fn poll_endpoint(
    client: &SnapshotClient,
    role: Role,
    config: &RoleConfig,
    address: &str,
    acc: &dyn Accumulator,
) -> Result<(), PollError> {
    let descriptor = role.descriptor();
    let endpoint = Endpoint::parse(address, descriptor.default_port);

    let mut snapshot = client.fetch(&endpoint.fetch_address, config.timeout).await?;
    let received = snapshot.len();

    let removed = filter_snapshot(role, &config.collections, &mut snapshot);
    let fields = flatten("", &Value::Object(snapshot))?;
    debug!(received, removed, fields = fields.len(), "Snapshot collected");

    acc.add_fields(descriptor.measurement, fields, endpoint.tags());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MemoryAccumulator;
    use axum::{
        routing::get,
        Router,
    };
    use pretty_assertions::assert_eq;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    async fn serve(router: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    /// Promises 100 bytes of body, sends a few and hangs up.
    async fn serve_truncated_body() -> SocketAddr {
        use tokio::io::{
            AsyncReadExt as _,
            AsyncWriteExt as _,
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut request = [0u8; 1024];
                let _ = stream.read(&mut request).await;
                let _ = stream
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"master/")
                    .await;
                let _ = stream.shutdown().await;
            }
        });
        addr
    }

    fn slave_config(collections: &[&str]) -> RoleConfig {
        RoleConfig {
            enabled: true,
            timeout: 10,
            endpoints: Vec::new(),
            collections: collections.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn address_without_port_gets_default() {
        assert_eq!(
            Endpoint::parse("10.0.0.1", 5051),
            Endpoint {
                host: "10.0.0.1".to_string(),
                fetch_address: "10.0.0.1:5051".to_string(),
            }
        );
        assert_eq!(Endpoint::parse("mesos.local", 5050).fetch_address, "mesos.local:5050");
    }

    #[test]
    fn address_with_port_is_used_unchanged() {
        assert_eq!(
            Endpoint::parse("10.0.0.1:6000", 5051),
            Endpoint {
                host: "10.0.0.1".to_string(),
                fetch_address: "10.0.0.1:6000".to_string(),
            }
        );
        assert_eq!(
            Endpoint::parse("[::1]:5050", 5051),
            Endpoint {
                host: "::1".to_string(),
                fetch_address: "[::1]:5050".to_string(),
            }
        );
    }

    #[test]
    fn bare_ipv6_is_treated_as_portless() {
        assert_eq!(Endpoint::parse("::1", 5050).host, "::1");
        assert_eq!(Endpoint::parse("[::1]", 5050).fetch_address, "[::1]:5050");
    }

    #[test]
    fn tags_carry_host() {
        assert_eq!(
            Endpoint::parse("127.0.0.1:5051", 5051).tags(),
            Tags::from([("server".to_string(), "127.0.0.1".to_string())])
        );
    }

    #[test]
    fn url_carries_timeout_hint() {
        let url = snapshot_url("127.0.0.1:5050", 100).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5050/metrics/snapshot?timeout=100ms");
    }

    #[test]
    fn unparseable_address_is_rejected() {
        assert!(matches!(
            snapshot_url("bad host:5050", 100),
            Err(PollError::InvalidAddress { .. })
        ));
    }

    #[tokio::test]
    async fn polls_filters_and_delivers() {
        let router = Router::new().route(
            "/metrics/snapshot",
            get(|| async {
                axum::Json(serde_json::json!({
                    "slave/tasks_running": 3,
                    "slave/uptime_secs": 120.5,
                    "system/load_1min": 0.7,
                    "custom/x": 1,
                }))
            }),
        );
        let addr = serve(router).await;
        let acc = MemoryAccumulator::new();
        let client = SnapshotClient::new().unwrap();

        poll_endpoint(&client, Role::Slave, &slave_config(&["slave"]), &addr.to_string(), &acc)
            .await
            .unwrap();

        let metrics = acc.metrics();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].measurement, "mesos_slave");
        assert_eq!(metrics[0].tag("server"), Some("127.0.0.1"));
        assert_eq!(
            metrics[0].fields.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["custom/x", "slave/uptime_secs"]
        );
    }

    #[tokio::test]
    async fn timeout_hint_is_sent() {
        let router = Router::new().route(
            "/metrics/snapshot",
            get(|axum::extract::RawQuery(query): axum::extract::RawQuery| async move {
                axum::Json(serde_json::json!({ "query_ok": query.as_deref() == Some("timeout=10ms") }))
            }),
        );
        let addr = serve(router).await;
        let client = SnapshotClient::new().unwrap();

        let snapshot = client.fetch(&addr.to_string(), 10).await.unwrap();
        assert_eq!(snapshot["query_ok"], serde_json::json!(true));
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let router = Router::new().route("/metrics/snapshot", get(|| async { "not-json" }));
        let addr = serve(router).await;
        let acc = MemoryAccumulator::new();
        let client = SnapshotClient::new().unwrap();

        let err = poll_endpoint(&client, Role::Slave, &slave_config(&[]), &addr.to_string(), &acc)
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Decode));
        assert_eq!(err.to_string(), "Error decoding JSON response");
        assert!(acc.is_empty());
    }

    #[tokio::test]
    async fn top_level_array_is_a_decode_error() {
        let router = Router::new().route("/metrics/snapshot", get(|| async { axum::Json(vec![1, 2, 3]) }));
        let addr = serve(router).await;
        let client = SnapshotClient::new().unwrap();

        assert!(matches!(
            client.fetch(&addr.to_string(), 100).await,
            Err(PollError::Decode)
        ));
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        // Bind and drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = SnapshotClient::new().unwrap();
        assert!(matches!(
            client.fetch(&addr.to_string(), 100).await,
            Err(PollError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn slow_headers_time_out() {
        let router = Router::new().route(
            "/metrics/snapshot",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "{}"
            }),
        );
        let addr = serve(router).await;
        let client = SnapshotClient::with_timeouts(Duration::from_millis(50), REQUEST_TIMEOUT).unwrap();

        assert!(matches!(
            client.fetch(&addr.to_string(), 100).await,
            Err(PollError::HeaderTimeout(..))
        ));
    }

    #[tokio::test]
    async fn truncated_body_is_a_body_error() {
        let addr = serve_truncated_body().await;
        let client = SnapshotClient::new().unwrap();

        let err = client.fetch(&addr.to_string(), 100).await.unwrap_err();
        assert!(matches!(err, PollError::Body(_)), "{err:?}");
    }

    #[tokio::test]
    async fn null_body_is_a_decode_error() {
        let router = Router::new().route("/metrics/snapshot", get(|| async { "null" }));
        let addr = serve(router).await;
        let client = SnapshotClient::new().unwrap();

        assert!(matches!(
            client.fetch(&addr.to_string(), 100).await,
            Err(PollError::Decode)
        ));
    }
}
