use super::{DnsResponse, MessageBuilder, ResponseParser};
use crate::dns::transport::{DnsTransport, TcpTransport, UdpTransport};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::{Record, RecordType};
use homedns_domain::{DomainError, ForwardTarget};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// One upstream resolver: UDP first, TCP when the UDP reply is truncated.
pub struct Upstream {
    pub label: String,
    udp: Arc<dyn DnsTransport>,
    tcp: Option<Arc<dyn DnsTransport>>,
}

impl Upstream {
    pub fn new(
        label: impl Into<String>,
        udp: Arc<dyn DnsTransport>,
        tcp: Option<Arc<dyn DnsTransport>>,
    ) -> Self {
        Self {
            label: label.into(),
            udp,
            tcp,
        }
    }

    pub fn from_target(target: &ForwardTarget) -> Self {
        Self::new(
            target.to_string(),
            Arc::new(UdpTransport::new(target.address)),
            Some(Arc::new(TcpTransport::new(target.address))),
        )
    }
}

/// Answer relayed from an upstream.
#[derive(Debug, Clone)]
pub struct ForwardedAnswer {
    pub rcode: ResponseCode,
    pub answers: Vec<Record>,
    pub authorities: Vec<Record>,
    pub min_ttl: Option<u32>,
    pub upstream: String,
}

impl ForwardedAnswer {
    /// Only positive answers are cached; NXDOMAIN and NODATA are relayed as is.
    pub fn is_cacheable(&self) -> bool {
        self.rcode == ResponseCode::NoError && !self.answers.is_empty()
    }
}

/// Resolves names through the configured upstreams and timeout ladder.
///
/// Attempts run round-robin by timeout: every upstream is tried with the
/// first timeout, then every upstream with the second, and so on. The worst
/// case is `upstreams × timeouts` attempts. Each attempt is a future bounded
/// by its timeout and dropped when it expires, so a late reply can never
/// surface after a later attempt has already answered.
pub struct Forwarder {
    upstreams: Vec<Upstream>,
    timeouts: Vec<Duration>,
    attempts: AtomicU64,
}

impl Forwarder {
    pub fn new(targets: &[ForwardTarget], timeouts: Vec<Duration>) -> Self {
        Self::with_upstreams(targets.iter().map(Upstream::from_target).collect(), timeouts)
    }

    pub fn with_upstreams(upstreams: Vec<Upstream>, timeouts: Vec<Duration>) -> Self {
        Self {
            upstreams,
            timeouts,
            attempts: AtomicU64::new(0),
        }
    }

    /// Total attempts issued since start.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn max_attempts(&self) -> usize {
        self.upstreams.len() * self.timeouts.len()
    }

    /// # Errors
    ///
    /// * `DomainError::ForwardFailure` - After every upstream/timeout pair failed
    /// * `DomainError::InvalidDomainName` - If `name` cannot be encoded
    pub async fn resolve(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<ForwardedAnswer, DomainError> {
        for (round, timeout) in self.timeouts.iter().enumerate() {
            for upstream in &self.upstreams {
                let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
                let (id, query) = MessageBuilder::build_query(name, record_type)?;

                let outcome = tokio::time::timeout(
                    *timeout,
                    Self::exchange(upstream, &query, id, name, record_type, *timeout),
                )
                .await;

                match outcome {
                    Ok(Ok(response)) if response.is_server_error() => {
                        warn!(
                            upstream = %upstream.label,
                            name = %name,
                            rcode = ?response.rcode,
                            round = round,
                            "Upstream returned server error"
                        );
                    }
                    Ok(Ok(response)) => {
                        debug!(
                            upstream = %upstream.label,
                            name = %name,
                            record_type = %record_type,
                            rcode = ?response.rcode,
                            attempt = attempt,
                            "Forwarded query answered"
                        );
                        return Ok(ForwardedAnswer {
                            rcode: response.rcode,
                            answers: response.answers,
                            authorities: response.authorities,
                            min_ttl: response.min_ttl,
                            upstream: upstream.label.clone(),
                        });
                    }
                    Ok(Err(e)) => {
                        debug!(
                            upstream = %upstream.label,
                            name = %name,
                            error = %e,
                            round = round,
                            "Forward attempt failed"
                        );
                    }
                    Err(_) => {
                        debug!(
                            upstream = %upstream.label,
                            name = %name,
                            timeout_ms = timeout.as_millis() as u64,
                            round = round,
                            "Forward attempt timed out"
                        );
                    }
                }
            }
        }

        warn!(
            name = %name,
            record_type = %record_type,
            attempts = self.max_attempts(),
            "All upstreams exhausted"
        );
        Err(DomainError::forward_exhausted())
    }

    async fn exchange(
        upstream: &Upstream,
        query: &[u8],
        id: u16,
        name: &str,
        record_type: RecordType,
        timeout: Duration,
    ) -> Result<DnsResponse, DomainError> {
        let reply = upstream.udp.send(query, timeout).await?;
        let response = ResponseParser::parse(&reply.bytes, id, name, record_type)?;

        if !response.truncated {
            return Ok(response);
        }

        let Some(tcp) = &upstream.tcp else {
            return Ok(response);
        };

        debug!(upstream = %upstream.label, name = %name, "Truncated UDP answer, retrying over TCP");
        let reply = tcp.send(query, timeout).await?;
        ResponseParser::parse(&reply.bytes, id, name, record_type)
    }
}
