mod records;
mod response;
mod stats;

pub use response::{MAX_EDNS_PAYLOAD, MAX_UDP_PAYLOAD};
pub use stats::EngineStats;

use crate::dns::cache::DnsCache;
use crate::dns::forwarding::{Forwarder, MessageBuilder};
use crate::dns::record_type_map::RecordTypeMapper;
use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::{Name, Record, RecordType as WireType};
use homedns_application::ports::RecordRepository;
use homedns_domain::validators::{is_within_domain, normalize_name};
use homedns_domain::{DnsRecord, DomainError, RecordType};
use stats::EngineCounters;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Maximum CNAME hops followed inside the record store.
const MAX_CNAME_HOPS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Udp,
    Tcp,
}

/// Outcome of the authority check.
enum Authority {
    /// Stored records answer the query.
    Answer(Vec<Record>),
    /// Inside an authoritative domain, no records of the asked type.
    NoData,
    NxDomain,
    /// Not ours: go to cache and upstreams.
    Recursive,
}

/// The resolution pipeline shared by the UDP and TCP listeners.
///
/// `handle` always produces a reply: undecodable input gets FORMERR, storage
/// or upstream failures get SERVFAIL.
pub struct QueryEngine {
    records: Arc<dyn RecordRepository>,
    authoritative_domains: Vec<String>,
    cache: Option<Arc<DnsCache>>,
    forwarder: Option<Arc<Forwarder>>,
    counters: EngineCounters,
}

impl QueryEngine {
    /// `authoritative_domains` must already be normalised.
    pub fn new(records: Arc<dyn RecordRepository>, authoritative_domains: Vec<String>) -> Self {
        Self {
            records,
            authoritative_domains,
            cache: None,
            forwarder: None,
            counters: EngineCounters::default(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<DnsCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_forwarder(mut self, forwarder: Arc<Forwarder>) -> Self {
        self.forwarder = Some(forwarder);
        self
    }

    pub fn stats(&self) -> EngineStats {
        self.counters.snapshot()
    }

    pub fn is_authoritative_for(&self, name: &str) -> bool {
        self.authoritative_domains
            .iter()
            .any(|domain| is_within_domain(name, domain))
    }

    /// Answers one wire-format query.
    pub async fn handle(&self, packet: &[u8], protocol: Protocol) -> Vec<u8> {
        EngineCounters::incr(&self.counters.queries);

        let request = match Message::from_vec(packet) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, bytes = packet.len(), "Undecodable query");
                EngineCounters::incr(&self.counters.format_errors);
                return response::format_error_bytes(packet);
            }
        };

        if request.message_type() != MessageType::Query || request.queries().len() != 1 {
            debug!(
                id = request.id(),
                questions = request.queries().len(),
                "Malformed query"
            );
            EngineCounters::incr(&self.counters.format_errors);
            return response::error_bytes(request.id(), request.op_code(), ResponseCode::FormErr);
        }

        if request.op_code() != OpCode::Query {
            return response::error_bytes(request.id(), request.op_code(), ResponseCode::NotImp);
        }

        let limit = match protocol {
            Protocol::Udp => Some(response::udp_limit(&request)),
            Protocol::Tcp => None,
        };
        let reply = self.resolve(&request).await;
        response::encode(reply, limit)
    }

    async fn resolve(&self, request: &Message) -> Message {
        let reply = response::response_for(request, self.forwarder.is_some());
        let question = &request.queries()[0];
        let qname = question.name().clone();
        let qtype = question.query_type();
        let raw_name = qname.to_ascii();

        let name = normalize_name(&raw_name).ok();

        if let Some(name) = name.as_deref() {
            let (rcode, answers) = match self.authority_check(name, &qname, qtype).await {
                Ok(Authority::Answer(answers)) => (ResponseCode::NoError, answers),
                Ok(Authority::NoData) => (ResponseCode::NoError, vec![]),
                Ok(Authority::NxDomain) => (ResponseCode::NXDomain, vec![]),
                Ok(Authority::Recursive) => {
                    return self.resolve_recursive(reply, name, qtype).await;
                }
                Err(e) => {
                    error!(
                        name = %name,
                        record_type = %qtype,
                        error = %e,
                        "Record store lookup failed"
                    );
                    EngineCounters::incr(&self.counters.server_failures);
                    return response::with_answers(reply, ResponseCode::ServFail, vec![], vec![]);
                }
            };

            EngineCounters::incr(&self.counters.authoritative);
            debug!(
                name = %name,
                record_type = %qtype,
                rcode = ?rcode,
                answers = answers.len(),
                "Authoritative answer"
            );
            let mut reply = response::with_answers(reply, rcode, answers, vec![]);
            reply.set_authoritative(true);
            return reply;
        }

        // Names outside the store's syntax (wildcards, escaped labels) can never
        // be stored, so inside our domains they do not exist.
        let cache_name = raw_name.trim_end_matches('.').to_ascii_lowercase();
        if self.is_authoritative_for(&cache_name) {
            EngineCounters::incr(&self.counters.authoritative);
            debug!(name = %cache_name, record_type = %qtype, "Unstorable name in authoritative domain");
            let mut reply = response::with_answers(reply, ResponseCode::NXDomain, vec![], vec![]);
            reply.set_authoritative(true);
            return reply;
        }
        self.resolve_recursive(reply, &cache_name, qtype).await
    }

    async fn authority_check(
        &self,
        name: &str,
        qname: &Name,
        qtype: WireType,
    ) -> Result<Authority, DomainError> {
        let authoritative = self.is_authoritative_for(name);

        if let Some(record_type) = RecordTypeMapper::from_hickory(qtype) {
            let stored = self.records.get(name, record_type).await?;
            if !stored.is_empty() {
                return Ok(Authority::Answer(to_wire(qname, &stored)?));
            }

            if record_type != RecordType::CNAME {
                let chased = self.chase_cname(name, qname, record_type).await?;
                if !chased.is_empty() {
                    return Ok(Authority::Answer(chased));
                }
            }
        }

        if !authoritative {
            return Ok(Authority::Recursive);
        }

        if self.records.get_by_name(name).await?.is_empty() {
            Ok(Authority::NxDomain)
        } else {
            Ok(Authority::NoData)
        }
    }

    /// Follows stored CNAMEs from `name`, collecting the chain and the final
    /// records of `record_type` when the target is stored too.
    async fn chase_cname(
        &self,
        name: &str,
        qname: &Name,
        record_type: RecordType,
    ) -> Result<Vec<Record>, DomainError> {
        let mut answers = Vec::new();
        let mut current = name.to_string();
        let mut owner = qname.clone();

        for _ in 0..MAX_CNAME_HOPS {
            let cnames = self.records.get(&current, RecordType::CNAME).await?;
            let Some(cname) = cnames.first() else {
                break;
            };
            answers.push(records::to_wire_record(&owner, cname)?);

            let target = normalize_name(&cname.value)?;
            owner = MessageBuilder::parse_name(&target)?;

            let stored = self.records.get(&target, record_type).await?;
            if !stored.is_empty() {
                answers.extend(to_wire(&owner, &stored)?);
                break;
            }
            current = target;
        }

        Ok(answers)
    }

    async fn resolve_recursive(&self, reply: Message, name: &str, qtype: WireType) -> Message {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.lookup(name, qtype) {
                EngineCounters::incr(&self.counters.cache_hits);
                debug!(
                    name = %name,
                    record_type = %qtype,
                    ttl = hit.remaining_ttl,
                    "Cache hit"
                );
                return response::with_answers(reply, ResponseCode::NoError, hit.records, vec![]);
            }
        }

        let Some(forwarder) = &self.forwarder else {
            EngineCounters::incr(&self.counters.refused);
            debug!(name = %name, record_type = %qtype, "Forwarding disabled, refusing");
            return response::with_answers(reply, ResponseCode::Refused, vec![], vec![]);
        };

        EngineCounters::incr(&self.counters.forwarded);
        match forwarder.resolve(name, qtype).await {
            Ok(answer) => {
                if let (Some(cache), true) = (&self.cache, answer.is_cacheable()) {
                    if let Some(ttl) = answer.min_ttl {
                        cache.put(name, qtype, answer.answers.clone(), ttl);
                    }
                }
                response::with_answers(reply, answer.rcode, answer.answers, answer.authorities)
            }
            Err(e) => {
                warn!(name = %name, record_type = %qtype, error = %e, "Forwarding failed");
                EngineCounters::incr(&self.counters.forward_failures);
                response::with_answers(reply, ResponseCode::ServFail, vec![], vec![])
            }
        }
    }
}

fn to_wire(owner: &Name, stored: &[DnsRecord]) -> Result<Vec<Record>, DomainError> {
    stored
        .iter()
        .map(|record| records::to_wire_record(owner, record))
        .collect()
}
