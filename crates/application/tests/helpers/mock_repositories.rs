#![allow(dead_code)]

use async_trait::async_trait;
use homedns_application::ports::{CacheInvalidator, CredentialRepository, RecordRepository};
use homedns_domain::{DnsQuery, DnsRecord, DomainError, JwtSubject, RecordType};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use uuid::Uuid;

// ============================================================================
// Mock RecordRepository
// ============================================================================

#[derive(Clone, Default)]
pub struct MockRecordRepository {
    records: Arc<RwLock<Vec<DnsRecord>>>,
}

impl MockRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl RecordRepository for MockRecordRepository {
    async fn get(&self, name: &str, record_type: RecordType) -> Result<Vec<DnsRecord>, DomainError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.name == name && r.record_type == record_type)
            .cloned()
            .collect())
    }

    async fn get_by_name(&self, name: &str) -> Result<Vec<DnsRecord>, DomainError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.name == name)
            .cloned()
            .collect())
    }

    async fn list(&self, search: Option<&str>) -> Result<Vec<DnsRecord>, DomainError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| search.map_or(true, |s| r.name.contains(s)))
            .cloned()
            .collect())
    }

    async fn create(&self, record: &DnsRecord) -> Result<DnsRecord, DomainError> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| {
            r.name == record.name && r.record_type == record.record_type && r.value == record.value
        }) {
            return Err(DomainError::DuplicateRecord(record.name.clone()));
        }
        records.push(record.clone());
        Ok(record.clone())
    }

    async fn update(&self, record: &DnsRecord) -> Result<DnsRecord, DomainError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !(r.name == record.name && r.record_type == record.record_type));
        if records.len() == before {
            return Err(DomainError::RecordNotFound(record.name.clone()));
        }
        records.push(record.clone());
        Ok(record.clone())
    }

    async fn upsert(&self, record: &DnsRecord) -> Result<DnsRecord, DomainError> {
        let mut records = self.records.write().await;
        records.retain(|r| !(r.name == record.name && r.record_type == record.record_type));
        records.push(record.clone());
        Ok(record.clone())
    }

    async fn delete(&self, name: &str, record_type: RecordType) -> Result<u64, DomainError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !(r.name == name && r.record_type == record_type));
        Ok((before - records.len()) as u64)
    }
}

// ============================================================================
// Mock CredentialRepository
// ============================================================================

#[derive(Clone, Default)]
pub struct MockCredentialRepository {
    subjects: Arc<RwLock<HashMap<Uuid, JwtSubject>>>,
    retired: Arc<RwLock<HashSet<Uuid>>>,
}

impl MockCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialRepository for MockCredentialRepository {
    async fn insert(&self, subject: JwtSubject) -> Result<(), DomainError> {
        self.subjects
            .write()
            .await
            .insert(subject.subject_id, subject);
        Ok(())
    }

    async fn get(&self, subject_id: &Uuid) -> Result<Option<JwtSubject>, DomainError> {
        Ok(self.subjects.read().await.get(subject_id).cloned())
    }

    async fn list(&self) -> Result<Vec<JwtSubject>, DomainError> {
        Ok(self.subjects.read().await.values().cloned().collect())
    }

    async fn remove(&self, subject_id: &Uuid) -> Result<bool, DomainError> {
        let removed = self.subjects.write().await.remove(subject_id).is_some();
        if removed {
            self.retired.write().await.insert(*subject_id);
        }
        Ok(removed)
    }

    async fn is_known(&self, subject_id: &Uuid) -> Result<bool, DomainError> {
        Ok(self.subjects.read().await.contains_key(subject_id)
            || self.retired.read().await.contains(subject_id))
    }

    async fn reload_if_changed(&self) -> Result<bool, DomainError> {
        Ok(false)
    }
}

// ============================================================================
// Recording CacheInvalidator
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    Key(String, RecordType),
    Name(String),
}

#[derive(Default)]
pub struct RecordingInvalidator {
    calls: Mutex<Vec<Invalidation>>,
}

impl RecordingInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Invalidation> {
        self.calls.lock().unwrap().clone()
    }
}

impl CacheInvalidator for RecordingInvalidator {
    fn invalidate(&self, query: &DnsQuery) {
        self.calls
            .lock()
            .unwrap()
            .push(Invalidation::Key(query.name.to_string(), query.record_type));
    }

    fn invalidate_name(&self, name: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(Invalidation::Name(name.to_string()));
    }
}
