use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use homedns_application::ports::RecordRepository;
use homedns_domain::{DnsRecord, DomainError, RecordType};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, error, instrument};

type RecordRow = (String, String, String, i64, String);

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct SqliteRecordRepository {
    pool: SqlitePool,
}

impl SqliteRecordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: RecordRow) -> Result<DnsRecord, DomainError> {
        let (name, record_type, value, ttl, updated_at) = row;

        let record_type = record_type.parse::<RecordType>().map_err(|e| {
            error!(name = %name, error = %e, "Stored record has unknown type");
            DomainError::DatabaseError(e)
        })?;
        let ttl = u32::try_from(ttl)
            .map_err(|_| DomainError::DatabaseError(format!("Stored TTL out of range: {}", ttl)))?;

        Ok(DnsRecord {
            name,
            record_type,
            value,
            ttl,
            updated_at: NaiveDateTime::parse_from_str(&updated_at, TIMESTAMP_FORMAT)
                .ok()
                .map(|n| n.and_utc()),
        })
    }

    fn rows_to_records(rows: Vec<RecordRow>) -> Result<Vec<DnsRecord>, DomainError> {
        rows.into_iter().map(Self::row_to_record).collect()
    }

    fn now() -> String {
        Utc::now().format(TIMESTAMP_FORMAT).to_string()
    }

    fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
        move |e| {
            error!(error = %e, "{}", context);
            DomainError::DatabaseError(e.to_string())
        }
    }

    async fn begin(&self) -> Result<Transaction<'static, Sqlite>, DomainError> {
        self.pool
            .begin()
            .await
            .map_err(Self::db_error("Failed to begin transaction"))
    }

    async fn delete_set(
        tx: &mut Transaction<'static, Sqlite>,
        name: &str,
        record_type: RecordType,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM dns_records WHERE name = ? AND record_type = ?")
            .bind(name)
            .bind(record_type.as_str())
            .execute(&mut **tx)
            .await
            .map_err(Self::db_error("Failed to delete record set"))?;
        Ok(result.rows_affected())
    }

    async fn insert_row(
        tx: &mut Transaction<'static, Sqlite>,
        record: &DnsRecord,
        now: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO dns_records (name, record_type, value, ttl, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.name)
        .bind(record.record_type.as_str())
        .bind(&record.value)
        .bind(i64::from(record.ttl))
        .bind(now)
        .bind(now)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Replaces the set for the record's key inside one transaction.
    async fn replace_set(
        &self,
        record: &DnsRecord,
        require_existing: bool,
    ) -> Result<DnsRecord, DomainError> {
        let now = Self::now();
        let mut tx = self.begin().await?;

        let removed = Self::delete_set(&mut tx, &record.name, record.record_type).await?;
        if require_existing && removed == 0 {
            // dropping the transaction rolls it back
            return Err(DomainError::RecordNotFound(format!(
                "{} {}",
                record.name, record.record_type
            )));
        }

        Self::insert_row(&mut tx, record, &now)
            .await
            .map_err(Self::db_error("Failed to insert record"))?;
        tx.commit()
            .await
            .map_err(Self::db_error("Failed to commit record set"))?;

        debug!(
            name = %record.name,
            record_type = %record.record_type,
            replaced = removed,
            "Record set replaced"
        );

        let mut stored = record.clone();
        stored.updated_at = NaiveDateTime::parse_from_str(&now, TIMESTAMP_FORMAT)
            .ok()
            .map(|n| n.and_utc());
        Ok(stored)
    }
}

#[async_trait]
impl RecordRepository for SqliteRecordRepository {
    #[instrument(skip(self))]
    async fn get(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<DnsRecord>, DomainError> {
        let rows = sqlx::query_as::<_, RecordRow>(
            "SELECT name, record_type, value, ttl, updated_at
             FROM dns_records WHERE name = ? AND record_type = ?
             ORDER BY id",
        )
        .bind(name)
        .bind(record_type.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Self::db_error("Failed to query records"))?;

        Self::rows_to_records(rows)
    }

    #[instrument(skip(self))]
    async fn get_by_name(&self, name: &str) -> Result<Vec<DnsRecord>, DomainError> {
        let rows = sqlx::query_as::<_, RecordRow>(
            "SELECT name, record_type, value, ttl, updated_at
             FROM dns_records WHERE name = ?
             ORDER BY id",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::db_error("Failed to query records by name"))?;

        Self::rows_to_records(rows)
    }

    #[instrument(skip(self))]
    async fn list(&self, search: Option<&str>) -> Result<Vec<DnsRecord>, DomainError> {
        let rows = match search {
            Some(term) => {
                let pattern = format!(
                    "%{}%",
                    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
                );
                sqlx::query_as::<_, RecordRow>(
                    "SELECT name, record_type, value, ttl, updated_at
                     FROM dns_records WHERE name LIKE ? ESCAPE '\\'
                     ORDER BY name, record_type, id",
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, RecordRow>(
                    "SELECT name, record_type, value, ttl, updated_at
                     FROM dns_records ORDER BY name, record_type, id",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(Self::db_error("Failed to list records"))?;

        Self::rows_to_records(rows)
    }

    #[instrument(skip(self))]
    async fn create(&self, record: &DnsRecord) -> Result<DnsRecord, DomainError> {
        let now = Self::now();
        let mut tx = self.begin().await?;

        Self::insert_row(&mut tx, record, &now).await.map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                DomainError::DuplicateRecord(format!(
                    "{} {} {}",
                    record.name, record.record_type, record.value
                ))
            }
            other => {
                error!(error = %other, "Failed to create record");
                DomainError::DatabaseError(other.to_string())
            }
        })?;

        // Members of one set share a TTL.
        sqlx::query(
            "UPDATE dns_records SET ttl = ?, updated_at = ? WHERE name = ? AND record_type = ?",
        )
        .bind(i64::from(record.ttl))
        .bind(&now)
        .bind(&record.name)
        .bind(record.record_type.as_str())
        .execute(&mut *tx)
        .await
        .map_err(Self::db_error("Failed to align record set TTL"))?;

        tx.commit()
            .await
            .map_err(Self::db_error("Failed to commit record"))?;

        let mut stored = record.clone();
        stored.updated_at = NaiveDateTime::parse_from_str(&now, TIMESTAMP_FORMAT)
            .ok()
            .map(|n| n.and_utc());
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn update(&self, record: &DnsRecord) -> Result<DnsRecord, DomainError> {
        self.replace_set(record, true).await
    }

    #[instrument(skip(self))]
    async fn upsert(&self, record: &DnsRecord) -> Result<DnsRecord, DomainError> {
        self.replace_set(record, false).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, name: &str, record_type: RecordType) -> Result<u64, DomainError> {
        let mut tx = self.begin().await?;
        let removed = Self::delete_set(&mut tx, name, record_type).await?;
        tx.commit()
            .await
            .map_err(Self::db_error("Failed to commit delete"))?;
        Ok(removed)
    }
}
