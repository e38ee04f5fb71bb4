//! Redis-backed one-time code store
//!
//! Each (email, purpose) pair is one hash at `otp:{purpose}:{email}` whose
//! key expiry is set to the code's `expires_at`, so Redis drops dead codes
//! on its own. Replacement is a MULTI/EXEC pipeline; the guarded attempt
//! increment and consume run as Lua scripts.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use redis::{AsyncCommands, Script};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use dl_core::{AttemptRecord, ConsumeRecord, DomainError, OneTimeCode, OtpPurpose, OtpRepository};

use crate::cache::RedisClient;
use crate::InfrastructureError;

/// Redis key prefix for code records
const OTP_KEY_PREFIX: &str = "otp";

/// Returns the new attempt count, -1 when the record is gone or was
/// replaced, -2 when the limit is already reached.
const INCREMENT_ATTEMPTS_SCRIPT: &str = r#"
local id = redis.call('HGET', KEYS[1], 'id')
if not id or id ~= ARGV[1] then
    return -1
end
local attempts = tonumber(redis.call('HGET', KEYS[1], 'attempt_count'))
local max_attempts = tonumber(redis.call('HGET', KEYS[1], 'max_attempts'))
if attempts >= max_attempts then
    return -2
end
redis.call('HSET', KEYS[1], 'attempt_count', attempts + 1, 'updated_at', ARGV[2])
return attempts + 1
"#;

/// Returns 1 when this call consumed the record, 0 when it already was
/// consumed, -1 when the record is gone or was replaced.
const CONSUME_SCRIPT: &str = r#"
local id = redis.call('HGET', KEYS[1], 'id')
if not id or id ~= ARGV[1] then
    return -1
end
if redis.call('HGET', KEYS[1], 'consumed') == '1' then
    return 0
end
redis.call('HSET', KEYS[1], 'consumed', '1', 'updated_at', ARGV[2])
return 1
"#;

/// Code store on Redis hashes with native expiry
pub struct RedisOtpRepository {
    redis_client: Arc<RedisClient>,
    increment_script: Script,
    consume_script: Script,
}

impl RedisOtpRepository {
    pub fn new(redis_client: Arc<RedisClient>) -> Self {
        Self {
            redis_client,
            increment_script: Script::new(INCREMENT_ATTEMPTS_SCRIPT),
            consume_script: Script::new(CONSUME_SCRIPT),
        }
    }

    /// Format the Redis key for a pair
    fn format_key(&self, email: &str, purpose: OtpPurpose) -> String {
        self.redis_client
            .key(&format!("{}:{}:{}", OTP_KEY_PREFIX, purpose.as_str(), email))
    }

    fn storage_error(operation: &str, e: redis::RedisError) -> DomainError {
        error!(operation = operation, error = %e, "Redis code store operation failed");
        InfrastructureError::Cache(e).into()
    }
}

/// Flatten a record into hash fields; timestamps are epoch milliseconds
pub(crate) fn encode_fields(code: &OneTimeCode) -> Vec<(&'static str, String)> {
    vec![
        ("id", code.id.to_string()),
        ("email", code.email.clone()),
        ("code", code.code.clone()),
        ("purpose", code.purpose.as_str().to_string()),
        ("consumed", if code.consumed { "1" } else { "0" }.to_string()),
        ("attempt_count", code.attempt_count.to_string()),
        ("max_attempts", code.max_attempts.to_string()),
        ("expires_at", code.expires_at.timestamp_millis().to_string()),
        ("created_at", code.created_at.timestamp_millis().to_string()),
        ("updated_at", code.updated_at.timestamp_millis().to_string()),
    ]
}

/// Rebuild a record from `HGETALL` output
pub(crate) fn decode_fields(
    fields: &HashMap<String, String>,
) -> Result<OneTimeCode, InfrastructureError> {
    fn field<'a>(
        fields: &'a HashMap<String, String>,
        name: &str,
    ) -> Result<&'a str, InfrastructureError> {
        fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| InfrastructureError::Corrupt(format!("missing field {}", name)))
    }

    fn number<T: std::str::FromStr>(
        fields: &HashMap<String, String>,
        name: &str,
    ) -> Result<T, InfrastructureError> {
        field(fields, name)?
            .parse()
            .map_err(|_| InfrastructureError::Corrupt(format!("invalid {}", name)))
    }

    fn timestamp(
        fields: &HashMap<String, String>,
        name: &str,
    ) -> Result<DateTime<Utc>, InfrastructureError> {
        let millis: i64 = number(fields, name)?;
        Utc.timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| InfrastructureError::Corrupt(format!("invalid {}", name)))
    }

    Ok(OneTimeCode {
        id: Uuid::parse_str(field(fields, "id")?)
            .map_err(|e| InfrastructureError::Corrupt(format!("invalid id: {}", e)))?,
        email: field(fields, "email")?.to_string(),
        code: field(fields, "code")?.to_string(),
        purpose: field(fields, "purpose")?
            .parse()
            .map_err(InfrastructureError::Corrupt)?,
        consumed: field(fields, "consumed")? == "1",
        attempt_count: number(fields, "attempt_count")?,
        max_attempts: number(fields, "max_attempts")?,
        expires_at: timestamp(fields, "expires_at")?,
        created_at: timestamp(fields, "created_at")?,
        updated_at: timestamp(fields, "updated_at")?,
    })
}

#[async_trait]
impl OtpRepository for RedisOtpRepository {
    async fn replace(&self, code: &OneTimeCode) -> Result<(), DomainError> {
        let key = self.format_key(&code.email, code.purpose);
        let fields = encode_fields(code);
        let mut conn = self.redis_client.get_connection();

        redis::pipe()
            .atomic()
            .del(&key)
            .ignore()
            .hset_multiple(&key, &fields)
            .ignore()
            .cmd("PEXPIREAT")
            .arg(&key)
            .arg(code.expires_at.timestamp_millis())
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| Self::storage_error("replace", e))
    }

    async fn find(
        &self,
        email: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OneTimeCode>, DomainError> {
        let key = self.format_key(email, purpose);

        let fields: HashMap<String, String> = self
            .redis_client
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.hgetall(key).await })
            })
            .await
            .map_err(|e| Self::storage_error("find", e))?;

        if fields.is_empty() {
            return Ok(None);
        }

        decode_fields(&fields).map(Some).map_err(|e| {
            error!(key = %key, error = %e, "Undecodable code record in Redis");
            e.into()
        })
    }

    async fn increment_attempts(
        &self,
        email: &str,
        purpose: OtpPurpose,
        id: Uuid,
    ) -> Result<AttemptRecord, DomainError> {
        let key = self.format_key(email, purpose);
        let mut conn = self.redis_client.get_connection();

        let result: i64 = self
            .increment_script
            .key(&key)
            .arg(id.to_string())
            .arg(Utc::now().timestamp_millis())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| Self::storage_error("increment_attempts", e))?;

        Ok(match result {
            -1 => AttemptRecord::Missing,
            -2 => AttemptRecord::LimitReached,
            count => AttemptRecord::Recorded {
                attempt_count: count as u32,
            },
        })
    }

    async fn mark_consumed(
        &self,
        email: &str,
        purpose: OtpPurpose,
        id: Uuid,
    ) -> Result<ConsumeRecord, DomainError> {
        let key = self.format_key(email, purpose);
        let mut conn = self.redis_client.get_connection();

        let result: i64 = self
            .consume_script
            .key(&key)
            .arg(id.to_string())
            .arg(Utc::now().timestamp_millis())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| Self::storage_error("mark_consumed", e))?;

        Ok(match result {
            1 => ConsumeRecord::Consumed,
            0 => ConsumeRecord::AlreadyConsumed,
            _ => ConsumeRecord::Missing,
        })
    }

    async fn delete(&self, email: &str, purpose: OtpPurpose) -> Result<bool, DomainError> {
        let key = self.format_key(email, purpose);

        let deleted: u32 = self
            .redis_client
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.del(key).await })
            })
            .await
            .map_err(|e| Self::storage_error("delete", e))?;

        Ok(deleted > 0)
    }

    async fn delete_expired(&self, _now: DateTime<Utc>) -> Result<u64, DomainError> {
        // Keys carry their own expiry
        Ok(0)
    }
}
