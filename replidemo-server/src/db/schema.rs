//! Chat table bootstrap
//!
//! Only ever run against the primary; replicas receive the table through
//! replication.

use sqlx::PgPool;

const CREATE_CHAT_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS chat (
        id BIGSERIAL PRIMARY KEY,
        message TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

/// Create the chat table if it does not exist.
pub async fn ensure_chat_table(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Ensuring chat table exists");
    sqlx::query(CREATE_CHAT_TABLE).execute(pool).await?;
    Ok(())
}
