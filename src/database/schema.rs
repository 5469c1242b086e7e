use sqlx::PgPool;

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    admin BOOLEAN NOT NULL DEFAULT FALSE,
    shared_account_ids TEXT[] NOT NULL DEFAULT '{}',
    created_on TIMESTAMPTZ NOT NULL,
    last_auth_on TIMESTAMPTZ NOT NULL
)"#;

const CREATE_WH: &str = r#"
CREATE TABLE IF NOT EXISTS wh (
    id TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    owner_id TEXT NOT NULL,
    shared BOOLEAN NOT NULL,
    payload JSONB NOT NULL
)"#;

const CREATE_WH_GENERATION: &str = r#"
CREATE TABLE IF NOT EXISTS wh_generation (
    name TEXT PRIMARY KEY,
    payload JSONB NOT NULL
)"#;

const CREATE_WH_OWNER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS wh_kind_owner_idx ON wh (kind, owner_id)";

/// Creates the tables when they are missing. Existing tables are left alone.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in [
        CREATE_USERS,
        CREATE_WH,
        CREATE_WH_OWNER_INDEX,
        CREATE_WH_GENERATION,
    ] {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("database schema ready");
    Ok(())
}
