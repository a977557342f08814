use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::Result;
use litmap_config::Postgres;

const SCHEMA: &str = include_str!("../../../sql/init.sql");
const SCHEMA_LOCK_ID: i64 = 5_411_720;

pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &Postgres) -> Result<Self> {
		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?;

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		// Advisory locks are held per connection, so keep the lock inside one transaction.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)")
			.bind(SCHEMA_LOCK_ID)
			.execute(&mut *tx)
			.await?;

		for statement in SCHEMA.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		Ok(())
	}
}
