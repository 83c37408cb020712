pub mod memory;

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr};

use sqlx::{
	ConnectOptions, Connection,
	postgres::{PgConnectOptions, PgConnection},
};
use uuid::Uuid;

pub const DSN_ENV: &str = "WAYFARER_PG_DSN";

/// A scratch database on the server behind `WAYFARER_PG_DSN`.
///
/// Nothing drops it implicitly. Tests call [`TestDatabase::cleanup`] once they are done.
pub struct TestDatabase {
	name: String,
	dsn: String,
	server: PgConnectOptions,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let server = PgConnectOptions::from_str(base_dsn)?;
		let name = format!("wayfarer_test_{}", Uuid::new_v4().simple());

		run_on_server(&server, &format!(r#"CREATE DATABASE "{name}""#)).await?;

		let dsn = server.clone().database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, server })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	/// Drops the database, disconnecting any pool that still points at it.
	pub async fn cleanup(self) -> Result<()> {
		let sql = format!(r#"DROP DATABASE IF EXISTS "{}" WITH (FORCE)"#, self.name);

		run_on_server(&self.server, &sql)
			.await
			.map_err(|err| Error::Message(format!("Failed to drop {}: {err}.", self.name)))
	}
}

pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok().filter(|dsn| !dsn.trim().is_empty())
}

async fn run_on_server(server: &PgConnectOptions, sql: &str) -> Result<()> {
	let mut conn = PgConnection::connect_with(server).await?;

	sqlx::query(sql).execute(&mut conn).await?;
	conn.close().await?;

	Ok(())
}
