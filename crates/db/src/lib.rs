pub mod assignment;
pub mod event;
pub mod member;
/// Database schema
pub mod schema;
pub mod team;
pub mod template;
pub mod tenant;
pub mod user;

use diesel::{
    connection::SimpleConnection,
    r2d2::{ConnectionManager, CustomizeConnection, Error, Pool, PoolError},
    Connection, SqliteConnection,
};

/// A pooled SQLite connection handle.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

struct ConnectionTracer;

impl diesel::connection::Instrumentation for ConnectionTracer {
    fn on_connection_event(
        &mut self,
        event: diesel::connection::InstrumentationEvent<'_>,
    ) {
        match event {
            diesel::connection::InstrumentationEvent::StartQuery {
                query,
                ..
            } => {
                tracing::trace!("Started running query {query:?}");
            }
            diesel::connection::InstrumentationEvent::FinishQuery {
                query,
                error,
                ..
            } => {
                if let Some(error) = error {
                    tracing::warn!(
                        "Encountered an error when running query {query} (error: {error})"
                    );
                }
            }
            _ => (),
        }
    }
}

#[derive(Debug)]
struct Customizer;

impl CustomizeConnection<SqliteConnection, Error> for Customizer {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), Error> {
        conn.set_instrumentation(ConnectionTracer);

        conn.batch_execute(
            "\
            PRAGMA journal_mode = WAL;\
            PRAGMA busy_timeout = 1000;\
            PRAGMA foreign_keys = ON;\
        ",
        )
        .map_err(Error::QueryError)?;

        Ok(())
    }
}

/// Builds a connection pool for the given database URL. Every connection has
/// WAL mode and foreign key enforcement switched on before use.
pub fn pool(database_url: &str, max_size: u32) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(Customizer))
        .max_size(max_size)
        .connection_timeout(std::time::Duration::from_secs(5))
        .build(manager)
}

#[cfg(test)]
mod tests {
    use diesel::prelude::*;

    #[derive(QueryableByName)]
    struct Pragma {
        #[diesel(sql_type = diesel::sql_types::BigInt)]
        foreign_keys: i64,
    }

    #[test]
    fn pooled_connections_enforce_foreign_keys() {
        let pool = super::pool(":memory:", 1).unwrap();
        let mut conn = pool.get().unwrap();

        let row = diesel::sql_query("PRAGMA foreign_keys")
            .get_result::<Pragma>(&mut *conn)
            .unwrap();
        assert_eq!(row.foreign_keys, 1);
    }
}
