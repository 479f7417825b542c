use diesel::pg::PgConnection;
use diesel::prelude::*;
use log::error;

pub fn establish_connection(database_url: &str) -> Result<PgConnection, ConnectionError> {
    match PgConnection::establish(database_url) {
        Ok(conn) => Ok(conn),
        Err(e) => {
            error!("Failed to establish database connection: {}", e);
            Err(e)
        }
    }
}
