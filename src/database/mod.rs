/*
 *     Copyright (C) 2023  Fritz Ochsmann
 *
 *     This program is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Affero General Public License as published
 *     by the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     This program is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU Affero General Public License for more details.
 *
 *     You should have received a copy of the GNU Affero General Public License
 *     along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use crate::prelude::*;
use chrono::{DateTime, SubsecRound, Utc};
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
#[cfg(not(test))]
use version_compare::{Cmp, Version};

pub mod definitions;
pub mod id;
pub mod page;

pub type DatabaseConnection = Surreal<Any>;

pub const ALPHANUMERIC: [char; 62] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
    'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
    'V', 'W', 'X', 'Y', 'Z',
];

/// Current time truncated to whole seconds, so stored timestamps sort lexicographically.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

pub async fn connect(config: &Config) -> Result<DatabaseConnection> {
    // establish the connection
    let client = surrealdb::engine::any::connect(config.surrealdb_endpoint().as_str()).await?;
    info!("Established connection to surrealdb");

    // authenticate, embedded engines run without credentials
    if let Some((username, password)) = config.surrealdb_credentials() {
        client.signin(Root { username, password }).await?;
        info!("Authenticated with surrealdb");
    }

    // use namespace and database
    cfg_if::cfg_if! {
        if #[cfg(test)] {
            let db = nanoid::nanoid!(16, &ALPHANUMERIC);
            println!("Connected with database {:?} in namespace \"test\"", db);

            client.use_ns("test").use_db(db).await?;
        } else {
            client
                .use_ns(config.surrealdb_namespace().as_str())
                .use_db(config.surrealdb_database().as_str())
                .await?;
        }
    }

    // perform the migrations
    #[cfg(not(test))]
    migrate(&client, env!("CARGO_PKG_VERSION"), Vec::new()).await?;
    // execute the up queries
    client
        .query(include_str!("./up.surrealql"))
        .await?
        .check()?;
    info!("Initiated tables");

    Ok(client)
}

#[cfg(not(test))]
pub async fn migrate(
    client: &DatabaseConnection,
    current_version: &'static str,
    migrations: Vec<(&'static str, &'static str)>,
) -> Result<()> {
    // initiate the migration table and fetch possibly already existing records
    let mut responses = client
        .query(
            "DEFINE TABLE migration SCHEMALESS;
            DEFINE FIELD version     on TABLE migration TYPE string ASSERT $value IS NOT NULL;
            DEFINE FIELD created_at  on TABLE migration TYPE datetime VALUE time::now();",
        )
        .query("SELECT version, created_at FROM migration ORDER BY created_at DESC LIMIT 1")
        .await?
        .check()?;
    // take the last as response, which contains the last migrated version
    let last = responses.take::<Option<String>>((3, "version"))?;

    let current = Version::from(current_version).ok_or(ApplicationError::InternalServerError)?;
    if let Some(last) = last {
        // only proceed if the last version is not equal to the current version
        if last.as_str().eq(current_version) {
            return Ok(());
        }
        let last = Version::from(last.as_str()).ok_or(ApplicationError::InternalServerError)?;

        // iterate through the given migrations
        for (version, migration) in migrations {
            let target = Version::from(version).ok_or(ApplicationError::InternalServerError)?;
            if target.compare_to(&last, Cmp::Gt) && target.compare_to(&current, Cmp::Le) {
                info!("Executing surrealdb migration to {version}");
                // execute the migration query and mark it as done
                client
                    .query(migration)
                    .query("CREATE migration SET version = $version")
                    .bind(("version", version))
                    .await?
                    .check()?;
            }
        }
    }

    // insert the current version as the last version
    client
        .query("CREATE migration SET version = $version")
        .bind(("version", current_version))
        .await?
        .check()?;

    Ok(())
}

#[macro_export]
macro_rules! sql_span {
    ($expr: expr) => {{
        tracing::debug!("Surrealdb Request");
        $expr
    }};
    ($expr: expr, $title: expr) => {{
        tracing::debug!("Surrealdb Request: {}", $title);
        $expr
    }};
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use axum::BoxError;

    #[tokio::test]
    async fn test_connect_defines_tables() -> std::result::Result<(), BoxError> {
        let connection = crate::database::connect(&Config::default()).await?;

        let mut response = connection.query("INFO FOR DB").await?.check()?;
        let info: Option<serde_json::Value> = response.take(0)?;
        let tables = info
            .as_ref()
            .and_then(|info| info.get("tables"))
            .and_then(|tables| tables.as_object())
            .map(|tables| tables.len())
            .unwrap_or_default();
        assert!(tables >= 13);

        Ok(())
    }
}
