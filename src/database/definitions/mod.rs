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
use serde::de::DeserializeOwned;
use surrealdb::sql::Thing;

pub mod account;
pub mod building;
pub mod inspector_group;
pub mod notification;
pub mod request;
pub mod role;
pub mod shift;
pub mod shift_type;
pub mod task;
pub mod task_assignment;

/// A row of one table.
pub trait Record: DeserializeOwned + Send + Sync {
    const TABLE: &'static str;
}

/// Selects a single record, `NotFound` if it does not exist.
#[instrument(skip(connection))]
pub async fn fetch<T: Record>(id: &Id, connection: &DatabaseConnection) -> Result<T> {
    if !id.table.eq(T::TABLE) {
        return Err(ApplicationError::BadRequest(format!(
            "invalid {} id",
            T::TABLE
        )));
    }

    let record: Option<T> = sql_span!(connection.select(id.to_thing()).await?, T::TABLE);
    record.ok_or_else(|| ApplicationError::NotFound(format!("{} {} not found", T::TABLE, id)))
}

/// Selects all records with one of the given ids, missing ones are skipped.
#[instrument(skip(connection))]
pub async fn fetch_many<T: Record>(ids: &[Id], connection: &DatabaseConnection) -> Result<Vec<T>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let things = ids.iter().map(Id::to_thing).collect::<Vec<Thing>>();

    Ok(sql_span!(
        connection
            .query(format!("SELECT * FROM {} WHERE id IN $ids", T::TABLE))
            .bind(("ids", things))
            .await?
            .check()?
            .take(0)?,
        T::TABLE
    ))
}

/// Selects all records whose foreign key `field` references one of the given ids.
#[instrument(skip(connection))]
pub async fn fetch_referencing<T: Record>(
    field: &'static str,
    ids: &[Id],
    connection: &DatabaseConnection,
) -> Result<Vec<T>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let keys = ids.iter().map(Id::to_string).collect::<Vec<String>>();

    Ok(sql_span!(
        connection
            .query(format!("SELECT * FROM {} WHERE {field} IN $keys", T::TABLE))
            .bind(("keys", keys))
            .await?
            .check()?
            .take(0)?,
        T::TABLE
    ))
}

/// Selects the whole table in the given order.
#[instrument(skip(connection))]
pub async fn fetch_all<T: Record>(order: &'static str, connection: &DatabaseConnection) -> Result<Vec<T>> {
    Ok(sql_span!(
        connection
            .query(format!("SELECT * FROM {} ORDER BY {order}", T::TABLE))
            .await?
            .check()?
            .take(0)?,
        T::TABLE
    ))
}

/// Deletes the given record.
#[instrument(skip(connection))]
pub async fn remove(id: &Id, connection: &DatabaseConnection) -> Result<()> {
    sql_span!(
        connection
            .query("DELETE $id")
            .bind(("id", id.to_thing()))
            .await?
            .check()?,
        "delete"
    );

    Ok(())
}
