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

use crate::database::DatabaseConnection;
use crate::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::{Future, IntoFuture};
use std::marker::PhantomData;
use std::pin::Pin;

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Page<T>
where
    T: Serialize,
{
    /// the result
    pub data: Vec<T>,
    /// the total count of pages
    pub pages: u64,
    /// the total count of elements
    pub total: u64,
    /// the offset for the next page
    pub next_page_offset: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PagingOptions {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

/// A paged select over one table. `condition` is the body of the `WHERE` clause and may refer to
/// the given bindings.
impl<'a> PagingOptions {
    pub fn execute<T>(
        self,
        table: &'a str,
        condition: Option<&'a str>,
        order: &'a str,
        bindings: &'a [(&'a str, serde_json::Value)],
        connection: &'a DatabaseConnection,
    ) -> PagingRequest<'a, T>
    where
        T: DeserializeOwned + Serialize + Send + Sync,
    {
        PagingRequest {
            options: self,
            table,
            condition,
            order,
            bindings,
            connection,
            response: PhantomData,
        }
    }
}

impl Default for PagingOptions {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    20
}

#[derive(Debug)]
pub struct PagingRequest<'a, T>
where
    T: DeserializeOwned + Serialize + Send + Sync,
{
    pub options: PagingOptions,
    pub table: &'a str,
    pub condition: Option<&'a str>,
    pub order: &'a str,
    pub bindings: &'a [(&'a str, serde_json::Value)],
    pub connection: &'a DatabaseConnection,
    response: PhantomData<T>,
}

impl<'a, T> IntoFuture for PagingRequest<'a, T>
where
    T: DeserializeOwned + Serialize + Send + Sync + 'a,
{
    type Output = Result<Page<T>>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            if self.options.page == 0 || self.options.page_size == 0 {
                return Err(ApplicationError::BadRequest(
                    "page and pageSize must be positive".to_owned(),
                ));
            }

            // calculate offset, pages beyond the addressable range are rejected
            let out_of_range =
                || ApplicationError::BadRequest("page is out of range".to_owned());
            let offset = (self.options.page - 1)
                .checked_mul(self.options.page_size)
                .ok_or_else(out_of_range)?;
            let next_page_offset = offset
                .checked_add(self.options.page_size)
                .filter(|next| *next <= i64::MAX as u64)
                .ok_or_else(out_of_range)?;
            // build the queries
            let filter = self
                .condition
                .map(|condition| format!(" WHERE {condition}"))
                .unwrap_or_default();
            let count_query = format!(
                "SELECT count() AS total FROM {}{filter} GROUP ALL",
                self.table
            );
            let query = format!(
                "SELECT * FROM {}{filter} ORDER BY {} LIMIT {} START {offset}",
                self.table, self.order, self.options.page_size
            );

            // setup the database request
            let mut request = self.connection.query(count_query).query(query);
            // apply the bindings
            for binding in self.bindings.iter() {
                request = request.bind(binding)
            }

            // process the request
            let mut response = sql_span!(request.await?.check()?, "paging");
            // extract count, an empty table yields no group at all
            let total = response
                .take::<Option<u64>>((0, "total"))?
                .unwrap_or_default();
            // parse the entries
            let data = response.take::<Vec<T>>(1)?;

            Ok(Page {
                data,
                pages: (total as f64 / self.options.page_size as f64).ceil() as u64,
                total,
                next_page_offset,
            })
        })
    }
}
