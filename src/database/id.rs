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

use crate::error::ApplicationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use surrealdb::sql::Thing;

/// A record id, exposed as `table:key` both in the api and in foreign key fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id {
    pub table: String,
    pub id: String,
}

impl From<Thing> for Id {
    fn from(thing: Thing) -> Self {
        Self {
            table: thing.tb,
            id: thing.id.to_raw(),
        }
    }
}

impl TryFrom<(&str, &str)> for Id {
    type Error = ApplicationError;

    /// Parses a user supplied id which must either be a bare key or belong to the forced table.
    fn try_from((force, id): (&str, &str)) -> Result<Self, Self::Error> {
        let invalid = || ApplicationError::BadRequest(format!("invalid {force} id"));

        let (table, key) = match id.split_once(':') {
            Some((table, key)) => (table, key),
            None => (force, id),
        };
        // for security reasons we can't allow every table
        if !table.eq(force) || key.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            table: table.to_string(),
            id: key.to_string(),
        })
    }
}

impl Id {
    pub fn new((table, id): (&str, &str)) -> Self {
        Self {
            table: table.to_string(),
            id: id.to_string(),
        }
    }

    pub fn to_thing(&self) -> Thing {
        Thing::from((self.table.as_str(), self.id.as_str()))
    }

    fn parse(raw: &str) -> Option<Self> {
        let (table, id) = raw.split_once(':')?;
        if table.is_empty() || id.is_empty() {
            return None;
        }

        Some(Self::new((table, id)))
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw_value = serde_json::value::Value::deserialize(deserializer)?;

        if let Some(string) = raw_value.as_str() {
            return Id::parse(string).ok_or(serde::de::Error::custom("Invalid id format"));
        }

        if raw_value.is_object() {
            let thing =
                serde_json::from_value::<Thing>(raw_value).map_err(serde::de::Error::custom)?;
            return Ok(Id::from(thing));
        }

        Err(serde::de::Error::custom("Invalid datatype"))
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", &self.table, &self.id)
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}
