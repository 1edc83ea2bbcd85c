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
use chrono::{Days, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// An ISO-8601 week, written as `YYYY-WW`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Week {
    year: i32,
    week: u32,
    monday: NaiveDate,
}

impl Week {
    pub fn new(year: i32, week: u32) -> Option<Self> {
        // rejects week 53 in years which only have 52
        NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).map(|monday| Self {
            year,
            week,
            monday,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    pub fn monday(&self) -> NaiveDate {
        self.monday
    }

    /// Date of the given day index, 0 being monday.
    pub fn day(&self, day_of_week: u8) -> Option<NaiveDate> {
        if day_of_week > 6 {
            return None;
        }

        self.monday().checked_add_days(Days::new(day_of_week as u64))
    }
}

impl FromStr for Week {
    type Err = ApplicationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ApplicationError::BadRequest(format!("invalid week {raw:?}, expected YYYY-WW"));

        let (year, week) = raw.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || week.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let week = week.parse::<u32>().map_err(|_| invalid())?;

        Week::new(year, week).ok_or_else(invalid)
    }
}

impl Display for Week {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.week)
    }
}

impl Serialize for Week {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Week {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
