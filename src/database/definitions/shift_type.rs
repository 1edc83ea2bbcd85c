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

use crate::database::definitions::Record;
use crate::prelude::*;
use chrono::NaiveTime;
use shiftboard_codegen::DataWriter;

/// A named time window such as "Morning 06:00-14:00". An end before the start wraps past
/// midnight.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Getters, DataWriter)]
#[serde(rename_all = "camelCase")]
#[writer(table = "shift_type", impl_full_request)]
#[get = "pub"]
pub struct ShiftType {
    #[writer(skip)]
    id: Id,
    #[validate(length(min = 1, message = "name must not be empty"))]
    name: String,
    start_time: NaiveTime,
    end_time: NaiveTime,
}

impl Record for ShiftType {
    const TABLE: &'static str = "shift_type";
}

impl ShiftType {
    pub fn check_window(start_time: &NaiveTime, end_time: &NaiveTime) -> Result<()> {
        if start_time.eq(end_time) {
            return Err(ApplicationError::BadRequest(
                "startTime and endTime must differ".to_owned(),
            ));
        }

        Ok(())
    }
}
