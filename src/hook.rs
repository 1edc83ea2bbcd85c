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

use crate::auth::session::Session;
use crate::prelude::*;

/// One round of periodic maintenance, currently dropping expired sessions.
#[instrument(skip_all)]
pub async fn housekeeping(connection: &DatabaseConnection) -> Result<()> {
    let removed = Session::cleanup(connection).await?;
    if removed > 0 {
        info!("Removed {removed} expired sessions");
    }

    Ok(())
}
