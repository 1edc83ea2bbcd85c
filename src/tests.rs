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

use crate::database::definitions::account::{User, WriteAccount};
use crate::database::definitions::building::{Building, WriteBuilding};
use crate::database::definitions::role::{Role, WriteRole};
use crate::database::definitions::shift::{Shift, WriteShift};
use crate::database::definitions::shift_type::{ShiftType, WriteShiftType};
use crate::notify::Notifier;
use crate::prelude::{ApplicationState, Config, DatabaseConnection, Id};
use crate::schedule::week::Week;
use axum::http::StatusCode;
use axum::BoxError;
use axum_test_helper::TestClient;
use chrono::NaiveTime;
use std::sync::Arc;

pub const PASSWORD: &str = "password";
pub const ADMIN: &str = "admin";
pub const MANAGER: &str = "manager";
pub const INSPECTOR: &str = "inspector";

#[derive(Getters)]
#[get = "pub"]
pub struct TestSuite {
    client: TestClient,
    connection: DatabaseConnection,
    admin: User,
    manager: User,
    inspector: User,
}

impl TestSuite {
    pub async fn init() -> Result<Self, BoxError> {
        let config = Arc::new(Config::default());
        let connection = crate::database::connect(&config).await?;
        let notifier = Notifier::new(connection.clone(), &config);
        let state = ApplicationState::new(connection.clone(), config, notifier);
        let client = TestClient::new(crate::routes::router(state));

        let admin = create_user(&connection, ADMIN, true, false, false).await?;
        let manager = create_user(&connection, MANAGER, false, true, false).await?;
        let inspector = create_user(&connection, INSPECTOR, false, false, true).await?;

        Ok(Self {
            client,
            connection,
            admin,
            manager,
            inspector,
        })
    }

    pub async fn inspector_named(&self, username: &str) -> Result<User, BoxError> {
        create_user(&self.connection, username, false, false, true).await
    }

    /// Logs the user in and returns the `session=...` pair to send as cookie header.
    pub async fn login(&self, username: &str) -> String {
        let response = self
            .client
            .post("/api/auth/login")
            .json(&json!({
                "username": username,
                "password": PASSWORD
            }))
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());

        response
            .headers()
            .get("set-cookie")
            .and_then(|cookie| cookie.to_str().ok())
            .and_then(|cookie| cookie.split(';').next())
            .map(str::to_owned)
            .expect("login sets the session cookie")
    }

    pub async fn building(&self, code: &str, supervisor: Option<&Id>) -> Result<Building, BoxError> {
        Ok(WriteBuilding::from(&self.connection)
            .set_name(Some(format!("Building {code}")))
            .set_code(Some(code.to_owned()))
            .set_supervisor_id(Some(supervisor.cloned()))
            .to_owned()
            .await?)
    }

    pub async fn shift_type(&self, name: &str, start: u32, end: u32) -> Result<ShiftType, BoxError> {
        Ok(WriteShiftType::from(&self.connection)
            .set_name(Some(name.to_owned()))
            .set_start_time(NaiveTime::from_hms_opt(start, 0, 0))
            .set_end_time(NaiveTime::from_hms_opt(end, 0, 0))
            .to_owned()
            .await?)
    }

    pub async fn role(&self, name: &str) -> Result<Role, BoxError> {
        Ok(WriteRole::from(&self.connection)
            .set_name(Some(name.to_owned()))
            .to_owned()
            .await?)
    }

    pub async fn shift(&self, building: &Building, week: &str) -> Result<Shift, BoxError> {
        Ok(WriteShift::from(&self.connection)
            .set_building_id(Some(building.id().clone()))
            .set_week(Some(week.parse::<Week>()?))
            .set_created_at(Some(crate::database::now()))
            .to_owned()
            .await?)
    }
}

async fn create_user(
    connection: &DatabaseConnection,
    username: &str,
    is_admin: bool,
    is_manager: bool,
    is_inspector: bool,
) -> Result<User, BoxError> {
    Ok(WriteAccount::from(connection)
        .set_username(Some(username.to_owned()))
        .set_full_name(Some(username.to_uppercase()))
        .set_email(Some(format!("{username}@example.com")))
        .set_password(Some(PASSWORD.to_owned()))
        .set_is_admin(Some(is_admin))
        .set_is_manager(Some(is_manager))
        .set_is_inspector(Some(is_inspector))
        .to_owned()
        .await?)
}

pub mod prelude {
    pub use crate::tests::TestSuite;
    pub use crate::tests::{ADMIN, INSPECTOR, MANAGER};
}
