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

use crate::database::definitions::account::User;
use crate::database::definitions::building::{
    Building, EditBuilding, WriteBuilding, WriteBuildingRequest,
};
use crate::database::definitions::{fetch, fetch_all};
use crate::prelude::*;
use crate::routes::path_id;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::Router;

pub fn router() -> Router<ApplicationState> {
    Router::new()
        .route("/buildings", get(list_buildings).post(create_building))
        .route("/buildings/:id", put(edit_building))
}

async fn require_supervisor(supervisor: Option<&Id>, connection: &DatabaseConnection) -> Result<()> {
    if let Some(supervisor) = supervisor {
        fetch::<User>(supervisor, connection).await?;
    }

    Ok(())
}

async fn require_free_code(code: &str, own: Option<&Id>, connection: &DatabaseConnection) -> Result<()> {
    match Building::from_code(code, connection).await? {
        Some(building) if Some(building.id()) != own => Err(ApplicationError::Conflict(format!(
            "building code {code} is already taken"
        ))),
        _ => Ok(()),
    }
}

async fn list_buildings(
    State(state): State<ApplicationState>,
    principal: Principal,
) -> Result<Json<Vec<Building>>> {
    principal.require_admin()?;

    Ok(Json(fetch_all::<Building>("name ASC", state.connection()).await?))
}

async fn create_building(
    State(state): State<ApplicationState>,
    principal: Principal,
    Json(data): Json<WriteBuildingRequest>,
) -> Result<(StatusCode, Json<Building>)> {
    principal.require_admin()?;
    let connection = state.connection();
    require_supervisor(data.supervisor_id.as_ref(), connection).await?;
    require_free_code(data.code.as_str(), None, connection).await?;

    let building = WriteBuilding::from(connection)
        .with_request(data)
        .to_owned()
        .await?;

    Ok((StatusCode::CREATED, Json(building)))
}

async fn edit_building(
    State(state): State<ApplicationState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(data): Json<EditBuilding>,
) -> Result<Json<Building>> {
    principal.require_admin()?;
    let connection = state.connection();
    let id = path_id(Building::TABLE, id.as_str())?;
    fetch::<Building>(&id, connection).await?;

    if let Some(supervisor) = data.supervisor_id.as_ref() {
        require_supervisor(supervisor.as_ref(), connection).await?;
    }
    if let Some(code) = data.code.as_deref() {
        require_free_code(code, Some(&id), connection).await?;
    }

    let building = data
        .to_writer(connection)
        .set_target(Some(&id))
        .to_owned()
        .await?;

    Ok(Json(building))
}

#[cfg(test)]
mod tests {
    use crate::tests::prelude::*;
    use axum::http::StatusCode;
    use axum::BoxError;

    #[tokio::test]
    async fn test_building_administration() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let admin = suite.login(ADMIN).await;

        let response = suite
            .client()
            .post("/api/admin/buildings")
            .header("cookie", admin.as_str())
            .json(&json!({
                "name": "North",
                "code": "N",
                "supervisorId": suite.manager().id()
            }))
            .send()
            .await;
        assert_eq!(StatusCode::CREATED, response.status());
        let north = response.json::<serde_json::Value>().await;

        let response = suite
            .client()
            .post("/api/admin/buildings")
            .header("cookie", admin.as_str())
            .json(&json!({"name": "Other", "code": "N"}))
            .send()
            .await;
        assert_eq!(StatusCode::CONFLICT, response.status());

        let response = suite
            .client()
            .post("/api/admin/buildings")
            .header("cookie", admin.as_str())
            .json(&json!({"name": "Other", "code": "O", "supervisorId": "account:ghost"}))
            .send()
            .await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());

        let response = suite
            .client()
            .post("/api/admin/buildings")
            .header("cookie", admin.as_str())
            .json(&json!({"name": "", "code": "E"}))
            .send()
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        let id = north["id"].as_str().unwrap_or_default();
        let response = suite
            .client()
            .put(format!("/api/admin/buildings/{id}").as_str())
            .header("cookie", admin.as_str())
            .json(&json!({"area": "Harbour", "code": "N"}))
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        let edited = response.json::<serde_json::Value>().await;
        assert_eq!(json!("Harbour"), edited["area"]);
        assert_eq!(north["supervisorId"], edited["supervisorId"]);

        Ok(())
    }
}
