use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::{self, Json};
use rocket::{catch, catchers, delete, get, patch, post, put, routes, Build, Request, Rocket, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::controller::MaterialController;
use crate::types::{Confirmation, ListQuery, Material, MaterialEnvelope, MaterialPage, UpvoteOutcome};
use crate::MaterialError;

pub const DEFAULT_MOUNT_PATH: &str = "/api/materials";

type ApiResult<T> = std::result::Result<Json<T>, MaterialError>;
type JsonBody<'r> = std::result::Result<Json<Value>, json::Error<'r>>;

/// Uniform body for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub status: u16,
    pub message: String,
}

impl ErrorBody {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status: status.code,
            message: message.into(),
        }
    }
}

impl<'r> Responder<'r, 'static> for MaterialError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = Status::from_code(self.status_code()).unwrap_or(Status::InternalServerError);
        let message = match &self {
            MaterialError::Store(e) => {
                error!("{} {} failed: {}", request.method(), request.uri(), e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorBody::new(status, message))).respond_to(request)
    }
}

fn parse_body(body: JsonBody<'_>) -> std::result::Result<Value, MaterialError> {
    body.map(Json::into_inner)
        .map_err(|e| MaterialError::ValidationFailed(format!("Malformed JSON body: {}", e)))
}

#[post("/", data = "<body>")]
async fn create_material(
    controller: &State<MaterialController>,
    body: JsonBody<'_>,
) -> std::result::Result<(Status, Json<MaterialEnvelope>), MaterialError> {
    let created = controller.create(&parse_body(body)?).await?;
    Ok((Status::Created, Json(created)))
}

#[get("/?<query..>")]
async fn list_materials(controller: &State<MaterialController>, query: ListQuery) -> ApiResult<MaterialPage> {
    controller.list(&query).await.map(Json)
}

#[get("/type/<material_type>?<query..>")]
async fn list_materials_by_type(
    controller: &State<MaterialController>,
    material_type: &str,
    query: ListQuery,
) -> ApiResult<MaterialPage> {
    controller.list_by_type(material_type, &query).await.map(Json)
}

#[get("/<id>")]
async fn get_material(controller: &State<MaterialController>, id: &str) -> ApiResult<Material> {
    controller.get_one(id).await.map(Json)
}

#[put("/<id>", data = "<body>")]
async fn replace_material(
    controller: &State<MaterialController>,
    id: &str,
    body: JsonBody<'_>,
) -> ApiResult<MaterialEnvelope> {
    controller.update(id, &parse_body(body)?).await.map(Json)
}

#[patch("/<id>", data = "<body>")]
async fn patch_material(
    controller: &State<MaterialController>,
    id: &str,
    body: JsonBody<'_>,
) -> ApiResult<MaterialEnvelope> {
    controller.update(id, &parse_body(body)?).await.map(Json)
}

#[delete("/<id>")]
async fn delete_material(controller: &State<MaterialController>, id: &str) -> ApiResult<Confirmation> {
    controller.delete(id).await.map(Json)
}

#[post("/upvote", data = "<body>")]
async fn upvote_material(controller: &State<MaterialController>, body: JsonBody<'_>) -> ApiResult<UpvoteOutcome> {
    controller.upvote(&parse_body(body)?).await.map(Json)
}

#[catch(default)]
fn default_catcher(status: Status, _request: &Request<'_>) -> Json<ErrorBody> {
    Json(ErrorBody::new(status, status.reason().unwrap_or("Unknown error")))
}

/// Attaches the material routes under `mount_path` and JSON error catchers to `rocket`.
pub fn mount(rocket: Rocket<Build>, controller: MaterialController, mount_path: &str) -> Rocket<Build> {
    rocket
        .manage(controller)
        .mount(
            mount_path,
            routes![
                create_material,
                list_materials,
                list_materials_by_type,
                get_material,
                replace_material,
                patch_material,
                delete_material,
                upvote_material,
            ],
        )
        .register("/", catchers![default_catcher])
}
