use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::link;
use crate::storage::{MaterialFilter, MaterialStore, SortOrder, UserDirectory};
use crate::types::{
    Confirmation, CreateMaterialRequest, ListQuery, MaterialEnvelope, MaterialId, MaterialPage, PageRequest,
    UpdateMaterialRequest, UpvoteOutcome, UpvoteRequest,
};
use crate::validation::{normalize_email, rules};
use crate::{Material, MaterialError, Result};

/// Fields a client can never write. They are dropped from update bodies before anything else.
const READ_ONLY_FIELDS: [&str; 5] = ["_id", "id", "createdAt", "updatedAt", "upvotes"];

/// Request-scoped orchestration of the material resource: validation, link
/// canonicalization, duplicate checks, persistence and response shaping.
pub struct MaterialController {
    store: Arc<dyn MaterialStore>,
    users: Arc<dyn UserDirectory>,
}

impl MaterialController {
    pub fn new(store: Arc<dyn MaterialStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self { store, users }
    }

    pub async fn create(&self, payload: &Value) -> Result<MaterialEnvelope> {
        let body = as_object(payload)?;
        rules::create_material().validate(body)?;

        let request: CreateMaterialRequest = serde_json::from_value(payload.clone()).map_err(invalid_body)?;
        let thumbnail = link::canonicalize(request.thumbnail.trim())?;
        let new = request.into_new_material(thumbnail);

        if self.store.find_one_by_link(&new.material_link).await?.is_some() {
            warn!("Rejected duplicate material link {}", new.material_link);
            return Err(MaterialError::DuplicateMaterial("Material with this link already exists".to_string()));
        }

        let material = self.store.insert(new).await.map_err(from_store)?;
        info!(id = %material.id, material_type = %material.material_type, "Material created");

        Ok(MaterialEnvelope {
            message: "Material created successfully".to_string(),
            material,
        })
    }

    pub async fn update(&self, id: &str, payload: &Value) -> Result<MaterialEnvelope> {
        let id = parse_material_id(id)?;

        let mut body = as_object(payload)?.clone();
        for field in READ_ONLY_FIELDS {
            if body.remove(field).is_some() {
                debug!("Ignoring client-supplied {} on update of {}", field, id);
            }
        }
        rules::update_material().validate(&body)?;

        let request: UpdateMaterialRequest = serde_json::from_value(Value::Object(body)).map_err(invalid_body)?;
        let thumbnail = match request.thumbnail.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(link::canonicalize(raw)?),
            _ => None,
        };

        let material = self
            .store
            .update_by_id(&id, request.into_patch(thumbnail))
            .await
            .map_err(from_store)?;
        info!(id = %material.id, "Material updated");

        Ok(MaterialEnvelope {
            message: "Material updated successfully".to_string(),
            material,
        })
    }

    pub async fn delete(&self, id: &str) -> Result<Confirmation> {
        let id = parse_material_id(id)?;

        if !self.store.delete_by_id(&id).await? {
            return Err(material_not_found());
        }
        info!(id = %id, "Material deleted");

        Ok(Confirmation {
            message: "Material deleted successfully".to_string(),
        })
    }

    /// Returns the full document regardless of its verification state.
    pub async fn get_one(&self, id: &str) -> Result<Material> {
        let id = parse_material_id(id)?;
        self.store.find_by_id(&id).await.map_err(from_store)
    }

    pub async fn list(&self, query: &ListQuery) -> Result<MaterialPage> {
        let mut filter = MaterialFilter::listed();

        if let Some(material_type) = non_blank(query.material_type.as_deref()) {
            filter = filter.material_type(material_type);
        }
        if let Some(raw) = non_blank(query.semester.as_deref()) {
            match raw.parse::<i64>() {
                Ok(semester) => filter = filter.semester(semester),
                Err(_) => debug!("Ignoring malformed semester filter {:?}", raw),
            }
        }
        if let Some(branch) = non_blank(query.branch.as_deref()) {
            filter = filter.branch(branch);
        }

        self.fetch_page(filter, PageRequest::from_query(query)).await
    }

    pub async fn list_by_type(&self, material_type: &str, query: &ListQuery) -> Result<MaterialPage> {
        rules::material_type().validate_params(&[("materialType", material_type)])?;

        let filter = MaterialFilter::listed().material_type(material_type.trim());
        self.fetch_page(filter, PageRequest::from_query(query)).await
    }

    /// Flips the caller's vote: each call moves the (material, email) pair between
    /// not-voted and voted.
    pub async fn upvote(&self, payload: &Value) -> Result<UpvoteOutcome> {
        let body = as_object(payload)?;
        rules::upvote().validate(body)?;

        let request: UpvoteRequest = serde_json::from_value(payload.clone()).map_err(invalid_body)?;
        let email = normalize_email(&request.email);
        let id = parse_material_id(&request.material_id)?;

        if self.users.find_verified(&email).await?.is_none() {
            return Err(MaterialError::NotFound("User not found or not verified".to_string()));
        }

        let material = self.store.find_by_id(&id).await.map_err(from_store)?;
        let had_voted = material.upvotes.contains(&email);

        let (toggled, message) = if had_voted {
            (self.store.remove_upvote(&id, &email).await, "Upvote removed")
        } else {
            (self.store.add_upvote(&id, &email).await, "Material upvoted")
        };
        let material = toggled.map_err(from_store)?;

        info!(id = %id, voted = !had_voted, upvotes = material.upvote_count(), "Upvote toggled");

        Ok(UpvoteOutcome {
            message: message.to_string(),
            upvote_count: material.upvote_count(),
            material,
        })
    }

    async fn fetch_page(&self, filter: MaterialFilter, page: PageRequest) -> Result<MaterialPage> {
        let (total, materials) = tokio::try_join!(
            self.store.count_matching(&filter),
            self.store.query_page(&filter, page.skip(), page.limit, SortOrder::CreatedAtDesc),
        )?;

        Ok(MaterialPage {
            materials,
            pagination: page.paginate(total),
        })
    }
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>> {
    payload
        .as_object()
        .ok_or_else(|| MaterialError::ValidationFailed("Request body must be a JSON object".to_string()))
}

fn parse_material_id(raw: &str) -> Result<MaterialId> {
    rules::material_id().validate_params(&[("id", raw)])?;
    MaterialId::parse(raw).ok_or_else(|| MaterialError::ValidationFailed("Invalid material ID".to_string()))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn invalid_body(e: serde_json::Error) -> MaterialError {
    MaterialError::ValidationFailed(format!("Invalid request body: {}", e))
}

fn material_not_found() -> MaterialError {
    MaterialError::NotFound("Material not found".to_string())
}

/// Storage-level conditions the caller can act on get their own outcome; anything
/// else passes through untouched.
fn from_store(err: StoreError) -> MaterialError {
    match err {
        StoreError::DuplicateKey { .. } => {
            warn!("Store rejected write: {}", err);
            MaterialError::DuplicateMaterial("Material with this information already exists".to_string())
        }
        StoreError::NotFound(_) => material_not_found(),
        StoreError::SchemaViolation(message) => MaterialError::ValidationFailed(message),
        other => MaterialError::Store(other),
    }
}
