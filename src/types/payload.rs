use rocket::FromForm;
use serde::{Deserialize, Serialize};

use super::{lenient, Material, MaterialPatch, NewMaterial, VerificationStatus};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_LIMIT: u64 = 20;
pub const MAX_PAGE_LIMIT: u64 = 100;

pub const DEFAULT_CONTRIBUTOR: &str = "Admin";

/// Body of `POST /materials`, read after the create rule-set has passed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaterialRequest {
    pub subject: String,
    #[serde(deserialize_with = "lenient::int")]
    pub semester: i64,
    pub instructor_name: Vec<String>,
    #[serde(default)]
    pub course_code: Option<String>,
    pub material_link: String,
    #[serde(default)]
    pub desc: Option<String>,
    pub author: Vec<String>,
    #[serde(deserialize_with = "lenient::int")]
    pub year_of_writing: i64,
    pub branch: Vec<String>,
    pub material_type: String,
    pub thumbnail: String,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub featured: bool,
    #[serde(default)]
    pub contributed_by: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_status")]
    pub verified_by: Option<VerificationStatus>,
}

impl CreateMaterialRequest {
    /// Trims every string and fills in defaults. `thumbnail` must already be canonical.
    pub fn into_new_material(self, thumbnail: String) -> NewMaterial {
        NewMaterial {
            subject: self.subject.trim().to_string(),
            semester: self.semester,
            instructor_name: trim_all(self.instructor_name),
            course_code: non_blank(self.course_code).unwrap_or_default(),
            material_link: self.material_link.trim().to_string(),
            desc: non_blank(self.desc).unwrap_or_default(),
            author: trim_all(self.author),
            year_of_writing: self.year_of_writing,
            branch: trim_all(self.branch),
            material_type: self.material_type.trim().to_string(),
            thumbnail,
            featured: self.featured,
            contributed_by: non_blank(self.contributed_by)
                .unwrap_or_else(|| DEFAULT_CONTRIBUTOR.to_string()),
            verified_by: Some(self.verified_by.unwrap_or(VerificationStatus::NotVerified)),
        }
    }
}

/// Body of `PUT`/`PATCH /materials/<id>`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaterialRequest {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub semester: Option<i64>,
    #[serde(default)]
    pub instructor_name: Option<Vec<String>>,
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(default)]
    pub material_link: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub author: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub year_of_writing: Option<i64>,
    #[serde(default)]
    pub branch: Option<Vec<String>>,
    #[serde(default)]
    pub material_type: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_flag")]
    pub featured: Option<bool>,
    #[serde(default)]
    pub contributed_by: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_status")]
    pub verified_by: Option<VerificationStatus>,
}

impl UpdateMaterialRequest {
    /// `thumbnail` replaces whatever the client sent and must already be canonical.
    pub fn into_patch(self, thumbnail: Option<String>) -> MaterialPatch {
        MaterialPatch {
            subject: self.subject.map(|s| s.trim().to_string()),
            semester: self.semester,
            instructor_name: self.instructor_name.map(trim_all),
            course_code: self.course_code.map(|s| s.trim().to_string()),
            material_link: self.material_link.map(|s| s.trim().to_string()),
            desc: self.desc.map(|s| s.trim().to_string()),
            author: self.author.map(trim_all),
            year_of_writing: self.year_of_writing,
            branch: self.branch.map(trim_all),
            material_type: self.material_type.map(|s| s.trim().to_string()),
            thumbnail,
            featured: self.featured,
            contributed_by: self.contributed_by.map(|s| s.trim().to_string()),
            verified_by: self.verified_by,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteRequest {
    pub material_id: String,
    pub email: String,
}

/// Raw listing query. Values stay strings so malformed input can fall back to defaults.
#[derive(Debug, Clone, Default, FromForm)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    #[field(name = "materialType")]
    pub material_type: Option<String>,
    pub semester: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn from_query(query: &ListQuery) -> Self {
        let page = lenient::positive_or(query.page.as_deref(), DEFAULT_PAGE);
        let limit = lenient::positive_or(query.limit.as_deref(), DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
        Self { page, limit }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn paginate(&self, total_materials: u64) -> Pagination {
        let total_pages = total_materials.div_ceil(self.limit);
        Pagination {
            current_page: self.page,
            total_pages,
            total_materials,
            has_next: self.page < total_pages,
            has_prev: self.page > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_materials: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialPage {
    pub materials: Vec<Material>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialEnvelope {
    pub message: String,
    pub material: Material,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Confirmation {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteOutcome {
    pub message: String,
    pub material: Material,
    pub upvote_count: usize,
}

fn trim_all(values: Vec<String>) -> Vec<String> {
    values.into_iter().map(|v| v.trim().to_string()).collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
