use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 24 hex characters: a 4-byte big-endian creation second followed by 8 random bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MaterialId(String);

impl MaterialId {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&(Utc::now().timestamp() as u32).to_be_bytes());
        bytes[4..].copy_from_slice(&Uuid::new_v4().as_bytes()[..8]);
        Self(hex::encode(bytes))
    }

    pub fn parse(raw: &str) -> Option<Self> {
        is_object_id(raw).then(|| Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_object_id(raw: &str) -> bool {
    raw.len() == 24 && hex::decode(raw).is_ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerificationStatus {
    Verified,
    NotVerified,
}

impl VerificationStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "verified" => Some(VerificationStatus::Verified),
            "notVerified" => Some(VerificationStatus::NotVerified),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(rename = "_id")]
    pub id: MaterialId,
    pub subject: String,
    pub semester: i64,
    pub instructor_name: Vec<String>,
    #[serde(default)]
    pub course_code: String,
    pub material_link: String,
    #[serde(default)]
    pub desc: String,
    pub author: Vec<String>,
    pub year_of_writing: i64,
    pub branch: Vec<String>,
    pub material_type: String,
    pub thumbnail: String,
    #[serde(default)]
    pub featured: bool,
    pub contributed_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_by: Option<VerificationStatus>,
    #[serde(default)]
    pub upvotes: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A material as assembled by the controller, before the store assigns identity and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMaterial {
    pub subject: String,
    pub semester: i64,
    pub instructor_name: Vec<String>,
    pub course_code: String,
    pub material_link: String,
    pub desc: String,
    pub author: Vec<String>,
    pub year_of_writing: i64,
    pub branch: Vec<String>,
    pub material_type: String,
    pub thumbnail: String,
    pub featured: bool,
    pub contributed_by: String,
    pub verified_by: Option<VerificationStatus>,
}

impl Material {
    pub fn from_new(id: MaterialId, new: NewMaterial, now: DateTime<Utc>) -> Self {
        Self {
            id,
            subject: new.subject,
            semester: new.semester,
            instructor_name: new.instructor_name,
            course_code: new.course_code,
            material_link: new.material_link,
            desc: new.desc,
            author: new.author,
            year_of_writing: new.year_of_writing,
            branch: new.branch,
            material_type: new.material_type,
            thumbnail: new.thumbnail,
            featured: new.featured,
            contributed_by: new.contributed_by,
            verified_by: new.verified_by,
            upvotes: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn upvote_count(&self) -> usize {
        self.upvotes.len()
    }
}

/// Field-by-field partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialPatch {
    pub subject: Option<String>,
    pub semester: Option<i64>,
    pub instructor_name: Option<Vec<String>>,
    pub course_code: Option<String>,
    pub material_link: Option<String>,
    pub desc: Option<String>,
    pub author: Option<Vec<String>>,
    pub year_of_writing: Option<i64>,
    pub branch: Option<Vec<String>>,
    pub material_type: Option<String>,
    pub thumbnail: Option<String>,
    pub featured: Option<bool>,
    pub contributed_by: Option<String>,
    pub verified_by: Option<VerificationStatus>,
}

impl MaterialPatch {
    pub fn apply_to(self, material: &mut Material) {
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    material.$field = value;
                })*
            };
        }

        set!(
            subject,
            semester,
            instructor_name,
            course_code,
            material_link,
            desc,
            author,
            year_of_writing,
            branch,
            material_type,
            thumbnail,
            featured,
            contributed_by
        );

        if let Some(status) = self.verified_by {
            material.verified_by = Some(status);
        }
    }
}
