use crate::types::{Material, VerificationStatus};

/// Which `verifiedBy` states a query admits. `None` stands for documents without the field.
pub type Visibility = Vec<Option<VerificationStatus>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    CreatedAtDesc,
    CreatedAtAsc,
}

/// Conjunction of optional clauses, evaluated against stored documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialFilter {
    visibility: Option<Visibility>,
    material_type: Option<String>,
    semester: Option<i64>,
    branch: Option<String>,
}

impl MaterialFilter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Materials shown in public listings: verified, not yet verified, and legacy
    /// documents written before `verifiedBy` existed.
    pub fn listed() -> Self {
        Self::all().visible_as(vec![
            Some(VerificationStatus::Verified),
            None,
            Some(VerificationStatus::NotVerified),
        ])
    }

    pub fn visible_as(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn material_type(mut self, material_type: impl Into<String>) -> Self {
        self.material_type = Some(material_type.into());
        self
    }

    pub fn semester(mut self, semester: i64) -> Self {
        self.semester = Some(semester);
        self
    }

    /// Matches materials whose branch list contains `branch`.
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn matches(&self, material: &Material) -> bool {
        if let Some(visibility) = &self.visibility {
            if !visibility.contains(&material.verified_by) {
                return false;
            }
        }
        if let Some(material_type) = &self.material_type {
            if material.material_type != *material_type {
                return false;
            }
        }
        if let Some(semester) = self.semester {
            if material.semester != semester {
                return false;
            }
        }
        if let Some(branch) = &self.branch {
            if !material.branch.iter().any(|b| b == branch) {
                return false;
            }
        }
        true
    }
}

pub fn sort_materials(materials: &mut [Material], order: SortOrder) {
    match order {
        SortOrder::CreatedAtDesc => materials.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))),
        SortOrder::CreatedAtAsc => materials.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id))),
    }
}
