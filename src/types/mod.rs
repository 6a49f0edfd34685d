mod material;
mod payload;
mod user;

pub mod lenient;

pub use material::{is_object_id, Material, MaterialId, MaterialPatch, NewMaterial, VerificationStatus};
pub use payload::{
    Confirmation, CreateMaterialRequest, ListQuery, MaterialEnvelope, MaterialPage, PageRequest,
    Pagination, UpdateMaterialRequest, UpvoteOutcome, UpvoteRequest, DEFAULT_CONTRIBUTOR,
    DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
pub use user::User;
