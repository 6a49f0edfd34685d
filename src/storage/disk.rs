use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::cache::CacheManager;
use super::filter::{sort_materials, MaterialFilter, SortOrder};
use crate::error::StoreError;
use crate::types::{Material, MaterialId, MaterialPatch, NewMaterial};
use crate::validation::rules::check_document;

pub type Result<T> = std::result::Result<T, StoreError>;

const LINK_FIELD: &str = "materialLink";

/// Persistence primitives for materials. Implementations enforce `materialLink`
/// uniqueness themselves, independently of any caller-side pre-check.
#[async_trait]
pub trait MaterialStore: Send + Sync {
    async fn insert(&self, material: NewMaterial) -> Result<Material>;
    async fn find_by_id(&self, id: &MaterialId) -> Result<Material>;
    async fn find_one_by_link(&self, link: &str) -> Result<Option<Material>>;
    async fn update_by_id(&self, id: &MaterialId, patch: MaterialPatch) -> Result<Material>;
    async fn delete_by_id(&self, id: &MaterialId) -> Result<bool>;
    async fn count_matching(&self, filter: &MaterialFilter) -> Result<u64>;
    async fn query_page(&self, filter: &MaterialFilter, skip: u64, limit: u64, order: SortOrder) -> Result<Vec<Material>>;
    /// Adds `email` to the upvote set. A no-op when already present.
    async fn add_upvote(&self, id: &MaterialId, email: &str) -> Result<Material>;
    /// Removes `email` from the upvote set. A no-op when absent.
    async fn remove_upvote(&self, id: &MaterialId, email: &str) -> Result<Material>;
}

/// One JSON document per material plus a persisted `materialLink -> id` index.
///
/// Every mutation holds the index lock for its whole read-modify-write, which is what
/// makes the uniqueness constraint hold under concurrent writers.
pub struct DiskStore {
    base_path: PathBuf,
    materials_path: PathBuf,
    link_index: Mutex<HashMap<String, MaterialId>>,
    cache: Option<CacheManager>,
}

impl DiskStore {
    pub async fn new<P: AsRef<Path>>(base_path: P) -> Result<Self> {
        let base_path = base_path.as_ref().to_owned();
        let materials_path = base_path.join("materials");

        fs::create_dir_all(&materials_path).await?;

        let mut store = Self {
            base_path,
            materials_path,
            link_index: Mutex::new(HashMap::new()),
            cache: None,
        };
        let index = store.load_link_index().await?;
        info!("Opened material store at {} ({} materials)", store.base_path.display(), index.len());
        store.link_index = Mutex::new(index);
        Ok(store)
    }

    pub fn with_cache(mut self, cache_size: usize) -> Self {
        if cache_size > 0 {
            self.cache = Some(CacheManager::new(cache_size));
        }
        self
    }

    fn material_path(&self, id: &MaterialId) -> PathBuf {
        self.materials_path.join(format!("{}.json", id))
    }

    fn index_path(&self) -> PathBuf {
        self.base_path.join("link_index.json")
    }

    /// The documents are the source of truth. A persisted index that disagrees with
    /// them (missing, stale or left behind by an interrupted write) is rebuilt.
    async fn load_link_index(&self) -> Result<HashMap<String, MaterialId>> {
        let index: HashMap<String, MaterialId> = self
            .list_materials()
            .await?
            .into_iter()
            .map(|m| (m.material_link, m.id))
            .collect();

        let persisted = match fs::read_to_string(self.index_path()).await {
            Ok(content) => serde_json::from_str::<HashMap<String, MaterialId>>(&content).ok(),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        if persisted.as_ref() != Some(&index) {
            if persisted.is_some() {
                warn!("Link index out of sync with stored materials, rebuilding");
            }
            self.save_link_index(&index).await?;
        }
        Ok(index)
    }

    async fn save_link_index(&self, index: &HashMap<String, MaterialId>) -> Result<()> {
        write_atomically(&self.index_path(), &serde_json::to_vec(index)?).await
    }

    async fn read_material(&self, id: &MaterialId) -> Result<Material> {
        if let Some(cache) = &self.cache {
            if let Some(material) = cache.get(id).await {
                debug!("Cache hit for material {}", id);
                return Ok(material);
            }
        }

        let content = match fs::read_to_string(self.material_path(id)).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound(id.to_string())),
            Err(e) => return Err(e.into()),
        };
        let material: Material = serde_json::from_str(&content)?;

        if let Some(cache) = &self.cache {
            cache.put(material.clone()).await;
        }
        Ok(material)
    }

    async fn write_material(&self, material: &Material) -> Result<()> {
        write_atomically(&self.material_path(&material.id), &serde_json::to_vec_pretty(material)?).await?;
        if let Some(cache) = &self.cache {
            cache.put(material.clone()).await;
        }
        Ok(())
    }

    /// Reads every stored document. Lists run without the index lock, so a file
    /// removed by a concurrent delete between the directory scan and the read is skipped.
    pub async fn list_materials(&self) -> Result<Vec<Material>> {
        let mut materials = Vec::new();

        let mut entries = fs::read_dir(&self.materials_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            match entry.file_type().await {
                Ok(file_type) if file_type.is_file() => {}
                Ok(_) => continue,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }

            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("Skipping {} removed during listing", path.display());
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            materials.push(serde_json::from_str(&content)?);
        }

        Ok(materials)
    }

    async fn toggle_membership(&self, id: &MaterialId, email: &str, member: bool) -> Result<Material> {
        let _index = self.link_index.lock().await;

        let mut material = self.read_material(id).await?;
        let changed = if member {
            material.upvotes.insert(email.to_string())
        } else {
            material.upvotes.remove(email)
        };

        if changed {
            material.updated_at = Utc::now();
            self.write_material(&material).await?;
        }
        Ok(material)
    }
}

#[async_trait]
impl MaterialStore for DiskStore {
    async fn insert(&self, new: NewMaterial) -> Result<Material> {
        let mut index = self.link_index.lock().await;

        if index.contains_key(&new.material_link) {
            return Err(StoreError::DuplicateKey { field: LINK_FIELD, value: new.material_link });
        }

        let mut id = MaterialId::generate();
        while self.material_path(&id).exists() {
            id = MaterialId::generate();
        }

        let material = Material::from_new(id, new, Utc::now());
        self.write_material(&material).await?;

        index.insert(material.material_link.clone(), material.id.clone());
        if let Err(e) = self.save_link_index(&index).await {
            warn!("Failed to persist link index, rolling back insert of {}: {}", material.id, e);
            index.remove(&material.material_link);
            if let Some(cache) = &self.cache {
                cache.invalidate(&material.id).await;
            }
            fs::remove_file(self.material_path(&material.id)).await?;
            return Err(e);
        }

        Ok(material)
    }

    async fn find_by_id(&self, id: &MaterialId) -> Result<Material> {
        self.read_material(id).await
    }

    async fn find_one_by_link(&self, link: &str) -> Result<Option<Material>> {
        let id = {
            let index = self.link_index.lock().await;
            index.get(link).cloned()
        };

        match id {
            Some(id) => match self.read_material(&id).await {
                Ok(material) => Ok(Some(material)),
                Err(StoreError::NotFound(_)) => Ok(None),
                Err(e) => Err(e),
            },
            None => Ok(None),
        }
    }

    async fn update_by_id(&self, id: &MaterialId, patch: MaterialPatch) -> Result<Material> {
        let mut index = self.link_index.lock().await;

        let mut material = self.read_material(id).await?;
        let previous_link = material.material_link.clone();
        patch.apply_to(&mut material);

        let link_changed = material.material_link != previous_link;
        if link_changed {
            if let Some(owner) = index.get(&material.material_link) {
                if owner != id {
                    return Err(StoreError::DuplicateKey { field: LINK_FIELD, value: material.material_link });
                }
            }
        }

        check_document(&material).map_err(StoreError::SchemaViolation)?;

        material.updated_at = Utc::now();
        self.write_material(&material).await?;

        if link_changed {
            index.remove(&previous_link);
            index.insert(material.material_link.clone(), material.id.clone());
            self.save_link_index(&index).await?;
        }

        Ok(material)
    }

    async fn delete_by_id(&self, id: &MaterialId) -> Result<bool> {
        let mut index = self.link_index.lock().await;

        let material = match self.read_material(id).await {
            Ok(material) => material,
            Err(StoreError::NotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        };

        fs::remove_file(self.material_path(id)).await?;
        if let Some(cache) = &self.cache {
            cache.invalidate(id).await;
        }

        if index.get(&material.material_link) == Some(id) {
            index.remove(&material.material_link);
            self.save_link_index(&index).await?;
        }

        Ok(true)
    }

    async fn count_matching(&self, filter: &MaterialFilter) -> Result<u64> {
        let materials = self.list_materials().await?;
        Ok(materials.iter().filter(|m| filter.matches(m)).count() as u64)
    }

    async fn query_page(&self, filter: &MaterialFilter, skip: u64, limit: u64, order: SortOrder) -> Result<Vec<Material>> {
        let mut materials: Vec<Material> = self
            .list_materials()
            .await?
            .into_iter()
            .filter(|m| filter.matches(m))
            .collect();
        sort_materials(&mut materials, order);

        Ok(materials
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn add_upvote(&self, id: &MaterialId, email: &str) -> Result<Material> {
        self.toggle_membership(id, email, true).await
    }

    async fn remove_upvote(&self, id: &MaterialId, email: &str) -> Result<Material> {
        self.toggle_membership(id, email, false).await
    }
}

async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, bytes).await?;
    fs::rename(&tmp_path, path).await?;
    Ok(())
}
