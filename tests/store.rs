#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use study_materials::storage::{DiskStore, MaterialFilter, MaterialStore, SortOrder};
    use study_materials::*;
    use tempfile::TempDir;

    /// Helper to initialize DiskStore with a temporary directory
    async fn create_test_store() -> (DiskStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = DiskStore::new(temp_dir.path()).await.expect("can't create disk store");
        (store, temp_dir)
    }

    fn new_material(link: &str) -> NewMaterial {
        NewMaterial {
            subject: "Computer Networks".into(),
            semester: 6,
            instructor_name: vec!["Dr. Das".into()],
            course_code: "CS601".into(),
            material_link: link.into(),
            desc: String::new(),
            author: vec!["Rohan".into()],
            year_of_writing: 2019,
            branch: vec!["CSE".into()],
            material_type: "notes".into(),
            thumbnail: "https://drive.google.com/uc?export=view&id=abc".into(),
            featured: false,
            contributed_by: "Admin".into(),
            verified_by: Some(VerificationStatus::NotVerified),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let (store, _temp_dir) = create_test_store().await;

        let material = store.insert(new_material("https://example.com/cn.pdf")).await.unwrap();

        assert_eq!(store.find_by_id(&material.id).await.unwrap(), material);
        assert_eq!(
            store.find_one_by_link("https://example.com/cn.pdf").await.unwrap(),
            Some(material)
        );
        assert!(store.find_one_by_link("https://example.com/other.pdf").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_key() {
        let (store, _temp_dir) = create_test_store().await;

        store.insert(new_material("https://example.com/cn.pdf")).await.unwrap();
        let err = store.insert(new_material("https://example.com/cn.pdf")).await.unwrap_err();

        assert!(matches!(err, StoreError::DuplicateKey { field: "materialLink", .. }));
    }

    #[tokio::test]
    async fn test_unique_index_survives_reopen() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let id = {
            let store = DiskStore::new(temp_dir.path()).await.unwrap();
            store.insert(new_material("https://example.com/cn.pdf")).await.unwrap().id
        };

        let reopened = DiskStore::new(temp_dir.path()).await.unwrap();
        assert!(reopened.find_by_id(&id).await.is_ok());
        assert!(reopened.insert(new_material("https://example.com/cn.pdf")).await.is_err());

        std::fs::remove_file(temp_dir.path().join("link_index.json")).unwrap();
        let rebuilt = DiskStore::new(temp_dir.path()).await.unwrap();
        assert!(rebuilt.insert(new_material("https://example.com/cn.pdf")).await.is_err());
    }

    #[tokio::test]
    async fn test_upvote_set_operations_are_idempotent() {
        let (store, _temp_dir) = create_test_store().await;
        let material = store.insert(new_material("https://example.com/cn.pdf")).await.unwrap();

        store.add_upvote(&material.id, "a@b.co").await.unwrap();
        let twice = store.add_upvote(&material.id, "a@b.co").await.unwrap();
        assert_eq!(twice.upvote_count(), 1);

        store.remove_upvote(&material.id, "a@b.co").await.unwrap();
        let again = store.remove_upvote(&material.id, "a@b.co").await.unwrap();
        assert_eq!(again.upvote_count(), 0);
    }

    #[tokio::test]
    async fn test_update_rechecks_merged_document() {
        let (store, _temp_dir) = create_test_store().await;
        let material = store.insert(new_material("https://example.com/cn.pdf")).await.unwrap();

        let patch = MaterialPatch {
            year_of_writing: Some(1990),
            ..MaterialPatch::default()
        };
        let err = store.update_by_id(&material.id, patch).await.unwrap_err();
        assert!(matches!(err, StoreError::SchemaViolation(ref msg) if msg == "Year must be valid"));

        let missing = MaterialId::parse("65a1f0c2e4b0a1b2c3d4e5f6").unwrap();
        let err = store.update_by_id(&missing, MaterialPatch::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_count_and_page() {
        let (store, _temp_dir) = create_test_store().await;
        for i in 0..5 {
            store.insert(new_material(&format!("https://example.com/{i}.pdf"))).await.unwrap();
        }

        let filter = MaterialFilter::listed();
        assert_eq!(store.count_matching(&filter).await.unwrap(), 5);
        assert_eq!(store.count_matching(&filter.clone().semester(1)).await.unwrap(), 0);

        let page = store.query_page(&filter, 4, 2, SortOrder::CreatedAtDesc).await.unwrap();
        assert_eq!(page.len(), 1);

        let oldest_first = store.query_page(&filter, 0, 5, SortOrder::CreatedAtAsc).await.unwrap();
        assert_eq!(oldest_first[0].material_link, "https://example.com/0.pdf");
    }

    #[tokio::test]
    async fn test_delete() {
        let (store, _temp_dir) = create_test_store().await;
        let material = store.insert(new_material("https://example.com/cn.pdf")).await.unwrap();

        assert!(store.delete_by_id(&material.id).await.unwrap());
        assert!(!store.delete_by_id(&material.id).await.unwrap());
        assert!(matches!(store.find_by_id(&material.id).await, Err(StoreError::NotFound(_))));
        assert!(store.find_one_by_link("https://example.com/cn.pdf").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_listing_tolerates_concurrent_deletes() {
        let (store, _temp_dir) = create_test_store().await;
        let store = Arc::new(store);
        let filter = MaterialFilter::listed();

        for round in 0..10 {
            let mut ids = Vec::new();
            for i in 0..40 {
                let link = format!("https://example.com/{round}/{i}.pdf");
                ids.push(store.insert(new_material(&link)).await.unwrap().id);
            }

            let deleter = {
                let store = store.clone();
                tokio::spawn(async move {
                    for id in ids {
                        store.delete_by_id(&id).await.unwrap();
                    }
                })
            };

            let readers: Vec<_> = (0..8)
                .map(|_| {
                    let store = store.clone();
                    let filter = filter.clone();
                    tokio::spawn(async move {
                        store.query_page(&filter, 0, 100, SortOrder::CreatedAtDesc).await.map(|page| page.len())
                    })
                })
                .collect();

            for reader in readers {
                let listed = reader.await.unwrap().expect("listing failed during concurrent deletes");
                assert!(listed <= 40);
            }
            deleter.await.unwrap();
        }

        assert_eq!(store.count_matching(&filter).await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_find_racing_delete_is_not_found() {
        let (store, _temp_dir) = create_test_store().await;
        let store = Arc::new(store);

        for i in 0..20 {
            let id = store
                .insert(new_material(&format!("https://example.com/{i}.pdf")))
                .await
                .unwrap()
                .id;

            let finder = {
                let store = store.clone();
                let id = id.clone();
                tokio::spawn(async move { store.find_by_id(&id).await })
            };
            store.delete_by_id(&id).await.unwrap();

            match finder.await.unwrap() {
                Ok(material) => assert_eq!(material.id, id),
                Err(err) => assert!(matches!(err, StoreError::NotFound(_)), "unexpected error: {err}"),
            }
        }
    }

    #[tokio::test]
    async fn test_stale_index_is_reconciled_on_open() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        {
            let store = DiskStore::new(temp_dir.path()).await.unwrap();
            store.insert(new_material("https://example.com/cn.pdf")).await.unwrap();
        }

        // A document whose index entry never made it to disk.
        std::fs::write(temp_dir.path().join("link_index.json"), "{}").unwrap();

        let reopened = DiskStore::new(temp_dir.path()).await.unwrap();
        let err = reopened.insert(new_material("https://example.com/cn.pdf")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { field: "materialLink", .. }));
        assert!(reopened.find_one_by_link("https://example.com/cn.pdf").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unreadable_index_is_rebuilt() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        {
            let store = DiskStore::new(temp_dir.path()).await.unwrap();
            store.insert(new_material("https://example.com/cn.pdf")).await.unwrap();
        }
        std::fs::write(temp_dir.path().join("link_index.json"), "not json").unwrap();

        let reopened = DiskStore::new(temp_dir.path()).await.unwrap();
        assert!(reopened.insert(new_material("https://example.com/cn.pdf")).await.is_err());
    }

    #[tokio::test]
    async fn test_insert_rolls_back_when_index_write_fails() {
        let (store, temp_dir) = create_test_store().await;
        let index_path = temp_dir.path().join("link_index.json");

        std::fs::remove_file(&index_path).unwrap();
        std::fs::create_dir(&index_path).unwrap();

        assert!(store.insert(new_material("https://example.com/cn.pdf")).await.is_err());
        assert!(store.list_materials().await.unwrap().is_empty());
        assert!(store.find_one_by_link("https://example.com/cn.pdf").await.unwrap().is_none());

        std::fs::remove_dir(&index_path).unwrap();
        let material = store.insert(new_material("https://example.com/cn.pdf")).await.unwrap();
        assert_eq!(store.list_materials().await.unwrap(), vec![material]);
    }
}
