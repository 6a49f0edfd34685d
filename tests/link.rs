#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use study_materials::link::{canonicalize, extract_file_id};
    use study_materials::{ListQuery, MaterialError, PageRequest, MAX_PAGE_LIMIT};

    proptest! {
        #[test]
        fn test_canonical_form_keeps_file_id(
            file_id in "[A-Za-z0-9_-]{1,44}",
            suffix in prop::sample::select(vec!["", "/view", "/edit", "/view?usp=sharing", "?usp=drive_link"]),
        ) {
            let url = format!("https://drive.google.com/file/d/{file_id}{suffix}");
            prop_assert_eq!(extract_file_id(&url).unwrap(), file_id.as_str());
            prop_assert_eq!(
                canonicalize(&url).unwrap(),
                format!("https://drive.google.com/uc?export=view&id={file_id}")
            );
        }

        #[test]
        fn test_other_hosts_rejected(host in "[a-z]{3,12}\\.(com|org|net)", path in "[a-z0-9/]{0,20}") {
            let url = format!("https://{host}/file/d/{path}");
            prop_assert!(matches!(canonicalize(&url), Err(MaterialError::InvalidAssetLink(_))));
        }

        #[test]
        fn test_pages_cover_every_material(total in 0u64..50_000, page in 1u64..100, limit in 1u64..1_000) {
            let query = ListQuery {
                page: Some(page.to_string()),
                limit: Some(limit.to_string()),
                ..ListQuery::default()
            };
            let request = PageRequest::from_query(&query);
            let pagination = request.paginate(total);

            prop_assert!(request.limit <= MAX_PAGE_LIMIT);
            prop_assert_eq!(request.skip(), (page - 1) * request.limit);
            prop_assert!(pagination.total_pages * request.limit >= total);
            prop_assert!(pagination.total_pages.saturating_sub(1) * request.limit < total.max(1));
            prop_assert_eq!(pagination.has_next, page < pagination.total_pages);
        }
    }
}
