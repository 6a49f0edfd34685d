use lazy_static::lazy_static;
use regex::Regex;

use crate::{MaterialError, Result};

const DRIVE_HOST: &str = "drive.google.com";

lazy_static! {
    static ref DRIVE_FILE_LINK: Regex =
        Regex::new(r"^https://drive\.google\.com/file/d/([A-Za-z0-9_-]+)").unwrap();
}

/// Returns the drive file id embedded in a share link such as
/// `https://drive.google.com/file/d/<id>/view?usp=sharing`.
pub fn extract_file_id(url: &str) -> Result<&str> {
    DRIVE_FILE_LINK
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str())
        .ok_or_else(|| MaterialError::InvalidAssetLink("Invalid Google Drive URL format".to_string()))
}

pub fn is_drive_link(url: &str) -> bool {
    DRIVE_FILE_LINK.is_match(url)
}

/// Rewrites a share link into the direct-view form that can be embedded as an image.
pub fn canonicalize(url: &str) -> Result<String> {
    let file_id = extract_file_id(url)?;
    Ok(format!("https://{}/uc?export=view&id={}", DRIVE_HOST, file_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_link_with_suffix() {
        let url = "https://drive.google.com/file/d/1a-B_c9/view?usp=sharing";
        assert_eq!(extract_file_id(url).unwrap(), "1a-B_c9");
        assert_eq!(
            canonicalize(url).unwrap(),
            "https://drive.google.com/uc?export=view&id=1a-B_c9"
        );
    }

    #[test]
    fn test_rejects_other_hosts_and_schemes() {
        for url in [
            "https://example.com/not-drive",
            "http://drive.google.com/file/d/ABC123/view",
            "https://drive.google.com/open?id=ABC123",
            "https://drive.google.com/file/d/",
            " https://drive.google.com/file/d/ABC123",
        ] {
            assert!(
                matches!(canonicalize(url), Err(MaterialError::InvalidAssetLink(_))),
                "{url} should be rejected"
            );
            assert!(!is_drive_link(url));
        }
    }
}
