//! Stored file names for asset uploads.
//!
//! Names have the shape `hardware-{asset id}-{8 random chars}-{slug}.{ext}`
//! where the slug and extension come from the client-supplied name.

use rand::distr::{Alphanumeric, SampleString};

use assettrack_core::types::id::AssetId;

const RANDOM_LEN: usize = 8;

/// Generate a stored file name for an upload.
pub fn upload_filename(asset_id: AssetId, original_name: &str) -> String {
    let token = Alphanumeric.sample_string(&mut rand::rng(), RANDOM_LEN);
    format_upload_filename(asset_id, &token, original_name)
}

fn format_upload_filename(asset_id: AssetId, token: &str, original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    let (stem, extension) = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (base, None),
    };

    let slug = slugify(stem);
    let slug = if slug.is_empty() { "file".to_string() } else { slug };
    let extension = extension
        .map(slugify)
        .filter(|ext| !ext.is_empty());

    match extension {
        Some(ext) => format!("hardware-{asset_id}-{token}-{slug}.{ext}"),
        None => format!("hardware-{asset_id}-{token}-{slug}"),
    }
}

/// Lowercase ASCII alphanumerics, every other run collapsed to one `-`.
fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(
            format_upload_filename(AssetId(100), "Ab3dEf9h", "Purchase Receipt (2024).PDF"),
            "hardware-100-Ab3dEf9h-purchase-receipt-2024.pdf"
        );
        assert_eq!(
            format_upload_filename(AssetId(5), "zzzzzzzz", "C:\\scans\\.hidden"),
            "hardware-5-zzzzzzzz-hidden"
        );
        assert_eq!(
            format_upload_filename(AssetId(5), "zzzzzzzz", "???.jpg"),
            "hardware-5-zzzzzzzz-file.jpg"
        );
    }

    #[test]
    fn test_random_token_shape() {
        let name = upload_filename(AssetId(7), "photo.png");
        let token = name
            .strip_prefix("hardware-7-")
            .and_then(|rest| rest.strip_suffix("-photo.png"))
            .unwrap();
        assert_eq!(token.len(), RANDOM_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
