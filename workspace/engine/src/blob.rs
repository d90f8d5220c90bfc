//! Blob transport codec.
//!
//! Uploaded files travel as a self-describing data string of the form
//! `type-tag;base64-payload`, where the tag identifies the original media
//! kind. Consumers decode the payload and use the tag to pick a file name
//! heuristically. Anything without a recognized tag is treated as an
//! external link.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{EngineError, Result};

/// Size ceiling for uploaded files, checked against the raw byte length
/// before encoding.
pub const MAX_UPLOAD_BYTES: usize = 15 * 1024 * 1024;

/// Media kind recorded in the blob type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Pdf,
    Other,
}

impl MediaKind {
    pub fn tag(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Pdf => "pdf",
            MediaKind::Other => "other",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "image" => Some(MediaKind::Image),
            "pdf" => Some(MediaKind::Pdf),
            "other" => Some(MediaKind::Other),
            _ => None,
        }
    }

    /// Guess the media kind from a file name extension.
    pub fn from_file_name(file_name: &str) -> Self {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("jpg" | "jpeg" | "gif" | "png" | "webp") => MediaKind::Image,
            Some("pdf") => MediaKind::Pdf,
            _ => MediaKind::Other,
        }
    }

    /// Extension used when re-materializing a decoded blob.
    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Image => "png",
            MediaKind::Pdf => "pdf",
            MediaKind::Other => "bin",
        }
    }
}

/// Encode raw file bytes as a transportable blob string.
///
/// Fails with `PayloadTooLarge` when the raw input exceeds the ceiling;
/// nothing is encoded in that case.
pub fn encode(kind: MediaKind, bytes: &[u8]) -> Result<String> {
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(EngineError::PayloadTooLarge {
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(format!("{};{}", kind.tag(), STANDARD.encode(bytes)))
}

/// Decode a blob string back into its media kind and raw bytes.
pub fn decode(blob: &str) -> Result<(MediaKind, Vec<u8>)> {
    let (tag, payload) = blob
        .split_once(';')
        .ok_or_else(|| EngineError::Validation("not a blob string".to_string()))?;
    let kind = MediaKind::from_tag(tag)
        .ok_or_else(|| EngineError::Validation(format!("unknown blob type tag '{tag}'")))?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| EngineError::Validation(format!("blob payload is not valid base64: {e}")))?;
    Ok((kind, bytes))
}

/// Whether a stored reference/result string is an embedded blob rather
/// than an external link.
pub fn is_blob(reference: &str) -> bool {
    reference
        .split_once(';')
        .is_some_and(|(tag, _)| MediaKind::from_tag(tag).is_some())
}

/// File name heuristic for a decoded blob.
pub fn suggested_file_name(stem: &str, kind: MediaKind) -> String {
    format!("{stem}.{}", kind.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_byte_length_and_content() {
        let bytes: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let blob = encode(MediaKind::Image, &bytes).unwrap();
        assert!(blob.starts_with("image;"));
        let (kind, decoded) = decode(&blob).unwrap();
        assert_eq!(kind, MediaKind::Image);
        assert_eq!(decoded.len(), bytes.len());
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn oversized_input_is_rejected_without_encoding() {
        let bytes = vec![0u8; MAX_UPLOAD_BYTES + 1];
        match encode(MediaKind::Pdf, &bytes) {
            Err(EngineError::PayloadTooLarge { limit }) => assert_eq!(limit, MAX_UPLOAD_BYTES),
            other => panic!("expected PayloadTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn input_at_the_ceiling_is_accepted() {
        let bytes = vec![0u8; MAX_UPLOAD_BYTES];
        assert!(encode(MediaKind::Other, &bytes).is_ok());
    }

    #[test]
    fn media_kind_is_inferred_from_file_name() {
        assert_eq!(MediaKind::from_file_name("banner.PNG"), MediaKind::Image);
        assert_eq!(MediaKind::from_file_name("menu.pdf"), MediaKind::Pdf);
        assert_eq!(MediaKind::from_file_name("design.psd"), MediaKind::Other);
        assert_eq!(MediaKind::from_file_name("noextension"), MediaKind::Other);
    }

    #[test]
    fn external_links_are_not_blobs() {
        assert!(!is_blob("https://drive.google.com/file/d/abc"));
        assert!(!is_blob(""));
        assert!(is_blob("pdf;AAAA"));
    }

    #[test]
    fn malformed_blob_strings_fail_validation() {
        assert!(matches!(
            decode("no-separator"),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            decode("image;***not-base64***"),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            decode("video;AAAA"),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn suggested_file_name_uses_kind_extension() {
        assert_eq!(suggested_file_name("Result", MediaKind::Image), "Result.png");
        assert_eq!(suggested_file_name("Result", MediaKind::Other), "Result.bin");
    }
}
