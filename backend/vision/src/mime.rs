/// Detect an image MIME type from its magic bytes.
///
/// Falls back to JPEG, the format phone cameras upload by default.
pub fn detect_image_mime(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "image/png"
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if data.starts_with(b"RIFF") && data.get(8..12) == Some(b"WEBP") {
        "image/webp"
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        "image/gif"
    } else {
        "image/jpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_common_formats() {
        assert_eq!(detect_image_mime(b"\x89PNG\r\n\x1a\n...."), "image/png");
        assert_eq!(detect_image_mime(b"\xff\xd8\xff\xe0JFIF"), "image/jpeg");
        assert_eq!(detect_image_mime(b"RIFF\x10\x00\x00\x00WEBPVP8 "), "image/webp");
        assert_eq!(detect_image_mime(b"GIF89a..."), "image/gif");
    }

    #[test]
    fn unknown_and_short_input_default_to_jpeg() {
        assert_eq!(detect_image_mime(b""), "image/jpeg");
        assert_eq!(detect_image_mime(b"RIFF"), "image/jpeg");
        assert_eq!(detect_image_mime(b"not an image"), "image/jpeg");
    }
}
