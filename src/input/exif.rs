use std::io::Cursor;

/// EXIFの Orientation タグを読む（1〜8）
pub fn read_orientation(bytes: &[u8]) -> Option<u32> {
    let mut cursor = Cursor::new(bytes);
    let exif_reader = exif::Reader::new();
    let exif = exif_reader.read_from_container(&mut cursor).ok()?;

    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_orientation_without_exif() {
        assert_eq!(read_orientation(b"not an image"), None);
        assert_eq!(read_orientation(&[]), None);
    }
}
