//! Fixed-width UTF-16 text fields of NOTIFYICONDATAW

/// szTip width (UTF-16 units incl. NUL)
pub const TIP_LEN: usize = 128;
/// szInfo width
pub const INFO_LEN: usize = 256;
/// szInfoTitle width
pub const INFO_TITLE_LEN: usize = 64;

/// Encode `s` into a NUL-terminated field of N units
/// Truncates at a char boundary: a surrogate pair is never split
pub fn to_field<const N: usize>(s: &str) -> [u16; N] {
    let mut field = [0u16; N];
    let capacity = N.saturating_sub(1);
    let mut len = 0;
    let mut buf = [0u16; 2];

    for ch in s.chars() {
        let units = ch.encode_utf16(&mut buf);
        if len + units.len() > capacity {
            break;
        }
        field[len..len + units.len()].copy_from_slice(units);
        len += units.len();
    }

    field
}

/// Decode a NUL-terminated field (lossy)
pub fn from_field(field: &[u16]) -> String {
    let end = field.iter().position(|&u| u == 0).unwrap_or(field.len());
    String::from_utf16_lossy(&field[..end])
}

/// NUL-terminated wide string for PCWSTR arguments
pub fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(Some(0)).collect()
}
