//! Timber section descriptors such as `"150x150"` or `"Board 45x190 mm"`.
//!
//! A descriptor carries two millimetre integers joined by `x`; the first
//! match anywhere in the string wins.

use thiserror::Error;
use tracing::warn;

use crate::types::Section;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionParseError {
    #[error("no `<width>x<height>` pair in section descriptor {0:?}")]
    NoDimensions(String),
    #[error("section dimension out of range in descriptor {0:?}")]
    OutOfRange(String),
    #[error("section descriptor {0:?} has a zero dimension")]
    ZeroDimension(String),
}

/// Parse the first `<digits>x<digits>` pair of `descriptor` as millimetres.
pub fn parse_section(descriptor: &str) -> Result<Section, SectionParseError> {
    let bytes = descriptor.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let (first, after_first) = digit_run(bytes, i);
        if after_first < bytes.len() && bytes[after_first] == b'x' {
            let (second, after_second) = digit_run(bytes, after_first + 1);
            if after_second > after_first + 1 {
                let width = parse_mm(first, descriptor)?;
                let height = parse_mm(second, descriptor)?;
                return Ok(Section::new(width, height));
            }
        }
        i = after_first;
    }
    Err(SectionParseError::NoDimensions(descriptor.to_owned()))
}

/// Parse `descriptor`, falling back to `default` with a warning.
pub fn parse_section_or(descriptor: Option<&str>, default: Section) -> Section {
    let Some(descriptor) = descriptor else {
        return default;
    };
    match parse_section(descriptor) {
        Ok(section) => section,
        Err(err) => {
            warn!(%err, ?default, "using default section");
            default
        }
    }
}

fn digit_run(bytes: &[u8], start: usize) -> (&[u8], usize) {
    let end = bytes[start..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |n| start + n);
    (&bytes[start..end], end)
}

fn parse_mm(digits: &[u8], descriptor: &str) -> Result<f64, SectionParseError> {
    let value = std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or_else(|| SectionParseError::OutOfRange(descriptor.to_owned()))?;
    if value == 0 {
        return Err(SectionParseError::ZeroDimension(descriptor.to_owned()));
    }
    Ok(f64::from(value) / 1000.0)
}
