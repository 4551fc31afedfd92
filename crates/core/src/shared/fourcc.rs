use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FourCcError {
    #[error("encoding tag must be exactly 4 ASCII characters, got {0:?}")]
    InvalidTag(String),
    #[error("no encoder known for encoding tag {0}")]
    UnsupportedTag(FourCc),
}

/// A four-character encoding tag such as `XVID` or `MJPG`.
///
/// Tags are stored upper-cased; `xvid` and `XVID` name the same compressor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FourCc([u8; 4]);

impl FourCc {
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII bytes are accepted at construction.
        std::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl FromStr for FourCc {
    type Err = FourCcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            return Err(FourCcError::InvalidTag(s.to_string()));
        }
        let mut tag = [0u8; 4];
        for (dst, src) in tag.iter_mut().zip(bytes) {
            *dst = src.to_ascii_uppercase();
        }
        Ok(Self(tag))
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_uppercases() {
        let tag: FourCc = "xvid".parse().unwrap();
        assert_eq!(tag.as_str(), "XVID");
        assert_eq!(tag.to_string(), "XVID");
    }

    #[rstest]
    #[case::too_short("XVI")]
    #[case::too_long("XVIDX")]
    #[case::empty("")]
    #[case::non_ascii("XVÏ")]
    #[case::control_char("XV\tD")]
    fn test_invalid_tags_rejected(#[case] input: &str) {
        assert_eq!(
            input.parse::<FourCc>(),
            Err(FourCcError::InvalidTag(input.to_string()))
        );
    }

    #[test]
    fn test_trailing_space_allowed() {
        let tag: FourCc = "PNG ".parse().unwrap();
        assert_eq!(tag.as_bytes(), b"PNG ");
    }
}
