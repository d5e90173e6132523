use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HyphenatedUUID(pub u128);

impl fmt::Display for HyphenatedUUID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hex = format!("{:032x}", self.0);
        hex.insert(8, '-');
        hex.insert(13, '-');
        hex.insert(18, '-');
        hex.insert(23, '-');
        f.write_str(&hex)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid uuid: {0:?}")]
pub struct InvalidUUID(pub String);

impl FromStr for HyphenatedUUID {
    type Err = InvalidUUID;

    /// Accepts the 8-4-4-4-12 hyphenated form and the plain 32 digit form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = match s.len() {
            32 => s.to_owned(),
            36 => {
                let hyphens_placed = s
                    .char_indices()
                    .all(|(i, c)| (c == '-') == matches!(i, 8 | 13 | 18 | 23));
                if !hyphens_placed {
                    return Err(InvalidUUID(s.to_owned()));
                }
                s.replace('-', "")
            }
            _ => return Err(InvalidUUID(s.to_owned())),
        };
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidUUID(s.to_owned()));
        }
        u128::from_str_radix(&hex, 16)
            .map(HyphenatedUUID)
            .map_err(|_| InvalidUUID(s.to_owned()))
    }
}
