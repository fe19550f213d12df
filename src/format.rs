use crate::error::Error;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Dimension {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the same dimension with width & height swapped.
    pub fn transposed(self) -> Self {
        Self::new(self.height, self.width)
    }

    pub fn validate(self, kind: &'static str) -> Result<Self, Error> {
        match self.width == 0 || self.height == 0 {
            true => Err(Error::InvalidFormat {
                kind,
                width: self.width.into(),
                height: self.height.into(),
            }),
            false => Ok(self),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetKind {
    Sheet,
    Tile,
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sheet => f.pad("sheet"),
            Self::Tile => f.pad("tile"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub name: &'static str,
    pub kind: PresetKind,
    pub dimension: Dimension,
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "A3",
        kind: PresetKind::Sheet,
        dimension: Dimension::new(297, 420),
    },
    Preset {
        name: "A4",
        kind: PresetKind::Sheet,
        dimension: Dimension::new(210, 297),
    },
    Preset {
        name: "A5",
        kind: PresetKind::Sheet,
        dimension: Dimension::new(148, 210),
    },
    Preset {
        name: "Letter",
        kind: PresetKind::Sheet,
        dimension: Dimension::new(216, 279),
    },
    Preset {
        name: "PassportPhoto",
        kind: PresetKind::Tile,
        dimension: Dimension::new(51, 51),
    },
    Preset {
        name: "ChineseVisaPhoto",
        kind: PresetKind::Tile,
        dimension: Dimension::new(38, 48),
    },
    Preset {
        name: "EuPassportPhoto",
        kind: PresetKind::Tile,
        dimension: Dimension::new(35, 45),
    },
];

/// Lookup a preset by name ignoring case, `-` & `_`.
pub fn preset(name: &str) -> Option<&'static Preset> {
    let key = normalize(name);
    PRESETS.iter().find(|p| normalize(p.name) == key)
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// A format given on the command line: a preset name or `WxH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatArg(pub Dimension);

impl FromStr for FormatArg {
    type Err = anyhow::Error;

    fn from_str(v: &str) -> Result<Self, Self::Err> {
        let v = v.trim();
        if let Some(p) = preset(v) {
            return Ok(Self(p.dimension));
        }
        Ok(Self(parse_dimension(v)?))
    }
}

impl fmt::Display for FormatArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Parse `WxH`, e.g. "110x110".
pub fn parse_dimension(v: &str) -> anyhow::Result<Dimension> {
    let (w, h) = v
        .trim()
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| anyhow::anyhow!("expected a preset name or WIDTHxHEIGHT, got {v:?}"))?;
    let (w, h): (i64, i64) = (w.trim().parse()?, h.trim().parse()?);
    let side = |v: i64| u32::try_from(v).ok().filter(|v| *v > 0);
    match (side(w), side(h)) {
        (Some(w), Some(h)) => Ok(Dimension::new(w, h)),
        _ => Err(Error::InvalidFormat {
            kind: "custom",
            width: w,
            height: h,
        }
        .into()),
    }
}
