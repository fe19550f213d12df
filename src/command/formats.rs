use crate::format::{PRESETS, PresetKind};

/// List the named sheet & tile formats.
#[derive(clap::Parser, Debug, Clone)]
#[group(skip)]
pub struct Formats {
    /// Only list formats of this kind.
    #[arg(value_enum)]
    pub kind: Option<Kind>,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Sheet,
    Tile,
}

impl From<Kind> for PresetKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Sheet => Self::Sheet,
            Kind::Tile => Self::Tile,
        }
    }
}

impl Formats {
    pub fn run(&self) {
        for line in self.lines() {
            println!("{line}");
        }
    }

    fn lines(&self) -> Vec<String> {
        let kind = self.kind.map(PresetKind::from);
        PRESETS
            .iter()
            .filter(|p| kind.is_none_or(|k| k == p.kind))
            .map(|p| format!("{:<18}{:<7}{}mm", p.name, p.kind, p.dimension))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_by_kind() {
        let all = Formats { kind: None }.lines();
        assert_eq!(all.len(), PRESETS.len());

        let tiles = Formats {
            kind: Some(Kind::Tile),
        }
        .lines();
        assert!(tiles.iter().all(|l| l.contains("tile")));
        assert!(tiles.iter().any(|l| l.starts_with("PassportPhoto") && l.ends_with("51x51mm")));
        assert!(!tiles.iter().any(|l| l.starts_with("A4")));
    }
}
