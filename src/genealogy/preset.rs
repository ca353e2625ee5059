use std::fmt;
use std::path::{Path, PathBuf};

/// Graphs that ship pre-fetched so they load without a round trip to the
/// genealogy service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Preset {
    #[default]
    JohnBenjaminMcCarthy,
    JohnBenjaminMcCarthyBig,
    RuadhaiDervan,
    KelliFrancisStaite,
    SimonDonaldson,
    MichaelAtiyah,
    DanielQuillen,
}

impl Preset {
    pub const ALL: [Preset; 7] = [
        Self::JohnBenjaminMcCarthy,
        Self::JohnBenjaminMcCarthyBig,
        Self::RuadhaiDervan,
        Self::KelliFrancisStaite,
        Self::SimonDonaldson,
        Self::MichaelAtiyah,
        Self::DanielQuillen,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::JohnBenjaminMcCarthy => "johnbenjaminmccarthy",
            Self::JohnBenjaminMcCarthyBig => "johnbenjaminmccarthybig",
            Self::RuadhaiDervan => "ruadhaidervan",
            Self::KelliFrancisStaite => "kellifrancisstaite",
            Self::SimonDonaldson => "simondonaldson",
            Self::MichaelAtiyah => "michaelatiyah",
            Self::DanielQuillen => "danielquillen",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::JohnBenjaminMcCarthy => "John",
            Self::JohnBenjaminMcCarthyBig => "John Big",
            Self::RuadhaiDervan => "Ruadhai Dervan",
            Self::KelliFrancisStaite => "Kelli Francis-Staite",
            Self::SimonDonaldson => "Simon Donaldson",
            Self::MichaelAtiyah => "Michael F. Atiyah",
            Self::DanielQuillen => "Daniel Quillen",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.key() == key)
    }

    /// Location of the preset's graph JSON inside `dir`.
    pub fn path_in(self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.json", self.key()))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
