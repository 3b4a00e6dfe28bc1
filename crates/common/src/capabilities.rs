//! Reference table of browser capability flags
//!
//! The editor detects its host browser at startup and exposes the result
//! as a map of named boolean flags. This module computes what that map
//! must be for a given (engine, version, platform) triple so the harness
//! can check the editor's own detection against it.
//!
//! The table is declarative: one base row per engine listing every flag
//! explicitly, then version and platform overrides that may only switch a
//! flag from `false` to `true`. [`CapabilityTable::audit`] verifies that
//! rule over the whole table.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::EnvironmentConfig;
use crate::error::{Error, Result};

/// Browser engine families the harness knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Engine {
    Chrome,
    Firefox,
    InternetExplorer,
}

impl Engine {
    pub const ALL: [Engine; 3] = [Engine::Chrome, Engine::Firefox, Engine::InternetExplorer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Chrome => "CHROME",
            Engine::Firefox => "FIREFOX",
            Engine::InternetExplorer => "INTERNETEXPLORER",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Engine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        Engine::ALL
            .into_iter()
            .find(|engine| engine.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownEngine(s.to_string()))
    }
}

pub const CHROME: &str = "CHROME";
pub const CHROME_31: &str = "CHROME_31";
pub const CHROME_37: &str = "CHROME_37";
pub const FIREFOX: &str = "FIREFOX";
pub const FIREFOX_24: &str = "FIREFOX_24";
pub const GECKO: &str = "GECKO";
pub const MSIE_TO_10: &str = "MSIE_TO_10";
pub const MSIE_11_AND_UP: &str = "MSIE_11_AND_UP";
pub const MSIE: &str = "MSIE";
pub const OSX: &str = "OSX";
pub const WINDOWS: &str = "WINDOWS";

/// Every flag name the table may produce
pub const DECLARED_FLAGS: [&str; 11] = [
    CHROME,
    CHROME_31,
    CHROME_37,
    FIREFOX,
    FIREFOX_24,
    GECKO,
    MSIE_TO_10,
    MSIE_11_AND_UP,
    MSIE,
    OSX,
    WINDOWS,
];

/// Default flag values for one engine; every declared flag appears once
#[derive(Debug, Clone, Copy)]
pub struct BaseRow {
    pub engine: Engine,
    pub flags: &'static [(&'static str, bool)],
}

/// Predicate over a major version number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionRule {
    Exactly(u32),
    AtMost(u32),
    AtLeast(u32),
}

impl VersionRule {
    pub fn matches(&self, major: u32) -> bool {
        match *self {
            VersionRule::Exactly(v) => major == v,
            VersionRule::AtMost(v) => major <= v,
            VersionRule::AtLeast(v) => major >= v,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VersionOverride {
    pub engine: Engine,
    pub rule: VersionRule,
    pub flag: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct PlatformOverride {
    pub prefix: &'static str,
    pub flag: &'static str,
}

static BASE_ROWS: [BaseRow; 3] = [
    BaseRow {
        engine: Engine::Chrome,
        flags: &[
            (CHROME, true),
            (CHROME_31, false),
            (CHROME_37, false),
            (FIREFOX, false),
            (FIREFOX_24, false),
            (GECKO, false),
            (MSIE_TO_10, false),
            (MSIE_11_AND_UP, false),
            (MSIE, false),
            (OSX, false),
            (WINDOWS, false),
        ],
    },
    BaseRow {
        engine: Engine::Firefox,
        flags: &[
            (CHROME, false),
            (CHROME_31, false),
            (CHROME_37, false),
            (FIREFOX, true),
            (FIREFOX_24, false),
            (GECKO, true),
            (MSIE_TO_10, false),
            (MSIE_11_AND_UP, false),
            (MSIE, false),
            (OSX, false),
            (WINDOWS, false),
        ],
    },
    BaseRow {
        engine: Engine::InternetExplorer,
        flags: &[
            (CHROME, false),
            (CHROME_31, false),
            (CHROME_37, false),
            (FIREFOX, false),
            (FIREFOX_24, false),
            (GECKO, false),
            (MSIE_TO_10, false),
            (MSIE_11_AND_UP, false),
            (MSIE, true),
            (OSX, false),
            (WINDOWS, false),
        ],
    },
];

// Thresholds are per engine; IE splits at 10/11, the others only name
// exact releases.
static VERSION_OVERRIDES: [VersionOverride; 5] = [
    VersionOverride {
        engine: Engine::Chrome,
        rule: VersionRule::Exactly(31),
        flag: CHROME_31,
    },
    VersionOverride {
        engine: Engine::Chrome,
        rule: VersionRule::Exactly(37),
        flag: CHROME_37,
    },
    VersionOverride {
        engine: Engine::InternetExplorer,
        rule: VersionRule::AtMost(10),
        flag: MSIE_TO_10,
    },
    VersionOverride {
        engine: Engine::InternetExplorer,
        rule: VersionRule::AtLeast(11),
        flag: MSIE_11_AND_UP,
    },
    VersionOverride {
        engine: Engine::Firefox,
        rule: VersionRule::Exactly(24),
        flag: FIREFOX_24,
    },
];

// First matching prefix wins. The trailing space keeps "WINDOWS" from
// matching a bare family name with no release.
static PLATFORM_OVERRIDES: [PlatformOverride; 2] = [
    PlatformOverride {
        prefix: "OS X ",
        flag: OSX,
    },
    PlatformOverride {
        prefix: "WINDOWS ",
        flag: WINDOWS,
    },
];

static REFERENCE: CapabilityTable =
    CapabilityTable::new(&BASE_ROWS, &VERSION_OVERRIDES, &PLATFORM_OVERRIDES);

/// Capability flags keyed by name, in a stable order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityMap(BTreeMap<String, bool>);

impl CapabilityMap {
    pub fn get(&self, flag: &str) -> Option<bool> {
        self.0.get(flag).copied()
    }

    /// True when `flag` is present and set
    pub fn is_set(&self, flag: &str) -> bool {
        self.get(flag).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Names of every flag that is set
    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|(_, v)| *v).map(|(k, _)| k)
    }

    /// Every flag on which `reported` disagrees with this map, including
    /// flags only one side has
    pub fn diff(&self, reported: &CapabilityMap) -> Vec<FlagMismatch> {
        let mut names: Vec<&String> = self.0.keys().chain(reported.0.keys()).collect();
        names.sort();
        names.dedup();

        names
            .into_iter()
            .filter_map(|name| {
                let expected = self.0.get(name).copied();
                let actual = reported.0.get(name).copied();
                (expected != actual).then(|| FlagMismatch {
                    flag: name.clone(),
                    expected,
                    reported: actual,
                })
            })
            .collect()
    }

    /// Switch a declared flag on; unknown names are ignored
    fn raise(&mut self, flag: &str) {
        if let Some(slot) = self.0.get_mut(flag) {
            *slot = true;
        }
    }
}

impl FromIterator<(String, bool)> for CapabilityMap {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One disagreement between the reference map and a reported one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagMismatch {
    pub flag: String,
    pub expected: Option<bool>,
    pub reported: Option<bool>,
}

impl fmt::Display for FlagMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn show(value: Option<bool>) -> &'static str {
            match value {
                Some(true) => "true",
                Some(false) => "false",
                None => "missing",
            }
        }
        write!(
            f,
            "{}: expected {}, reported {}",
            self.flag,
            show(self.expected),
            show(self.reported)
        )
    }
}

/// A way in which a table breaks its own rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableViolation {
    /// A base row is missing a declared flag, names one twice, or names
    /// an undeclared one
    IncompleteRow { engine: Engine, flag: String },
    /// An engine has no base row
    MissingRow { engine: Engine },
    /// An override targets a flag that is not declared
    UndeclaredOverride { flag: String },
    /// An override would raise a flag the base row already sets
    RedundantOverride { engine: Engine, flag: String },
}

impl fmt::Display for TableViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableViolation::IncompleteRow { engine, flag } => {
                write!(f, "base row {} does not list {} exactly once", engine, flag)
            }
            TableViolation::MissingRow { engine } => write!(f, "no base row for {}", engine),
            TableViolation::UndeclaredOverride { flag } => {
                write!(f, "override targets undeclared flag {}", flag)
            }
            TableViolation::RedundantOverride { engine, flag } => {
                write!(f, "override raises {} which {} already sets", flag, engine)
            }
        }
    }
}

/// Base rows plus ordered overrides
#[derive(Debug, Clone, Copy)]
pub struct CapabilityTable {
    base: &'static [BaseRow],
    versions: &'static [VersionOverride],
    platforms: &'static [PlatformOverride],
}

impl CapabilityTable {
    pub const fn new(
        base: &'static [BaseRow],
        versions: &'static [VersionOverride],
        platforms: &'static [PlatformOverride],
    ) -> Self {
        Self {
            base,
            versions,
            platforms,
        }
    }

    /// The table the editor's browser detection is checked against
    pub fn reference() -> &'static CapabilityTable {
        &REFERENCE
    }

    pub fn rows(&self) -> &'static [BaseRow] {
        self.base
    }

    pub fn version_overrides(&self) -> &'static [VersionOverride] {
        self.versions
    }

    pub fn platform_overrides(&self) -> &'static [PlatformOverride] {
        self.platforms
    }

    fn row(&self, engine: Engine) -> Result<&'static BaseRow> {
        self.base
            .iter()
            .find(|row| row.engine == engine)
            .ok_or_else(|| Error::UnknownEngine(engine.to_string()))
    }

    /// The base row of `engine` as a map, before any override
    pub fn base(&self, engine: Engine) -> Result<CapabilityMap> {
        let row = self.row(engine)?;
        Ok(row
            .flags
            .iter()
            .map(|(flag, value)| (flag.to_string(), *value))
            .collect())
    }

    /// Expected flags for an engine name, version string and platform string
    pub fn classify(&self, engine: &str, version: &str, platform: &str) -> Result<CapabilityMap> {
        self.classify_engine(engine.parse()?, version, platform)
    }

    pub fn classify_engine(
        &self,
        engine: Engine,
        version: &str,
        platform: &str,
    ) -> Result<CapabilityMap> {
        let mut map = self.base(engine)?;

        if let Some(major) = major_version(version) {
            self.versions
                .iter()
                .filter(|o| o.engine == engine && o.rule.matches(major))
                .for_each(|o| map.raise(o.flag));
        }

        if let Some(o) = self.platforms.iter().find(|o| platform.starts_with(o.prefix)) {
            map.raise(o.flag);
        }

        Ok(map)
    }

    /// Check the table against its own rules: complete base rows, and
    /// overrides that only ever raise declared flags the base row clears
    pub fn audit(&self) -> Vec<TableViolation> {
        let mut violations = Vec::new();

        for engine in Engine::ALL {
            let Some(row) = self.base.iter().find(|row| row.engine == engine) else {
                violations.push(TableViolation::MissingRow { engine });
                continue;
            };

            for flag in DECLARED_FLAGS {
                if row.flags.iter().filter(|(f, _)| *f == flag).count() != 1 {
                    violations.push(TableViolation::IncompleteRow {
                        engine,
                        flag: flag.to_string(),
                    });
                }
            }
            for (flag, _) in row.flags {
                if !DECLARED_FLAGS.contains(flag) {
                    violations.push(TableViolation::IncompleteRow {
                        engine,
                        flag: flag.to_string(),
                    });
                }
            }
        }

        let targets = self
            .versions
            .iter()
            .map(|o| (Some(o.engine), o.flag))
            .chain(self.platforms.iter().map(|o| (None, o.flag)));

        for (engine, flag) in targets {
            if !DECLARED_FLAGS.contains(&flag) {
                violations.push(TableViolation::UndeclaredOverride {
                    flag: flag.to_string(),
                });
                continue;
            }

            // Platform overrides apply to every engine
            let engines: Vec<Engine> = match engine {
                Some(engine) => vec![engine],
                None => Engine::ALL.to_vec(),
            };
            for engine in engines {
                let already_set = self
                    .base
                    .iter()
                    .find(|row| row.engine == engine)
                    .and_then(|row| row.flags.iter().find(|(f, _)| *f == flag))
                    .map(|(_, v)| *v)
                    .unwrap_or(false);
                if already_set {
                    violations.push(TableViolation::RedundantOverride {
                        engine,
                        flag: flag.to_string(),
                    });
                }
            }
        }

        violations
    }
}

/// Leading decimal digits of a version string, e.g. `11` for `"11.0.9600"`
pub fn major_version(version: &str) -> Option<u32> {
    let version = version.trim();
    let end = version
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(version.len());
    version[..end].parse().ok()
}

/// Expected flags according to the reference table
pub fn classify(engine: &str, version: &str, platform: &str) -> Result<CapabilityMap> {
    CapabilityTable::reference().classify(engine, version, platform)
}

/// Expected flags for the configured session
pub fn classify_environment(env: &EnvironmentConfig) -> Result<CapabilityMap> {
    classify(&env.browser, &env.version, &env.platform)
}
