//! Capability table commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::debug;
use wedtest_common::{CapabilityMap, CapabilityTable, EnvironmentConfig, FlagMismatch};

use crate::output::{print_error, print_info, print_list, print_success, OutputFormat, TableDisplay};

/// Environment selection; unset fields fall back to the configuration
#[derive(Args, Debug, Default)]
pub struct EnvironmentArgs {
    /// Browser engine (CHROME, FIREFOX, INTERNETEXPLORER)
    #[arg(long)]
    pub browser: Option<String>,

    /// Browser version, e.g. 37 or 11.0
    #[arg(long)]
    pub version: Option<String>,

    /// Platform, e.g. "WINDOWS 7"
    #[arg(long)]
    pub platform: Option<String>,
}

impl EnvironmentArgs {
    pub fn resolve(&self, base: &EnvironmentConfig) -> EnvironmentConfig {
        EnvironmentConfig {
            browser: self.browser.clone().unwrap_or_else(|| base.browser.clone()),
            version: self.version.clone().unwrap_or_else(|| base.version.clone()),
            platform: self.platform.clone().unwrap_or_else(|| base.platform.clone()),
        }
    }
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// JSON object of flag name to boolean, as reported by the editor
    pub reported: PathBuf,

    #[command(flatten)]
    pub environment: EnvironmentArgs,
}

#[derive(Serialize)]
struct FlagDisplay {
    flag: String,
    value: bool,
}

impl TableDisplay for FlagDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Flag", "Value"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.flag.clone(), self.value.to_string()]
    }
}

#[derive(Serialize)]
struct RuleDisplay {
    kind: &'static str,
    applies_to: String,
    condition: String,
    flag: String,
}

impl TableDisplay for RuleDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Kind", "Applies To", "Condition", "Flag"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.kind.to_string(),
            self.applies_to.clone(),
            self.condition.clone(),
            self.flag.clone(),
        ]
    }
}

#[derive(Serialize)]
struct MismatchDisplay {
    flag: String,
    expected: Option<bool>,
    reported: Option<bool>,
}

impl TableDisplay for MismatchDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Flag", "Expected", "Reported"]
    }

    fn row(&self) -> Vec<String> {
        let show = |value: Option<bool>| value.map_or("missing".to_string(), |v| v.to_string());
        vec![self.flag.clone(), show(self.expected), show(self.reported)]
    }
}

impl From<FlagMismatch> for MismatchDisplay {
    fn from(m: FlagMismatch) -> Self {
        Self {
            flag: m.flag,
            expected: m.expected,
            reported: m.reported,
        }
    }
}

fn flag_rows(map: &CapabilityMap) -> Vec<FlagDisplay> {
    map.iter()
        .map(|(flag, value)| FlagDisplay {
            flag: flag.to_string(),
            value,
        })
        .collect()
}

fn rule_rows(table: &CapabilityTable) -> Vec<RuleDisplay> {
    let base = table.rows().iter().map(|row| RuleDisplay {
        kind: "base",
        applies_to: row.engine.to_string(),
        condition: "-".to_string(),
        flag: row
            .flags
            .iter()
            .filter(|(_, value)| *value)
            .map(|(flag, _)| *flag)
            .collect::<Vec<_>>()
            .join(", "),
    });
    let versions = table.version_overrides().iter().map(|o| RuleDisplay {
        kind: "version",
        applies_to: o.engine.to_string(),
        condition: format!("{:?}", o.rule),
        flag: o.flag.to_string(),
    });
    let platforms = table.platform_overrides().iter().map(|o| RuleDisplay {
        kind: "platform",
        applies_to: "*".to_string(),
        condition: format!("starts with {:?}", o.prefix),
        flag: o.flag.to_string(),
    });

    base.chain(versions).chain(platforms).collect()
}

/// Print the reference table and report any rule it breaks
pub fn table(format: OutputFormat) -> Result<()> {
    let table = CapabilityTable::reference();
    print_list(&rule_rows(table), format);

    let violations = table.audit();
    if violations.is_empty() {
        if !matches!(format, OutputFormat::Json) {
            print_success("Table is consistent");
        }
        return Ok(());
    }

    for violation in &violations {
        print_error(&violation.to_string());
    }
    anyhow::bail!("capability table has {} violation(s)", violations.len())
}

/// Print the expected flags for an environment
pub fn classify(args: &EnvironmentArgs, base: &EnvironmentConfig, format: OutputFormat) -> Result<()> {
    let env = args.resolve(base);
    debug!(browser = %env.browser, version = %env.version, platform = %env.platform, "Classifying");

    let map = wedtest_common::classify_environment(&env)?;
    if !matches!(format, OutputFormat::Json) {
        print_info(&format!(
            "{} {} on {}",
            env.browser, env.version, env.platform
        ));
    }
    print_list(&flag_rows(&map), format);
    Ok(())
}

/// Compare a reported flag map against the reference; returns whether they agree
pub fn check(args: &CheckArgs, base: &EnvironmentConfig, format: OutputFormat) -> Result<bool> {
    let env = args.environment.resolve(base);
    let content = std::fs::read_to_string(&args.reported)
        .with_context(|| format!("reading {}", args.reported.display()))?;
    let reported: CapabilityMap = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", args.reported.display()))?;

    let mismatches = compare(&env, &reported)?;
    if mismatches.is_empty() {
        print_success(&format!(
            "{} flags match {} {} on {}",
            reported.len(),
            env.browser,
            env.version,
            env.platform
        ));
        return Ok(true);
    }

    let rows: Vec<MismatchDisplay> = mismatches.into_iter().map(Into::into).collect();
    print_error(&format!("{} flag(s) disagree with the reference", rows.len()));
    print_list(&rows, format);
    Ok(false)
}

fn compare(env: &EnvironmentConfig, reported: &CapabilityMap) -> Result<Vec<FlagMismatch>> {
    let expected = wedtest_common::classify_environment(env)?;
    Ok(expected.diff(reported))
}
