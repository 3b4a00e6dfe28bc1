//! Checking the editor's browser detection against the reference table
//!
//! The platform test page echoes back the browser, version and platform
//! it was loaded for and exposes the editor's `wed/browsers` module. The
//! flags in that module must equal what [`wedtest_common::classify`]
//! computes for the same triple.

use serde::{Deserialize, Serialize};
use tracing::info;
use wedtest_common::capabilities::{FIREFOX, MSIE};
use wedtest_common::{CapabilityMap, EnvironmentConfig, Readiness, Remote};

use crate::error::{E2eError, E2eResult};
use crate::session::{decode, probe, EditorSession};

const PLATFORM_PARAMETERS: &str =
    "return [window.test_platform, window.test_browser, window.test_version];";

const BROWSER_DETECTION: &str = r#"
if (!window.require) return null;
if (!require.defined("wed/browsers")) {
    require(["wed/browsers"], function () {});
    return null;
}
var browsers = require("wed/browsers");
var flags = {};
Object.keys(browsers).forEach(function (name) {
    flags[name] = browsers[name];
});
return {
    flags: flags,
    match_tests: [
        {name: "positive match", result: document.body.matches("body")},
        {name: "negative match", result: !document.body.matches("foo")}
    ]
};
"#;

/// One of the page's element-matching self-tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTest {
    pub name: String,
    pub result: bool,
}

/// What the editor detected about its host browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserDetection {
    pub flags: CapabilityMap,
    pub match_tests: Vec<MatchTest>,
}

/// Outcome of a successful platform check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformReport {
    pub environment: EnvironmentConfig,
    pub flags: CapabilityMap,
    pub match_tests: Vec<MatchTest>,
}

impl EditorSession {
    /// Wait until the platform page reports the parameters it was loaded
    /// with
    pub async fn wait_for_platform_parameters(&self) -> E2eResult<EnvironmentConfig> {
        let parameters = probe(|remote: &Remote| {
            Box::pin(async move {
                let value = remote.execute(PLATFORM_PARAMETERS, &[]).await?;
                let [platform, browser, version] =
                    decode::<[Option<String>; 3]>("platform parameters", value)?;
                Ok::<_, E2eError>(match (platform, browser, version) {
                    (Some(platform), Some(browser), Some(version)) => {
                        Readiness::Ready(EnvironmentConfig {
                            browser,
                            version,
                            platform,
                        })
                    }
                    _ => Readiness::NotReady,
                })
            })
        });
        self.wait(parameters).await
    }

    /// Wait for the editor's browser detection module and read it
    pub async fn browser_detection(&self) -> E2eResult<BrowserDetection> {
        let detection = probe(|remote: &Remote| {
            Box::pin(async move {
                let value = remote.execute(BROWSER_DETECTION, &[]).await?;
                decode::<Option<BrowserDetection>>("browser detection", value)
                    .map(Readiness::from)
            })
        });
        self.wait(detection).await
    }

    /// Check that the page was loaded for the configured session and that
    /// the editor's detected flags match the reference table exactly
    pub async fn check_platform_variations(&self) -> E2eResult<PlatformReport> {
        let expected = self.capabilities()?;
        let environment = self.environment();

        let reported = self.wait_for_platform_parameters().await?;
        if &reported != environment {
            return Err(E2eError::AssertionFailed(format!(
                "platform page was loaded for {} {} on {:?}, expected {} {} on {:?}",
                reported.browser,
                reported.version,
                reported.platform,
                environment.browser,
                environment.version,
                environment.platform
            )));
        }

        let detection = self.browser_detection().await?;
        let mismatches = expected.diff(&detection.flags);
        if !mismatches.is_empty() {
            return Err(E2eError::CapabilityMismatch {
                browser: format!("{} {}", environment.browser, environment.version),
                mismatches,
            });
        }

        if let Some(failed) = detection.match_tests.iter().find(|t| !t.result) {
            return Err(E2eError::AssertionFailed(format!(
                "{} should be true",
                failed.name
            )));
        }

        info!(
            browser = %environment.browser,
            version = %environment.version,
            platform = %environment.platform,
            "Platform variations handled"
        );

        Ok(PlatformReport {
            environment: environment.clone(),
            flags: expected,
            match_tests: detection.match_tests,
        })
    }

    /// Whether a reload prompt in this browser shows the page's own text
    ///
    /// Firefox never does, and IE's driver cannot read it.
    pub fn reload_prompt_text_is_checkable(&self) -> E2eResult<bool> {
        let caps = self.capabilities()?;
        Ok(!(caps.is_set(FIREFOX) || caps.is_set(MSIE)))
    }
}
