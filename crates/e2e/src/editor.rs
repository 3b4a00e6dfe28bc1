//! Waits on the editor's own update loop: scrolling, caret, focus,
//! validation
//!
//! Every action script here is a read-after-write probe. It does nothing
//! and returns `null` until the page is ready for it, then performs the
//! action once and returns the observed result in the same round trip.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};
use wedtest_common::capabilities::MSIE_TO_10;
use wedtest_common::{changed_from, Readiness, Remote};

use crate::error::{E2eError, E2eResult};
use crate::session::{decode, probe, sample, truthy, EditorSession};

const CARET_SCREEN_POSITION: &str = r#"
var editor = window.wed_editor;
var caret = editor && editor._$fake_caret && editor._$fake_caret[0];
if (!caret || !caret.parentNode) return null;
var rect = caret.getBoundingClientRect();
return {left: rect.left, top: rect.top};
"#;

const SCROLL_EDITOR_PANE: &str = r#"
if (document.readyState !== "complete" || !window.wed_editor) return null;
var scroller = window.wed_editor._scroller;
var by = arguments[0] === null ? scroller.scrollHeight : arguments[0];
scroller.scrollTop += by;
return scroller.scrollTop;
"#;

const EDITOR_PANE_SCROLL_TOP: &str = "return window.wed_editor._scroller.scrollTop;";

const SCROLL_WINDOW: &str = r#"
if (document.readyState !== "complete") return null;
var target = arguments[0];
if (target.to === "bottom") {
    window.scrollTo(0, document.body.scrollHeight);
} else if (target.to === "editor_top") {
    if (!window.wed_editor) return null;
    window.scrollTo(0, window.wed_editor._$scroller.offset().top);
} else {
    window.scrollTo(0, window.pageYOffset + target.by);
}
return {top: window.pageYOffset, left: window.pageXOffset};
"#;

const WINDOW_OFFSETS: &str = "return {top: window.pageYOffset, left: window.pageXOffset};";

const EDITOR_FOCUSED: &str = r#"
return !!window.wed_editor &&
    window.document.activeElement === window.wed_editor._$input_field[0];
"#;

const FIRST_VALIDATION_COMPLETE: &str =
    "return !!window.wed_editor && window.wed_editor._first_validation_complete === true;";

/// Pixels IE 10 and earlier may drift after an unrelated action
const MSIE_SCROLL_DRIFT: f64 = 2.0;

/// Caret location in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaretPosition {
    pub left: f64,
    pub top: f64,
}

/// Window scroll offsets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowOffsets {
    pub top: f64,
    pub left: f64,
}

/// How far to scroll the editor pane
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaneScroll {
    By(f64),
    /// By the pane's full scroll height
    Completely,
}

/// Where to scroll the browser window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "to", rename_all = "snake_case")]
pub enum WindowScroll {
    Bottom,
    By { by: f64 },
    EditorTop,
}

/// Result of scrolling the editor pane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneScrolled {
    pub scroll_top: f64,
    /// Where the caret ended up, when its starting point was known
    pub caret: Option<CaretPosition>,
}

impl EditorSession {
    pub async fn caret_screen_position(&self) -> E2eResult<Option<CaretPosition>> {
        self.query("caret position", CARET_SCREEN_POSITION, &[]).await
    }

    /// Wait until the caret is somewhere other than `before`
    ///
    /// `None` means "no caret"; waiting from `None` ends when a caret
    /// appears.
    pub async fn wait_for_caret_change(
        &self,
        before: Option<CaretPosition>,
    ) -> E2eResult<Option<CaretPosition>> {
        let caret = sample(|remote: &Remote| {
            Box::pin(async move {
                let value = remote.execute(CARET_SCREEN_POSITION, &[]).await?;
                decode::<Option<CaretPosition>>("caret position", value)
            })
        });
        self.wait(changed_from(caret, before)).await
    }

    /// Scroll the editor pane once the page is ready and return its new
    /// scroll top; if `caret_before` is given, also wait for the caret
    /// to move in response
    pub async fn scroll_editor_pane(
        &self,
        amount: PaneScroll,
        caret_before: Option<CaretPosition>,
    ) -> E2eResult<PaneScrolled> {
        let by = match amount {
            PaneScroll::By(px) => json!(px),
            PaneScroll::Completely => Value::Null,
        };

        let scroll = probe(move |remote: &Remote| {
            let args = [by.clone()];
            Box::pin(async move {
                let value = remote.execute(SCROLL_EDITOR_PANE, &args).await?;
                decode::<Option<f64>>("editor pane scroll top", value).map(Readiness::from)
            })
        });
        let scroll_top = self.wait(scroll).await?;
        debug!(scroll_top, "Editor pane scrolled");

        let caret = match caret_before {
            Some(before) => self.wait_for_caret_change(Some(before)).await?,
            None => None,
        };

        Ok(PaneScrolled { scroll_top, caret })
    }

    pub async fn editor_pane_scroll_top(&self) -> E2eResult<f64> {
        self.query("editor pane scroll top", EDITOR_PANE_SCROLL_TOP, &[]).await
    }

    /// Fail unless the editor pane is still at `scroll_top`
    ///
    /// IE 10 and earlier shift the pane by a pixel or two on their own,
    /// so those sessions get a small tolerance.
    pub async fn assert_editor_pane_did_not_scroll(&self, scroll_top: f64) -> E2eResult<()> {
        let now = self.editor_pane_scroll_top().await?;
        let tolerance = if self.capabilities()?.is_set(MSIE_TO_10) {
            MSIE_SCROLL_DRIFT
        } else {
            0.0
        };

        if (now - scroll_top).abs() > tolerance {
            return Err(E2eError::AssertionFailed(format!(
                "editor pane scroll top changed from {} to {}",
                scroll_top, now
            )));
        }
        Ok(())
    }

    /// Scroll the window once the page is ready; returns the new offsets
    pub async fn scroll_window(&self, target: WindowScroll) -> E2eResult<WindowOffsets> {
        let target = serde_json::to_value(target)?;

        let scroll = probe(move |remote: &Remote| {
            let args = [target.clone()];
            Box::pin(async move {
                let value = remote.execute(SCROLL_WINDOW, &args).await?;
                decode::<Option<WindowOffsets>>("window offsets", value).map(Readiness::from)
            })
        });
        self.wait(scroll).await
    }

    pub async fn window_offsets(&self) -> E2eResult<WindowOffsets> {
        self.query("window offsets", WINDOW_OFFSETS, &[]).await
    }

    pub async fn assert_window_did_not_move(&self, before: WindowOffsets) -> E2eResult<()> {
        let now = self.window_offsets().await?;
        if now != before {
            return Err(E2eError::AssertionFailed(format!(
                "window offsets changed from {:?} to {:?}",
                before, now
            )));
        }
        Ok(())
    }

    pub async fn wait_for_editor_focus(&self) -> E2eResult<()> {
        self.wait(truthy("editor focus", EDITOR_FOCUSED)).await
    }

    pub async fn wait_for_first_validation_complete(&self) -> E2eResult<()> {
        self.wait(truthy("first validation", FIRST_VALIDATION_COMPLETE)).await?;
        info!("First validation complete");
        Ok(())
    }
}
