//! Window and tab bookkeeping

use tracing::debug;
use wedtest_common::{until_count, Readiness, Remote};

use crate::error::{E2eError, E2eResult};
use crate::session::{probe, truthy, EditorSession};

const DOCUMENT_HAS_FOCUS: &str = "return document.hasFocus();";

impl EditorSession {
    pub async fn window_handles(&self) -> E2eResult<Vec<String>> {
        Ok(self.remote().window_handles().await?)
    }

    /// Wait until exactly `count` windows are open
    pub async fn wait_for_window_count(&self, count: usize) -> E2eResult<usize> {
        let open = probe(|remote: &Remote| {
            Box::pin(async move {
                let handles = remote.window_handles().await?;
                Ok::<_, E2eError>(Readiness::Ready(handles.len()))
            })
        });
        self.wait(until_count(open, count)).await
    }

    /// Wait for one window more than `before`; returns the handles that
    /// were not in `before`
    pub async fn wait_for_new_window(&self, before: &[String]) -> E2eResult<Vec<String>> {
        let count = self.wait_for_window_count(before.len() + 1).await?;
        debug!(count, "New window opened");

        let handles = self.window_handles().await?;
        Ok(handles
            .into_iter()
            .filter(|handle| !before.contains(handle))
            .collect())
    }

    /// Wait until the current window's document has focus
    pub async fn wait_for_document_focus(&self) -> E2eResult<()> {
        self.wait(truthy("document focus", DOCUMENT_HAS_FOCUS)).await
    }
}
