//! Step layer for driving the wed editor in a remote browser
//!
//! Builds the waits a scenario needs between actions on top of the
//! harness core. Each wait is a probe over [`wedtest_common::Remote`]
//! handed to the session's [`wedtest_common::Poller`].
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  step definitions (external)                             │
//! ├──────────────────────────────────────────────────────────┤
//! │  EditorSession                                           │
//! │    ├── scroll_editor_pane / scroll_window                │
//! │    ├── wait_for_caret_change / wait_for_editor_focus     │
//! │    ├── wait_for_window_count / wait_for_new_window       │
//! │    ├── wait_for_first_validation_complete                │
//! │    └── check_platform_variations ── classify()           │
//! │  ControlClient (reset, fail_on_save)                     │
//! ├──────────────────────────────────────────────────────────┤
//! │  RemoteStateSource (browser-automation transport)        │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod control;
pub mod editor;
pub mod error;
pub mod platform;
pub mod session;
pub mod windows;

pub use control::ControlClient;
pub use editor::{CaretPosition, PaneScroll, PaneScrolled, WindowOffsets, WindowScroll};
pub use error::{E2eError, E2eResult};
pub use platform::{BrowserDetection, MatchTest, PlatformReport};
pub use session::EditorSession;
