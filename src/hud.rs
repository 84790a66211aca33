//! Side panel
//!
//! `HudModel` is what the panel shows; `DomHud` writes it into the page.

use crate::clock::Clock;
use crate::session::SessionController;

pub const SESSION_ID_ELEMENT: &str = "session-id";
pub const TIME_LEFT_ELEMENT: &str = "time-left";
pub const SESSIONS_ELEMENT: &str = "sessions";
pub const START_BUTTON_ELEMENT: &str = "start-session";

/// Text shown in the side panel
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HudModel {
    pub session_id: String,
    pub time_left: String,
    /// One line per completed session, oldest first
    pub lines: Vec<String>,
}

impl HudModel {
    pub fn from_controller<C: Clock>(controller: &SessionController<C>) -> Self {
        Self {
            session_id: controller
                .session_id()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            time_left: format_time_left(controller.remaining()),
            lines: controller.log().iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub fn format_time_left(seconds: u32) -> String {
    format!("{} seconds", seconds)
}

#[cfg(target_arch = "wasm32")]
pub use dom::DomHud;

#[cfg(target_arch = "wasm32")]
mod dom {
    use web_sys::Document;

    use super::*;

    /// Writes the HUD into `#session-id`, `#time-left` and `#sessions`
    pub struct DomHud {
        document: Document,
        rendered_revision: Option<u64>,
        rendered_lines: usize,
    }

    impl DomHud {
        pub fn new(document: Document) -> Self {
            Self {
                document,
                rendered_revision: None,
                rendered_lines: 0,
            }
        }

        /// Re-render if the controller changed since the last call
        pub fn sync<C: Clock>(&mut self, controller: &SessionController<C>) {
            if self.rendered_revision == Some(controller.revision()) {
                return;
            }
            let model = HudModel::from_controller(controller);
            self.apply(&model);
            self.rendered_revision = Some(controller.revision());
        }

        fn apply(&mut self, model: &HudModel) {
            if let Some(el) = self.document.get_element_by_id(SESSION_ID_ELEMENT) {
                el.set_text_content(Some(&model.session_id));
            }
            if let Some(el) = self.document.get_element_by_id(TIME_LEFT_ELEMENT) {
                el.set_text_content(Some(&model.time_left));
            }

            // The log only grows, so append just the new lines
            let Some(list) = self.document.get_element_by_id(SESSIONS_ELEMENT) else {
                return;
            };
            for line in model.lines.iter().skip(self.rendered_lines) {
                match self.document.create_element("li") {
                    Ok(item) => {
                        item.set_text_content(Some(line));
                        if let Err(e) = list.append_child(&item) {
                            log::warn!("Failed to append session line: {:?}", e);
                            return;
                        }
                        self.rendered_lines += 1;
                    }
                    Err(e) => {
                        log::warn!("Failed to create session line: {:?}", e);
                        return;
                    }
                }
            }
        }
    }
}
