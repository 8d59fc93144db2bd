//! Frame-scoped DOM primitives over CDP.
//!
//! The remote editor lives inside an iframe, so every query goes through a
//! small JS prelude that resolves the working document: the embedded frame's
//! `contentDocument` for editor elements, the top document for everything
//! else (login form, the frame element itself).
//!
//! Readiness is always a bounded poll: evaluate a predicate on an interval
//! until it holds or the deadline passes. There are no blind sleeps standing
//! in for synchronization.

use std::time::{Duration, Instant};

use {
    chromiumoxide::{
        Page,
        cdp::browser_protocol::input::{
            DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
            DispatchMouseEventType, InsertTextParams, MouseButton,
        },
    },
    serde_json::Value,
    tracing::debug,
};

use crate::error::EditorError;

/// Bound on waiting for a scrolled element's position to stop moving.
const SCROLL_SETTLE: Duration = Duration::from_millis(500);

/// Quote a CSS selector as a JS string literal.
fn js_str(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

/// A page plus the document all selectors are resolved against.
pub(crate) struct DomScope<'a> {
    page: &'a Page,
    frame: Option<&'a str>,
    poll_interval: Duration,
}

impl<'a> DomScope<'a> {
    /// Scope rooted at the top-level document.
    pub(crate) fn top(page: &'a Page, poll_interval: Duration) -> Self {
        Self {
            page,
            frame: None,
            poll_interval,
        }
    }

    /// Scope rooted at the content document of the iframe matching `frame`.
    pub(crate) fn framed(page: &'a Page, frame: &'a str, poll_interval: Duration) -> Self {
        Self {
            page,
            frame: Some(frame),
            poll_interval,
        }
    }

    /// JS statements binding `fr` (the iframe element or null) and `doc`
    /// (the working document or null).
    fn doc_prelude(&self) -> String {
        match self.frame {
            Some(f) => format!(
                "const fr = document.querySelector({}); \
                 const doc = fr ? fr.contentDocument : null;",
                js_str(f)
            ),
            None => "const fr = null; const doc = document;".to_string(),
        }
    }

    async fn eval_bool(&self, js: &str) -> Result<bool, EditorError> {
        Ok(self
            .page
            .evaluate(js)
            .await
            .map_err(|e| EditorError::Cdp(e.to_string()))?
            .into_value()
            .unwrap_or(false))
    }

    async fn eval_value(&self, js: &str) -> Result<Value, EditorError> {
        self.page
            .evaluate(js)
            .await
            .map_err(|e| EditorError::Cdp(e.to_string()))?
            .into_value()
            .map_err(|e| EditorError::Cdp(format!("decode evaluate result: {e:?}")))
    }

    /// Whether an element matching `selector` currently exists.
    pub(crate) async fn exists(&self, selector: &str) -> Result<bool, EditorError> {
        let js = format!(
            "(() => {{ {} return !!(doc && doc.querySelector({})); }})()",
            self.doc_prelude(),
            js_str(selector)
        );
        self.eval_bool(&js).await
    }

    fn clickable_js(&self, selector: &str) -> String {
        format!(
            "(() => {{ {prelude}
                if (!doc) return false;
                const el = doc.querySelector({sel});
                if (!el) return false;
                const r = el.getBoundingClientRect();
                const st = doc.defaultView.getComputedStyle(el);
                return r.width > 0 && r.height > 0 &&
                       st.visibility !== 'hidden' && st.display !== 'none';
            }})()",
            prelude = self.doc_prelude(),
            sel = js_str(selector)
        )
    }

    /// Poll `predicate_js` until it returns true or `timeout` elapses.
    async fn wait_until(&self, predicate_js: &str, timeout: Duration) -> Result<bool, EditorError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.eval_bool(predicate_js).await? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Wait for an element to be present in the document.
    pub(crate) async fn wait_present(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, EditorError> {
        let js = format!(
            "(() => {{ {} return !!(doc && doc.querySelector({})); }})()",
            self.doc_prelude(),
            js_str(selector)
        );
        self.wait_until(&js, timeout).await
    }

    /// Wait for an element to be present, laid out, and visible.
    pub(crate) async fn wait_clickable(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, EditorError> {
        let js = self.clickable_js(selector);
        self.wait_until(&js, timeout).await
    }

    /// Wait for no element matching `selector` to remain in the document.
    pub(crate) async fn wait_absent(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, EditorError> {
        let js = format!(
            "(() => {{ {} return !(doc && doc.querySelector({})); }})()",
            self.doc_prelude(),
            js_str(selector)
        );
        self.wait_until(&js, timeout).await
    }

    /// Click an element at its center via synthetic mouse events.
    ///
    /// Scrolls the element into view first, then corrects the coordinates by
    /// the iframe offset: CDP mouse events are dispatched in top-viewport
    /// space while rects inside the frame are frame-relative.
    pub(crate) async fn click(&self, selector: &str) -> Result<(), EditorError> {
        let js = format!(
            "(() => {{ {prelude}
                if (!doc) return null;
                const el = doc.querySelector({sel});
                if (!el) return null;
                el.scrollIntoView({{ behavior: 'instant', block: 'center' }});
                const r = el.getBoundingClientRect();
                const off = fr ? fr.getBoundingClientRect() : {{ x: 0, y: 0 }};
                return {{ x: off.x + r.x + r.width / 2, y: off.y + r.y + r.height / 2 }};
            }})()",
            prelude = self.doc_prelude(),
            sel = js_str(selector)
        );

        // Re-sample until the post-scroll position stops moving, so the
        // click is dispatched where the element actually ends up.
        let deadline = Instant::now() + SCROLL_SETTLE;
        let mut center = self.eval_value(&js).await?;
        loop {
            if center.is_null() {
                return Err(EditorError::ElementNotFound(selector.to_string()));
            }
            if Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(self.poll_interval).await;
            let next = self.eval_value(&js).await?;
            if next == center {
                break;
            }
            center = next;
        }

        let x = center["x"]
            .as_f64()
            .ok_or_else(|| EditorError::ElementNotFound(selector.to_string()))?;
        let y = center["y"]
            .as_f64()
            .ok_or_else(|| EditorError::ElementNotFound(selector.to_string()))?;

        let press = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MousePressed)
            .x(x)
            .y(y)
            .button(MouseButton::Left)
            .click_count(1)
            .build()
            .map_err(EditorError::Cdp)?;
        self.page.execute(press).await?;

        let release = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MouseReleased)
            .x(x)
            .y(y)
            .button(MouseButton::Left)
            .click_count(1)
            .build()
            .map_err(EditorError::Cdp)?;
        self.page.execute(release).await?;

        debug!(selector, x, y, "clicked element");
        Ok(())
    }

    /// Programmatic `el.click()`, used when the coordinate click is blocked
    /// by an overlapping element.
    pub(crate) async fn click_js(&self, selector: &str) -> Result<(), EditorError> {
        let js = format!(
            "(() => {{ {prelude}
                if (!doc) return false;
                const el = doc.querySelector({sel});
                if (!el) return false;
                el.click();
                return true;
            }})()",
            prelude = self.doc_prelude(),
            sel = js_str(selector)
        );
        if !self.eval_bool(&js).await? {
            return Err(EditorError::ElementNotFound(selector.to_string()));
        }
        debug!(selector, "clicked element programmatically");
        Ok(())
    }

    /// Rendered text of an element, line breaks included, or `None` when the
    /// element is absent.
    pub(crate) async fn inner_text(&self, selector: &str) -> Result<Option<String>, EditorError> {
        let js = format!(
            "(() => {{ {prelude}
                if (!doc) return null;
                const el = doc.querySelector({sel});
                return el ? el.innerText : null;
            }})()",
            prelude = self.doc_prelude(),
            sel = js_str(selector)
        );
        let value = self.eval_value(&js).await?;
        Ok(value.as_str().map(String::from))
    }

    /// Insert text into the focused element as a single synthetic
    /// text-insertion event (paste-style, no per-key events).
    pub(crate) async fn insert_text(&self, text: &str) -> Result<(), EditorError> {
        let cmd = InsertTextParams::builder()
            .text(text)
            .build()
            .map_err(EditorError::Cdp)?;
        self.page.execute(cmd).await?;
        Ok(())
    }

    /// Dispatch an Enter key press to the focused element.
    pub(crate) async fn press_enter(&self) -> Result<(), EditorError> {
        let down = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyDown)
            .key("Enter")
            .code("Enter")
            .text("\r")
            .windows_virtual_key_code(13)
            .build()
            .map_err(EditorError::Cdp)?;
        self.page.execute(down).await?;

        let up = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyUp)
            .key("Enter")
            .code("Enter")
            .windows_virtual_key_code(13)
            .build()
            .map_err(EditorError::Cdp)?;
        self.page.execute(up).await?;
        Ok(())
    }

    /// Dispatch a Delete key press to the focused element, erasing the
    /// current selection.
    pub(crate) async fn press_delete(&self) -> Result<(), EditorError> {
        let down = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyDown)
            .key("Delete")
            .code("Delete")
            .windows_virtual_key_code(46)
            .build()
            .map_err(EditorError::Cdp)?;
        self.page.execute(down).await?;

        let up = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyUp)
            .key("Delete")
            .code("Delete")
            .windows_virtual_key_code(46)
            .build()
            .map_err(EditorError::Cdp)?;
        self.page.execute(up).await?;
        Ok(())
    }

    /// Type multi-line text into the focused element. The editor treats line
    /// breaks as discrete UI events, so each logical line is inserted as text
    /// and separated by an explicit Enter press.
    pub(crate) async fn type_lines(&self, text: &str) -> Result<(), EditorError> {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.press_enter().await?;
            }
            if !line.is_empty() {
                self.insert_text(line).await?;
            }
        }
        Ok(())
    }

    /// Collapse the caret to the end of the element's content.
    pub(crate) async fn caret_to_end(&self, selector: &str) -> Result<(), EditorError> {
        self.apply_range(selector, /* collapse_to_end = */ true)
            .await
    }

    /// Select the element's entire content.
    pub(crate) async fn select_all(&self, selector: &str) -> Result<(), EditorError> {
        self.apply_range(selector, /* collapse_to_end = */ false)
            .await
    }

    async fn apply_range(&self, selector: &str, collapse_to_end: bool) -> Result<(), EditorError> {
        let js = format!(
            "(() => {{ {prelude}
                if (!doc) return false;
                const el = doc.querySelector({sel});
                if (!el) return false;
                const range = doc.createRange();
                range.selectNodeContents(el);
                {collapse}
                const selection = doc.defaultView.getSelection();
                selection.removeAllRanges();
                selection.addRange(range);
                return true;
            }})()",
            prelude = self.doc_prelude(),
            sel = js_str(selector),
            collapse = if collapse_to_end {
                "range.collapse(false);"
            } else {
                ""
            }
        );
        if !self.eval_bool(&js).await? {
            return Err(EditorError::ElementNotFound(selector.to_string()));
        }
        Ok(())
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_str_quotes_plain_selectors() {
        assert_eq!(js_str("iframe#mainFrame"), r#""iframe#mainFrame""#);
    }

    #[test]
    fn js_str_escapes_quotes_and_backslashes() {
        assert_eq!(js_str(r#"a[title="x"]"#), r#""a[title=\"x\"]""#);
        assert_eq!(js_str(r"#log\.login"), r##""#log\\.login""##);
    }
}
