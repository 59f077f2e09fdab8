//! Host page abstraction
//!
//! The translation subsystem touches the hosting document in four places:
//! the root `lang`/`dir` attributes, one injected script tag, the init
//! callback that script invokes, and the language select control rendered
//! by the third-party widget. `Page` is the narrow interface over those,
//! and `TranslateWidget` is the single point of contact with the untyped
//! third-party translation object.
//!
//! `HeadlessPage` implements both in memory. It backs the CLI and the tests.

use crate::error::{I18nError, I18nResult};
use crate::language::{Direction, LanguageCode};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

/// Class of the language select control the widget renders
pub const WIDGET_CONTROL_CLASS: &str = "goog-te-combo";

/// A script element to insert into the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub id: String,
    pub src: String,
    /// Name of the global function the script calls once loaded
    pub callback: String,
}

/// How the widget lays out its own language picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WidgetLayout {
    Vertical,
    Horizontal,
    Simple,
}

/// Options passed to the widget constructor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub page_language: String,
    /// Comma-joined when handed to the widget; `None` offers every language
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_joined"
    )]
    pub included_languages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<WidgetLayout>,
    pub auto_display: bool,
}

fn serialize_joined<S: Serializer>(
    languages: &Option<Vec<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match languages {
        Some(languages) => serializer.serialize_str(&languages.join(",")),
        None => serializer.serialize_none(),
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            page_language: LanguageCode::DEFAULT.code().to_string(),
            included_languages: None,
            layout: None,
            auto_display: false,
        }
    }
}

/// The third-party translation object, as far as this crate uses it
pub trait TranslateWidget: Send + Sync {
    /// Construct the widget inside the element with id `element_id`
    fn init_widget(&self, config: &WidgetConfig, element_id: &str) -> I18nResult<()>;
}

pub type WidgetHandle = Arc<dyn TranslateWidget>;

/// A `<select>`-like control rendered by the widget
pub trait SelectControl: Send + Sync {
    fn set_value(&self, value: &str);
    fn dispatch_change(&self);
}

/// One-shot completion handed to the page with the script tag.
///
/// The page resolves it when the script invokes its init callback, either
/// with the loaded widget API or with the reason loading failed. Dropping
/// it unresolved is the same as the callback never firing.
#[derive(Debug)]
pub struct WidgetInit(oneshot::Sender<Result<WidgetHandle, String>>);

pub(crate) type WidgetInitReceiver = oneshot::Receiver<Result<WidgetHandle, String>>;

impl WidgetInit {
    pub(crate) fn channel() -> (WidgetInit, WidgetInitReceiver) {
        let (tx, rx) = oneshot::channel();
        (WidgetInit(tx), rx)
    }

    /// Returns `false` when nobody is waiting any more
    pub fn complete(self, widget: WidgetHandle) -> bool {
        self.0.send(Ok(widget)).is_ok()
    }

    pub fn fail(self, reason: impl Into<String>) -> bool {
        self.0.send(Err(reason.into())).is_ok()
    }
}

impl std::fmt::Debug for dyn TranslateWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TranslateWidget")
    }
}

/// The document hosting the client
pub trait Page: Send + Sync {
    /// Write the root element's `lang` and `dir` attributes
    fn set_document_language(&self, language: LanguageCode, direction: Direction);

    /// Insert `tag` and register `init` under `tag.callback`
    fn insert_script(&self, tag: ScriptTag, init: WidgetInit) -> I18nResult<()>;

    /// Remove the script element with `id`. Returns whether it was present.
    fn remove_script(&self, id: &str) -> bool;

    /// Delete the global callback `name`. Returns whether it was registered.
    fn unregister_callback(&self, name: &str) -> bool;

    /// First control carrying the CSS class `class`
    fn find_control(&self, class: &str) -> Option<Arc<dyn SelectControl>>;
}

#[derive(Default)]
struct HeadlessState {
    language: Option<LanguageCode>,
    direction: Option<Direction>,
    scripts: Vec<ScriptTag>,
    script_insertions: usize,
    callbacks: HashMap<String, WidgetInit>,
    controls: HashMap<String, Arc<HeadlessSelect>>,
}

/// In-memory page.
///
/// Scripts never load by themselves unless the page was built with
/// [`HeadlessPage::with_autoload`]; tests drive loading explicitly through
/// [`HeadlessPage::load_script`] and [`HeadlessPage::fail_script`].
pub struct HeadlessPage {
    this: Weak<HeadlessPage>,
    autoload: Option<Duration>,
    state: Mutex<HeadlessState>,
}

impl HeadlessPage {
    pub fn new() -> Arc<Self> {
        Self::build(None)
    }

    /// A page whose scripts load `delay` after insertion and hand over a
    /// widget that renders its select control on init
    pub fn with_autoload(delay: Duration) -> Arc<Self> {
        Self::build(Some(delay))
    }

    fn build(autoload: Option<Duration>) -> Arc<Self> {
        Arc::new_cyclic(|this| HeadlessPage {
            this: this.clone(),
            autoload,
            state: Mutex::new(HeadlessState::default()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A widget bound to this page. It renders the select control on init.
    pub fn widget(&self) -> Arc<HeadlessWidget> {
        Arc::new(HeadlessWidget::new(self.this.clone(), true))
    }

    /// A widget that initializes but never renders its select control
    pub fn inert_widget(&self) -> Arc<HeadlessWidget> {
        Arc::new(HeadlessWidget::new(self.this.clone(), false))
    }

    pub fn document_language(&self) -> Option<LanguageCode> {
        self.lock().language
    }

    pub fn document_direction(&self) -> Option<Direction> {
        self.lock().direction
    }

    /// Scripts currently in the document
    pub fn scripts(&self) -> Vec<ScriptTag> {
        self.lock().scripts.clone()
    }

    /// Total insertions over the page's lifetime, removals included
    pub fn script_insertions(&self) -> usize {
        self.lock().script_insertions
    }

    pub fn has_callback(&self, name: &str) -> bool {
        self.lock().callbacks.contains_key(name)
    }

    /// Simulate the script invoking its init callback.
    ///
    /// Returns `false` when no callback is registered under `callback` or
    /// its receiver has gone away.
    pub fn load_script(&self, callback: &str, widget: WidgetHandle) -> bool {
        let init = self.lock().callbacks.remove(callback);
        init.is_some_and(|init| init.complete(widget))
    }

    /// Simulate a network failure loading the script
    pub fn fail_script(&self, callback: &str, reason: &str) -> bool {
        let init = self.lock().callbacks.remove(callback);
        init.is_some_and(|init| init.fail(reason))
    }

    /// Render a select control with `class`, replacing any existing one
    pub fn add_control(&self, class: &str) -> Arc<HeadlessSelect> {
        let control = Arc::new(HeadlessSelect::default());
        self.lock()
            .controls
            .insert(class.to_string(), Arc::clone(&control));
        control
    }

    pub fn control(&self, class: &str) -> Option<Arc<HeadlessSelect>> {
        self.lock().controls.get(class).cloned()
    }
}

impl Page for HeadlessPage {
    fn set_document_language(&self, language: LanguageCode, direction: Direction) {
        let mut state = self.lock();
        state.language = Some(language);
        state.direction = Some(direction);
    }

    fn insert_script(&self, tag: ScriptTag, init: WidgetInit) -> I18nResult<()> {
        let callback = tag.callback.clone();
        {
            let mut state = self.lock();
            if state.scripts.iter().any(|s| s.id == tag.id) {
                return Err(I18nError::ScriptLoad(format!(
                    "script '{}' is already in the document",
                    tag.id
                )));
            }
            debug!("Inserting script {} ({})", tag.id, tag.src);
            state.scripts.push(tag);
            state.script_insertions += 1;
            state.callbacks.insert(callback.clone(), init);
        }

        if let Some(delay) = self.autoload {
            let this = self.this.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Some(page) = this.upgrade() {
                    let widget = page.widget();
                    page.load_script(&callback, widget);
                }
            });
        }
        Ok(())
    }

    fn remove_script(&self, id: &str) -> bool {
        let mut state = self.lock();
        let before = state.scripts.len();
        state.scripts.retain(|s| s.id != id);
        state.scripts.len() != before
    }

    fn unregister_callback(&self, name: &str) -> bool {
        self.lock().callbacks.remove(name).is_some()
    }

    fn find_control(&self, class: &str) -> Option<Arc<dyn SelectControl>> {
        self.control(class)
            .map(|control| control as Arc<dyn SelectControl>)
    }
}

/// Widget stand-in that records how it was initialized
pub struct HeadlessWidget {
    page: Weak<HeadlessPage>,
    render_control: bool,
    initialized: Mutex<Option<(WidgetConfig, String)>>,
}

impl HeadlessWidget {
    fn new(page: Weak<HeadlessPage>, render_control: bool) -> Self {
        Self {
            page,
            render_control,
            initialized: Mutex::new(None),
        }
    }

    /// The configuration and element id of the last `init_widget` call
    pub fn initialized_with(&self) -> Option<(WidgetConfig, String)> {
        self.initialized
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TranslateWidget for HeadlessWidget {
    fn init_widget(&self, config: &WidgetConfig, element_id: &str) -> I18nResult<()> {
        if element_id.is_empty() {
            return Err(I18nError::Widget("missing container element".to_string()));
        }
        *self.initialized.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((config.clone(), element_id.to_string()));

        if self.render_control {
            if let Some(page) = self.page.upgrade() {
                page.add_control(WIDGET_CONTROL_CLASS);
            }
        }
        Ok(())
    }
}

/// Select control stand-in that records writes and change events
#[derive(Debug, Default)]
pub struct HeadlessSelect {
    value: Mutex<Option<String>>,
    changes: Mutex<Vec<String>>,
}

impl HeadlessSelect {
    pub fn value(&self) -> Option<String> {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The control's value at each dispatched change event
    pub fn change_events(&self) -> Vec<String> {
        self.changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SelectControl for HeadlessSelect {
    fn set_value(&self, value: &str) {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(value.to_string());
    }

    fn dispatch_change(&self) {
        let value = self.value().unwrap_or_default();
        self.changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value);
    }
}
