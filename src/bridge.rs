//! Bridge to the third-party page-translation widget
//!
//! Whole-page machine translation is delegated to a widget that arrives as
//! an external script. The bridge owns the lifecycle of that script:
//!
//! 1. **Unloaded** - nothing injected yet.
//! 2. **Loading** - the script tag is in the document and its init callback
//!    is registered. Entered on the first switch to a non-default language.
//! 3. **Ready** - the callback fired and the widget was constructed on a
//!    hidden element.
//!
//! A language switch drives the select control the widget renders. That
//! control shows up asynchronously, so switching is a bounded poll: look
//! for the control, wait a fixed interval, try again, and give up silently
//! once the retries are spent.
//!
//! # Example
//!
//! ```ignore
//! use civic_i18n::{BridgeConfig, HeadlessPage, LanguageCode, WidgetBridge};
//!
//! #[tokio::main]
//! async fn main() {
//!     let page = HeadlessPage::with_autoload(std::time::Duration::from_millis(50));
//!     let bridge = WidgetBridge::new(page, BridgeConfig::default());
//!     bridge.switch_language(LanguageCode::Es);
//! }
//! ```

use crate::error::I18nResult;
use crate::language::LanguageCode;
use crate::page::{
    Page, ScriptTag, WIDGET_CONTROL_CLASS, WidgetConfig, WidgetHandle, WidgetInit,
    WidgetInitReceiver,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Where the widget comes from and how to drive it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub script_src: String,
    pub script_id: String,
    /// Global function name the script invokes once loaded
    pub callback_name: String,
    /// Hidden element the widget is constructed on
    pub element_id: String,
    /// CSS class of the select control the widget renders
    pub control_class: String,
    pub widget: WidgetConfig,
    /// Retries after the first lookup of the control
    pub max_retries: u32,
    pub retry_interval: Duration,
    /// Grace period before the first lookup when a switch starts loading
    pub initial_delay: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            script_src: concat!(
                "//translate.google.com/translate_a/element.js",
                "?cb=googleTranslateElementInit"
            )
            .to_string(),
            script_id: "google-translate-script".to_string(),
            callback_name: "googleTranslateElementInit".to_string(),
            element_id: "hidden_translate_element".to_string(),
            control_class: WIDGET_CONTROL_CLASS.to_string(),
            widget: WidgetConfig::default(),
            max_retries: 10,
            retry_interval: Duration::from_millis(300),
            initial_delay: Duration::from_millis(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Unloaded,
    Loading,
    Ready,
}

/// Flag view of the bridge lifecycle.
///
/// Moves from `{false, false}` to `{true, false}` when the tag is inserted
/// and to `{true, true}` when the init callback fires. Never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExternalBridgeState {
    pub script_inserted: bool,
    pub widget_ready: bool,
}

/// Result of driving the widget's select control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The control was found on lookup number `attempts`
    Applied { attempts: u32 },
    /// Every lookup came up empty
    Exhausted,
}

/// The single script slot of the document.
///
/// `injected` is a one-time guard: it stays set after release so the
/// script is never inserted twice in a session. `tag` is only recorded once
/// the page accepted the insertion, so teardown never removes an element
/// this bridge does not own.
#[derive(Debug, Default)]
struct ScriptSlot {
    injected: bool,
    tag: Option<ScriptTag>,
}

impl ScriptSlot {
    fn acquire(&mut self) -> bool {
        if self.injected {
            return false;
        }
        self.injected = true;
        true
    }

    fn commit(&mut self, tag: ScriptTag) {
        self.tag = Some(tag);
    }

    fn release(&mut self) -> Option<ScriptTag> {
        self.tag.take()
    }
}

struct BridgeInner {
    state: BridgeState,
    slot: ScriptSlot,
    widget: Option<WidgetHandle>,
    tasks: JoinSet<()>,
    torn_down: bool,
}

struct BridgeShared {
    config: BridgeConfig,
    page: Arc<dyn Page>,
    inner: Mutex<BridgeInner>,
}

/// Handle to the widget bridge. Clones share the same bridge.
#[derive(Clone)]
pub struct WidgetBridge {
    shared: Arc<BridgeShared>,
}

impl WidgetBridge {
    pub fn new(page: Arc<dyn Page>, config: BridgeConfig) -> Self {
        Self {
            shared: Arc::new(BridgeShared {
                config,
                page,
                inner: Mutex::new(BridgeInner {
                    state: BridgeState::Unloaded,
                    slot: ScriptSlot::default(),
                    widget: None,
                    tasks: JoinSet::new(),
                    torn_down: false,
                }),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BridgeInner> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.shared.config
    }

    pub fn state(&self) -> BridgeState {
        self.lock().state
    }

    pub fn external_state(&self) -> ExternalBridgeState {
        match self.state() {
            BridgeState::Unloaded => ExternalBridgeState::default(),
            BridgeState::Loading => ExternalBridgeState {
                script_inserted: true,
                widget_ready: false,
            },
            BridgeState::Ready => ExternalBridgeState {
                script_inserted: true,
                widget_ready: true,
            },
        }
    }

    /// The widget API, once the script has loaded
    pub fn widget(&self) -> Option<WidgetHandle> {
        self.lock().widget.clone()
    }

    /// Background tasks (init wait and polls) that have not finished yet
    pub fn pending_tasks(&self) -> usize {
        let mut inner = self.lock();
        while inner.tasks.try_join_next().is_some() {}
        inner.tasks.len()
    }

    /// Retranslate the page into `language` through the widget.
    ///
    /// Loads the widget on the first switch to a non-default language. The
    /// control is driven in the background; this returns immediately.
    /// Consecutive switches are independent and may race: only the last
    /// applied value is guaranteed to stick. Must be called within a Tokio
    /// runtime.
    pub fn switch_language(&self, language: LanguageCode) {
        let mut inner = self.lock();
        if inner.torn_down {
            debug!("Bridge torn down, ignoring switch to {}", language);
            return;
        }
        while inner.tasks.try_join_next().is_some() {}

        let mut delay = Duration::ZERO;
        if inner.state == BridgeState::Unloaded {
            if language.is_default() {
                debug!("Page already in {}, translation widget not needed", language);
                return;
            }
            if let Err(e) = self.begin_loading(&mut inner) {
                error!("Failed to inject translation script: {}", e);
                return;
            }
            delay = self.shared.config.initial_delay;
        }

        let bridge = self.clone();
        inner.tasks.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            bridge.apply_language(language).await;
        });
    }

    fn begin_loading(&self, inner: &mut BridgeInner) -> I18nResult<()> {
        let config = &self.shared.config;
        let tag = ScriptTag {
            id: config.script_id.clone(),
            src: config.script_src.clone(),
            callback: config.callback_name.clone(),
        };
        if !inner.slot.acquire() {
            return Ok(());
        }

        let (init, receiver) = WidgetInit::channel();
        inner.state = BridgeState::Loading;
        info!("Injecting translation script {}", tag.src);
        self.shared.page.insert_script(tag.clone(), init)?;
        inner.slot.commit(tag);

        let bridge = self.clone();
        inner.tasks.spawn(async move { bridge.await_widget(receiver).await });
        Ok(())
    }

    async fn await_widget(&self, receiver: WidgetInitReceiver) {
        let widget = match receiver.await {
            Ok(Ok(widget)) => widget,
            Ok(Err(reason)) => {
                error!("Failed to load translation script: {}", reason);
                return;
            }
            Err(_) => {
                debug!("Translation script callback dropped before firing");
                return;
            }
        };

        let config = &self.shared.config;
        if let Err(e) = widget.init_widget(&config.widget, &config.element_id) {
            error!("Error initializing translation widget: {}", e);
            return;
        }

        let mut inner = self.lock();
        inner.widget = Some(widget);
        inner.state = BridgeState::Ready;
        info!("Translation widget ready on #{}", config.element_id);
    }

    /// Drive the widget's select control to `language`.
    ///
    /// Looks the control up once, then up to `max_retries` more times
    /// `retry_interval` apart. Never fails: a control that never shows up
    /// yields [`PollOutcome::Exhausted`] and leaves nothing scheduled.
    pub async fn apply_language(&self, language: LanguageCode) -> PollOutcome {
        let config = &self.shared.config;
        let lookups = config.max_retries.saturating_add(1);

        for attempt in 1..=lookups {
            if let Some(control) = self.shared.page.find_control(&config.control_class) {
                control.set_value(language.code());
                control.dispatch_change();
                info!("Page translation switched to {} (lookup {})", language, attempt);
                return PollOutcome::Applied { attempts: attempt };
            }
            if attempt < lookups {
                tokio::time::sleep(config.retry_interval).await;
            }
        }

        debug!(
            "Translation control .{} not found after {} lookups, giving up",
            config.control_class, lookups
        );
        PollOutcome::Exhausted
    }

    /// Release page resources: cancel background tasks, remove the script
    /// tag, delete the init callback.
    ///
    /// A widget that became ready stays ready; third-party globals cannot
    /// be unloaded. Later switches are ignored.
    pub fn teardown(&self) {
        let mut inner = self.lock();
        if inner.torn_down {
            return;
        }
        inner.torn_down = true;
        // Dropping the set aborts everything still running
        inner.tasks = JoinSet::new();

        if let Some(tag) = inner.slot.release() {
            let page = &self.shared.page;
            if !page.remove_script(&tag.id) {
                warn!("Translation script {} was already gone", tag.id);
            }
            page.unregister_callback(&tag.callback);
        }
        debug!("Translation bridge torn down in state {:?}", inner.state);
    }
}
