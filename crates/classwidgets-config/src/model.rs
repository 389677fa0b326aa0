// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Class Widgets.
//!
//! All sections use `#[serde(deny_unknown_fields)]` so an unrecognized key
//! rejects the whole document. Each section carries a skipped `sink` field
//! through which it reports mutations (see [`crate::node`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::node::{ChangeSink, config_node};

/// Identifier of the plugin enabled on first start.
pub const DEFAULT_ENABLED_PLUGIN: &str = "builtin.classwidgets.widgets";

/// Top-level configuration tree.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RootConfig {
    /// Application identity and startup behaviour.
    #[serde(default)]
    pub app: AppConfig,

    /// User interface language.
    #[serde(default)]
    pub locale: LocaleConfig,

    /// Schedule selection and timing defaults.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Appearance and widget layout.
    #[serde(default)]
    pub preferences: PreferencesConfig,

    /// Hover and auto-hide behaviour.
    #[serde(default)]
    pub interactions: InteractionsConfig,

    /// Enabled plugins and plugin-owned settings.
    #[serde(default)]
    pub plugins: PluginsConfig,

    /// Update and mirror settings.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Notification switches and per-provider policies.
    #[serde(default)]
    pub notifications: NotificationsConfig,

    #[serde(skip)]
    pub(crate) sink: ChangeSink,
}

config_node!(RootConfig; app, locale, schedule, preferences, interactions, plugins, network, notifications);

impl RootConfig {
    /// Default tree stamped with the given build version and channel.
    pub fn for_build(version: &str, channel: &str) -> Self {
        let mut root = Self::default();
        root.app.version = version.to_string();
        root.app.channel = channel.to_string();
        root
    }
}

/// Application identity and startup behaviour.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub debug_mode: bool,

    /// Suppress everything below error level.
    #[serde(default)]
    pub no_logs: bool,

    /// Build version that last wrote the file.
    #[serde(default = "default_version")]
    pub version: String,

    /// Release channel that last wrote the file.
    #[serde(default = "default_channel")]
    pub channel: String,

    #[serde(default)]
    pub tutorial_completed: bool,

    #[serde(default)]
    pub auto_startup: bool,

    #[serde(skip)]
    pub(crate) sink: ChangeSink,
}

config_node!(AppConfig);

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            no_logs: false,
            version: default_version(),
            channel: default_channel(),
            tutorial_completed: false,
            auto_startup: false,
            sink: ChangeSink::default(),
        }
    }
}

fn default_version() -> String {
    crate::BUILD_VERSION.to_string()
}

fn default_channel() -> String {
    crate::BUILD_CHANNEL.to_string()
}

/// User interface language.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LocaleConfig {
    /// Locale name such as `en_US` or `zh_CN`.
    #[serde(default = "system_language")]
    pub language: String,

    #[serde(skip)]
    pub(crate) sink: ChangeSink,
}

config_node!(LocaleConfig);

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            language: system_language(),
            sink: ChangeSink::default(),
        }
    }
}

/// Derives the locale name from `LANG` (`de_DE.UTF-8` becomes `de_DE`).
fn system_language() -> String {
    std::env::var("LANG")
        .ok()
        .and_then(|lang| {
            let name = lang.split(['.', '@']).next().unwrap_or_default().to_string();
            (!name.is_empty() && name != "C" && name != "POSIX").then_some(name)
        })
        .unwrap_or_else(|| "en_US".to_string())
}

/// Schedule selection and timing defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Name of the active schedule file.
    #[serde(default = "default_schedule_name")]
    pub current_schedule: String,

    /// Minutes of warning before an entry starts.
    #[serde(default = "default_preparation_time")]
    pub preparation_time: u32,

    #[serde(default)]
    pub default_duration: ScheduleDefaultDurationConfig,

    /// Seconds added to the wall clock.
    #[serde(default)]
    pub time_offset: i64,

    /// Temporary day swaps keyed by `YYYY-MM-DD`. Past dates are dropped on load.
    #[serde(default)]
    pub reschedule_day: BTreeMap<String, Value>,

    #[serde(skip)]
    pub(crate) sink: ChangeSink,
}

config_node!(ScheduleConfig; default_duration);

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            current_schedule: default_schedule_name(),
            preparation_time: default_preparation_time(),
            default_duration: ScheduleDefaultDurationConfig::default(),
            time_offset: 0,
            reschedule_day: BTreeMap::new(),
            sink: ChangeSink::default(),
        }
    }
}

fn default_schedule_name() -> String {
    "New Schedule 1".to_string()
}

fn default_preparation_time() -> u32 {
    2
}

/// Default entry lengths in minutes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleDefaultDurationConfig {
    #[serde(default = "default_class_minutes")]
    pub class: u32,

    #[serde(rename = "break", default = "default_break_minutes")]
    pub break_minutes: u32,

    #[serde(default = "default_activity_minutes")]
    pub activity: u32,

    #[serde(skip)]
    pub(crate) sink: ChangeSink,
}

config_node!(ScheduleDefaultDurationConfig);

impl Default for ScheduleDefaultDurationConfig {
    fn default() -> Self {
        Self {
            class: default_class_minutes(),
            break_minutes: default_break_minutes(),
            activity: default_activity_minutes(),
            sink: ChangeSink::default(),
        }
    }
}

fn default_class_minutes() -> u32 {
    40
}

fn default_break_minutes() -> u32 {
    10
}

fn default_activity_minutes() -> u32 {
    30
}

/// Screen edge the widget strip is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutAnchor {
    TopLeft,
    #[default]
    TopCenter,
    TopRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

/// Stacking of widget windows relative to other windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZOrder {
    #[default]
    Top,
    Bottom,
    Normal,
}

/// One placed widget inside a preset.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WidgetEntry {
    /// Registered widget type, e.g. `classwidgets.time`.
    pub type_id: String,
    /// Unique instance identifier.
    pub instance_id: String,
    /// Widget-specific settings.
    #[serde(default)]
    pub settings: serde_json::Map<String, Value>,
}

impl WidgetEntry {
    pub fn new(type_id: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            instance_id: instance_id.into(),
            settings: serde_json::Map::new(),
        }
    }
}

/// Appearance and widget layout.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PreferencesConfig {
    /// Active theme identifier.
    #[serde(default = "default_theme")]
    pub current_theme: String,

    #[serde(default = "default_unit")]
    pub scale_factor: f64,

    /// Window opacity, `0.0..=1.0`.
    #[serde(default = "default_unit")]
    pub opacity: f64,

    #[serde(default)]
    pub widgets_anchor: LayoutAnchor,

    #[serde(default)]
    pub widgets_offset_x: i32,

    #[serde(default = "default_offset_y")]
    pub widgets_offset_y: i32,

    #[serde(default)]
    pub widgets_layer: ZOrder,

    /// Output the widgets are shown on; `None` selects the primary display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(default)]
    pub mini_mode: bool,

    /// Named widget layouts.
    #[serde(default = "default_presets")]
    pub widgets_presets: BTreeMap<String, Vec<WidgetEntry>>,

    /// Key into `widgets_presets`.
    #[serde(default = "default_preset_name")]
    pub current_preset: String,

    /// Font family; empty selects the theme font.
    #[serde(default)]
    pub font: String,

    #[serde(default = "default_font_weight")]
    pub font_weight: u32,

    #[serde(skip)]
    pub(crate) sink: ChangeSink,
}

config_node!(PreferencesConfig);

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            current_theme: default_theme(),
            scale_factor: default_unit(),
            opacity: default_unit(),
            widgets_anchor: LayoutAnchor::default(),
            widgets_offset_x: 0,
            widgets_offset_y: default_offset_y(),
            widgets_layer: ZOrder::default(),
            display: None,
            mini_mode: false,
            widgets_presets: default_presets(),
            current_preset: default_preset_name(),
            font: String::new(),
            font_weight: default_font_weight(),
            sink: ChangeSink::default(),
        }
    }
}

fn default_theme() -> String {
    "default".to_string()
}

fn default_unit() -> f64 {
    1.0
}

fn default_offset_y() -> i32 {
    24
}

fn default_preset_name() -> String {
    "default".to_string()
}

fn default_font_weight() -> u32 {
    600
}

fn default_presets() -> BTreeMap<String, Vec<WidgetEntry>> {
    BTreeMap::from([(
        default_preset_name(),
        vec![
            WidgetEntry::new("classwidgets.time", "8ee721ef-ab36-4c23-834d-2c666a6739a3"),
            WidgetEntry::new(
                "classwidgets.currentActivity",
                "87985398-2844-4c9e-b27d-6ea81cd0a2c6",
            ),
        ],
    )])
}

/// Hover and auto-hide behaviour.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InteractionsConfig {
    /// Fade widgets out while the pointer is over them.
    #[serde(default)]
    pub hover_fade: bool,

    #[serde(default)]
    pub hide: HideInteractionsConfig,

    #[serde(skip)]
    pub(crate) sink: ChangeSink,
}

config_node!(InteractionsConfig; hide);

/// Conditions under which widgets hide themselves.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HideInteractionsConfig {
    #[serde(default)]
    pub state: bool,
    #[serde(default)]
    pub in_class: bool,
    #[serde(default = "default_true")]
    pub clicked: bool,
    #[serde(default)]
    pub maximized: bool,
    #[serde(default)]
    pub fullscreen: bool,
    #[serde(default)]
    pub mini_mode: bool,

    #[serde(skip)]
    pub(crate) sink: ChangeSink,
}

config_node!(HideInteractionsConfig);

impl Default for HideInteractionsConfig {
    fn default() -> Self {
        Self {
            state: false,
            in_class: false,
            clicked: true,
            maximized: false,
            fullscreen: false,
            mini_mode: false,
            sink: ChangeSink::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Enabled plugins and plugin-owned settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    /// Identifiers of plugins to load at startup, sorted.
    #[serde(default = "default_enabled_plugins")]
    pub enabled: Vec<String>,

    /// Settings documents owned by individual plugins, keyed by plugin id.
    #[serde(default)]
    pub configs: BTreeMap<String, Value>,

    #[serde(skip)]
    pub(crate) sink: ChangeSink,
}

config_node!(PluginsConfig);

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled_plugins(),
            configs: BTreeMap::new(),
            sink: ChangeSink::default(),
        }
    }
}

fn default_enabled_plugins() -> Vec<String> {
    vec![DEFAULT_ENABLED_PLUGIN.to_string()]
}

/// Update and mirror settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// Download mirrors keyed by short name.
    #[serde(default = "default_mirrors")]
    pub mirrors: BTreeMap<String, String>,

    /// Key into `mirrors`.
    #[serde(default = "default_mirror")]
    pub current_mirror: String,

    #[serde(default = "default_true")]
    pub mirror_enabled: bool,

    #[serde(default = "default_releases_url")]
    pub releases_url: String,

    #[serde(default = "default_true")]
    pub auto_check_updates: bool,

    #[serde(skip)]
    pub(crate) sink: ChangeSink,
}

config_node!(NetworkConfig);

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            mirrors: default_mirrors(),
            current_mirror: default_mirror(),
            mirror_enabled: true,
            releases_url: default_releases_url(),
            auto_check_updates: true,
            sink: ChangeSink::default(),
        }
    }
}

fn default_mirrors() -> BTreeMap<String, String> {
    [
        ("gh_proxy", "https://gh-proxy.com/"),
        ("kkgithub", "https://kkgithub.com/"),
        ("gitfast", "https://gitfast.top/"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_mirror() -> String {
    "gh_proxy".to_string()
}

fn default_releases_url() -> String {
    "https://classwidgets.rinlit.cn/2/releases.json".to_string()
}

/// Notification switches and per-provider policies.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationsConfig {
    /// Global switch. When off, nothing is delivered.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Delivery policy per provider id.
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderPolicy>,

    #[serde(skip)]
    pub(crate) sink: ChangeSink,
}

config_node!(NotificationsConfig);

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            providers: BTreeMap::new(),
            sink: ChangeSink::default(),
        }
    }
}

/// Delivery policy of one notification provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderPolicy {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Deliver through the operating system tray.
    #[serde(default)]
    pub use_system_notify: bool,
    /// Deliver through the in-app notification surface.
    #[serde(default = "default_true")]
    pub use_app_notify: bool,
}

impl Default for ProviderPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            use_system_notify: false,
            use_app_notify: true,
        }
    }
}
