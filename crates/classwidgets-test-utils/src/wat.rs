// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebAssembly text entry modules for plugin tests.

/// Both hooks present and empty.
pub const NOOP_PLUGIN: &str = r#"
(module
  (func (export "on_load"))
  (func (export "on_unload")))
"#;

/// Logs and pushes a notification titled `Hello` with message `from wasm`
/// on load, and pushes `Bye` on unload.
pub const NOTIFY_PLUGIN: &str = r#"
(module
  (import "classwidgets" "log" (func $log (param i32 i32 i32)))
  (import "classwidgets" "notify" (func $notify (param i32 i32 i32 i32 i32)))
  (memory (export "memory") 1)
  (data (i32.const 0) "Hello")
  (data (i32.const 16) "from wasm")
  (data (i32.const 32) "Bye")
  (func (export "on_load")
    (call $log (i32.const 0) (i32.const 16) (i32.const 9))
    (call $notify (i32.const 0) (i32.const 0) (i32.const 5) (i32.const 16) (i32.const 9)))
  (func (export "on_unload")
    (call $notify (i32.const 0) (i32.const 32) (i32.const 3) (i32.const 0) (i32.const 0))))
"#;

/// `on_load` traps; `on_unload` pushes `Bye` so the best-effort unload is
/// observable.
pub const TRAP_ON_LOAD: &str = r#"
(module
  (import "classwidgets" "notify" (func $notify (param i32 i32 i32 i32 i32)))
  (memory (export "memory") 1)
  (data (i32.const 0) "Bye")
  (func (export "on_load") unreachable)
  (func (export "on_unload")
    (call $notify (i32.const 0) (i32.const 0) (i32.const 3) (i32.const 0) (i32.const 0))))
"#;

/// `on_load` never returns; fuel metering must stop it.
pub const SPIN_ON_LOAD: &str = r#"
(module
  (func (export "on_load") (loop $spin (br $spin)))
  (func (export "on_unload")))
"#;

/// Exports no lifecycle hooks.
pub const NO_HOOKS: &str = r#"
(module
  (func (export "start")))
"#;

/// `on_load` has the wrong signature.
pub const WRONG_HOOK_SIGNATURE: &str = r#"
(module
  (func (export "on_load") (param i32))
  (func (export "on_unload")))
"#;

/// Imports `helper.value` and traps unless it returns 7.
pub const USES_HELPER: &str = r#"
(module
  (import "helper" "value" (func $value (result i32)))
  (func (export "on_load")
    (if (i32.ne (call $value) (i32.const 7)) (then unreachable)))
  (func (export "on_unload")))
"#;

/// Library module satisfying [`USES_HELPER`].
pub const HELPER_LIBRARY: &str = r#"
(module
  (func (export "value") (result i32) (i32.const 7)))
"#;

/// Same export as [`HELPER_LIBRARY`] with a different result.
pub const SHADOWED_HELPER_LIBRARY: &str = r#"
(module
  (func (export "value") (result i32) (i32.const 0)))
"#;
