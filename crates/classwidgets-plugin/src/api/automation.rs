// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use classwidgets_core::AutomationTask;
use tracing::{debug, error};

use super::{OwnedTask, PluginApi};

pub struct AutomationApi<'a> {
    api: &'a PluginApi,
}

impl<'a> AutomationApi<'a> {
    pub(crate) fn new(api: &'a PluginApi) -> Self {
        Self { api }
    }

    /// Adds a task to the host's automation list.
    pub fn register(&self, task: Box<dyn AutomationTask>) {
        let owner = self.api.context().map(|c| c.id().to_string());
        debug!(task = %task.id(), plugin = ?owner, "registered automation task");
        self.api
            .services()
            .automation
            .borrow_mut()
            .push(OwnedTask { owner, task });
    }

    /// Identifiers of every registered task, in registration order.
    pub fn tasks(&self) -> Vec<String> {
        self.api.services().automation_tasks()
    }

    /// Runs every task once. Failures are logged; returns how many succeeded.
    pub fn run_all(&self) -> usize {
        let mut tasks = std::mem::take(&mut *self.api.services().automation.borrow_mut());
        let mut succeeded = 0;
        for OwnedTask { task, .. } in tasks.iter_mut() {
            match task.run() {
                Ok(()) => succeeded += 1,
                Err(e) => error!(task = %task.id(), error = %e, "automation task failed"),
            }
        }
        // Tasks registered while running land after the existing ones.
        let mut services = self.api.services().automation.borrow_mut();
        tasks.append(&mut services);
        *services = tasks;
        succeeded
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use classwidgets_core::ClassWidgetsError;

    use super::*;
    use crate::api::test_support::services;

    struct Counting {
        id: &'static str,
        runs: Rc<Cell<u32>>,
        fail: bool,
    }

    impl AutomationTask for Counting {
        fn id(&self) -> &str {
            self.id
        }

        fn run(&mut self) -> Result<(), ClassWidgetsError> {
            self.runs.set(self.runs.get() + 1);
            if self.fail {
                Err(ClassWidgetsError::Internal("nope".into()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn run_all_contains_failures() {
        let dir = tempfile::tempdir().unwrap();
        let api = PluginApi::new(services(dir.path()));
        let runs = Rc::new(Cell::new(0));
        for (id, fail) in [("a", false), ("b", true), ("c", false)] {
            api.automation().register(Box::new(Counting {
                id,
                runs: Rc::clone(&runs),
                fail,
            }));
        }

        assert_eq!(api.automation().run_all(), 2);
        assert_eq!(runs.get(), 3);
        assert_eq!(api.automation().tasks(), vec!["a", "b", "c"]);
    }
}
