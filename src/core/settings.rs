use crate::core::adb::PackId;
use crate::core::availability::{probe, AppInspector, AvailabilityStatus, Remediation};
use crate::core::capability::{supports_history, HostCapabilities};
use crate::core::dialog::{Choice, ConfirmWorkflow, DialogKind, WorkflowState};
use crate::core::dispatch::{dispatch_or_log, Dispatcher, Handoff};
use crate::core::events::{ClearHandle, ClearOperation, EventStore};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKey {
    Clear,
    SendFeedback,
    MoreApps,
    Status,
}

/// What activating an entry does, fixed when the list is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    ConfirmClear,
    SendFeedback,
    MoreApps,
    Remediate(Remediation),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: EntryKey,
    pub title: &'static str,
    pub summary: &'static str,
    pub action: EntryAction,
}

/// The visible entries, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsList {
    entries: Vec<Entry>,
}

impl SettingsList {
    /// `clear` only if the accessory keeps a history, `status` only if
    /// there is something to fix.
    pub fn build(status: AvailabilityStatus, supports_history: bool) -> Self {
        let mut entries = Vec::with_capacity(4);
        if supports_history {
            entries.push(Entry {
                key: EntryKey::Clear,
                title: "Clear history",
                summary: "Delete all events shown on the accessory",
                action: EntryAction::ConfirmClear,
            });
        }
        entries.push(Entry {
            key: EntryKey::SendFeedback,
            title: "Send feedback",
            summary: "Report a problem or suggest an improvement",
            action: EntryAction::SendFeedback,
        });
        entries.push(Entry {
            key: EntryKey::MoreApps,
            title: "More apps",
            summary: "Other extensions by the same developer",
            action: EntryAction::MoreApps,
        });
        if let Some(summary) = status.summary() {
            entries.push(Entry {
                key: EntryKey::Status,
                title: "K-9 Mail status",
                summary,
                action: EntryAction::Remediate(status.remediation()),
            });
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, key: EntryKey) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key == key)
    }
}

/// Identifiers the handoffs point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targets {
    /// The mail application
    pub target: PackId,
    /// This extension
    pub extension: PackId,
    pub developer_email: String,
    pub more_apps_uri: String,
}

impl Targets {
    fn handoff(&self, action: EntryAction) -> Option<Handoff> {
        match action {
            EntryAction::ConfirmClear | EntryAction::Remediate(Remediation::None) => None,
            EntryAction::SendFeedback => Some(Handoff::Compose(self.developer_email.clone())),
            EntryAction::MoreApps => Some(Handoff::Browse(self.more_apps_uri.clone())),
            EntryAction::Remediate(Remediation::OpenStore) => {
                Some(Handoff::StoreListing(self.target.clone()))
            }
            EntryAction::Remediate(Remediation::OpenAppInfo) => {
                Some(Handoff::AppInfo(self.extension.clone()))
            }
            EntryAction::Remediate(Remediation::LaunchApp) => {
                Some(Handoff::LaunchApp(self.target.clone()))
            }
        }
    }
}

/// Everything outside the screen it talks to.
pub struct Collaborators {
    pub inspector: Box<dyn AppInspector>,
    pub dispatcher: Box<dyn Dispatcher>,
    pub store: Arc<dyn EventStore>,
}

/// State of one settings screen.
pub struct SettingsController {
    collaborators: Collaborators,
    targets: Targets,
    capabilities: HostCapabilities,
    status: AvailabilityStatus,
    list: SettingsList,
    dialog: Option<ConfirmWorkflow>,
}

impl SettingsController {
    /// Probes the mail application and builds the list. Never fails.
    pub fn new(
        collaborators: Collaborators,
        targets: Targets,
        capabilities: HostCapabilities,
    ) -> Self {
        let status = probe(collaborators.inspector.as_ref(), &targets.target);
        let list = SettingsList::build(status, supports_history(&capabilities));
        Self {
            collaborators,
            targets,
            capabilities,
            status,
            list,
            dialog: None,
        }
    }

    /// Probes again and rebuilds the list, closing any open prompt.
    pub fn refresh(&mut self) {
        self.status = probe(self.collaborators.inspector.as_ref(), &self.targets.target);
        self.list = SettingsList::build(self.status, supports_history(&self.capabilities));
        if self.dialog.take().is_some() {
            debug!("[SETTINGS] Refresh closed an open prompt");
        }
    }

    pub fn status(&self) -> AvailabilityStatus {
        self.status
    }

    pub fn list(&self) -> &SettingsList {
        &self.list
    }

    pub fn dialog(&self) -> Option<&ConfirmWorkflow> {
        self.dialog.as_ref()
    }

    /// Handles a click on `key`.
    ///
    /// Ignored while a prompt is open, or if `key` isn't in the list.
    pub fn activate(&mut self, key: EntryKey) {
        if self.dialog.is_some() {
            debug!("[SETTINGS] {key:?} ignored, a prompt is open");
            return;
        }
        let Some(action) = self.list.get(key).map(|e| e.action) else {
            warn!("[SETTINGS] {key:?} is not shown");
            return;
        };
        match action {
            EntryAction::ConfirmClear => {
                let workflow = ConfirmWorkflow::new(DialogKind::ClearHistory).open();
                debug!("[SETTINGS] Prompt {:?}", workflow.state());
                self.dialog = Some(workflow);
            }
            action => {
                if let Some(handoff) = self.targets.handoff(action) {
                    dispatch_or_log(self.collaborators.dispatcher.as_ref(), &handoff);
                }
            }
        }
    }

    /// Answers the open prompt. Returns the clear it started, if any.
    pub fn answer(&mut self, choice: Choice) -> Option<ClearHandle> {
        let workflow = self.dialog.take()?;
        let kind = workflow.kind();
        match (kind, workflow.resolve(choice)) {
            (DialogKind::ClearHistory, WorkflowState::Confirmed) => {
                Some(ClearOperation::start(Arc::clone(&self.collaborators.store)))
            }
            _ => None,
        }
    }
}

#[allow(clippy::unwrap_used, reason = "tests")]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::availability::InspectError;
    use crate::core::dispatch::DispatchError;
    use crate::core::events::{ClearOutcome, StoreError, INVALID_ID};
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticInspector(AvailabilityStatus);
    impl AppInspector for StaticInspector {
        fn is_installed(&self, _: &PackId) -> Result<bool, InspectError> {
            Ok(self.0 != AvailabilityStatus::NotInstalled)
        }
        fn has_read_permission(&self, _: &PackId) -> Result<bool, InspectError> {
            Ok(self.0 != AvailabilityStatus::PermissionDenied)
        }
        fn is_enabled(&self, _: &PackId) -> Result<bool, InspectError> {
            Ok(self.0 != AvailabilityStatus::Disabled)
        }
    }

    /// Records every handoff; optionally fails them all.
    #[derive(Clone, Default)]
    struct RecordingDispatcher {
        sent: Rc<RefCell<Vec<Handoff>>>,
        no_handler: bool,
    }
    impl Dispatcher for RecordingDispatcher {
        fn dispatch(&self, handoff: &Handoff) -> Result<(), DispatchError> {
            self.sent.borrow_mut().push(handoff.clone());
            if self.no_handler {
                Err(DispatchError::NoHandler(handoff.to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct CountingStore(AtomicUsize);
    impl EventStore for CountingStore {
        fn delete_all_events(&self) -> Result<i64, StoreError> {
            if self.0.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(1)
            } else {
                Ok(INVALID_ID)
            }
        }
    }

    fn targets() -> Targets {
        Targets {
            target: PackId::new("com.fsck.k9").unwrap(),
            extension: PackId::new("de.cketti.smartwatch.k9").unwrap(),
            developer_email: "ck@cketti.de".to_string(),
            more_apps_uri: "https://example.org/apps".to_string(),
        }
    }

    fn controller(
        status: AvailabilityStatus,
        history: bool,
        dispatcher: RecordingDispatcher,
        store: Arc<CountingStore>,
    ) -> SettingsController {
        SettingsController::new(
            Collaborators {
                inspector: Box::new(StaticInspector(status)),
                dispatcher: Box::new(dispatcher),
                store,
            },
            targets(),
            HostCapabilities {
                supports_history: Some(history),
            },
        )
    }

    fn keys(list: &SettingsList) -> Vec<EntryKey> {
        list.entries().iter().map(|e| e.key).collect()
    }

    #[test]
    fn list_composition() {
        for status in [
            AvailabilityStatus::NotInstalled,
            AvailabilityStatus::PermissionDenied,
            AvailabilityStatus::Disabled,
            AvailabilityStatus::Available,
        ] {
            for history in [false, true] {
                let keys = keys(&SettingsList::build(status, history));
                assert_eq!(keys.contains(&EntryKey::Clear), history, "{status} {history}");
                assert_eq!(
                    keys.contains(&EntryKey::Status),
                    status != AvailabilityStatus::Available,
                    "{status} {history}"
                );
                assert!(keys.contains(&EntryKey::SendFeedback));
                assert!(keys.contains(&EntryKey::MoreApps));
            }
        }
    }

    #[test]
    fn list_order() {
        let list = SettingsList::build(AvailabilityStatus::Disabled, true);
        assert_eq!(
            keys(&list),
            vec![
                EntryKey::Clear,
                EntryKey::SendFeedback,
                EntryKey::MoreApps,
                EntryKey::Status
            ]
        );
        assert_eq!(
            list.get(EntryKey::Status).unwrap().action,
            EntryAction::Remediate(Remediation::LaunchApp)
        );
    }

    #[test]
    fn status_entry_dispatches_its_remediation() {
        let cases = [
            (
                AvailabilityStatus::NotInstalled,
                Handoff::StoreListing(targets().target),
            ),
            (
                AvailabilityStatus::PermissionDenied,
                Handoff::AppInfo(targets().extension),
            ),
            (
                AvailabilityStatus::Disabled,
                Handoff::LaunchApp(targets().target),
            ),
        ];
        for (status, expected) in cases {
            let d = RecordingDispatcher::default();
            let mut c = controller(status, false, d.clone(), Arc::default());
            assert_eq!(c.status(), status);
            c.activate(EntryKey::Status);
            assert_eq!(*d.sent.borrow(), vec![expected]);
        }
    }

    #[test]
    fn available_status_has_nothing_to_click() {
        let d = RecordingDispatcher::default();
        let mut c = controller(AvailabilityStatus::Available, true, d.clone(), Arc::default());
        c.activate(EntryKey::Status);
        assert!(d.sent.borrow().is_empty());
    }

    #[test]
    fn feedback_and_more_apps() {
        let d = RecordingDispatcher::default();
        let mut c = controller(AvailabilityStatus::Available, false, d.clone(), Arc::default());
        c.activate(EntryKey::SendFeedback);
        c.activate(EntryKey::MoreApps);
        assert_eq!(
            *d.sent.borrow(),
            vec![
                Handoff::Compose("ck@cketti.de".to_string()),
                Handoff::Browse("https://example.org/apps".to_string()),
            ]
        );
    }

    #[test]
    fn missing_handler_keeps_the_screen_usable() {
        let d = RecordingDispatcher {
            no_handler: true,
            ..RecordingDispatcher::default()
        };
        let mut c = controller(AvailabilityStatus::NotInstalled, true, d.clone(), Arc::default());
        c.activate(EntryKey::Status);
        c.activate(EntryKey::SendFeedback);
        c.activate(EntryKey::MoreApps);
        assert_eq!(d.sent.borrow().len(), 3);
        c.activate(EntryKey::Clear);
        assert!(c.dialog().is_some());
    }

    #[test]
    fn clear_without_history_support_does_nothing() {
        let mut c = controller(
            AvailabilityStatus::Available,
            false,
            RecordingDispatcher::default(),
            Arc::default(),
        );
        c.activate(EntryKey::Clear);
        assert!(c.dialog().is_none());
    }

    #[test]
    fn only_yes_starts_a_clear() {
        let store = Arc::new(CountingStore::default());
        let mut c = controller(
            AvailabilityStatus::Available,
            true,
            RecordingDispatcher::default(),
            store.clone(),
        );

        for choice in [Choice::No, Choice::Dismiss] {
            c.activate(EntryKey::Clear);
            assert_eq!(
                c.dialog().unwrap().state(),
                WorkflowState::AwaitingConfirmation
            );
            assert!(c.answer(choice).is_none());
            assert!(c.dialog().is_none());
        }
        assert_eq!(store.0.load(Ordering::SeqCst), 0);

        c.activate(EntryKey::Clear);
        let handle = c.answer(Choice::Yes).unwrap();
        assert_eq!(block_on(handle.outcome()), ClearOutcome::Success);
        assert_eq!(store.0.load(Ordering::SeqCst), 1);

        // the answered prompt is gone; a second answer has nothing to act on
        assert!(c.answer(Choice::Yes).is_none());
        assert_eq!(store.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn prompt_blocks_other_entries() {
        let d = RecordingDispatcher::default();
        let mut c = controller(AvailabilityStatus::Disabled, true, d.clone(), Arc::default());
        c.activate(EntryKey::Clear);
        c.activate(EntryKey::Status);
        c.activate(EntryKey::Clear);
        assert!(d.sent.borrow().is_empty());
        assert!(c.answer(Choice::Dismiss).is_none());
        c.activate(EntryKey::Status);
        assert_eq!(d.sent.borrow().len(), 1);
    }

    #[test]
    fn refresh_closes_the_prompt() {
        let mut c = controller(
            AvailabilityStatus::Available,
            true,
            RecordingDispatcher::default(),
            Arc::default(),
        );
        c.activate(EntryKey::Clear);
        c.refresh();
        assert!(c.dialog().is_none());
        assert_eq!(c.list().entries().len(), 3);
    }
}
