//! Theme preference, synchronized across every mounted component.
//!
//! The persisted localStorage slot is the single source of truth; anything a
//! component holds in memory is a cache that gets invalidated by one of two
//! channels: the cross-context `storage` event (fires in *other* browsing
//! contexts) and the in-page `darkModeUpdated` event (fires for every
//! listener in the toggling context). Listeners never take a value from the
//! signal payload; they re-read the persisted slot.

pub const STORAGE_KEY: &str = "isDarkMode";
pub const CHANGE_EVENT: &str = "darkModeUpdated";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    pub fn is_dark(self) -> bool {
        matches!(self, ThemeMode::Dark)
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Decodes the persisted `"true"`/`"false"` literal. Absent (or anything
    /// other than `"false"`) means dark.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("false") => ThemeMode::Light,
            _ => ThemeMode::Dark,
        }
    }

    pub fn as_stored(self) -> &'static str {
        match self {
            ThemeMode::Light => "false",
            ThemeMode::Dark => "true",
        }
    }
}

#[cfg(feature = "frontend")]
pub use sync::ThemeSync;

#[cfg(feature = "frontend")]
mod sync {
    use leptos::{create_rw_signal, RwSignal, SignalGetUntracked, SignalSet};
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    use super::{ThemeMode, CHANGE_EVENT, STORAGE_KEY};

    /// Observable theme value with a stable identity. Cheap to copy around;
    /// every clone points at the same underlying signal, so all subscribers
    /// in this context converge synchronously on toggle. Cross-context
    /// convergence rides on the persisted snapshot plus the `storage` event.
    #[derive(Clone, Copy)]
    pub struct ThemeSync {
        mode: RwSignal<ThemeMode>,
    }

    impl ThemeSync {
        /// Reads the persisted mode, applies it to the document, and hooks
        /// both propagation channels. Call once at mount and hand the value
        /// out through context.
        pub fn install() -> Self {
            let mode = create_rw_signal(read_persisted());
            apply_to_document(mode.get_untracked());

            if let Some(window) = web_sys::window() {
                let on_storage = Closure::<dyn FnMut(web_sys::StorageEvent)>::new(
                    move |event: web_sys::StorageEvent| {
                        if event.key().as_deref() == Some(STORAGE_KEY) {
                            refresh(mode);
                        }
                    },
                );
                let _ = window.add_event_listener_with_callback(
                    "storage",
                    on_storage.as_ref().unchecked_ref(),
                );
                on_storage.forget();

                let on_change = Closure::<dyn FnMut(web_sys::Event)>::new(
                    move |_event: web_sys::Event| {
                        refresh(mode);
                    },
                );
                let _ = window.add_event_listener_with_callback(
                    CHANGE_EVENT,
                    on_change.as_ref().unchecked_ref(),
                );
                on_change.forget();
            }

            ThemeSync { mode }
        }

        /// Reactive read; components subscribe by calling this inside a
        /// tracking scope.
        pub fn mode(&self) -> RwSignal<ThemeMode> {
            self.mode
        }

        /// Negates the persisted value, writes it back, applies it to the
        /// document so the toggling tree updates immediately, and broadcasts
        /// the in-page signal for every other mounted listener.
        pub fn toggle(&self) {
            let next = read_persisted().toggled();
            persist(next);
            apply_to_document(next);
            self.mode.set(next);
            dispatch_change_event();
        }
    }

    fn local_storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    fn read_persisted() -> ThemeMode {
        let stored = local_storage().and_then(|s| s.get_item(STORAGE_KEY).ok().flatten());
        ThemeMode::from_stored(stored.as_deref())
    }

    fn persist(mode: ThemeMode) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(STORAGE_KEY, mode.as_stored());
        }
    }

    fn refresh(mode: RwSignal<ThemeMode>) {
        let current = read_persisted();
        apply_to_document(current);
        mode.set(current);
    }

    fn apply_to_document(mode: ThemeMode) {
        let Some(body) = web_sys::window().and_then(|w| w.document()).and_then(|d| d.body())
        else {
            return;
        };
        let classes = body.class_list();
        if mode.is_dark() {
            let _ = classes.add_1("dark-mode");
            let _ = classes.remove_1("light-mode");
        } else {
            let _ = classes.add_1("light-mode");
            let _ = classes.remove_1("dark-mode");
        }
    }

    fn dispatch_change_event() {
        if let Some(window) = web_sys::window() {
            if let Ok(event) = web_sys::Event::new(CHANGE_EVENT) {
                let _ = window.dispatch_event(&event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_preference_defaults_to_dark() {
        assert_eq!(ThemeMode::from_stored(None), ThemeMode::Dark);
        assert_eq!(ThemeMode::default(), ThemeMode::Dark);
    }

    #[test]
    fn stored_literals_round_trip() {
        assert_eq!(ThemeMode::from_stored(Some("false")), ThemeMode::Light);
        assert_eq!(ThemeMode::from_stored(Some("true")), ThemeMode::Dark);
        assert_eq!(ThemeMode::Light.as_stored(), "false");
        assert_eq!(ThemeMode::Dark.as_stored(), "true");
    }

    #[test]
    fn unrecognized_literal_falls_back_to_dark() {
        assert_eq!(ThemeMode::from_stored(Some("garbage")), ThemeMode::Dark);
    }

    #[test]
    fn toggle_negates() {
        assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
        assert_eq!(ThemeMode::Light.toggled(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.toggled().toggled(), ThemeMode::Dark);
    }
}
