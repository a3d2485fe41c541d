use log::warn;
use pixel_price_calculator::preferences::{PreferenceStore, Preferences, Theme};
use pixel_price_calculator::registration;
use std::rc::Rc;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Reflect theme and language on `<html>` so the stylesheet and the
/// browser's bidi layout pick them up.
pub fn apply_to_document(prefs: &Preferences) {
    let Some(root) = gloo_utils::document().document_element() else {
        return;
    };
    let classes = root.class_list();
    let toggled = match prefs.theme {
        Theme::Dark => classes.add_1("dark"),
        Theme::Light => classes.remove_1("dark"),
    };
    if toggled.is_err() {
        warn!("Could not update theme class on <html>");
    }
    for (name, value) in [
        ("lang", prefs.language.code()),
        ("dir", prefs.language.direction().as_str()),
    ] {
        if let Err(e) = root.set_attribute(name, value) {
            warn!("Could not set {}=\"{}\" on <html>: {:?}", name, value, e);
        }
    }
}

/// Persist preferences and apply them to the document whenever they change.
#[hook]
pub fn use_synced_preferences(store: Rc<dyn PreferenceStore>, prefs: Preferences) {
    use_effect_with(prefs, move |prefs| {
        apply_to_document(prefs);
        if let Err(e) = prefs.save(store.as_ref()) {
            // Preferences still apply for this session.
            warn!("Could not persist preferences: {}", e);
        }
        || ()
    });
}

/// Whether a service worker controls the page, updated on `controllerchange`
/// so the first install shows up without a reload.
#[hook]
pub fn use_offline_ready() -> bool {
    let ready = use_state(registration::is_controlled);
    {
        let ready = ready.clone();
        use_effect_with((), move |_| {
            let watch =
                registration::watch_controller(move || ready.set(registration::is_controlled()));
            move || drop(watch)
        });
    }
    *ready
}

/// Callback that reads an input's text and forwards it with the field key.
#[hook]
pub fn use_field_input(key: &'static str, onchange: Callback<(&'static str, String)>) -> Callback<InputEvent> {
    use_callback(onchange, move |e: InputEvent, onchange| {
        let input: HtmlInputElement = e.target_unchecked_into();
        onchange.emit((key, input.value()));
    })
}
