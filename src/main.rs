//! Main module for the Pixel Price Calculator page using Yew.
//! Wires UI components, the form reducer and preference persistence.

use log::error;
use pixel_price_calculator::config::{LOGO_PATH, LOG_LEVEL};
use pixel_price_calculator::i18n::{text, TextKey};
use pixel_price_calculator::preferences::{LocalStorageStore, PreferenceStore, Preferences};
use pixel_price_calculator::pricing::{fields, Mode, PriceFormula, RateCard, RateCardFormula};
use pixel_price_calculator::state::{CalculatorAction, CalculatorState};
use pixel_price_calculator::{logging, registration};
use std::rc::Rc;
use yew::prelude::*;

mod components;
mod hooks;

use components::{render_quote, LanguageToggle, MaterialSelect, ModeToggle, NumberField, ThemeToggle};
use hooks::{apply_to_document, use_offline_ready, use_synced_preferences};

#[derive(Properties, PartialEq)]
struct CalculatorProps {
    formula: Rc<RateCardFormula>,
    store: Rc<LocalStorageStore>,
}

/// The calculator view: form, toggles and the live quote.
#[function_component(Calculator)]
fn calculator(props: &CalculatorProps) -> Html {
    let store: Rc<dyn PreferenceStore> = props.store.clone();
    let state = {
        let formula: Rc<dyn PriceFormula> = props.formula.clone();
        let store = store.clone();
        use_reducer(move || {
            let prefs = Preferences::load(store.as_ref());
            apply_to_document(&prefs);
            CalculatorState::new(formula, prefs)
        })
    };
    use_synced_preferences(store, state.preferences);
    let offline_ready = use_offline_ready();

    let rates: Rc<RateCard> = use_memo(props.formula.clone(), |f| f.rates().clone());
    let lang = state.language();

    let on_field = {
        let state = state.clone();
        Callback::from(move |(key, value): (&'static str, String)| {
            state.dispatch(CalculatorAction::SetField {
                key: key.to_string(),
                value,
            })
        })
    };
    let on_material = on_field.reform(|id: String| (fields::MATERIAL, id));
    let on_mode = {
        let state = state.clone();
        Callback::from(move |mode: Mode| state.dispatch(CalculatorAction::SetMode(mode)))
    };
    let on_theme = {
        let state = state.clone();
        Callback::from(move |_: ()| state.dispatch(CalculatorAction::ToggleTheme))
    };
    let on_language = {
        let state = state.clone();
        Callback::from(move |_: ()| state.dispatch(CalculatorAction::ToggleLanguage))
    };
    let on_reset = {
        let state = state.clone();
        Callback::from(move |_: MouseEvent| state.dispatch(CalculatorAction::Reset))
    };

    let value = |key: &str| AttrValue::from(state.inputs.get(key).to_string());
    let selected_material = if state.inputs.is_blank(fields::MATERIAL) {
        AttrValue::from(rates.default_material().id.clone())
    } else {
        value(fields::MATERIAL)
    };

    html! {
        <div class="container">
            <header class="app-header">
                <img class="logo" src={LOGO_PATH} alt="" />
                <h1>{ text(lang, TextKey::AppTitle) }</h1>
                <div class="header-actions">
                    <LanguageToggle {lang} theme={state.theme()} ontoggle={on_language} />
                    <ThemeToggle {lang} theme={state.theme()} ontoggle={on_theme} />
                </div>
            </header>

            <main class="calculator">
                <ModeToggle mode={state.mode} {lang} onchange={on_mode} />

                <form class="form" onsubmit={Callback::from(|e: SubmitEvent| e.prevent_default())}>
                    if state.mode == Mode::Auto {
                        <MaterialSelect rates={rates.clone()} selected={selected_material} {lang} onchange={on_material} />
                        <div class="form-row">
                            <NumberField field={fields::WIDTH} label={TextKey::Width} {lang}
                                value={value(fields::WIDTH)} onchange={on_field.clone()} />
                            <NumberField field={fields::HEIGHT} label={TextKey::Height} {lang}
                                value={value(fields::HEIGHT)} onchange={on_field.clone()} />
                        </div>
                    } else {
                        <NumberField field={fields::UNIT_PRICE} label={TextKey::UnitPrice} {lang}
                            value={value(fields::UNIT_PRICE)} onchange={on_field.clone()} />
                    }
                    <div class="form-row">
                        <NumberField field={fields::QUANTITY} label={TextKey::Quantity} {lang}
                            value={value(fields::QUANTITY)} onchange={on_field.clone()} />
                        <NumberField field={fields::DISCOUNT} label={TextKey::Discount} {lang}
                            value={value(fields::DISCOUNT)} onchange={on_field} />
                    </div>
                    <button type="button" class="btn-secondary" onclick={on_reset}>
                        { text(lang, TextKey::Reset) }
                    </button>
                </form>

                { render_quote(&state.result, lang) }
            </main>

            if offline_ready {
                <footer class="offline-status">{ text(lang, TextKey::OfflineReady) }</footer>
            }
        </div>
    }
}

/// App wrapper loading the rate card and the browser preference store.
#[function_component]
pub fn App() -> Html {
    let formula = use_memo((), |_| RateCardFormula::bundled().map(Rc::new));
    let store = use_memo((), |_| LocalStorageStore::new());

    match &*formula {
        Ok(formula) => html! {
            <Calculator formula={formula.clone()} {store} />
        },
        Err(e) => {
            error!("Rate card failed to load: {}", e);
            html! { <div class="current-error">{ e.to_string() }</div> }
        }
    }
}

/// Entry point: registers the offline worker and renders the App.
fn main() {
    console_error_panic_hook::set_once();
    logging::init(LOG_LEVEL);
    registration::register_offline_worker();
    yew::Renderer::<App>::new().render();
}
