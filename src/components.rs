//! Pure Yew view components for the calculator UI.
//!
//! Components render from props and report changes through callbacks; all
//! state lives in the reducer owned by `App`.

use crate::hooks::use_field_input;
use pixel_price_calculator::error::PriceError;
use pixel_price_calculator::i18n::{error_text, material_name, text, TextKey};
use pixel_price_calculator::pricing::{Mode, Quote, RateCard};
use pixel_price_calculator::utils::format_amount;
use pixel_price_calculator::{Language, Theme};
use std::rc::Rc;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

/// Renders the quote breakdown, or the localized validation error.
pub fn render_quote(result: &Result<Quote, PriceError>, lang: Language) -> Html {
    let quote = match result {
        Ok(quote) => quote,
        Err(err) => {
            return html! {
                <div class="quote quote-error" role="alert">
                    { error_text(lang, err) }
                </div>
            };
        }
    };

    let row = |key: TextKey, amount: f64| {
        html! {
            <div class="quote-row">
                <span>{ text(lang, key) }</span>
                <span class="amount">{ format_amount(amount, lang) }</span>
            </div>
        }
    };

    html! {
        <div class="quote" aria-live="polite">
            { row(TextKey::UnitPrice, quote.unit_price) }
            if quote.setup_fee > 0.0 {
                { row(TextKey::SetupFee, quote.setup_fee) }
            }
            { row(TextKey::Subtotal, quote.subtotal) }
            if quote.discount > 0.0 {
                { row(TextKey::DiscountAmount, -quote.discount) }
            }
            <div class="quote-row total">
                <span>{ text(lang, TextKey::Total) }</span>
                <span class="amount">{ format_amount(quote.total, lang) }</span>
            </div>
        </div>
    }
}

/// Text input bound to one key of the calculation inputs.
#[derive(Properties, PartialEq)]
pub struct NumberFieldProps {
    pub field: &'static str,
    pub label: TextKey,
    pub lang: Language,
    pub value: AttrValue,
    pub onchange: Callback<(&'static str, String)>,
}

#[function_component(NumberField)]
pub fn number_field(props: &NumberFieldProps) -> Html {
    let oninput = use_field_input(props.field, props.onchange.clone());
    html! {
        <div class="form-group">
            <label for={props.field}>{ text(props.lang, props.label) }</label>
            <input
                type="text"
                inputmode="decimal"
                id={props.field}
                value={props.value.clone()}
                {oninput}
            />
        </div>
    }
}

/// Material picker fed from the rate card.
#[derive(Properties, PartialEq)]
pub struct MaterialSelectProps {
    pub rates: Rc<RateCard>,
    pub selected: AttrValue,
    pub lang: Language,
    pub onchange: Callback<String>,
}

#[function_component(MaterialSelect)]
pub fn material_select(props: &MaterialSelectProps) -> Html {
    let onchange = {
        let onchange = props.onchange.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            onchange.emit(select.value());
        })
    };
    html! {
        <div class="form-group">
            <label for="material">{ text(props.lang, TextKey::Material) }</label>
            <select id="material" {onchange}>
                { props.rates.materials().iter().map(|m| html! {
                    <option value={m.id.clone()} selected={*props.selected == m.id}>
                        { material_name(props.lang, m) }
                    </option>
                }).collect::<Html>() }
            </select>
        </div>
    }
}

/// Auto/Manual segmented toggle.
#[derive(Properties, PartialEq)]
pub struct ModeToggleProps {
    pub mode: Mode,
    pub lang: Language,
    pub onchange: Callback<Mode>,
}

#[function_component(ModeToggle)]
pub fn mode_toggle(props: &ModeToggleProps) -> Html {
    let button = |mode: Mode, key: TextKey| {
        let onchange = props.onchange.clone();
        let class = classes!("segment", (props.mode == mode).then_some("active"));
        html! {
            <button type="button" {class}
                aria-pressed={(props.mode == mode).to_string()}
                onclick={Callback::from(move |_| onchange.emit(mode))}>
                { text(props.lang, key) }
            </button>
        }
    };
    html! {
        <div class="mode-toggle" role="group" aria-label={text(props.lang, TextKey::Mode)}>
            { button(Mode::Auto, TextKey::ModeAuto) }
            { button(Mode::Manual, TextKey::ModeManual) }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ToggleProps {
    pub lang: Language,
    pub theme: Theme,
    pub ontoggle: Callback<()>,
}

#[function_component(ThemeToggle)]
pub fn theme_toggle(props: &ToggleProps) -> Html {
    let ontoggle = props.ontoggle.clone();
    // Shows the theme a click switches to.
    let next = match props.theme {
        Theme::Light => TextKey::ThemeDark,
        Theme::Dark => TextKey::ThemeLight,
    };
    html! {
        <button type="button" class="btn-secondary small"
            title={text(props.lang, TextKey::ThemeToggle)}
            onclick={Callback::from(move |_| ontoggle.emit(()))}>
            { text(props.lang, next) }
        </button>
    }
}

#[function_component(LanguageToggle)]
pub fn language_toggle(props: &ToggleProps) -> Html {
    let ontoggle = props.ontoggle.clone();
    html! {
        <button type="button" class="btn-secondary small"
            lang={props.lang.toggled().code()}
            onclick={Callback::from(move |_| ontoggle.emit(()))}>
            { text(props.lang, TextKey::LanguageToggle) }
        </button>
    }
}
