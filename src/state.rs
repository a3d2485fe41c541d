//! Calculator state and the reducer driving the form.
//!
//! Every action recomputes the quote synchronously, so the view always
//! renders a result that matches the current inputs.

use crate::config::{DEFAULT_HEIGHT_CM, DEFAULT_QUANTITY, DEFAULT_WIDTH_CM};
use crate::error::PriceError;
use crate::preferences::{Direction, Language, Preferences, Theme};
use crate::pricing::{fields, CalculationInput, Mode, PriceFormula, Quote};
use std::fmt;
use std::rc::Rc;
use yew::Reducible;

#[derive(Debug, Clone, PartialEq)]
pub enum CalculatorAction {
    SetField { key: String, value: String },
    SetMode(Mode),
    ToggleTheme,
    ToggleLanguage,
    /// Restore default inputs and mode; preferences are kept.
    Reset,
}

#[derive(Clone)]
pub struct CalculatorState {
    pub inputs: CalculationInput,
    pub mode: Mode,
    pub preferences: Preferences,
    pub result: Result<Quote, PriceError>,
    formula: Rc<dyn PriceFormula>,
}

impl fmt::Debug for CalculatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalculatorState")
            .field("inputs", &self.inputs)
            .field("mode", &self.mode)
            .field("preferences", &self.preferences)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

/// Form values shown on first load.
pub fn default_inputs() -> CalculationInput {
    CalculationInput::new()
        .with(fields::WIDTH, &DEFAULT_WIDTH_CM.to_string())
        .with(fields::HEIGHT, &DEFAULT_HEIGHT_CM.to_string())
        .with(fields::QUANTITY, &DEFAULT_QUANTITY.to_string())
}

impl CalculatorState {
    pub fn new(formula: Rc<dyn PriceFormula>, preferences: Preferences) -> Self {
        let inputs = default_inputs();
        let mode = Mode::default();
        let result = formula.compute(&inputs, mode);
        Self {
            inputs,
            mode,
            preferences,
            result,
            formula,
        }
    }

    pub fn theme(&self) -> Theme {
        self.preferences.theme
    }

    pub fn language(&self) -> Language {
        self.preferences.language
    }

    pub fn direction(&self) -> Direction {
        self.preferences.language.direction()
    }

    /// Apply an action and return the recomputed state.
    pub fn apply(&self, action: CalculatorAction) -> Self {
        let mut next = self.clone();
        match action {
            CalculatorAction::SetField { key, value } => next.inputs.set(&key, &value),
            CalculatorAction::SetMode(mode) => next.mode = mode,
            CalculatorAction::ToggleTheme => {
                next.preferences.theme = next.preferences.theme.toggled()
            }
            CalculatorAction::ToggleLanguage => {
                next.preferences.language = next.preferences.language.toggled()
            }
            CalculatorAction::Reset => {
                next.inputs = default_inputs();
                next.mode = Mode::default();
            }
        }
        next.result = next.formula.compute(&next.inputs, next.mode);
        next
    }
}

impl Reducible for CalculatorState {
    type Action = CalculatorAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        Rc::new(self.apply(action))
    }
}
