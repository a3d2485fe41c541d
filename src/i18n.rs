//! English/Arabic string tables for every visible label.

use crate::error::PriceError;
use crate::pricing::{fields, Material};
use crate::preferences::Language;
use crate::utils::localize_digits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKey {
    AppTitle,
    Mode,
    ModeAuto,
    ModeManual,
    Material,
    Width,
    Height,
    Quantity,
    UnitPrice,
    Discount,
    SetupFee,
    Subtotal,
    DiscountAmount,
    Total,
    ThemeToggle,
    ThemeLight,
    ThemeDark,
    LanguageToggle,
    Reset,
    OfflineReady,
}

impl TextKey {
    pub const ALL: [TextKey; 20] = [
        TextKey::AppTitle,
        TextKey::Mode,
        TextKey::ModeAuto,
        TextKey::ModeManual,
        TextKey::Material,
        TextKey::Width,
        TextKey::Height,
        TextKey::Quantity,
        TextKey::UnitPrice,
        TextKey::Discount,
        TextKey::SetupFee,
        TextKey::Subtotal,
        TextKey::DiscountAmount,
        TextKey::Total,
        TextKey::ThemeToggle,
        TextKey::ThemeLight,
        TextKey::ThemeDark,
        TextKey::LanguageToggle,
        TextKey::Reset,
        TextKey::OfflineReady,
    ];
}

/// Look up the label for `key` in `lang`.
pub fn text(lang: Language, key: TextKey) -> &'static str {
    match lang {
        Language::English => english(key),
        Language::Arabic => arabic(key),
    }
}

fn english(key: TextKey) -> &'static str {
    match key {
        TextKey::AppTitle => "Pixel Price Calculator",
        TextKey::Mode => "Mode",
        TextKey::ModeAuto => "Auto",
        TextKey::ModeManual => "Manual",
        TextKey::Material => "Material",
        TextKey::Width => "Width (cm)",
        TextKey::Height => "Height (cm)",
        TextKey::Quantity => "Quantity",
        TextKey::UnitPrice => "Unit price",
        TextKey::Discount => "Discount (%)",
        TextKey::SetupFee => "Setup fee",
        TextKey::Subtotal => "Subtotal",
        TextKey::DiscountAmount => "Discount",
        TextKey::Total => "Total price",
        TextKey::ThemeToggle => "Theme",
        TextKey::ThemeLight => "Light",
        TextKey::ThemeDark => "Dark",
        // Names the language the toggle switches to.
        TextKey::LanguageToggle => "العربية",
        TextKey::Reset => "Reset",
        TextKey::OfflineReady => "Available offline",
    }
}

fn arabic(key: TextKey) -> &'static str {
    match key {
        TextKey::AppTitle => "حاسبة أسعار بكسل",
        TextKey::Mode => "الوضع",
        TextKey::ModeAuto => "تلقائي",
        TextKey::ModeManual => "يدوي",
        TextKey::Material => "الخامة",
        TextKey::Width => "العرض (سم)",
        TextKey::Height => "الارتفاع (سم)",
        TextKey::Quantity => "الكمية",
        TextKey::UnitPrice => "سعر الوحدة",
        TextKey::Discount => "الخصم (٪)",
        TextKey::SetupFee => "رسوم التجهيز",
        TextKey::Subtotal => "المجموع الفرعي",
        TextKey::DiscountAmount => "قيمة الخصم",
        TextKey::Total => "السعر الإجمالي",
        TextKey::ThemeToggle => "المظهر",
        TextKey::ThemeLight => "فاتح",
        TextKey::ThemeDark => "داكن",
        TextKey::LanguageToggle => "English",
        TextKey::Reset => "إعادة تعيين",
        TextKey::OfflineReady => "متاح دون اتصال",
    }
}

/// Label for an input key, used when reporting validation errors.
fn field_label(lang: Language, field: &str) -> &'static str {
    let key = match field {
        fields::WIDTH => TextKey::Width,
        fields::HEIGHT => TextKey::Height,
        fields::QUANTITY => TextKey::Quantity,
        fields::MATERIAL => TextKey::Material,
        fields::UNIT_PRICE => TextKey::UnitPrice,
        fields::DISCOUNT => TextKey::Discount,
        _ => TextKey::Total,
    };
    text(lang, key)
}

fn number(lang: Language, value: f64) -> String {
    let plain = if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    };
    match lang {
        Language::English => plain,
        Language::Arabic => localize_digits(&plain),
    }
}

/// Localized message for a validation error.
pub fn error_text(lang: Language, err: &PriceError) -> String {
    match (lang, err) {
        (Language::English, PriceError::Missing { field }) => {
            format!("{} is required", field_label(lang, field))
        }
        (Language::Arabic, PriceError::Missing { field }) => {
            format!("حقل {} مطلوب", field_label(lang, field))
        }
        (Language::English, PriceError::Invalid { field, .. }) => {
            format!("{} must be a number", field_label(lang, field))
        }
        (Language::Arabic, PriceError::Invalid { field, .. }) => {
            format!("يجب أن يكون {} رقمًا", field_label(lang, field))
        }
        (Language::English, PriceError::OutOfRange { field, min, max }) => format!(
            "{} must be between {} and {}",
            field_label(lang, field),
            number(lang, *min),
            number(lang, *max)
        ),
        (Language::Arabic, PriceError::OutOfRange { field, min, max }) => format!(
            "يجب أن يكون {} بين {} و{}",
            field_label(lang, field),
            number(lang, *min),
            number(lang, *max)
        ),
        (Language::English, PriceError::UnknownMaterial(id)) => format!("Unknown material: {id}"),
        (Language::Arabic, PriceError::UnknownMaterial(id)) => format!("خامة غير معروفة: {id}"),
        (Language::English, PriceError::RateCard(_)) => "Price list is unavailable".to_string(),
        (Language::Arabic, PriceError::RateCard(_)) => "قائمة الأسعار غير متاحة".to_string(),
    }
}

/// Display name of a material in `lang`.
pub fn material_name(lang: Language, material: &Material) -> &str {
    match lang {
        Language::English => &material.name_en,
        Language::Arabic => &material.name_ar,
    }
}
