//! Localization codes accepted in string catalogs.

use anyhow::Result;

use crate::ui::Style;

/// Supported localization codes and their names.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("bg", "Bulgarian"),
    ("ca", "Catalan"),
    ("cs", "Czech"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("en-AU", "English (Australia)"),
    ("en-GB", "English (United Kingdom)"),
    ("es", "Spanish"),
    ("es-419", "Spanish (Latin America)"),
    ("es-MX", "Spanish (Mexico)"),
    ("et", "Estonian"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("fil", "Filipino"),
    ("fr", "French"),
    ("fr-CA", "French (Canada)"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hr", "Croatian"),
    ("hu", "Hungarian"),
    ("id", "Indonesian"),
    ("is", "Icelandic"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("kk", "Kazakh"),
    ("ko", "Korean"),
    ("lt", "Lithuanian"),
    ("lv", "Latvian"),
    ("ms", "Malay"),
    ("nb", "Norwegian Bokmål"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("pt-BR", "Portuguese (Brazil)"),
    ("pt-PT", "Portuguese (Portugal)"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("sr", "Serbian"),
    ("sv", "Swedish"),
    ("th", "Thai"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("ur", "Urdu"),
    ("vi", "Vietnamese"),
    ("zh-HK", "Chinese (Hong Kong)"),
    ("zh-Hans", "Chinese (Simplified)"),
    ("zh-Hant", "Chinese (Traditional)"),
];

/// Returns the display name of a localization code.
pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, name)| *name)
}

/// Formats a code for prompts, e.g. `French (fr)`; unknown codes are used as-is.
pub fn describe_language(code: &str) -> String {
    language_name(code).map_or_else(|| code.to_string(), |name| format!("{name} ({code})"))
}

/// Prints all supported localization codes to stdout.
pub fn print_languages() {
    println!("{}", Style::header("Supported localization codes"));
    for (code, name) in SUPPORTED_LANGUAGES {
        println!("  {:8} {}", Style::code(code), Style::secondary(name));
    }
}

/// Validates that the given localization code is supported.
///
/// # Errors
///
/// Returns an error if the code is not in the supported list.
pub fn validate_language(lang: &str) -> Result<()> {
    if language_name(lang).is_some() {
        Ok(())
    } else {
        anyhow::bail!(
            "Invalid language code: '{lang}'\n\n\
             Valid codes look like: en, fr, de, ja, zh-Hans, pt-BR, ...\n\
             Run 'xcs languages' to see all supported codes."
        )
    }
}
