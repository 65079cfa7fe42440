use serde::Serialize;

use super::TranslationRequest;
use super::language::describe_language;

pub const SYSTEM_PROMPT_TEMPLATE: &str = "You are a professional translator localizing the user interface of a software application. \
     Translate every string from {source_language} to {target_language}. \
     Keep format specifiers and placeholders exactly as written, for example %@, %d, %lld, %1$@ and {count}. \
     Preserve leading and trailing whitespace, line breaks and markup. \
     Match the tone of the source and keep translations concise enough for UI labels. \
     Return each key exactly once, unchanged, together with its translation.";

#[derive(Serialize)]
struct UserMessage<'a> {
    strings: &'a [TranslationRequest],
}

#[allow(clippy::literal_string_with_formatting_args)]
pub fn build_system_prompt(
    source_language: &str,
    target_language: &str,
    app_context: Option<&str>,
) -> String {
    // {source_language} and {target_language} are placeholders for string replacement
    let mut prompt = SYSTEM_PROMPT_TEMPLATE
        .replace("{source_language}", &describe_language(source_language))
        .replace("{target_language}", &describe_language(target_language));

    if let Some(context) = app_context.map(str::trim).filter(|c| !c.is_empty()) {
        prompt.push_str("\n\nContext about the app, use it to pick the right terminology:\n");
        prompt.push_str(context);
    }

    prompt
}

/// Serializes the chunk as `{"strings": [{"key": ..., "text": ...}]}`.
pub fn build_user_message(items: &[TranslationRequest]) -> serde_json::Result<String> {
    serde_json::to_string(&UserMessage { strings: items })
}
