//! Provider listing command handler.

use anyhow::Result;

use crate::config::{ConfigFile, ConfigManager};
use crate::ui::Style;

/// Prints configured providers to stdout.
///
/// If `specific_provider` is provided, shows detailed information for that provider.
/// Otherwise, lists all configured providers with their endpoints and models.
pub fn print_providers(specific_provider: Option<&str>) -> Result<()> {
    let config = ConfigManager::new().load_or_default()?;
    print!("{}", render_providers(&config, specific_provider)?);
    Ok(())
}

fn render_providers(config: &ConfigFile, specific_provider: Option<&str>) -> Result<String> {
    let mut out = String::new();

    if config.providers.is_empty() {
        out.push_str("No providers configured.\n");
        out.push_str("Add providers to ~/.config/xcs/config.toml\n");
        return Ok(out);
    }

    let default_provider = config.xcs.provider.as_deref();
    let marker = |name: &str| {
        if default_provider == Some(name) {
            format!(" {}", Style::default_marker())
        } else {
            String::new()
        }
    };

    if let Some(provider_name) = specific_provider {
        let Some(provider) = config.providers.get(provider_name) else {
            anyhow::bail!("Provider '{provider_name}' not found");
        };

        out.push_str(&format!(
            "{} {}{}\n",
            Style::header("Provider:"),
            Style::value(provider_name),
            marker(provider_name)
        ));
        out.push_str(&format!(
            "  {} = {}\n",
            Style::label("endpoint"),
            provider.endpoint
        ));
        if provider.requires_api_key() {
            let state = if provider.get_api_key().is_some() {
                "(set)"
            } else {
                "(not set)"
            };
            out.push_str(&format!("  {}  = {state}\n", Style::label("api_key")));
        }
        if provider.models.is_empty() {
            out.push_str(&format!(
                "  {}   = (none configured)\n",
                Style::label("models")
            ));
        } else {
            out.push_str(&format!("  {}:\n", Style::label("models")));
            for model in &provider.models {
                out.push_str(&format!("    - {model}\n"));
            }
        }
    } else {
        out.push_str(&format!("{}\n\n", Style::header("Configured providers:")));

        let mut names: Vec<&String> = config.providers.keys().collect();
        names.sort();

        for name in names {
            let provider = &config.providers[name];
            out.push_str(&format!("  {}{}\n", Style::value(name), marker(name)));
            out.push_str(&format!(
                "    {} {}\n",
                Style::label("endpoint:"),
                Style::secondary(&provider.endpoint)
            ));
            if !provider.models.is_empty() {
                out.push_str(&format!(
                    "    {} {}\n",
                    Style::label("models:"),
                    provider.models.join(", ")
                ));
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_config() -> ConfigFile {
        toml::from_str(
            r#"
[xcs]
provider = "ollama"

[providers.ollama]
endpoint = "http://localhost:11434"
models = ["llama3.2"]

[providers.openai]
endpoint = "https://api.openai.com"
api_key_env = "XCS_TEST_UNSET_PROVIDER_KEY"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_render_empty_config() {
        let out = render_providers(&ConfigFile::default(), None).unwrap();
        assert!(out.contains("No providers configured"));
    }

    #[test]
    fn test_render_lists_providers_sorted() {
        let out = render_providers(&sample_config(), None).unwrap();

        let ollama = out.find("ollama").unwrap();
        let openai = out.find("openai").unwrap();
        assert!(ollama < openai);
        assert!(out.contains("(default)"));
        assert!(out.contains("llama3.2"));
    }

    #[test]
    fn test_render_single_provider() {
        let out = render_providers(&sample_config(), Some("openai")).unwrap();

        assert!(out.contains("https://api.openai.com"));
        assert!(out.contains("(not set)"));
        assert!(out.contains("(none configured)"));
        assert!(!out.contains("ollama"));
    }

    #[test]
    fn test_render_unknown_provider() {
        let err = render_providers(&sample_config(), Some("missing")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
