use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use pricebook_core::config::{AppConfig, LoadOptions};
use toml::Value;

use crate::commands::CommandResult;

const COMMAND: &str = "config";

struct ConfigField {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_config_error(COMMAND, &error),
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields = [
        ConfigField {
            key_path: "backend.base_url",
            env_keys: &["PRICEBOOK_BACKEND_BASE_URL"],
            value: config.backend.base_url.clone(),
        },
        ConfigField {
            key_path: "backend.timeout_secs",
            env_keys: &["PRICEBOOK_BACKEND_TIMEOUT_SECS"],
            value: config.backend.timeout_secs.to_string(),
        },
        ConfigField {
            key_path: "catalog.markets",
            env_keys: &["PRICEBOOK_CATALOG_MARKETS"],
            value: config.catalog.markets.join(", "),
        },
        ConfigField {
            key_path: "logging.level",
            env_keys: &["PRICEBOOK_LOGGING_LEVEL", "PRICEBOOK_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        ConfigField {
            key_path: "logging.format",
            env_keys: &["PRICEBOOK_LOGGING_FORMAT", "PRICEBOOK_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format),
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(fields.iter().map(|field| {
        render_line(
            field.key_path,
            &field.value,
            field_source(
                field.key_path,
                field.env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
        )
    }));

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    ["pricebook.toml", "config/pricebook.toml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use super::{contains_path, render_line};

    #[test]
    fn finds_nested_keys_in_config_document() {
        let doc: toml::Value =
            "[backend]\nbase_url = \"http://catalog:3333\"\n".parse().expect("toml");

        assert!(contains_path(&doc, "backend.base_url"));
        assert!(!contains_path(&doc, "backend.timeout_secs"));
        assert!(!contains_path(&doc, "logging.level"));
    }

    #[test]
    fn renders_source_attribution() {
        assert_eq!(
            render_line("backend.timeout_secs", "10", "default".to_string()),
            "- backend.timeout_secs = 10 (source: default)"
        );
    }
}
