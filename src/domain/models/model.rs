#[cfg(test)]
#[path = "model_test.rs"]
mod tests;

/// Client-local toggle for one model backend. The key is both a store path
/// segment and the identifier sent to the submission service. Toggles are
/// never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelToggle {
    pub key: String,
    pub name: String,
    pub enabled: bool,
}

impl ModelToggle {
    pub fn new(key: &str) -> ModelToggle {
        return ModelToggle {
            key: key.to_string(),
            name: display_name(key),
            enabled: true,
        };
    }
}

/// Builds the toggle set from a comma separated list of model keys, all
/// enabled to start.
pub fn toggles_from_keys(keys: &str) -> Vec<ModelToggle> {
    return keys
        .split(',')
        .map(|key| return key.trim())
        .filter(|key| return !key.is_empty())
        .map(|key| return ModelToggle::new(key))
        .collect();
}

pub fn enabled_keys(toggles: &[ModelToggle]) -> Vec<String> {
    return toggles
        .iter()
        .filter(|toggle| return toggle.enabled)
        .map(|toggle| return toggle.key.to_string())
        .collect();
}

fn display_name(key: &str) -> String {
    if key == "openai" {
        return "GPT".to_string();
    }

    let mut chars = key.chars();
    return match chars.next() {
        Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
        None => "".to_string(),
    };
}
