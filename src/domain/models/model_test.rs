use super::enabled_keys;
use super::toggles_from_keys;
use super::ModelToggle;

#[test]
fn it_builds_toggles_from_config_keys() {
    let toggles = toggles_from_keys("deepseek, grok,gemini,openai,");
    let keys = toggles
        .iter()
        .map(|toggle| return toggle.key.to_string())
        .collect::<Vec<String>>();

    assert_eq!(keys, vec!["deepseek", "grok", "gemini", "openai"]);
    assert!(toggles.iter().all(|toggle| return toggle.enabled));
}

#[test]
fn it_names_models() {
    assert_eq!(ModelToggle::new("deepseek").name, "Deepseek");
    assert_eq!(ModelToggle::new("grok").name, "Grok");
    assert_eq!(ModelToggle::new("openai").name, "GPT");
}

#[test]
fn it_filters_enabled_keys() {
    let mut toggles = toggles_from_keys("deepseek,grok,gemini");
    toggles[1].enabled = false;

    assert_eq!(enabled_keys(&toggles), vec!["deepseek", "gemini"]);
}
