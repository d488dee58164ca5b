use super::{CmdMessage, CmdResult};
use crate::config::FolioConfig;
use crate::error::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

pub fn run(dir: &Path, action: ConfigAction) -> Result<CmdResult> {
    let mut config = FolioConfig::load(dir)?;
    let mut result = CmdResult::default();
    match action {
        ConfigAction::ShowAll => Ok(result.with_config(config)),
        ConfigAction::ShowKey(key) => {
            match config.get(&key) {
                Some(value) => result.add_message(CmdMessage::info(value)),
                None => {
                    result.add_message(CmdMessage::error(format!("Unknown config key: {key}")))
                }
            }
            Ok(result)
        }
        ConfigAction::Set(key, value) => {
            if let Err(e) = config.set(&key, &value) {
                result.add_message(CmdMessage::error(e));
                return Ok(result);
            }
            config.save(dir)?;
            let shown = config.get(&key).unwrap_or(value);
            let mut result = result.with_config(config);
            result.add_message(CmdMessage::success(format!("{key} set to {shown}")));
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use tempfile::tempdir;

    #[test]
    fn show_all_returns_defaults_without_file() {
        let temp = tempdir().unwrap();
        let result = run(temp.path(), ConfigAction::ShowAll).unwrap();
        assert_eq!(result.config, Some(FolioConfig::default()));
    }

    #[test]
    fn set_persists_and_reports() {
        let temp = tempdir().unwrap();
        let result = run(
            temp.path(),
            ConfigAction::Set("autosave-quiet-ms".into(), "500".into()),
        )
        .unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Success);
        assert_eq!(result.messages[0].content, "autosave-quiet-ms set to 500");

        let loaded = FolioConfig::load(temp.path()).unwrap();
        assert_eq!(loaded.autosave_quiet_ms, 500);
    }

    #[test]
    fn show_key_reports_unset_admin() {
        let temp = tempdir().unwrap();
        let result = run(temp.path(), ConfigAction::ShowKey("admin".into())).unwrap();
        assert_eq!(result.messages[0].content, "(none)");
    }

    #[test]
    fn bad_values_are_reported_not_saved() {
        let temp = tempdir().unwrap();
        let result = run(
            temp.path(),
            ConfigAction::Set("inline_image_limit".into(), "lots".into()),
        )
        .unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Error);
        assert!(!temp.path().join("config.json").exists());

        let result = run(temp.path(), ConfigAction::ShowKey("colour".into())).unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Error);
    }
}
