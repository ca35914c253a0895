use crate::cli::SettingsCommand;
use crate::error::Result;
use crate::settings::SettingsStore;
use colored::Colorize;

fn on_off(value: bool) -> colored::ColoredString {
    if value {
        "on".green()
    } else {
        "off".yellow()
    }
}

/// Handle `dayjot settings`
pub fn handle_settings(store: &mut SettingsStore, command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Show => {
            let settings = store.settings();
            println!("Settings file:    {}", store.path().display());
            println!("Mock AI:          {}", on_off(settings.mock_ai_enabled));
            println!("Needs onboarding: {}", on_off(settings.needs_onboarding));
        }
        SettingsCommand::ToggleMockAi => {
            let enabled = store.toggle_mock_ai()?;
            println!("Mock AI is now {}", on_off(enabled));
        }
        SettingsCommand::CompleteOnboarding => {
            store.complete_onboarding()?;
            println!("{}", "Onboarding complete.".green());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_toggle_and_onboarding_persist() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let mut store = SettingsStore::new_with_path(&path);

        handle_settings(&mut store, SettingsCommand::ToggleMockAi).unwrap();
        handle_settings(&mut store, SettingsCommand::CompleteOnboarding).unwrap();
        handle_settings(&mut store, SettingsCommand::Show).unwrap();

        let reloaded = SettingsStore::new_with_path(&path);
        assert!(!reloaded.settings().mock_ai_enabled);
        assert!(!reloaded.settings().needs_onboarding);
    }
}
