//! Providers shipped with Scout.

pub mod apps;
pub mod calculator;
pub mod commands;
pub mod encode_decode;
pub mod files;
pub mod system_settings;
pub mod web;

use crate::{
    fs::config::Configuration,
    search::Registry,
};

use self::{
    apps::AppsProvider,
    calculator::CalculatorProvider,
    commands::CommandsProvider,
    encode_decode::EncodeDecodeProvider,
    files::FilesProvider,
    system_settings::SystemSettingsProvider,
    web::{SearchEngine, WebProvider},
};

/// Registers every built-in provider with the priorities from `config`.
pub fn register_builtins(registry: &mut Registry, config: &Configuration) {
    let priorities = &config.priorities;

    registry.register_provider(CalculatorProvider::new(priorities.calculator));
    registry.register_provider(CommandsProvider::new(
        config.commands_dir(),
        priorities.commands,
    ));
    registry.register_provider(EncodeDecodeProvider::new(priorities.encode_decode));
    registry.register_provider(SystemSettingsProvider::new(priorities.system_settings));
    registry.register_provider(AppsProvider::new(config));
    registry.register_provider(FilesProvider::new(config));
    registry.register_provider(WebProvider::new(
        SearchEngine::from_name(&config.web_search_engine),
        priorities.web,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_ordered_by_configured_priority() {
        let config = Configuration {
            application_dirs: vec![],
            applications: vec![],
            commands_dir: Some(std::path::PathBuf::from("/nonexistent/scout/commands")),
            priorities: crate::fs::config::Priorities {
                web: 0,
                ..Default::default()
            },
            ..Configuration::default()
        };

        let mut registry = Registry::new();
        register_builtins(&mut registry, &config);

        let names: Vec<&str> = registry.providers().iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            vec![
                "Web",
                "Calculator",
                "Commands",
                "Encoder/Decoder",
                "System Settings",
                "Applications",
                "Files"
            ]
        );
    }
}
