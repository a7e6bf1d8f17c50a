use std::{error::Error, time::Duration};

use crate::config::{GestureConfig, LoadError};

#[tokio::test]
async fn test_empty_yaml_uses_defaults() -> Result<(), Box<dyn Error>> {
    let config = GestureConfig::from_yaml("{}".to_string())?;
    assert_eq!(config, GestureConfig::default());
    assert_eq!(config.short_tap_window(), Duration::from_millis(300));
    assert_eq!(config.button_pacing(), Duration::from_millis(50));

    Ok(())
}

#[tokio::test]
async fn test_partial_yaml_overrides_fields() -> Result<(), Box<dyn Error>> {
    let content = "short_tap_ms: 250\nshort_move_range: 1500\n".to_string();
    let config = GestureConfig::from_yaml(content)?;
    assert_eq!(config.short_tap_ms, 250);
    assert_eq!(config.short_move_range, 1500);
    assert_eq!(config.short_move_tolerance, 100);
    assert_eq!(config.toggle_contacts, 4);

    Ok(())
}

#[tokio::test]
async fn test_yaml_round_trip() -> Result<(), Box<dyn Error>> {
    let config = GestureConfig {
        button_pacing_ms: 20,
        ..Default::default()
    };
    let content = config.to_yaml()?;
    let parsed = GestureConfig::from_yaml(content)?;
    assert_eq!(parsed, config);

    Ok(())
}

#[tokio::test]
async fn test_invalid_yaml_is_rejected() -> Result<(), Box<dyn Error>> {
    let result = GestureConfig::from_yaml("short_tap_ms: soon".to_string());
    assert!(matches!(result, Err(LoadError::DeserializeError(_))));

    let result = GestureConfig::from_yaml_file("/nonexistent/touch2pad.yaml".to_string());
    assert!(matches!(result, Err(LoadError::IoError(_))));

    Ok(())
}

#[tokio::test]
async fn test_unusable_values_are_rejected() -> Result<(), Box<dyn Error>> {
    let result = GestureConfig::from_yaml("short_tap_ms: 0".to_string());
    assert!(matches!(result, Err(LoadError::InvalidConfig(_))));

    for contacts in [0, 1, 2, 11] {
        let result = GestureConfig::from_yaml(format!("toggle_contacts: {contacts}"));
        assert!(matches!(result, Err(LoadError::InvalidConfig(_))));
    }

    let config = GestureConfig::from_yaml("toggle_contacts: 3".to_string())?;
    assert_eq!(config.toggle_contacts, 3);
    assert!(GestureConfig::default().validate().is_ok());

    Ok(())
}
