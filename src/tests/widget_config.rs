use super::*;

#[test]
fn default_config_uses_standard_placeholder_and_separator() -> Result<()> {
    let config = WidgetConfig::default();
    assert_eq!(config.placeholder, "---");
    assert_eq!(config.separator, ">>>");
    config.validate()?;

    assert_eq!(WidgetConfig::from_toml_str("")?, config);
    Ok(())
}

#[test]
fn partial_toml_keeps_defaults_for_missing_keys() -> Result<()> {
    let config = WidgetConfig::from_toml_str(r#"separator = "::""#)?;
    assert_eq!(config.separator, "::");
    assert_eq!(config.placeholder, DEFAULT_PLACEHOLDER);

    let config = WidgetConfig::from_toml_str(
        r#"
        placeholder = "(none)"
        separator = "|"
        "#,
    )?;
    assert_eq!(config.placeholder, "(none)");
    assert_eq!(config.separator, "|");
    Ok(())
}

#[test]
fn empty_separator_is_rejected() {
    match WidgetConfig::from_toml_str(r#"separator = """#) {
        Err(Error::Config(message)) => assert_eq!(message, "separator cannot be empty"),
        other => panic!("expected Config error, got: {other:?}"),
    }
}

#[test]
fn unknown_keys_and_wrong_types_are_rejected() {
    assert!(matches!(
        WidgetConfig::from_toml_str(r#"seperator = "::""#),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        WidgetConfig::from_toml_str("placeholder = 3"),
        Err(Error::Config(_))
    ));
}

#[test]
fn configured_field_parses_with_its_placeholder() -> Result<()> {
    let config = WidgetConfig::from_toml_str(r#"placeholder = "n/a""#)?;
    let field = DoubleDropField::with_config("a,b(c)", config)?;

    assert_eq!(field.choices().sub_choices("a"), Some(&["n/a".to_string()][..]));
    assert_eq!(field.compress("b", "c"), "b>>>c");
    Ok(())
}
