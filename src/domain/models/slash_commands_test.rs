use super::SlashCommand;

#[test]
fn it_parse_empty_string() {
    assert!(SlashCommand::parse("").is_none());
}

#[test]
fn it_parse_space_only() {
    assert!(SlashCommand::parse("   ").is_none());
}

#[test]
fn it_parse_single_slash() {
    assert!(SlashCommand::parse("/").is_none());
}

#[test]
fn it_parse_plain_text() {
    assert!(SlashCommand::parse("what is /quit?").is_none());
}

#[test]
fn it_parse_valid_prefix() {
    let cmd = SlashCommand::parse("/q");
    assert!(cmd.is_some());
    assert_eq!(cmd.unwrap().command, "/q");
}

#[test]
fn it_is_quit() {
    assert!(SlashCommand::parse("/q").unwrap().is_quit());
    assert!(SlashCommand::parse("/quit").unwrap().is_quit());
    assert!(SlashCommand::parse("/exit").unwrap().is_quit());
}

#[test]
fn it_is_clear() {
    assert!(SlashCommand::parse("/cl").unwrap().is_clear());
    assert!(SlashCommand::parse(" /clear ").unwrap().is_clear());
}

#[test]
fn it_is_model_list() {
    assert!(SlashCommand::parse("/ml").unwrap().is_model_list());
    assert!(SlashCommand::parse("/models").unwrap().is_model_list());
}

#[test]
fn it_is_model_set_with_args() {
    let cmd = SlashCommand::parse("/model  deepseek-chat").unwrap();
    assert!(cmd.is_model_set());
    assert_eq!(cmd.args, vec!["deepseek-chat".to_string()]);
}

#[test]
fn it_is_help() {
    assert!(SlashCommand::parse("/h").unwrap().is_help());
    assert!(SlashCommand::parse("/help").unwrap().is_help());
}
