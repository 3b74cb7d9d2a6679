#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use super::ChatSession;
use super::ModelRegistry;
use super::PendingReply;
use crate::configuration::Config;
use crate::domain::models::AIModelDescriptor;
use crate::domain::models::Message;
use crate::domain::models::SlashCommand;
use crate::domain::models::ValidationError;

pub const LOADING_TEXT: &str = "AI is typing...";

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /models (/ml) - Lists all available models.
- /model (/m) [MODEL_NAME,MODEL_INDEX] - Sets the specified model as the active model. You can pass either the model id, or the index from /models
- /clear (/cl) - Clears the chat history.
- /quit /exit (/q) - Exit the chat.
- /help (/h) - Provides this help menu.

Anything else is sent to the selected model. Press CTRL+D to exit.
        "#;

    return text.trim().to_string();
}

/// Numbered model list, as used by `/model INDEX`. The selected model is
/// marked with a `*`.
pub fn format_model_list(models: &[AIModelDescriptor], selected: &str) -> String {
    return models
        .iter()
        .enumerate()
        .map(|(idx, model)| {
            let n = idx + 1;
            let mut line = format!("- ({n}) {} [{}]", model.id, model.name);
            if let Some(description) = &model.description {
                line = format!("{line} {description}");
            }
            if model.id == selected {
                line = format!("{line} *");
            }
            return line;
        })
        .collect::<Vec<String>>()
        .join("\n");
}

/// What the REPL should do with a line of input.
pub enum InputOutcome {
    /// Accepted by the session. The reply is sent once the future is awaited.
    Submitted(PendingReply),
    /// Never reached the backend. The session is unchanged.
    Rejected(ValidationError),
    Cleared,
    /// The model list should be fetched again and shown.
    ListModels,
    /// Text for the user that isn't part of the conversation.
    Notice(String),
    Quit,
}

/// The chat box: a session plus the model selector and display props around
/// it.
pub struct AppState {
    pub session: ChatSession,
    pub models: Vec<AIModelDescriptor>,
    pub selected_model: String,
    pub show_timestamps: bool,
    pub placeholder: String,
    pub app_name: String,
    pub app_version: String,
    rendered: usize,
}

impl AppState {
    pub fn new(session: ChatSession, config: &Config) -> AppState {
        return AppState {
            session,
            models: vec![],
            selected_model: config.model.to_string(),
            show_timestamps: config.show_timestamps,
            placeholder: config.placeholder.to_string(),
            app_name: config.app_name.to_string(),
            app_version: config.app_version.to_string(),
            rendered: 0,
        };
    }

    pub fn handle_input(&mut self, line: &str) -> InputOutcome {
        if let Some(command) = SlashCommand::parse(line) {
            if command.is_quit() {
                return InputOutcome::Quit;
            }

            if command.is_clear() {
                self.session.reset();
                self.rendered = 0;
                return InputOutcome::Cleared;
            }

            if command.is_help() {
                return InputOutcome::Notice(help_text());
            }

            if command.is_model_list() {
                return InputOutcome::ListModels;
            }

            if command.is_model_set() {
                let res = match command.args.first() {
                    Some(arg) => self.select_model(arg),
                    None => Err(
                        "You must specify a model name with `/model` or `/m`. Run `/help` for more details."
                            .to_string(),
                    ),
                };

                match res {
                    Ok(model) => {
                        return InputOutcome::Notice(format!("{model} has entered the chat."));
                    }
                    Err(err) => return InputOutcome::Notice(err),
                }
            }
        }

        let model = self.selected_model.to_string();
        match self.session.submit(line, &model) {
            Ok(pending) => return InputOutcome::Submitted(pending),
            Err(err) => return InputOutcome::Rejected(err),
        }
    }

    pub fn set_models(&mut self, models: Vec<AIModelDescriptor>) {
        if ModelRegistry::find(&models, &self.selected_model).is_none() {
            tracing::warn!(
                model = %self.selected_model,
                "Selected model isn't in the model list"
            );
        }

        self.models = models;
    }

    /// Switches the model by id or by its 1-based index in the model list.
    /// Returns the label of the selected model.
    pub fn select_model(&mut self, name: &str) -> Result<String, String> {
        if self.session.is_pending() {
            return Err("Can't switch models while waiting for a reply.".to_string());
        }

        let mut model_id = name.to_string();
        if let Ok(idx) = name.parse::<usize>() {
            if idx < 1 || idx > self.models.len() {
                return Err(format!("{idx} is not a valid index from the model list."));
            }
            model_id = self.models[idx - 1].id.to_string();
        }

        if !self.models.is_empty() && ModelRegistry::find(&self.models, &model_id).is_none() {
            return Err(format!(
                "No model named {model_id} found. Run `/models` to see what's available."
            ));
        }

        tracing::debug!(model = %model_id, "Selected model");
        self.selected_model = model_id;

        return Ok(self.selected_model_label());
    }

    /// Display name of the selected model, or its id when the list doesn't
    /// know it.
    pub fn selected_model_label(&self) -> String {
        return ModelRegistry::find(&self.models, &self.selected_model)
            .map(|model| return model.name.to_string())
            .unwrap_or_else(|| return self.selected_model.to_string());
    }

    pub fn model_list_text(&self) -> String {
        if self.models.is_empty() {
            return "Models are still loading.".to_string();
        }

        return format_model_list(&self.models, &self.selected_model);
    }

    pub fn render_message(&self, message: &Message) -> String {
        let line = format!("{}: {}", message.sender, message.content);
        if self.show_timestamps {
            return format!("[{}] {line}", message.format_time());
        }

        return line;
    }

    pub fn render_loading(&self) -> Option<String> {
        if self.session.is_pending() {
            return Some(LOADING_TEXT.to_string());
        }

        return None;
    }

    pub fn render_error_banner(&self) -> Option<String> {
        return self.session.last_error().map(|err| return format!("! {err}"));
    }

    pub fn render_prompt(&self) -> String {
        if self.session.is_disabled() {
            return format!("[{}] Chat is disabled.", self.selected_model_label());
        }

        return format!(
            "[{}] {} (max {})",
            self.selected_model_label(),
            self.placeholder,
            self.session.max_length()
        );
    }

    /// Character counter for a draft, flagged once it goes over the limit.
    pub fn render_counter(&self, draft: &str) -> String {
        let length = draft.trim().chars().count();
        let max = self.session.max_length();
        if length > max {
            return format!("{length}/{max} Message is too long.");
        }

        return format!("{length}/{max}");
    }

    /// The input affordance for a rejected submission. Empty input is
    /// ignored outright.
    pub fn render_rejection(&self, err: &ValidationError, draft: &str) -> Option<String> {
        match err {
            ValidationError::Empty => return None,
            ValidationError::TooLong { .. } => return Some(self.render_counter(draft)),
            ValidationError::Pending => return Some(LOADING_TEXT.to_string()),
            ValidationError::Disabled => return Some("Chat is disabled.".to_string()),
        }
    }

    /// Messages added since the last call.
    pub fn drain_new_messages(&mut self) -> Vec<Message> {
        let messages = self.session.messages();
        if self.rendered > messages.len() {
            self.rendered = 0;
        }

        let res = messages[self.rendered..].to_vec();
        self.rendered = messages.len();

        return res;
    }
}
