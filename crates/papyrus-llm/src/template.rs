//! Conversational prompt templates for local models

use serde::{Deserialize, Serialize};

/// Chat template the bundled model was trained with.
///
/// The local runtime receives a single flat prompt, so the system and user
/// messages have to be wrapped in the model's own turn markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatTemplate {
    /// `<|im_start|>` / `<|im_end|>` markers (Qwen, Phi, Hermes, ...)
    #[default]
    ChatMl,
    /// Llama 3 header markers
    Llama3,
    /// Mistral `[INST]` markers; the system text is folded into the first user turn
    Mistral,
}

impl ChatTemplate {
    /// Render a system + user exchange, leaving the assistant turn open
    ///
    /// # Examples
    ///
    /// ```
    /// use papyrus_llm::ChatTemplate;
    ///
    /// let prompt = ChatTemplate::ChatMl.render("Be brief.", "Hi");
    /// assert!(prompt.ends_with("<|im_start|>assistant\n"));
    /// ```
    pub fn render(&self, system: &str, user: &str) -> String {
        match self {
            ChatTemplate::ChatMl => format!(
                "<|im_start|>system\n{}<|im_end|>\n<|im_start|>user\n{}<|im_end|>\n<|im_start|>assistant\n",
                system, user
            ),
            ChatTemplate::Llama3 => format!(
                "<|begin_of_text|><|start_header_id|>system<|end_header_id|>\n\n{}<|eot_id|>\
                 <|start_header_id|>user<|end_header_id|>\n\n{}<|eot_id|>\
                 <|start_header_id|>assistant<|end_header_id|>\n\n",
                system, user
            ),
            ChatTemplate::Mistral => format!("<s>[INST] {}\n\n{} [/INST]", system, user),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chatml_order() {
        let prompt = ChatTemplate::ChatMl.render("SYS", "USER");
        let sys = prompt.find("SYS").unwrap();
        let user = prompt.find("USER").unwrap();
        assert!(sys < user);
        assert!(prompt.starts_with("<|im_start|>system\n"));
    }

    #[test]
    fn test_llama3_open_assistant_turn() {
        let prompt = ChatTemplate::Llama3.render("SYS", "USER");
        assert!(prompt.starts_with("<|begin_of_text|>"));
        assert!(prompt.ends_with("<|start_header_id|>assistant<|end_header_id|>\n\n"));
        assert_eq!(prompt.matches("<|eot_id|>").count(), 2);
    }

    #[test]
    fn test_mistral_folds_system() {
        assert_eq!(
            ChatTemplate::Mistral.render("SYS", "USER"),
            "<s>[INST] SYS\n\nUSER [/INST]"
        );
    }

    #[test]
    fn test_serde_names() {
        let t: ChatTemplate = serde_json::from_str("\"chatml\"").unwrap();
        assert_eq!(t, ChatTemplate::ChatMl);
        let t: ChatTemplate = serde_json::from_str("\"llama3\"").unwrap();
        assert_eq!(t, ChatTemplate::Llama3);
    }
}
