use crate::llm::ChatMessage;

pub const PERSONA_INSTRUCTION: &str = "あなたはザリガニ猫を飼っています。これから質問をしますので、ユーモアを交えてザリガニ猫の状況について答えてください。";

pub const EMOTION_INSTRUCTION: &str = "回答の1行目には、そのときのザリガニ猫の気持ちを「喜」「怒」「哀」「楽」のいずれか1文字だけで書き、2行目から回答を書いてください。";

pub const PERSONA_ACKNOWLEDGEMENT: &str = "もちろんです！では、どんな質問でも受け付けますよ。ザリガニ猫の飼い主の立場から楽しくお答えします。";

/// Persona conversation prefix followed by the user's question.
pub fn build_messages(input_text: &str, emotion_tagged: bool) -> Vec<ChatMessage> {
    let instruction = if emotion_tagged {
        format!("{PERSONA_INSTRUCTION}{EMOTION_INSTRUCTION}")
    } else {
        PERSONA_INSTRUCTION.to_string()
    };

    vec![
        ChatMessage::user(instruction),
        ChatMessage::assistant(PERSONA_ACKNOWLEDGEMENT),
        ChatMessage::user(input_text),
    ]
}

#[cfg(test)]
mod tests {
    use super::{build_messages, EMOTION_INSTRUCTION, PERSONA_INSTRUCTION};
    use crate::llm::Role;

    #[test]
    fn question_is_the_last_user_message() {
        let messages = build_messages("今日のザリガニ猫は？", false);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, PERSONA_INSTRUCTION);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[2].role, Role::User);
        assert_eq!(messages[2].content, "今日のザリガニ猫は？");
    }

    #[test]
    fn emotion_tagged_prompt_asks_for_a_marker_line() {
        let messages = build_messages("元気？", true);
        assert!(messages[0].content.ends_with(EMOTION_INSTRUCTION));
    }
}
