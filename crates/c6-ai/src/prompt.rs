//! Prompt construction for the code llama instruct models.

/// Instruction given to the model for every question.
pub const SYSTEM_PROMPT: &str =
    "You are an SQL query generator for SQLite. Answer only with SQLite queries, no text before or after.";

/// Build the system block, optionally followed by the database schema.
pub fn build_system_prompt(schema: Option<&str>) -> String {
    match schema {
        Some(schema) => format!("{SYSTEM_PROMPT}\n\nThis is the database schema:\n\n{schema}"),
        None => SYSTEM_PROMPT.to_string(),
    }
}

/// Render the llama2 chat template.
///
/// See <https://huggingface.co/blog/llama2#how-to-prompt-llama-2>.
pub fn build_prompt(system: &str, question: &str) -> String {
    format!("<s>[INST] <<SYS>>\n{system}\n<</SYS>>\n\n{question} [/INST]\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_layout() {
        let prompt = build_prompt("Be terse.", "How many users?");
        assert_eq!(
            prompt,
            "<s>[INST] <<SYS>>\nBe terse.\n<</SYS>>\n\nHow many users? [/INST]\n"
        );
    }

    #[test]
    fn test_prompt_contains_inputs_once() {
        let system = build_system_prompt(None);
        let question = "Which company has the most employees?";
        let prompt = build_prompt(&system, question);

        assert_eq!(prompt.matches(SYSTEM_PROMPT).count(), 1);
        assert_eq!(prompt.matches(question).count(), 1);
        assert!(prompt.starts_with("<s>[INST] <<SYS>>\n"));
        assert!(prompt.ends_with(" [/INST]\n"));
        assert_eq!(prompt.matches("<</SYS>>").count(), 1);
        assert!(prompt.find(SYSTEM_PROMPT) < prompt.find("<</SYS>>"));
        assert!(prompt.find("<</SYS>>") < prompt.find(question));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let schema = "CREATE TABLE t (id integer);";
        let a = build_prompt(&build_system_prompt(Some(schema)), "count t");
        let b = build_prompt(&build_system_prompt(Some(schema)), "count t");
        assert_eq!(a, b);
    }

    #[test]
    fn test_system_prompt_with_schema() {
        let schema = "CREATE TABLE t (id integer);\n";
        let system = build_system_prompt(Some(schema));
        assert_eq!(
            system,
            format!("{SYSTEM_PROMPT}\n\nThis is the database schema:\n\n{schema}")
        );
    }

    #[test]
    fn test_system_prompt_without_schema() {
        assert_eq!(build_system_prompt(None), SYSTEM_PROMPT);
    }
}
