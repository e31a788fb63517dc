//! Prompt templates for question answering and corpus analysis

/// Prompt builder for completion requests
pub struct PromptBuilder;

impl PromptBuilder {
    /// Prompt that restricts the answer to the retrieved context
    pub fn build_query_prompt(question: &str, context: &str) -> String {
        format!(
            r#"You are an expert assistant that answers questions based exclusively on the following context.

Context:
{context}

User question:
{question}

Give the clearest possible answer using ONLY the context."#,
            context = context,
            question = question,
        )
    }

    /// Prompt asking for a structured summary of the indexed content
    pub fn build_analysis_prompt(content: &str) -> String {
        format!(
            r#"Analyze the following content extracted from several documents.

Content:
{content}

Produce:
1. General summary
2. Main themes
3. Content type
4. Relevant points"#,
            content = content,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_prompt_contains_context_and_question() {
        let prompt = PromptBuilder::build_query_prompt("Who signed?", "The mayor signed the decree.");
        assert!(prompt.contains("Context:\nThe mayor signed the decree."));
        assert!(prompt.contains("User question:\nWho signed?"));
        assert!(prompt.contains("ONLY the context"));
    }

    #[test]
    fn test_analysis_prompt_lists_sections() {
        let prompt = PromptBuilder::build_analysis_prompt("quarterly report");
        assert!(prompt.contains("quarterly report"));
        for section in ["General summary", "Main themes", "Content type", "Relevant points"] {
            assert!(prompt.contains(section), "missing {}", section);
        }
    }
}
