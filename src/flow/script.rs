use std::path::Path;

use anyhow::{Context, Result};

/// Ordered list of interview prompts, addressed by 1-based index
#[derive(Debug, Clone)]
pub struct InterviewScript {
    questions: Vec<String>,
}

impl InterviewScript {
    pub fn new(questions: Vec<String>) -> Self {
        let questions = questions
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect();

        Self { questions }
    }

    /// Load a script from a plain text file, one question per line
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read script file {}", path.display()))?;

        let script = Self::new(text.lines().map(str::to_string).collect());
        if script.is_empty() {
            anyhow::bail!("Script file {} contains no questions", path.display());
        }

        Ok(script)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Prompt text for a 1-based question index
    pub fn question(&self, index: u32) -> Option<&str> {
        if index == 0 {
            return None;
        }
        self.questions.get(index as usize - 1).map(String::as_str)
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }
}

impl Default for InterviewScript {
    fn default() -> Self {
        Self::new(vec![
            "Introduce yourself.".to_string(),
            "What are your strengths?".to_string(),
            "What are your goals in the near future?".to_string(),
            "Why did you choose our company?".to_string(),
            "Do you have any questions for us?".to_string(),
        ])
    }
}
