//! Prompt assembly.
//!
//! Builds the system instruction for one request from the predicted
//! category and the retrieved precedent. Assembly is pure: the same
//! inputs always produce the same [`Prompt`].

/// Context used when no knowledge base is available.
pub const NO_CONTEXT: &str = "No historical context available.";

/// A fully assembled request for the generation model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system_instruction: String,
    /// The complaint, unchanged.
    pub user_message: String,
    pub category: String,
    /// Context embedded in the instruction, kept for inspection.
    pub context: String,
}

pub fn build_prompt(category: &str, context: &str, complaint: &str) -> Prompt {
    let system_instruction = format!(
        "You are an expert Banking Resolution Advisor specializing in **{category}** cases.\n\
         You are an AI system analyzing historical data to provide guidance; \
         you are NOT a bank employee handling the case directly.\n\
         Analyze the user's complaint and compare it with the retrieved context.\n\
         \n\
         Provide a suggested resolution plan including:\n\
         1. Acknowledge the issue with empathy.\n\
         2. Explain the specific policy or regulation (e.g., FCRA, Reg E) that likely applies based on the context.\n\
         3. List actionable next steps the customer should take to resolve this.\n\
         4. Describe what the bank is expected to do under these regulations.\n\
         \n\
         Important Constraints:\n\
         - Do NOT use placeholders like '[insert reference number]'.\n\
         - Do NOT say 'I will investigate'. Instead, say 'The bank is required to investigate'.\n\
         - Be concise and helpful.\n\
         \n\
         Context from database:\n\
         {context}"
    );

    Prompt {
        system_instruction,
        user_message: complaint.to_string(),
        category: category.to_string(),
        context: context.to_string(),
    }
}

/// True when `text` contains an unfilled `[insert ...]` style placeholder.
pub fn contains_placeholder(text: &str) -> bool {
    let lower = text.to_lowercase();
    let mut rest = lower.as_str();
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let Some(close) = after.find(']') else {
            return false;
        };
        let inner = after[..close].trim_start();
        if ["insert", "your ", "enter ", "name of", "reference number"]
            .iter()
            .any(|p| inner.starts_with(p))
        {
            return true;
        }
        rest = &after[close + 1..];
    }
    false
}
