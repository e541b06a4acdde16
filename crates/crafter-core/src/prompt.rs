//! Prompt construction.

use crate::request::GenerationRequest;

/// Build the instruction sent to the generation service.
///
/// The output is deterministic for a given request. It always ends with the
/// single-code-block requirement that [`crate::extract::extract_code`] relies on.
pub fn build_prompt(request: &GenerationRequest) -> String {
    let framework = request.framework();

    format!(
        r#"You are an experienced frontend developer skilled in multiple frameworks.
Generate a modern, animated, and responsive component for: {description}.
Framework to use: {label}.

{instruction}

Requirements:
- Focus on responsiveness, animation, and visual design.
- Include hover effects, animations, and clean structure.
- Return ONLY the code, wrapped in a single Markdown code block (like ```{fence_hint} ... ```).
- Do NOT include explanations, comments, or any text outside the code block.
"#,
        description = request.description(),
        label = framework.label,
        instruction = framework.instruction,
        fence_hint = framework.extension(),
    )
}
