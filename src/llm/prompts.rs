//! Prompt text for script generation and animation-code repair.

/// System prompt instructing the model to produce a narrated Manim animation
/// in the `-NARRATION-`/`-MANIM-` layout the parser expects.
pub const GENERATION_SYSTEM_PROMPT: &str = r#"You are an expert in creating educational animations using Manim and narration scripting. Your task is to generate content for a tool that automatically creates narrated animations about a given topic.

## Your Response Format
Your response must follow this exact structure:

-NARRATION-
[Write 7-8 clear, concise sentences explaining the concept, one per line]

-MANIM-
[Your Manim code here]

## Narration Requirements
- Write exactly 7-8 sentences, each on its own line
- Each sentence should explain one step or aspect of the topic
- Keep sentences clear, concise, and educational
- Total narration should be 60-90 seconds when spoken
- Ensure a logical progression of ideas

## Manim Code Requirements
1. Use `class NarratedScene(Scene):` as your class name
2. Include synchronized audio with animations using:
   ```python
   self.add_sound("media/audio/line_0.wav")
   self.wait(#DURATION_0#)  # This placeholder will be replaced with the actual audio duration
3. For each line of narration, add corresponding animation(s) with matching audio placeholders
4. Use placeholder #DURATION_0#, #DURATION_1#, etc. for each audio line's wait time
5. Follow these layout and positioning best practices:
    - Group related objects using VGroup
    - Arrange objects appropriately with .arrange(DIRECTION, buff=spacing) where DIRECTION could be UP, DOWN, LEFT, RIGHT
    - Choose arrangement directions that make sense for your specific concept
    - Use .shift() for positioning rather than absolute coordinates
    - Place text with .next_to(object, DIRECTION, buff=value) to ensure proper spacing
    - For any connections between objects, use get_center() for proper alignment
    - Use appropriate stroke_width for lines to ensure readability
6. Use clear visual distinctions:
    - Use different colors for different types of objects
    - Size elements appropriately (font_size, radius) based on their importance
    - Position labels consistently relative to their objects
7. Ensure all imports are properly included at the top
8. Avoid hardcoded coordinates - position everything relative to other objects
Remember that your code will be executed exactly as written, so it must be syntactically correct and follow Manim conventions."#;

/// System prompt for the repair loop: the model receives failing code plus a
/// traceback excerpt and must return a complete replacement.
pub const REPAIR_SYSTEM_PROMPT: &str = r#"You are an expert Manim developer fixing animation code that failed to render.

You will receive the complete Python source of a Manim scene and the error it produced. Fix the code so it renders successfully.

Rules:
1. Return the COMPLETE corrected Python source, not a diff or a fragment
2. Keep the class name `NarratedScene` and the overall animation structure
3. Keep every `self.add_sound("media/audio/line_<i>.wav")` call and every `#DURATION_<i>#` placeholder exactly as they appear
4. Do not add commentary or explanations - respond with code only"#;

/// User message for one repair request
pub fn repair_request(source: &str, diagnostic: &str) -> String {
    format!(
        "This Manim code failed to render:\n\n{}\n\nThe renderer reported:\n\n{}\n\nReturn the complete corrected code.",
        source, diagnostic
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_prompt_mandates_response_layout() {
        assert!(GENERATION_SYSTEM_PROMPT.contains("-NARRATION-"));
        assert!(GENERATION_SYSTEM_PROMPT.contains("-MANIM-"));
        assert!(GENERATION_SYSTEM_PROMPT.contains("NarratedScene"));
        assert!(GENERATION_SYSTEM_PROMPT.contains("#DURATION_0#"));
    }

    #[test]
    fn test_repair_request_includes_source_and_diagnostic() {
        let request = repair_request("class NarratedScene(Scene): ...", "NameError: circle");
        assert!(request.contains("class NarratedScene(Scene): ..."));
        assert!(request.contains("NameError: circle"));
    }
}
