/*!
 * Prompt templates for document translation.
 *
 * Three request kinds are sent per segment: the context-aware translation, the
 * literal back-translation used for verification, and the optional quality audit.
 * Every template is deterministic so the exact prompt can be stored with the
 * segment and inspected afterwards.
 */

/// Prompt template with `{source_language}` / `{target_language}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// Role line shared by both translation prompt shapes.
    pub const TRANSLATOR_ROLE: &'static str =
        "You are an expert translator specializing in maintaining context, tone, and nuance.";

    /// Literal back-translation used to verify meaning preservation.
    pub const BACK_TRANSLATOR: &'static str = r#"You are an impartial verification assistant.

Task: Translate the following text from {target_language} back to {source_language} literally and accurately.

Purpose: This back-translation will be used to verify if the original meaning was preserved.

Instructions:
1. Translate strictly what is written.
2. Do not improve, polish or embellish the text if the input is awkward; reflect the input accuracy.
3. Output ONLY the back-translated text, without notes or explanations."#;

    /// Quality audit of one translated segment.
    pub const EVALUATOR: &'static str = r#"You are a meticulous translation quality auditor reviewing a {source_language} to {target_language} translation.

Task: Audit the translated segment below against its original. Use the back-translation as evidence of what the translation actually says, and the full document only for reference.

Check for:
1. Ambiguity introduced by the translation.
2. Meaning drift between the original and the translation.
3. Poor or unnatural word choice in {target_language}.
4. Anything likely to confuse a {target_language} reader.

Output a concise bulleted list of findings. If there are no issues, state that the translation is accurate.
Do NOT re-translate the text or propose a full alternative translation."#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Template for back-translation prompts.
    pub fn back_translator() -> Self {
        Self::new(Self::BACK_TRANSLATOR)
    }

    /// Template for evaluation prompts.
    pub fn evaluator() -> Self {
        Self::new(Self::EVALUATOR)
    }

    /// Render the template with the given variables.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

/// Wrap text in triple-quote fences so the model can tell instructions from material.
fn fenced(label: &str, body: &str) -> String {
    format!("{}:\n\"\"\"\n{}\n\"\"\"", label, body)
}

/// Builder for the translate-stage prompt.
///
/// The prompt is a plain single-shot request when the segment is the whole
/// document, and otherwise carries the full document and the translation so far.
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder {
    source_language: String,
    target_language: String,
    segment: String,
    full_document: String,
    translation_so_far: String,
    custom_instructions: Option<String>,
}

impl TranslationPromptBuilder {
    /// Create a new prompt builder.
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            segment: String::new(),
            full_document: String::new(),
            translation_so_far: String::new(),
            custom_instructions: None,
        }
    }

    /// Set the segment to translate.
    pub fn with_segment(mut self, segment: &str) -> Self {
        self.segment = segment.to_string();
        self
    }

    /// Set the full source document used as background context.
    pub fn with_full_document(mut self, document: &str) -> Self {
        self.full_document = document.to_string();
        self
    }

    /// Set the accumulated translation of the preceding segments.
    pub fn with_translation_so_far(mut self, translation: &str) -> Self {
        self.translation_so_far = translation.to_string();
        self
    }

    /// Set custom style or tone instructions. Blank instructions are ignored.
    pub fn with_custom_instructions(mut self, instructions: Option<&str>) -> Self {
        self.custom_instructions = instructions
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        self
    }

    /// Whether the segment covers the entire document (the `none` strategy).
    pub fn is_whole_document(&self) -> bool {
        self.segment.trim() == self.full_document.trim()
    }

    /// Build the prompt.
    pub fn build(&self) -> String {
        if self.is_whole_document() {
            self.build_single_shot()
        } else {
            self.build_contextual()
        }
    }

    fn build_single_shot(&self) -> String {
        let mut sections = vec![
            PromptTemplate::TRANSLATOR_ROLE.to_string(),
            format!(
                "Task: Translate the following text from {} to {}.",
                self.source_language, self.target_language
            ),
        ];

        if let Some(instructions) = &self.custom_instructions {
            sections.push(format!("Style/tone instructions:\n{}", instructions));
        }

        sections.push(
            "Output ONLY the translated text. Do not add any conversational filler, notes, or commentary."
                .to_string(),
        );
        sections.push(fenced("Text to Translate", &self.segment));

        sections.join("\n\n")
    }

    fn build_contextual(&self) -> String {
        let mut task = String::new();
        if let Some(instructions) = &self.custom_instructions {
            task.push_str(&format!("Additional style/tone instructions:\n{}\n\n", instructions));
        }
        task.push_str(&format!(
            "Task: Translate ONLY the \"Segment to Translate\" below from {} to {}.",
            self.source_language, self.target_language
        ));

        let mut rules = vec![
            "Use the \"Full Document Context\" to understand the overall meaning, terminology, and tone.",
        ];
        if !self.translation_so_far.is_empty() {
            rules.push(
                "The \"Translation So Far\" is your own earlier output for the preceding segments. Stay consistent with its terminology, names, and style.",
            );
        }
        rules.push("Only translate the \"Segment to Translate\"; never re-translate the context.");
        rules.push("Output ONLY the translated text. Do not add any conversational filler, notes, or explanations.");

        let numbered: Vec<String> = rules
            .iter()
            .enumerate()
            .map(|(i, rule)| format!("{}. {}", i + 1, rule))
            .collect();

        let mut sections = vec![
            PromptTemplate::TRANSLATOR_ROLE.to_string(),
            task,
            format!("Instructions:\n{}", numbered.join("\n")),
            fenced("Full Document Context", &self.full_document),
        ];

        if !self.translation_so_far.is_empty() {
            sections.push(fenced("Translation So Far", &self.translation_so_far));
        }

        sections.push(fenced("Segment to Translate", &self.segment));

        sections.join("\n\n")
    }
}

/// Build the back-translation prompt for `translated_text`.
pub fn back_translation_prompt(
    translated_text: &str,
    source_language: &str,
    target_language: &str,
) -> String {
    format!(
        "{}\n\n{}",
        PromptTemplate::back_translator().render(source_language, target_language),
        fenced("Text to Back-Translate", translated_text)
    )
}

/// Build the quality audit prompt for one segment.
pub fn evaluation_prompt(
    original: &str,
    translated: &str,
    back_translated: &str,
    source_language: &str,
    target_language: &str,
    full_document: &str,
) -> String {
    [
        PromptTemplate::evaluator().render(source_language, target_language),
        fenced("Full Document (reference only)", full_document),
        fenced(&format!("Original ({})", source_language), original),
        fenced(&format!("Translation ({})", target_language), translated),
        fenced(&format!("Back-Translation ({})", source_language), back_translated),
    ]
    .join("\n\n")
}
