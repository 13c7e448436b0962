//! Response formatting into the fixed ten-section answer layout.
//!
//! The completion gateway is asked to lay the answer out under the fixed
//! headers; [`enforce_sections`] then guarantees the contract locally: every
//! section present, in order, sentinel-filled when empty, with nothing
//! invented beyond what the gateway returned.

use std::sync::Arc;

use tracing::debug;

use crate::completion::CompletionModel;
use crate::document::Message;
use crate::error::Result;
use crate::retry::{GatewayPolicy, call_gateway};

/// The fixed, ordered section headers of a formatted answer.
pub const SECTIONS: [&str; 10] = [
    "Eccentric Exercises",
    "Isometric Exercises",
    "Stretching",
    "Manual Therapy",
    "Ultrasound Therapy",
    "Taping and Bracing",
    "Functional Activities",
    "Other",
    "Document Title",
    "Document File Name",
];

/// Filler for sections the answer has no information for.
pub const NO_INFORMATION: &str = "I do not have information for this section";

/// Build the formatting instruction listing every section header.
fn format_instruction() -> String {
    let mut instruction = String::from(
        "Given this data I want you to break out the response into this format and add why this \
         is good information to provide to the user in the section:\n\n",
    );
    for (i, section) in SECTIONS.iter().enumerate() {
        instruction.push_str(&format!("{}. **{section}**:\n\n", i + 1));
    }
    instruction.push_str(&format!(
        "I do not want you to add any additional information and if you don't have the \
         information for the specific section, add {NO_INFORMATION}. Other will capture any \
         other information that does not fit into the other categories. Please make sure to add \
         the document title and document file name at the end of the response.",
    ));
    instruction
}

/// Drop a dangling list number (e.g. a trailing `"4."` that belonged to the
/// next section's header) from the end of a section body.
fn strip_trailing_list_number(body: &str) -> &str {
    let trimmed = body.trim_end();
    let tail_start =
        trimmed.rfind(|c: char| c.is_ascii_whitespace()).map(|i| i + 1).unwrap_or(0);
    let tail = &trimmed[tail_start..];
    let digits = tail.strip_suffix('.').unwrap_or(tail);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        trimmed[..tail_start].trim_end()
    } else {
        trimmed
    }
}

/// Rewrite gateway output into the exact ten-section layout.
///
/// Sections the gateway omitted or left blank are filled with
/// [`NO_INFORMATION`]; text outside any recognized section is dropped rather
/// than guessed into a category.
pub fn enforce_sections(raw: &str) -> String {
    // Locate each header marker the gateway actually emitted.
    // (marker start, content start, section index)
    let mut found: Vec<(usize, usize, usize)> = Vec::new();
    for (index, section) in SECTIONS.iter().enumerate() {
        let marker = format!("**{section}**");
        if let Some(pos) = raw.find(&marker) {
            found.push((pos, pos + marker.len(), index));
        }
    }
    found.sort_by_key(|(marker_start, _, _)| *marker_start);

    let mut bodies: Vec<Option<String>> = vec![None; SECTIONS.len()];
    for (slot, (_, content_start, index)) in found.iter().enumerate() {
        let end = found
            .get(slot + 1)
            .map(|(next_marker_start, _, _)| *next_marker_start)
            .unwrap_or(raw.len());
        let body = raw[*content_start..end].trim_start_matches(':').trim();
        let body = strip_trailing_list_number(body);
        if !body.is_empty() {
            bodies[*index] = Some(body.to_string());
        }
    }

    let mut output = String::new();
    for (index, section) in SECTIONS.iter().enumerate() {
        let body = bodies[index].as_deref().unwrap_or(NO_INFORMATION);
        output.push_str(&format!("{}. **{section}**: {body}\n\n", index + 1));
    }
    output.trim_end().to_string()
}

/// Formats free-text answers into the fixed section layout via the
/// completion gateway.
pub struct ResponseFormatter {
    model: Arc<dyn CompletionModel>,
    policy: GatewayPolicy,
}

impl ResponseFormatter {
    /// Create a formatter over the given completion gateway.
    pub fn new(model: Arc<dyn CompletionModel>, policy: GatewayPolicy) -> Self {
        Self { model, policy }
    }

    /// Format one answer. The input is the latest pipeline message only, not
    /// the full conversation.
    pub async fn format(&self, answer: &str) -> Result<String> {
        let messages = vec![Message::system(format_instruction()), Message::system(answer)];
        let raw = call_gateway(self.model.name(), self.policy, || {
            self.model.complete(&messages)
        })
        .await?;
        debug!(raw_len = raw.len(), "formatting gateway returned");
        Ok(enforce_sections(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_all_sections(output: &str) {
        for (i, section) in SECTIONS.iter().enumerate() {
            let header = format!("{}. **{section}**: ", i + 1);
            assert!(output.contains(&header), "missing section header: {header}");
        }
    }

    #[test]
    fn empty_input_fills_every_section_with_sentinel() {
        let output = enforce_sections("");
        assert_all_sections(&output);
        assert_eq!(output.matches(NO_INFORMATION).count(), SECTIONS.len());
    }

    #[test]
    fn present_sections_keep_their_content() {
        let raw = "1. **Eccentric Exercises**: Slow lowering drills.\n\n\
                   4. **Manual Therapy**: Deep friction massage.\n\n\
                   9. **Document Title**: Tennis Elbow Review\n\n\
                   10. **Document File Name**: review.pdf";
        let output = enforce_sections(raw);
        assert_all_sections(&output);
        assert!(output.contains("**Eccentric Exercises**: Slow lowering drills."));
        assert!(output.contains("**Manual Therapy**: Deep friction massage."));
        assert!(output.contains("**Document Title**: Tennis Elbow Review"));
        assert!(output.contains("**Document File Name**: review.pdf"));
        assert!(output.contains(&format!("**Stretching**: {NO_INFORMATION}")));
    }

    #[test]
    fn sections_are_reordered_into_canonical_order() {
        let raw = "**Stretching**: Wrist extensor stretch.\n\n**Eccentric Exercises**: Tyler twist.";
        let output = enforce_sections(raw);
        let eccentric = output.find("Tyler twist").unwrap();
        let stretching = output.find("Wrist extensor stretch").unwrap();
        assert!(eccentric < stretching);
    }

    #[test]
    fn blank_section_bodies_get_the_sentinel() {
        let raw = "1. **Eccentric Exercises**:\n\n2. **Isometric Exercises**: Holds at 70% effort.";
        let output = enforce_sections(raw);
        assert!(output.contains(&format!("**Eccentric Exercises**: {NO_INFORMATION}")));
        assert!(output.contains("**Isometric Exercises**: Holds at 70% effort."));
    }
}
