use minijinja::{context, Environment};

use super::history::ConversationHistory;
use crate::utils::{HemisphairError, Result};

const OPENING_TEMPLATE: &str = "You are one hemisphere of a simulated brain. A user has asked: '{{ query }}'. \
Share your first thoughts on this question. Be insightful but concise.";

const REPLY_TEMPLATE: &str = "You are one hemisphere of a simulated brain, discussing: '{{ query }}'. \
The other hemisphere just said: '{{ reply }}'. Respond with your own thoughts, building on or challenging what was said.";

const SUMMARY_TEMPLATE: &str = "You are the summarizing hemisphere of the brain. You have discussed '{{ query }}' \
with the other hemisphere. Here is the full conversation:\n\n{{ history }}\n\n\
Summarize the discussion comprehensively, highlighting key insights, points of agreement, \
and any interesting perspectives that emerged.";

/// Prompt wording for each kind of turn, as minijinja templates.
///
/// Variables are `query`, `reply` (only the immediately preceding opposing turn) and
/// `history` (the whole conversation, summary only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    pub opening: String,
    pub reply: String,
    pub summary: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            opening: OPENING_TEMPLATE.to_string(),
            reply: REPLY_TEMPLATE.to_string(),
            summary: SUMMARY_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    pub fn opening(&self, query: &str) -> Result<String> {
        render_template("opening", &self.opening, context! { query })
    }

    pub fn reply(&self, query: &str, other_said: &str) -> Result<String> {
        render_template("reply", &self.reply, context! { query, reply => other_said })
    }

    pub fn summary(&self, query: &str, history: &ConversationHistory) -> Result<String> {
        let history = history.render();
        render_template("summary", &self.summary, context! { query, history })
    }
}

/// Render one prompt template. Substituted values are inserted verbatim and never
/// evaluated, so template syntax inside a query or model reply comes through untouched.
fn render_template(name: &str, template_str: &str, ctx: minijinja::Value) -> Result<String> {
    let mut env = Environment::new();
    env.add_template(name, template_str)
        .map_err(|e| HemisphairError::Template(e.to_string()))?;

    let tmpl = env
        .get_template(name)
        .map_err(|e| HemisphairError::Template(e.to_string()))?;

    tmpl.render(ctx)
        .map_err(|e| HemisphairError::Template(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TurnRecord;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_replaces_variables() {
        let out = render_template("t", "a {{ x }} b {{ y }}", context! { x => "1", y => "2" }).unwrap();
        assert_eq!(out, "a 1 b 2");
    }

    #[test]
    fn test_single_braces_are_literal() {
        let out = render_template("t", "{nope} {x", context! { x => "1" }).unwrap();
        assert_eq!(out, "{nope} {x");
    }

    #[test]
    fn test_broken_template_is_template_error() {
        let templates = PromptTemplates {
            opening: "{{ query ".to_string(),
            ..PromptTemplates::default()
        };
        assert!(matches!(templates.opening("q"), Err(HemisphairError::Template(_))));
    }

    #[test]
    fn test_values_are_not_rendered_again() {
        let prompt = PromptTemplates::default()
            .reply("what is {{ reply }}?", "{{ query }} {% if true %}x{% endif %}")
            .unwrap();
        assert!(prompt.contains("'what is {{ reply }}?'"));
        assert!(prompt.contains("said: '{{ query }} {% if true %}x{% endif %}'"));
    }

    #[test]
    fn test_markup_is_not_escaped() {
        let prompt = PromptTemplates::default().opening("is <b> & \"x\" valid?").unwrap();
        assert!(prompt.contains("'is <b> & \"x\" valid?'"));
    }

    #[test]
    fn test_opening_embeds_query_only() {
        let prompt = PromptTemplates::default().opening("Why is the sky blue?").unwrap();
        assert!(prompt.contains("'Why is the sky blue?'"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_summary_embeds_whole_history() {
        let mut history = ConversationHistory::new();
        history.push(TurnRecord::new("Y", "opening thought"));
        history.push(TurnRecord::new("X", "a rebuttal"));

        let prompt = PromptTemplates::default().summary("test?", &history).unwrap();
        assert!(prompt.contains("'test?'"));
        assert!(prompt.contains("Y: opening thought\n\nX: a rebuttal"));
    }
}
