//! The [`Prompt`] trait: an ordered list of sections rendered as one string.

use std::fmt;

use tracing::debug;

use super::section::PromptSection;
use crate::error::Result;

/// A complete prompt made of ordered sections.
///
/// Implementors own their sections and decide how they are combined in
/// [`render`](Self::render).
pub trait Prompt: Send + Sync {
    fn sections(&self) -> &[Box<dyn PromptSection>];

    fn sections_mut(&mut self) -> &mut Vec<Box<dyn PromptSection>>;

    /// Render the complete prompt.
    fn render(&self) -> Result<String>;

    /// Append a section.
    fn add_section(&mut self, section: impl PromptSection + 'static)
    where
        Self: Sized,
    {
        self.sections_mut().push(Box::new(section));
    }

    /// Append an already boxed section.
    fn add_boxed_section(&mut self, section: Box<dyn PromptSection>) {
        self.sections_mut().push(section);
    }

    /// Render every section in order; the first failure aborts.
    fn render_sections(&self) -> Result<Vec<String>> {
        self.sections().iter().map(|s| s.render()).collect()
    }

    /// Total providers across all sections.
    fn provider_count(&self) -> usize {
        self.sections().iter().map(|s| s.providers().len()).sum()
    }

    /// Total tools across all sections.
    fn tool_count(&self) -> usize {
        self.sections().iter().map(|s| s.tools().len()).sum()
    }
}

/// String form of a prompt. A failed render writes a `<render error: ..>`
/// marker in place of the text; call [`Prompt::render`] for the typed error.
impl fmt::Display for dyn Prompt + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(text) => f.write_str(&text),
            Err(e) => {
                debug!("prompt failed to render: {e}");
                write!(f, "<render error: {e}>")
            }
        }
    }
}

impl fmt::Debug for dyn Prompt + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prompt")
            .field("sections", &self.sections())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{TextContext, ToolContext};
    use crate::prompt::SectionCore;
    use crate::provider::{ProviderHandle, StaticProvider};

    struct Echo {
        core: SectionCore,
    }

    impl PromptSection for Echo {
        fn core(&self) -> &SectionCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut SectionCore {
            &mut self.core
        }

        fn formatter(&self) -> Result<String> {
            Ok(self.context()?.render())
        }
    }

    #[derive(Default)]
    struct Joined {
        sections: Vec<Box<dyn PromptSection>>,
    }

    impl Prompt for Joined {
        fn sections(&self) -> &[Box<dyn PromptSection>] {
            &self.sections
        }

        fn sections_mut(&mut self) -> &mut Vec<Box<dyn PromptSection>> {
            &mut self.sections
        }

        fn render(&self) -> Result<String> {
            Ok(self.render_sections()?.join(" | "))
        }
    }

    fn echo(text: &str) -> Echo {
        Echo {
            core: SectionCore::new().with_context(TextContext::new(text)),
        }
    }

    #[test]
    fn renders_sections_in_order() {
        let mut prompt = Joined::default();
        prompt.add_section(echo("one"));
        prompt.add_boxed_section(Box::new(echo("two")));
        assert_eq!(prompt.render().unwrap(), "one | two");
    }

    #[test]
    fn display_matches_render() {
        let mut joined = Joined::default();
        joined.add_section(echo("a"));
        let prompt: &dyn Prompt = &joined;
        assert_eq!(prompt.to_string(), prompt.render().unwrap());
    }

    #[test]
    fn section_failure_propagates() {
        let mut prompt = Joined::default();
        prompt.add_section(echo("fine"));
        prompt.add_section(Echo {
            core: SectionCore::new(),
        });
        assert!(prompt.render().is_err());
        let prompt: &dyn Prompt = &prompt;
        assert!(prompt.to_string().starts_with("<render error: context is not set"));
    }

    #[test]
    fn counts_span_sections() {
        let mut prompt = Joined::default();
        prompt.add_section(Echo {
            core: SectionCore::new()
                .with_providers([ProviderHandle::new(StaticProvider::new("a", "1"))])
                .with_tools([ToolContext::new("t1", ""), ToolContext::new("t2", "")]),
        });
        prompt.add_section(Echo {
            core: SectionCore::new()
                .with_providers([ProviderHandle::new(StaticProvider::new("b", "2"))]),
        });
        assert_eq!(prompt.provider_count(), 2);
        assert_eq!(prompt.tool_count(), 2);
    }
}
