//! A prompt assembled from hand-written parts.
//!
//! Defines its own provider, context, section, and prompt instead of using
//! the ready-made types, then prints the rendered prompt.
//!
//! ```sh
//! cargo run --example custom_section
//! ```

use std::sync::Arc;

use proompt::prelude::*;
use proompt::text::{dedent, indent};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct Metrics {
    quarter: String,
    revenue: u64,
    users: u64,
    growth: f64,
}

struct SimpleMetricsProvider {
    quarter: String,
}

impl Provider for SimpleMetricsProvider {
    type Output = Metrics;

    fn name(&self) -> String {
        format!("Metrics for {}", self.quarter)
    }

    fn provider_ctx(&self) -> String {
        format!("Basic business metrics for {}.", self.quarter)
    }

    fn run(&self) -> Result<Metrics> {
        Ok(Metrics {
            quarter: self.quarter.clone(),
            revenue: 1_480_000,
            users: 82_000,
            growth: 0.094,
        })
    }
}

struct SimpleContext {
    company: String,
    quarter: String,
}

impl Context for SimpleContext {
    fn render(&self) -> String {
        dedent(&format!(
            "
            Review Context:
            Company: {}
            Period: {}

            Basic quarterly analysis for key business metrics.",
            self.company, self.quarter
        ))
        .trim()
        .to_string()
    }
}

/// Calculate simple growth rate.
#[derive(Deserialize, JsonSchema)]
#[allow(dead_code)]
struct GrowthArgs {
    /// Current period value
    current: f64,
    /// Previous period value
    previous: f64,
}

struct MetricsSection {
    core: SectionCore,
}

impl PromptSection for MetricsSection {
    fn core(&self) -> &SectionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SectionCore {
        &mut self.core
    }

    fn formatter(&self) -> Result<String> {
        let mut reports = Vec::new();
        for provider in self.core.providers_of::<SimpleMetricsProvider>() {
            let m = provider.run()?;
            reports.push(format!(
                "## Metrics Report - {}\n- **Revenue:** ${}\n- **Users:** {}\n- **Growth:** {:.1}%",
                m.quarter,
                m.revenue,
                m.users,
                m.growth * 100.0
            ));
        }
        let signatures: Vec<String> = self.tools().iter().map(ToolContext::signature).collect();

        Ok(PromptBuilder::titled("QUARTERLY METRICS ANALYSIS")
            .raw(self.context()?.render())
            .section("Available Data", indent(&reports.join("\n\n"), "  "))
            .list("Analysis Tools", signatures)
            .raw("Provide insights and recommendations based on the metrics.")
            .build())
    }
}

struct SimpleQuarterlyPrompt {
    company: String,
    sections: Vec<Box<dyn PromptSection>>,
}

impl Prompt for SimpleQuarterlyPrompt {
    fn sections(&self) -> &[Box<dyn PromptSection>] {
        &self.sections
    }

    fn sections_mut(&mut self) -> &mut Vec<Box<dyn PromptSection>> {
        &mut self.sections
    }

    fn render(&self) -> Result<String> {
        let rule = "=".repeat(40);
        let body = self.render_sections()?.join(&format!("\n\n{rule}\n\n"));
        Ok(format!(
            "# QUARTERLY REVIEW: {}\n\n{rule}\n\n{body}\n\n{rule}\n\n## SUMMARY\n\n\
             {} provider(s), {} tool(s), {} section(s).",
            self.company,
            self.provider_count(),
            self.tool_count(),
            self.sections.len()
        ))
    }
}

fn main() -> Result<()> {
    let context: Arc<dyn Context> = Arc::new(SimpleContext {
        company: "StartupCorp".into(),
        quarter: "Q3 2024".into(),
    });
    let growth = ToolContext::from_args::<GrowthArgs>("calculate_growth_rate", "")?
        .with_return("object");

    let mut section = MetricsSection {
        core: SectionCore::new().with_shared_context(context),
    };
    section.add_providers([Some(ProviderHandle::new(SimpleMetricsProvider {
        quarter: "Q3 2024".into(),
    }))]);
    section.add_tools([growth]);

    let mut prompt = SimpleQuarterlyPrompt {
        company: "StartupCorp".into(),
        sections: Vec::new(),
    };
    prompt.add_section(section);

    let text = prompt.render()?;
    println!("{text}");
    println!(
        "\n{} chars, {} words",
        text.chars().count(),
        text.split_whitespace().count()
    );
    Ok(())
}
