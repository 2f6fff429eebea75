//! Quarterly business review: the prompt rendered by the `proompt` binary.
//!
//! Everything here is built from the public API: a metrics provider with both
//! sync and async entry points, a sync-only log analysis provider, a business
//! context shared by both sections, two analysis tools, a hand-written
//! section that picks its providers by type, and a [`ListSection`].

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::context::Context;
use crate::error::Result;
use crate::prompt::{
    ListSection, PromptBuilder, PromptConfig, PromptSection, SectionCore, SectionedPrompt,
    ToolDetail,
};
use crate::provider::{Provider, ProviderFuture, ProviderHandle};
use crate::text::indent;
use crate::tools::{FnTool, ToolSource, Toolset};
use crate::{ToolDef, json_schema_for};

// ── Providers ──────────────────────────────────────────────────────

/// Headline business metrics for one quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyMetrics {
    pub quarter: String,
    pub revenue: u64,
    pub active_users: u64,
    pub user_growth_rate: f64,
    pub churn_rate: f64,
    pub net_promoter_score: u32,
}

impl QuarterlyMetrics {
    /// Fixed sample figures for `quarter`.
    pub fn sample(quarter: impl Into<String>) -> Self {
        Self {
            quarter: quarter.into(),
            revenue: 1_250_000,
            active_users: 75_000,
            user_growth_rate: 0.12,
            churn_rate: 0.04,
            net_promoter_score: 72,
        }
    }
}

/// Supplies [`QuarterlyMetrics`]. Supports async runs.
#[derive(Debug, Clone)]
pub struct MetricsProvider {
    metrics: QuarterlyMetrics,
}

impl MetricsProvider {
    pub fn new(metrics: QuarterlyMetrics) -> Self {
        Self { metrics }
    }
}

impl Provider for MetricsProvider {
    type Output = QuarterlyMetrics;

    fn name(&self) -> String {
        format!("Metrics for {}", self.metrics.quarter)
    }

    fn provider_ctx(&self) -> String {
        format!("Basic business metrics for {}.", self.metrics.quarter)
    }

    fn run(&self) -> Result<QuarterlyMetrics> {
        Ok(self.metrics.clone())
    }

    fn arun(&self) -> ProviderFuture<'_, QuarterlyMetrics> {
        let metrics = self.metrics.clone();
        Box::pin(async move { Ok(metrics) })
    }
}

/// Summarizes service logs into a markdown report. Sync only.
#[derive(Debug, Clone)]
pub struct LogAnalysisProvider {
    pub period: String,
    pub service: String,
    pub total_requests: u64,
    pub error_rate: f64,
    pub avg_response_ms: u32,
}

impl LogAnalysisProvider {
    pub fn sample(period: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            service: "web-api".into(),
            total_requests: 3_200_000,
            error_rate: 0.012,
            avg_response_ms: 180,
        }
    }
}

impl Provider for LogAnalysisProvider {
    type Output = String;

    fn name(&self) -> String {
        format!("Log Analysis for {} ({})", self.service, self.period)
    }

    fn provider_ctx(&self) -> String {
        format!(
            "Analyzes {} service logs over {} for error rates and latency.",
            self.service, self.period
        )
    }

    fn run(&self) -> Result<String> {
        Ok(format!(
            "- **Total Requests Processed:** {}\n\
             - **Average Response Time:** {}ms\n\
             - **Overall Error Rate:** {:.2}%",
            thousands(self.total_requests),
            self.avg_response_ms,
            self.error_rate * 100.0
        ))
    }
}

// ── Context ────────────────────────────────────────────────────────

/// Company and period the review is written for.
#[derive(Debug, Clone)]
pub struct ReviewContext {
    pub company: String,
    pub quarter: String,
    pub analyst: String,
    pub review_date: NaiveDate,
}

impl ReviewContext {
    /// A context dated today.
    pub fn new(company: impl Into<String>, quarter: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            quarter: quarter.into(),
            analyst: "AI Assistant".into(),
            review_date: Local::now().date_naive(),
        }
    }

    pub fn with_review_date(mut self, date: NaiveDate) -> Self {
        self.review_date = date;
        self
    }

    pub fn with_analyst(mut self, analyst: impl Into<String>) -> Self {
        self.analyst = analyst.into();
        self
    }
}

impl Context for ReviewContext {
    fn render(&self) -> String {
        format!(
            "Review Context:\n\
             Company: {}\n\
             Period: {}\n\
             Analysis Date: {}\n\
             Analyst: {}\n\n\
             Quarterly analysis of key business metrics and system health.",
            self.company,
            self.quarter,
            self.review_date.format("%Y-%m-%d"),
            self.analyst
        )
    }
}

// ── Tools ──────────────────────────────────────────────────────────

/// Calculate simple growth rate.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GrowthArgs {
    /// Current period value
    pub current: f64,
    /// Previous period value
    pub previous: f64,
}

pub fn growth_rate(args: &GrowthArgs) -> serde_json::Value {
    if args.previous == 0.0 {
        return json!({"growth_rate": "N/A", "trend": "new"});
    }
    let rate = (args.current - args.previous) / args.previous;
    let trend = if rate > 0.0 { "up" } else { "down" };
    json!({"growth_rate": format!("{:.1}%", rate * 100.0), "trend": trend})
}

pub fn growth_rate_tool() -> FnTool {
    FnTool::new(
        ToolDef::new(
            "calculate_growth_rate",
            "Calculate simple growth rate.",
            json_schema_for::<GrowthArgs>(),
        ),
        |args: GrowthArgs| async move { growth_rate(&args).to_string() },
    )
}

/// Assess business risk factors from churn and error rates.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RiskArgs {
    pub churn_rate: f64,
    pub error_rate: f64,
    /// Churn above this is high risk
    #[serde(default = "default_churn_threshold")]
    pub churn_threshold: f64,
    /// Error rate above this needs monitoring
    #[serde(default = "default_error_threshold")]
    pub error_threshold: f64,
}

fn default_churn_threshold() -> f64 {
    0.05
}

fn default_error_threshold() -> f64 {
    0.02
}

pub fn assess_risk(args: &RiskArgs) -> serde_json::Value {
    let retention = if args.churn_rate > args.churn_threshold {
        format!(
            "HIGH - churn rate of {:.1}% exceeds {:.1}%",
            args.churn_rate * 100.0,
            args.churn_threshold * 100.0
        )
    } else {
        format!("LOW - churn rate of {:.1}% is acceptable", args.churn_rate * 100.0)
    };
    let stability = if args.error_rate > args.error_threshold {
        format!("MEDIUM - error rate of {:.2}% needs monitoring", args.error_rate * 100.0)
    } else {
        format!("LOW - error rate of {:.2}% is acceptable", args.error_rate * 100.0)
    };
    json!({"customer_retention": retention, "technical_stability": stability})
}

pub fn risk_tool() -> FnTool {
    FnTool::new(
        ToolDef::new(
            "assess_risk_factors",
            "Assess business risk factors from churn and error rates.",
            json_schema_for::<RiskArgs>(),
        ),
        |args: RiskArgs| async move { assess_risk(&args).to_string() },
    )
}

/// Both analysis tools, with argument validation on.
pub fn analysis_toolset() -> Toolset {
    Toolset::new()
        .with(growth_rate_tool())
        .with(risk_tool())
        .with_arg_validation(true)
}

// ── Sections ───────────────────────────────────────────────────────

/// Focus areas used when none are given.
pub fn default_focus_areas() -> Vec<String> {
    ["revenue", "growth", "performance"].map(String::from).to_vec()
}

/// Metrics analysis written against [`MetricsProvider`] output.
///
/// Providers of any other type are ignored. The title sits at
/// `heading_level`, its subsections one level deeper, and each metrics
/// report one level below those.
#[derive(Debug, Clone)]
pub struct MetricsSection {
    core: SectionCore,
    tool_detail: ToolDetail,
    heading_level: u8,
    focus_areas: Vec<String>,
}

impl MetricsSection {
    pub fn new(core: SectionCore) -> Self {
        Self {
            core,
            tool_detail: ToolDetail::Names,
            heading_level: 2,
            focus_areas: default_focus_areas(),
        }
    }

    pub fn with_tool_detail(mut self, detail: ToolDetail) -> Self {
        self.tool_detail = detail;
        self
    }

    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.max(1);
        self
    }

    /// Areas the analysis should concentrate on. An empty list drops the
    /// "Key Focus Areas" subsection.
    pub fn with_focus_areas<I, S>(mut self, areas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.focus_areas = areas.into_iter().map(Into::into).collect();
        self
    }
}

fn format_metrics(m: &QuarterlyMetrics, level: u8) -> String {
    format!(
        "{} Metrics Report - {}\n\
         - **Revenue:** ${}\n\
         - **Active Users:** {}\n\
         - **Growth:** {:.1}%\n\
         - **Churn:** {:.1}%\n\
         - **NPS:** {}",
        "#".repeat(level as usize),
        m.quarter,
        thousands(m.revenue),
        thousands(m.active_users),
        m.user_growth_rate * 100.0,
        m.churn_rate * 100.0,
        m.net_promoter_score
    )
}

impl PromptSection for MetricsSection {
    fn core(&self) -> &SectionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SectionCore {
        &mut self.core
    }

    fn formatter(&self) -> Result<String> {
        let context = self.context()?;
        let sub_level = self.heading_level.saturating_add(1);
        let mut reports = Vec::new();
        for provider in self.core.providers_of::<MetricsProvider>() {
            reports.push(format_metrics(&provider.run()?, sub_level.saturating_add(1)));
        }

        Ok(PromptBuilder::new()
            .heading(self.heading_level, "QUARTERLY METRICS ANALYSIS")
            .heading_level(sub_level)
            .raw("Analyze the quarterly business performance focusing on key metrics and trends.")
            .section("Context", indent(&context.render(), "> "))
            .list("Key Focus Areas", &self.focus_areas)
            .section("Available Data", reports.join("\n\n"))
            .section("Analysis Tools", self.tool_detail.format(self.core.tools()))
            .raw("Provide insights and recommendations based on the metrics.")
            .build())
    }
}

// ── Prompt ─────────────────────────────────────────────────────────

/// Inputs for [`quarterly_review`].
#[derive(Debug, Clone)]
pub struct ReviewOptions {
    pub context: ReviewContext,
    pub config: PromptConfig,
    /// Additional tools offered to the metrics section.
    pub extra_tools: Vec<ToolSource>,
    pub focus_areas: Vec<String>,
}

impl ReviewOptions {
    pub fn new(company: impl Into<String>, quarter: impl Into<String>) -> Self {
        Self {
            context: ReviewContext::new(company, quarter),
            config: PromptConfig::default(),
            extra_tools: Vec::new(),
            focus_areas: default_focus_areas(),
        }
    }

    pub fn with_config(mut self, config: PromptConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_extra_tools(mut self, tools: Vec<ToolSource>) -> Self {
        self.extra_tools = tools;
        self
    }

    pub fn with_review_date(mut self, date: NaiveDate) -> Self {
        self.context = self.context.with_review_date(date);
        self
    }

    pub fn with_focus_areas(mut self, areas: Vec<String>) -> Self {
        self.focus_areas = areas;
        self
    }
}

/// Build the two-section quarterly review prompt.
pub fn quarterly_review(options: ReviewOptions) -> SectionedPrompt {
    let ReviewOptions {
        context,
        config,
        extra_tools,
        focus_areas,
    } = options;
    let header = format!(
        "# QUARTERLY REVIEW: {}\n## {} Analysis\n\n\
         Quarterly business review focusing on core metrics and system health.\n\n\
         Analyze the data and provide actionable insights for business growth.",
        context.company, context.quarter
    );
    let quarter = context.quarter.clone();
    let shared: Arc<dyn Context> = Arc::new(context);

    let mut metrics_core = SectionCore::new()
        .with_shared_context(shared.clone())
        .with_providers([ProviderHandle::new(MetricsProvider::new(
            QuarterlyMetrics::sample(quarter.clone()),
        ))])
        .with_tools([analysis_toolset()]);
    metrics_core.add_tools(extra_tools);
    let metrics = MetricsSection::new(metrics_core)
        .with_heading_level(config.heading_level)
        .with_tool_detail(config.tool_detail)
        .with_focus_areas(focus_areas);

    let operations = ListSection::new(
        "SYSTEM PERFORMANCE",
        SectionCore::new()
            .with_shared_context(shared)
            .with_providers([ProviderHandle::new(LogAnalysisProvider::sample(quarter))])
            .with_tools([growth_rate_tool_source()]),
    )
    .with_heading_level(config.heading_level)
    .with_tool_detail(config.tool_detail)
    .with_instructions("Review service health for the quarter and flag anything that threatens growth.")
    .with_closing("Call out risks with their likely business impact.");

    SectionedPrompt::new()
        .with_header(header)
        .with_section(metrics)
        .with_section(operations)
        .with_summary_footer()
        .with_config(config)
}

fn growth_rate_tool_source() -> ToolSource {
    ToolSource::Tool(Arc::new(growth_rate_tool()))
}

/// `1234567` → `1,234,567`.
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
