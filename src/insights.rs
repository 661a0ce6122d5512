const STAKEHOLDER_INSIGHTS: &str = "\
**Stakeholder Value from SSP AI Optimizer**

1. Marketing Teams: Auto-prioritize screens based on CTR, CVR, eCPM.
2. Media Buyers: Negotiate rates & forecast ROIs.
3. Sales: Show clients real-time data-backed results.
4. Analysts: Compare AI vs manual bidding efficiency.
5. Ops Teams: Monitor AI bidding and scaling in production.
";

/// Advisory text shown alongside the calculator and forecast
pub fn stakeholder_insights() -> &'static str {
    STAKEHOLDER_INSIGHTS
}
