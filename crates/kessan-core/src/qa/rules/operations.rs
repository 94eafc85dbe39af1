//! Operations questions: marketing plan, KPI monitoring

use crate::derived;
use crate::error::Result;
use crate::format::{format_currency, format_percent, ratio};
use crate::model::fy_label;
use crate::qa::catalog::{checked, Rule, RuleContext};
use crate::qa::types::{QaCategory, QaDraft};

use super::{bullets, join_paragraphs, kpi_year};

const BENCHMARK_KPI_LIMIT: usize = 3;

pub fn rules() -> Vec<Rule> {
    vec![
        Rule::new("operations.marketing", QaCategory::Operations, 6, marketing),
        Rule::new("operations.kpi_monitoring", QaCategory::Operations, 6, kpi_monitoring),
    ]
}

/// Marketing spend as a share of revenue, when the SGA breakdown has one
fn marketing(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let Some(pl) = ctx.pl else {
        return Ok(None);
    };
    let Some(sga) = pl.sga_breakdown.as_ref() else {
        return Ok(None);
    };
    let spend = checked("marketing", &sga.marketing)?;
    let total = derived::total(spend);
    if total <= 0.0 {
        return Ok(None);
    }
    let revenue = checked("revenue", &pl.revenue)?;
    let shares = derived::margins(spend, revenue);

    let summary = format!(
        "5年間で累計**{}**のマーケティング投資を計画しており、売上高比率はFY1の{}からFY5には{}となります。",
        format_currency(total),
        format_percent(shares[0]),
        format_percent(shares[4])
    );

    let mut blocks = vec![summary];

    if !ctx.is_executive() {
        let lines = spend.iter().enumerate().map(|(i, v)| {
            format!(
                "{}: {}（売上比{}）",
                fy_label(i),
                format_currency(*v),
                format_percent(shares[i])
            )
        });
        blocks.push(bullets(lines));
    }

    if let Some(items) = pl
        .sga_detail
        .as_ref()
        .map(|d| &d.marketing)
        .filter(|m| !m.is_empty())
    {
        for item in items {
            checked(&item.name, &item.amounts)?;
        }
        let lines = items.iter().map(|item| {
            let item_total = derived::total(&item.amounts);
            format!(
                "{}: 累計{}（構成比{}）",
                item.name,
                format_currency(item_total),
                format_percent(ratio(item_total, total))
            )
        });
        blocks.push(format!("施策別の内訳は以下の通りです。\n{}", bullets(lines)));
    }

    Ok(Some(
        QaDraft::new("マーケティング投資の計画は？", join_paragraphs(blocks))
            .with_tags(&["オペレーション", "マーケティング", "顧客獲得"]),
    ))
}

fn kpi_monitoring(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let mut financial = vec!["売上高（月次・計画比）".to_string()];

    match ctx.kpis.and_then(|k| k.gp_margin).filter(|v| v.is_finite()) {
        Some(gp) => financial.push(format!("粗利率（計画値 {}）", format_percent(gp))),
        None => financial.push("粗利率".to_string()),
    }
    match ctx.kpis.and_then(|k| k.fy5_op_margin).filter(|v| v.is_finite()) {
        Some(op) => financial.push(format!("営業利益率（FY5計画値 {}）", format_percent(op))),
        None => financial.push("営業利益率".to_string()),
    }
    match kpi_year(ctx.kpis.and_then(|k| k.break_even_year.as_deref())) {
        Some(year) => financial.push(format!("黒字化の進捗（目標 {}）", year)),
        None => financial.push("キャッシュ残高と月次バーンレート".to_string()),
    }

    let industry: Vec<String> = ctx
        .benchmark
        .kpis
        .iter()
        .take(BENCHMARK_KPI_LIMIT)
        .map(|k| {
            if ctx.is_executive() {
                k.name.clone()
            } else {
                format!("{}（目安: {}）", k.name, k.benchmark)
            }
        })
        .collect();

    let mut blocks = vec![
        "財務KPIと業界固有KPIを組み合わせて月次でモニタリングします。".to_string(),
        format!("財務KPI:\n{}", bullets(&financial)),
    ];
    if !industry.is_empty() {
        blocks.push(format!("業界KPI:\n{}", bullets(&industry)));
    }
    blocks.push("計画との乖離が一定水準を超えた場合は、原因分析と対応策を経営会議で検討します。".to_string());

    Ok(Some(
        QaDraft::new("どのKPIで事業の進捗を管理しますか？", join_paragraphs(blocks))
            .with_tags(&["オペレーション", "KPI", "モニタリング"]),
    ))
}

#[cfg(test)]
mod tests {
    use crate::qa::types::QaSettings;
    use crate::test_utils::*;

    #[test]
    fn test_marketing_requires_breakdown() {
        let settings = QaSettings::default();
        assert!(run_rule("operations.marketing", &saas_context(), &settings).is_none());
        let plain = saas_context().with_pl_summary(sample_pl());
        assert!(run_rule("operations.marketing", &plain, &settings).is_none());

        let draft = run_rule("operations.marketing", &full_saas_context(), &settings).unwrap();
        assert!(draft.answer.contains("累計**1.1億円**"));
        assert!(draft.answer.contains("FY1の16.0%からFY5には10.2%"));
        assert!(draft.answer.contains("Web広告: 累計6600万円"));
    }

    #[test]
    fn test_kpi_monitoring_always_fires() {
        let settings = QaSettings::default();
        let draft = run_rule("operations.kpi_monitoring", &saas_context(), &settings).unwrap();
        assert!(draft.answer.contains("キャッシュ残高"));
        assert!(draft.answer.contains("MRR（目安: 前年比50%以上の成長）"));
        assert!(draft.answer.contains("LTV/CAC"));
        assert!(!draft.answer.contains("NRR"));

        let draft =
            run_rule("operations.kpi_monitoring", &full_saas_context(), &settings).unwrap();
        assert!(draft.answer.contains("粗利率（計画値 70.0%）"));
        assert!(draft.answer.contains("黒字化の進捗（目標 FY2）"));
    }
}
