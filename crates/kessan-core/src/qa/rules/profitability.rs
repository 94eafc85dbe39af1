//! Profitability questions: break-even, margin trend, cumulative cash

use crate::derived;
use crate::error::Result;
use crate::format::{format_currency, format_percent};
use crate::model::fy_label;
use crate::qa::catalog::{checked, finite, Rule, RuleContext};
use crate::qa::types::{QaCategory, QaDraft};

use super::{bullets, join_paragraphs, kpi_year, parse_fy};

pub fn rules() -> Vec<Rule> {
    vec![
        Rule::new("profitability.break_even", QaCategory::Profitability, 10, break_even),
        Rule::new("profitability.margin_trend", QaCategory::Profitability, 8, margin_trend),
        Rule::new("profitability.cumulative_fcf", QaCategory::Profitability, 8, cumulative_fcf),
    ]
}

/// Where a break-even year came from
enum BreakEven {
    Year(String),
    FromStart,
    Never,
}

/// Explicit KPI year first, then the operating-profit crossover
fn resolve_break_even(explicit: Option<&str>, series: Option<&[f64]>) -> Option<BreakEven> {
    if let Some(year) = explicit {
        return Some(BreakEven::Year(year.to_string()));
    }
    let series = series?;
    Some(match derived::find_crossover(series) {
        Some(i) => BreakEven::Year(fy_label(i)),
        None if series.first().is_some_and(|v| *v >= 0.0) => BreakEven::FromStart,
        None => BreakEven::Never,
    })
}

fn break_even(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let explicit = kpi_year(ctx.kpis.and_then(|k| k.break_even_year.as_deref()));
    let operating = match ctx.pl {
        Some(pl) => Some(checked("operating_profit", &pl.operating_profit)?),
        None => None,
    };

    let Some(resolved) = resolve_break_even(explicit, operating.map(|s| s.as_slice())) else {
        return Ok(None);
    };

    let summary = match &resolved {
        BreakEven::Year(year) => format!("営業利益ベースでの単年度黒字化は**{}**を見込んでいます。", year),
        BreakEven::FromStart => "FY1から営業黒字を計画しています。".to_string(),
        BreakEven::Never => "5年間の計画期間内では営業黒字化に至らない計画です。".to_string(),
    };

    let mut blocks = vec![summary];

    if let (BreakEven::Year(year), Some(op)) = (&resolved, operating) {
        if let Some(i) = parse_fy(year) {
            let before = i.checked_sub(1).map(|p| op[p]);
            blocks.push(match before {
                Some(prev) => format!(
                    "{}の営業利益は{}で、前年の{}から改善します。",
                    year,
                    format_currency(op[i]),
                    format_currency(prev)
                ),
                None => format!("{}の営業利益は{}です。", year, format_currency(op[i])),
            });
        }
    }

    if let Some(gap) = ctx.kpis.and_then(|k| k.breakeven_gap.as_ref()) {
        let amount = finite("breakeven_gap.amount", gap.amount)?;
        let rate = finite("breakeven_gap.rate", gap.rate)?;
        if amount > 0.0 {
            blocks.push(format!(
                "FY1時点で黒字化するには、売上があと{}（{}）必要です。",
                format_currency(amount),
                format_percent(rate)
            ));
        }
    }

    blocks.push(match resolved {
        BreakEven::Never => {
            "黒字化の時期と、それまでの資金繰りの見通しを併せて説明することが求められます。".to_string()
        }
        _ => "黒字化の前提となる売上成長と費用コントロールの根拠が論点になります。".to_string(),
    });

    Ok(Some(
        QaDraft::new("黒字化はいつ頃を見込んでいますか？", join_paragraphs(blocks))
            .with_tags(&["収益性", "黒字化", "営業利益"]),
    ))
}

fn margin_trend(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let Some(pl) = ctx.pl else {
        return Ok(None);
    };
    let revenue = checked("revenue", &pl.revenue)?;
    let operating = checked("operating_profit", &pl.operating_profit)?;
    let margins = derived::margins(operating, revenue);

    let fy5 = ctx
        .kpis
        .and_then(|k| k.fy5_op_margin)
        .filter(|m| m.is_finite())
        .unwrap_or(margins[4]);

    let summary = format!(
        "営業利益率はFY1の{}からFY5には**{}**まで改善する計画です。",
        format_percent(margins[0]),
        format_percent(fy5)
    );

    let mut blocks = vec![summary];

    if !ctx.is_executive() {
        let lines = margins.iter().enumerate().map(|(i, m)| {
            if ctx.is_detailed() {
                format!(
                    "{}: {}（営業利益 {}）",
                    fy_label(i),
                    format_percent(*m),
                    format_currency(operating[i])
                )
            } else {
                format!("{}: {}", fy_label(i), format_percent(*m))
            }
        });
        blocks.push(bullets(lines));
    }

    blocks.push(
        if fy5 >= 0.2 {
            "固定費の比率が逓減し、規模拡大に伴う利益率の向上が見込まれます。"
        } else if fy5 >= 0.0 {
            "利益率の改善幅は限定的で、さらなる効率化の余地が論点になります。"
        } else {
            "計画期間を通じて営業赤字が続くため、収益構造の見直しが必要です。"
        }
        .to_string(),
    );

    Ok(Some(
        QaDraft::new("営業利益率の推移と改善の見通しは？", join_paragraphs(blocks))
            .with_tags(&["収益性", "営業利益率"]),
    ))
}

fn cumulative_fcf(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let Some(pl) = ctx.pl else {
        return Ok(None);
    };
    let cumulative = checked("cumulative_fcf", &pl.cumulative_fcf)?;

    let explicit = kpi_year(ctx.kpis.and_then(|k| k.cumulative_break_even_year.as_deref()));
    let summary = match resolve_break_even(explicit, Some(cumulative.as_slice())) {
        Some(BreakEven::Year(year)) => {
            format!("累積フリーキャッシュフローは**{}**にプラスへ転じる計画です。", year)
        }
        Some(BreakEven::FromStart) => {
            "累積フリーキャッシュフローは計画期間を通じてプラスを維持します。".to_string()
        }
        _ => "累積フリーキャッシュフローは5年間の計画期間内ではプラスに転じません。".to_string(),
    };

    let mut blocks = vec![summary];

    if let Some(need) = derived::peak_funding_need(cumulative) {
        let (low_year, _) = cumulative
            .iter()
            .enumerate()
            .fold((0, f64::INFINITY), |acc, (i, v)| if *v < acc.1 { (i, *v) } else { acc });
        blocks.push(format!(
            "累積キャッシュの最低点は{}の{}で、この水準が必要資金の目安となります。",
            fy_label(low_year),
            format_currency(-need)
        ));
    }

    blocks.push(format!(
        "FY5時点の累積フリーキャッシュフローは{}です。",
        format_currency(cumulative[4])
    ));

    Ok(Some(
        QaDraft::new("累積キャッシュフローの見通しは？", join_paragraphs(blocks))
            .with_tags(&["収益性", "キャッシュフロー", "資金繰り"]),
    ))
}

#[cfg(test)]
mod tests {
    use crate::model::{BreakevenGap, KpiSet};
    use crate::qa::types::{DetailLevel, QaSettings};
    use crate::test_utils::*;

    #[test]
    fn test_break_even_prefers_kpi_year() {
        let settings = QaSettings::default();
        let mut ctx = full_saas_context();
        ctx.kpis = Some(KpiSet {
            break_even_year: Some("FY3".to_string()),
            ..sample_kpis()
        });
        let draft = run_rule("profitability.break_even", &ctx, &settings).unwrap();
        assert!(draft.answer.contains("**FY3**"));
        assert!(draft.answer.contains("FY3の営業利益は2150万円で、前年の300万円から改善"));
    }

    #[test]
    fn test_break_even_falls_back_to_crossover() {
        let settings = QaSettings::default();
        let ctx = saas_context().with_pl_summary(sample_pl());
        let draft = run_rule("profitability.break_even", &ctx, &settings).unwrap();
        assert!(draft.answer.contains("**FY2**"));
    }

    #[test]
    fn test_break_even_without_data_declines() {
        let settings = QaSettings::default();
        assert!(run_rule("profitability.break_even", &saas_context(), &settings).is_none());
    }

    #[test]
    fn test_break_even_never_and_from_start() {
        let settings = QaSettings::default();

        let mut pl = sample_pl();
        pl.operating_profit = [-5.0, -4.0, -3.0, -2.0, -1.0];
        let draft =
            run_rule("profitability.break_even", &saas_context().with_pl_summary(pl), &settings)
                .unwrap();
        assert!(draft.answer.contains("黒字化に至らない"));

        let mut pl = sample_pl();
        pl.operating_profit = [1.0, 2.0, 3.0, 4.0, 5.0];
        let draft =
            run_rule("profitability.break_even", &saas_context().with_pl_summary(pl), &settings)
                .unwrap();
        assert!(draft.answer.contains("FY1から営業黒字"));
    }

    #[test]
    fn test_break_even_gap() {
        let settings = QaSettings::default();
        let ctx = saas_context().with_kpis(KpiSet {
            break_even_year: Some("FY2".to_string()),
            breakeven_gap: Some(BreakevenGap {
                amount: 14_285_715.0,
                rate: 0.142857,
            }),
            ..Default::default()
        });
        let draft = run_rule("profitability.break_even", &ctx, &settings).unwrap();
        assert!(draft.answer.contains("あと1429万円（14.3%）"));
    }

    #[test]
    fn test_margin_trend() {
        let detailed = QaSettings {
            detail_level: DetailLevel::Detailed,
            ..Default::default()
        };
        let draft = run_rule("profitability.margin_trend", &full_saas_context(), &detailed).unwrap();
        assert!(draft.answer.contains("FY1の-10.0%からFY5には**29.0%**"));
        assert!(draft.answer.contains("- FY1: -10.0%（営業利益 -1000万円）"));
        assert!(draft.answer.contains("規模拡大"));

        assert!(
            run_rule("profitability.margin_trend", &saas_context(), &detailed).is_none()
        );
    }

    #[test]
    fn test_cumulative_fcf() {
        let settings = QaSettings::default();
        let draft =
            run_rule("profitability.cumulative_fcf", &full_saas_context(), &settings).unwrap();
        assert!(draft.answer.contains("**FY3**にプラス"));
        assert!(draft.answer.contains("最低点はFY1の-1500万円"));
        assert!(draft.answer.contains("FY5時点の累積フリーキャッシュフローは9500万円"));
    }
}
