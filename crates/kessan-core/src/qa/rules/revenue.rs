//! Revenue questions: starting point, trajectory, growth assumptions, segments

use crate::benchmark::{Deviation, Driver};
use crate::derived;
use crate::error::Result;
use crate::format::{format_currency, format_percent, format_signed_currency, ratio};
use crate::model::fy_label;
use crate::qa::catalog::{checked, finite, Rule, RuleContext};
use crate::qa::types::{QaCategory, QaDraft};

use super::{bullets, join_paragraphs};

pub fn rules() -> Vec<Rule> {
    vec![
        Rule::new("revenue.initial", QaCategory::Revenue, 8, initial_revenue),
        Rule::new("revenue.trajectory", QaCategory::Revenue, 7, trajectory),
        Rule::new("revenue.growth_rate", QaCategory::Revenue, 9, growth_rate),
        Rule::new("revenue.segments", QaCategory::Revenue, 6, segments),
    ]
}

/// FY1 revenue against the industry's revenue_fy1 band
fn initial_revenue(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let revenue = finite("revenue_fy1", ctx.params.revenue_fy1())?;
    let range = ctx.benchmark.range(Driver::RevenueFy1);
    let deviation = range.classify(revenue);

    let summary = format!(
        "初年度売上は**{}**を計画しており、{}業界のベンチマーク（{}〜{}）に対して{}です。",
        format_currency(revenue),
        ctx.benchmark.label,
        format_currency(range.low),
        format_currency(range.high),
        deviation.tone()
    );

    let assessment = match deviation {
        Deviation::Below => {
            "保守的な立ち上がりを想定しており、上振れ余地を残した計画です。".to_string()
        }
        Deviation::Normal => format!(
            "業界の中央値（{}）と比較しても妥当な水準で、実現可能性の高い計画です。",
            format_currency(range.mid)
        ),
        Deviation::Above | Deviation::Aggressive => {
            "業界上限を上回るため、初期顧客の獲得見込みや受注済み案件など、立ち上がりを裏付ける根拠の提示が重要です。"
                .to_string()
        }
    };

    let mut blocks = vec![summary, assessment];
    if !ctx.is_executive() {
        let (growth, _) = ctx.growth()?;
        let series = ctx.revenue_series()?;
        blocks.push(format!(
            "売上成長率{}を前提に、FY5には{}へ拡大する計画です。",
            format_percent(growth),
            format_currency(series[4])
        ));
    }

    Ok(Some(
        QaDraft::new(
            "初年度の売上目標はどのような根拠で設定していますか？",
            join_paragraphs(blocks),
        )
        .with_tags(&["売上", "初年度", "ベンチマーク"]),
    ))
}

/// 5-year revenue path with year-over-year deltas
fn trajectory(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let Some(pl) = ctx.pl else {
        return Ok(None);
    };
    let revenue = checked("revenue", &pl.revenue)?;

    let cagr = ctx
        .kpis
        .and_then(|k| k.revenue_cagr)
        .filter(|c| c.is_finite())
        .or_else(|| derived::cagr(revenue));

    let summary = match cagr {
        Some(c) => format!(
            "売上はFY1の**{}**からFY5の**{}**へ拡大し、年平均成長率（CAGR）は{}です。",
            format_currency(revenue[0]),
            format_currency(revenue[4]),
            format_percent(c)
        ),
        None => format!(
            "売上はFY1の**{}**からFY5の**{}**へ推移する計画です。",
            format_currency(revenue[0]),
            format_currency(revenue[4])
        ),
    };

    let mut blocks = vec![summary];

    let deltas = derived::yoy_deltas(revenue);
    if !ctx.is_executive() {
        let growth = derived::yoy_growth(revenue);
        let lines = deltas.iter().enumerate().map(|(i, delta)| {
            let year = i + 1;
            if ctx.is_detailed() {
                format!(
                    "{}: {}（前年比 {} / {}）",
                    fy_label(year),
                    format_currency(revenue[year]),
                    format_signed_currency(*delta),
                    format_percent(growth[i])
                )
            } else {
                format!(
                    "{}: {}（前年比 {}）",
                    fy_label(year),
                    format_currency(revenue[year]),
                    format_signed_currency(*delta)
                )
            }
        });
        blocks.push(bullets(lines));
    }

    let largest = deltas
        .iter()
        .enumerate()
        .fold(None::<(usize, f64)>, |best, (i, d)| match best {
            Some((_, b)) if b >= *d => best,
            _ => Some((i, *d)),
        });
    if let Some((i, delta)) = largest.filter(|(_, d)| *d > 0.0) {
        blocks.push(format!(
            "最も伸びが大きいのは{}で、前年から{}の増加を見込んでいます。",
            fy_label(i + 1),
            format_currency(delta)
        ));
    }

    Ok(Some(
        QaDraft::new("5年間の売上推移の見通しは？", join_paragraphs(blocks))
            .with_tags(&["売上", "5年計画", "成長率"]),
    ))
}

/// Growth rate plausibility against the industry band
fn growth_rate(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let (growth, deviation) = ctx.growth()?;
    let range = ctx.benchmark.range(Driver::GrowthRate);

    let summary = format!(
        "売上成長率{}は、{}業界のベンチマーク（{}〜{}、中央値{}）に照らして**{}**です。",
        format_percent(growth),
        ctx.benchmark.label,
        format_percent(range.low),
        format_percent(range.high),
        format_percent(range.mid),
        deviation.tone()
    );

    let assessment = match deviation {
        Deviation::Below => "成長率を保守的に見積もっており、計画の下振れリスクは限定的です。一方で成長余地の説明を求められる可能性があります。",
        Deviation::Normal => "業界の成長トレンドと整合しており、無理のない成長シナリオです。",
        Deviation::Above => "業界上限をやや上回るため、新規チャネルや価格改定など成長を加速させる施策の裏付けが必要です。",
        Deviation::Aggressive => "業界水準を大きく上回るため、達成の前提となる施策と未達時の影響を併せて説明することが重要です。",
    };

    let mut blocks = vec![summary, assessment.to_string()];

    if ctx.is_detailed() && !ctx.benchmark.trends.is_empty() {
        let facts = ctx
            .benchmark
            .trends
            .iter()
            .take(2)
            .map(|t| format!("**{}**: {}", t.title, t.description));
        blocks.push(format!("業界動向として以下が挙げられます。\n{}", bullets(facts)));
    }

    Ok(Some(
        QaDraft::new(
            format!("売上成長率{}の前提は妥当ですか？", format_percent(growth)),
            join_paragraphs(blocks),
        )
        .with_tags(&["売上", "成長率", "ベンチマーク", deviation.as_str()]),
    ))
}

/// Segment mix, only when revenue is split into more than one segment
fn segments(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let Some(pl) = ctx.pl else {
        return Ok(None);
    };
    if pl.segments.len() <= 1 {
        return Ok(None);
    }

    for segment in &pl.segments {
        checked(&segment.name, &segment.revenue)?;
    }

    let fy5_total: f64 = pl.segments.iter().map(|s| s.revenue[4]).sum();
    let Some(top) = pl
        .segments
        .iter()
        .max_by(|a, b| a.revenue[4].total_cmp(&b.revenue[4]))
    else {
        return Ok(None);
    };

    let summary = format!(
        "売上は{}つのセグメントで構成され、FY5時点では**{}**が売上の{}を占める最大セグメントです。",
        pl.segments.len(),
        top.name,
        format_percent(ratio(top.revenue[4], fy5_total))
    );

    let lines = pl.segments.iter().map(|s| {
        format!(
            "{}: FY1 {} → FY5 {}（構成比 {}）",
            s.name,
            format_currency(s.revenue[0]),
            format_currency(s.revenue[4]),
            format_percent(ratio(s.revenue[4], fy5_total))
        )
    });

    Ok(Some(
        QaDraft::new("売上はどのセグメントで構成されていますか？", join_paragraphs(vec![summary, bullets(lines)]))
            .with_tags(&["売上", "セグメント"]),
    ))
}

#[cfg(test)]
mod tests {
    use crate::model::keys;
    use crate::qa::compress::paragraphs;
    use crate::qa::types::{DetailLevel, QaSettings};
    use crate::test_utils::*;

    #[test]
    fn test_initial_revenue_classification() {
        let settings = QaSettings::default();
        let draft = run_rule("revenue.initial", &saas_context(), &settings).unwrap();
        assert!(draft.answer.starts_with("初年度売上は**1.0億円**"));
        assert!(draft.answer.contains("業界標準の範囲内"));
        assert!(draft.answer.contains("FY5には"));

        let mut ctx = saas_context();
        ctx.parameters = saas_parameters().with(keys::REVENUE_FY1, 10_000_000.0);
        let draft = run_rule("revenue.initial", &ctx, &settings).unwrap();
        assert!(draft.answer.contains("保守的"));
    }

    #[test]
    fn test_initial_revenue_rejects_non_finite_growth_with_pl() {
        let mut ctx = full_saas_context();
        ctx.parameters = saas_parameters().with(keys::GROWTH_RATE, f64::INFINITY);
        assert!(try_rule("revenue.initial", &ctx, &QaSettings::default()).is_err());

        // Executive answers never quote the growth rate
        let executive = QaSettings {
            detail_level: DetailLevel::Executive,
            ..Default::default()
        };
        assert!(run_rule("revenue.initial", &ctx, &executive).is_some());
    }

    #[test]
    fn test_initial_revenue_executive_is_shorter() {
        let settings = QaSettings {
            detail_level: DetailLevel::Executive,
            ..Default::default()
        };
        let draft = run_rule("revenue.initial", &saas_context(), &settings).unwrap();
        assert_eq!(paragraphs(&draft.answer).count(), 2);
    }

    #[test]
    fn test_trajectory_requires_pl() {
        let settings = QaSettings::default();
        assert!(run_rule("revenue.trajectory", &saas_context(), &settings).is_none());

        let draft = run_rule("revenue.trajectory", &full_saas_context(), &settings).unwrap();
        assert!(draft.answer.contains("CAGR）は30.0%"));
        assert!(draft.answer.contains("- FY2: 1.3億円（前年比 +3000万円）"));
        assert!(draft.answer.contains("最も伸びが大きいのはFY5"));
    }

    #[test]
    fn test_growth_rate_detail_adds_two_trends() {
        let standard = run_rule("revenue.growth_rate", &saas_context(), &QaSettings::default())
            .unwrap();
        assert!(standard.question.contains("30.0%"));
        assert!(standard.tags.contains(&"normal".to_string()));
        assert!(!standard.answer.contains("業界動向"));

        let detailed = QaSettings {
            detail_level: DetailLevel::Detailed,
            ..Default::default()
        };
        let draft = run_rule("revenue.growth_rate", &saas_context(), &detailed).unwrap();
        assert!(draft.answer.contains("業界動向"));
        assert!(draft.answer.contains("生成AI機能の標準搭載"));
        assert!(draft.answer.contains("中小企業のDX需要拡大"));
        assert!(!draft.answer.contains("プロダクトレッドグロース"));
    }

    #[test]
    fn test_segments_need_more_than_one() {
        let settings = QaSettings::default();
        let draft = run_rule("revenue.segments", &full_saas_context(), &settings).unwrap();
        assert!(draft.answer.contains("2つのセグメント"));
        assert!(draft.answer.contains("**サブスクリプション**"));

        let mut ctx = full_saas_context();
        if let Some(pl) = ctx.pl_summary.as_mut() {
            pl.segments.truncate(1);
        }
        assert!(run_rule("revenue.segments", &ctx, &settings).is_none());
    }
}
