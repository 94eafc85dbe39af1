//! Funding questions, asked only by investors and bankers

use crate::derived;
use crate::error::Result;
use crate::format::{format_currency, format_percent, ratio};
use crate::qa::catalog::{checked, finite, Rule, RuleContext};
use crate::qa::types::{QaCategory, QaDraft};

use super::{bullets, join_paragraphs, kpi_year};

/// Allocation used when no SGA breakdown is available
const DEFAULT_ALLOCATION: &[(&str, f64)] = &[
    ("採用・人件費", 0.4),
    ("マーケティング", 0.3),
    ("開発・システム", 0.2),
    ("運転資金", 0.1),
];

/// Valuation range around the point estimate
const VALUATION_LOW: f64 = 0.7;
const VALUATION_HIGH: f64 = 1.3;

/// Runway target for a raise when the plan does not fund itself
pub const RUNWAY_MONTHS: u32 = 18;

pub fn rules() -> Vec<Rule> {
    vec![
        Rule::new("funding.use_of_funds", QaCategory::Funding, 9, use_of_funds),
        Rule::new("funding.valuation", QaCategory::Funding, 8, valuation),
        Rule::new("funding.runway", QaCategory::Funding, 8, runway),
    ]
}

/// Peak funding need from the cumulative FCF series, if any
fn funding_need(ctx: &RuleContext<'_>) -> Result<Option<f64>> {
    match ctx.pl {
        Some(pl) => Ok(derived::peak_funding_need(checked(
            "cumulative_fcf",
            &pl.cumulative_fcf,
        )?)),
        None => Ok(None),
    }
}

fn use_of_funds(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    if !ctx.target.wants_funding() {
        return Ok(None);
    }
    let need = funding_need(ctx)?;

    let (allocation, basis): (Vec<(&str, f64)>, &str) =
        match ctx.pl.and_then(|pl| pl.sga_breakdown.as_ref()) {
            Some(sga) => {
                let categories = sga.categories();
                for (label, series) in categories {
                    checked(label, series)?;
                }
                let totals: Vec<(&str, f64)> = categories
                    .iter()
                    .map(|(label, series)| (*label, derived::total(series.as_slice())))
                    .collect();
                let sum: f64 = totals.iter().map(|(_, v)| v).sum();
                let shares = totals
                    .into_iter()
                    .map(|(label, v)| (label, ratio(v, sum)))
                    .filter(|(_, share)| *share > 0.0)
                    .collect();
                (shares, "5年間の販管費計画の構成比に基づき")
            }
            None => (DEFAULT_ALLOCATION.to_vec(), "標準的な配分として"),
        };

    let summary = match need {
        Some(need) => format!(
            "必要資金は累積キャッシュの最低点から**{}**と見積もっており、{}以下のように配分します。",
            format_currency(need),
            basis
        ),
        None => format!("調達資金は{}以下のように配分します。", basis),
    };

    let lines = allocation.iter().map(|(label, share)| match need {
        Some(need) => format!(
            "{}: {}（{}）",
            label,
            format_percent(*share),
            format_currency(need * share)
        ),
        None => format!("{}: {}", label, format_percent(*share)),
    });

    Ok(Some(
        QaDraft::new(
            "調達資金の使途は？",
            join_paragraphs(vec![
                summary,
                bullets(lines),
                "資金使途は事業の進捗に応じて四半期ごとに見直します。".to_string(),
            ]),
        )
        .with_tags(&["資金調達", "資金使途"]),
    ))
}

/// Revenue-multiple valuation on FY5 revenue
fn valuation(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    if !ctx.target.wants_funding() {
        return Ok(None);
    }
    let revenue = ctx.revenue_series()?;
    let fy5 = revenue[4];
    if fy5 <= 0.0 {
        return Ok(None);
    }
    let multiple = finite("valuation_multiple", ctx.benchmark.valuation_multiple)?;
    let value = fy5 * multiple;

    let summary = format!(
        "FY5売上{}に{}業界の売上倍率{:.1}倍を適用すると、企業価値は**{}**程度と試算されます。",
        format_currency(fy5),
        ctx.benchmark.label,
        multiple,
        format_currency(value)
    );

    let range = format!(
        "成長性や市場環境により、評価額は{}〜{}の幅で変動し得ます。",
        format_currency(value * VALUATION_LOW),
        format_currency(value * VALUATION_HIGH)
    );

    let mut blocks = vec![summary, range];
    if !ctx.is_executive() {
        blocks.push(
            "売上倍率法による簡易的な試算であり、実際の評価は収益性や成長の持続性を踏まえて決まります。"
                .to_string(),
        );
    }

    Ok(Some(
        QaDraft::new("想定するバリュエーションは？", join_paragraphs(blocks))
            .with_tags(&["資金調達", "バリュエーション"]),
    ))
}

fn runway(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    if !ctx.target.wants_funding() {
        return Ok(None);
    }
    let question = "資金繰りとランウェイの見通しは？";
    let tags = ["資金調達", "ランウェイ", "キャッシュフロー"];

    let self_sustaining = match ctx.pl {
        Some(pl) => checked("cumulative_fcf", &pl.cumulative_fcf)?[4] > 0.0,
        None => false,
    };

    if self_sustaining {
        let need = funding_need(ctx)?;
        let year = kpi_year(ctx.kpis.and_then(|k| k.cumulative_break_even_year.as_deref()))
            .map(str::to_string)
            .or_else(|| {
                ctx.pl
                    .and_then(|pl| derived::find_crossover(&pl.cumulative_fcf))
                    .map(crate::model::fy_label)
            });

        let mut blocks = vec![match year {
            Some(year) => format!(
                "累積キャッシュフローは{}にプラスへ転じ、以降は**自走可能**な事業構造となります。",
                year
            ),
            None => "累積キャッシュフローはFY5時点でプラスとなり、**自走可能**な事業構造となります。"
                .to_string(),
        }];
        if let Some(need) = need {
            blocks.push(format!(
                "それまでの資金需要は最大{}で、この金額に余裕を持たせた調達を計画しています。",
                format_currency(need)
            ));
        }
        return Ok(Some(
            QaDraft::new(question, join_paragraphs(blocks)).with_tags(&tags),
        ));
    }

    let mut blocks = vec![format!(
        "今回の調達により、少なくとも**{}ヶ月**のランウェイを確保する計画です。",
        RUNWAY_MONTHS
    )];
    if let Some(fcf) = ctx.pl.map(|pl| checked("fcf", &pl.fcf)).transpose()? {
        if fcf[0] < 0.0 {
            blocks.push(format!(
                "FY1の月次バーンレートは約{}です。",
                format_currency(-fcf[0] / 12.0)
            ));
        }
    }
    blocks.push("次回の資金調達までに達成すべきマイルストーンを明確にし、進捗に応じて支出を調整します。".to_string());

    Ok(Some(
        QaDraft::new(question, join_paragraphs(blocks)).with_tags(&tags),
    ))
}
