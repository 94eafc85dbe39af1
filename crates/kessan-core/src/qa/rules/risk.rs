//! Risk questions: downside scenario, competition, general mitigation

use crate::benchmark::Deviation;
use crate::derived;
use crate::error::Result;
use crate::format::format_currency;
use crate::model::{fy_label, Series, YEARS};
use crate::qa::catalog::{checked, Rule, RuleContext};
use crate::qa::types::{QaCategory, QaDraft};

use super::{bullets, join_paragraphs};

/// Downside scenario: revenue at 80% of plan
pub const REVENUE_SHOCK: f64 = 0.8;
/// Downside scenario: costs at 110% of plan
pub const COST_SHOCK: f64 = 1.1;

pub fn rules() -> Vec<Rule> {
    vec![
        Rule::new("risk.downside", QaCategory::Risk, 9, downside),
        Rule::new("risk.competition", QaCategory::Risk, 7, competition),
        Rule::new("risk.general", QaCategory::Risk, 6, general),
    ]
}

/// Operating profit with revenue and costs shocked
fn downside_profit(revenue: &Series, cogs: &Series, opex: &Series) -> Series {
    let mut out = [0.0; YEARS];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = revenue[i] * REVENUE_SHOCK - (cogs[i] + opex[i]) * COST_SHOCK;
    }
    out
}

fn downside(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let Some(pl) = ctx.pl else {
        return Ok(None);
    };
    let revenue = checked("revenue", &pl.revenue)?;
    let cogs = checked("cogs", &pl.cogs)?;
    let opex = checked("opex", &pl.opex)?;
    let operating = checked("operating_profit", &pl.operating_profit)?;

    let stressed = downside_profit(revenue, cogs, opex);

    let summary = format!(
        "売上が計画比20%減、費用が10%増となる下振れシナリオでは、FY5の営業利益は計画の{}から**{}**に減少します。",
        format_currency(operating[4]),
        format_currency(stressed[4])
    );

    let break_even = match derived::find_crossover(&stressed) {
        Some(i) => format!("この場合の黒字化は{}となります。", fy_label(i)),
        None if stressed[0] >= 0.0 => "下振れシナリオでもFY1から黒字を維持できます。".to_string(),
        None => "下振れシナリオでは計画期間内に黒字化しません。".to_string(),
    };

    let mut blocks = vec![summary, break_even];

    let losses: f64 = stressed.iter().filter(|v| **v < 0.0).sum();
    if losses < 0.0 {
        blocks.push(format!(
            "赤字期間の営業損失は累計{}となり、追加の資金手当てが必要になる可能性があります。",
            format_currency(-losses)
        ));
    }

    if ctx.is_detailed() {
        let lines = stressed.iter().enumerate().map(|(i, v)| {
            format!(
                "{}: 計画 {} → 下振れ {}",
                fy_label(i),
                format_currency(operating[i]),
                format_currency(*v)
            )
        });
        blocks.push(bullets(lines));
    }

    Ok(Some(
        QaDraft::new("計画が下振れした場合の影響は？", join_paragraphs(blocks))
            .with_tags(&["リスク", "感応度分析", "下振れシナリオ"]),
    ))
}

/// Competitor summary, only when the industry carries competitor data
fn competition(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let competitors = &ctx.benchmark.competitors;
    if competitors.is_empty() {
        return Ok(None);
    }
    let env = &ctx.benchmark.competitive_environment;

    let summary = format!(
        "{}業界では主に{}のタイプの競合が存在します。",
        ctx.benchmark.label,
        competitors.len()
    );

    let lines = competitors
        .iter()
        .map(|c| format!("**{}**: {}", c.name, c.description));

    let mut blocks = vec![summary, bullets(lines)];

    if !env.key_success_factors.is_empty() {
        blocks.push(format!(
            "業界の主要成功要因は「{}」であり、これらの点での差別化が競争優位の鍵となります。",
            env.key_success_factors.join("」「")
        ));
    }
    if ctx.is_detailed() && !env.entry_barriers.is_empty() {
        blocks.push(format!("参入障壁: {}", env.entry_barriers));
    }

    Ok(Some(
        QaDraft::new("競合環境と差別化のポイントは？", join_paragraphs(blocks))
            .with_tags(&["リスク", "競合", "差別化"]),
    ))
}

fn general(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let (_, growth) = ctx.growth()?;
    let (_, cogs) = ctx.cogs()?;

    let summary = "主なリスクは需要の変動、人材確保、競合の参入、資金調達環境の変化です。".to_string();

    let mut risks = vec![
        "需要変動: 顧客基盤の分散と継続課金比率の向上で売上の安定性を高める",
        "人材確保: 採用チャネルの多様化と業務委託の活用で採用遅延に備える",
        "競合参入: 顧客データの蓄積と製品改善サイクルで差別化を維持する",
        "資金調達: 複数の調達手段を確保し、手元資金の水準を定期的に見直す",
    ];
    if matches!(growth, Deviation::Above | Deviation::Aggressive) {
        risks.push("成長未達: 業界水準を上回る成長前提のため、月次で進捗を確認し費用計画を機動的に調整する");
    }
    if cogs == Deviation::Below {
        risks.push("原価上昇: 業界水準を下回る原価率の前提が崩れた場合の粗利影響を事前に試算する");
    }

    let mut blocks = vec![summary];
    if !ctx.is_executive() {
        blocks.push(bullets(risks));
    }
    blocks.push("各リスクは四半期ごとにモニタリングし、計画との乖離が生じた場合は速やかに対策を講じます。".to_string());

    Ok(Some(
        QaDraft::new("事業上の主なリスクと対策は？", join_paragraphs(blocks))
            .with_tags(&["リスク", "リスク管理"]),
    ))
}
