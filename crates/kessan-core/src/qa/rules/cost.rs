//! Cost questions: cost of goods, SGA breakdown, payroll, capital expenditure

use crate::benchmark::{Deviation, Driver, BELOW_FACTOR};
use crate::derived;
use crate::error::Result;
use crate::format::{format_currency, format_percent, ratio};
use crate::model::YEARS;
use crate::qa::catalog::{checked, finite, Rule, RuleContext};
use crate::qa::types::{QaCategory, QaDraft};

use super::{bullets, format_count, join_paragraphs, trend_about};

pub fn rules() -> Vec<Rule> {
    vec![
        Rule::new("cost.cogs_rate", QaCategory::Cost, 8, cogs_rate),
        Rule::new("cost.low_cogs", QaCategory::Cost, 7, low_cogs),
        Rule::new("cost.sga_breakdown", QaCategory::Cost, 7, sga_breakdown),
        Rule::new("cost.payroll", QaCategory::Cost, 6, payroll),
        Rule::new("cost.capex", QaCategory::Cost, 6, capex),
    ]
}

/// Cost ratios read differently from revenue drivers: low is optimistic
fn cost_tone(deviation: Deviation) -> &'static str {
    match deviation {
        Deviation::Below => "業界水準を大きく下回る低い水準",
        Deviation::Normal => "業界標準の範囲内",
        Deviation::Above => "業界上限をやや上回る高い水準",
        Deviation::Aggressive => "業界水準を大きく上回る高い水準",
    }
}

fn cogs_rate(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let (cogs, deviation) = ctx.cogs()?;
    let range = ctx.benchmark.range(Driver::CogsRate);

    let summary = format!(
        "売上原価率は**{}**で、粗利率は{}となります。{}業界の原価率（{}〜{}）に対して{}です。",
        format_percent(cogs),
        format_percent(1.0 - cogs),
        ctx.benchmark.label,
        format_percent(range.low),
        format_percent(range.high),
        cost_tone(deviation)
    );

    let mut blocks = vec![summary];

    if let Some(pl) = ctx.pl {
        let gross = checked("gross_profit", &pl.gross_profit)?;
        let revenue = checked("revenue", &pl.revenue)?;
        let gm = derived::margins(gross, revenue);
        blocks.push(format!(
            "P&L上の粗利率はFY1の{}からFY5の{}へ推移します。",
            format_percent(gm[0]),
            format_percent(gm[4])
        ));
    } else if let Some(gp) = ctx.kpis.and_then(|k| k.gp_margin).filter(|v| v.is_finite()) {
        blocks.push(format!("KPI上の粗利率は{}です。", format_percent(gp)));
    }

    blocks.push(
        match deviation {
            Deviation::Below => "原価優位性の根拠（仕入れ条件、自社開発比率など）を示すことで計画の信頼性が高まります。",
            Deviation::Normal => "業界標準の原価構造を前提とした堅実な計画です。",
            Deviation::Above | Deviation::Aggressive => {
                "原価率が高く粗利が圧迫されるため、価格設定や調達条件の改善計画が論点になります。"
            }
        }
        .to_string(),
    );

    Ok(Some(
        QaDraft::new(
            format!("原価率{}の前提と粗利率の見通しは？", format_percent(cogs)),
            join_paragraphs(blocks),
        )
        .with_tags(&["コスト", "原価率", "粗利率", deviation.as_str()]),
    ))
}

/// Supplementary item when the COGS rate sits below the industry band
fn low_cogs(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let (cogs, deviation) = ctx.cogs()?;
    if deviation != Deviation::Below {
        return Ok(None);
    }
    let range = ctx.benchmark.range(Driver::CogsRate);

    let summary = format!(
        "原価率{}は{}業界の下限{}の8割（{}）を下回っており、ベンチマーク比で**低すぎる**水準です。",
        format_percent(cogs),
        ctx.benchmark.label,
        format_percent(range.low),
        format_percent(range.low * BELOW_FACTOR)
    );

    let justification = match trend_about(ctx.benchmark, "原価") {
        Some(trend) => format!(
            "業界動向では「{}」により{}とされており、原価構造の前提を確認する必要があります。",
            trend.title, trend.impact
        ),
        None => "原価を抑えられる具体的な根拠（仕入れ契約、技術的優位性など）の提示が求められます。"
            .to_string(),
    };

    let revenue = finite("revenue_fy1", ctx.params.revenue_fy1())?;
    let impact = format!(
        "原価率が業界中央値{}まで上昇した場合、FY1の粗利は{}減少します。",
        format_percent(range.mid),
        format_currency(revenue * (range.mid - cogs))
    );

    Ok(Some(
        QaDraft::new(
            "原価率が業界水準を大きく下回る理由は？",
            join_paragraphs(vec![summary, justification, impact]),
        )
        .with_tags(&["コスト", "原価率", "ベンチマーク乖離"]),
    ))
}

fn sga_breakdown(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let question = "販管費の内訳と推移は？";
    let tags = ["コスト", "販管費"];

    let Some(sga) = ctx.pl.and_then(|pl| pl.sga_breakdown.as_ref()) else {
        return aggregate_sga(ctx).map(|answer| Some(QaDraft::new(question, answer).with_tags(&tags)));
    };

    for (label, series) in sga.categories() {
        checked(label, series)?;
    }

    let (total_fy1, total_fy5) = (sga.total(0), sga.total(YEARS - 1));
    let summary = format!(
        "FY1の販管費は**{}**で、FY5には{}となる計画です。",
        format_currency(total_fy1),
        format_currency(total_fy5)
    );

    let lines = sga.categories().into_iter().map(|(label, series)| {
        if ctx.is_detailed() {
            let years = series
                .iter()
                .map(|v| format_currency(*v))
                .collect::<Vec<_>>()
                .join(" / ");
            format!(
                "{}: {}（FY1構成比{}）",
                label,
                years,
                format_percent(ratio(series[0], total_fy1))
            )
        } else {
            format!(
                "{}: {}（構成比{}）→ FY5 {}",
                label,
                format_currency(series[0]),
                format_percent(ratio(series[0], total_fy1)),
                format_currency(series[4])
            )
        }
    });

    let mut blocks = vec![summary, bullets(lines)];

    if let Some((label, series)) = sga
        .categories()
        .into_iter()
        .max_by(|a, b| a.1[0].total_cmp(&b.1[0]))
        .filter(|(_, s)| s[0] > 0.0)
    {
        blocks.push(format!(
            "最大の費目は{}で、FY1販管費の{}を占めます。",
            label,
            format_percent(ratio(series[0], total_fy1))
        ));
    }

    Ok(Some(QaDraft::new(question, join_paragraphs(blocks)).with_tags(&tags)))
}

/// Single-figure SGA answer when no breakdown is supplied
fn aggregate_sga(ctx: &RuleContext<'_>) -> Result<String> {
    let growth = finite("opex_growth", ctx.params.opex_growth())?;
    let summary = match ctx.pl {
        Some(pl) => {
            let opex = checked("opex", &pl.opex)?;
            format!(
                "FY1の販管費は**{}**、FY5は{}で、年率{}で増加する前提です。",
                format_currency(opex[0]),
                format_currency(opex[4]),
                format_percent(growth)
            )
        }
        None => format!(
            "FY1の販管費は**{}**を見込み、年率{}で増加する前提です。",
            format_currency(finite("opex_base", ctx.params.opex_base())?),
            format_percent(growth)
        ),
    };

    Ok(join_paragraphs(vec![
        summary,
        "費目別の内訳は未設定のため、総額ベースでの計画となっています。".to_string(),
    ]))
}

/// Headcount and payroll, from role-level P&L detail or parameter overrides
fn payroll(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let question = "人員計画と人件費の見通しは？";
    let tags = ["コスト", "人件費", "採用計画"];

    if let Some(roles) = ctx
        .pl
        .and_then(|pl| pl.sga_detail.as_ref())
        .map(|d| &d.payroll)
        .filter(|p| !p.is_empty())
    {
        for role in roles {
            checked(&role.role, &role.headcount)?;
            finite(&role.role, role.salary)?;
        }

        let headcount = |year: usize| roles.iter().map(|r| r.headcount[year]).sum::<f64>();
        let cost = |year: usize| {
            roles
                .iter()
                .map(|r| r.headcount[year] * r.salary)
                .sum::<f64>()
        };

        let summary = format!(
            "FY1の人員は**{}名**、FY5には{}名体制とする計画で、FY1の人件費は{}です。",
            format_count(headcount(0)),
            format_count(headcount(YEARS - 1)),
            format_currency(cost(0))
        );
        let lines = roles.iter().map(|r| {
            format!(
                "{}: FY1 {}名 → FY5 {}名（年収{}）",
                r.role,
                format_count(r.headcount[0]),
                format_count(r.headcount[YEARS - 1]),
                format_currency(r.salary)
            )
        });
        let closing = format!(
            "FY5の人件費は{}となり、採用ペースが販管費の伸びを左右します。",
            format_currency(cost(YEARS - 1))
        );

        return Ok(Some(
            QaDraft::new(question, join_paragraphs(vec![summary, bullets(lines), closing]))
                .with_tags(&tags),
        ));
    }

    let overrides = ctx.params.role_overrides();
    if overrides.is_empty() {
        return Ok(None);
    }

    let mut total = 0.0;
    let mut lines = Vec::with_capacity(overrides.len());
    for o in &overrides {
        let salary = o.salary.map(|s| finite(&o.role, s)).transpose()?;
        let heads = o.headcount.map(|h| finite(&o.role, h)).transpose()?;
        if let (Some(s), Some(h)) = (salary, heads) {
            total += s * h;
        }
        lines.push(format!(
            "{}: {} × 年収{}",
            o.role,
            heads.map(|h| format!("{}名", format_count(h))).unwrap_or_else(|| "人数未設定".to_string()),
            salary.map(format_currency).unwrap_or_else(|| "未設定".to_string())
        ));
    }

    let summary = format!(
        "役職別に{}職種の人員・給与を設定しており、年間人件費は**{}**です。",
        overrides.len(),
        format_currency(total)
    );

    Ok(Some(
        QaDraft::new(question, join_paragraphs(vec![summary, bullets(lines)])).with_tags(&tags),
    ))
}

/// Supplementary item when the plan carries capital expenditure
fn capex(ctx: &RuleContext<'_>) -> Result<Option<QaDraft>> {
    let Some(pl) = ctx.pl else {
        return Ok(None);
    };
    let Some(capex) = pl.capex.as_ref() else {
        return Ok(None);
    };
    let capex = checked("capex", capex)?;
    let capex_total = derived::total(capex);
    if capex_total <= 0.0 {
        return Ok(None);
    }

    let summary = format!(
        "5年間で累計**{}**の設備投資を計画しており、FY1の投資額は{}です。",
        format_currency(capex_total),
        format_currency(capex[0])
    );

    let depreciation = match pl.depreciation.as_ref() {
        Some(dep) => {
            let dep = checked("depreciation", dep)?;
            format!(
                "減価償却費は5年間累計で{}、FY5時点で年間{}を見込んでおり、営業利益を押し下げる要因となります。",
                format_currency(derived::total(dep)),
                format_currency(dep[4])
            )
        }
        None => "減価償却費の計画は未設定のため、投資額に応じた償却負担の確認が必要です。".to_string(),
    };

    let revenue = checked("revenue", &pl.revenue)?;
    let mut blocks = vec![
        summary,
        depreciation,
        format!(
            "累計投資額は5年間累計売上の{}に相当します。",
            format_percent(ratio(capex_total, derived::total(revenue)))
        ),
    ];

    if let Some(trend) = trend_about(ctx.benchmark, "投資") {
        blocks.push(format!(
            "業界動向「{}」（{}）を踏まえた投資計画です。",
            trend.title, trend.impact
        ));
    }

    Ok(Some(
        QaDraft::new("設備投資（CAPEX）の計画と減価償却の影響は？", join_paragraphs(blocks))
            .with_tags(&["コスト", "設備投資", "減価償却"]),
    ))
}

#[cfg(test)]
mod tests {
    use crate::model::keys;
    use crate::qa::types::{DetailLevel, QaSettings};
    use crate::test_utils::*;

    #[test]
    fn test_cogs_rate_normal_for_saas() {
        let draft = run_rule("cost.cogs_rate", &full_saas_context(), &QaSettings::default())
            .unwrap();
        assert!(draft.answer.starts_with("売上原価率は**30.0%**で、粗利率は70.0%"));
        assert!(draft.answer.contains("FY1の70.0%からFY5の70.0%"));
        assert!(draft.tags.contains(&"normal".to_string()));
    }

    #[test]
    fn test_low_cogs_fires_only_below_band() {
        let settings = QaSettings::default();
        assert!(run_rule("cost.low_cogs", &saas_context(), &settings).is_none());

        let mut ctx = saas_context();
        ctx.parameters = saas_parameters().with(keys::COGS_RATE, 0.05);
        let draft = run_rule("cost.low_cogs", &ctx, &settings).unwrap();
        assert!(draft.answer.contains("8割（8.0%）"));
        assert!(draft.answer.contains("業界動向"));
        // 100M * (0.2 - 0.05)
        assert!(draft.answer.contains("1500万円減少"));
    }

    #[test]
    fn test_sga_breakdown_and_fallback() {
        let settings = QaSettings::default();
        let draft = run_rule("cost.sga_breakdown", &full_saas_context(), &settings).unwrap();
        assert!(draft.answer.contains("FY1の販管費は**8000万円**"));
        assert!(draft.answer.contains("- 人件費: 4800万円（構成比60.0%）→ FY5 6400万円"));
        assert!(draft.answer.contains("最大の費目は人件費"));

        let detailed = QaSettings {
            detail_level: DetailLevel::Detailed,
            ..Default::default()
        };
        let draft = run_rule("cost.sga_breakdown", &full_saas_context(), &detailed).unwrap();
        assert!(draft.answer.contains("800万円 / 800万円 / 800万円"));

        let fallback = run_rule("cost.sga_breakdown", &saas_context(), &settings).unwrap();
        assert!(fallback.answer.contains("総額ベース"));
        assert!(fallback.answer.contains("**8000万円**"));
    }

    #[test]
    fn test_payroll_from_detail_and_overrides() {
        let settings = QaSettings::default();
        assert!(run_rule("cost.payroll", &saas_context(), &settings).is_none());

        let draft = run_rule("cost.payroll", &full_saas_context(), &settings).unwrap();
        assert!(draft.answer.contains("FY1の人員は**6名**、FY5には10名体制"));
        assert!(draft.answer.contains("FY1の人件費は4400万円"));

        let mut ctx = saas_context();
        ctx.parameters = saas_parameters()
            .with("salary_engineer", 8_000_000.0)
            .with("headcount_engineer", 3.0)
            .with("salary_designer", 6_000_000.0);
        let draft = run_rule("cost.payroll", &ctx, &settings).unwrap();
        assert!(draft.answer.contains("2職種"));
        assert!(draft.answer.contains("**2400万円**"));
        assert!(draft.answer.contains("designer: 人数未設定"));
    }

    #[test]
    fn test_capex_requires_positive_total() {
        let settings = QaSettings::default();
        let draft = run_rule("cost.capex", &full_saas_context(), &settings).unwrap();
        assert!(draft.answer.contains("累計**2000万円**"));
        assert!(draft.answer.contains("減価償却費は5年間累計で1800万円"));

        let mut ctx = full_saas_context();
        if let Some(pl) = ctx.pl_summary.as_mut() {
            pl.capex = Some([0.0; 5]);
        }
        assert!(run_rule("cost.capex", &ctx, &settings).is_none());
    }

    #[test]
    fn test_non_finite_input_is_an_error() {
        let mut ctx = saas_context();
        ctx.parameters = saas_parameters().with(keys::COGS_RATE, f64::NAN);
        assert!(try_rule("cost.cogs_rate", &ctx, &QaSettings::default()).is_err());
    }
}
