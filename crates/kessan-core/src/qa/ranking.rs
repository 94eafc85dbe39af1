//! Audience-aware priority ranking

use super::types::{Audience, QaCategory, QaItem};

/// Priority added to items in a boosted category
pub const AUDIENCE_BOOST: i32 = 2;

/// Categories boosted for each audience
pub fn boosted_categories(audience: Audience) -> &'static [QaCategory] {
    match audience {
        Audience::Investor => &[QaCategory::Funding, QaCategory::Growth, QaCategory::Market],
        Audience::Banker => &[
            QaCategory::Risk,
            QaCategory::Funding,
            QaCategory::Profitability,
        ],
        Audience::Board => &[QaCategory::Profitability, QaCategory::Operations],
        Audience::Team => &[QaCategory::Operations, QaCategory::Growth],
        Audience::Partner => &[QaCategory::Market, QaCategory::Growth],
    }
}

/// Apply the audience boost and sort by priority (highest first).
///
/// The sort is stable: equal priorities keep their incoming order.
pub fn rank(items: &mut [QaItem], audience: Audience) {
    let boosted = boosted_categories(audience);
    for item in items.iter_mut() {
        if boosted.contains(&item.category) {
            item.priority += AUDIENCE_BOOST;
        }
    }

    items.sort_by(|a, b| b.priority.cmp(&a.priority));
}
