use crate::error::{AppError, Result};
use crate::models::augment::{
    AugmentRequest, AugmentSource, AugmentationRule, AugmentationRuleDraft, AugmentationStrategy,
};
use crate::models::result::Row;

fn filled(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub fn validate_rule(draft: &AugmentationRuleDraft) -> Result<AugmentationRule> {
    let field = draft.field.trim();
    if field.is_empty() {
        return Err(AppError::missing("field"));
    }
    let strategy = AugmentationStrategy::parse(&draft.strategy)
        .ok_or_else(|| AppError::UnsupportedStrategy(draft.strategy.clone()))?;
    let value = filled(&draft.value).map(str::to_string);

    let mut rule = AugmentationRule {
        field: field.to_string(),
        strategy,
        value: None,
        target_percentage: None,
        target_count: None,
    };

    match strategy {
        AugmentationStrategy::TargetPercentage => {
            rule.value = Some(value.ok_or_else(|| AppError::missing("value"))?);
            let raw = filled(&draft.target_percentage)
                .ok_or_else(|| AppError::missing("target_percentage"))?;
            let pct: f64 = raw.parse().map_err(|_| {
                AppError::InvalidRange(format!("target_percentage must be a number, got '{}'", raw))
            })?;
            if pct == 0.0 {
                return Err(AppError::missing("target_percentage"));
            }
            if !(0.0..=100.0).contains(&pct) {
                return Err(AppError::InvalidRange(format!(
                    "target_percentage must be within (0, 100], got {}",
                    pct
                )));
            }
            rule.target_percentage = Some(pct);
        }
        AugmentationStrategy::OversampleValue => {
            rule.value = Some(value.ok_or_else(|| AppError::missing("value"))?);
            let raw =
                filled(&draft.target_count).ok_or_else(|| AppError::missing("target_count"))?;
            let count: u64 = raw.parse().map_err(|_| {
                AppError::InvalidRange(format!("target_count must be a whole number, got '{}'", raw))
            })?;
            if count == 0 {
                return Err(AppError::missing("target_count"));
            }
            rule.target_count = Some(count);
        }
        AugmentationStrategy::BalanceCategories => {
            rule.value = value;
        }
    }
    Ok(rule)
}

/// 组装增强请求；有历史 id 时优先引用历史，否则带上当前数据
pub fn build_augment_request(
    rules: Vec<AugmentationRule>,
    data: Option<Vec<Row>>,
    history_id: Option<i64>,
) -> Result<AugmentRequest> {
    if rules.is_empty() {
        return Err(AppError::missing("rules"));
    }
    let source = match (history_id, data) {
        (Some(id), _) => AugmentSource::History(id),
        (None, Some(rows)) if !rows.is_empty() => AugmentSource::Data(rows),
        _ => return Err(AppError::NoResult),
    };
    Ok(AugmentRequest { rules, source })
}
