use crate::error::{AppError, Result};
use crate::models::constraint::{Constraint, ConstraintDraft, ConstraintStrategy, ExactValue};

/// 去掉首尾空白后非空才算填写
fn filled(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_number(raw: &str, what: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(AppError::InvalidRange(format!("{} must be a number, got '{}'", what, raw))),
    }
}

/// 精确值的类型推断：先数字，再布尔关键字，否则保持原文
pub fn infer_exact_value(raw: &str) -> ExactValue {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return ExactValue::Integer(n);
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        if n.is_finite() {
            return ExactValue::Float(n);
        }
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return ExactValue::Boolean(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return ExactValue::Boolean(false);
    }
    ExactValue::Text(raw.to_string())
}

/// 校验约束草稿并构建约束；不合法的草稿不会产生半成品
pub fn validate_and_build(draft: &ConstraintDraft) -> Result<Constraint> {
    let strategy = ConstraintStrategy::parse(&draft.strategy)
        .ok_or_else(|| AppError::UnsupportedStrategy(draft.strategy.clone()))?;
    let field = draft.field.trim();

    match strategy {
        ConstraintStrategy::PercentageDistribution => {
            if field.is_empty() {
                return Err(AppError::missing("field"));
            }
            let value = filled(&draft.value).ok_or_else(|| AppError::missing("value"))?;
            let raw_pct = filled(&draft.percentage).ok_or_else(|| AppError::missing("percentage"))?;
            let percentage = parse_number(raw_pct, "percentage")?;
            if percentage == 0.0 {
                return Err(AppError::missing("percentage"));
            }
            if !(0.0..=100.0).contains(&percentage) {
                return Err(AppError::InvalidRange(format!(
                    "percentage must be within (0, 100], got {}",
                    percentage
                )));
            }
            Ok(Constraint::PercentageDistribution {
                field: field.to_string(),
                value: value.to_string(),
                percentage,
            })
        }
        ConstraintStrategy::ExactValue => {
            if field.is_empty() {
                return Err(AppError::missing("field"));
            }
            // 精确值允许空白以外的任意文本，推断时保留原文
            let raw = draft
                .value
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| AppError::missing("value"))?;
            Ok(Constraint::ExactValue {
                field: field.to_string(),
                value: infer_exact_value(raw),
            })
        }
        ConstraintStrategy::Range => {
            if field.is_empty() {
                return Err(AppError::missing("field"));
            }
            let min_value = filled(&draft.min_value)
                .map(|s| parse_number(s, "min_value"))
                .transpose()?;
            let max_value = filled(&draft.max_value)
                .map(|s| parse_number(s, "max_value"))
                .transpose()?;
            match (min_value, max_value) {
                (None, None) => return Err(AppError::missing("min_value or max_value")),
                (Some(min), Some(max)) if min > max => {
                    return Err(AppError::InvalidRange(format!(
                        "min value {} cannot be greater than max value {}",
                        min, max
                    )))
                }
                _ => {}
            }
            Ok(Constraint::Range {
                field: field.to_string(),
                min_value,
                max_value,
            })
        }
    }
}

/// 返回去掉 `index` 处元素的新列表；越界时原样返回
pub fn remove_at<T: Clone>(list: &[T], index: usize) -> Vec<T> {
    list.iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, item)| item.clone())
        .collect()
}

/// 追加一条约束，返回新列表
pub fn append(list: &[Constraint], constraint: Constraint) -> Vec<Constraint> {
    let mut next = list.to_vec();
    next.push(constraint);
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_requires_field_value_and_percentage() {
        let draft = ConstraintDraft::new("department", "percentage_distribution")
            .with_value("Engineering")
            .with_percentage("0");
        assert_eq!(validate_and_build(&draft), Err(AppError::missing("percentage")));

        let draft = ConstraintDraft::new("", "percentage_distribution")
            .with_value("Engineering")
            .with_percentage("30");
        assert_eq!(validate_and_build(&draft), Err(AppError::missing("field")));

        let draft = ConstraintDraft::new("department", "percentage_distribution").with_percentage("30");
        assert_eq!(validate_and_build(&draft), Err(AppError::missing("value")));
    }

    #[test]
    fn percentage_is_parsed_as_number() {
        let draft = ConstraintDraft::new("department", "percentage_distribution")
            .with_value("Engineering")
            .with_percentage("37.5");
        let built = validate_and_build(&draft).unwrap();
        assert_eq!(
            built,
            Constraint::PercentageDistribution {
                field: "department".into(),
                value: "Engineering".into(),
                percentage: 37.5,
            }
        );
        assert_eq!(built.to_string(), "department: 37.5% of 'Engineering'");
    }

    #[test]
    fn percentage_above_hundred_is_rejected() {
        let draft = ConstraintDraft::new("tier", "percentage_distribution")
            .with_value("gold")
            .with_percentage("120");
        assert!(matches!(validate_and_build(&draft), Err(AppError::InvalidRange(_))));
    }

    #[test]
    fn exact_value_inference() {
        assert_eq!(infer_exact_value("true"), ExactValue::Boolean(true));
        assert_eq!(infer_exact_value("FALSE"), ExactValue::Boolean(false));
        assert_eq!(infer_exact_value("42"), ExactValue::Integer(42));
        assert_eq!(infer_exact_value("4.5"), ExactValue::Float(4.5));
        assert_eq!(infer_exact_value("abc"), ExactValue::Text("abc".into()));
        // 非有限数字保持原文
        assert_eq!(infer_exact_value("NaN"), ExactValue::Text("NaN".into()));
    }

    #[test]
    fn exact_value_requires_value() {
        let draft = ConstraintDraft::new("status", "exact_value");
        assert_eq!(validate_and_build(&draft), Err(AppError::missing("value")));

        let draft = ConstraintDraft::new("status", "exact_value").with_value("VIP");
        let built = validate_and_build(&draft).unwrap();
        assert_eq!(built.to_string(), "status: Exact Value 'VIP'");
    }

    #[test]
    fn range_bounds() {
        let draft = ConstraintDraft::new("age", "range");
        assert_eq!(
            validate_and_build(&draft),
            Err(AppError::missing("min_value or max_value"))
        );

        let draft = ConstraintDraft::new("age", "range").with_bounds(Some("65"), Some("18"));
        assert!(matches!(validate_and_build(&draft), Err(AppError::InvalidRange(_))));

        let draft = ConstraintDraft::new("age", "range").with_bounds(Some("18"), None);
        let built = validate_and_build(&draft).unwrap();
        assert_eq!(built.to_string(), "age: Range [18, -]");

        let draft = ConstraintDraft::new("age", "range").with_bounds(Some("eighteen"), None);
        assert!(matches!(validate_and_build(&draft), Err(AppError::InvalidRange(_))));
    }

    #[test]
    fn unknown_strategy() {
        let draft = ConstraintDraft::new("age", "median");
        assert_eq!(
            validate_and_build(&draft),
            Err(AppError::UnsupportedStrategy("median".into()))
        );
    }

    #[test]
    fn wire_format_is_tagged_by_strategy() {
        let draft = ConstraintDraft::new("status", "exact_value").with_value("true");
        let built = validate_and_build(&draft).unwrap();
        let json = serde_json::to_value(&built).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"strategy": "exact_value", "field": "status", "value": true})
        );
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let list = vec![1, 2, 3];
        assert_eq!(remove_at(&list, 7), list);
        assert_eq!(remove_at(&list, 1), vec![1, 3]);
    }
}
