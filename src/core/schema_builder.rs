use crate::core::constraint_builder::remove_at;
use crate::error::{AppError, Result};
use crate::models::schema::{Column, ColumnDataType, ColumnDraft, Table, TableDraft};

fn non_empty(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// 校验列草稿；同名列在这一层不去重
pub fn add_column(draft: &ColumnDraft) -> Result<Column> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(AppError::missing("name"));
    }
    let raw_type = non_empty(&draft.data_type).ok_or_else(|| AppError::missing("data_type"))?;
    let data_type =
        ColumnDataType::parse(&raw_type).ok_or(AppError::UnsupportedDataType(raw_type))?;

    let (references_table, references_column) = if draft.is_foreign_key {
        let table = non_empty(&draft.references_table)
            .ok_or_else(|| AppError::missing("references_table"))?;
        let column = non_empty(&draft.references_column)
            .ok_or_else(|| AppError::missing("references_column"))?;
        (Some(table), Some(column))
    } else {
        // 非外键列不带引用信息
        (None, None)
    };

    Ok(Column {
        name: name.to_string(),
        data_type,
        description: non_empty(&draft.description),
        is_primary_key: draft.is_primary_key,
        is_foreign_key: draft.is_foreign_key,
        references_table,
        references_column,
        unique: draft.unique,
    })
}

/// 追加一张表，返回新的表列表；表名唯一性与外键目标都不在这里检查
pub fn add_table(active: &[Table], draft: TableDraft) -> Result<Vec<Table>> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(AppError::missing("name"));
    }
    if draft.columns.is_empty() {
        return Err(AppError::missing("columns"));
    }
    if draft.rows < 1 {
        return Err(AppError::InvalidRange(format!(
            "table rows must be at least 1, got {}",
            draft.rows
        )));
    }
    let rows = u32::try_from(draft.rows)
        .map_err(|_| AppError::InvalidRange(format!("table rows too large: {}", draft.rows)))?;

    let mut next = active.to_vec();
    next.push(Table {
        name: name.to_string(),
        rows,
        columns: draft.columns,
    });
    Ok(next)
}

pub fn remove_table(tables: &[Table], index: usize) -> Vec<Table> {
    remove_at(tables, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_requires_name_and_type() {
        let mut draft = ColumnDraft::new("", "integer");
        assert_eq!(add_column(&draft), Err(AppError::missing("name")));

        draft.name = "id".into();
        draft.data_type = None;
        assert_eq!(add_column(&draft), Err(AppError::missing("data_type")));

        draft.data_type = Some("uuid".into());
        assert_eq!(
            add_column(&draft),
            Err(AppError::UnsupportedDataType("uuid".into()))
        );
    }

    #[test]
    fn foreign_key_needs_both_references() {
        let mut draft = ColumnDraft::new("customer_id", "integer").references("customers", "");
        assert_eq!(
            add_column(&draft),
            Err(AppError::missing("references_column"))
        );

        draft.references_column = Some("id".into());
        let col = add_column(&draft).unwrap();
        assert_eq!(col.reference(), Some(("customers", "id")));
    }

    #[test]
    fn references_dropped_for_plain_columns() {
        let mut draft = ColumnDraft::new("email", "string");
        draft.references_table = Some("users".into());
        let col = add_column(&draft).unwrap();
        assert_eq!(col.references_table, None);
        assert_eq!(col.reference(), None);
    }

    #[test]
    fn orders_table_keeps_column_order() {
        let id = add_column(&ColumnDraft::new("id", "integer").primary_key()).unwrap();
        let fk = add_column(&ColumnDraft::new("customer_id", "integer").references("customers", "id"))
            .unwrap();

        let tables = add_table(&[], TableDraft::new("orders", 10, vec![id, fk])).unwrap();
        assert_eq!(tables.len(), 1);
        let orders = &tables[0];
        assert_eq!(orders.rows, 10);
        let names: Vec<_> = orders.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "customer_id"]);
    }

    #[test]
    fn table_requires_name_columns_and_rows() {
        let id = add_column(&ColumnDraft::new("id", "integer")).unwrap();
        assert_eq!(
            add_table(&[], TableDraft::new(" ", 5, vec![id.clone()])),
            Err(AppError::missing("name"))
        );
        assert_eq!(
            add_table(&[], TableDraft::new("users", 5, vec![])),
            Err(AppError::missing("columns"))
        );
        assert!(matches!(
            add_table(&[], TableDraft::new("users", 0, vec![id])),
            Err(AppError::InvalidRange(_))
        ));
    }

    #[test]
    fn duplicate_table_names_are_allowed() {
        let id = add_column(&ColumnDraft::new("id", "integer")).unwrap();
        let tables = add_table(&[], TableDraft::new("users", 5, vec![id.clone()])).unwrap();
        let tables = add_table(&tables, TableDraft::new("users", 3, vec![id])).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(remove_table(&tables, 5), tables);
        assert_eq!(remove_table(&tables, 0).len(), 1);
    }
}
