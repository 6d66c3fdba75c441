//! Tests for the ALTER TABLE compiler

use crate::alter::AlterTableBuilder;
use crate::ddl::{AUTO_INCREMENT_OFFSET_KEY, ENGINE_KEY};
use crate::type_converter::{MySqlTypeDescriptor, from_mysql_type};
use indoc::indoc;
use pretty_assertions::assert_eq;
use relcat_core::{Column, ColumnPosition, DataType, Index, RelcatError, Table, TableChange};

fn snapshot() -> Table {
    Table::builder("al_table")
        .comment("test_comment")
        .column(
            Column::builder("col_1")
                .data_type(DataType::Integer)
                .comment("id")
                .not_null()
                .build()
                .unwrap(),
        )
        .column(
            Column::builder("col_2")
                .data_type(DataType::varchar(255))
                .comment("name")
                .not_null()
                .build()
                .unwrap(),
        )
        .column(
            Column::builder("col_3")
                .data_type(DataType::varchar(255))
                .comment("txt3")
                .build()
                .unwrap(),
        )
        .index(Index::primary_key(&["col_1", "col_2"]))
        .index(Index::unique("uk_2", &["col_1", "col_2"]))
        .build()
        .unwrap()
}

fn build(table: &Table, changes: &[TableChange]) -> relcat_core::Result<Option<String>> {
    AlterTableBuilder::new("db", table).build(changes)
}

fn build_sql(changes: &[TableChange]) -> String {
    build(&snapshot(), changes)
        .unwrap()
        .expect("statement expected")
}

#[test]
fn test_add_column_after_and_set_property() {
    let sql = build_sql(&[
        TableChange::add_column_with(
            "col_5",
            DataType::varchar(255),
            Some("new_add".into()),
            ColumnPosition::After("col_1".into()),
            true,
            false,
        ),
        TableChange::set_property(ENGINE_KEY, "InnoDB"),
    ]);
    assert_eq!(
        sql,
        indoc! {"
            ALTER TABLE `db`.`al_table`
            ADD COLUMN `col_5` varchar(255) NULL COMMENT 'new_add' AFTER `col_1`,
            ENGINE=InnoDB"}
    );
}

#[test]
fn test_add_column_default_position_has_no_clause() {
    let sql = build_sql(&[TableChange::add_column("col_4", DataType::Date)]);
    assert_eq!(sql, "ALTER TABLE `db`.`al_table`\nADD COLUMN `col_4` date NULL");
}

#[test]
fn test_add_column_first() {
    let sql = build_sql(&[TableChange::add_column_with(
        "col_0",
        DataType::Integer,
        None,
        ColumnPosition::First,
        false,
        false,
    )]);
    assert_eq!(
        sql,
        "ALTER TABLE `db`.`al_table`\nADD COLUMN `col_0` int NOT NULL FIRST"
    );
}

#[test]
fn test_changes_to_one_column_merge_into_one_clause() {
    let sql = build_sql(&[
        TableChange::update_column_type("col_1", DataType::varchar(255)),
        TableChange::update_comment("new_comment"),
        TableChange::update_column_comment("col_1", "renamed id"),
        TableChange::rename_column("col_1", "new_col_1"),
    ]);
    assert_eq!(
        sql,
        indoc! {"
            ALTER TABLE `db`.`al_table`
            CHANGE COLUMN `col_1` `new_col_1` varchar(255) NOT NULL COMMENT 'renamed id',
            COMMENT='new_comment'"}
    );
}

#[test]
fn test_clauses_follow_first_appearance() {
    let sql = build_sql(&[
        TableChange::update_column_position("col_1", ColumnPosition::After("col_2".into())),
        TableChange::update_comment("txt3"),
        TableChange::add_column_with(
            "col_4",
            DataType::varchar(255),
            Some("txt4".into()),
            ColumnPosition::Default,
            true,
            false,
        ),
        TableChange::update_column_comment("col_2", "xxx"),
    ]);
    assert_eq!(
        sql,
        indoc! {"
            ALTER TABLE `db`.`al_table`
            MODIFY COLUMN `col_1` int NOT NULL COMMENT 'id' AFTER `col_2`,
            COMMENT='txt3',
            ADD COLUMN `col_4` varchar(255) NULL COMMENT 'txt4',
            MODIFY COLUMN `col_2` varchar(255) NOT NULL COMMENT 'xxx'"}
    );
}

#[test]
fn test_after_renamed_column_uses_new_name() {
    let sql = build_sql(&[
        TableChange::rename_column("col_2", "new_col_2"),
        TableChange::update_column_position("col_1", ColumnPosition::After("col_2".into())),
    ]);
    assert_eq!(
        sql,
        indoc! {"
            ALTER TABLE `db`.`al_table`
            CHANGE COLUMN `col_2` `new_col_2` varchar(255) NOT NULL COMMENT 'name',
            MODIFY COLUMN `col_1` int NOT NULL COMMENT 'id' AFTER `new_col_2`"}
    );
}

#[test]
fn test_default_position_moves_column_to_end() {
    let sql = build_sql(&[
        TableChange::update_column_position("col_1", ColumnPosition::Default),
        TableChange::update_column_nullability("col_3", false),
    ]);
    assert_eq!(
        sql,
        indoc! {"
            ALTER TABLE `db`.`al_table`
            MODIFY COLUMN `col_1` int NOT NULL COMMENT 'id' AFTER `col_3`,
            MODIFY COLUMN `col_3` varchar(255) NOT NULL COMMENT 'txt3'"}
    );
}

#[test]
fn test_default_position_of_last_column_is_a_no_op() {
    let result = build(
        &snapshot(),
        &[TableChange::update_column_position(
            "col_3",
            ColumnPosition::Default,
        )],
    )
    .unwrap();
    assert_eq!(result, None);
}

#[test]
fn test_default_position_skips_deleted_columns() {
    let sql = build_sql(&[
        TableChange::delete_column("col_3", false),
        TableChange::update_column_position("col_1", ColumnPosition::Default),
    ]);
    assert_eq!(
        sql,
        indoc! {"
            ALTER TABLE `db`.`al_table`
            DROP COLUMN `col_3`,
            MODIFY COLUMN `col_1` int NOT NULL COMMENT 'id' AFTER `col_2`"}
    );
}

#[test]
fn test_delete_missing_column() {
    let err = build(&snapshot(), &[TableChange::delete_column("col_5", false)]).unwrap_err();
    assert_eq!(err.to_string(), "Delete column does not exist: col_5");

    let result = build(&snapshot(), &[TableChange::delete_column("col_5", true)]).unwrap();
    assert_eq!(result, None);
}

#[test]
fn test_repeated_delete_emits_one_clause() {
    let sql = build_sql(&[
        TableChange::delete_column("col_3", false),
        TableChange::delete_column("col_3", true),
    ]);
    assert_eq!(sql, "ALTER TABLE `db`.`al_table`\nDROP COLUMN `col_3`");
}

#[test]
fn test_modify_missing_column() {
    let err = build(
        &snapshot(),
        &[TableChange::update_column_comment("nope", "x")],
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Column does not exist: nope");

    let err = build(
        &snapshot(),
        &[TableChange::update_column_position(
            "col_1",
            ColumnPosition::After("nope".into()),
        )],
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Column does not exist: nope");
}

#[test]
fn test_changes_resolve_against_snapshot() {
    // the renamed column is not addressable by its new name in the same batch
    let err = build(
        &snapshot(),
        &[
            TableChange::rename_column("col_1", "new_col_1"),
            TableChange::update_column_comment("new_col_1", "x"),
        ],
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Column does not exist: new_col_1");
}

#[test]
fn test_add_existing_column_rejected() {
    let err = build(
        &snapshot(),
        &[TableChange::add_column("col_2", DataType::Integer)],
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Column already exists: col_2");
}

#[test]
fn test_modify_and_delete_conflict() {
    let err = build(
        &snapshot(),
        &[
            TableChange::update_column_comment("col_3", "x"),
            TableChange::delete_column("col_3", false),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, RelcatError::Validation(_)));
}

#[test]
fn test_nested_field_rejected() {
    let change = TableChange::UpdateColumnComment {
        field_name: vec!["col_1".into(), "inner".into()],
        new_comment: "x".into(),
    };
    let err = build(&snapshot(), &[change]).unwrap_err();
    assert_eq!(err.to_string(), "Nested columns are not supported: col_1.inner");
}

#[test]
fn test_unsupported_types_rejected() {
    let err = build(
        &snapshot(),
        &[TableChange::update_column_type("col_1", DataType::Boolean)],
    )
    .unwrap_err();
    assert!(matches!(err, RelcatError::UnsupportedType(DataType::Boolean)));

    let err = build(&snapshot(), &[TableChange::add_column("col_9", DataType::Uuid)]).unwrap_err();
    assert_eq!(err.to_string(), "Not a supported type: uuid");
}

#[test]
fn test_table_options_last_value_wins() {
    let sql = build_sql(&[
        TableChange::set_property(ENGINE_KEY, "MyISAM"),
        TableChange::update_comment("first"),
        TableChange::set_property(AUTO_INCREMENT_OFFSET_KEY, "100"),
        TableChange::set_property(ENGINE_KEY, "InnoDB"),
        TableChange::update_comment("second"),
    ]);
    assert_eq!(
        sql,
        indoc! {"
            ALTER TABLE `db`.`al_table`
            ENGINE=InnoDB,
            COMMENT='second',
            AUTO_INCREMENT=100"}
    );
}

#[test]
fn test_unknown_property_rejected() {
    let err = build(
        &snapshot(),
        &[TableChange::set_property("charset", "utf8mb4")],
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Unsupported table property: charset");
}

#[test]
fn test_native_timestamp_carried_forward() {
    let table = Table::builder("events")
        .column(
            Column::builder("created_at")
                .data_type(DataType::timestamp_with_time_zone())
                .not_null()
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let sql = build(
        &table,
        &[TableChange::update_column_comment("created_at", "when")],
    )
    .unwrap()
    .unwrap();
    assert_eq!(
        sql,
        "ALTER TABLE `db`.`events`\nMODIFY COLUMN `created_at` timestamp NOT NULL COMMENT 'when'"
    );
}

#[test]
fn test_unparsed_type_carried_forward() {
    let table = Table::builder("t")
        .column(
            Column::builder("id")
                .data_type(DataType::Unparsed("int unsigned".into()))
                .not_null()
                .auto_increment(true)
                .build()
                .unwrap(),
        )
        .index(Index::primary_key(&["id"]))
        .build()
        .unwrap();
    let sql = build(&table, &[TableChange::rename_column("id", "pk")])
        .unwrap()
        .unwrap();
    assert_eq!(
        sql,
        "ALTER TABLE `db`.`t`\nCHANGE COLUMN `id` `pk` int unsigned NOT NULL AUTO_INCREMENT"
    );
}

fn auto_increment_table() -> Table {
    Table::builder("inc")
        .column(
            Column::builder("id")
                .data_type(DataType::Long)
                .not_null()
                .auto_increment(true)
                .build()
                .unwrap(),
        )
        .column(
            Column::builder("name")
                .data_type(DataType::varchar(20))
                .build()
                .unwrap(),
        )
        .index(Index::primary_key(&["id"]))
        .build()
        .unwrap()
}

#[test]
fn test_retype_to_non_integral_drops_auto_increment() {
    let sql = build(
        &auto_increment_table(),
        &[TableChange::update_column_type("id", DataType::varchar(64))],
    )
    .unwrap()
    .unwrap();
    assert_eq!(
        sql,
        "ALTER TABLE `db`.`inc`\nMODIFY COLUMN `id` varchar(64) NOT NULL"
    );
}

#[test]
fn test_retype_to_integral_keeps_auto_increment() {
    let sql = build(
        &auto_increment_table(),
        &[TableChange::update_column_type("id", DataType::Integer)],
    )
    .unwrap()
    .unwrap();
    assert_eq!(
        sql,
        "ALTER TABLE `db`.`inc`\nMODIFY COLUMN `id` int NOT NULL AUTO_INCREMENT"
    );
}

#[test]
fn test_second_auto_increment_column_rejected() {
    let err = build(
        &auto_increment_table(),
        &[TableChange::add_column_with(
            "seq",
            DataType::Integer,
            None,
            ColumnPosition::Default,
            false,
            true,
        )],
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Only one column can be auto-incremented. There are multiple auto-increment columns in your table: [id,seq]"
    );
}

#[test]
fn test_renamed_key_column_stays_a_key() {
    let result = build(
        &auto_increment_table(),
        &[TableChange::rename_column("id", "new_id")],
    );
    assert!(result.is_ok());
}

fn loaded_column(name: &str, data_type: &str, column_type: &str, length: Option<u64>) -> Column {
    let descriptor = MySqlTypeDescriptor {
        data_type: data_type.into(),
        column_type: column_type.into(),
        character_maximum_length: length,
        ..Default::default()
    };
    Column::builder(name)
        .data_type(from_mysql_type(&descriptor))
        .build()
        .unwrap()
}

#[test]
fn test_comment_change_keeps_stored_width_and_precision() {
    let table = Table::builder("t")
        .column(loaded_column("uid", "binary", "binary(16)", Some(16)))
        .column(loaded_column("ratio", "float", "float(7,3)", None))
        .column(loaded_column("amount", "double", "double(10,2)", None))
        .build()
        .unwrap();

    let sql = build(
        &table,
        &[
            TableChange::update_column_comment("uid", "x"),
            TableChange::update_column_comment("ratio", "r"),
            TableChange::update_column_comment("amount", "a"),
        ],
    )
    .unwrap()
    .unwrap();
    assert_eq!(
        sql,
        indoc! {"
            ALTER TABLE `db`.`t`
            MODIFY COLUMN `uid` binary(16) NULL COMMENT 'x',
            MODIFY COLUMN `ratio` float(7,3) NULL COMMENT 'r',
            MODIFY COLUMN `amount` double(10,2) NULL COMMENT 'a'"}
    );
}

#[test]
fn test_two_columns_renamed_to_one_name_rejected() {
    let err = build(
        &snapshot(),
        &[
            TableChange::rename_column("col_1", "x"),
            TableChange::rename_column("col_2", "x"),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, RelcatError::Validation(_)));
    assert_eq!(err.to_string(), "Column already exists: x");
}

#[test]
fn test_added_column_clashing_with_rename_rejected() {
    let rename_then_add = build(
        &snapshot(),
        &[
            TableChange::rename_column("col_3", "x"),
            TableChange::add_column("x", DataType::Integer),
        ],
    )
    .unwrap_err();
    assert_eq!(rename_then_add.to_string(), "Column already exists: x");

    let add_then_rename = build(
        &snapshot(),
        &[
            TableChange::add_column("x", DataType::Integer),
            TableChange::rename_column("col_3", "x"),
        ],
    )
    .unwrap_err();
    assert_eq!(add_then_rename.to_string(), "Column already exists: x");
}
