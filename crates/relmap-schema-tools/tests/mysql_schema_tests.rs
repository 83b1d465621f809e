//! End-to-end synthesis against the MySQL dialect

mod common;

use common::*;
use indoc::indoc;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use relmap_core::{ClassMapping, ColumnDef, MySqlDialect, MySqlTableOptions};
use relmap_schema_tools::{DdlStatement, SchemaTool, SchemaToolConfig, render_script};

const OPTIONS: &str = "DEFAULT CHARACTER SET utf8 COLLATE utf8_unicode_ci ENGINE = InnoDB";

#[test]
fn test_cms_model_create_schema() {
    init_tracing();
    let sql = tool(MySqlDialect::new())
        .create_schema_sql(&cms_mappings())
        .unwrap();

    let expected = vec![
        format!("CREATE TABLE cms_groups (id INT AUTO_INCREMENT NOT NULL, name VARCHAR(50) NOT NULL, PRIMARY KEY(id)) {OPTIONS}"),
        format!("CREATE TABLE cms_users (id INT AUTO_INCREMENT NOT NULL, email_id INT DEFAULT NULL, status VARCHAR(50) DEFAULT NULL, username VARCHAR(255) NOT NULL, name VARCHAR(255) NOT NULL, UNIQUE INDEX UNIQ_3AF03EC5F85E0677 (username), UNIQUE INDEX UNIQ_3AF03EC5A832C1C9 (email_id), PRIMARY KEY(id)) {OPTIONS}"),
        format!("CREATE TABLE cms_users_groups (user_id INT NOT NULL, group_id INT NOT NULL, INDEX IDX_7EA9409AA76ED395 (user_id), INDEX IDX_7EA9409AFE54D947 (group_id), PRIMARY KEY(user_id, group_id)) {OPTIONS}"),
        format!("CREATE TABLE cms_users_tags (user_id INT NOT NULL, tag_id INT NOT NULL, INDEX IDX_93F5A1ADA76ED395 (user_id), INDEX IDX_93F5A1ADBAD26311 (tag_id), PRIMARY KEY(user_id, tag_id)) {OPTIONS}"),
        format!("CREATE TABLE cms_tags (id INT AUTO_INCREMENT NOT NULL, tag_name VARCHAR(50) DEFAULT NULL, PRIMARY KEY(id)) {OPTIONS}"),
        format!("CREATE TABLE cms_addresses (id INT AUTO_INCREMENT NOT NULL, user_id INT DEFAULT NULL, country VARCHAR(50) NOT NULL, zip VARCHAR(50) NOT NULL, city VARCHAR(50) NOT NULL, UNIQUE INDEX UNIQ_ACAC157BA76ED395 (user_id), PRIMARY KEY(id)) {OPTIONS}"),
        format!("CREATE TABLE cms_emails (id INT AUTO_INCREMENT NOT NULL, email VARCHAR(250) NOT NULL, PRIMARY KEY(id)) {OPTIONS}"),
        format!("CREATE TABLE cms_phonenumbers (phonenumber VARCHAR(50) NOT NULL, user_id INT DEFAULT NULL, INDEX IDX_F21F790FA76ED395 (user_id), PRIMARY KEY(phonenumber)) {OPTIONS}"),
        "ALTER TABLE cms_users ADD CONSTRAINT FK_3AF03EC5A832C1C9 FOREIGN KEY (email_id) REFERENCES cms_emails (id)".to_string(),
        "ALTER TABLE cms_users_groups ADD CONSTRAINT FK_7EA9409AA76ED395 FOREIGN KEY (user_id) REFERENCES cms_users (id)".to_string(),
        "ALTER TABLE cms_users_groups ADD CONSTRAINT FK_7EA9409AFE54D947 FOREIGN KEY (group_id) REFERENCES cms_groups (id)".to_string(),
        "ALTER TABLE cms_users_tags ADD CONSTRAINT FK_93F5A1ADA76ED395 FOREIGN KEY (user_id) REFERENCES cms_users (id)".to_string(),
        "ALTER TABLE cms_users_tags ADD CONSTRAINT FK_93F5A1ADBAD26311 FOREIGN KEY (tag_id) REFERENCES cms_tags (id)".to_string(),
        "ALTER TABLE cms_addresses ADD CONSTRAINT FK_ACAC157BA76ED395 FOREIGN KEY (user_id) REFERENCES cms_users (id)".to_string(),
        "ALTER TABLE cms_phonenumbers ADD CONSTRAINT FK_F21F790FA76ED395 FOREIGN KEY (user_id) REFERENCES cms_users (id)".to_string(),
    ];

    assert_eq!(sql.len(), 15);
    assert_eq!(sql, expected);
}

#[test]
fn test_creates_precede_alters() {
    let statements = tool(MySqlDialect::new())
        .create_schema(&cms_mappings())
        .unwrap();

    let first_alter = statements.iter().position(DdlStatement::is_alter).unwrap();
    assert_eq!(first_alter, 8);
    assert!(statements[..first_alter].iter().all(DdlStatement::is_create));
    assert!(statements[first_alter..].iter().all(DdlStatement::is_alter));
}

#[test]
fn test_join_table_is_emitted_once_when_both_sides_are_present() {
    let sql = tool(MySqlDialect::new())
        .create_schema_sql(&[cms_user(), cms_group(), cms_tag()])
        .unwrap();

    let join_tables = sql
        .iter()
        .filter(|s| s.starts_with("CREATE TABLE cms_users_groups "))
        .count();
    assert_eq!(join_tables, 1);
}

#[test]
fn test_join_table_follows_inverse_side_when_owner_is_absent() {
    let sql = tool(MySqlDialect::new())
        .create_schema_sql(&[cms_group()])
        .unwrap();

    assert_eq!(sql.len(), 4);
    assert!(sql[0].starts_with("CREATE TABLE cms_groups "));
    assert_eq!(
        sql[1],
        format!("CREATE TABLE cms_users_groups (user_id INT NOT NULL, group_id INT NOT NULL, INDEX IDX_7EA9409AA76ED395 (user_id), INDEX IDX_7EA9409AFE54D947 (group_id), PRIMARY KEY(user_id, group_id)) {OPTIONS}")
    );
    assert_eq!(
        sql[2],
        "ALTER TABLE cms_users_groups ADD CONSTRAINT FK_7EA9409AA76ED395 FOREIGN KEY (user_id) REFERENCES cms_users (id)"
    );
}

#[test]
fn test_decimal_columns_keep_precision_and_quoting() {
    let sql = tool(MySqlDialect::new())
        .create_schema_sql(&[decimal_model()])
        .unwrap();

    assert_eq!(
        sql,
        vec![format!(
            "CREATE TABLE decimal_model (id INT AUTO_INCREMENT NOT NULL, `decimal` NUMERIC(5, 2) NOT NULL, `high_scale` NUMERIC(14, 4) NOT NULL, PRIMARY KEY(id)) {OPTIONS}"
        )]
    );
}

#[test]
fn test_boolean_column_maps_to_tinyint() {
    let sql = tool(MySqlDialect::new())
        .create_schema_sql(&[boolean_model()])
        .unwrap();

    assert_eq!(
        sql,
        vec![format!(
            "CREATE TABLE boolean_model (id INT AUTO_INCREMENT NOT NULL, booleanField TINYINT(1) NOT NULL, PRIMARY KEY(id)) {OPTIONS}"
        )]
    );
}

#[test]
fn test_namespaced_table_is_skipped() {
    init_tracing();
    let sql = tool(MySqlDialect::new())
        .create_schema_sql(&[namespaced_entity()])
        .unwrap();
    assert!(sql.is_empty());

    let sql = tool(MySqlDialect::new())
        .create_schema_sql(&[namespaced_entity(), boolean_model()])
        .unwrap();
    assert_eq!(sql.len(), 1);
}

#[test]
fn test_empty_input_yields_nothing() {
    let tool = tool(MySqlDialect::new());
    assert!(tool.create_schema(&[]).unwrap().is_empty());
    assert!(tool.drop_schema(&[]).unwrap().is_empty());
}

#[test]
fn test_unsigned_and_defaults_render() {
    let counters = ClassMapping::builder("counters")
        .id(ColumnDef::new("id", relmap_core::ColumnType::BigInt)
            .unsigned()
            .auto_increment())
        .column(
            ColumnDef::integer("hits").default_value(relmap_core::DefaultValue::Integer(0)),
        )
        .build()
        .unwrap();

    let sql = tool(MySqlDialect::new()).create_schema_sql(&[counters]).unwrap();
    assert_eq!(
        sql[0],
        format!("CREATE TABLE counters (id BIGINT UNSIGNED AUTO_INCREMENT NOT NULL, hits INT DEFAULT 0 NOT NULL, PRIMARY KEY(id)) {OPTIONS}")
    );
}

#[test]
fn test_named_unique_constraint_keeps_its_name() {
    let accounts = ClassMapping::builder("accounts")
        .id(ColumnDef::integer("id"))
        .column(ColumnDef::string("tenant", 20))
        .column(ColumnDef::string("login", 50))
        .unique_constraint(Some("tenant_login"), ["tenant", "login"])
        .index(None, ["login"])
        .build()
        .unwrap();

    let sql = tool(MySqlDialect::new()).create_schema_sql(&[accounts]).unwrap();
    assert!(sql[0].contains("UNIQUE INDEX tenant_login (tenant, login), INDEX IDX_"));
}

#[test]
fn test_cms_model_drop_schema() {
    let sql = tool(MySqlDialect::new())
        .drop_schema_sql(&cms_mappings())
        .unwrap();

    assert_eq!(
        sql,
        vec![
            "ALTER TABLE cms_users DROP FOREIGN KEY FK_3AF03EC5A832C1C9",
            "ALTER TABLE cms_users_groups DROP FOREIGN KEY FK_7EA9409AA76ED395",
            "ALTER TABLE cms_users_groups DROP FOREIGN KEY FK_7EA9409AFE54D947",
            "ALTER TABLE cms_users_tags DROP FOREIGN KEY FK_93F5A1ADA76ED395",
            "ALTER TABLE cms_users_tags DROP FOREIGN KEY FK_93F5A1ADBAD26311",
            "ALTER TABLE cms_addresses DROP FOREIGN KEY FK_ACAC157BA76ED395",
            "ALTER TABLE cms_phonenumbers DROP FOREIGN KEY FK_F21F790FA76ED395",
            "DROP TABLE cms_phonenumbers",
            "DROP TABLE cms_emails",
            "DROP TABLE cms_addresses",
            "DROP TABLE cms_tags",
            "DROP TABLE cms_users_tags",
            "DROP TABLE cms_users_groups",
            "DROP TABLE cms_users",
            "DROP TABLE cms_groups",
        ]
    );
}

#[test]
fn test_table_options_come_from_config() {
    let config = SchemaToolConfig::from_toml_str(indoc! {r#"
        dialect = "mysql"

        [table_options]
        charset = "utf8mb4"
        collation = "utf8mb4_unicode_ci"
    "#})
    .unwrap();

    let statements = SchemaTool::from_config(&config)
        .create_schema(&[boolean_model()])
        .unwrap();

    assert_eq!(
        render_script(&statements),
        "CREATE TABLE boolean_model (id INT AUTO_INCREMENT NOT NULL, booleanField TINYINT(1) NOT NULL, PRIMARY KEY(id)) DEFAULT CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci ENGINE = InnoDB;\n"
    );
}

#[test]
fn test_short_identifier_ceiling_truncates_generated_names() {
    let dialect = MySqlDialect::with_options(MySqlTableOptions::default())
        .with_max_identifier_length(16);
    let sql = tool(dialect).create_schema_sql(&[cms_phonenumber()]).unwrap();

    let index = sql[0]
        .split("INDEX ")
        .nth(1)
        .and_then(|rest| rest.split(' ').next())
        .unwrap();
    assert_eq!(index.len(), 16);
    assert!(index.starts_with("IDX_F21_"));
}

#[test]
fn test_tool_is_shareable_across_threads() {
    let tool = std::sync::Arc::new(tool(MySqlDialect::new()));
    let expected = tool.create_schema_sql(&cms_mappings()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let tool = tool.clone();
            std::thread::spawn(move || tool.create_schema_sql(&cms_mappings()).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

proptest! {
    #[test]
    fn prop_any_subset_is_deterministic_and_ordered(
        selection in prop::collection::vec(any::<bool>(), 6),
    ) {
        let mappings: Vec<ClassMapping> = cms_mappings()
            .into_iter()
            .zip(selection)
            .filter_map(|(mapping, keep)| keep.then_some(mapping))
            .collect();
        let tool = tool(MySqlDialect::new());

        let first = tool.create_schema(&mappings).unwrap();
        let second = tool.create_schema(&mappings).unwrap();
        prop_assert_eq!(&first, &second);

        let boundary = first.iter().position(DdlStatement::is_alter).unwrap_or(first.len());
        prop_assert!(first[..boundary].iter().all(DdlStatement::is_create));
        prop_assert!(first[boundary..].iter().all(DdlStatement::is_alter));

        let mut tables: Vec<&str> = first
            .iter()
            .filter(|s| matches!(s, DdlStatement::CreateTable { .. }))
            .filter_map(DdlStatement::table)
            .collect();
        let created = tables.len();
        tables.sort();
        tables.dedup();
        prop_assert_eq!(tables.len(), created);
    }
}
