//! Shared mapping fixtures
//!
//! A small content-management model: users with one e-mail address, any
//! number of addresses and phone numbers, and many-to-many links to groups
//! and tags. Users own both many-to-many associations.

#![allow(dead_code)]

use std::sync::Arc;

use relmap_core::{
    ClassMapping, ColumnDef, DialectAdapter, JoinColumn, ManyToManyAssociation, TargetRef,
    ToOneAssociation,
};
use relmap_schema_tools::SchemaTool;

pub fn tool(dialect: impl DialectAdapter + 'static) -> SchemaTool {
    SchemaTool::new(Arc::new(dialect))
}

/// Route tracing output through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("relmap_schema_tools=debug")
        .with_test_writer()
        .try_init();
}

fn auto_id() -> ColumnDef {
    ColumnDef::integer("id").auto_increment()
}

fn target(table: &str) -> TargetRef {
    TargetRef::new(table, vec![auto_id()])
}

pub fn cms_group() -> ClassMapping {
    ClassMapping::builder("cms_groups")
        .id(auto_id())
        .column(ColumnDef::string("name", 50))
        .many_to_many(
            ManyToManyAssociation::inverse("users", target("cms_users"))
                .join_table("cms_users_groups")
                .join_columns(vec![JoinColumn::new("group_id", "id")])
                .inverse_join_columns(vec![JoinColumn::new("user_id", "id")]),
        )
        .build()
        .expect("valid group mapping")
}

pub fn cms_user() -> ClassMapping {
    ClassMapping::builder("cms_users")
        .id(auto_id())
        .column(ColumnDef::string("status", 50).nullable())
        .column(ColumnDef::string("username", 255).unique())
        .column(ColumnDef::string("name", 255))
        .one_to_one(ToOneAssociation::new("email", target("cms_emails")))
        .many_to_many(
            ManyToManyAssociation::owning("groups", target("cms_groups"))
                .join_table("cms_users_groups")
                .join_columns(vec![JoinColumn::new("user_id", "id")])
                .inverse_join_columns(vec![JoinColumn::new("group_id", "id")]),
        )
        .many_to_many(
            ManyToManyAssociation::owning("tags", target("cms_tags"))
                .join_table("cms_users_tags")
                .join_columns(vec![JoinColumn::new("user_id", "id")])
                .inverse_join_columns(vec![JoinColumn::new("tag_id", "id")]),
        )
        .build()
        .expect("valid user mapping")
}

pub fn cms_tag() -> ClassMapping {
    ClassMapping::builder("cms_tags")
        .id(auto_id())
        .column(ColumnDef::string("tag_name", 50).nullable())
        .many_to_many(
            ManyToManyAssociation::inverse("users", target("cms_users"))
                .join_table("cms_users_tags")
                .join_columns(vec![JoinColumn::new("tag_id", "id")])
                .inverse_join_columns(vec![JoinColumn::new("user_id", "id")]),
        )
        .build()
        .expect("valid tag mapping")
}

pub fn cms_address() -> ClassMapping {
    ClassMapping::builder("cms_addresses")
        .id(auto_id())
        .column(ColumnDef::string("country", 50))
        .column(ColumnDef::string("zip", 50))
        .column(ColumnDef::string("city", 50))
        .one_to_one(ToOneAssociation::new("user", target("cms_users")))
        .build()
        .expect("valid address mapping")
}

pub fn cms_email() -> ClassMapping {
    ClassMapping::builder("cms_emails")
        .id(auto_id())
        .column(ColumnDef::string("email", 250))
        .build()
        .expect("valid email mapping")
}

pub fn cms_phonenumber() -> ClassMapping {
    ClassMapping::builder("cms_phonenumbers")
        .id(ColumnDef::string("phonenumber", 50))
        .many_to_one(ToOneAssociation::new("user", target("cms_users")))
        .build()
        .expect("valid phone number mapping")
}

/// The full model, in the order a host would typically list it
pub fn cms_mappings() -> Vec<ClassMapping> {
    vec![
        cms_group(),
        cms_user(),
        cms_tag(),
        cms_address(),
        cms_email(),
        cms_phonenumber(),
    ]
}

pub fn decimal_model() -> ClassMapping {
    ClassMapping::builder("decimal_model")
        .id(auto_id())
        .column(ColumnDef::decimal("decimal", 5, 2).quoted())
        .column(ColumnDef::decimal("high_scale", 14, 4).quoted())
        .build()
        .expect("valid decimal mapping")
}

pub fn boolean_model() -> ClassMapping {
    ClassMapping::builder("boolean_model")
        .id(auto_id())
        .column(ColumnDef::boolean("booleanField"))
        .build()
        .expect("valid boolean mapping")
}

pub fn namespaced_entity() -> ClassMapping {
    ClassMapping::builder("namespace.entity")
        .id(auto_id())
        .build()
        .expect("valid namespaced mapping")
}
