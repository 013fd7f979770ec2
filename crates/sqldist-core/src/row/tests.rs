use crate::{
    row::{AliasMap, ColumnRef, EvaluationContext, FieldPresence, Row},
    value::Value,
};

fn users_row() -> Row {
    Row::new()
        .with("Users", "ID", 7)
        .with("users", "name", "ada")
        .with("orders", "id", 99)
        .with("users", "deleted_at", Value::Null)
}

#[test]
fn column_refs_normalize_names() {
    let col = ColumnRef::qualified("Users", "Name");

    assert_eq!(col.table(), Some("users"));
    assert_eq!(col.column(), "name");
    assert_eq!(col, ColumnRef::new(Some("USERS"), "NAME"));
    assert_eq!(col.to_string(), "users.name");
}

#[test]
fn insert_replaces_existing_cell() {
    let mut row = Row::new().with("t", "x", 1);
    row.insert(Some("T"), "X", 2);

    assert_eq!(row.len(), 1);
    assert_eq!(row.field(Some("t"), "x"), FieldPresence::Present(&Value::Int(2)));
}

#[test]
fn qualified_lookup_respects_table() {
    let row = users_row();

    assert_eq!(row.field(Some("users"), "id"), FieldPresence::Present(&Value::Int(7)));
    assert_eq!(row.field(Some("orders"), "id"), FieldPresence::Present(&Value::Int(99)));
    assert_eq!(row.field(Some("orders"), "name"), FieldPresence::Missing);
}

#[test]
fn unqualified_lookup_takes_first_match() {
    let row = users_row();

    assert_eq!(row.field(None, "id"), FieldPresence::Present(&Value::Int(7)));
    assert_eq!(row.field(None, "missing"), FieldPresence::Missing);
}

#[test]
fn table_less_cells_match_any_qualifier() {
    let row = Row::new().with_unqualified("x", 5);

    assert_eq!(row.field(Some("anything"), "x"), FieldPresence::Present(&Value::Int(5)));
}

#[test]
fn context_distinguishes_null_from_absent() {
    let row = users_row();
    let ctx = EvaluationContext::new(&row);

    let deleted = ColumnRef::qualified("users", "deleted_at");
    let absent = ColumnRef::qualified("users", "email");

    assert!(ctx.includes(&deleted));
    assert_eq!(ctx.value_of(&deleted), Some(&Value::Null));
    assert!(!ctx.includes(&absent));
    assert_eq!(ctx.value_of(&absent), None);
}

#[test]
fn context_resolves_aliases() {
    let row = users_row();
    let mut aliases = AliasMap::new();
    aliases.insert("u".to_string(), "users".to_string());
    aliases.insert("o".to_string(), "orders".to_string());
    let ctx = EvaluationContext::with_aliases(&row, &aliases);

    assert_eq!(ctx.value_of(&ColumnRef::qualified("u", "id")), Some(&Value::Int(7)));
    assert_eq!(ctx.value_of(&ColumnRef::qualified("O", "id")), Some(&Value::Int(99)));
    assert_eq!(ctx.value_of(&ColumnRef::qualified("x", "id")), None);
}

#[test]
fn first_value_follows_insertion_order() {
    let row = Row::new().with_unqualified("b", 2).with_unqualified("a", 1);

    assert_eq!(row.first_value(), Some(&Value::Int(2)));
    assert_eq!(Row::new().first_value(), None);
}
