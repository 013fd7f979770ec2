use crate::value::{
    CoercedPair, Value, coerce_pair, parse_instant_millis, parse_time_millis,
};

// ---- helpers -----------------------------------------------------------

fn v_txt(s: &str) -> Value {
    Value::Text(s.to_string())
}

// ---- coercion ----------------------------------------------------------

#[test]
fn numeric_operands_widen_to_f64() {
    assert_eq!(
        coerce_pair(&Value::Int(3), &Value::Float(4.5)),
        Some(CoercedPair::Numeric(3.0, 4.5))
    );
}

#[test]
fn numeric_text_is_parsed_against_numbers() {
    assert_eq!(
        coerce_pair(&v_txt(" 42 "), &Value::Int(40)),
        Some(CoercedPair::Numeric(42.0, 40.0))
    );
    assert_eq!(coerce_pair(&v_txt("forty"), &Value::Int(40)), None);
}

#[test]
fn null_on_either_side_short_circuits() {
    assert_eq!(
        coerce_pair(&Value::Null, &Value::Int(1)),
        Some(CoercedPair::Null)
    );
    assert_eq!(
        coerce_pair(&v_txt("a"), &Value::Null),
        Some(CoercedPair::Null)
    );
}

#[test]
fn dates_compare_on_the_time_axis() {
    let lhs = v_txt("2024-01-02");
    let rhs = v_txt("2024-01-01");
    let pair = coerce_pair(&lhs, &rhs).expect("coercible");
    let CoercedPair::Integer(a, b) = pair else {
        panic!("expected integer projection, got {pair:?}");
    };

    assert_eq!(a - b, 86_400_000);
}

#[test]
fn integer_operands_stay_exact() {
    assert_eq!(
        coerce_pair(&Value::Int(9_007_199_254_740_992), &Value::Int(9_007_199_254_740_993)),
        Some(CoercedPair::Integer(9_007_199_254_740_992, 9_007_199_254_740_993))
    );
}

#[test]
fn plain_text_stays_textual() {
    assert_eq!(
        coerce_pair(&v_txt("foo"), &v_txt("bar")),
        Some(CoercedPair::Text("foo", "bar"))
    );
}

#[test]
fn booleans_accept_integer_and_text_forms() {
    assert_eq!(
        coerce_pair(&Value::Bool(true), &Value::Int(1)),
        Some(CoercedPair::Bool(true, true))
    );
    assert_eq!(
        coerce_pair(&v_txt("FALSE"), &Value::Bool(true)),
        Some(CoercedPair::Bool(false, true))
    );
    assert_eq!(coerce_pair(&Value::Bool(true), &Value::Int(7)), None);
}

// ---- temporal ----------------------------------------------------------

#[test]
fn instant_formats_agree() {
    let date = parse_instant_millis("2020-03-04").expect("date");
    let datetime = parse_instant_millis("2020-03-04 00:00:00").expect("datetime");
    let iso = parse_instant_millis("2020-03-04T00:00:00").expect("iso datetime");
    let rfc = parse_instant_millis("2020-03-04T00:00:00Z").expect("rfc3339");

    assert_eq!(date, datetime);
    assert_eq!(date, iso);
    assert_eq!(date, rfc);
}

#[test]
fn non_temporal_text_is_rejected() {
    assert_eq!(parse_instant_millis("hello world"), None);
    assert_eq!(parse_instant_millis("12"), None);
    assert_eq!(parse_time_millis("noon"), None);
}

#[test]
fn time_of_day_counts_from_midnight() {
    assert_eq!(parse_time_millis("00:01:01"), Some(61_000));
    assert_eq!(parse_time_millis("00:00:00.250"), Some(250));
}

// ---- text --------------------------------------------------------------

#[test]
fn render_text_skips_null() {
    assert_eq!(Value::Null.render_text(), None);
    assert_eq!(Value::Int(12).render_text().as_deref(), Some("12"));
    assert_eq!(Value::Bool(true).render_text().as_deref(), Some("true"));
}

#[test]
fn rows_deserialize_untagged_values() {
    let values: Vec<Value> = serde_json::from_str(r#"[null, true, 3, 2.5, "x"]"#).expect("json");

    assert_eq!(
        values,
        vec![
            Value::Null,
            Value::Bool(true),
            Value::Int(3),
            Value::Float(2.5),
            v_txt("x"),
        ]
    );
}
