//! Basic Validation Example
//!
//! This example demonstrates scalar and shape schemas using ouroboros-schema.
//!
//! Run with:
//! ```bash
//! cargo run -p ouroboros-schema --example basic_validation
//! ```

use ouroboros_schema::{Schema, Value, ValueContainer};

fn result_str(result: &ValueContainer) -> String {
    match result.try_get() {
        (_, errors) if !errors.is_empty() => {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            format!("✗ {}", messages.join("; "))
        }
        (Some(value), _) => format!("✓ {}", value),
        (None, _) => "✓ (no value)".to_string(),
    }
}

// ============================================================================
// Scalar Validation
// ============================================================================

fn validate_scalars() {
    println!("1. Scalar Validation");
    println!("--------------------");

    let name = Schema::string().required().min(3).max(20);
    println!("  'Alice': {}", result_str(&name.validate("Alice")));
    println!("  'Al': {}", result_str(&name.validate("Al")));
    println!("  missing: {}", result_str(&name.validate_missing()));

    let age = Schema::int().min(0).smaller_than(150);
    println!("  42: {}", result_str(&age.validate(42)));
    println!("  -1: {}", result_str(&age.validate(-1)));
    println!("  'forty-two': {}", result_str(&age.validate("forty-two")));

    let role = Schema::string().default("user").one_of(["user", "admin"]);
    println!("  role missing: {}", result_str(&role.validate_missing()));
    println!("  role 'root': {}", result_str(&role.validate("root")));
    println!();
}

// ============================================================================
// Coercions and Transforms
// ============================================================================

fn validate_coercions() {
    println!("2. Coercions and Transforms");
    println!("---------------------------");

    let page = Schema::int().allow_coercions().positive();
    println!("  '7': {}", result_str(&page.validate("7")));
    println!("  true: {}", result_str(&page.validate(true)));
    println!("  'seven': {}", result_str(&page.validate("seven")));

    let slug = Schema::string().allow_coercions().transform(|v| match v {
        Value::String(s) => Value::String(s.trim().to_lowercase().replace(' ', "-")),
        other => other,
    });
    println!("  ' Hello World ': {}", result_str(&slug.validate(" Hello World ")));
    println!();
}

// ============================================================================
// Shape Validation
// ============================================================================

fn validate_shapes() {
    println!("3. Shape Validation");
    println!("-------------------");

    let user = Schema::shape([
        ("name", Schema::string().required().min(3)),
        ("age", Schema::int().allow_coercions().positive()),
        ("active", Schema::bool().default(true)),
        (
            "address",
            Schema::shape([("city", Schema::string().required())]).nullable(),
        ),
    ]);

    let valid = Value::object([
        ("name", Value::from("Alice")),
        ("age", Value::from("30")),
        ("address", Value::Null),
    ]);
    println!("  valid user: {}", result_str(&user.validate(valid)));

    let invalid = Value::object([
        ("name", Value::from("Al")),
        ("age", Value::Int(-5)),
        ("address", Value::object([("zip", Value::from("12345"))])),
    ]);
    println!("  invalid user: {}", result_str(&user.validate(invalid)));
    println!();
}

fn main() {
    println!("Basic Validation Example");
    println!("========================\n");

    validate_scalars();
    validate_coercions();
    validate_shapes();
}
